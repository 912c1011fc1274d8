//! nvda-driver library crate.
//!
//! Drives a local NVDA screen reader through the NVDA Remote protocol so that
//! automated accessibility tests can press keys and assert on what NVDA says.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! caller (test suite / CLI)
//!         ↕
//! [nvda-driver]
//!   ├── domain/           Configuration and event types
//!   ├── application/      Task tracker, speech aggregation, dispatch, NvdaDriver
//!   └── infrastructure/
//!         ├── connection/ Socket, TLS upgrade and handshake
//!         ├── reader/     Background message-reading loop
//!         ├── process/    NVDA process launch and teardown
//!         └── storage/    TOML configuration file
//!         ↕
//! NVDA Remote (line-delimited JSON over TLS, 127.0.0.1:6837)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `nvda-core`, and talks to the
//!   connection through the [`application::RemoteLink`] trait only.
//! - `infrastructure` implements that trait with real sockets and processes.
//!
//! # Quick start
//!
//! ```no_run
//! use nvda_driver::domain::DriverConfig;
//! use nvda_driver::infrastructure::build_driver;
//!
//! # async fn example() -> Result<(), nvda_driver::DriverError> {
//! let driver = build_driver(&DriverConfig::default());
//! driver.connect().await?;
//! let title = driver
//!     .send_command_and_get_spoken_text(nvda_core::commands::find("ReportTitle").unwrap(), None, None)
//!     .await?;
//! assert!(nvda_core::text_contains(&title, "notepad"));
//! driver.dispose().await;
//! # Ok(())
//! # }
//! ```

/// Domain layer: configuration and event types (no I/O).
pub mod domain;

/// Application layer: the driver facade and its timing logic.
pub mod application;

/// Infrastructure layer: sockets, TLS, processes and files.
pub mod infrastructure;

pub mod error;

pub use application::NvdaDriver;
pub use error::DriverError;
