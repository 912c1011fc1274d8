//! Infrastructure layer for nvda-driver.
//!
//! Everything that touches the operating system lives here:
//!
//! - [`connection`]: the socket, its state machine and the write path.
//! - [`reader`]: the background task that decodes inbound lines.
//! - [`tls`]: the TLS (or plain) stream upgrade.
//! - [`process`]: launching and stopping NVDA.
//! - [`storage`]: the TOML configuration file.
//!
//! Protocol rules and speech timing are not here; they belong to
//! `nvda-core` and the application layer.

pub mod connection;
pub mod process;
pub mod reader;
pub mod storage;
pub mod tls;

use std::sync::Arc;

use crate::application::NvdaDriver;
use crate::domain::DriverConfig;

pub use connection::{ConnectionManager, ConnectionState};
pub use process::{NvdaProcessLauncher, ProcessLauncher};
pub use tls::{PlainUpgrader, StreamUpgrader, TlsUpgrader};

/// Wires the production collaborators into a driver.
///
/// The driver launches the configured NVDA executable and connects to it
/// over TLS.  Use [`build_driver_with`] to substitute the launcher or the
/// stream upgrade.
pub fn build_driver(config: &DriverConfig) -> NvdaDriver {
    let launcher = Arc::new(NvdaProcessLauncher::new(config.process.clone(), config.nvda_settings()));
    let upgrader = Arc::new(TlsUpgrader::new(config.connection.server_name.clone()));
    build_driver_with(config, launcher, upgrader)
}

/// Builds a driver around the given process launcher and stream upgrade.
pub fn build_driver_with(
    config: &DriverConfig,
    launcher: Arc<dyn ProcessLauncher>,
    upgrader: Arc<dyn StreamUpgrader>,
) -> NvdaDriver {
    let link = Arc::new(ConnectionManager::new(
        config.connection.clone(),
        config.process.exit_grace(),
        launcher,
        upgrader,
    ));
    NvdaDriver::new(link, config.driver.keyboard_layout, config.speech.clone())
}
