//! Domain layer for nvda-driver.
//!
//! Plain data: the driver configuration and the events the reader loop
//! publishes.  Nothing here touches sockets, files or the async runtime.

pub mod config;
pub mod events;

pub use config::{ConnectionConfig, DriverConfig, DriverSection, ProcessConfig, SpeechConfig};
pub use events::RemoteEvent;
