//! Application layer for nvda-driver.
//!
//! Holds the logic that does not care how bytes reach NVDA:
//!
//! - [`tracker`]: the two-phase disposal gate around every public operation.
//! - [`speech`]: utterance aggregation and the stop-speaking handshake.
//! - [`dispatch`]: commands and key combinations turned into key messages.
//! - [`driver`]: the [`NvdaDriver`] facade that ties them together.
//!
//! The connection is reached only through the [`RemoteLink`] trait, which the
//! infrastructure layer implements.

pub mod dispatch;
pub mod driver;
pub mod link;
pub mod speech;
pub mod tracker;

pub use driver::NvdaDriver;
pub use link::RemoteLink;
pub use tracker::TaskTracker;
