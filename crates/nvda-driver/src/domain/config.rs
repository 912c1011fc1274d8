//! Driver configuration types.
//!
//! [`DriverConfig`] is the single source of truth for runtime settings.  It
//! is loaded from a TOML file by
//! [`crate::infrastructure::storage::config::load_config`], and every field
//! has a `#[serde(default = "...")]` so a file only needs the values it
//! changes.  An absent file yields [`DriverConfig::default`].
//!
//! ```toml
//! [driver]
//! keyboard_layout = "laptop"
//!
//! [speech]
//! quiet_period_ms = 300
//!
//! [process]
//! executable = "C:/tools/nvda/nvda.exe"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use nvda_core::{KeyboardLayout, NvdaSettings};
use serde::{Deserialize, Serialize};

/// Top-level driver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DriverConfig {
    #[serde(default)]
    pub driver: DriverSection,
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub process: ProcessConfig,
    /// Settings written into NVDA's `nvda.ini` before launch.
    #[serde(default)]
    pub nvda: NvdaSettings,
}

impl DriverConfig {
    /// Returns the NVDA settings to write, with the keyboard layout forced to
    /// the one dispatch uses so NVDA interprets the bindings the same way.
    pub fn nvda_settings(&self) -> NvdaSettings {
        let mut settings = self.nvda.clone();
        settings.keyboard.keyboard_layout = self.driver.keyboard_layout;
        settings
    }
}

/// General driver behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverSection {
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Which binding of each command is sent.
    #[serde(default)]
    pub keyboard_layout: KeyboardLayout,
}

/// Where and how to reach NVDA Remote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Name presented in the TLS handshake.  NVDA Remote's certificate is
    /// self-signed, so this is a protocol convention, not a real host.
    #[serde(default = "default_server_name")]
    pub server_name: String,
    /// Overall budget for the connect-retry loop.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Fixed delay between failed connect attempts.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl ConnectionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Timing of the speech waits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeechConfig {
    /// How long to wait for the first fragment of an utterance.
    #[serde(default = "default_utterance_timeout_ms")]
    pub utterance_timeout_ms: u64,
    /// Silence after the latest fragment that ends an utterance.
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,
    /// Interval between Control retransmissions while stopping speech.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// How long to wait for NVDA to confirm a speech cancel.
    #[serde(default = "default_stop_speaking_timeout_ms")]
    pub stop_speaking_timeout_ms: u64,
}

impl SpeechConfig {
    pub fn utterance_timeout(&self) -> Duration {
        Duration::from_millis(self.utterance_timeout_ms)
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn stop_speaking_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_speaking_timeout_ms)
    }
}

/// The NVDA executable and its lifecycle timings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessConfig {
    /// Path to a portable NVDA's `nvda.exe`.
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    /// Name of stale instances to kill before launching.
    #[serde(default = "default_process_name")]
    pub process_name: String,
    /// Time given to NVDA to load before connecting.
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,
    /// Time NVDA gets to exit after the quit command before it is killed.
    #[serde(default = "default_exit_grace_ms")]
    pub exit_grace_ms: u64,
}

impl ProcessConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn exit_grace(&self) -> Duration {
        Duration::from_millis(self.exit_grace_ms)
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    6837
}
fn default_server_name() -> String {
    "nvdaremote.com".to_string()
}
fn default_connect_timeout_ms() -> u64 {
    10_000
}
fn default_retry_delay_ms() -> u64 {
    500
}
fn default_utterance_timeout_ms() -> u64 {
    3_000
}
fn default_quiet_period_ms() -> u64 {
    500
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_stop_speaking_timeout_ms() -> u64 {
    500
}
fn default_executable() -> PathBuf {
    PathBuf::from("nvda/nvda.exe")
}
fn default_process_name() -> String {
    "nvda".to_string()
}
fn default_startup_delay_ms() -> u64 {
    2_000
}
fn default_exit_grace_ms() -> u64 {
    10_000
}

impl Default for DriverSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            keyboard_layout: KeyboardLayout::default(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            server_name: default_server_name(),
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            utterance_timeout_ms: default_utterance_timeout_ms(),
            quiet_period_ms: default_quiet_period_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            stop_speaking_timeout_ms: default_stop_speaking_timeout_ms(),
        }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            process_name: default_process_name(),
            startup_delay_ms: default_startup_delay_ms(),
            exit_grace_ms: default_exit_grace_ms(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
