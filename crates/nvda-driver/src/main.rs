//! nvda-driver command-line tool.
//!
//! Launches a local NVDA, connects to it over NVDA Remote and either sends
//! something and prints what NVDA says, or prints everything NVDA says until
//! interrupted.
//!
//! # Usage
//!
//! ```text
//! nvda-driver [OPTIONS] <COMMAND>
//!
//! Commands:
//!   commands            List the built-in NVDA commands
//!   run <NAME>          Send a named command and print the resulting speech
//!   keys <COMBO>...     Type key combinations (e.g. Nvda+T) and print the speech
//!   listen              Print every utterance until Ctrl+C (or --seconds)
//!   write-ini <PATH>    Write the generated nvda.ini without starting NVDA
//!
//! Options:
//!   --config <PATH>         Driver configuration file [default: nvda-driver.toml]
//!   --executable <PATH>     NVDA executable, overriding the configuration
//!   --layout <LAYOUT>       desktop or laptop, overriding the configuration
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable               | Description                  |
//! |------------------------|------------------------------|
//! | `NVDA_DRIVER_CONFIG`   | Configuration file path      |
//! | `NVDA_EXECUTABLE`      | NVDA executable path         |
//! | `NVDA_KEYBOARD_LAYOUT` | Keyboard layout              |
//! | `RUST_LOG`             | Log filter (overrides config) |

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use nvda_core::commands;
use nvda_core::{render_ini, KeyCombination, KeyboardLayout};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nvda_driver::domain::{DriverConfig, RemoteEvent};
use nvda_driver::infrastructure::build_driver;
use nvda_driver::infrastructure::storage::config::{load_config, DEFAULT_CONFIG_FILE};
use nvda_driver::NvdaDriver;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Drive a local NVDA screen reader through NVDA Remote.
#[derive(Debug, Parser)]
#[command(name = "nvda-driver", about = "Drive NVDA through NVDA Remote and capture its speech", version)]
struct Cli {
    /// Driver configuration file.  A missing file means all defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, env = "NVDA_DRIVER_CONFIG")]
    config: PathBuf,

    /// Path to the portable NVDA executable.
    #[arg(long, env = "NVDA_EXECUTABLE")]
    executable: Option<PathBuf>,

    /// Keyboard layout whose command bindings are sent.
    #[arg(long, env = "NVDA_KEYBOARD_LAYOUT")]
    layout: Option<KeyboardLayout>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// List the built-in NVDA commands.
    Commands,

    /// Send a named command and print the resulting speech.
    Run {
        /// Command name, e.g. ReportTitle or report-title.
        name: String,
    },

    /// Type key combinations and print the resulting speech.
    Keys {
        /// Combinations such as `Nvda+T` or `Control+Home`, typed in order.
        #[arg(required = true)]
        combinations: Vec<KeyCombination>,
    },

    /// Print every utterance until Ctrl+C.
    Listen {
        /// Stop after this many seconds.
        #[arg(long)]
        seconds: Option<u64>,
    },

    /// Write the generated nvda.ini to PATH and exit.
    WriteIni { path: PathBuf },
}

impl Cli {
    /// Loads the configuration file and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or parsed.
    fn driver_config(&self) -> anyhow::Result<DriverConfig> {
        let mut config = load_config(&self.config)
            .with_context(|| format!("failed to load configuration from '{}'", self.config.display()))?;
        if let Some(executable) = &self.executable {
            config.process.executable = executable.clone();
        }
        if let Some(layout) = self.layout {
            config.driver.keyboard_layout = layout;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.driver_config()?;

    // `RUST_LOG` wins; otherwise the configured level applies.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.driver.log_level)),
        )
        .init();

    match cli.command {
        CliCommand::Commands => {
            print_catalogue(config.driver.keyboard_layout);
            Ok(())
        }
        CliCommand::WriteIni { path } => {
            std::fs::write(&path, render_ini(&config.nvda_settings()))
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            info!(path = %path.display(), "wrote nvda.ini");
            Ok(())
        }
        command => with_driver(&config, command).await,
    }
}

/// Connects, runs `command` and always disposes the driver afterwards.
async fn with_driver(config: &DriverConfig, command: CliCommand) -> anyhow::Result<()> {
    let driver = build_driver(config);
    driver.connect().await.context("failed to connect to NVDA")?;

    let result = run_connected(&driver, command).await;
    driver.dispose().await;
    result
}

async fn run_connected(driver: &NvdaDriver, command: CliCommand) -> anyhow::Result<()> {
    match command {
        CliCommand::Run { name } => {
            let command = commands::find(&name).with_context(|| format!("unknown command '{name}'"))?;
            let text = driver.send_command_and_get_spoken_text(command, None, None).await?;
            println!("{text}");
        }
        CliCommand::Keys { combinations } => {
            let text = driver
                .send_key_combinations_and_get_spoken_text(&combinations, None, None)
                .await?;
            println!("{text}");
        }
        CliCommand::Listen { seconds } => listen(driver, seconds.map(Duration::from_secs)).await?,
        CliCommand::Commands | CliCommand::WriteIni { .. } => {}
    }
    Ok(())
}

/// Prints each utterance as it arrives until Ctrl+C or `limit` elapses.
async fn listen(driver: &NvdaDriver, limit: Option<Duration>) -> anyhow::Result<()> {
    let mut events = driver.subscribe();
    let deadline = tokio::time::sleep(limit.unwrap_or(Duration::MAX));
    tokio::pin!(deadline);
    info!("listening; press Ctrl+C to stop");

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl+C")?;
                info!("received Ctrl+C; stopping");
                break;
            }
            _ = &mut deadline, if limit.is_some() => break,
            received = events.recv() => match received {
                Ok(RemoteEvent::Speak(text)) => println!("{text}"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "output fell behind; utterances were dropped"),
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}

fn print_catalogue(layout: KeyboardLayout) {
    for (group, command) in commands::all() {
        let binding = command
            .sequence(layout)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("{:<40} {:<20} {binding}", command.name, group.to_string());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use nvda_core::Key;

    #[test]
    fn test_cli_default_config_path() {
        // Arrange / Act
        let cli = Cli::parse_from(["nvda-driver", "commands"]);

        // Assert
        assert_eq!(cli.config, PathBuf::from("nvda-driver.toml"));
        assert!(cli.executable.is_none());
        assert!(cli.layout.is_none());
    }

    #[test]
    fn test_cli_run_takes_command_name() {
        let cli = Cli::parse_from(["nvda-driver", "run", "ReportTitle"]);
        assert!(matches!(cli.command, CliCommand::Run { name } if name == "ReportTitle"));
    }

    #[test]
    fn test_cli_keys_parse_combinations() {
        // Arrange / Act
        let cli = Cli::parse_from(["nvda-driver", "keys", "Nvda+T", "Control+Home"]);

        // Assert
        match cli.command {
            CliCommand::Keys { combinations } => {
                assert_eq!(combinations.len(), 2);
                assert_eq!(combinations[0], KeyCombination::new([Key::NVDA, Key::T]));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_keys_rejects_unknown_key() {
        let result = Cli::try_parse_from(["nvda-driver", "keys", "Nvda+Banana"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_keys_requires_at_least_one_combination() {
        let result = Cli::try_parse_from(["nvda-driver", "keys"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_listen_seconds() {
        let cli = Cli::parse_from(["nvda-driver", "listen", "--seconds", "5"]);
        assert!(matches!(cli.command, CliCommand::Listen { seconds: Some(5) }));
    }

    #[test]
    fn test_cli_layout_parses() {
        let cli = Cli::parse_from(["nvda-driver", "--layout", "laptop", "commands"]);
        assert_eq!(cli.layout, Some(KeyboardLayout::Laptop));
    }

    #[test]
    fn test_driver_config_applies_overrides() {
        // Arrange: a config path that does not exist yields defaults
        let missing = std::env::temp_dir().join("nvda-driver-cli-test-missing.toml");
        let cli = Cli::parse_from([
            "nvda-driver",
            "--config",
            missing.to_str().unwrap(),
            "--executable",
            "C:/nvda/nvda.exe",
            "--layout",
            "laptop",
            "commands",
        ]);

        // Act
        let config = cli.driver_config().unwrap();

        // Assert
        assert_eq!(config.process.executable, PathBuf::from("C:/nvda/nvda.exe"));
        assert_eq!(config.driver.keyboard_layout, KeyboardLayout::Laptop);
        assert_eq!(config.connection.port, 6837);
    }

    #[test]
    fn test_driver_config_reports_malformed_file() {
        // Arrange
        let path = std::env::temp_dir().join(format!("nvda-driver-cli-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[speech\n").unwrap();
        let cli = Cli::parse_from(["nvda-driver", "--config", path.to_str().unwrap(), "commands"]);

        // Act
        let result = cli.driver_config();

        // Assert
        assert!(result.is_err());
        let _ = std::fs::remove_file(&path);
    }
}
