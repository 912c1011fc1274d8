//! Lifecycle of the NVDA process the driver talks to.
//!
//! The connection manager only sees the two traits defined here, so tests can
//! swap the real launcher for [`mock::MockProcessLauncher`] and exercise
//! connect and disconnect without NVDA installed.
//!
//! # Launch sequence
//!
//! ```text
//! executable exists? ─► write userConfig/nvda.ini ─► kill stale "nvda" processes
//!                    ─► spawn ─► wait startup delay (early exit = failure)
//! ```

pub mod mock;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use nvda_core::{render_ini, NvdaSettings};
use sysinfo::{ProcessesToUpdate, System};
use tracing::{debug, info, warn};

use crate::domain::ProcessConfig;
use crate::error::DriverError;

/// A running screen-reader process.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TargetProcess: Send {
    /// Waits up to `grace` for the process to exit.  Returns `true` if it
    /// has exited.
    async fn wait_for_exit(&mut self, grace: Duration) -> bool;

    /// Forcibly terminates the process.
    async fn kill(&mut self) -> std::io::Result<()>;

    fn has_exited(&mut self) -> bool;
}

/// Starts the screen reader before a connection is attempted.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn TargetProcess>, DriverError>;
}

/// Stops `process`: waits up to `grace` for a clean exit, then kills it.
///
/// # Errors
///
/// [`DriverError::Process`] if the kill fails while the process is still
/// running.
pub async fn shutdown_process(process: &mut dyn TargetProcess, grace: Duration) -> Result<(), DriverError> {
    if process.wait_for_exit(grace).await {
        debug!("NVDA exited");
        return Ok(());
    }

    warn!(?grace, "NVDA did not exit in time; killing it");
    match process.kill().await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidInput || process.has_exited() => {
            debug!("NVDA had already exited when killed: {e}");
            Ok(())
        }
        Err(e) => Err(DriverError::Process(format!("failed to kill NVDA: {e}"))),
    }
}

// ── Real NVDA process ─────────────────────────────────────────────────────────

/// A spawned NVDA child process.
pub struct NvdaChild(tokio::process::Child);

#[async_trait]
impl TargetProcess for NvdaChild {
    async fn wait_for_exit(&mut self, grace: Duration) -> bool {
        match tokio::time::timeout(grace, self.0.wait()).await {
            Ok(Ok(status)) => {
                debug!(%status, "NVDA process finished");
                true
            }
            Ok(Err(e)) => {
                warn!("could not wait for NVDA: {e}");
                self.has_exited()
            }
            Err(_) => false,
        }
    }

    async fn kill(&mut self) -> std::io::Result<()> {
        self.0.kill().await
    }

    fn has_exited(&mut self) -> bool {
        matches!(self.0.try_wait(), Ok(Some(_)))
    }
}

/// Launches a portable NVDA with a generated configuration.
pub struct NvdaProcessLauncher {
    config: ProcessConfig,
    settings: NvdaSettings,
}

impl NvdaProcessLauncher {
    pub fn new(config: ProcessConfig, settings: NvdaSettings) -> Self {
        Self { config, settings }
    }
}

#[async_trait]
impl ProcessLauncher for NvdaProcessLauncher {
    async fn launch(&self) -> Result<Box<dyn TargetProcess>, DriverError> {
        let exe = &self.config.executable;
        if !exe.is_file() {
            return Err(DriverError::Process(format!(
                "NVDA executable not found at {}",
                exe.display()
            )));
        }

        let ini_path = write_user_config(exe, &self.settings).await?;
        debug!(path = %ini_path.display(), "wrote NVDA configuration");

        let name = self.config.process_name.clone();
        let killed = tokio::task::spawn_blocking(move || kill_processes_named(&name))
            .await
            .map_err(|e| DriverError::Process(format!("process scan failed: {e}")))?;
        if killed > 0 {
            info!(killed, "stopped stale NVDA instances");
        }

        let mut command = tokio::process::Command::new(exe);
        if let Some(dir) = exe.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }
        let child = command
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DriverError::Process(format!("failed to start {}: {e}", exe.display())))?;
        info!(pid = child.id(), "NVDA started");

        let mut process = NvdaChild(child);
        if process.wait_for_exit(self.config.startup_delay()).await {
            return Err(DriverError::Process("NVDA exited during startup".to_string()));
        }
        Ok(Box::new(process))
    }
}

/// Renders `settings` into `<exe dir>/userConfig/nvda.ini`.
async fn write_user_config(exe: &Path, settings: &NvdaSettings) -> Result<PathBuf, DriverError> {
    let dir = exe.parent().unwrap_or_else(|| Path::new(".")).join("userConfig");
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join("nvda.ini");
    tokio::fs::write(&path, render_ini(settings)).await?;
    Ok(path)
}

/// Kills every process whose name matches `name`, ignoring case and a
/// trailing `.exe`.  Returns how many were signalled.
fn kill_processes_named(name: &str) -> usize {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);

    system
        .processes()
        .values()
        .filter(|process| process_name_matches(&process.name().to_string_lossy(), name))
        .filter(|process| process.kill())
        .count()
}

fn process_name_matches(candidate: &str, wanted: &str) -> bool {
    let candidate = candidate.to_ascii_lowercase();
    let base = candidate.strip_suffix(".exe").unwrap_or(&candidate);
    base == wanted.to_ascii_lowercase()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
