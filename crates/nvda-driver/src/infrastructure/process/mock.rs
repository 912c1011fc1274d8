//! In-memory process launcher for tests.
//!
//! The real launcher needs a Windows machine with a portable NVDA.  The mock
//! launcher records each launch and hands out a [`FakeProcess`] that reports
//! how it was stopped, so connection tests can run anywhere against a fake
//! NVDA Remote server.
//!
//! Set `should_fail = true` to make every launch return
//! [`DriverError::Process`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{ProcessLauncher, TargetProcess};
use crate::error::DriverError;

/// Observable state shared between a [`FakeProcess`] and the test.
#[derive(Debug, Default)]
pub struct FakeProcessState {
    pub exited: AtomicBool,
    pub killed: AtomicBool,
    pub exit_waits: AtomicUsize,
}

/// A launcher that starts nothing.
#[derive(Default)]
pub struct MockProcessLauncher {
    /// Number of `launch` calls so far.
    pub launches: AtomicUsize,
    /// When `true`, the fake process ignores the quit command and must be
    /// killed.
    pub hangs_on_exit: bool,
    /// When `true`, every launch fails.
    pub should_fail: bool,
    /// State of the most recently launched process.
    pub last: std::sync::Mutex<Option<Arc<FakeProcessState>>>,
}

impl MockProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of the most recently launched process, if any.
    pub fn last_process(&self) -> Option<Arc<FakeProcessState>> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

#[async_trait]
impl ProcessLauncher for MockProcessLauncher {
    async fn launch(&self) -> Result<Box<dyn TargetProcess>, DriverError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(DriverError::Process("mock launch failure".to_string()));
        }
        let state = Arc::new(FakeProcessState::default());
        if let Ok(mut last) = self.last.lock() {
            *last = Some(Arc::clone(&state));
        }
        Ok(Box::new(FakeProcess {
            state,
            exits_on_request: !self.hangs_on_exit,
        }))
    }
}

/// A process that exits as soon as it is asked to, unless told to hang.
pub struct FakeProcess {
    state: Arc<FakeProcessState>,
    exits_on_request: bool,
}

#[async_trait]
impl TargetProcess for FakeProcess {
    async fn wait_for_exit(&mut self, _grace: Duration) -> bool {
        self.state.exit_waits.fetch_add(1, Ordering::SeqCst);
        if self.exits_on_request {
            self.state.exited.store(true, Ordering::SeqCst);
        }
        self.state.exited.load(Ordering::SeqCst)
    }

    async fn kill(&mut self) -> std::io::Result<()> {
        self.state.killed.store(true, Ordering::SeqCst);
        self.state.exited.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn has_exited(&mut self) -> bool {
        self.state.exited.load(Ordering::SeqCst)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::process::shutdown_process;

    #[tokio::test]
    async fn test_mock_launch_is_recorded() {
        let launcher = MockProcessLauncher::new();

        let _process = launcher.launch().await.unwrap();

        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert!(launcher.last_process().is_some());
    }

    #[tokio::test]
    async fn test_failing_launcher_returns_process_error() {
        let launcher = MockProcessLauncher {
            should_fail: true,
            ..MockProcessLauncher::default()
        };

        let result = launcher.launch().await;

        assert!(matches!(result, Err(DriverError::Process(_))));
    }

    #[tokio::test]
    async fn test_hanging_fake_process_is_killed_by_shutdown() {
        // Arrange
        let launcher = MockProcessLauncher {
            hangs_on_exit: true,
            ..MockProcessLauncher::default()
        };
        let mut process = launcher.launch().await.unwrap();

        // Act
        shutdown_process(process.as_mut(), Duration::from_millis(1)).await.unwrap();

        // Assert
        let state = launcher.last_process().unwrap();
        assert!(state.killed.load(Ordering::SeqCst));
    }
}
