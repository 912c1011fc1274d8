//! Two-phase disposal gate for in-flight operations.
//!
//! Every public driver operation runs inside [`TaskTracker::track`].  When the
//! driver is disposed, the tracker stops admitting new operations and defers
//! the finalizer (the real disconnect) until the last admitted operation has
//! finished.  In-flight work is never aborted, so a command is never cut off
//! in the middle of its key sequence.
//!
//! # How the gate works (for beginners)
//!
//! The tracker keeps a counter of running operations and a `disposing` flag
//! behind one mutex.  Admitting an operation and starting disposal both check
//! and update that state under the same lock, so they cannot race past each
//! other:
//!
//! ```text
//! track():         lock → disposing? reject : active += 1 → unlock → run
//! on completion:   lock → active -= 1 → (active == 0 && disposing)? take finalizer
//! begin_dispose(): lock → disposing = true → (active == 0)? take finalizer
//!                                                         : store finalizer
//! ```
//!
//! Whoever takes the finalizer spawns it on its own task, so it runs exactly
//! once and a caller that gives up on its future cannot cut it short.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::DriverError;

type Finalizer = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

#[derive(Default)]
struct TrackerState {
    active: usize,
    disposing: bool,
    finalizer: Option<Finalizer>,
}

/// Tracks in-flight operations and runs a finalizer once they drain.
pub struct TaskTracker {
    state: Mutex<TrackerState>,
    finalized: Arc<watch::Sender<bool>>,
}

impl Default for TaskTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskTracker {
    pub fn new() -> Self {
        let (finalized, _) = watch::channel(false);
        Self {
            state: Mutex::new(TrackerState::default()),
            finalized: Arc::new(finalized),
        }
    }

    /// Runs `operation` as a tracked operation.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Disposed`] without polling `operation` if
    /// disposal has begun; otherwise whatever `operation` returns.
    pub async fn track<F, T>(&self, operation: F) -> Result<T, DriverError>
    where
        F: Future<Output = Result<T, DriverError>>,
    {
        let guard = self.enter()?;
        let output = operation.await;
        guard.complete();
        output
    }

    /// Synchronous variant of [`TaskTracker::track`] for checks that never
    /// suspend.
    pub fn track_sync<T>(
        &self,
        operation: impl FnOnce() -> Result<T, DriverError>,
    ) -> Result<T, DriverError> {
        let guard = self.enter()?;
        let output = operation();
        guard.complete();
        output
    }

    /// Stops admitting operations and arranges for `finalizer` to run once
    /// the tracked set is empty.
    ///
    /// If nothing is in flight the finalizer is started at once and this
    /// resolves when it has finished.  Calls after the first are no-ops; the
    /// first finalizer is the one that runs.
    pub async fn begin_dispose<F, Fut>(&self, finalizer: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let boxed: Finalizer = Box::new(move || Box::pin(finalizer()));
        let run_now = {
            let mut state = self.lock();
            if state.disposing {
                debug!("dispose already requested");
                None
            } else {
                state.disposing = true;
                if state.active == 0 {
                    Some(boxed)
                } else {
                    debug!(active = state.active, "deferring finalizer until operations finish");
                    state.finalizer = Some(boxed);
                    None
                }
            }
        };

        if let Some(finalizer) = run_now {
            if let Err(finalizer) = spawn_finalizer(finalizer, Arc::clone(&self.finalized)) {
                run_finalizer(finalizer, &self.finalized).await;
            }
            self.wait_finalized().await;
        }
    }

    /// Resolves once the finalizer has run.
    pub async fn wait_finalized(&self) {
        let mut rx = self.finalized.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|done| *done).await;
    }

    pub fn is_disposing(&self) -> bool {
        self.lock().disposing
    }

    pub fn is_finalized(&self) -> bool {
        *self.finalized.borrow()
    }

    /// Number of operations currently in flight.
    pub fn active(&self) -> usize {
        self.lock().active
    }

    fn enter(&self) -> Result<TrackGuard<'_>, DriverError> {
        let mut state = self.lock();
        if state.disposing {
            return Err(DriverError::Disposed);
        }
        state.active += 1;
        Ok(TrackGuard {
            tracker: self,
            done: false,
        })
    }

    /// Removes one operation and hands back the finalizer if it was the last
    /// one after disposal began.
    fn leave(&self) -> Option<Finalizer> {
        let mut state = self.lock();
        state.active = state.active.saturating_sub(1);
        if state.active == 0 && state.disposing {
            state.finalizer.take()
        } else {
            None
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Membership of one operation in the tracked set.
///
/// Dropping the guard without completing it (the operation's future was
/// dropped) still removes the operation.
struct TrackGuard<'a> {
    tracker: &'a TaskTracker,
    done: bool,
}

impl TrackGuard<'_> {
    fn finish(mut self) -> Option<Finalizer> {
        self.done = true;
        self.tracker.leave()
    }

    fn complete(self) {
        let finalized = Arc::clone(&self.tracker.finalized);
        if let Some(finalizer) = self.finish() {
            release(finalizer, finalized);
        }
    }
}

impl Drop for TrackGuard<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Some(finalizer) = self.tracker.leave() {
            release(finalizer, Arc::clone(&self.tracker.finalized));
        }
    }
}

async fn run_finalizer(finalizer: Finalizer, finalized: &watch::Sender<bool>) {
    debug!("running finalizer");
    finalizer().await;
    finalized.send_replace(true);
}

/// Starts the finalizer on its own task.  Hands it back when there is no
/// runtime to spawn on.
fn spawn_finalizer(finalizer: Finalizer, finalized: Arc<watch::Sender<bool>>) -> Result<(), Finalizer> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                run_finalizer(finalizer, &finalized).await;
            });
            Ok(())
        }
        Err(_) => Err(finalizer),
    }
}

fn release(finalizer: Finalizer, finalized: Arc<watch::Sender<bool>>) {
    if spawn_finalizer(finalizer, finalized).is_err() {
        warn!("no async runtime available; finalizer was not run");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
