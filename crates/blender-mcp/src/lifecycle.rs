//! Server worker lifecycle
//!
//! [`Worker`] owns one background task (the MCP transport loop) and its
//! state machine:
//!
//! ```text
//! Idle -> Starting -> Running -> StopRequested -> Stopped
//!                                                   |
//!                     Starting <--------------------+  (restart)
//! ```
//!
//! Stopping is cooperative. The task receives a [`StopSignal`] and is expected
//! to return once it fires. A task that does not finish within the grace period
//! is aborted and reported as unresponsive.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Lifecycle state of a [`Worker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Starting,
    Running,
    StopRequested,
    Stopped,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::StopRequested => "stop requested",
            Self::Stopped => "stopped",
        };
        write!(f, "{name}")
    }
}

/// How a call to [`Worker::stop`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Nothing was running
    NotRunning,
    /// The task finished within the grace period
    Stopped,
    /// The task ignored the stop request and was aborted
    Unresponsive,
}

/// Cooperative stop flag handed to the worker task
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    pub fn is_stop_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once a stop has been requested (or the worker is gone)
    pub async fn requested(&mut self) {
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}

/// Owner of a single background task
#[derive(Debug)]
pub struct Worker {
    state: Arc<watch::Sender<WorkerState>>,
    stop: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
    grace: Duration,
}

impl Worker {
    /// Create an idle worker that waits up to `grace` for its task to stop
    pub fn new(grace: Duration) -> Self {
        let (state, _) = watch::channel(WorkerState::Idle);
        let (stop, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
            stop,
            handle: Mutex::new(None),
            grace,
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Start `job` on the tokio runtime
    ///
    /// Returns `false` without doing anything if a task is already starting,
    /// running or stopping. Must be called from within a tokio runtime.
    pub fn start<F, Fut>(&self, job: F) -> bool
    where
        F: FnOnce(StopSignal) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let claimed = self.state.send_if_modified(|state| match state {
            WorkerState::Idle | WorkerState::Stopped => {
                *state = WorkerState::Starting;
                true
            }
            _ => false,
        });
        if !claimed {
            tracing::debug!(state = %self.state(), "Worker already active, start ignored");
            return false;
        }

        self.stop.send_replace(false);
        let signal = StopSignal {
            rx: self.stop.subscribe(),
        };
        let task = job(signal);
        let state = Arc::clone(&self.state);

        let handle = tokio::spawn(async move {
            state.send_if_modified(|s| {
                if *s == WorkerState::Starting {
                    *s = WorkerState::Running;
                    true
                } else {
                    false
                }
            });
            tracing::debug!("Worker running");

            if let Err(e) = task.await {
                tracing::error!(error = %e, "Worker exited with an error");
            }

            state.send_replace(WorkerState::Stopped);
            tracing::debug!("Worker stopped");
        });

        *self.handle.lock() = Some(handle);
        true
    }

    /// Request a stop and wait up to the grace period for the task to end
    ///
    /// Safe to call repeatedly and from any task.
    pub async fn stop(&self) -> StopOutcome {
        self.state.send_if_modified(|state| match state {
            WorkerState::Starting | WorkerState::Running => {
                *state = WorkerState::StopRequested;
                true
            }
            _ => false,
        });
        self.stop.send_replace(true);

        let Some(handle) = self.handle.lock().take() else {
            return StopOutcome::NotRunning;
        };

        let abort = handle.abort_handle();
        if tokio::time::timeout(self.grace, handle).await.is_ok() {
            StopOutcome::Stopped
        } else {
            tracing::warn!(
                grace_ms = self.grace.as_millis() as u64,
                "Worker did not stop in time, aborting"
            );
            abort.abort();
            self.state.send_replace(WorkerState::Stopped);
            StopOutcome::Unresponsive
        }
    }

    /// Wait until the current task has ended
    ///
    /// Never resolves for a worker that was never started.
    pub async fn finished(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|s| *s == WorkerState::Stopped).await;
    }
}
