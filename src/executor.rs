//! Designated execution contexts for work that must run on a specific loop.

use std::panic::{catch_unwind, AssertUnwindSafe};
use tokio::sync::mpsc;
use tracing::error;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, thiserror::Error)]
#[error("executor is closed, task dropped")]
pub struct ExecuteError;

/// A place to submit work that will run later on a designated context.
pub trait Executor: Send + Sync {
    fn execute(&self, task: Task) -> Result<(), ExecuteError>;
}

/// Runs tasks immediately on the submitting context.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: Task) -> Result<(), ExecuteError> {
        run_task(task);
        Ok(())
    }
}

/// Submission side of a [`HostQueue`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HostExecutor {
    tx: mpsc::UnboundedSender<Task>,
}

impl Executor for HostExecutor {
    fn execute(&self, task: Task) -> Result<(), ExecuteError> {
        self.tx.send(task).map_err(|_| ExecuteError)
    }
}

/// Deferred task queue owned by the host loop, which drains it on its own schedule.
pub struct HostQueue {
    rx: mpsc::UnboundedReceiver<Task>,
}

impl HostQueue {
    pub fn channel() -> (HostExecutor, HostQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (HostExecutor { tx }, HostQueue { rx })
    }

    /// Runs every task queued so far without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            run_task(task);
            ran += 1;
        }
        ran
    }

    /// Waits for the next task and runs it. Returns false once every executor is gone.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(task) => {
                run_task(task);
                true
            }
            None => false,
        }
    }
}

fn run_task(task: Task) {
    if catch_unwind(AssertUnwindSafe(task)).is_err() {
        error!("Scheduled task panicked");
    }
}
