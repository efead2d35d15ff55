//! # Stage Runner
//!
//! [`project_run`] drives a project through its pipeline stages, calling back
//! into a [`ProjectRunCallbacks`] between stages. [`ProjectRunner`] runs the
//! same pipeline on a blocking tokio task while the caller polls a snapshot
//! of the project, its log, and its [`RunnerStatus`].
//!
//! Interruption is cooperative: a requested interrupt takes effect at the
//! next checkpoint, never in the middle of a stage.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{Error as CrateError, InternalResult, ProjectError, ProjectResult};
use crate::evaluator::Evaluator;
use crate::extract::{extract_inventory, extract_objects};
use crate::project::{Progress, Project};

/// Returned by a checkpoint when the run should stop.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Operation aborted")]
pub struct Interrupted;

impl From<Interrupted> for ProjectError {
    fn from(_: Interrupted) -> Self {
        ProjectError::Interrupted
    }
}

pub trait ProjectRunCallbacks {
    fn log(&mut self, message: &str);

    /// Called between stages with the project as it stands.
    fn checkpoint(&mut self, project: &Project) -> Result<(), Interrupted>;
}

/// Callbacks that only forward log lines to `tracing`.
#[derive(Debug, Default)]
pub struct TracingCallbacks;

impl ProjectRunCallbacks for TracingCallbacks {
    fn log(&mut self, message: &str) {
        info!("{}", message);
    }

    fn checkpoint(&mut self, _project: &Project) -> Result<(), Interrupted> {
        Ok(())
    }
}

pub fn project_run(
    project: &mut Project,
    evaluator: &dyn Evaluator,
    callbacks: &mut dyn ProjectRunCallbacks,
) -> ProjectResult<()> {
    project_run_until(project, evaluator, callbacks, Progress::ALL_DONE)
}

/// Runs every stage up to and including `target`, skipping the ones already
/// done. Any failure other than an interrupt marks the project as errored.
pub fn project_run_until(
    project: &mut Project,
    evaluator: &dyn Evaluator,
    callbacks: &mut dyn ProjectRunCallbacks,
    target: Progress,
) -> ProjectResult<()> {
    let result = run_stages(project, evaluator, callbacks, target);
    match &result {
        Ok(()) | Err(ProjectError::Interrupted) => {}
        Err(e) => {
            warn!("run failed: {}", e);
            project.errored = true;
        }
    }
    result
}

fn run_stages(
    project: &mut Project,
    evaluator: &dyn Evaluator,
    callbacks: &mut dyn ProjectRunCallbacks,
    target: Progress,
) -> ProjectResult<()> {
    callbacks.checkpoint(project)?;

    if project.progress < Progress::InventoryDone && target >= Progress::InventoryDone {
        callbacks.log("Extracting inventory...");
        extract_inventory(project, evaluator)?;
        callbacks.checkpoint(project)?;
    }

    if project.progress < Progress::PolysDone && target >= Progress::PolysDone {
        callbacks.log("Extracting objects...");
        extract_objects(project, evaluator)?;
        callbacks.checkpoint(project)?;
    }

    callbacks.log("Done.");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum RunnerStatus {
    Running,
    Done,
    Errored,
    Interrupting,
    Interrupted,
}

struct Shared {
    snapshot: Mutex<Project>,
    logs: Mutex<Vec<String>>,
    interrupt: AtomicBool,
}

/// Publishes the worker's progress into [`Shared`].
struct SharedCallbacks {
    shared: Arc<Shared>,
}

impl ProjectRunCallbacks for SharedCallbacks {
    fn log(&mut self, message: &str) {
        info!("{}", message);
        self.shared.logs.blocking_lock().push(message.to_string());
    }

    fn checkpoint(&mut self, project: &Project) -> Result<(), Interrupted> {
        *self.shared.snapshot.blocking_lock() = project.clone();
        if self.shared.interrupt.load(Ordering::SeqCst) {
            return Err(Interrupted);
        }
        Ok(())
    }
}

/// Runs a project in the background. Must be created inside a tokio runtime.
pub struct ProjectRunner {
    shared: Arc<Shared>,
    target: Progress,
    handle: JoinHandle<(Project, ProjectResult<()>)>,
}

impl ProjectRunner {
    pub fn spawn(project: Project, evaluator: Arc<dyn Evaluator>, target: Progress) -> Self {
        let shared = Arc::new(Shared {
            snapshot: Mutex::new(project.clone()),
            logs: Mutex::new(Vec::new()),
            interrupt: AtomicBool::new(false),
        });

        let worker_shared = shared.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let mut project = project;
            let mut callbacks = SharedCallbacks {
                shared: worker_shared.clone(),
            };
            let result =
                project_run_until(&mut project, evaluator.as_ref(), &mut callbacks, target);
            // the final state, including the errored flag, is always published
            *worker_shared.snapshot.blocking_lock() = project.clone();
            (project, result)
        });

        Self {
            shared,
            target,
            handle,
        }
    }

    /// The project as of the last checkpoint.
    pub async fn snapshot(&self) -> Project {
        self.shared.snapshot.lock().await.clone()
    }

    /// Removes and returns the log lines collected since the last call.
    pub async fn take_logs(&self) -> Vec<String> {
        std::mem::take(&mut *self.shared.logs.lock().await)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn interrupt(&self) {
        if !self.shared.interrupt.swap(true, Ordering::SeqCst) {
            self.shared
                .logs
                .lock()
                .await
                .push("Interrupting calculation...".to_string());
        }
    }

    pub async fn status(&self) -> RunnerStatus {
        if self.shared.interrupt.load(Ordering::SeqCst) {
            return if self.is_finished() {
                RunnerStatus::Interrupted
            } else {
                RunnerStatus::Interrupting
            };
        }
        // read the published project rather than the task state, so that Done
        // is never reported before the final snapshot is visible
        let snapshot = self.shared.snapshot.lock().await;
        if snapshot.errored {
            RunnerStatus::Errored
        } else if snapshot.progress >= self.target {
            RunnerStatus::Done
        } else {
            RunnerStatus::Running
        }
    }

    /// Waits for the run to finish and returns the final project.
    pub async fn join(self) -> InternalResult<Project> {
        let (project, result) = self
            .handle
            .await
            .map_err(|e| CrateError::Internal(format!("Runner task failed: {}", e)))?;
        result?;
        Ok(project)
    }
}
