//! Single-flight compile scheduling
//!
//! At most one compile runs. A request that arrives while busy becomes the
//! one pending job (newest wins) and starts when the running job completes,
//! however it completed.

use serde::Serialize;

/// A document version queued for rendering
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompileJob {
    pub version: u64,
    /// Prepared source, markers and grid already injected
    pub source: String,
}

/// What the host must do after a scheduler call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchedulerAction {
    Start(CompileJob),
    CancelRunning,
}

#[derive(Clone, Debug, Default)]
pub struct CompileScheduler {
    running: Option<u64>,
    pending: Option<CompileJob>,
    cancel_requested: bool,
}

impl CompileScheduler {
    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    /// Ask for a compile; `cancel_running` asks to abort an in-flight job
    pub fn request(&mut self, job: CompileJob, cancel_running: bool) -> Vec<SchedulerAction> {
        if self.running.is_none() {
            self.running = Some(job.version);
            return vec![SchedulerAction::Start(job)];
        }

        if let Some(old) = self.pending.replace(job) {
            log::debug!("[Compile] pending job v{} superseded", old.version);
        }
        if cancel_running && !self.cancel_requested {
            self.cancel_requested = true;
            return vec![SchedulerAction::CancelRunning];
        }
        Vec::new()
    }

    /// The running job completed; returns the pending job to start, if any
    pub fn finished(&mut self, version: u64) -> Option<CompileJob> {
        if self.running != Some(version) {
            log::warn!(
                "[Compile] completion for v{version}, but v{:?} was running",
                self.running
            );
        }
        self.running = None;
        self.cancel_requested = false;

        let next = self.pending.take()?;
        self.running = Some(next.version);
        Some(next)
    }
}
