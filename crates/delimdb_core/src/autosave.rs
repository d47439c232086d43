//! Single-flight background saving.
//!
//! The coordinator owns one task slot. Scheduling while idle starts a
//! worker thread that runs the save job; scheduling while a save runs only
//! marks a rerun, and the worker runs the job once more before going idle.
//! A burst of mutations during one save therefore costs at most one extra
//! save, and the state after the last mutation is always written.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

/// Name given to worker threads.
const WORKER_NAME: &str = "delimdb-autosave";

/// A save job run by the worker.
pub(crate) type SaveJob = Arc<dyn Fn() + Send + Sync>;

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    /// No save is running.
    Idle,
    /// A save is running.
    Saving,
    /// A save is running and another was requested meanwhile.
    Rerun,
}

#[derive(Debug)]
struct Slot {
    phase: SavePhase,
    handle: Option<JoinHandle<()>>,
    closed: bool,
}

/// Serializes background saves into at most one in-flight run.
#[derive(Debug)]
pub struct AutoSaver {
    slot: Arc<Mutex<Slot>>,
}

impl Default for AutoSaver {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoSaver {
    /// Creates an idle coordinator.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                phase: SavePhase::Idle,
                handle: None,
                closed: false,
            })),
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> SavePhase {
        self.slot.lock().phase
    }

    /// Returns true once [`AutoSaver::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.slot.lock().closed
    }

    /// Requests a run of `job`.
    ///
    /// Returns true if a new worker was started. The caller must not hold
    /// any lock the job takes.
    pub(crate) fn schedule(&self, job: SaveJob) -> bool {
        let mut slot = self.slot.lock();
        if slot.closed {
            return false;
        }

        match slot.phase {
            SavePhase::Saving => {
                slot.phase = SavePhase::Rerun;
                false
            }
            SavePhase::Rerun => false,
            SavePhase::Idle => {
                // The previous worker already left its loop.
                if let Some(finished) = slot.handle.take() {
                    if finished.join().is_err() {
                        tracing::warn!("auto-save worker panicked");
                    }
                }

                slot.phase = SavePhase::Saving;
                let shared = Arc::clone(&self.slot);
                tracing::trace!("autosave.spawn");
                match thread::Builder::new()
                    .name(WORKER_NAME.to_string())
                    .spawn(move || run_worker(&shared, job.as_ref()))
                {
                    Ok(handle) => {
                        slot.handle = Some(handle);
                        true
                    }
                    Err(e) => {
                        slot.phase = SavePhase::Idle;
                        tracing::warn!(error = %e, "could not start auto-save worker");
                        false
                    }
                }
            }
        }
    }

    /// Blocks until the current worker, if any, has finished.
    pub fn wait_idle(&self) {
        let handle = self.slot.lock().handle.take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::warn!("auto-save worker panicked");
            }
        }
    }

    /// Disables scheduling and waits for the current worker.
    pub fn close(&self) {
        self.slot.lock().closed = true;
        self.wait_idle();
    }
}

fn run_worker(slot: &Mutex<Slot>, job: &(dyn Fn() + Send + Sync)) {
    loop {
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::warn!("auto-save job panicked");
        }

        let mut slot = slot.lock();
        if slot.phase == SavePhase::Rerun {
            slot.phase = SavePhase::Saving;
            continue;
        }
        slot.phase = SavePhase::Idle;
        break;
    }
}
