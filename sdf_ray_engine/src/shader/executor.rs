//! Background compile execution lane
//!
//! All shader compilation and module creation runs on one dedicated worker
//! thread. A single thread is not an implementation shortcut: the text
//! compiler backend must only ever run one invocation per process at a time,
//! so the job queue doubles as the serialization lane for it. Jobs are
//! executed strictly in submission order.

use crate::engine_err;
use crate::error::Result;
use crossbeam::channel::{unbounded, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Serialized background execution lane for shader work
///
/// Dropping the executor signals shutdown, discards jobs that have not
/// started, and joins the worker thread.
pub struct CompileExecutor {
    sender: Option<Sender<Job>>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl CompileExecutor {
    /// Spawn the compile worker thread
    ///
    /// # Arguments
    ///
    /// * `thread_name` - OS thread name (see `Config::compile_thread_name`)
    pub fn new(thread_name: &str) -> Result<Self> {
        let (sender, receiver) = unbounded::<Job>();
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker_shutdown = shutdown.clone();

        let worker = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    if worker_shutdown.load(Ordering::Relaxed) {
                        break;
                    }
                    job();
                }
            })
            .map_err(|e| {
                engine_err!(
                    "sdfray::CompileExecutor",
                    "Failed to spawn compile worker thread: {}",
                    e
                )
            })?;

        Ok(Self {
            sender: Some(sender),
            shutdown,
            worker: Some(worker),
        })
    }

    /// Enqueue a job for execution on the worker thread (non-blocking)
    pub fn execute(&self, job: impl FnOnce() + Send + 'static) {
        if let Some(sender) = &self.sender {
            if sender.send(Box::new(job)).is_err() {
                crate::engine_warn!(
                    "sdfray::CompileExecutor",
                    "Compile worker is gone; job dropped"
                );
            }
        }
    }
}

impl Drop for CompileExecutor {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Disconnect the channel so the worker's recv() unblocks
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
