//! Unit tests for the compile execution lane

use crate::shader::executor::CompileExecutor;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::ThreadId;

/// Wait until `count` entries have been pushed
struct Gate {
    entries: Mutex<Vec<usize>>,
    done: Condvar,
}

impl Gate {
    fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            done: Condvar::new(),
        }
    }

    fn push(&self, value: usize) {
        self.entries.lock().push(value);
        self.done.notify_all();
    }

    fn wait_for(&self, count: usize) -> Vec<usize> {
        let mut entries = self.entries.lock();
        while entries.len() < count {
            self.done.wait(&mut entries);
        }
        entries.clone()
    }
}

#[test]
fn test_jobs_run_in_submission_order() {
    let executor = CompileExecutor::new("compile-test").unwrap();
    let gate = Arc::new(Gate::new());

    for i in 0..8 {
        let gate = gate.clone();
        executor.execute(move || gate.push(i));
    }

    assert_eq!(gate.wait_for(8), (0..8).collect::<Vec<_>>());
}

#[test]
fn test_single_serialized_lane() {
    let executor = CompileExecutor::new("compile-test").unwrap();
    let thread_ids: Arc<Mutex<Vec<ThreadId>>> = Arc::new(Mutex::new(Vec::new()));
    let gate = Arc::new(Gate::new());

    for i in 0..4 {
        let thread_ids = thread_ids.clone();
        let gate = gate.clone();
        executor.execute(move || {
            thread_ids.lock().push(std::thread::current().id());
            gate.push(i);
        });
    }
    gate.wait_for(4);

    let ids = thread_ids.lock();
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_worker_thread_is_named() {
    let executor = CompileExecutor::new("shader-compile").unwrap();
    let gate = Arc::new(Gate::new());
    let name: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    let gate_clone = gate.clone();
    let name_clone = name.clone();
    executor.execute(move || {
        *name_clone.lock() = std::thread::current().name().map(String::from);
        gate_clone.push(0);
    });
    gate.wait_for(1);

    assert_eq!(name.lock().as_deref(), Some("shader-compile"));
}

#[test]
fn test_drop_joins_worker() {
    let executor = CompileExecutor::new("compile-test").unwrap();
    let gate = Arc::new(Gate::new());
    let gate_clone = gate.clone();
    executor.execute(move || gate_clone.push(0));
    gate.wait_for(1);
    // Must not hang
    drop(executor);
}
