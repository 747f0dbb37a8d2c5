//! ShaderUnit - asynchronous load/compile/build of one shader stage
//!
//! A unit owns the background task that turns a `ShaderSource` into a GPU
//! shader module, caches the resulting handle, and exposes the non-blocking
//! `poll_ready` / blocking `wait` protocol the pipeline builder relies on.
//!
//! Status transitions are monotonic per submission:
//! `Idle -> Loading -> {Ready, Failed}`. Re-submitting while a previous
//! compile is still in flight does not cancel it; the unit stamps every
//! submission with a counter and discards any result whose stamp is no
//! longer current when it completes. Only the latest submission is ever
//! observable.

use crate::graphics_device::{GraphicsDevice, ShaderModuleDesc, ShaderModuleHandle, ShaderStage};
use crate::shader::compiler::ShaderCompiler;
use crate::shader::executor::CompileExecutor;
use crate::shader::source::{ShaderSource, SourcePayload};
use crate::{engine_error, engine_warn};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Entry point used for every module the subsystem creates
const SHADER_ENTRY_POINT: &str = "main";

/// Shader unit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStatus {
    /// No submission yet (or reset)
    Idle,
    /// A submission is compiling/loading in the background
    Loading,
    /// The latest submission produced a cached shader module
    Ready,
    /// The latest submission failed; see the diagnostic
    Failed,
}

/// Snapshot returned by `ShaderUnit::wait`
#[derive(Debug, Clone)]
pub struct CompiledResult {
    /// Status after the latest submission resolved
    pub status: ShaderStatus,
    /// Last successfully built module (NULL if none). On `Failed` this is
    /// still the previous good module - a failed recompile never unloads
    /// the shader that is in use.
    pub module: ShaderModuleHandle,
    /// Compiler/device diagnostic (empty unless `Failed`)
    pub diagnostic: String,
}

/// Queue of shader modules superseded by a newer compile, awaiting
/// retirement together with the next pipeline swap
#[derive(Clone, Default)]
pub(crate) struct RetiredModuleQueue {
    modules: Arc<Mutex<Vec<ShaderModuleHandle>>>,
}

impl RetiredModuleQueue {
    pub(crate) fn push(&self, module: ShaderModuleHandle) {
        self.modules.lock().push(module);
    }

    pub(crate) fn drain(&self) -> Vec<ShaderModuleHandle> {
        std::mem::take(&mut *self.modules.lock())
    }
}

struct UnitInner {
    status: ShaderStatus,
    module: ShaderModuleHandle,
    diagnostic: String,
    /// Monotonic stamp; a background job only installs its result while its
    /// stamp is still the current one
    submission: u64,
}

struct UnitShared {
    inner: Mutex<UnitInner>,
    resolved: Condvar,
}

impl UnitShared {
    fn new() -> Self {
        Self {
            inner: Mutex::new(UnitInner {
                status: ShaderStatus::Idle,
                module: ShaderModuleHandle::NULL,
                diagnostic: String::new(),
                submission: 0,
            }),
            resolved: Condvar::new(),
        }
    }

    /// True when `submission` is no longer the latest one
    fn is_stale(&self, submission: u64) -> bool {
        self.inner.lock().submission != submission
    }

    fn fail(&self, submission: u64, diagnostic: String) {
        let mut inner = self.inner.lock();
        if inner.submission != submission {
            return;
        }
        inner.status = ShaderStatus::Failed;
        inner.diagnostic = diagnostic;
        self.resolved.notify_all();
    }

    fn install(
        &self,
        submission: u64,
        module: ShaderModuleHandle,
        device: &Arc<dyn GraphicsDevice>,
        retired: &RetiredModuleQueue,
    ) {
        let mut inner = self.inner.lock();
        if inner.submission != submission {
            // Superseded while in flight: the module was never visible, so
            // no drain barrier applies.
            drop(inner);
            device.destroy_shader_module(module);
            return;
        }
        let previous = std::mem::replace(&mut inner.module, module);
        inner.status = ShaderStatus::Ready;
        inner.diagnostic.clear();
        self.resolved.notify_all();
        drop(inner);

        if !previous.is_null() {
            retired.push(previous);
        }
    }
}

/// Asynchronous shader stage loader
pub struct ShaderUnit {
    stage: ShaderStage,
    shared: Arc<UnitShared>,
    device: Arc<dyn GraphicsDevice>,
    compiler: Arc<dyn ShaderCompiler>,
    executor: Arc<CompileExecutor>,
    retired: RetiredModuleQueue,
}

impl ShaderUnit {
    /// Create a unit with its own retirement queue
    pub fn new(
        stage: ShaderStage,
        device: Arc<dyn GraphicsDevice>,
        compiler: Arc<dyn ShaderCompiler>,
        executor: Arc<CompileExecutor>,
    ) -> Self {
        Self::with_retire_queue(stage, device, compiler, executor, RetiredModuleQueue::default())
    }

    /// Create a unit that retires superseded modules into `retired`
    /// (shared with the owning material)
    pub(crate) fn with_retire_queue(
        stage: ShaderStage,
        device: Arc<dyn GraphicsDevice>,
        compiler: Arc<dyn ShaderCompiler>,
        executor: Arc<CompileExecutor>,
        retired: RetiredModuleQueue,
    ) -> Self {
        Self {
            stage,
            shared: Arc::new(UnitShared::new()),
            device,
            compiler,
            executor,
            retired,
        }
    }

    /// Shader stage this unit loads
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Submit a source for background compilation (non-blocking)
    ///
    /// Any previous uncollected result is discarded and the unit moves to
    /// `Loading`. An in-flight compile for an earlier submission is not
    /// cancelled; its result is discarded when it completes.
    pub fn submit(&self, source: ShaderSource) {
        if source.is_precompiled() && source.has_partials() {
            engine_warn!(
                "sdfray::ShaderUnit",
                "Partial fragments cannot be merged into precompiled bytecode; ignoring them"
            );
        }

        let submission = {
            let mut inner = self.shared.inner.lock();
            inner.submission += 1;
            inner.status = ShaderStatus::Loading;
            inner.diagnostic.clear();
            inner.submission
        };

        let stage = self.stage;
        let shared = self.shared.clone();
        let device = self.device.clone();
        let compiler = self.compiler.clone();
        let retired = self.retired.clone();

        self.executor.execute(move || {
            let words = match source.payload() {
                SourcePayload::Spirv(words) => words.clone(),
                SourcePayload::Text(_) => {
                    // merged_text is always Some for text payloads
                    let merged = source.merged_text().unwrap_or_default();
                    let compiled = compiler.compile(stage, &merged);
                    if !compiled.is_ok() {
                        engine_warn!(
                            "sdfray::ShaderUnit",
                            "Failed to compile {:?} shader: {}",
                            stage,
                            compiled.diagnostic
                        );
                        shared.fail(submission, compiled.diagnostic);
                        return;
                    }
                    compiled.spirv
                }
            };

            // Superseded while compiling: skip module creation entirely.
            if shared.is_stale(submission) {
                return;
            }

            let desc = ShaderModuleDesc {
                stage,
                code: &words,
                entry_point: SHADER_ENTRY_POINT,
            };
            match device.create_shader_module(&desc) {
                Ok(module) => shared.install(submission, module, &device, &retired),
                Err(e) => {
                    engine_error!(
                        "sdfray::ShaderUnit",
                        "Failed to create {:?} shader module: {}",
                        stage,
                        e
                    );
                    shared.fail(submission, e.to_string());
                }
            }
        });
    }

    /// Non-blocking readiness query
    pub fn poll_ready(&self) -> bool {
        self.shared.inner.lock().status == ShaderStatus::Ready
    }

    /// Current status
    pub fn status(&self) -> ShaderStatus {
        self.shared.inner.lock().status
    }

    /// Last successfully built module (NULL if none yet)
    pub fn module(&self) -> ShaderModuleHandle {
        self.shared.inner.lock().module
    }

    /// Block until the latest submission resolves
    ///
    /// Returns immediately when no submission is in flight. This is the
    /// only blocking call in the subsystem; the render thread must not use
    /// it inside its per-frame path except at first load.
    pub fn wait(&self) -> CompiledResult {
        let mut inner = self.shared.inner.lock();
        while inner.status == ShaderStatus::Loading {
            self.shared.resolved.wait(&mut inner);
        }
        CompiledResult {
            status: inner.status,
            module: inner.module,
            diagnostic: inner.diagnostic.clone(),
        }
    }

    /// Discard the current result and return to `Idle`
    ///
    /// The cached module (if any) is moved to the retirement queue; any
    /// in-flight compile is invalidated and will be discarded on
    /// completion.
    pub fn reset(&self) {
        let previous = {
            let mut inner = self.shared.inner.lock();
            inner.submission += 1;
            inner.status = ShaderStatus::Idle;
            inner.diagnostic.clear();
            std::mem::replace(&mut inner.module, ShaderModuleHandle::NULL)
        };
        if !previous.is_null() {
            self.retired.push(previous);
        }
    }

    /// Take the cached module out for teardown, leaving the unit `Idle`
    ///
    /// Unlike `reset`, the module is handed to the caller (the owning
    /// material) for immediate destruction instead of being queued.
    pub(crate) fn release_module(&self) -> ShaderModuleHandle {
        let mut inner = self.shared.inner.lock();
        inner.submission += 1;
        inner.status = ShaderStatus::Idle;
        inner.diagnostic.clear();
        std::mem::replace(&mut inner.module, ShaderModuleHandle::NULL)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "unit_tests.rs"]
mod tests;
