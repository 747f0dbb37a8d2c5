//! Material - one renderable "look" and its resource ownership boundary
//!
//! A material aggregates the shader units it depends on, the descriptor
//! layout-binding metadata and push-constant range its pipelines are built
//! against, the fixed-function state of those pipelines, and the swap
//! tracker holding the active pipeline plus everything retired and waiting
//! to drain. The material is the sole owner of all of it; teardown releases
//! every GPU object it ever created.

use crate::graphics_device::{
    ColorBlendState, DepthStencilState, GraphicsDevice, LayoutBinding, MultisampleState,
    PrimitiveTopology, PushConstantRange, RasterizationState, ShaderStage, ShaderStageFlags,
    VertexLayout,
};
use crate::shader::unit::RetiredModuleQueue;
use crate::shader::{CompileExecutor, ShaderCompiler, ShaderUnit};
use crate::swap::tracker::{ObservedFrame, SwapTracker};
use crate::swap::ActivePipeline;
use crate::engine_warn;
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Material creation descriptor
#[derive(Debug, Clone)]
pub struct MaterialDesc {
    /// Whether the material's pipeline may be rebuilt and swapped live
    /// (graph-driven materials); fixed materials build once
    pub hot_swappable: bool,
    /// Descriptor-set-layout binding slots (one set)
    pub layout_bindings: Vec<LayoutBinding>,
    /// Push-constant range (optional)
    pub push_constant_range: Option<PushConstantRange>,
    /// Vertex input layout
    pub vertex_layout: VertexLayout,
    /// Primitive topology
    pub topology: PrimitiveTopology,
    /// Rasterization state
    pub rasterization: RasterizationState,
    /// Depth testing state
    pub depth_stencil: DepthStencilState,
    /// Color blending state
    pub color_blend: ColorBlendState,
    /// Multisampling state
    pub multisample: MultisampleState,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            hot_swappable: false,
            layout_bindings: Vec::new(),
            push_constant_range: None,
            vertex_layout: VertexLayout::default(),
            topology: PrimitiveTopology::TriangleList,
            rasterization: RasterizationState::default(),
            depth_stencil: DepthStencilState::default(),
            color_blend: ColorBlendState::default(),
            multisample: MultisampleState::default(),
        }
    }
}

impl MaterialDesc {
    /// Set a push-constant range visible to the given stages
    pub fn with_push_constant_range(mut self, stages: ShaderStageFlags, offset: u32, size: u32) -> Self {
        self.push_constant_range = Some(PushConstantRange {
            stages,
            offset,
            size,
        });
        self
    }
}

/// One renderable "look": shader units + pipeline ownership boundary
pub struct Material {
    device: Arc<dyn GraphicsDevice>,
    hot_swappable: bool,
    vertex_unit: ShaderUnit,
    fragment_unit: ShaderUnit,
    layout_bindings: Vec<LayoutBinding>,
    push_constant_range: Option<PushConstantRange>,
    vertex_layout: VertexLayout,
    topology: PrimitiveTopology,
    rasterization: RasterizationState,
    depth_stencil: DepthStencilState,
    color_blend: ColorBlendState,
    multisample: MultisampleState,
    swap: Mutex<SwapTracker>,
    retired_modules: RetiredModuleQueue,
    destroyed: AtomicBool,
}

impl Material {
    /// Create a material and its shader units
    ///
    /// # Arguments
    ///
    /// * `device` - Injected device capability
    /// * `compiler` - Shader text compiler shared across materials
    /// * `executor` - Background compile lane shared across materials
    /// * `desc` - Material configuration
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        compiler: Arc<dyn ShaderCompiler>,
        executor: Arc<CompileExecutor>,
        desc: MaterialDesc,
    ) -> Self {
        let retired_modules = RetiredModuleQueue::default();
        let vertex_unit = ShaderUnit::with_retire_queue(
            ShaderStage::Vertex,
            device.clone(),
            compiler.clone(),
            executor.clone(),
            retired_modules.clone(),
        );
        let fragment_unit = ShaderUnit::with_retire_queue(
            ShaderStage::Fragment,
            device.clone(),
            compiler,
            executor,
            retired_modules.clone(),
        );

        Self {
            device,
            hot_swappable: desc.hot_swappable,
            vertex_unit,
            fragment_unit,
            layout_bindings: desc.layout_bindings,
            push_constant_range: desc.push_constant_range,
            vertex_layout: desc.vertex_layout,
            topology: desc.topology,
            rasterization: desc.rasterization,
            depth_stencil: desc.depth_stencil,
            color_blend: desc.color_blend,
            multisample: desc.multisample,
            swap: Mutex::new(SwapTracker::new()),
            retired_modules,
            destroyed: AtomicBool::new(false),
        }
    }

    // ===== SHADER UNITS =====

    /// Vertex stage unit
    pub fn vertex_unit(&self) -> &ShaderUnit {
        &self.vertex_unit
    }

    /// Fragment stage unit
    pub fn fragment_unit(&self) -> &ShaderUnit {
        &self.fragment_unit
    }

    // ===== CONFIGURATION ACCESS =====

    /// Whether the material participates in live pipeline swapping
    pub fn is_hot_swappable(&self) -> bool {
        self.hot_swappable
    }

    pub fn layout_bindings(&self) -> &[LayoutBinding] {
        &self.layout_bindings
    }

    pub fn push_constant_range(&self) -> Option<PushConstantRange> {
        self.push_constant_range
    }

    pub fn vertex_layout(&self) -> &VertexLayout {
        &self.vertex_layout
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn rasterization(&self) -> RasterizationState {
        self.rasterization
    }

    pub fn depth_stencil(&self) -> DepthStencilState {
        self.depth_stencil
    }

    pub fn color_blend(&self) -> ColorBlendState {
        self.color_blend
    }

    pub fn multisample(&self) -> MultisampleState {
        self.multisample
    }

    // ===== RENDER-THREAD INTERFACE =====

    /// Currently published pipeline (non-blocking, no observation recorded)
    pub fn active_pipeline(&self) -> Option<ActivePipeline> {
        self.swap.lock().active_view()
    }

    /// Published pipeline for drawing in `frame` (non-blocking)
    ///
    /// Records that `frame` references the returned pipeline; the
    /// coordinator will not destroy it until the render thread reports that
    /// frame complete.
    pub fn bind_for_frame(&self, frame: u64) -> Option<ActivePipeline> {
        let mut swap = self.swap.lock();
        let view = swap.active_view();
        if let Some(active) = view {
            swap.observed = Some(ObservedFrame {
                frame,
                generation: active.generation,
            });
        }
        view
    }

    /// Generation of the published pipeline (0 before the first publish)
    pub fn generation(&self) -> u64 {
        self.swap.lock().active.as_ref().map_or(0, |p| p.generation())
    }

    /// Current hot-swap state
    pub fn swap_state(&self) -> crate::swap::SwapState {
        self.swap.lock().state
    }

    // ===== COORDINATOR INTERFACE =====

    pub(crate) fn swap_tracker(&self) -> MutexGuard<'_, SwapTracker> {
        self.swap.lock()
    }

    pub(crate) fn drain_retired_modules(&self) -> Vec<crate::graphics_device::ShaderModuleHandle> {
        self.retired_modules.drain()
    }

    // ===== TEARDOWN =====

    /// Whether `destroy` has run
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Release every GPU object the material owns
    ///
    /// Drains all pending swaps and retired batches unconditionally; the
    /// caller must ensure the device is idle first. Idempotent.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            engine_warn!("sdfray::Material", "destroy() called twice; ignoring");
            return;
        }

        let mut swap = self.swap.lock();
        if let Some(pending) = swap.pending.take() {
            pending.release(self.device.as_ref());
        }
        if let Some(active) = swap.active.take() {
            active.release(self.device.as_ref());
        }
        for batch in swap.retired.drain(..) {
            if let Some(pipeline) = batch.pipeline {
                pipeline.release(self.device.as_ref());
            }
            for module in batch.modules {
                self.device.destroy_shader_module(module);
            }
        }
        drop(swap);

        // Invalidate the units first: any compile still in flight now
        // discards its result instead of retiring into the queue drained
        // below.
        let vertex_module = self.vertex_unit.release_module();
        if !vertex_module.is_null() {
            self.device.destroy_shader_module(vertex_module);
        }
        let fragment_module = self.fragment_unit.release_module();
        if !fragment_module.is_null() {
            self.device.destroy_shader_module(fragment_module);
        }

        for module in self.retired_modules.drain() {
            self.device.destroy_shader_module(module);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
