//! PipelineBuilder - turns a material's ready shaders into a pipeline
//!
//! The builder owns the only path that touches shared device-level caching
//! state: descriptor-set-layout creation, pipeline-layout creation, and
//! graphics-pipeline creation (which goes through the backend's shared
//! pipeline cache) all happen inside one mutual-exclusion section. Builds
//! for different materials may be issued from any thread; they serialize
//! only on that section.
//!
//! A build never mutates the material's active pipeline - it returns a new,
//! unattached `PipelineObject`. Publishing is the coordinator's job.

use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, PipelineDesc, PipelineLayoutDesc, ShaderModuleHandle, StageDesc,
};
use crate::material::Material;
use crate::pipeline::object::PipelineObject;
use crate::shader::{ShaderStatus, ShaderUnit};
use crate::engine_error;
use parking_lot::Mutex;
use std::sync::Arc;

/// Builds graphics pipelines from materials
pub struct PipelineBuilder {
    device: Arc<dyn GraphicsDevice>,
    // Guards the shared pipeline-cache/layout-creation critical section.
    build_lock: Mutex<()>,
}

impl PipelineBuilder {
    /// Create a builder over an injected device capability
    pub fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        Self {
            device,
            build_lock: Mutex::new(()),
        }
    }

    /// Build a new pipeline for `material`
    ///
    /// Blocks on any shader unit still `Loading`. Returns
    /// `Error::DependencyFailed` without touching the GPU when a required
    /// unit is `Failed` (or was never submitted).
    ///
    /// # Errors
    ///
    /// * `DependencyFailed` - a shader dependency is not `Ready`
    /// * `DeviceResource` / `Backend` - GPU object creation failed; any
    ///   partially created layout objects are destroyed before returning
    pub fn build(&self, material: &Material) -> Result<PipelineObject> {
        if material.is_destroyed() {
            return Err(Error::ProtocolViolation(
                "build() on a destroyed material".to_string(),
            ));
        }

        let vertex_module = Self::ensure_ready(material.vertex_unit())?;
        let fragment_module = Self::ensure_ready(material.fragment_unit())?;

        let _guard = self.build_lock.lock();

        let set_layout = self
            .device
            .create_descriptor_set_layout(material.layout_bindings())?;
        let set_layouts = vec![set_layout];

        let push_constant_ranges: Vec<_> = material.push_constant_range().into_iter().collect();
        let layout = match self.device.create_pipeline_layout(&PipelineLayoutDesc {
            set_layouts: &set_layouts,
            push_constant_ranges: &push_constant_ranges,
        }) {
            Ok(layout) => layout,
            Err(e) => {
                self.device.destroy_descriptor_set_layout(set_layout);
                return Err(e);
            }
        };

        let desc = PipelineDesc {
            stages: vec![
                StageDesc {
                    stage: material.vertex_unit().stage(),
                    module: vertex_module,
                    entry_point: "main".to_string(),
                },
                StageDesc {
                    stage: material.fragment_unit().stage(),
                    module: fragment_module,
                    entry_point: "main".to_string(),
                },
            ],
            vertex_layout: material.vertex_layout().clone(),
            topology: material.topology(),
            rasterization: material.rasterization(),
            depth_stencil: material.depth_stencil(),
            color_blend: material.color_blend(),
            multisample: material.multisample(),
            layout,
        };

        match self.device.create_graphics_pipeline(&desc) {
            Ok(pipeline) => Ok(PipelineObject::new(pipeline, layout, set_layouts)),
            Err(e) => {
                engine_error!(
                    "sdfray::PipelineBuilder",
                    "Graphics pipeline creation failed; keeping the material's last good pipeline: {}",
                    e
                );
                self.device.destroy_pipeline_layout(layout);
                self.device.destroy_descriptor_set_layout(set_layout);
                Err(e)
            }
        }
    }

    /// Wait out a `Loading` unit and require `Ready`
    fn ensure_ready(unit: &ShaderUnit) -> Result<ShaderModuleHandle> {
        if unit.status() == ShaderStatus::Ready {
            return Ok(unit.module());
        }

        // Blocks only while the unit is still Loading; Idle and Failed
        // resolve immediately.
        let result = unit.wait();
        match result.status {
            ShaderStatus::Ready => Ok(result.module),
            ShaderStatus::Failed => Err(Error::DependencyFailed(format!(
                "{:?} shader failed to compile: {}",
                unit.stage(),
                result.diagnostic
            ))),
            _ => Err(Error::DependencyFailed(format!(
                "{:?} shader was never submitted",
                unit.stage()
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
