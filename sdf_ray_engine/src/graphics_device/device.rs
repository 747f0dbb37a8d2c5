/// GraphicsDevice trait - device-level capability interface
///
/// The central factory interface for creating and destroying the GPU objects
/// the shader/pipeline subsystem manages. Implemented by backend crates
/// (e.g. VulkanGraphicsDevice) over an already-created logical device; the
/// core never discovers or enumerates devices itself. Instances are injected
/// at construction wherever they are needed.

use crate::error::Result;
use crate::graphics_device::pipeline::{
    DescriptorSetLayoutHandle, LayoutBinding, PipelineDesc, PipelineHandle, PipelineLayoutDesc,
    PipelineLayoutHandle,
};
use crate::graphics_device::shader::{ShaderModuleDesc, ShaderModuleHandle};

/// Subsystem configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable validation/debug layers in the backend
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Name of the background shader-compile worker thread
    pub compile_thread_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "SdfRay Application".to_string(),
            app_version: (1, 0, 0),
            compile_thread_name: "shader-compile".to_string(),
        }
    }
}

/// Device capability trait
///
/// All creation methods return opaque handles; destruction is explicit and
/// infallible. Implementations must be safe to call from the background
/// compile worker and the build path concurrently (`Send + Sync`), but the
/// caller remains responsible for never destroying an object the GPU may
/// still read - that ordering is what the hot-swap coordinator's drain
/// protocol provides.
pub trait GraphicsDevice: Send + Sync {
    /// Create a shader module from SPIR-V bytecode
    ///
    /// # Arguments
    ///
    /// * `desc` - Shader module descriptor
    ///
    /// # Returns
    ///
    /// An opaque handle to the created module
    fn create_shader_module(&self, desc: &ShaderModuleDesc) -> Result<ShaderModuleHandle>;

    /// Destroy a shader module
    fn destroy_shader_module(&self, module: ShaderModuleHandle);

    /// Create a descriptor set layout from binding slots
    fn create_descriptor_set_layout(
        &self,
        bindings: &[LayoutBinding],
    ) -> Result<DescriptorSetLayoutHandle>;

    /// Destroy a descriptor set layout
    fn destroy_descriptor_set_layout(&self, layout: DescriptorSetLayoutHandle);

    /// Create a pipeline layout from set layouts and push-constant ranges
    fn create_pipeline_layout(&self, desc: &PipelineLayoutDesc) -> Result<PipelineLayoutHandle>;

    /// Destroy a pipeline layout
    fn destroy_pipeline_layout(&self, layout: PipelineLayoutHandle);

    /// Create a graphics pipeline
    ///
    /// Backends route every creation through one shared pipeline cache to
    /// amortize recompilation cost; callers serialize pipeline creation
    /// through `PipelineBuilder` accordingly.
    fn create_graphics_pipeline(&self, desc: &PipelineDesc) -> Result<PipelineHandle>;

    /// Destroy a graphics pipeline
    fn destroy_pipeline(&self, pipeline: PipelineHandle);
}
