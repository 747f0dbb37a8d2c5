/*!
# SdfRay Engine - Vulkan Backend

Vulkan implementation of the `sdf_ray_engine` device capability trait, using
the Ash library for Vulkan bindings, plus the GLSL-to-SPIR-V compiler
(`naga`) that feeds the engine's shader units.

The backend wraps an already-created `ash::Device` handed in by the host's
window/device layer; it never discovers or enumerates devices itself. All
pipeline creation runs through one shared `VkPipelineCache`.
*/

// Vulkan implementation modules
mod glsl_compiler;
mod vulkan_device;

pub use glsl_compiler::NagaCompiler;
pub use vulkan_device::VulkanGraphicsDevice;

// Main sdfray namespace module, mirroring the core crate
pub mod sdfray {
    pub use crate::glsl_compiler::NagaCompiler;
    pub use crate::vulkan_device::VulkanGraphicsDevice;
}
