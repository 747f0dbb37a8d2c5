/// Shader stage types and the GPU shader module handle

use bitflags::bitflags;

/// Shader stage of a single compiled module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
    /// Compute shader
    Compute,
}

bitflags! {
    /// Shader stage visibility flags for descriptor bindings and
    /// push-constant ranges
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 0b001;
        const FRAGMENT = 0b010;
        const COMPUTE = 0b100;
    }
}

impl From<ShaderStage> for ShaderStageFlags {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => ShaderStageFlags::VERTEX,
            ShaderStage::Fragment => ShaderStageFlags::FRAGMENT,
            ShaderStage::Compute => ShaderStageFlags::COMPUTE,
        }
    }
}

/// Opaque handle to a GPU-resident shader module
///
/// The core never sees backend objects directly; backends map these ids to
/// their own types. Handles are destroyed explicitly through
/// `GraphicsDevice::destroy_shader_module` - destruction timing is governed
/// by the retirement/drain protocol, not by `Drop`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ShaderModuleHandle(pub u64);

impl ShaderModuleHandle {
    /// Null handle
    pub const NULL: Self = Self(0);

    /// Creates a new handle
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Is null
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl Default for ShaderModuleHandle {
    fn default() -> Self {
        Self::NULL
    }
}

/// Descriptor for creating a GPU shader module from SPIR-V words
#[derive(Debug, Clone)]
pub struct ShaderModuleDesc<'a> {
    /// Shader stage the module will be bound to
    pub stage: ShaderStage,
    /// SPIR-V bytecode
    pub code: &'a [u32],
    /// Entry point name ("main" for GLSL-derived modules)
    pub entry_point: &'a str,
}
