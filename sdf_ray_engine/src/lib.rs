/*!
# SdfRay Engine

Core types for a signed-distance-field raymarching renderer whose fragment
shader is regenerated live from a node graph. This crate contains the
backend-agnostic half of the system: asynchronous shader compilation units,
materials, pipeline building, and the hot-swap coordinator that replaces a
material's active pipeline while a render thread keeps issuing frames.

Backend implementations (Vulkan via `ash`) live in sibling crates and plug in
through the `GraphicsDevice` capability trait.

## Architecture

- **GraphicsDevice**: capability trait for creating/destroying GPU objects
- **ShaderUnit**: async load/compile/build of one shader stage
- **Material**: aggregate of shader units + pipeline ownership boundary
- **PipelineBuilder**: turns a material's ready shaders into a pipeline
- **HotSwapCoordinator**: publishes new pipelines and retires old ones
  only after every frame that referenced them has drained

The render thread never blocks on compilation; it only ever sees the
currently published pipeline for each material.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod shader;
pub mod material;
pub mod pipeline;
pub mod swap;

// Main sdfray namespace module
pub mod sdfray {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine facade (logger plumbing)
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Device capability sub-module
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Shader sub-module
    pub mod shader {
        pub use crate::shader::*;
    }

    // Material sub-module
    pub mod material {
        pub use crate::material::*;
    }

    // Pipeline sub-module
    pub mod pipeline {
        pub use crate::pipeline::*;
    }

    // Hot-swap sub-module
    pub mod swap {
        pub use crate::swap::*;
    }
}

// Flat re-exports for the common types
pub use error::{Error, Result};
pub use engine::Engine;
pub use graphics_device::{Config, GraphicsDevice};
pub use material::{Material, MaterialDesc, MaterialKey, MaterialRegistry};
pub use pipeline::{PipelineBuilder, PipelineObject};
pub use shader::{
    CompileExecutor, CompiledResult, CompiledShader, ShaderCompiler, ShaderSource, ShaderStatus,
    ShaderUnit,
};
pub use swap::{ActivePipeline, HotSwapCoordinator, SwapState};
