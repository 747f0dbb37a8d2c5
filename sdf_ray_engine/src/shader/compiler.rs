//! Shader compiler front
//!
//! The compiler is stateless from the caller's point of view: text in,
//! SPIR-V words or a diagnostic out. The backend compiler is only safe to
//! invoke once at a time per process, so every text compile in the system is
//! routed through the single `CompileExecutor` lane; implementations never
//! need their own locking for that constraint.

use crate::graphics_device::ShaderStage;

/// Outcome of a compile request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStatus {
    /// Compilation produced a SPIR-V blob
    Success,
    /// Compilation failed; see the diagnostic
    Failure,
}

/// Result of one compiler invocation
///
/// Produced once per compile request and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    /// SPIR-V words (empty on failure)
    pub spirv: Vec<u32>,
    /// Success/failure status
    pub status: CompileStatus,
    /// Diagnostic text (empty on success)
    pub diagnostic: String,
}

impl CompiledShader {
    /// Successful compile
    pub fn success(spirv: Vec<u32>) -> Self {
        Self {
            spirv,
            status: CompileStatus::Success,
            diagnostic: String::new(),
        }
    }

    /// Failed compile with a diagnostic
    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            spirv: Vec::new(),
            status: CompileStatus::Failure,
            diagnostic: diagnostic.into(),
        }
    }

    /// Whether compilation succeeded
    pub fn is_ok(&self) -> bool {
        self.status == CompileStatus::Success
    }
}

/// Shader text compiler
///
/// Implementations must not panic on invalid source; failures are reported
/// through `CompiledShader::failure` with a human-readable diagnostic.
pub trait ShaderCompiler: Send + Sync {
    /// Compile shader text for the given stage into SPIR-V
    fn compile(&self, stage: ShaderStage, source: &str) -> CompiledShader;
}

// ============================================================================
// Mock compiler for unit tests
// ============================================================================


// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
