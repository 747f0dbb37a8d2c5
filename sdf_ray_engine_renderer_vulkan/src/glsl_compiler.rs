//! NagaCompiler - GLSL to SPIR-V compilation for the shader units
//!
//! Wraps the `naga` GLSL front-end, validator, and SPIR-V back-end behind
//! the core `ShaderCompiler` trait. Failures never panic; they come back as
//! `CompiledShader::failure` with the diagnostic rendered against the
//! source, so graph-generated shaders with errors surface in the editor
//! instead of taking the process down.
//!
//! Invocations are serialized by the core's single compile lane; the
//! compiler itself keeps no mutable state.

use sdf_ray_engine::graphics_device::ShaderStage;
use sdf_ray_engine::shader::{CompiledShader, ShaderCompiler};

/// GLSL to SPIR-V compiler
#[derive(Default)]
pub struct NagaCompiler;

impl NagaCompiler {
    pub fn new() -> Self {
        Self
    }
}

fn naga_stage(stage: ShaderStage) -> naga::ShaderStage {
    match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
        ShaderStage::Compute => naga::ShaderStage::Compute,
    }
}

fn expected_execution_model(stage: ShaderStage) -> spirq::spirv::ExecutionModel {
    match stage {
        ShaderStage::Vertex => spirq::spirv::ExecutionModel::Vertex,
        ShaderStage::Fragment => spirq::spirv::ExecutionModel::Fragment,
        ShaderStage::Compute => spirq::spirv::ExecutionModel::GLCompute,
    }
}

/// Cross-check the emitted SPIR-V: the module must reflect cleanly and
/// expose an entry point of the stage that was requested.
fn validate_entry_point(words: &[u32], stage: ShaderStage) -> Result<(), String> {
    let entry_points = spirq::ReflectConfig::new()
        .spv(words)
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| format!("SPIR-V reflection failed: {:?}", e))?;

    let expected = expected_execution_model(stage);
    if entry_points.iter().any(|ep| ep.exec_model == expected) {
        Ok(())
    } else {
        Err(format!(
            "compiled module has no {:?} entry point",
            stage
        ))
    }
}

impl ShaderCompiler for NagaCompiler {
    fn compile(&self, stage: ShaderStage, source: &str) -> CompiledShader {
        let mut frontend = naga::front::glsl::Frontend::default();
        let options = naga::front::glsl::Options::from(naga_stage(stage));

        let module = match frontend.parse(&options, source) {
            Ok(module) => module,
            Err(errors) => return CompiledShader::failure(errors.emit_to_string(source)),
        };

        let info = match naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        {
            Ok(info) => info,
            Err(error) => return CompiledShader::failure(error.emit_to_string(source)),
        };

        let spv_options = naga::back::spv::Options::default();
        let words = match naga::back::spv::write_vec(&module, &info, &spv_options, None) {
            Ok(words) => words,
            Err(error) => {
                return CompiledShader::failure(format!("SPIR-V generation failed: {}", error))
            }
        };

        if let Err(diagnostic) = validate_entry_point(&words, stage) {
            return CompiledShader::failure(diagnostic);
        }

        CompiledShader::success(words)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "glsl_compiler_tests.rs"]
mod tests;
