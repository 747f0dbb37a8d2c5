//! Shader source descriptions
//!
//! A `ShaderSource` is the unit of work handed to a `ShaderUnit`: either raw
//! text to be compiled (optionally preceded by ordered partial fragments,
//! the way graph-generated code is spliced after a static helper library),
//! or already-compiled SPIR-V that skips the compiler entirely. Sources are
//! immutable once submitted.

use crate::error::{Error, Result};
use crate::graphics_device::ShaderStage;
use std::path::Path;

/// SPIR-V magic number (first word of any valid module)
const SPIRV_MAGIC: u32 = 0x0723_0203;

/// File extension marking pre-compiled bytecode
const SPIRV_EXTENSION: &str = "spv";

/// Payload of a shader source
#[derive(Debug, Clone)]
pub enum SourcePayload {
    /// Raw text; must be compiled before module creation
    Text(String),
    /// Pre-compiled SPIR-V words; compilation is skipped
    Spirv(Vec<u32>),
}

/// Immutable description of one shader stage's source
#[derive(Debug, Clone)]
pub struct ShaderSource {
    stage: ShaderStage,
    payload: SourcePayload,
    /// Partial source fragments concatenated ahead of the main text,
    /// in the order supplied
    partials: Vec<String>,
}

impl ShaderSource {
    /// Create a text source to be compiled
    pub fn text(stage: ShaderStage, source: impl Into<String>) -> Self {
        Self {
            stage,
            payload: SourcePayload::Text(source.into()),
            partials: Vec::new(),
        }
    }

    /// Create a source from pre-compiled SPIR-V words
    pub fn spirv(stage: ShaderStage, words: Vec<u32>) -> Self {
        Self {
            stage,
            payload: SourcePayload::Spirv(words),
            partials: Vec::new(),
        }
    }

    /// Create a source from pre-compiled SPIR-V bytes
    ///
    /// # Errors
    ///
    /// Fails when the byte length is not 4-aligned or the magic number is
    /// missing.
    pub fn from_spirv_bytes(stage: ShaderStage, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            return Err(Error::InvalidResource(
                "SPIR-V size not aligned to 4 bytes".to_string(),
            ));
        }

        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        if words.first() != Some(&SPIRV_MAGIC) {
            return Err(Error::InvalidResource(
                "Invalid SPIR-V magic number".to_string(),
            ));
        }

        Ok(Self::spirv(stage, words))
    }

    /// Load a source from a file, selecting the compile path by extension
    ///
    /// `.spv` files are treated as pre-compiled bytecode; any other
    /// extension is read as text to be compiled.
    pub fn from_path(stage: ShaderStage, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let precompiled = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(SPIRV_EXTENSION));

        if precompiled {
            let bytes = std::fs::read(path).map_err(|e| {
                Error::InvalidResource(format!("failed to read {}: {}", path.display(), e))
            })?;
            Self::from_spirv_bytes(stage, &bytes)
        } else {
            let text = std::fs::read_to_string(path).map_err(|e| {
                Error::InvalidResource(format!("failed to read {}: {}", path.display(), e))
            })?;
            Ok(Self::text(stage, text))
        }
    }

    /// Load a text source plus ordered partial fragment files
    pub fn from_path_with_partials(
        stage: ShaderStage,
        path: impl AsRef<Path>,
        partial_paths: &[impl AsRef<Path>],
    ) -> Result<Self> {
        let mut source = Self::from_path(stage, path)?;
        for partial in partial_paths {
            let partial = partial.as_ref();
            let text = std::fs::read_to_string(partial).map_err(|e| {
                Error::InvalidResource(format!("failed to read {}: {}", partial.display(), e))
            })?;
            source.partials.push(text);
        }
        Ok(source)
    }

    /// Append a partial fragment (kept in push order)
    pub fn with_partial(mut self, fragment: impl Into<String>) -> Self {
        self.partials.push(fragment.into());
        self
    }

    /// Shader stage tag
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Source payload
    pub fn payload(&self) -> &SourcePayload {
        &self.payload
    }

    /// Whether the payload is pre-compiled bytecode
    pub fn is_precompiled(&self) -> bool {
        matches!(self.payload, SourcePayload::Spirv(_))
    }

    /// Whether partial fragments were supplied
    pub fn has_partials(&self) -> bool {
        !self.partials.is_empty()
    }

    /// Full text to compile: partial fragments in order, then the main text
    ///
    /// Returns `None` for pre-compiled payloads.
    pub fn merged_text(&self) -> Option<String> {
        let SourcePayload::Text(ref main) = self.payload else {
            return None;
        };

        if self.partials.is_empty() {
            return Some(main.clone());
        }

        let mut merged = String::with_capacity(
            self.partials.iter().map(|p| p.len() + 1).sum::<usize>() + main.len(),
        );
        for partial in &self.partials {
            merged.push_str(partial);
            if !partial.ends_with('\n') {
                merged.push('\n');
            }
        }
        merged.push_str(main);
        Some(merged)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
