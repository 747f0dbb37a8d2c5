//! Error types for the SdfRay engine
//!
//! This module defines the error taxonomy used throughout the shader
//! compilation and hot-swap subsystem, together with the `engine_err!` /
//! `engine_bail!` helper macros that log an error at its origin before
//! returning it.

use std::fmt;

/// Result type for SdfRay engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// SdfRay engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Shader text failed to compile; carries the compiler diagnostic.
    /// Non-fatal: the previously active shader module stays in use.
    Compile(String),

    /// A pipeline build was requested while a required shader unit is in
    /// the `Failed` state. The build is aborted before touching the GPU.
    DependencyFailed(String),

    /// GPU object creation failed. Fatal to the affected rebuild attempt;
    /// the material keeps rendering with its last good pipeline.
    DeviceResource(String),

    /// Hot-swap protocol misuse (e.g. swapping a material that is not
    /// hot-swappable). Callers treat this as a no-op.
    ProtocolViolation(String),

    /// Invalid resource description (bad bytecode, bad descriptor, etc.)
    InvalidResource(String),

    /// Backend-specific error (Vulkan, etc.)
    Backend(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Compile(msg) => write!(f, "Shader compilation failed: {}", msg),
            Error::DependencyFailed(msg) => write!(f, "Pipeline dependency failed: {}", msg),
            Error::DeviceResource(msg) => write!(f, "Device resource error: {}", msg),
            Error::ProtocolViolation(msg) => write!(f, "Hot-swap protocol violation: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::Backend(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an ERROR entry and construct an [`Error::Backend`] in one expression.
///
/// # Example
///
/// ```ignore
/// device.create_thing().map_err(|e| engine_err!("sdfray::vulkan", "creation failed: {:?}", e))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        $crate::engine_error!($source, $($arg)*);
        $crate::sdfray::Error::Backend(format!($($arg)*))
    }};
}

/// Log an ERROR entry and early-return an [`Error::Backend`] from the
/// enclosing function.
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {{
        return Err($crate::engine_err!($source, $($arg)*));
    }};
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
