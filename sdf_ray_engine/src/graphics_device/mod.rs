/// Graphics device module - device capability traits and GPU object descriptors

// Module declarations
pub mod device;
pub mod shader;
pub mod pipeline;

// Re-export everything
pub use device::*;
pub use pipeline::*;
pub use shader::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_device;
