/// Hot-swap module - per-material swap state and the coordinator

// Module declarations
pub mod coordinator;
pub mod tracker;

// Re-export everything
pub use coordinator::*;
pub use tracker::*;
