/// Core types shared across all sketchcache modules
pub mod descriptor;
pub mod parameters;
pub mod role;

// Re-export commonly used types at module level
pub use descriptor::IndexDescriptor;
pub use parameters::IndexParameters;
pub use role::Role;

/// Identifier of a read within a sequence source
pub type ReadId = u32;
