//! Core utilities and types shared across all sketchcache crates

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, save_config, Config};
pub use error::{CacheError, CacheErrorKind, CacheResult, SketchCacheError, SketchCacheResult};

// Re-export core types
pub use types::{IndexDescriptor, IndexParameters, ReadId, Role};

/// Version information for the sketchcache project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
