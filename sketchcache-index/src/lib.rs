//! Minimizer indices and the two-tier cache that serves them to read mapping

pub mod cache;
pub mod device;
pub mod index;

// Re-export commonly used types
pub use cache::{CacheStats, DeviceIndexCache, HostIndexCache};
pub use device::{DeviceAllocation, DeviceAllocator, ExecutionStream, PoolAllocator};
pub use index::{
    partition_reads, DeviceIndex, HostIndexCopy, IndexBuilder, IndexContents,
    MinimizerIndexBuilder, Representation, SketchElement,
};
