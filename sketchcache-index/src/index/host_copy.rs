//! Host-memory snapshot of a device index

use crate::device::{DeviceAllocator, ExecutionStream};
use crate::index::device_index::{DeviceIndex, IndexContents};
use sketchcache_core::{CacheResult, IndexDescriptor, ReadId};

/// Read-only copy of an index's arrays in host memory.
///
/// Holds no device memory. [`HostIndexCopy::to_device`] reserves a fresh
/// allocation and uploads the arrays on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIndexCopy {
    contents: IndexContents,
}

impl HostIndexCopy {
    /// Copy `index` back to the host.
    ///
    /// The copy is issued on `stream` and the stream is synchronized before
    /// returning, so `index` may be dropped as soon as this call completes.
    pub fn from_device(index: &DeviceIndex, stream: &ExecutionStream) -> Self {
        let contents = stream.enqueue("device_to_host", || index.contents().clone());
        stream.synchronize();
        Self { contents }
    }

    /// Materialize a new device index holding these arrays
    pub fn to_device(
        &self,
        allocator: &dyn DeviceAllocator,
        stream: &ExecutionStream,
    ) -> CacheResult<DeviceIndex> {
        DeviceIndex::upload(self.contents.clone(), allocator, stream)
    }

    pub fn contents(&self) -> &IndexContents {
        &self.contents
    }

    pub fn descriptor(&self) -> IndexDescriptor {
        self.contents.descriptor()
    }

    pub fn first_read(&self) -> ReadId {
        self.contents.first_read
    }

    pub fn kmer_size(&self) -> u32 {
        self.contents.kmer_size
    }

    pub fn window_size(&self) -> u32 {
        self.contents.window_size
    }

    pub fn host_bytes(&self) -> usize {
        self.contents.host_bytes()
    }
}
