//! Device allocator that records every reservation

use parking_lot::Mutex;
use sketchcache_core::CacheResult;
use sketchcache_index::{DeviceAllocation, DeviceAllocator, ExecutionStream, PoolAllocator};

/// A [`PoolAllocator`] that remembers the size and stream of each successful
/// reservation
#[derive(Debug, Default)]
pub struct TrackingAllocator {
    pool: PoolAllocator,
    reservations: Mutex<Vec<(usize, u64)>>,
}

impl TrackingAllocator {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: PoolAllocator::with_capacity(capacity),
            reservations: Mutex::new(Vec::new()),
        }
    }

    /// Number of successful reservations
    pub fn allocation_count(&self) -> usize {
        self.reservations.lock().len()
    }

    /// Sum of all reserved sizes, released ones included
    pub fn total_bytes_allocated(&self) -> usize {
        self.reservations.lock().iter().map(|(bytes, _)| bytes).sum()
    }

    /// Ids of the streams reservations were made for, in order
    pub fn stream_ids(&self) -> Vec<u64> {
        self.reservations.lock().iter().map(|(_, id)| *id).collect()
    }
}

impl DeviceAllocator for TrackingAllocator {
    fn allocate(&self, bytes: usize, stream: &ExecutionStream) -> CacheResult<DeviceAllocation> {
        let allocation = self.pool.allocate(bytes, stream)?;
        self.reservations.lock().push((bytes, stream.id()));
        Ok(allocation)
    }

    fn bytes_in_use(&self) -> usize {
        self.pool.bytes_in_use()
    }

    fn capacity(&self) -> Option<usize> {
        self.pool.capacity()
    }
}
