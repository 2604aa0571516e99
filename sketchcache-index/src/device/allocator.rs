use crate::device::ExecutionStream;
use sketchcache_core::{CacheError, CacheResult};
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Source of device memory reservations
pub trait DeviceAllocator: Send + Sync + fmt::Debug {
    /// Reserve `bytes` of device memory for work issued on `stream`.
    ///
    /// The reservation is returned to the allocator when the
    /// [`DeviceAllocation`] is dropped.
    fn allocate(&self, bytes: usize, stream: &ExecutionStream) -> CacheResult<DeviceAllocation>;

    /// Bytes currently reserved and not yet released
    fn bytes_in_use(&self) -> usize;

    /// Total budget, or `None` when unbounded
    fn capacity(&self) -> Option<usize>;
}

/// Shared accounting of reserved bytes
#[derive(Debug, Default)]
pub struct MemoryLedger {
    in_use: AtomicUsize,
}

impl MemoryLedger {
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    /// Reserve `bytes` if the ledger stays within `capacity`.
    /// Returns the bytes that were available on failure.
    fn try_reserve(&self, bytes: usize, capacity: Option<usize>) -> Result<(), usize> {
        let mut current = self.in_use.load(Ordering::Acquire);
        loop {
            let next = current.saturating_add(bytes);
            if let Some(limit) = capacity {
                if next > limit {
                    return Err(limit.saturating_sub(current));
                }
            }
            match self
                .in_use
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return Ok(()),
                Err(observed) => current = observed,
            }
        }
    }

    fn release(&self, bytes: usize) {
        self.in_use.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// RAII reservation of device memory
pub struct DeviceAllocation {
    bytes: usize,
    ledger: Arc<MemoryLedger>,
}

impl DeviceAllocation {
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Drop for DeviceAllocation {
    fn drop(&mut self) {
        self.ledger.release(self.bytes);
    }
}

impl fmt::Debug for DeviceAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceAllocation")
            .field("bytes", &self.bytes)
            .finish()
    }
}

/// Emulated device memory pool with an optional byte budget
#[derive(Debug)]
pub struct PoolAllocator {
    ledger: Arc<MemoryLedger>,
    capacity: Option<usize>,
    allocations: AtomicU64,
}

impl PoolAllocator {
    /// Pool without a budget
    pub fn unbounded() -> Self {
        Self {
            ledger: Arc::new(MemoryLedger::default()),
            capacity: None,
            allocations: AtomicU64::new(0),
        }
    }

    /// Pool that refuses reservations beyond `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::unbounded()
        }
    }

    /// Number of successful reservations over the pool's lifetime
    pub fn allocation_count(&self) -> u64 {
        self.allocations.load(Ordering::Relaxed)
    }
}

impl Default for PoolAllocator {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl DeviceAllocator for PoolAllocator {
    fn allocate(&self, bytes: usize, stream: &ExecutionStream) -> CacheResult<DeviceAllocation> {
        match self.ledger.try_reserve(bytes, self.capacity) {
            Ok(()) => {
                self.allocations.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(
                    "Reserved {} device bytes on stream {} ({} in use)",
                    bytes,
                    stream.id(),
                    self.ledger.in_use()
                );
                Ok(DeviceAllocation {
                    bytes,
                    ledger: Arc::clone(&self.ledger),
                })
            }
            Err(available) => {
                tracing::debug!(
                    "Device reservation of {} bytes refused, {} available",
                    bytes,
                    available
                );
                Err(CacheError::AllocationFailure {
                    requested: bytes,
                    available,
                })
            }
        }
    }

    fn bytes_in_use(&self) -> usize {
        self.ledger.in_use()
    }

    fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
