//! Index builder that records its calls

use parking_lot::Mutex;
use sketchcache_bio::SequenceSource;
use sketchcache_core::{CacheError, CacheResult, IndexDescriptor, IndexParameters};
use sketchcache_index::{
    DeviceAllocator, DeviceIndex, ExecutionStream, IndexBuilder, MinimizerIndexBuilder,
};
use std::collections::HashSet;

/// Wraps [`MinimizerIndexBuilder`], recording every requested descriptor and
/// failing with `BuildFailure` for configured descriptors
#[derive(Debug, Default)]
pub struct CountingBuilder {
    inner: MinimizerIndexBuilder,
    requested: Mutex<Vec<IndexDescriptor>>,
    fail_on: Mutex<HashSet<IndexDescriptor>>,
}

impl CountingBuilder {
    /// Create a builder that never fails
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every build of `descriptor`
    pub fn failing_on(self, descriptor: IndexDescriptor) -> Self {
        self.fail_on.lock().insert(descriptor);
        self
    }

    /// Stop failing for any descriptor
    pub fn clear_failures(&self) {
        self.fail_on.lock().clear();
    }

    /// Number of build calls, failed ones included
    pub fn build_count(&self) -> usize {
        self.requested.lock().len()
    }

    /// Descriptors passed to `build`, in call order
    pub fn requested(&self) -> Vec<IndexDescriptor> {
        self.requested.lock().clone()
    }
}

impl IndexBuilder for CountingBuilder {
    fn build(
        &self,
        source: &dyn SequenceSource,
        descriptor: IndexDescriptor,
        parameters: &IndexParameters,
        allocator: &dyn DeviceAllocator,
        stream: &ExecutionStream,
    ) -> CacheResult<DeviceIndex> {
        self.requested.lock().push(descriptor);
        if self.fail_on.lock().contains(&descriptor) {
            return Err(CacheError::build_failure(format!(
                "injected failure for {}",
                descriptor
            )));
        }
        self.inner
            .build(source, descriptor, parameters, allocator, stream)
    }
}
