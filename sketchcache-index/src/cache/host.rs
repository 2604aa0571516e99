use super::generation::GenerationTable;
use super::stats::{CacheCounters, CacheStats};
use crate::device::{DeviceAllocator, ExecutionStream};
use crate::index::{DeviceIndex, HostIndexCopy, IndexBuilder, MinimizerIndexBuilder};
use sketchcache_bio::SequenceSource;
use sketchcache_core::{CacheError, CacheResult, IndexDescriptor, IndexParameters, Role};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Host-memory tier of the index cache.
///
/// Each role holds one generation of host copies. Indices are built on a
/// miss, copied to the host, and the transient device index is released.
/// Lookups materialize a new device index from the stored copy on every call.
pub struct HostIndexCache {
    reuse: bool,
    allocator: Arc<dyn DeviceAllocator>,
    query_source: Arc<dyn SequenceSource>,
    target_source: Arc<dyn SequenceSource>,
    parameters: IndexParameters,
    stream: ExecutionStream,
    builder: Arc<dyn IndexBuilder>,
    generations: GenerationTable<HostIndexCopy>,
    counters: CacheCounters,
}

impl HostIndexCache {
    /// Create an empty cache building with [`MinimizerIndexBuilder`]
    pub fn new(
        reuse: bool,
        allocator: Arc<dyn DeviceAllocator>,
        query_source: Arc<dyn SequenceSource>,
        target_source: Arc<dyn SequenceSource>,
        parameters: IndexParameters,
        stream: ExecutionStream,
    ) -> Self {
        Self {
            reuse,
            allocator,
            query_source,
            target_source,
            parameters,
            stream,
            builder: Arc::new(MinimizerIndexBuilder),
            generations: GenerationTable::new(),
            counters: CacheCounters::default(),
        }
    }

    /// Replace the builder invoked on a miss
    pub fn with_index_builder(mut self, builder: Arc<dyn IndexBuilder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn update_query_cache(&self, descriptors: &[IndexDescriptor]) -> CacheResult<()> {
        self.update(Role::Query, descriptors)
    }

    pub fn update_target_cache(&self, descriptors: &[IndexDescriptor]) -> CacheResult<()> {
        self.update(Role::Target, descriptors)
    }

    pub fn get_index_from_query_cache(
        &self,
        descriptor: &IndexDescriptor,
    ) -> CacheResult<Arc<DeviceIndex>> {
        self.get_index(Role::Query, descriptor)
    }

    pub fn get_index_from_target_cache(
        &self,
        descriptor: &IndexDescriptor,
    ) -> CacheResult<Arc<DeviceIndex>> {
        self.get_index(Role::Target, descriptor)
    }

    /// Replace `role`'s generation with host copies of `descriptors`.
    ///
    /// With reuse enabled, copies held by the opposite role are shared instead
    /// of rebuilt. On error the previous generation is kept.
    #[instrument(level = "debug", skip(self, descriptors), fields(requested = descriptors.len()))]
    pub fn update(&self, role: Role, descriptors: &[IndexDescriptor]) -> CacheResult<()> {
        let source = self.source(role);
        let result = self
            .generations
            .update(role, descriptors, self.reuse, |descriptor| {
                let index = self.builder.build(
                    source,
                    descriptor,
                    &self.parameters,
                    self.allocator.as_ref(),
                    &self.stream,
                )?;
                Ok(Arc::new(HostIndexCopy::from_device(&index, &self.stream)))
            });

        match result {
            Ok(summary) => {
                self.counters.record_update(&summary);
                debug!(
                    "Host {} cache: {} built, {} reused",
                    role, summary.materialized, summary.reused
                );
                Ok(())
            }
            Err(e) => {
                self.counters.record_failed_update();
                warn!("Host {} cache update failed: {}", role, e);
                Err(e)
            }
        }
    }

    /// Materialize a new device index for `descriptor` from `role`'s
    /// generation. Fails with `NotFound` if the descriptor is not stored.
    pub fn get_index(
        &self,
        role: Role,
        descriptor: &IndexDescriptor,
    ) -> CacheResult<Arc<DeviceIndex>> {
        let copy = self.host_copy(role, descriptor)?;
        let index = copy.to_device(self.allocator.as_ref(), &self.stream)?;
        self.counters.record_lookup();
        Ok(Arc::new(index))
    }

    /// The stored host copy, without materializing it
    pub fn host_copy(
        &self,
        role: Role,
        descriptor: &IndexDescriptor,
    ) -> CacheResult<Arc<HostIndexCopy>> {
        self.generations.lookup(role, descriptor).ok_or_else(|| {
            self.counters.record_miss();
            CacheError::not_found(role, *descriptor)
        })
    }

    pub fn descriptors(&self, role: Role) -> Vec<IndexDescriptor> {
        self.generations.descriptors(role)
    }

    pub fn contains(&self, role: Role, descriptor: &IndexDescriptor) -> bool {
        self.generations.contains(role, descriptor)
    }

    pub fn len(&self, role: Role) -> usize {
        self.generations.len(role)
    }

    pub fn is_empty(&self, role: Role) -> bool {
        self.len(role) == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    pub fn reuse(&self) -> bool {
        self.reuse
    }

    pub fn parameters(&self) -> &IndexParameters {
        &self.parameters
    }

    pub fn stream(&self) -> &ExecutionStream {
        &self.stream
    }

    pub fn allocator(&self) -> &Arc<dyn DeviceAllocator> {
        &self.allocator
    }

    pub fn source(&self, role: Role) -> &dyn SequenceSource {
        match role {
            Role::Query => self.query_source.as_ref(),
            Role::Target => self.target_source.as_ref(),
        }
    }
}

impl fmt::Debug for HostIndexCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostIndexCache")
            .field("reuse", &self.reuse)
            .field("parameters", &self.parameters)
            .field("builder", &self.builder)
            .field("query_entries", &self.len(Role::Query))
            .field("target_entries", &self.len(Role::Target))
            .finish()
    }
}
