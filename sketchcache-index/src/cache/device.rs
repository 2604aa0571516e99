use super::generation::GenerationTable;
use super::host::HostIndexCache;
use super::stats::{CacheCounters, CacheStats};
use crate::index::DeviceIndex;
use sketchcache_core::{CacheError, CacheResult, IndexDescriptor, Role};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Device-memory tier of the index cache.
///
/// Entries are device indices materialized from the wrapped
/// [`HostIndexCache`]. Lookups hand out the stored entry itself. With reuse
/// enabled both roles share one device index, and so one allocation, for a
/// descriptor they both hold.
pub struct DeviceIndexCache {
    reuse: bool,
    host_cache: Arc<HostIndexCache>,
    generations: GenerationTable<DeviceIndex>,
    counters: CacheCounters,
}

impl DeviceIndexCache {
    pub fn new(reuse: bool, host_cache: Arc<HostIndexCache>) -> Self {
        Self {
            reuse,
            host_cache,
            generations: GenerationTable::new(),
            counters: CacheCounters::default(),
        }
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

    /// Replace `role`'s generation with device indices for `descriptors`.
    ///
    /// Every descriptor not shared from the opposite role must be present in
    /// the host cache's generation for `role`, otherwise the update fails with
    /// `NotFound`. On error the previous generation is kept.
    #[instrument(level = "debug", skip(self, descriptors), fields(requested = descriptors.len()))]
    pub fn update(&self, role: Role, descriptors: &[IndexDescriptor]) -> CacheResult<()> {
        let result = self
            .generations
            .update(role, descriptors, self.reuse, |descriptor| {
                self.host_cache.get_index(role, &descriptor)
            });

        match result {
            Ok(summary) => {
                self.counters.record_update(&summary);
                debug!(
                    "Device {} cache: {} transferred, {} reused",
                    role, summary.materialized, summary.reused
                );
                Ok(())
            }
            Err(e) => {
                self.counters.record_failed_update();
                warn!("Device {} cache update failed: {}", role, e);
                Err(e)
            }
        }
    }

    /// The stored device index for `descriptor`. Fails with `NotFound` if
    /// `role`'s generation does not hold it.
    pub fn get_index(
        &self,
        role: Role,
        descriptor: &IndexDescriptor,
    ) -> CacheResult<Arc<DeviceIndex>> {
        match self.generations.lookup(role, descriptor) {
            Some(index) => {
                self.counters.record_lookup();
                Ok(index)
            }
            None => {
                self.counters.record_miss();
                Err(CacheError::not_found(role, *descriptor))
            }
        }
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

    pub fn host_cache(&self) -> &Arc<HostIndexCache> {
        &self.host_cache
    }
}

impl fmt::Debug for DeviceIndexCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceIndexCache")
            .field("reuse", &self.reuse)
            .field("query_entries", &self.len(Role::Query))
            .field("target_entries", &self.len(Role::Target))
            .finish()
    }
}
