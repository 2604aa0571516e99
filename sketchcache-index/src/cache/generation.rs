use parking_lot::RwLock;
use sketchcache_core::{CacheResult, IndexDescriptor, Role};
use std::collections::HashMap;
use std::sync::Arc;

/// One role's full descriptor -> entry map
#[derive(Debug)]
struct Generation<E> {
    entries: HashMap<IndexDescriptor, Arc<E>>,
    order: Vec<IndexDescriptor>,
}

impl<E> Generation<E> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
        }
    }
}

impl<E> Default for Generation<E> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

/// What an update did with each requested descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct UpdateSummary {
    pub materialized: u64,
    pub reused: u64,
    pub duplicates: u64,
}

/// Current generation of both roles of a cache.
///
/// The lock is only held to read an entry out of a generation and to swap a
/// finished generation in. Entries are materialized without holding it.
#[derive(Debug)]
pub(crate) struct GenerationTable<E> {
    generations: RwLock<[Generation<E>; 2]>,
}

fn slot(role: Role) -> usize {
    match role {
        Role::Query => 0,
        Role::Target => 1,
    }
}

impl<E> GenerationTable<E> {
    pub fn new() -> Self {
        Self {
            generations: RwLock::new([Generation::default(), Generation::default()]),
        }
    }

    pub fn lookup(&self, role: Role, descriptor: &IndexDescriptor) -> Option<Arc<E>> {
        self.generations.read()[slot(role)]
            .entries
            .get(descriptor)
            .cloned()
    }

    pub fn contains(&self, role: Role, descriptor: &IndexDescriptor) -> bool {
        self.generations.read()[slot(role)]
            .entries
            .contains_key(descriptor)
    }

    /// Descriptors of the current generation in the order they were requested
    pub fn descriptors(&self, role: Role) -> Vec<IndexDescriptor> {
        self.generations.read()[slot(role)].order.clone()
    }

    pub fn len(&self, role: Role) -> usize {
        self.generations.read()[slot(role)].order.len()
    }

    /// Replace `role`'s generation with entries for `descriptors`.
    ///
    /// With `reuse`, an entry already held by the opposite role's current
    /// generation is shared. Otherwise `materialize` produces it. A repeated
    /// descriptor keeps the entry of its first occurrence. The first error
    /// aborts the update and leaves the current generation in place.
    pub fn update<F>(
        &self,
        role: Role,
        descriptors: &[IndexDescriptor],
        reuse: bool,
        mut materialize: F,
    ) -> CacheResult<UpdateSummary>
    where
        F: FnMut(IndexDescriptor) -> CacheResult<Arc<E>>,
    {
        let mut next = Generation::with_capacity(descriptors.len());
        let mut summary = UpdateSummary::default();

        for &descriptor in descriptors {
            if next.entries.contains_key(&descriptor) {
                summary.duplicates += 1;
                continue;
            }

            let shared = if reuse {
                self.lookup(role.opposite(), &descriptor)
            } else {
                None
            };

            let entry = match shared {
                Some(entry) => {
                    tracing::trace!("{} {}: shared from {}", role, descriptor, role.opposite());
                    summary.reused += 1;
                    entry
                }
                None => {
                    tracing::trace!("{} {}: materializing", role, descriptor);
                    let entry = materialize(descriptor)?;
                    summary.materialized += 1;
                    entry
                }
            };

            next.entries.insert(descriptor, entry);
            next.order.push(descriptor);
        }

        self.generations.write()[slot(role)] = next;
        Ok(summary)
    }
}
