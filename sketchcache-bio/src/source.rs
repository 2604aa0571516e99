//! Read-only, id-indexed access to the reads an index is built from

use crate::sequence::Sequence;
use sketchcache_core::ReadId;
use std::fmt;

/// A collection of reads addressable by dense read id
///
/// One source is supplied per role when a cache is constructed. Implementations
/// must be immutable for as long as any cache refers to them.
pub trait SequenceSource: Send + Sync + fmt::Debug {
    /// Total number of reads; valid ids are `0..number_of_reads()`
    fn number_of_reads(&self) -> ReadId;

    /// Bases of a read, or `None` for an out-of-range id
    fn read_bases(&self, read_id: ReadId) -> Option<&[u8]>;

    /// Name of a read, or `None` for an out-of-range id
    fn read_name(&self, read_id: ReadId) -> Option<&str>;
}

/// Source backed by a vector of parsed sequences
#[derive(Debug, Clone, Default)]
pub struct InMemorySequenceSource {
    sequences: Vec<Sequence>,
}

impl InMemorySequenceSource {
    pub fn new(sequences: Vec<Sequence>) -> Self {
        Self { sequences }
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl From<Vec<Sequence>> for InMemorySequenceSource {
    fn from(sequences: Vec<Sequence>) -> Self {
        Self::new(sequences)
    }
}

impl SequenceSource for InMemorySequenceSource {
    fn number_of_reads(&self) -> ReadId {
        ReadId::try_from(self.sequences.len()).unwrap_or(ReadId::MAX)
    }

    fn read_bases(&self, read_id: ReadId) -> Option<&[u8]> {
        self.sequences
            .get(read_id as usize)
            .map(|s| s.sequence.as_slice())
    }

    fn read_name(&self, read_id: ReadId) -> Option<&str> {
        self.sequences.get(read_id as usize).map(|s| s.id.as_str())
    }
}
