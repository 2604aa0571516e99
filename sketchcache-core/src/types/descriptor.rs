//! Cache key describing a contiguous range of reads

use super::ReadId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Number of bits each descriptor field occupies in the packed hash
const HALF_WIDTH: u32 = usize::BITS / 2;

/// Identifies the half-open read range `[first_read, first_read + number_of_reads)`
/// an index is built over.
///
/// The hash is computed once at construction by packing `first_read` into the
/// low half of a `usize` and `number_of_reads` into the high half. Values wider
/// than half a word alias in the hash but still compare unequal, so lookups
/// stay correct and only bucket distribution suffers.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(from = "RawDescriptor", into = "RawDescriptor")]
pub struct IndexDescriptor {
    first_read: ReadId,
    number_of_reads: ReadId,
    hash: usize,
}

#[derive(Serialize, Deserialize)]
struct RawDescriptor {
    first_read: ReadId,
    number_of_reads: ReadId,
}

impl IndexDescriptor {
    pub fn new(first_read: ReadId, number_of_reads: ReadId) -> Self {
        Self {
            first_read,
            number_of_reads,
            hash: Self::packed_hash(first_read, number_of_reads),
        }
    }

    pub fn first_read(&self) -> ReadId {
        self.first_read
    }

    pub fn number_of_reads(&self) -> ReadId {
        self.number_of_reads
    }

    /// One past the last read covered by this descriptor
    pub fn end_read(&self) -> u64 {
        self.first_read as u64 + self.number_of_reads as u64
    }

    /// The cached hash value
    pub fn hash_value(&self) -> usize {
        self.hash
    }

    fn packed_hash(first_read: ReadId, number_of_reads: ReadId) -> usize {
        // Shifts are done in u64 so a 32-bit half-width does not overflow the
        // shift amount on 64-bit targets; truncation to usize is the aliasing.
        let mask: u64 = (1u64 << HALF_WIDTH) - 1;
        let low = first_read as u64 & mask;
        let high = (number_of_reads as u64 & mask) << HALF_WIDTH;
        (low | high) as usize
    }
}

impl PartialEq for IndexDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.first_read == other.first_read && self.number_of_reads == other.number_of_reads
    }
}

impl Eq for IndexDescriptor {}

impl Hash for IndexDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.hash);
    }
}

impl fmt::Debug for IndexDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexDescriptor")
            .field("first_read", &self.first_read)
            .field("number_of_reads", &self.number_of_reads)
            .finish()
    }
}

impl fmt::Display for IndexDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.first_read, self.end_read())
    }
}

impl From<RawDescriptor> for IndexDescriptor {
    fn from(raw: RawDescriptor) -> Self {
        Self::new(raw.first_read, raw.number_of_reads)
    }
}

impl From<IndexDescriptor> for RawDescriptor {
    fn from(descriptor: IndexDescriptor) -> Self {
        Self {
            first_read: descriptor.first_read,
            number_of_reads: descriptor.number_of_reads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashMap;

    fn std_hash(descriptor: &IndexDescriptor) -> u64 {
        let mut hasher = DefaultHasher::new();
        descriptor.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_packed_hash_layout() {
        let descriptor = IndexDescriptor::new(7, 3);
        let expected = 7usize | (3usize << (usize::BITS / 2));
        assert_eq!(descriptor.hash_value(), expected);
    }

    #[test]
    fn test_equality_ignores_nothing_but_fields() {
        assert_eq!(IndexDescriptor::new(10, 20), IndexDescriptor::new(10, 20));
        assert_ne!(IndexDescriptor::new(10, 20), IndexDescriptor::new(20, 10));
        assert_ne!(IndexDescriptor::new(10, 20), IndexDescriptor::new(10, 21));
    }

    #[test]
    fn test_end_read_does_not_overflow() {
        let descriptor = IndexDescriptor::new(ReadId::MAX, ReadId::MAX);
        assert_eq!(descriptor.end_read(), 2 * ReadId::MAX as u64);
    }

    #[test]
    fn test_display() {
        assert_eq!(IndexDescriptor::new(100, 50).to_string(), "[100, 150)");
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn test_aliasing_descriptors_stay_distinct_in_map() {
        // On 32-bit targets each field gets 16 bits, so these alias
        let a = IndexDescriptor::new(1, 0);
        let b = IndexDescriptor::new(1 + (1 << 16), 0);
        assert_eq!(a.hash_value(), b.hash_value());

        let mut map = HashMap::new();
        map.insert(a, "a");
        map.insert(b, "b");
        assert_eq!(map.get(&a), Some(&"a"));
        assert_eq!(map.get(&b), Some(&"b"));
    }

    #[test]
    fn test_serde_recomputes_hash() {
        let descriptor = IndexDescriptor::new(5, 9);
        let json = serde_json::to_string(&descriptor).unwrap();
        assert_eq!(json, r#"{"first_read":5,"number_of_reads":9}"#);

        let parsed: IndexDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, descriptor);
        assert_eq!(parsed.hash_value(), descriptor.hash_value());
    }

    proptest! {
        #[test]
        fn equal_descriptors_hash_equal(first in any::<u32>(), count in any::<u32>()) {
            let a = IndexDescriptor::new(first, count);
            let b = IndexDescriptor::new(first, count);
            prop_assert_eq!(a, b);
            prop_assert_eq!(a.hash_value(), b.hash_value());
            prop_assert_eq!(std_hash(&a), std_hash(&b));
        }

        #[test]
        fn equality_iff_fields_match(
            a_first in 0u32..64, a_count in 0u32..64,
            b_first in 0u32..64, b_count in 0u32..64,
        ) {
            let a = IndexDescriptor::new(a_first, a_count);
            let b = IndexDescriptor::new(b_first, b_count);
            prop_assert_eq!(a == b, a_first == b_first && a_count == b_count);
        }

        #[test]
        fn map_lookup_survives_collisions(pairs in proptest::collection::vec((any::<u32>(), any::<u32>()), 1..64)) {
            let mut map = HashMap::new();
            for (i, (first, count)) in pairs.iter().enumerate() {
                map.entry(IndexDescriptor::new(*first, *count)).or_insert(i);
            }
            for (first, count) in &pairs {
                let descriptor = IndexDescriptor::new(*first, *count);
                let stored = map[&descriptor];
                prop_assert_eq!(pairs[stored], (*first, *count));
            }
        }
    }
}
