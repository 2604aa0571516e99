//! Splitting a read set into index windows

use sketchcache_core::{IndexDescriptor, ReadId};

/// Consecutive descriptors of at most `reads_per_index` reads covering
/// `0..number_of_reads`. Returns no descriptors when `reads_per_index` is zero.
pub fn partition_reads(number_of_reads: ReadId, reads_per_index: ReadId) -> Vec<IndexDescriptor> {
    if reads_per_index == 0 {
        return Vec::new();
    }

    let mut descriptors = Vec::with_capacity((number_of_reads / reads_per_index + 1) as usize);
    let mut first = 0;
    while first < number_of_reads {
        let count = reads_per_index.min(number_of_reads - first);
        descriptors.push(IndexDescriptor::new(first, count));
        first += count;
    }
    descriptors
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_partition_with_remainder() {
        assert_eq!(
            partition_reads(25, 10),
            vec![
                IndexDescriptor::new(0, 10),
                IndexDescriptor::new(10, 10),
                IndexDescriptor::new(20, 5),
            ]
        );
    }

    #[test]
    fn test_partition_edge_cases() {
        assert!(partition_reads(0, 10).is_empty());
        assert!(partition_reads(10, 0).is_empty());
        assert_eq!(partition_reads(3, 100), vec![IndexDescriptor::new(0, 3)]);
    }

    proptest! {
        #[test]
        fn prop_windows_tile_all_reads(n in 0u32..5000, size in 1u32..700) {
            let windows = partition_reads(n, size);
            let mut next = 0u64;
            for window in &windows {
                prop_assert_eq!(window.first_read() as u64, next);
                prop_assert!(window.number_of_reads() >= 1);
                prop_assert!(window.number_of_reads() <= size);
                next = window.end_read();
            }
            prop_assert_eq!(next, n as u64);
        }
    }
}
