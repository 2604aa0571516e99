/// Integration tests for the host and device index caches
///
/// These drive both tiers through their public surface with instrumented
/// builders and allocators from sketchcache-test.
use sketchcache_bio::SequenceSource;
use sketchcache_core::{CacheError, CacheErrorKind, IndexDescriptor, IndexParameters, Role};
use sketchcache_index::{
    DeviceAllocator, DeviceIndexCache, ExecutionStream, HostIndexCache, IndexBuilder,
    MinimizerIndexBuilder, PoolAllocator,
};
use sketchcache_test::{
    assert_same_index, generate_overlapping_reads, init_test_logging, reads_source,
    CountingBuilder, TrackingAllocator,
};
use std::sync::Arc;

mod helpers {
    use super::*;
    use sketchcache_bio::InMemorySequenceSource;

    pub fn parameters() -> IndexParameters {
        IndexParameters::new(11, 5)
    }

    pub fn source(seed: u64) -> Arc<dyn SequenceSource> {
        Arc::new(InMemorySequenceSource::new(generate_overlapping_reads(
            30, 150, 1_000, seed,
        )))
    }

    pub struct Fixture {
        pub builder: Arc<CountingBuilder>,
        pub allocator: Arc<TrackingAllocator>,
        pub stream: ExecutionStream,
        pub host: Arc<HostIndexCache>,
    }

    pub fn fixture(reuse: bool) -> Fixture {
        fixture_with(reuse, CountingBuilder::new(), TrackingAllocator::unbounded())
    }

    pub fn fixture_with(
        reuse: bool,
        builder: CountingBuilder,
        allocator: TrackingAllocator,
    ) -> Fixture {
        init_test_logging();
        let builder = Arc::new(builder);
        let allocator = Arc::new(allocator);
        let stream = ExecutionStream::new();
        let shared = source(3);
        let host = HostIndexCache::new(
            reuse,
            allocator.clone(),
            shared.clone(),
            shared,
            parameters(),
            stream.clone(),
        )
        .with_index_builder(builder.clone());

        Fixture {
            builder,
            allocator,
            stream,
            host: Arc::new(host),
        }
    }

    pub fn d(first: u32, count: u32) -> IndexDescriptor {
        IndexDescriptor::new(first, count)
    }
}

mod host_cache_tests {
    use super::helpers::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_matches_direct_build() {
        let fx = fixture(true);
        fx.host.update_query_cache(&[d(0, 10), d(10, 10)]).unwrap();

        let pool = PoolAllocator::unbounded();
        let stream = ExecutionStream::new();
        for descriptor in [d(0, 10), d(10, 10)] {
            let cached = fx.host.get_index_from_query_cache(&descriptor).unwrap();
            let direct = MinimizerIndexBuilder
                .build(
                    fx.host.source(Role::Query),
                    descriptor,
                    &parameters(),
                    &pool,
                    &stream,
                )
                .unwrap();
            assert_same_index(&cached, &direct);
        }

        let err = fx.host.get_index_from_query_cache(&d(20, 10)).unwrap_err();
        assert_eq!(err.kind(), CacheErrorKind::NotFound);
    }

    #[test]
    fn test_reuse_builds_once() {
        let fx = fixture(true);
        fx.host.update_target_cache(&[d(0, 10)]).unwrap();
        fx.host.update_query_cache(&[d(0, 10)]).unwrap();

        assert_eq!(fx.builder.build_count(), 1);
        assert_eq!(fx.host.stats().reused, 1);
    }

    #[test]
    fn test_no_reuse_builds_twice() {
        let fx = fixture(false);
        fx.host.update_target_cache(&[d(0, 10)]).unwrap();
        fx.host.update_query_cache(&[d(0, 10)]).unwrap();

        assert_eq!(fx.builder.build_count(), 2);
        assert_eq!(fx.host.stats().reused, 0);
    }

    #[test]
    fn test_update_replaces_generation() {
        let fx = fixture(true);
        fx.host.update_query_cache(&[d(0, 10)]).unwrap();
        fx.host.update_query_cache(&[d(10, 10)]).unwrap();

        assert_eq!(
            fx.host.get_index_from_query_cache(&d(0, 10)).unwrap_err(),
            CacheError::not_found(Role::Query, d(0, 10))
        );
        assert!(fx.host.get_index_from_query_cache(&d(10, 10)).is_ok());
    }

    #[test]
    fn test_same_role_is_rebuilt_on_repeat() {
        let fx = fixture(true);
        fx.host.update_query_cache(&[d(0, 10)]).unwrap();
        fx.host.update_query_cache(&[d(0, 10)]).unwrap();
        assert_eq!(fx.builder.build_count(), 2);
    }

    #[test]
    fn test_reuse_only_from_current_sibling_generation() {
        let fx = fixture(true);
        fx.host.update_target_cache(&[d(0, 10)]).unwrap();
        fx.host.update_target_cache(&[d(10, 10)]).unwrap();
        fx.host.update_query_cache(&[d(0, 10)]).unwrap();

        assert_eq!(fx.builder.requested(), vec![d(0, 10), d(10, 10), d(0, 10)]);
    }

    #[test]
    fn test_failed_update_keeps_generation() {
        let fx = fixture_with(
            true,
            CountingBuilder::new().failing_on(d(10, 10)),
            TrackingAllocator::unbounded(),
        );
        fx.host.update_query_cache(&[d(20, 10)]).unwrap();

        let err = fx
            .host
            .update_query_cache(&[d(0, 10), d(10, 10), d(20, 5)])
            .unwrap_err();
        assert_eq!(err.kind(), CacheErrorKind::BuildFailure);
        assert_eq!(fx.builder.requested(), vec![d(20, 10), d(0, 10), d(10, 10)]);
        assert_eq!(fx.host.descriptors(Role::Query), vec![d(20, 10)]);
        assert!(!fx.host.contains(Role::Query, &d(0, 10)));
        assert_eq!(fx.host.stats().failed_updates, 1);

        fx.builder.clear_failures();
        fx.host.update_query_cache(&[d(0, 10), d(10, 10)]).unwrap();
        assert_eq!(fx.host.descriptors(Role::Query), vec![d(0, 10), d(10, 10)]);
        assert_eq!(fx.host.stats().updates, 2);
    }

    #[test]
    fn test_range_beyond_source_is_build_failure() {
        let fx = fixture(true);
        let err = fx.host.update_target_cache(&[d(25, 10)]).unwrap_err();
        assert_eq!(err.kind(), CacheErrorKind::BuildFailure);
        assert!(fx.host.is_empty(Role::Target));
    }

    #[test]
    fn test_duplicates_built_once() {
        let fx = fixture(false);
        fx.host
            .update_query_cache(&[d(0, 5), d(5, 5), d(0, 5)])
            .unwrap();
        assert_eq!(fx.builder.build_count(), 2);
        assert_eq!(fx.host.descriptors(Role::Query), vec![d(0, 5), d(5, 5)]);
    }

    #[test]
    fn test_empty_update_clears_role() {
        let fx = fixture(true);
        fx.host.update_query_cache(&[d(0, 10)]).unwrap();
        fx.host.update_query_cache(&[]).unwrap();
        assert!(fx.host.is_empty(Role::Query));
    }

    #[test]
    fn test_work_is_issued_on_configured_stream() {
        let fx = fixture(true);
        fx.host.update_query_cache(&[d(0, 10)]).unwrap();
        fx.host.get_index_from_query_cache(&d(0, 10)).unwrap();

        assert!(fx.stream.issued() > 0);
        assert_eq!(fx.stream.completed(), fx.stream.issued());
        assert!(fx
            .allocator
            .stream_ids()
            .iter()
            .all(|id| *id == fx.stream.id()));
    }

    #[test]
    fn test_host_tier_releases_build_memory() {
        let fx = fixture(true);
        fx.host.update_query_cache(&[d(0, 15), d(15, 15)]).unwrap();
        assert_eq!(fx.allocator.allocation_count(), 2);
        assert_eq!(fx.allocator.bytes_in_use(), 0);

        let built = fx.allocator.total_bytes_allocated();
        assert!(built > 0);
        let index = fx.host.get_index_from_query_cache(&d(0, 15)).unwrap();
        assert_eq!(
            fx.allocator.total_bytes_allocated(),
            built + index.device_bytes()
        );
        drop(index);
        assert_eq!(fx.allocator.bytes_in_use(), 0);
    }
}

mod device_cache_tests {
    use super::helpers::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shared_descriptor_allocates_once() {
        let fx = fixture(true);
        fx.host.update_target_cache(&[d(0, 10)]).unwrap();
        fx.host.update_query_cache(&[d(0, 10)]).unwrap();
        let after_host = fx.allocator.allocation_count();

        let device = DeviceIndexCache::new(true, fx.host.clone());
        device.update_target_cache(&[d(0, 10)]).unwrap();
        device.update_query_cache(&[d(0, 10)]).unwrap();

        assert_eq!(fx.allocator.allocation_count(), after_host + 1);
        let query = device.get_index_from_query_cache(&d(0, 10)).unwrap();
        let target = device.get_index_from_target_cache(&d(0, 10)).unwrap();
        assert!(Arc::ptr_eq(&query, &target));
        assert_eq!(fx.allocator.bytes_in_use(), query.device_bytes());
    }

    #[test]
    fn test_without_reuse_each_role_allocates() {
        let fx = fixture(false);
        fx.host.update_target_cache(&[d(0, 10)]).unwrap();
        fx.host.update_query_cache(&[d(0, 10)]).unwrap();
        let after_host = fx.allocator.allocation_count();

        let device = DeviceIndexCache::new(false, fx.host.clone());
        device.update_target_cache(&[d(0, 10)]).unwrap();
        device.update_query_cache(&[d(0, 10)]).unwrap();

        assert_eq!(fx.allocator.allocation_count(), after_host + 2);
        let query = device.get_index_from_query_cache(&d(0, 10)).unwrap();
        let target = device.get_index_from_target_cache(&d(0, 10)).unwrap();
        assert!(!Arc::ptr_eq(&query, &target));
        assert_same_index(&query, &target);
    }

    #[test]
    fn test_requires_host_generation() {
        let fx = fixture(true);
        fx.host.update_query_cache(&[d(0, 10)]).unwrap();

        let device = DeviceIndexCache::new(true, fx.host.clone());
        let err = device.update_target_cache(&[d(0, 10)]).unwrap_err();
        assert_eq!(err, CacheError::not_found(Role::Target, d(0, 10)));
        assert!(device.is_empty(Role::Target));
    }

    #[test]
    fn test_device_budget_exhaustion_keeps_generation() {
        let fx = fixture(true);
        fx.host.update_query_cache(&[d(0, 10), d(10, 10)]).unwrap();
        let first = fx.host.get_index_from_query_cache(&d(0, 10)).unwrap();
        let budget = first.device_bytes() + first.device_bytes() / 2;
        drop(first);

        let limited = fixture_with(
            true,
            CountingBuilder::new(),
            TrackingAllocator::with_capacity(budget),
        );
        limited.host.update_query_cache(&[d(0, 10)]).unwrap();
        let device = DeviceIndexCache::new(true, limited.host.clone());
        device.update_query_cache(&[d(0, 10)]).unwrap();

        // The stored index keeps its reservation, so a second one cannot fit
        let err = device.update_query_cache(&[d(0, 10)]).unwrap_err();
        assert_eq!(err.kind(), CacheErrorKind::AllocationFailure);
        assert_eq!(device.descriptors(Role::Query), vec![d(0, 10)]);
        assert_eq!(device.stats().failed_updates, 1);
    }

    #[test]
    fn test_held_index_survives_eviction() {
        let fx = fixture(true);
        fx.host.update_query_cache(&[d(0, 10), d(10, 10)]).unwrap();
        let device = DeviceIndexCache::new(true, fx.host.clone());

        device.update_query_cache(&[d(0, 10)]).unwrap();
        let held = device.get_index_from_query_cache(&d(0, 10)).unwrap();
        device.update_query_cache(&[d(10, 10)]).unwrap();

        assert!(device.get_index_from_query_cache(&d(0, 10)).is_err());
        assert_eq!(held.descriptor(), d(0, 10));
        assert!(held.number_of_sketch_elements() > 0);
    }

    #[test]
    fn test_caches_are_shareable_across_threads() {
        let fx = fixture(true);
        fx.host.update_query_cache(&[d(0, 10), d(10, 10)]).unwrap();
        let device = Arc::new(DeviceIndexCache::new(true, fx.host.clone()));
        device.update_query_cache(&[d(0, 10), d(10, 10)]).unwrap();

        let handles: Vec<_> = [d(0, 10), d(10, 10)]
            .into_iter()
            .map(|descriptor| {
                let device = device.clone();
                std::thread::spawn(move || {
                    device
                        .get_index_from_query_cache(&descriptor)
                        .map(|index| index.descriptor())
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert_eq!(device.stats().lookups, 2);
    }

    #[test]
    fn test_concurrent_lookups_share_one_stream() {
        init_test_logging();
        let source = reads_source(20, 200);
        let stream = ExecutionStream::new();
        let host = Arc::new(HostIndexCache::new(
            false,
            Arc::new(PoolAllocator::unbounded()),
            source.clone(),
            source,
            parameters(),
            stream.clone(),
        ));
        let descriptors = [d(0, 5), d(5, 5), d(10, 5), d(15, 5)];
        host.update_target_cache(&descriptors).unwrap();

        let handles: Vec<_> = descriptors
            .into_iter()
            .map(|descriptor| {
                let host = host.clone();
                std::thread::spawn(move || {
                    (0..10)
                        .map(|_| {
                            host.get_index_from_target_cache(&descriptor)
                                .map(|index| index.descriptor())
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for (handle, descriptor) in handles.into_iter().zip(descriptors) {
            for result in handle.join().unwrap() {
                assert_eq!(result.unwrap(), descriptor);
            }
        }
        stream.synchronize();
        assert_eq!(stream.completed(), stream.issued());
        assert_eq!(host.stats().lookups, 40);
    }
}
