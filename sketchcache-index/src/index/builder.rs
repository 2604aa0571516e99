//! Construction of device indices from a sequence source

use crate::device::{DeviceAllocator, ExecutionStream};
use crate::index::device_index::{DeviceIndex, IndexContents};
use crate::index::minimizer::{sketch_read, SketchElement};
use rayon::prelude::*;
use sketchcache_bio::SequenceSource;
use sketchcache_core::{CacheError, CacheResult, IndexDescriptor, IndexParameters, ReadId};
use std::collections::HashMap;
use std::fmt;

/// Builds a device-resident index over a read range
pub trait IndexBuilder: Send + Sync + fmt::Debug {
    /// Build an index over the reads `descriptor` names.
    ///
    /// Fails with `BuildFailure` when the range falls outside `source` or the
    /// parameters are rejected, and with `AllocationFailure` when `allocator`
    /// cannot hold the result.
    fn build(
        &self,
        source: &dyn SequenceSource,
        descriptor: IndexDescriptor,
        parameters: &IndexParameters,
        allocator: &dyn DeviceAllocator,
        stream: &ExecutionStream,
    ) -> CacheResult<DeviceIndex>;
}

/// Builder computing canonical minimizer sketches
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimizerIndexBuilder;

impl MinimizerIndexBuilder {
    pub fn new() -> Self {
        Self
    }
}

/// Reject a read range that does not fit in `source`
pub fn check_range(source: &dyn SequenceSource, descriptor: IndexDescriptor) -> CacheResult<()> {
    let available = source.number_of_reads();
    if descriptor.end_read() > available as u64 {
        return Err(CacheError::build_failure(format!(
            "reads {} exceed a source of {} reads",
            descriptor, available
        )));
    }
    Ok(())
}

/// Drop representations whose share of all sketch elements reaches
/// `filtering_parameter`
fn filter_repetitive(sketch: Vec<SketchElement>, filtering_parameter: f64) -> Vec<SketchElement> {
    if sketch.is_empty() {
        return sketch;
    }

    let mut counts: HashMap<u64, usize> = HashMap::new();
    for element in &sketch {
        *counts.entry(element.representation).or_insert(0) += 1;
    }

    let total = sketch.len() as f64;
    let before = sketch.len();
    let kept: Vec<_> = sketch
        .into_iter()
        .filter(|e| (counts[&e.representation] as f64 / total) < filtering_parameter)
        .collect();

    tracing::debug!(
        "Filtered {} of {} sketch elements at threshold {}",
        before - kept.len(),
        before,
        filtering_parameter
    );
    kept
}

impl IndexBuilder for MinimizerIndexBuilder {
    fn build(
        &self,
        source: &dyn SequenceSource,
        descriptor: IndexDescriptor,
        parameters: &IndexParameters,
        allocator: &dyn DeviceAllocator,
        stream: &ExecutionStream,
    ) -> CacheResult<DeviceIndex> {
        parameters.validate().map_err(CacheError::build_failure)?;
        check_range(source, descriptor)?;

        let first = descriptor.first_read();
        let count = descriptor.number_of_reads();

        let contents = stream.enqueue("build_index", || {
            let sketch: Vec<SketchElement> = (0..count)
                .into_par_iter()
                .flat_map_iter(|offset| {
                    let read_id: ReadId = first + offset;
                    let bases = source.read_bases(read_id).unwrap_or_default();
                    sketch_read(
                        bases,
                        read_id,
                        parameters.kmer_size,
                        parameters.window_size,
                        parameters.hash_representations,
                    )
                })
                .collect();

            let sketch = if parameters.filtering_enabled() {
                filter_repetitive(sketch, parameters.filtering_parameter)
            } else {
                sketch
            };

            let (read_names, read_lengths): (Vec<String>, Vec<u32>) = (0..count)
                .map(|offset| {
                    let read_id = first + offset;
                    let name = source.read_name(read_id).unwrap_or_default().to_string();
                    let length = source.read_bases(read_id).map_or(0, |b| b.len() as u32);
                    (name, length)
                })
                .unzip();

            IndexContents::from_sketch(
                descriptor,
                parameters.kmer_size,
                parameters.window_size,
                sketch,
                read_names,
                read_lengths,
            )
        });

        tracing::debug!(
            "Built index {}: {} sketch elements, {} unique representations",
            descriptor,
            contents.representations.len(),
            contents.unique_representations.len()
        );

        DeviceIndex::upload(contents, allocator, stream)
    }
}
