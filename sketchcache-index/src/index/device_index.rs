//! Minimizer index resident in device memory

use crate::device::{DeviceAllocation, DeviceAllocator, ExecutionStream};
use crate::index::minimizer::{Direction, Position, Representation, SketchElement};
use serde::{Deserialize, Serialize};
use sketchcache_core::{CacheResult, IndexDescriptor, ReadId};
use std::mem::size_of;
use std::ops::Range;

/// Arrays and metadata making up one index, independent of where they live.
///
/// Sketch elements are stored as parallel arrays sorted by
/// (representation, read id, position). `unique_representations[i]` starts at
/// `first_occurrence_of_representations[i]` and the last entry of
/// `first_occurrence_of_representations` is one past the final element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexContents {
    pub first_read: ReadId,
    pub number_of_reads: ReadId,
    pub kmer_size: u32,
    pub window_size: u32,
    pub representations: Vec<Representation>,
    pub read_ids: Vec<ReadId>,
    pub positions_in_reads: Vec<Position>,
    pub directions_of_reads: Vec<Direction>,
    pub unique_representations: Vec<Representation>,
    pub first_occurrence_of_representations: Vec<u32>,
    pub read_names: Vec<String>,
    pub read_lengths: Vec<u32>,
}

impl IndexContents {
    /// Assemble contents from sketch elements in any order
    pub fn from_sketch(
        descriptor: IndexDescriptor,
        kmer_size: u32,
        window_size: u32,
        mut sketch: Vec<SketchElement>,
        read_names: Vec<String>,
        read_lengths: Vec<u32>,
    ) -> Self {
        sketch.sort_unstable_by_key(|e| (e.representation, e.read_id, e.position));

        let mut unique_representations = Vec::new();
        let mut first_occurrence_of_representations = Vec::new();
        for (i, element) in sketch.iter().enumerate() {
            if unique_representations.last() != Some(&element.representation) {
                unique_representations.push(element.representation);
                first_occurrence_of_representations.push(i as u32);
            }
        }
        first_occurrence_of_representations.push(sketch.len() as u32);

        Self {
            first_read: descriptor.first_read(),
            number_of_reads: descriptor.number_of_reads(),
            kmer_size,
            window_size,
            representations: sketch.iter().map(|e| e.representation).collect(),
            read_ids: sketch.iter().map(|e| e.read_id).collect(),
            positions_in_reads: sketch.iter().map(|e| e.position).collect(),
            directions_of_reads: sketch.iter().map(|e| e.direction).collect(),
            unique_representations,
            first_occurrence_of_representations,
            read_names,
            read_lengths,
        }
    }

    /// Bytes the sketch arrays occupy once resident on the device
    pub fn device_bytes(&self) -> usize {
        self.representations.len() * size_of::<Representation>()
            + self.read_ids.len() * size_of::<ReadId>()
            + self.positions_in_reads.len() * size_of::<Position>()
            + self.directions_of_reads.len() * size_of::<Direction>()
            + self.unique_representations.len() * size_of::<Representation>()
            + self.first_occurrence_of_representations.len() * size_of::<u32>()
    }

    /// Bytes held in host memory, including read metadata
    pub fn host_bytes(&self) -> usize {
        self.device_bytes()
            + self.read_lengths.len() * size_of::<u32>()
            + self.read_names.iter().map(String::len).sum::<usize>()
    }

    pub fn descriptor(&self) -> IndexDescriptor {
        IndexDescriptor::new(self.first_read, self.number_of_reads)
    }
}

/// A built index whose sketch arrays hold one device reservation.
///
/// The reservation is released when the last handle to the index is dropped.
#[derive(Debug)]
pub struct DeviceIndex {
    contents: IndexContents,
    allocation: DeviceAllocation,
}

impl DeviceIndex {
    /// Reserve device memory for `contents` and copy them over on `stream`
    pub fn upload(
        contents: IndexContents,
        allocator: &dyn DeviceAllocator,
        stream: &ExecutionStream,
    ) -> CacheResult<Self> {
        let allocation = allocator.allocate(contents.device_bytes(), stream)?;
        let contents = stream.enqueue("host_to_device", move || contents);
        Ok(Self {
            contents,
            allocation,
        })
    }

    pub fn contents(&self) -> &IndexContents {
        &self.contents
    }

    pub fn descriptor(&self) -> IndexDescriptor {
        self.contents.descriptor()
    }

    pub fn first_read(&self) -> ReadId {
        self.contents.first_read
    }

    pub fn number_of_reads(&self) -> ReadId {
        self.contents.number_of_reads
    }

    /// Smallest read id covered, `None` for an index over zero reads
    pub fn smallest_read_id(&self) -> Option<ReadId> {
        (self.contents.number_of_reads > 0).then_some(self.contents.first_read)
    }

    /// Largest read id covered, `None` for an index over zero reads
    pub fn largest_read_id(&self) -> Option<ReadId> {
        (self.contents.number_of_reads > 0)
            .then(|| self.contents.first_read + (self.contents.number_of_reads - 1))
    }

    pub fn kmer_size(&self) -> u32 {
        self.contents.kmer_size
    }

    pub fn window_size(&self) -> u32 {
        self.contents.window_size
    }

    pub fn representations(&self) -> &[Representation] {
        &self.contents.representations
    }

    pub fn read_ids(&self) -> &[ReadId] {
        &self.contents.read_ids
    }

    pub fn positions_in_reads(&self) -> &[Position] {
        &self.contents.positions_in_reads
    }

    pub fn directions_of_reads(&self) -> &[Direction] {
        &self.contents.directions_of_reads
    }

    pub fn unique_representations(&self) -> &[Representation] {
        &self.contents.unique_representations
    }

    pub fn first_occurrence_of_representations(&self) -> &[u32] {
        &self.contents.first_occurrence_of_representations
    }

    /// Name of a read by its global id
    pub fn read_name(&self, read_id: ReadId) -> Option<&str> {
        self.local_read(read_id)
            .and_then(|i| self.contents.read_names.get(i))
            .map(String::as_str)
    }

    /// Length of a read by its global id
    pub fn read_length(&self, read_id: ReadId) -> Option<u32> {
        self.local_read(read_id)
            .and_then(|i| self.contents.read_lengths.get(i))
            .copied()
    }

    pub fn number_of_basepairs_in_longest_read(&self) -> u32 {
        self.contents.read_lengths.iter().copied().max().unwrap_or(0)
    }

    pub fn number_of_sketch_elements(&self) -> usize {
        self.contents.representations.len()
    }

    /// Bytes reserved on the device for this index
    pub fn device_bytes(&self) -> usize {
        self.allocation.bytes()
    }

    /// Range of sketch elements carrying `representation` (empty if absent)
    pub fn occurrences(&self, representation: Representation) -> Range<usize> {
        match self
            .contents
            .unique_representations
            .binary_search(&representation)
        {
            Ok(i) => {
                let first = &self.contents.first_occurrence_of_representations;
                first[i] as usize..first[i + 1] as usize
            }
            Err(_) => 0..0,
        }
    }

    /// Sketch elements carrying `representation`
    pub fn sketch_elements(&self, representation: Representation) -> Vec<SketchElement> {
        self.occurrences(representation)
            .map(|i| SketchElement {
                representation: self.contents.representations[i],
                read_id: self.contents.read_ids[i],
                position: self.contents.positions_in_reads[i],
                direction: self.contents.directions_of_reads[i],
            })
            .collect()
    }

    fn local_read(&self, read_id: ReadId) -> Option<usize> {
        read_id
            .checked_sub(self.contents.first_read)
            .filter(|offset| *offset < self.contents.number_of_reads)
            .map(|offset| offset as usize)
    }
}
