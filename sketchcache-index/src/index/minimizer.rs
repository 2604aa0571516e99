//! Canonical (w,k)-minimizer sketching of a single read

use serde::{Deserialize, Serialize};
use sketchcache_core::ReadId;

/// Encoded (and optionally hashed) k-mer value
pub type Representation = u64;

/// Offset of a k-mer's first base within its read
pub type Position = u32;

/// Strand a minimizer was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Forward = 0,
    Reverse = 1,
}

/// One minimizer of one read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SketchElement {
    pub representation: Representation,
    pub read_id: ReadId,
    pub position: Position,
    pub direction: Direction,
}

/// 2-bit code of a nucleotide, `None` for anything but A/C/G/T
#[inline]
pub fn encode_base(base: u8) -> Option<u64> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Mask covering the `2 * kmer_size` low bits
#[inline]
pub fn kmer_mask(kmer_size: u32) -> u64 {
    if kmer_size >= 32 {
        u64::MAX
    } else {
        (1u64 << (2 * kmer_size)) - 1
    }
}

/// Invertible integer mix restricted to `mask`, so distinct k-mers keep
/// distinct representations
#[inline]
pub fn hash64(key: u64, mask: u64) -> u64 {
    let mut key = (!key).wrapping_add(key << 21) & mask;
    key ^= key >> 24;
    key = key.wrapping_add(key << 3).wrapping_add(key << 8) & mask;
    key ^= key >> 14;
    key = key.wrapping_add(key << 2).wrapping_add(key << 4) & mask;
    key ^= key >> 28;
    key = key.wrapping_add(key << 31) & mask;
    key
}

#[derive(Clone, Copy)]
struct Kmer {
    representation: Representation,
    position: Position,
    direction: Direction,
}

/// Canonical k-mers of a read in position order, `None` where the k-mer
/// contains a non-ACGT base
fn canonical_kmers(bases: &[u8], kmer_size: u32, hash_representations: bool) -> Vec<Option<Kmer>> {
    let k = kmer_size as usize;
    if bases.len() < k {
        return Vec::new();
    }

    let mask = kmer_mask(kmer_size);
    let shift = 2 * (kmer_size - 1);
    let mut forward = 0u64;
    let mut reverse = 0u64;
    let mut valid = 0usize;
    let mut kmers = Vec::with_capacity(bases.len() - k + 1);

    for (i, &base) in bases.iter().enumerate() {
        match encode_base(base) {
            Some(code) => {
                forward = ((forward << 2) | code) & mask;
                reverse = (reverse >> 2) | ((3 - code) << shift);
                valid += 1;
            }
            None => valid = 0,
        }

        if i + 1 < k {
            continue;
        }

        if valid < k {
            kmers.push(None);
            continue;
        }

        let (value, direction) = if forward <= reverse {
            (forward, Direction::Forward)
        } else {
            (reverse, Direction::Reverse)
        };
        let representation = if hash_representations {
            hash64(value, mask)
        } else {
            value
        };
        kmers.push(Some(Kmer {
            representation,
            position: (i + 1 - k) as Position,
            direction,
        }));
    }

    kmers
}

/// Minimizers of one read.
///
/// Every window of `window_size` consecutive k-mers contributes its smallest
/// representation (leftmost on ties). A k-mer picked by several consecutive
/// windows is emitted once. Reads with fewer than `window_size` k-mers are
/// treated as a single window.
pub fn sketch_read(
    bases: &[u8],
    read_id: ReadId,
    kmer_size: u32,
    window_size: u32,
    hash_representations: bool,
) -> Vec<SketchElement> {
    let kmers = canonical_kmers(bases, kmer_size, hash_representations);
    if kmers.is_empty() {
        return Vec::new();
    }

    let w = (window_size as usize).clamp(1, kmers.len());
    let mut sketch: Vec<SketchElement> = Vec::new();

    for window in kmers.windows(w) {
        let best = window
            .iter()
            .flatten()
            .fold(None::<&Kmer>, |best, kmer| match best {
                Some(b) if b.representation <= kmer.representation => Some(b),
                _ => Some(kmer),
            });

        if let Some(kmer) = best {
            if sketch.last().map(|last| last.position) != Some(kmer.position) {
                sketch.push(SketchElement {
                    representation: kmer.representation,
                    read_id,
                    position: kmer.position,
                    direction: kmer.direction,
                });
            }
        }
    }

    sketch
}
