//! Test fixtures and data generators

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sketchcache_bio::{write_fasta, InMemorySequenceSource, Sequence, SequenceSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

fn random_bases(rng: &mut StdRng, length: usize) -> Vec<u8> {
    (0..length).map(|_| BASES[rng.gen_range(0..4)]).collect()
}

fn reverse_complement(bases: &[u8]) -> Vec<u8> {
    bases
        .iter()
        .rev()
        .map(|b| match b {
            b'A' => b'T',
            b'C' => b'G',
            b'G' => b'C',
            _ => b'A',
        })
        .collect()
}

/// Generate independent random reads
pub fn generate_reads(count: usize, length: usize) -> Vec<Sequence> {
    let mut rng = StdRng::seed_from_u64(42); // Deterministic for tests

    (0..count)
        .map(|i| Sequence::new(format!("read_{}", i), random_bases(&mut rng, length)))
        .collect()
}

/// Generate reads sampled from one random genome, half of them reverse
/// complemented, so that reads share minimizers
pub fn generate_overlapping_reads(
    count: usize,
    read_length: usize,
    genome_length: usize,
    seed: u64,
) -> Vec<Sequence> {
    let mut rng = StdRng::seed_from_u64(seed);
    let genome = random_bases(&mut rng, genome_length.max(read_length));

    (0..count)
        .map(|i| {
            let start = rng.gen_range(0..=genome.len() - read_length);
            let mut bases = genome[start..start + read_length].to_vec();
            if rng.gen_bool(0.5) {
                bases = reverse_complement(&bases);
            }
            Sequence::new(format!("read_{}", i), bases)
        })
        .collect()
}

/// Random reads wrapped as a shared source
pub fn reads_source(count: usize, length: usize) -> Arc<dyn SequenceSource> {
    Arc::new(InMemorySequenceSource::new(generate_reads(count, length)))
}

/// Write `sequences` to `dir/name` and return the path
pub fn create_test_fasta(dir: &Path, name: &str, sequences: &[Sequence]) -> Result<PathBuf> {
    let path = dir.join(name);
    write_fasta(&path, sequences)?;
    Ok(path)
}
