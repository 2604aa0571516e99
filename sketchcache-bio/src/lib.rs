//! Sequence handling for sketchcache

pub mod formats;
pub mod sequence;
pub mod source;

// Re-export commonly used types
pub use formats::fasta::{parse_fasta, parse_fasta_from_bytes, write_fasta};
pub use sequence::Sequence;
pub use source::{InMemorySequenceSource, SequenceSource};
