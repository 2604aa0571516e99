//! Test utilities for the sketchcache workspace
//!
//! Shared fixtures, mock collaborators and assertions for the integration
//! tests of the workspace crates.
//!
//! # Features
//!
//! - **Fixtures**: Deterministic random reads and FASTA files
//! - **Mock Implementations**: A builder that counts and fails on demand, an
//!   allocator that records every reservation
//! - **Assertions**: Index equivalence checks

pub mod assertions;
pub mod fixtures;
pub mod mock;

// Re-export commonly used items
pub use assertions::{assert_same_index, assert_valid_fasta};
pub use fixtures::{create_test_fasta, generate_overlapping_reads, generate_reads, reads_source};
pub use mock::{CountingBuilder, TrackingAllocator};

// Re-export test dependencies for convenience
pub use anyhow::{Context, Result};
pub use tempfile;

/// Initialize test logging (safe to call from every test)
///
/// Honors `RUST_LOG`; output is captured by the test harness.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
