//! Minimizer index construction parameters

use serde::{Deserialize, Serialize};

/// Largest k-mer that still packs into a 64-bit representation
pub const MAX_KMER_SIZE: u32 = 32;

/// Parameters every index in a cache is built with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexParameters {
    /// k-mer length
    pub kmer_size: u32,
    /// Number of consecutive k-mers a minimizer is picked from
    pub window_size: u32,
    /// Store hashed representations instead of raw 2-bit encodings
    pub hash_representations: bool,
    /// Representations whose share of all sketch elements reaches this
    /// fraction are dropped. 1.0 disables filtering.
    pub filtering_parameter: f64,
}

impl IndexParameters {
    pub fn new(kmer_size: u32, window_size: u32) -> Self {
        Self {
            kmer_size,
            window_size,
            ..Self::default()
        }
    }

    pub fn with_hash_representations(mut self, hash_representations: bool) -> Self {
        self.hash_representations = hash_representations;
        self
    }

    pub fn with_filtering_parameter(mut self, filtering_parameter: f64) -> Self {
        self.filtering_parameter = filtering_parameter;
        self
    }

    /// Whether the filtering step has any effect
    pub fn filtering_enabled(&self) -> bool {
        self.filtering_parameter < 1.0
    }

    /// Check the parameters describe a buildable index
    pub fn validate(&self) -> Result<(), String> {
        if self.kmer_size == 0 || self.kmer_size > MAX_KMER_SIZE {
            return Err(format!(
                "kmer_size must be in 1..={}, got {}",
                MAX_KMER_SIZE, self.kmer_size
            ));
        }
        if self.window_size == 0 {
            return Err("window_size must be at least 1".to_string());
        }
        if !(self.filtering_parameter > 0.0 && self.filtering_parameter <= 1.0) {
            return Err(format!(
                "filtering_parameter must be in (0, 1], got {}",
                self.filtering_parameter
            ));
        }
        Ok(())
    }
}

impl Default for IndexParameters {
    fn default() -> Self {
        Self {
            kmer_size: 15,
            window_size: 10,
            hash_representations: true,
            filtering_parameter: 1.0,
        }
    }
}
