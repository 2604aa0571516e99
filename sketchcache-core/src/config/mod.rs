//! Configuration types for sketchcache

use crate::types::IndexParameters;
use crate::SketchCacheError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_kmer_size")]
    pub kmer_size: u32,
    #[serde(default = "default_window_size")]
    pub window_size: u32,
    #[serde(default = "default_hash_representations")]
    pub hash_representations: bool,
    #[serde(default = "default_filtering_parameter")]
    pub filtering_parameter: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Reuse host copies across the query and target roles
    #[serde(default = "default_reuse")]
    pub reuse_host: bool,
    /// Share device indices across the query and target roles
    #[serde(default = "default_reuse")]
    pub reuse_device: bool,
    /// Number of reads each index covers
    #[serde(default = "default_reads_per_index")]
    pub reads_per_index: u32,
    /// Device memory budget in bytes (unbounded when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_memory_bytes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: String,
}

// Default value functions
fn default_kmer_size() -> u32 { 15 }
fn default_window_size() -> u32 { 10 }
fn default_hash_representations() -> bool { true }
fn default_filtering_parameter() -> f64 { 1.0 }
fn default_reuse() -> bool { true }
fn default_reads_per_index() -> u32 { 10000 }
fn default_format() -> String { "table".to_string() }

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            kmer_size: default_kmer_size(),
            window_size: default_window_size(),
            hash_representations: default_hash_representations(),
            filtering_parameter: default_filtering_parameter(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            reuse_host: default_reuse(),
            reuse_device: default_reuse(),
            reads_per_index: default_reads_per_index(),
            device_memory_bytes: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

impl IndexConfig {
    pub fn parameters(&self) -> IndexParameters {
        IndexParameters {
            kmer_size: self.kmer_size,
            window_size: self.window_size,
            hash_representations: self.hash_representations,
            filtering_parameter: self.filtering_parameter,
        }
    }
}

impl Config {
    /// Reject values no index or cache could be built with
    pub fn validate(&self) -> Result<(), SketchCacheError> {
        self.index
            .parameters()
            .validate()
            .map_err(SketchCacheError::Configuration)?;
        if self.cache.reads_per_index == 0 {
            return Err(SketchCacheError::Configuration(
                "reads_per_index must be at least 1".to_string(),
            ));
        }
        match self.output.format.as_str() {
            "table" | "json" => Ok(()),
            other => Err(SketchCacheError::Configuration(format!(
                "Unknown output format: {}",
                other
            ))),
        }
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, SketchCacheError> {
    let path = path.as_ref();
    tracing::debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| SketchCacheError::Configuration(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), SketchCacheError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| SketchCacheError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
