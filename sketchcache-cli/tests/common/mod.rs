#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use sketchcache_bio::Sequence;
use std::path::PathBuf;
use tempfile::TempDir;

/// Command for the sketchcache binary with logging silenced
pub fn sketchcache_cmd() -> Command {
    let mut cmd = Command::cargo_bin("sketchcache").unwrap();
    cmd.env("SKETCHCACHE_LOG", "off");
    cmd
}

/// Temporary directory holding inputs and outputs of one test
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn write_reads(&self, name: &str, reads: &[Sequence]) -> Result<PathBuf> {
        sketchcache_test::create_test_fasta(self.temp_dir.path(), name, reads)
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}
