use clap::Parser;
use colored::*;
use sketchcache_core::{CacheError, SketchCacheError};
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // SKETCHCACHE_LOG selects the filter; -v raises the default level
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = std::env::var("SKETCHCACHE_LOG")
        .ok()
        .and_then(|filter| EnvFilter::try_new(filter).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let num_threads = if cli.threads == 0 {
        num_cpus::get()
    } else {
        cli.threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;

    if cli.verbose > 0 {
        eprintln!("Using {} threads", num_threads);
    }

    match cli.command {
        Commands::Overlap(args) => crate::cli::commands::overlap::run(args),
        Commands::Config(args) => crate::cli::commands::config::run(args),
    }
}

/// Exit code for an error, based on its type
fn exit_code(e: &anyhow::Error) -> i32 {
    if let Some(err) = e.downcast_ref::<SketchCacheError>() {
        return match err {
            SketchCacheError::Configuration(_) => 2,
            SketchCacheError::Io(_) => 3,
            SketchCacheError::Parse(_) => 4,
            SketchCacheError::Cache(_) => 5,
            _ => 1,
        };
    }
    if e.downcast_ref::<CacheError>().is_some() {
        return 5;
    }
    1
}
