use crate::cli::output::{self, create_standard_table, format_number, format_size, header_cell};
use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;
use indicatif::ProgressBar;
use serde::Serialize;
use sketchcache_bio::{parse_fasta, InMemorySequenceSource, SequenceSource};
use sketchcache_core::{load_config, Config, IndexDescriptor, SketchCacheError};
use sketchcache_index::{
    partition_reads, CacheStats, DeviceAllocator, DeviceIndexCache, ExecutionStream,
    HostIndexCache, PoolAllocator, Representation,
};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Args)]
pub struct OverlapArgs {
    /// Query reads (FASTA, optionally gzipped)
    #[arg(short, long, value_name = "FILE")]
    pub query: PathBuf,

    /// Target reads; the query is mapped against itself when omitted
    #[arg(short, long, value_name = "FILE")]
    pub target: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Reads per index window
    #[arg(long, value_name = "N")]
    pub reads_per_index: Option<u32>,

    /// K-mer size
    #[arg(short = 'k', long)]
    pub kmer_size: Option<u32>,

    /// Minimizer window size
    #[arg(short = 'w', long)]
    pub window_size: Option<u32>,

    /// Never share indices between the query and target roles
    #[arg(long)]
    pub no_reuse: bool,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", value_parser = ["table", "json"])]
    pub format: Option<String>,
}

/// Shared minimizer count of one query/target window pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowPairOverlap {
    pub query: IndexDescriptor,
    pub target: IndexDescriptor,
    pub shared_representations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlapReport {
    pub query_reads: u32,
    pub target_reads: u32,
    pub self_mapping: bool,
    pub pairs: Vec<WindowPairOverlap>,
    pub host_cache: CacheStats,
    pub device_cache: CacheStats,
    pub device_bytes_in_use: usize,
}

pub fn run(args: OverlapArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let query = load_source(&args.query)?;
    let target = args.target.as_deref().map(load_source).transpose()?;

    let progress = if config.output.format == "table" {
        output::create_progress_bar(0, "Comparing windows")
    } else {
        ProgressBar::hidden()
    };
    let report = compute_overlaps(&config, query, target, &progress)?;
    progress.finish_and_clear();

    match config.output.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_report(&report),
    }
    Ok(())
}

/// Configuration from file or defaults, with command line overrides applied
pub fn resolve_config(args: &OverlapArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    if let Some(n) = args.reads_per_index {
        config.cache.reads_per_index = n;
    }
    if let Some(k) = args.kmer_size {
        config.index.kmer_size = k;
    }
    if let Some(w) = args.window_size {
        config.index.window_size = w;
    }
    if args.no_reuse {
        config.cache.reuse_host = false;
        config.cache.reuse_device = false;
    }
    if let Some(format) = &args.format {
        config.output.format = format.clone();
    }

    config.validate()?;
    Ok(config)
}

fn load_source(path: &Path) -> Result<Arc<dyn SequenceSource>> {
    let sequences = parse_fasta(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if sequences.len() > u32::MAX as usize {
        return Err(SketchCacheError::InvalidInput(format!(
            "{} holds more than {} reads",
            path.display(),
            u32::MAX
        ))
        .into());
    }
    info!("Loaded {} reads from {}", sequences.len(), path.display());
    Ok(Arc::new(InMemorySequenceSource::new(sequences)))
}

/// Number of values present in both sorted, deduplicated slices
pub fn count_shared(a: &[Representation], b: &[Representation]) -> usize {
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    shared
}

/// Compare every query window with every target window through the caches.
///
/// Without a target the query is compared with itself, only pairs whose
/// target window does not precede the query window are visited, and indices
/// are shared between roles when the configuration allows it. With a separate
/// target the roles read different reads, so nothing is shared.
pub fn compute_overlaps(
    config: &Config,
    query: Arc<dyn SequenceSource>,
    target: Option<Arc<dyn SequenceSource>>,
    progress: &ProgressBar,
) -> Result<OverlapReport> {
    let self_mapping = target.is_none();
    let target = target.unwrap_or_else(|| query.clone());

    let allocator: Arc<dyn DeviceAllocator> = match config.cache.device_memory_bytes {
        Some(bytes) => Arc::new(PoolAllocator::with_capacity(bytes)),
        None => Arc::new(PoolAllocator::unbounded()),
    };
    let stream = ExecutionStream::new();

    let host = Arc::new(HostIndexCache::new(
        self_mapping && config.cache.reuse_host,
        allocator.clone(),
        query.clone(),
        target.clone(),
        config.index.parameters(),
        stream,
    ));
    let device = DeviceIndexCache::new(self_mapping && config.cache.reuse_device, host.clone());

    let reads_per_index = config.cache.reads_per_index;
    let query_windows = partition_reads(query.number_of_reads(), reads_per_index);
    let target_windows = partition_reads(target.number_of_reads(), reads_per_index);

    let plan: Vec<(IndexDescriptor, Vec<IndexDescriptor>)> = query_windows
        .iter()
        .map(|q| {
            let targets = target_windows
                .iter()
                .filter(|t| !self_mapping || t.first_read() >= q.first_read())
                .copied()
                .collect();
            (*q, targets)
        })
        .collect();
    progress.set_length(plan.iter().map(|(_, t)| t.len() as u64).sum());

    let mut pairs = Vec::new();
    for (query_window, targets) in &plan {
        host.update_query_cache(&[*query_window])?;
        device.update_query_cache(&[*query_window])?;
        let query_index = device.get_index_from_query_cache(query_window)?;

        for target_window in targets {
            host.update_target_cache(&[*target_window])?;
            device.update_target_cache(&[*target_window])?;
            let target_index = device.get_index_from_target_cache(target_window)?;

            pairs.push(WindowPairOverlap {
                query: *query_window,
                target: *target_window,
                shared_representations: count_shared(
                    query_index.unique_representations(),
                    target_index.unique_representations(),
                ),
            });
            progress.inc(1);
        }
    }

    info!(
        "Compared {} window pairs; host cache: {}; device cache: {}",
        pairs.len(),
        host.stats(),
        device.stats()
    );

    Ok(OverlapReport {
        query_reads: query.number_of_reads(),
        target_reads: target.number_of_reads(),
        self_mapping,
        pairs,
        host_cache: host.stats(),
        device_cache: device.stats(),
        device_bytes_in_use: allocator.bytes_in_use(),
    })
}

fn print_report(report: &OverlapReport) {
    output::section_header("Window Overlaps");
    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Query reads"),
        header_cell("Target reads"),
        header_cell("Shared minimizers"),
    ]);
    for pair in &report.pairs {
        table.add_row(vec![
            Cell::new(pair.query.to_string()),
            Cell::new(pair.target.to_string()),
            Cell::new(format_number(pair.shared_representations)),
        ]);
    }
    println!("{}", table);

    output::section_header("Cache Statistics");
    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Tier"),
        header_cell("Updates"),
        header_cell("Failed"),
        header_cell("Materialized"),
        header_cell("Reused"),
        header_cell("Lookups"),
        header_cell("Misses"),
    ]);
    for (tier, stats) in [("host", &report.host_cache), ("device", &report.device_cache)] {
        table.add_row(vec![
            Cell::new(tier),
            Cell::new(stats.updates),
            Cell::new(stats.failed_updates),
            Cell::new(stats.materialized),
            Cell::new(stats.reused),
            Cell::new(stats.lookups),
            Cell::new(stats.misses),
        ]);
    }
    println!("{}", table);

    output::info(&format!(
        "{} query reads, {} target reads{}",
        format_number(report.query_reads as usize),
        format_number(report.target_reads as usize),
        if report.self_mapping { " (self mapping)" } else { "" }
    ));
    output::info(&format!(
        "Device memory in use: {}",
        format_size(report.device_bytes_in_use)
    ));
}
