pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sketchcache",
    version,
    about = "Minimizer index caching for windowed all-vs-all read overlap",
    long_about = "sketchcache splits query and target reads into windows, builds minimizer \
                  indices for them through a host and a device cache, and reports how many \
                  representations each query/target window pair shares."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count shared minimizers between query and target windows
    Overlap(commands::overlap::OverlapArgs),

    /// Write the default configuration file
    Config(commands::config::ConfigArgs),
}
