use crate::cli::output;
use anyhow::Result;
use clap::Args;
use sketchcache_core::config::{default_config, save_config};
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigArgs {
    /// Where to write the configuration
    #[arg(short, long, value_name = "FILE", default_value = "sketchcache.toml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        );
    }

    save_config(&args.output, &default_config())?;
    output::success(&format!(
        "Wrote default configuration to {}",
        args.output.display()
    ));
    Ok(())
}
