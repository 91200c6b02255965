use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use k8s_debug_collector::cli::Args;
use k8s_debug_collector::collectors::collector::ClusterDumper;
use k8s_debug_collector::utils::process::SystemRunner;

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.verbose)?;

    info!("Starting cluster debug collection");

    let dumper = match ClusterDumper::new(args.to_options(), Box::new(SystemRunner)) {
        Ok(dumper) => dumper,
        Err(e) => {
            error!("Error: {:#}", e);
            return Err(e);
        }
    };

    match dumper.dump_cluster() {
        Ok(archive) => {
            info!("Collection completed: {}", archive.display());
            Ok(())
        }
        Err(e) => {
            error!("Error: {:#}", e);
            Err(e)
        }
    }
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ).context("Failed to initialize logger")?;
    Ok(())
}
