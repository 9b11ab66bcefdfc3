//! gram-import - migrate an Instagram export to Bluesky
//!
//! Loads the run configuration, establishes one authenticated session in
//! live mode, and drives the rate-limited import pass.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use libgramsky::config::{self, Config};
use libgramsky::importer::{run_import, ImportOptions, ImportSummary};
use libgramsky::platforms::bluesky::BlueskyPlatform;
use libgramsky::platforms::DestinationPlatform;
use libgramsky::{GramskyError, Result};

#[derive(Parser)]
#[command(name = "gram-import")]
#[command(about = "Import an Instagram export into a Bluesky account", long_about = None)]
struct Cli {
    /// Path to the config file (default: XDG config dir, or GRAMSKY_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root of the unpacked export (overrides the config file)
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Dry-run: no network calls, prints counts and a time estimate
    #[arg(long)]
    simulate: bool,

    /// Only import posts dated on or after this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    min_date: Option<String>,

    /// Stop the run at the first post dated after this date
    #[arg(long)]
    max_date: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    libgramsky::logging::init_default(cli.verbose);

    match run(&cli).await {
        Ok(summary) => {
            summary.display();
            info!("Import completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Import failed: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: &Cli) -> Result<ImportSummary> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    let options = build_options(cli, &config)?;

    if options.simulate {
        info!("Simulate mode: no posts will be created");
        return run_import(&options, None).await;
    }

    let bluesky = config
        .bluesky
        .as_ref()
        .ok_or_else(|| GramskyError::InvalidInput("bluesky credentials not configured".into()))?;
    let password = bluesky.resolve_password()?;

    let mut platform = BlueskyPlatform::new(bluesky.identifier.clone(), password).await?;
    // One session per run; a login failure aborts before any post is touched.
    platform.login().await?;
    info!("Authenticated with Bluesky as {}", bluesky.identifier);

    run_import(&options, Some(&platform)).await
}

fn build_options(cli: &Cli, config: &Config) -> Result<ImportOptions> {
    let archive_folder = cli
        .archive
        .clone()
        .unwrap_or_else(|| config.archive_folder());

    let min_date = cli
        .min_date
        .as_deref()
        .or(config.import.min_date.as_deref())
        .map(config::parse_date)
        .transpose()?;
    let max_date = cli
        .max_date
        .as_deref()
        .or(config.import.max_date.as_deref())
        .map(config::parse_date)
        .transpose()?;

    Ok(ImportOptions {
        simulate: cli.simulate || config.import.simulate,
        min_date,
        max_date,
        archive_folder,
    })
}
