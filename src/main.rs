use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use ravensite::build::Site;
use ravensite::config::{Config, Environment};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// An incremental static site generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deletes the output directory if there is one and rebuilds the site
    Build {
        /// A directory inside the project (the project file is searched for
        /// upwards from here)
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Output directory (relative to the project root)
        #[arg(short, long, default_value = "dist")]
        output: PathBuf,

        /// Include drafts regardless of the configured environment
        #[arg(long)]
        dev: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Build {
            project,
            output,
            dev,
        } => build(project, output, dev).await,
    }
}

async fn build(project: PathBuf, output: PathBuf, dev: bool) -> Result<()> {
    let mut config = Config::from_directory(&std::fs::canonicalize(&project)?, &output)?;
    if dev {
        config.environment = Environment::Development;
    }

    let mut site = Site::new(config)?;
    let report = site.build().await?;
    for err in &report.content_failures {
        error!(%err, "content");
    }
    for err in &report.page_failures {
        error!(%err, "page");
    }
    for err in &report.write_failures {
        error!(%err, "route");
    }
    info!(
        written = report.written,
        output = %site.config().output_directory.display(),
        "build finished"
    );
    if !report.is_success() {
        bail!("{} item(s) failed to build", report.failure_count());
    }
    Ok(())
}
