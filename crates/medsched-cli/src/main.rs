mod collect;
mod sink;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::sink::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "medsched-cli")]
#[command(about = "Physician directory and schedule collector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the sources defined in the sources file
    Sources,
    /// Scrape one or all sources and write their records
    Collect {
        /// Restrict collection to a single source (by name)
        #[arg(long)]
        source: Option<String>,

        /// Output encoding
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output directory; defaults to `MEDSCHED_OUTPUT_DIR`
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the listing pages that would be fetched without fetching them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = medsched_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(
        env = %config.env,
        sources = %config.sources_path.display(),
        "medsched starting"
    );

    let cli = Cli::parse();
    let sources = medsched_core::load_sources(&config.sources_path)?;

    match cli.command {
        Commands::Sources => collect::print_sources(&sources),
        Commands::Collect {
            source,
            format,
            output,
            dry_run,
        } => {
            let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
            collect::run_collect(
                &config,
                &sources,
                source.as_deref(),
                format,
                &output_dir,
                dry_run,
            )
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
