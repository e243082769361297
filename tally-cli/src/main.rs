use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod logging;
mod sheets;
mod state;
mod sync;

use config::{SyncOverrides, load_config};
use sheets::GoogleSheetsSink;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version,
    about = "Normalize bank CSV exports and append them to a Google Sheet"
)]
struct Cli {
    /// Config file (default: ~/.tally/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every normalized row
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a statement CSV, write <name>_transformed.csv and append it to the sheet
    Sync {
        /// Institution key (capitalOne, schwab); overrides the config
        #[arg(long)]
        institution: Option<String>,

        /// Statement CSV; overrides the institution's csv_path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Directory for the transformed copy (default: config output_dir)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Only write the local transformed CSV
        #[arg(long)]
        no_upload: bool,
    },

    /// Write a starter config if none exists
    InitConfig,

    /// Print the resolved config
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config_path = match cli.config {
        Some(p) => p,
        None => state::default_config_path()?,
    };

    match cli.command {
        Command::Sync {
            institution,
            csv,
            output_dir,
            no_upload,
        } => {
            let overrides = SyncOverrides {
                institution,
                csv,
                output_dir,
                no_upload,
            };
            run_sync(&config_path, &overrides).await?;
        }

        Command::InitConfig => {
            config::init_config(&config_path)?;
        }

        Command::ShowConfig => {
            let cfg = load_config(&config_path)?;
            println!("# {}", config_path.display());
            println!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
        }
    }

    Ok(())
}

async fn run_sync(config_path: &std::path::Path, overrides: &SyncOverrides) -> Result<()> {
    let cfg = load_config(config_path)?;
    let plan = cfg
        .plan(overrides)
        .with_context(|| format!("invalid configuration ({})", config_path.display()))?;

    let sink = plan.upload.clone().map(GoogleSheetsSink::new);
    let pipeline = &plan.pipeline;
    let report = sync::sync_with(pipeline, sink.as_ref()).await?;

    println!(
        "Normalized {} rows from {} ({})",
        report.rows.len(),
        pipeline.input().display(),
        pipeline.institution()
    );
    println!("Dropped {} non-transaction rows", report.dropped);
    if !report.malformed.is_empty() {
        println!("Skipped {} malformed lines:", report.malformed.len());
        for err in &report.malformed {
            println!("  {err}");
        }
    }
    println!("Wrote {}", pipeline.artifact_path().display());

    match &plan.upload {
        Some(target) => println!(
            "Appended {} rows to sheet '{}'",
            report.rows.len(),
            target.sheet_title
        ),
        None => println!("Upload skipped (--no-upload)"),
    }

    Ok(())
}
