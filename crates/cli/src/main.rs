//! Binary entry point for the subtitle retiming tool.

use anyhow::{bail, Result};
use clap::{Args, Parser};
use std::fs;
use std::path::PathBuf;
use subfix_core::batch::process_files;
use subfix_core::RetimeConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod settings;

use settings::Settings;

/// Reflow subtitle text and fix cue timings in SRT files.
#[derive(Parser)]
#[command(name = "subfix", version)]
struct Cli {
    /// SRT files to process.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Folder the processed files are written to.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// JSON settings file with `timing` and `formatting` sections.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Number of files processed at the same time.
    #[arg(long, default_value_t = 4)]
    jobs: usize,

    /// Write a JSON summary of the run to this path.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable verbose debug and trace logs.
    #[arg(long)]
    debug: bool,

    #[command(flatten)]
    overrides: Overrides,
}

/// Command line values that take precedence over the settings file.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Minimum time a cue stays on screen, in seconds.
    #[arg(long)]
    min_duration: Option<f64>,

    /// Advisory maximum cue duration in seconds (reported, never enforced).
    #[arg(long)]
    max_duration: Option<f64>,

    /// Minimum gap between consecutive cues, in seconds.
    #[arg(long)]
    min_gap: Option<f64>,

    /// Reading speed in characters per second.
    #[arg(long)]
    chars_per_sec: Option<f64>,

    /// Maximum characters per line.
    #[arg(long)]
    chars_per_line: Option<usize>,

    /// Maximum lines per cue.
    #[arg(long)]
    max_lines: Option<usize>,
}

impl Overrides {
    fn apply(&self, base: RetimeConfig) -> RetimeConfig {
        RetimeConfig {
            min_duration: self.min_duration.unwrap_or(base.min_duration),
            max_duration: self.max_duration.unwrap_or(base.max_duration),
            min_gap: self.min_gap.unwrap_or(base.min_gap),
            chars_per_sec: self.chars_per_sec.unwrap_or(base.chars_per_sec),
            chars_per_line: self.chars_per_line.unwrap_or(base.chars_per_line),
            max_lines: self.max_lines.unwrap_or(base.max_lines),
        }
    }
}

fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::default()
            .add_directive("subfix=trace".parse()?)
            .add_directive("subfix_core=trace".parse()?)
            .add_directive("info".parse()?)
    } else {
        EnvFilter::default()
            .add_directive("subfix=info".parse()?)
            .add_directive("subfix_core=info".parse()?)
            .add_directive("warn".parse()?)
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

/// Application entry point which parses CLI args and performs actions.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let settings = Settings::load(cli.settings.as_deref())?;
    let config = cli.overrides.apply(settings.to_config());
    info!(?config, "effective configuration");

    let total = cli.inputs.len();
    let summary = process_files(cli.inputs, &cli.output_dir, config, cli.jobs).await?;
    if let Some(path) = &cli.report {
        fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        info!("wrote report to {}", path.display());
    }
    info!(
        "done! processed {}/{} files, saved to {}",
        summary.succeeded(),
        total,
        cli.output_dir.display()
    );
    if summary.failed() > 0 {
        bail!("{} of {} files failed", summary.failed(), total);
    }
    Ok(())
}
