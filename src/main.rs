use anyhow::Context;
use clap::Parser;
use groundmotion::ShakemapConfig;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::util::SubscriberInitExt;

/// Plot PGD, PGV, PGA and elevation maps from a SeisSol ground-motion surface file
#[derive(Parser, Debug)]
#[command(name = "shakemaps")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// XDMF file holding the PGD, PGV and PGA cell fields
    filename: PathBuf,

    /// Output image (.jpg, .jpeg or .png), overrides the config file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file, defaults to ./shakemap_config.toml when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    // also bridges records from the `log` facade used by the libraries
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish()
        .try_init()?;

    let mut config = ShakemapConfig::load_or_default(cli.config.as_deref())?;
    if let Some(output) = cli.output {
        config.figure.output = output;
    }

    let report = shakemaps::run(&cli.filename, &config)
        .with_context(|| format!("failed to plot {}", cli.filename.display()))?;
    info!(
        "{} receivers plotted to {}",
        report.receivers,
        report.output.display()
    );
    Ok(())
}
