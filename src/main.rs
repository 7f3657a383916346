use anyhow::Context;
use bena_watermark::config::Config;
use bena_watermark::upload::process_upload;
use bena_watermark::watermark::{FontLocator, WatermarkProcessor};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Bena Watermark - stamps image or text watermarks onto uploaded JPEG/PNG files
#[derive(Parser, Debug)]
#[command(name = "bena-watermark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "bena-watermark.yaml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,

    /// Uploaded files to process in place
    #[arg(required_unless_present = "test")]
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging subsystem
    bena_watermark::logging::init_subscriber(args.json_logs)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize logging subsystem")?;

    // Load configuration from file
    let config = Config::from_file(&args.config)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Invalid configuration")?;

    for warning in config.warnings() {
        tracing::warn!(warning = %warning, "Configuration warning");
    }

    tracing::info!(
        config_file = %args.config.display(),
        mode = ?config.watermark.mode,
        position = config.watermark.position.as_str(),
        filename_prefix = config.upload.enable_filename_prefix,
        "Configuration loaded successfully"
    );

    if args.test {
        return Ok(());
    }

    let fonts = if config.font_candidates.is_empty() {
        FontLocator::shared()
    } else {
        Arc::new(FontLocator::with_extra_candidates(&config.font_candidates))
    };
    let processor = WatermarkProcessor::new(fonts);
    let watermark = config.watermark.sanitized();

    for file in &args.files {
        if !file.is_file() {
            tracing::warn!(path = %file.display(), "File not found, skipping");
            continue;
        }
        let final_path = process_upload(file, &config.upload, &processor, &watermark);
        if final_path != *file {
            tracing::info!(
                from = %file.display(),
                to = %final_path.display(),
                "Upload renamed"
            );
        }
    }

    Ok(())
}
