//! Image-to-video generator binary.
//!
//! Usage: `vidgen <output-file> <image>...`
//!
//! Configuration comes from the environment (`VIDGEN_MODEL_PATH`,
//! `VIDGEN_FRAME_RATE`, `VIDGEN_OUTPUT_FORMAT`,
//! `VIDGEN_ENCODE_TIMEOUT_SECS`), with a `.env` file honored.

mod config;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::CliConfig;
use vidgen_media::VideoGenerator;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vidgen=info".parse().unwrap())
        .add_directive("ort=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    if let Err(e) = run().await {
        error!("vidgen failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output_file = match args.next() {
        Some(path) => PathBuf::from(path),
        None => bail!("usage: vidgen <output-file> <image>..."),
    };
    let image_files: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if image_files.is_empty() {
        bail!("usage: vidgen <output-file> <image>...");
    }

    let cli_config = CliConfig::from_env();
    let config = cli_config.generator_config(&output_file);
    info!(
        model = %config.model_path.display(),
        frame_rate = config.frame_rate,
        format = %config.output_format,
        images = image_files.len(),
        "starting generation"
    );

    let mut images = Vec::with_capacity(image_files.len());
    for path in &image_files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read image {}", path.display()))?;
        images.push(bytes);
    }

    let mut generator = VideoGenerator::new(config)?;
    if let Some(secs) = cli_config.encode_timeout_secs {
        generator = generator.with_encode_timeout(secs);
    }

    generator.initialize().await.context("model load failed")?;

    let video = generator
        .generate(&images)
        .await
        .context("video generation failed")?;

    tokio::fs::write(&output_file, video.as_bytes())
        .await
        .with_context(|| format!("failed to write {}", output_file.display()))?;

    info!(
        output = %output_file.display(),
        size_bytes = video.len(),
        "video written"
    );

    Ok(())
}
