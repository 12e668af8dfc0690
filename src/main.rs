use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde::Serialize;
use tracing::info;

use s3push::config::Config;
use s3push::s3::{self, Transport, UploadResult, build_plans};

#[derive(Parser, Debug)]
#[command(
    name = "s3push",
    version = env!("CARGO_PKG_VERSION"),
    about = "Upload files and directory trees to S3-compatible storage",
    long_about = "Uploads one or more files/directories to an S3-compatible bucket under a \
                  context path, optionally purging existing objects beneath that path first. \
                  Uploads run strictly in order and the first failure aborts the batch.",
    after_help = "Examples:\n  \
                  s3push ./dist --context releases/v1     # Upload a directory tree\n  \
                  s3push file.bin --cleanup               # Purge the prefix, then upload\n  \
                  s3push ./dist --no-overwrite            # Fail on existing keys\n\n\
                  Configuration (.env):\n  \
                  AWS_REGION=us-west-2\n  \
                  S3_BUCKET=my-bucket\n  \
                  S3_CONTEXT_PATH=uploads"
)]
struct Cli {
    /// Files or directories to upload (falls back to S3_SOURCES)
    paths: Vec<String>,

    /// Target bucket (overrides S3_BUCKET)
    #[arg(long)]
    bucket: Option<String>,

    /// AWS region (overrides AWS_REGION)
    #[arg(long)]
    region: Option<String>,

    /// Context path under which objects are stored
    #[arg(long)]
    context: Option<String>,

    /// Remove existing objects under the context path before uploading
    #[arg(long)]
    cleanup: bool,

    /// Fail when a destination key already exists instead of overwriting
    #[arg(long)]
    no_overwrite: bool,

    /// Custom S3-compatible endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Use path-style addressing (required by some providers like MinIO)
    #[arg(long)]
    force_path_style: bool,

    /// Shared AWS credentials profile to load
    #[arg(long)]
    profile: Option<String>,
}

#[derive(Serialize)]
struct Summary {
    bucket: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    context_path: String,
    cleanup_enabled: bool,
    objects_removed: usize,
    objects_uploaded: Vec<UploadResult>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config::from_env loads the .env file, so LOG_LEVEL is read after it.
    let config = resolve_config(&cli)?;

    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let sources = if cli.paths.is_empty() {
        config.sources.clone()
    } else {
        cli.paths.clone()
    };
    if sources.is_empty() {
        anyhow::bail!("at least one source path is required (pass paths or set S3_SOURCES)");
    }

    println!(
        "{}",
        style(format!(
            "📦 Target: s3://{}/{}",
            config.bucket, config.context_path
        ))
        .cyan()
        .bold()
    );

    let plans = build_plans(&sources, &config.context_path)?;
    info!(files = plans.len(), "upload plan ready");

    let client = s3::build_client(&config).await?;
    let transport = Transport::new(
        client.clone(),
        client,
        config.bucket.clone(),
        config.overwrite,
    );

    let mut removed = 0;
    if config.cleanup {
        removed = transport
            .cleanup(&config.context_path)
            .await
            .map_err(|err| {
                anyhow::anyhow!("cleanup failed after removing {} objects: {}", err.removed, err)
            })?;
        info!(deleted = removed, prefix = %config.context_path, "cleanup completed");
    }

    let results = transport.upload(&plans).await?;
    info!(uploaded = results.len(), "upload completed");

    let summary = Summary {
        bucket: config.bucket,
        region: config.region,
        context_path: config.context_path,
        cleanup_enabled: config.cleanup,
        objects_removed: removed,
        objects_uploaded: results,
    };

    let payload = serde_json::to_string_pretty(&summary)
        .context("failed to encode execution summary")?;
    println!("{payload}");

    Ok(())
}

/// Merge CLI flags over the environment-derived configuration.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(bucket) = &cli.bucket {
        config.bucket = bucket.trim().to_string();
    }
    if let Some(region) = &cli.region {
        config.region = region.trim().to_string();
    }
    if let Some(context) = &cli.context {
        config.context_path = s3push::s3::key::normalize_prefix(context);
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = Some(endpoint.trim().to_string());
    }
    if let Some(profile) = &cli.profile {
        config.profile = Some(profile.trim().to_string());
    }
    if cli.cleanup {
        config.cleanup = true;
    }
    if cli.no_overwrite {
        config.overwrite = false;
    }
    if cli.force_path_style {
        config.force_path_style = true;
    }

    config.validate()?;
    Ok(config)
}
