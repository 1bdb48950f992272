//! ocd-items - transform harvested OAI-PMH records into index documents
//!
//! Reads XML files (or standard input), transforms every record with the
//! configured source transformer and writes one JSON document per record.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ocd_items::{config::LoggingConfig, models::TransformedItem, AppConfig, TransformService};

#[derive(Parser, Debug)]
#[command(name = "ocd-items", version, about)]
struct Args {
    /// XML files to transform, `-` for standard input
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Override the configured source id
    #[arg(long)]
    source_id: Option<String>,

    /// Pretty-print instead of writing JSON Lines
    #[arg(long)]
    pretty: bool,

    /// Only emit the identity record of each item
    #[arg(long)]
    identity_only: bool,
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(source_id) = &args.source_id {
        config.source.id = source_id.clone();
    }

    init_tracing(&config.logging);

    tracing::info!("Starting ocd-items v{}", env!("CARGO_PKG_VERSION"));

    let service = TransformService::from_config(config.source.clone())
        .context("Failed to create transform service")?;

    tracing::info!(
        "Transforming for source '{}' with transformer '{}'",
        service.source().id,
        service.source().transformer
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0usize;
    let mut transformed = 0usize;

    for input in &args.inputs {
        let xml = match read_input(input) {
            Ok(xml) => xml,
            Err(e) => {
                tracing::error!("Failed to read {}: {}", input.display(), e);
                failed += 1;
                continue;
            }
        };

        match service.transform_xml(&xml) {
            Ok(items) => {
                tracing::info!("{}: {} record(s)", input.display(), items.len());
                for item in &items {
                    write_item(&mut out, item, &args)?;
                }
                transformed += items.len();
            }
            Err(e) => {
                tracing::error!("Failed to parse {}: {}", input.display(), e);
                failed += 1;
            }
        }
    }

    out.flush()?;
    tracing::info!("Transformed {} record(s)", transformed);

    if failed > 0 {
        anyhow::bail!("{} of {} input(s) failed", failed, args.inputs.len());
    }

    Ok(())
}

/// Logs go to stderr; stdout carries the documents
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("ocd_items={}", logging.level).into());

    let json = logging.format == "json";

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(io::stderr)))
        .init();
}

fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn write_item(out: &mut impl Write, item: &TransformedItem, args: &Args) -> anyhow::Result<()> {
    if args.identity_only {
        write_json(out, &item.identity, args.pretty)
    } else {
        write_json(out, item, args.pretty)
    }
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T, pretty: bool) -> anyhow::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
