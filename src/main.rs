//! Smoke binary: drives the metrics engine against the local host.

mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::Level;

use hostwatch_metrics::{DetailSection, EngineConfig, MetricsEngine, ShellGateway};

use cli::{Args, LogLevel};

/// Initializes tracing logging with the CLI-selected level.
fn setup_logging(args: &Args) {
    let log_level = match args.log_level {
        LogLevel::Off => Level::ERROR,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args);

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let section: Option<DetailSection> = args
        .section
        .as_deref()
        .map(|name| name.parse().map_err(anyhow::Error::msg))
        .transpose()?;

    let engine = MetricsEngine::new(Arc::new(ShellGateway::new()), config);
    let session = "local";
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval.max(1)));

    loop {
        ticker.tick().await;

        let basic = engine.collect_basic_metrics(session).await?;
        println!("{}", serde_json::to_string_pretty(&basic)?);

        if args.all_details {
            let detail = engine.collect_detail_metrics(session, None).await?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        } else if let Some(section) = section {
            let detail = engine.collect_detail_metrics(session, Some(section)).await?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }

        if args.once {
            break;
        }
    }

    engine.destroy(session);
    Ok(())
}
