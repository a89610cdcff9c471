//! `brigade` — hosting process for the bucket migration engine.
//!
//! Loads configuration, waits for both providers' credentials to become
//! usable (concurrently), then either lists both buckets or runs one
//! migration, depending on the subcommand.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bucket_brigade::config::AppConfig;
use bucket_brigade::gate::{CredentialGate, ProviderConnector};
use bucket_brigade::migrate::MigrationEngine;
use bucket_brigade::storage::{BoxedObjectStore, ObjectStore};

#[derive(Parser)]
#[command(name = "brigade", about = "Move everything from the fuller bucket into the other")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the keys currently held by both buckets.
    Status,
    /// Run one migration from the fuller bucket into the other.
    Move,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let (store_a, store_b) = await_providers(&config).await?;

    match cli.command {
        Command::Status => {
            print_listing(store_a.as_ref()).await?;
            print_listing(store_b.as_ref()).await?;
        }
        Command::Move => {
            let result = MigrationEngine::new()
                .migrate(store_a.as_ref(), store_b.as_ref())
                .await?;
            println!("{result}");
        }
    }

    Ok(())
}

/// Gate both providers at once; startup finishes when the slower one is ready.
async fn await_providers(config: &AppConfig) -> Result<(BoxedObjectStore, BoxedObjectStore)> {
    let gate = CredentialGate::new(config.retry.policy());
    let connector_a = ProviderConnector::new(config.provider_a.clone());
    let connector_b = ProviderConnector::new(config.provider_b.clone());

    info!(
        provider_a = config.provider_a.name.as_str(),
        bucket_a = config.provider_a.params.bucket_name().unwrap_or("-"),
        provider_b = config.provider_b.name.as_str(),
        bucket_b = config.provider_b.params.bucket_name().unwrap_or("-"),
        "waiting for both providers to become reachable"
    );

    let (store_a, store_b) = tokio::try_join!(
        gate.await_ready(&connector_a),
        gate.await_ready(&connector_b),
    )?;

    Ok((store_a, store_b))
}

async fn print_listing(store: &dyn ObjectStore) -> Result<()> {
    println!("{} ({}):", store.name(), store.storage_type());
    let mut listing = store
        .list()
        .await
        .with_context(|| format!("listing {}", store.name()))?;

    let mut count = 0usize;
    while let Some(record) = listing.next().await {
        let record = record.with_context(|| format!("listing {}", store.name()))?;
        println!("  {}", record.key);
        count += 1;
    }
    println!("  ({count} objects)");
    Ok(())
}
