//! originals-cli — a demo walkthrough of the Originals protocol lifecycle.
//!
//! Startup sequence:
//!   1. Parse the requested scenario
//!   2. Build a fresh in-memory `Originals` instance
//!   3. Drive the asset through peer -> webvh -> btco, then transfer it
//!   4. Print each stage's result as JSON

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use originals_sdk::Originals;

#[derive(Parser, Debug)]
#[command(name = "originals-cli", version, about = "Originals protocol demo walkthrough")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a `did:peer` asset from inline content and print its identity.
    Create {
        #[arg(long, default_value = "r1")]
        resource_id: String,
        #[arg(long, default_value = "hello")]
        content: String,
    },
    /// Run the full lifecycle: create -> publish to webvh -> inscribe on btco -> transfer.
    Walkthrough {
        #[arg(long, default_value = "r1")]
        resource_id: String,
        #[arg(long, default_value = "hello")]
        content: String,
        #[arg(long, default_value = "example.com")]
        domain: String,
        #[arg(long, default_value = "alice")]
        slug: String,
        #[arg(long, default_value_t = 10)]
        fee_rate: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,originals=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Create { resource_id, content } => run_create(&resource_id, content).await,
        Command::Walkthrough { resource_id, content, domain, slug, fee_rate } => {
            run_walkthrough(&resource_id, content, &domain, &slug, fee_rate).await
        }
    }
}

async fn run_create(resource_id: &str, content: String) -> anyhow::Result<()> {
    let mut originals = Originals::new("https://example.com");
    let created = originals
        .create_asset(resource_id, "text", "text/plain", content.into_bytes())
        .await
        .context("creating asset")?;

    info!(did = %created.did, "asset created");
    println!("{}", serde_json::to_string_pretty(&serde_json::json!({
        "assetId": created.asset_id,
        "did": created.did,
    }))?);
    Ok(())
}

async fn run_walkthrough(resource_id: &str, content: String, domain: &str, slug: &str, fee_rate: u64) -> anyhow::Result<()> {
    let mut originals = Originals::new(format!("https://{domain}"));

    info!("creating peer asset");
    let created = originals
        .create_asset(resource_id, "text", "text/plain", content.into_bytes())
        .await
        .context("creating asset")?;
    println!("peer did: {}", created.did);

    info!("publishing to webvh");
    let webvh = originals
        .migrate_to_webvh(&created.asset_id, &created.did, &created.verification_method, domain, slug)
        .await
        .context("migrating to webvh")?;
    println!("webvh did: {}", webvh.target_did);
    for url in &webvh.resource_urls {
        println!("  hosted resource: {url}");
    }

    info!("inscribing on btco");
    let btco = originals
        .migrate_to_btco(&created.asset_id, &webvh.target_did, &created.verification_method, fee_rate, fee_rate * 4)
        .await
        .context("migrating to btco")?;
    println!("btco did: {} (inscription {})", btco.target_did, btco.inscription_id);

    info!("transferring ownership");
    let recipient = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
    let transfer = originals
        .transfer(&created.asset_id, &btco.target_did, &btco.inscription_id, recipient, fee_rate, &created.verification_method)
        .await
        .context("transferring asset")?;
    println!("transferred to {} via tx {}", transfer.to, transfer.transaction_id);

    let asset = originals.replay(&created.asset_id).await.context("replaying asset")?;
    println!(
        "final state: layer={:?} resources={} migrations={} transfers={}",
        asset.current_layer,
        asset.resources.len(),
        asset.migrations.len(),
        asset.transfers.len()
    );

    Ok(())
}
