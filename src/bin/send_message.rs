//! Send a one-off action message to an existing AO process.
//!
//! Defaults to a read-only dry-run; set `DRY_RUN=false` (with `WALLET_PATH`)
//! to submit a real signed write. Exits 0 on success, 1 on any failure,
//! including a logical error reported by the target process.

use std::sync::Arc;

use ao_deploy::dispatch::{DispatchMode, Dispatcher};
use ao_deploy::gateway::HttpGateway;
use ao_deploy::interpret::{classify, Disposition};
use ao_deploy::wallet::JwkSigner;
use ao_deploy::{observability, Error, Result, SendConfig};

#[tokio::main]
async fn main() {
    observability::init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = SendConfig::from_env()?;

    tracing::info!(
        "Sending Action [{}] to Process [{}]",
        config.action,
        config.process_id
    );
    tracing::info!(
        "Mode: {}",
        if config.dry_run {
            "DRY_RUN (read-only)"
        } else {
            "MESSAGE (write)"
        }
    );
    if !config.tags.is_empty() {
        tracing::info!("Tags: {}", serde_json::to_string(&config.tags)?);
    }
    if let Some(data) = &config.data {
        tracing::info!("Data: {data}");
    }

    let gateway = Arc::new(HttpGateway::new(&config.mu_url, &config.cu_url)?);
    let dispatcher = Dispatcher::new(gateway);

    let dispatched = if config.dry_run {
        dispatcher
            .dispatch(
                &config.process_id,
                &config.action,
                &config.tags,
                config.data.as_deref(),
                DispatchMode::Simulate,
            )
            .await
    } else {
        let wallet_path = config
            .wallet_path
            .as_ref()
            .ok_or_else(|| Error::config("WALLET_PATH is required when DRY_RUN=false"))?;
        let signer = JwkSigner::from_file(wallet_path)?;
        dispatcher
            .dispatch(
                &config.process_id,
                &config.action,
                &config.tags,
                config.data.as_deref(),
                DispatchMode::Commit(&signer),
            )
            .await
    };

    let message_id = dispatched
        .as_ref()
        .ok()
        .and_then(|outcome| outcome.message_id().cloned());

    match classify(dispatched) {
        Disposition::Success(data) => {
            println!("\n--- Response ---");
            if let Some(id) = message_id {
                println!("Message ID: {id}");
            }
            println!("{data}");
            Ok(())
        }
        Disposition::LogicalError(message) => {
            eprintln!("Process returned an error: {message}");
            std::process::exit(1);
        }
        Disposition::TransportFailure(err) => Err(err),
    }
}
