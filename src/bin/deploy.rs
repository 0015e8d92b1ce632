//! Deploy a new AO process: spawn it, load its Lua source with `Action=Eval`,
//! and optionally run its `Action=Init` handler after a settling delay.
//!
//! Configuration is environment-sourced; see `DeployConfig`. Exits 0 on
//! success, 1 on any uncaught failure.

use std::sync::Arc;

use ao_deploy::deploy::Deployment;
use ao_deploy::gateway::HttpGateway;
use ao_deploy::wallet::{JwkSigner, Signer};
use ao_deploy::{observability, DeployConfig, Result};

#[tokio::main]
async fn main() {
    observability::init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = DeployConfig::from_env()?;

    let source = std::fs::read_to_string(&config.source_path)?;
    tracing::info!("Read process source from [{}]", config.source_path.display());

    let signer: Arc<dyn Signer> = Arc::new(JwkSigner::from_file(&config.key_path)?);
    tracing::info!("Signing using wallet with address [{}]", signer.address());

    let gateway = Arc::new(HttpGateway::new(&config.mu_url, &config.cu_url)?);
    tracing::info!("Spawning new AO process for [{}]", config.process_name);

    let process_name = config.process_name.clone();
    let mut deployment = Deployment::new(gateway, config, signer);
    let process_id = deployment.run(&source).await?;

    tracing::info!(
        "Deployment of {process_name} complete! Check the deployed process in \
         your browser at https://aolink.arweave.net/#/entity/{process_id}"
    );
    Ok(())
}
