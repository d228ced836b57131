//! fhevm-gateway binary: reference decryption gateway for local networks

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use fhevm_gateway::metrics::init_prometheus_recorder;
use fhevm_gateway::{GatewayBuilder, GatewayConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fhevm-gateway")]
#[command(about = "Reference decryption gateway for local FHEVM development")]
struct Args {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Chain ID the gateway serves (default: 31337 for hardhat/anvil)
    #[arg(long, default_value = "31337")]
    chain_id: u64,

    /// Seed for the development public key
    #[arg(long, env = "FHEVM_KEY_SEED", default_value = "fhevm-dev")]
    key_seed: String,

    /// Maximum age of a user decryption signature in seconds
    #[arg(long, default_value = "86400")]
    max_signature_age_secs: u64,

    /// Serve Prometheus metrics at /metrics
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fhevm_gateway=info".parse()?))
        .init();

    let args = Args::parse();

    let config = GatewayConfig {
        bind: args.bind,
        chain_id: args.chain_id,
        key_seed: args.key_seed,
        max_signature_age: Duration::from_secs(args.max_signature_age_secs),
        enable_metrics: args.metrics,
    };

    let mut builder = GatewayBuilder::new(config.clone());
    if config.enable_metrics {
        builder = builder.metrics(init_prometheus_recorder()?);
    }

    tracing::info!(
        chain_id = config.chain_id,
        public_key_bytes = config.public_key().len(),
        "Gateway ready on {}",
        config.bind
    );
    builder.build().run().await?;

    Ok(())
}
