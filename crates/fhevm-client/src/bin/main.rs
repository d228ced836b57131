//! fhevm-client binary: encrypt inputs and request decryptions from the CLI
//!
//! Run with:
//! ```bash
//! fhevm-client --gateway http://127.0.0.1:8080 encrypt \
//!     --contract 0x5fbdb2315678afecb367f032d93f642f64180aa3 --value uint32:10 --value bool:true --submit
//! fhevm-client --gateway http://127.0.0.1:8080 decrypt \
//!     --contract 0x5fbdb2315678afecb367f032d93f642f64180aa3 --handle 0x... --private-key 0x...
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fhevm_client::{create_dev_client, CallPolicy, ClientError, LocalWallet};
use fhevm_core::validate::parse_address;
use fhevm_core::wire::{IngestRequest, IngestResponse};
use fhevm_core::{DecryptionRequest, FhevmConfig, NetworkConfig, TypedValue, U256};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fhevm-client")]
#[command(about = "Encrypt inputs and decrypt handles for FHE-enabled contracts")]
struct Cli {
    /// JSON config file (FhevmConfig); flags below override its fields
    #[arg(long, env = "FHEVM_CONFIG")]
    config: Option<PathBuf>,

    /// Chain ID (default: 31337 when no config file is given)
    #[arg(long)]
    chain_id: Option<u64>,

    /// JSON-RPC endpoint of the network
    #[arg(long)]
    rpc_url: Option<String>,

    /// Decryption gateway URL
    #[arg(long, env = "FHEVM_GATEWAY")]
    gateway: Option<String>,

    /// Per-attempt deadline for gateway calls in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Extra attempts for failed gateway calls
    #[arg(long, default_value = "0")]
    retries: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a fresh wallet
    Keygen,

    /// Encrypt values for a contract and print the encrypted input
    Encrypt {
        #[arg(long)]
        contract: String,

        /// `<type>:<value>`, e.g. `uint32:10`, `bool:true`, `address:0x..`
        #[arg(long = "value", required = true)]
        values: Vec<String>,

        /// Owner key; a random wallet is used when omitted
        #[arg(long, env = "FHEVM_PRIVATE_KEY")]
        private_key: Option<String>,

        /// Also register the input with the gateway (`POST /inputs`)
        #[arg(long)]
        submit: bool,
    },

    /// Decrypt a handle as its owner
    Decrypt {
        #[arg(long)]
        contract: String,

        #[arg(long)]
        handle: String,

        #[arg(long, env = "FHEVM_PRIVATE_KEY")]
        private_key: String,
    },

    /// Decrypt a publicly decryptable handle
    PublicDecrypt {
        #[arg(long)]
        contract: String,

        #[arg(long)]
        handle: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<FhevmConfig> {
    let mut config = match &cli.config {
        Some(path) => FhevmConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => FhevmConfig::new(NetworkConfig::local("http://127.0.0.1:8545")),
    };
    if let Some(chain_id) = cli.chain_id {
        config.network.chain_id = chain_id;
    }
    if let Some(rpc_url) = &cli.rpc_url {
        config.network.rpc_url = rpc_url.clone();
    }
    if let Some(gateway) = &cli.gateway {
        config = config.with_gateway(gateway.clone());
    }
    Ok(config)
}

fn parse_handle(text: &str) -> anyhow::Result<U256> {
    U256::from_str(text).map_err(|e| anyhow::anyhow!("Invalid handle {}: {}", text, e))
}

fn wallet(private_key: Option<&str>) -> anyhow::Result<LocalWallet> {
    match private_key {
        Some(key) => Ok(LocalWallet::from_private_key(key)?),
        None => Ok(LocalWallet::random()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fhevm_client=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Keygen = cli.command {
        let wallet = LocalWallet::random();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "address": wallet.account(),
                "privateKey": wallet.private_key_hex(),
            }))?
        );
        return Ok(());
    }

    let config = load_config(&cli)?;
    let policy = CallPolicy {
        timeout: cli.timeout_ms.map(Duration::from_millis),
        retries: cli.retries,
        ..CallPolicy::default()
    };

    let mut client = create_dev_client(config);
    client.init().await?;

    match &cli.command {
        Command::Keygen => {}

        Command::Encrypt {
            contract,
            values,
            private_key,
            submit,
        } => {
            let contract = parse_address(contract)?;
            let wallet = wallet(private_key.as_deref())?;

            let mut input = client.create_encrypted_input(contract)?;
            for value in values {
                input.add(TypedValue::parse_pair(value)?)?;
            }
            let encrypted = input.encrypt(&wallet).await?;

            if *submit {
                let url = format!("{}/inputs", client.config().gateway_url());
                let resp = reqwest::Client::new()
                    .post(&url)
                    .json(&IngestRequest {
                        contract_address: contract,
                        user_address: wallet.account(),
                        input: encrypted.clone(),
                    })
                    .send()
                    .await?
                    .error_for_status()?;
                let ingested: IngestResponse = resp.json().await?;
                tracing::info!(handles = ingested.handles.len(), "Input registered with gateway");
            }

            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "user": wallet.account(),
                    "input": encrypted,
                }))?
            );
        }

        Command::Decrypt {
            contract,
            handle,
            private_key,
        } => {
            let wallet = LocalWallet::from_private_key(private_key)?;
            let request = DecryptionRequest {
                contract_address: parse_address(contract)?,
                handle: parse_handle(handle)?,
                user_address: wallet.account(),
            };

            let (client, request, wallet) = (&client, &request, &wallet);
            let result = policy
                .run_when(
                    move || client.request_user_decrypt(request, wallet),
                    ClientError::is_transient,
                )
                .await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "value": result.value.to_string(),
                    "signature": result.signature,
                }))?
            );
        }

        Command::PublicDecrypt { contract, handle } => {
            let contract = parse_address(contract)?;
            let handle = parse_handle(handle)?;

            let client = &client;
            let result = policy
                .run_when(
                    move || client.request_public_decrypt(handle, contract),
                    ClientError::is_transient,
                )
                .await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "value": result.value.to_string(),
                    "timestamp": result.timestamp,
                }))?
            );
        }
    }

    Ok(())
}
