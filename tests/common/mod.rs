//! Shared harness: a reference gateway on a loopback port

#![allow(dead_code)]

use std::time::Duration;

use alloy_primitives::{Address, U256};
use fhevm_core::wire::{AclRequest, IngestRequest, IngestResponse};
use fhevm_core::{EncryptedInput, FhevmConfig, NetworkConfig};
use fhevm_gateway::{GatewayBuilder, GatewayConfig, SharedState};
use reqwest::Client;
use tokio::net::TcpListener;

pub struct GatewayHarness {
    pub url: String,
    pub config: GatewayConfig,
    pub state: SharedState,
    pub http: Client,
    _shutdown: tokio::sync::oneshot::Sender<()>,
}

impl GatewayHarness {
    pub async fn start() -> Self {
        Self::with_config(GatewayConfig::default()).await
    }

    pub async fn with_config(config: GatewayConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Bind should succeed");
        let addr = listener.local_addr().expect("Bound address");
        let url = format!("http://{}", addr);

        let server = GatewayBuilder::new(config.clone()).addr(addr).build();
        let state = server.state();
        let router = server.router();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        let http = Client::new();
        for _ in 0..20 {
            if http.get(format!("{}/health", url)).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }

        Self {
            url,
            config,
            state,
            http,
            _shutdown: shutdown_tx,
        }
    }

    /// Client configuration pointing at this gateway
    pub fn client_config(&self) -> FhevmConfig {
        FhevmConfig::new(NetworkConfig::new(
            self.config.chain_id,
            "Local",
            "http://127.0.0.1:8545",
        ))
        .with_gateway(self.url.clone())
    }

    pub async fn ingest(&self, contract: Address, user: Address, input: &EncryptedInput) -> Vec<U256> {
        let resp = self
            .http
            .post(format!("{}/inputs", self.url))
            .json(&IngestRequest {
                contract_address: contract,
                user_address: user,
                input: input.clone(),
            })
            .send()
            .await
            .expect("Ingest request");
        assert!(resp.status().is_success(), "ingest failed: {}", resp.status());
        resp.json::<IngestResponse>().await.expect("Ingest response").handles
    }

    pub async fn allow(&self, handle: U256, user: Address) {
        let resp = self
            .http
            .post(format!("{}/acl/allow", self.url))
            .json(&AclRequest {
                handle,
                user: Some(user),
            })
            .send()
            .await
            .expect("Allow request");
        assert!(resp.status().is_success());
    }

    pub async fn publish(&self, handle: U256) {
        let resp = self
            .http
            .post(format!("{}/acl/publish", self.url))
            .json(&AclRequest { handle, user: None })
            .send()
            .await
            .expect("Publish request");
        assert!(resp.status().is_success());
    }
}
