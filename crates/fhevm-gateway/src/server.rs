//! Gateway server

use std::net::SocketAddr;

use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::routes::create_router;
use crate::state::{create_shared_state, SharedState};

pub struct GatewayServer {
    state: SharedState,
    addr: SocketAddr,
    metrics: Option<PrometheusHandle>,
}

impl GatewayServer {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            state: create_shared_state(config),
            addr: config.bind,
            metrics: None,
        }
    }

    /// Router with CORS enabled so browser dapps can call the gateway
    pub fn router(&self) -> Router {
        create_router(self.state.clone(), self.metrics.clone()).layer(CorsLayer::permissive())
    }

    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Internal(format!("Failed to bind {}: {}", self.addr, e)))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let router = self.router();
        let addr = listener.local_addr().unwrap_or(self.addr);
        tracing::info!(%addr, "Starting decryption gateway");

        axum::serve(listener, router)
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))
    }

    /// Get the server state for testing
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }
}

/// Builder for GatewayServer
pub struct GatewayBuilder {
    config: GatewayConfig,
    metrics: Option<PrometheusHandle>,
}

impl GatewayBuilder {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            metrics: None,
        }
    }

    pub fn addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind = addr;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.bind = ([0, 0, 0, 0], port).into();
        self
    }

    pub fn metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn build(self) -> GatewayServer {
        let mut server = GatewayServer::new(&self.config);
        server.metrics = self.metrics;
        tracing::debug!(
            chain_id = self.config.chain_id,
            max_signature_age_secs = self.config.max_signature_age.as_secs(),
            "Gateway configured"
        );
        server
    }
}
