//! HTTP routes for the decryption gateway

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use fhevm_core::wire::{
    AclRequest, DecryptBody, DecryptResponse, HealthResponse, IngestRequest, IngestResponse,
    PublicKeyResponse,
};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::error::{GatewayError, Result};
use crate::metrics::{self, MODE_PUBLIC, MODE_USER};
use crate::state::SharedState;

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let state = state.read().await;
    Json(HealthResponse {
        status: "ready".to_string(),
        chain_id: state.chain_id(),
        handles: state.handle_count(),
    })
}

async fn public_key(State(state): State<SharedState>) -> Json<PublicKeyResponse> {
    let state = state.read().await;
    Json(PublicKeyResponse {
        public_key: state.public_key().clone(),
        chain_id: state.chain_id(),
    })
}

async fn ingest(
    State(state): State<SharedState>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestResponse>> {
    let mut state = state.write().await;
    let handles = state.ingest(&req)?;

    metrics::record_ingest(handles.len());
    tracing::info!(
        contract = %req.contract_address,
        handles = handles.len(),
        "Registered encrypted input"
    );
    Ok(Json(IngestResponse { handles }))
}

async fn decrypt(
    State(state): State<SharedState>,
    Json(req): Json<DecryptBody>,
) -> Result<Json<DecryptResponse>> {
    let start = Instant::now();
    let mode = if req.signature.is_some() {
        MODE_USER
    } else {
        MODE_PUBLIC
    };

    let result = state.read().await.decrypt(&req, unix_seconds());

    let outcome = match &result {
        Ok(_) => metrics::OUTCOME_OK,
        Err(GatewayError::Unauthorized(_)) => metrics::OUTCOME_DENIED,
        Err(GatewayError::Internal(_)) => metrics::OUTCOME_SERVER_ERROR,
        Err(_) => metrics::OUTCOME_CLIENT_ERROR,
    };
    metrics::record_decrypt(mode, outcome, start.elapsed());

    match &result {
        Ok(_) => tracing::info!(mode, contract = %req.contract_address, "Decryption released"),
        Err(e) => tracing::warn!(mode, contract = %req.contract_address, error = %e, "Decryption refused"),
    }
    Ok(Json(DecryptResponse { value: result? }))
}

async fn acl_allow(
    State(state): State<SharedState>,
    Json(req): Json<AclRequest>,
) -> Result<StatusCode> {
    let user = req
        .user
        .ok_or_else(|| GatewayError::BadRequest("user is required".into()))?;
    state.write().await.allow(req.handle, user)?;
    tracing::info!(user = %user, "Granted decryption access");
    Ok(StatusCode::NO_CONTENT)
}

async fn acl_publish(
    State(state): State<SharedState>,
    Json(req): Json<AclRequest>,
) -> Result<StatusCode> {
    state.write().await.publish(req.handle)?;
    tracing::info!("Handle marked publicly decryptable");
    Ok(StatusCode::NO_CONTENT)
}

/// Create the router with all routes; `/metrics` is served when a
/// Prometheus handle is given
pub fn create_router(state: SharedState, metrics: Option<PrometheusHandle>) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/public-key", get(public_key))
        .route("/inputs", post(ingest))
        .route("/decrypt", post(decrypt))
        .route("/acl/allow", post(acl_allow))
        .route("/acl/publish", post(acl_publish));

    let router = match metrics {
        Some(handle) => router.route("/metrics", get(move || async move { handle.render() })),
        None => router,
    };
    router.with_state(state)
}
