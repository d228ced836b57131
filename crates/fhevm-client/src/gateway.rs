//! HTTP collaborators for a decryption gateway

use fhevm_core::wire::{DecryptBody, DecryptResponse, PublicKeyResponse};
use fhevm_core::{FhevmConfig, PublicKey, U256};
use reqwest::Client;
use thiserror::Error;

use crate::error::BoxError;
use crate::traits::{DecryptionGateway, GatewayRequest};

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },
}

async fn checked(resp: reqwest::Response) -> Result<reqwest::Response, HttpError> {
    if !resp.status().is_success() {
        return Err(HttpError::Server {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Gateway reached over `POST {base}/decrypt`
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &FhevmConfig) -> Self {
        Self::new(config.gateway_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn send(&self, request: &GatewayRequest) -> Result<U256, HttpError> {
        let url = format!("{}/decrypt", self.base_url);
        let authorization = request.authorization.as_ref();
        let body = DecryptBody {
            handle: request.handle,
            contract_address: request.contract_address,
            signature: authorization.map(|a| a.signature.clone()),
            user: authorization.map(|a| a.user),
            timestamp: authorization.map(|a| a.timestamp),
        };

        tracing::debug!(url = %url, signed = authorization.is_some(), "Sending decrypt request");
        let resp = self.http.post(&url).json(&body).send().await?;
        let decrypted: DecryptResponse = checked(resp).await?.json().await?;
        Ok(decrypted.value)
    }
}

impl DecryptionGateway for HttpGateway {
    async fn decrypt(&self, request: &GatewayRequest) -> Result<U256, BoxError> {
        Ok(self.send(request).await?)
    }
}

/// Fetches the network public key from `GET {base}/public-key`
#[derive(Debug, Clone)]
pub struct HttpKeyProvider {
    http: Client,
    base_url: String,
}

impl HttpKeyProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch(&self) -> Result<PublicKeyResponse, HttpError> {
        let url = format!("{}/public-key", self.base_url);
        let resp = self.http.get(&url).send().await?;
        Ok(checked(resp).await?.json().await?)
    }

    pub async fn fetch_public_key(&self) -> Result<PublicKey, HttpError> {
        let response = self.fetch().await?;
        tracing::debug!(
            chain_id = response.chain_id,
            bytes = response.public_key.len(),
            "Fetched public key"
        );
        Ok(response.public_key)
    }
}
