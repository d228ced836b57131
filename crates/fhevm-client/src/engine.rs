//! Development FHE engine
//!
//! Wraps the transparent codec from `fhevm_core::transparent` behind the
//! [`FheEngine`] seam so the full client flow can run against a local
//! network and the reference gateway. Ciphertexts are NOT confidential.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::keccak256;
use fhevm_core::transparent::{self, InputBinding};
use fhevm_core::{Address, EncryptedInput, FhevmConfig, PublicKey, TypedValue, B256};

use crate::error::BoxError;
use crate::gateway::HttpKeyProvider;
use crate::traits::{ContextParams, FheEngine};

/// Session state built by [`DevEngine`]
#[derive(Debug, Clone)]
pub struct DevContext {
    pub chain_id: u64,
    pub public_key: PublicKey,
    pub gateway_url: String,
    pub acl_address: Option<Address>,
    pub kms_verifier_address: Option<Address>,
}

#[derive(Debug, Default)]
pub struct DevEngine {
    nonce: AtomicU64,
}

impl DevEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh per-input salt; unique within this engine and across restarts
    fn next_salt(&self, contract: Address, user: Address) -> B256 {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);

        let mut preimage = Vec::with_capacity(16 + 8 + 40);
        preimage.extend_from_slice(&nanos.to_be_bytes());
        preimage.extend_from_slice(&nonce.to_be_bytes());
        preimage.extend_from_slice(contract.as_slice());
        preimage.extend_from_slice(user.as_slice());
        keccak256(&preimage)
    }
}

impl FheEngine for DevEngine {
    type Context = DevContext;

    async fn bootstrap(&self) -> Result<(), BoxError> {
        tracing::debug!("Dev engine ready (transparent codec, no confidentiality)");
        Ok(())
    }

    async fn resolve_public_key(&self, config: &FhevmConfig) -> Result<PublicKey, BoxError> {
        let provider = HttpKeyProvider::new(config.gateway_url());
        let response = provider.fetch().await?;
        if response.chain_id != config.chain_id() {
            return Err(format!(
                "Gateway serves chain {}, session is configured for {}",
                response.chain_id,
                config.chain_id()
            )
            .into());
        }
        Ok(response.public_key)
    }

    async fn build_context(&self, params: ContextParams<'_>) -> Result<DevContext, BoxError> {
        Ok(DevContext {
            chain_id: params.chain_id,
            public_key: params.public_key.clone(),
            gateway_url: params.gateway_url.to_string(),
            acl_address: params.acl_address,
            kms_verifier_address: params.kms_verifier_address,
        })
    }

    async fn encrypt(
        &self,
        context: &DevContext,
        contract: Address,
        user: Address,
        values: &[TypedValue],
    ) -> Result<EncryptedInput, BoxError> {
        let binding = InputBinding {
            public_key: &context.public_key,
            chain_id: context.chain_id,
            contract,
            user,
        };
        Ok(transparent::seal(&binding, self.next_salt(contract, user), values)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhevm_core::NetworkConfig;

    fn context() -> DevContext {
        DevContext {
            chain_id: 31_337,
            public_key: transparent::derive_public_key(b"dev"),
            gateway_url: "http://127.0.0.1:8080".into(),
            acl_address: None,
            kms_verifier_address: None,
        }
    }

    #[tokio::test]
    async fn test_encrypt_opens_with_same_binding() {
        let engine = DevEngine::new();
        let context = context();
        let contract = Address::repeat_byte(0xc0);
        let user = Address::repeat_byte(0x0a);
        let values = vec![TypedValue::Uint32(10), TypedValue::Bool(true)];

        let input = engine.encrypt(&context, contract, user, &values).await.unwrap();
        let binding = InputBinding {
            public_key: &context.public_key,
            chain_id: context.chain_id,
            contract,
            user,
        };
        let opened = transparent::open(&binding, &input).unwrap();
        assert_eq!(opened.into_iter().map(|(_, v)| v).collect::<Vec<_>>(), values);
    }

    #[tokio::test]
    async fn test_same_values_get_fresh_handles() {
        let engine = DevEngine::new();
        let context = context();
        let values = [TypedValue::Uint8(1)];
        let a = engine.encrypt(&context, Address::ZERO, Address::ZERO, &values).await.unwrap();
        let b = engine.encrypt(&context, Address::ZERO, Address::ZERO, &values).await.unwrap();
        assert_ne!(a.handles, b.handles);
    }

    #[tokio::test]
    async fn test_build_context_copies_params() {
        let engine = DevEngine::new();
        let key = transparent::derive_public_key(b"k");
        let acl = Address::repeat_byte(0x11);
        let context = engine
            .build_context(ContextParams {
                chain_id: 11_155_111,
                public_key: &key,
                gateway_url: "https://gateway.example",
                acl_address: Some(acl),
                kms_verifier_address: None,
            })
            .await
            .unwrap();
        assert_eq!(context.chain_id, 11_155_111);
        assert_eq!(context.acl_address, Some(acl));
        assert_eq!(context.public_key, key);
    }

    #[tokio::test]
    async fn test_resolve_public_key_fails_without_gateway() {
        let config = FhevmConfig::new(NetworkConfig::local("http://127.0.0.1:8545"))
            .with_gateway("http://127.0.0.1:9");
        assert!(DevEngine::new().resolve_public_key(&config).await.is_err());
    }
}
