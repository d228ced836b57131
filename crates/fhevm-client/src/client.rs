//! FHEVM client session
//!
//! ```text
//! Uninitialized --init()--> Initializing --ok--> Ready
//!                                       \--err-> Failed (terminal)
//! ```
//!
//! Only a ready session hands out builders or performs decryption. The
//! public key and engine context are frozen at `Ready` and shared read-only
//! through an `Arc` with every builder created afterwards.

use std::fmt;
use std::sync::Arc;

use fhevm_core::{
    Address, DecryptionRequest, FhevmConfig, PublicDecryptResult, PublicKey, UserDecryptResult,
    U256,
};

use crate::builder::EncryptedInputBuilder;
use crate::decrypt;
use crate::error::{BoxError, ClientError, InitStage, Result};
use crate::traits::{ContextParams, DecryptionGateway, FheEngine, TypedDataSigner};

/// Read-only state of a ready session
#[derive(Debug)]
pub struct SessionContext<C> {
    pub chain_id: u64,
    pub public_key: PublicKey,
    pub gateway_url: String,
    pub engine: C,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::Initializing => write!(f, "initializing"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Failed => write!(f, "failed"),
        }
    }
}

enum Lifecycle<C> {
    Uninitialized,
    Initializing,
    Ready(Arc<SessionContext<C>>),
    Failed { stage: InitStage, message: String },
}

/// A client session bound to one network configuration
pub struct FhevmClient<E: FheEngine, G> {
    config: FhevmConfig,
    engine: Arc<E>,
    gateway: G,
    lifecycle: Lifecycle<E::Context>,
}

impl<E: FheEngine, G: DecryptionGateway> FhevmClient<E, G> {
    pub fn new(config: FhevmConfig, engine: E, gateway: G) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
            gateway,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Bootstrap the engine, resolve the public key and build the context.
    ///
    /// Returns immediately once ready. A failure moves the session to
    /// `Failed`, after which every call fails; build a new client to retry.
    /// If a previous `init()` future was dropped mid-flight the sequence
    /// starts over.
    pub async fn init(&mut self) -> Result<()> {
        match &self.lifecycle {
            Lifecycle::Ready(_) => return Ok(()),
            Lifecycle::Failed { stage, message } => {
                return Err(ClientError::Initialization {
                    stage: *stage,
                    source: format!("session already failed: {}", message).into(),
                });
            }
            Lifecycle::Initializing => {
                tracing::debug!("Restarting interrupted initialization");
            }
            Lifecycle::Uninitialized => {}
        }

        self.lifecycle = Lifecycle::Initializing;
        match self.run_init().await {
            Ok(context) => {
                tracing::info!(
                    chain_id = context.chain_id,
                    network = %self.config.network.name,
                    gateway = %context.gateway_url,
                    public_key_bytes = context.public_key.len(),
                    "FHEVM client initialized"
                );
                self.lifecycle = Lifecycle::Ready(Arc::new(context));
                Ok(())
            }
            Err((stage, source)) => {
                tracing::warn!(%stage, error = %source, "FHEVM client initialization failed");
                self.lifecycle = Lifecycle::Failed {
                    stage,
                    message: source.to_string(),
                };
                Err(ClientError::Initialization { stage, source })
            }
        }
    }

    async fn run_init(
        &self,
    ) -> std::result::Result<SessionContext<E::Context>, (InitStage, BoxError)> {
        self.engine
            .bootstrap()
            .await
            .map_err(|e| (InitStage::Bootstrap, e))?;

        let public_key = match &self.config.network.public_key {
            Some(key) => key.clone(),
            None => {
                tracing::debug!("No public key configured, fetching from provider");
                self.engine
                    .resolve_public_key(&self.config)
                    .await
                    .map_err(|e| (InitStage::PublicKey, e))?
            }
        };
        if public_key.is_empty() {
            return Err((InitStage::PublicKey, "public key is empty".into()));
        }

        let chain_id = self.config.chain_id();
        let gateway_url = self.config.gateway_url();
        let engine = self
            .engine
            .build_context(ContextParams {
                chain_id,
                public_key: &public_key,
                gateway_url: &gateway_url,
                acl_address: self.config.acl_address,
                kms_verifier_address: self.config.kms_verifier_address,
            })
            .await
            .map_err(|e| (InitStage::Context, e))?;

        Ok(SessionContext {
            chain_id,
            public_key,
            gateway_url,
            engine,
        })
    }

    pub fn state(&self) -> SessionState {
        match self.lifecycle {
            Lifecycle::Uninitialized => SessionState::Uninitialized,
            Lifecycle::Initializing => SessionState::Initializing,
            Lifecycle::Ready(_) => SessionState::Ready,
            Lifecycle::Failed { .. } => SessionState::Failed,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state() == SessionState::Ready
    }

    /// Shared context, once ready
    pub fn context(&self) -> Option<&SessionContext<E::Context>> {
        match &self.lifecycle {
            Lifecycle::Ready(context) => Some(context.as_ref()),
            _ => None,
        }
    }

    pub fn config(&self) -> &FhevmConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn ready(&self) -> Result<&Arc<SessionContext<E::Context>>> {
        match &self.lifecycle {
            Lifecycle::Ready(context) => Ok(context),
            _ => Err(ClientError::NotInitialized),
        }
    }

    /// Start an encrypted input destined for `contract`
    pub fn create_encrypted_input(&self, contract: Address) -> Result<EncryptedInputBuilder<E>> {
        let context = self.ready()?;
        Ok(EncryptedInputBuilder::new(
            Arc::clone(&self.engine),
            Arc::clone(context),
            contract,
        ))
    }

    /// Decrypt a handle owned by `request.user_address`, authorized by `signer`
    pub async fn request_user_decrypt<S: TypedDataSigner>(
        &self,
        request: &DecryptionRequest,
        signer: &S,
    ) -> Result<UserDecryptResult> {
        let context = self.ready()?;
        decrypt::user_decrypt(&self.gateway, context.chain_id, request, signer).await
    }

    /// Decrypt a handle that has been made publicly decryptable
    pub async fn request_public_decrypt(
        &self,
        handle: U256,
        contract: Address,
    ) -> Result<PublicDecryptResult> {
        self.ready()?;
        decrypt::public_decrypt(&self.gateway, handle, contract).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fakes::*;
    use fhevm_core::{HandleLayout, PublicKey};
    use std::error::Error as _;
    use std::sync::atomic::Ordering;

    fn client(engine: RecordingEngine) -> FhevmClient<RecordingEngine, ScriptedGateway> {
        FhevmClient::new(config(), engine, ScriptedGateway::default())
    }

    #[tokio::test]
    async fn test_not_initialized_before_init() {
        let client = client(RecordingEngine::default());
        assert_eq!(client.state(), SessionState::Uninitialized);
        assert!(!client.is_initialized());
        assert!(client.context().is_none());

        let err = client.create_encrypted_input(contract()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotInitialized);

        let err = client
            .request_public_decrypt(U256::from(1u8), contract())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotInitialized);
    }

    #[tokio::test]
    async fn test_init_runs_stages_in_order() {
        let mut client = client(RecordingEngine::default());
        client.init().await.unwrap();

        assert!(client.is_initialized());
        assert_eq!(
            client.engine.calls(),
            vec!["bootstrap", "resolve_public_key", "build_context"]
        );
        let context = client.context().unwrap();
        assert_eq!(context.chain_id, CHAIN_ID);
        assert_eq!(context.engine, CHAIN_ID);
        assert_eq!(context.gateway_url, "http://gateway.test");
        assert!(client.create_encrypted_input(contract()).is_ok());
    }

    #[tokio::test]
    async fn test_init_is_idempotent_once_ready() {
        let mut client = client(RecordingEngine::default());
        client.init().await.unwrap();
        client.init().await.unwrap();
        assert_eq!(client.engine.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_configured_key_skips_provider() {
        let mut config = config();
        config.network = config
            .network
            .with_public_key(PublicKey::new(vec![1u8; 8]));
        let mut client = FhevmClient::new(config, RecordingEngine::default(), ScriptedGateway::default());
        client.init().await.unwrap();

        assert_eq!(client.engine.calls(), vec!["bootstrap", "build_context"]);
        assert_eq!(client.context().unwrap().public_key.as_bytes(), &[1u8; 8]);
    }

    #[tokio::test]
    async fn test_dropped_init_restarts_from_scratch() {
        let mut client = client(RecordingEngine::stalling_bootstrap());

        let interrupted =
            tokio::time::timeout(std::time::Duration::from_millis(50), client.init()).await;
        assert!(interrupted.is_err());
        assert_eq!(client.state(), SessionState::Initializing);
        assert!(!client.is_initialized());
        let err = client.create_encrypted_input(contract()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotInitialized);

        client.init().await.unwrap();
        assert_eq!(client.state(), SessionState::Ready);
        assert_eq!(
            client.engine.calls(),
            vec!["bootstrap", "bootstrap", "resolve_public_key", "build_context"]
        );
    }

    #[tokio::test]
    async fn test_failed_init_is_terminal() {
        for stage in [InitStage::Bootstrap, InitStage::PublicKey, InitStage::Context] {
            let mut client = client(RecordingEngine::failing_at(stage));
            let err = client.init().await.unwrap_err();
            assert!(matches!(err, ClientError::Initialization { stage: s, .. } if s == stage));
            assert!(err.source().unwrap().to_string().contains("exploded"));
            assert_eq!(client.state(), SessionState::Failed);

            let calls = client.engine.calls().len();
            let again = client.init().await.unwrap_err();
            assert_eq!(again.kind(), ErrorKind::Initialization);
            assert_eq!(client.engine.calls().len(), calls);

            let err = client.create_encrypted_input(contract()).err().unwrap();
            assert_eq!(err.kind(), ErrorKind::NotInitialized);
        }
    }

    #[tokio::test]
    async fn test_encrypt_through_session() {
        let mut client = client(RecordingEngine::default());
        client.init().await.unwrap();

        let mut input = client.create_encrypted_input(contract()).unwrap();
        input.add_uint32(10u32).unwrap();
        let encrypted = input.encrypt(&FakeSigner::new(user())).await.unwrap();

        assert_eq!(encrypted.handles.len(), 1);
        let layout = HandleLayout::parse(encrypted.handles[0]).unwrap();
        assert_eq!(layout.chain_id, CHAIN_ID);

        // out-of-range value never reaches the engine
        let mut input = client.create_encrypted_input(contract()).unwrap();
        let err = input.add_uint8(300u32).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(client.engine.encrypt_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gateway_failure_leaves_session_ready() {
        let gateway = ScriptedGateway::with_outcomes(vec![
            Err("connection refused".into()),
            Ok(U256::from(7u8)),
        ]);
        let mut client = FhevmClient::new(config(), RecordingEngine::default(), gateway);
        client.init().await.unwrap();

        let err = client
            .request_public_decrypt(U256::from(1u8), contract())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decryption);
        assert_eq!(err.source().unwrap().to_string(), "connection refused");
        assert!(client.is_initialized());

        let result = client
            .request_public_decrypt(U256::from(1u8), contract())
            .await
            .unwrap();
        assert_eq!(result.value, U256::from(7u8));
    }

    #[tokio::test]
    async fn test_user_decrypt_through_session() {
        let mut client = client(RecordingEngine::default());
        client.init().await.unwrap();

        let request = DecryptionRequest {
            contract_address: contract(),
            handle: U256::from(99u8),
            user_address: user(),
        };
        let result = client
            .request_user_decrypt(&request, &FakeSigner::new(user()))
            .await
            .unwrap();
        assert_eq!(result.value, U256::from(42u8));
        assert!(!result.signature.is_empty());
    }
}
