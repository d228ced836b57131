//! In-memory collaborators for unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy_primitives::keccak256;
use fhevm_core::{
    Address, Bytes, DecryptAuthorization, EncryptedInput, FhevmConfig, HandleLayout,
    NetworkConfig, PublicKey, TypedValue, U256,
};

use crate::error::{BoxError, InitStage};
use crate::traits::{
    ContextParams, DecryptionGateway, FheEngine, GatewayRequest, TypedDataSigner, Wallet,
};

pub const CHAIN_ID: u64 = 31_337;

pub fn config() -> FhevmConfig {
    FhevmConfig::new(NetworkConfig::local("http://localhost:8545"))
        .with_gateway("http://gateway.test")
}

pub fn contract() -> Address {
    Address::repeat_byte(0xc0)
}

pub fn user() -> Address {
    Address::repeat_byte(0x0a)
}

/// Handle carrying the value's position and type, like a real engine's
pub fn fake_handle(value: &TypedValue, index: u8, chain_id: u64) -> U256 {
    HandleLayout::new(keccak256(value.to_be_bytes()), index, chain_id, value.kind()).to_handle()
}

/// Engine that records every call and fails on request
#[derive(Default)]
pub struct RecordingEngine {
    pub fail_at: Option<InitStage>,
    pub fail_encrypt: bool,
    pub drop_last_handle: bool,
    /// First bootstrap never completes; later ones run normally
    pub stall_first_bootstrap: AtomicBool,
    pub calls: Mutex<Vec<&'static str>>,
    pub encrypted: Mutex<Vec<Vec<TypedValue>>>,
    pub encrypt_calls: AtomicUsize,
}

impl RecordingEngine {
    pub fn failing_at(stage: InitStage) -> Self {
        Self {
            fail_at: Some(stage),
            ..Default::default()
        }
    }

    pub fn stalling_bootstrap() -> Self {
        Self {
            stall_first_bootstrap: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str, stage: InitStage) -> Result<(), BoxError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_at == Some(stage) {
            return Err(format!("{} exploded", call).into());
        }
        Ok(())
    }
}

impl FheEngine for RecordingEngine {
    type Context = u64;

    async fn bootstrap(&self) -> Result<(), BoxError> {
        self.record("bootstrap", InitStage::Bootstrap)?;
        if self.stall_first_bootstrap.swap(false, Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn resolve_public_key(&self, _config: &FhevmConfig) -> Result<PublicKey, BoxError> {
        self.record("resolve_public_key", InitStage::PublicKey)?;
        Ok(PublicKey::new(vec![7u8; 16]))
    }

    async fn build_context(&self, params: ContextParams<'_>) -> Result<u64, BoxError> {
        self.record("build_context", InitStage::Context)?;
        Ok(params.chain_id)
    }

    async fn encrypt(
        &self,
        context: &u64,
        _contract: Address,
        _user: Address,
        values: &[TypedValue],
    ) -> Result<EncryptedInput, BoxError> {
        self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_encrypt {
            return Err("engine crashed".into());
        }
        self.encrypted.lock().unwrap().push(values.to_vec());

        let mut handles: Vec<U256> = values
            .iter()
            .enumerate()
            .map(|(index, value)| fake_handle(value, index as u8, *context))
            .collect();
        if self.drop_last_handle {
            handles.pop();
        }
        Ok(EncryptedInput {
            data: Bytes::from(vec![1, 2, 3]),
            input_proof: Bytes::from(vec![4, 5, 6]),
            handles,
        })
    }
}

/// Gateway that replays scripted outcomes and records requests
#[derive(Default)]
pub struct ScriptedGateway {
    pub outcomes: Mutex<VecDeque<Result<U256, String>>>,
    pub requests: Mutex<Vec<GatewayRequest>>,
}

impl ScriptedGateway {
    pub fn with_outcomes(outcomes: Vec<Result<U256, String>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl DecryptionGateway for ScriptedGateway {
    async fn decrypt(&self, request: &GatewayRequest) -> Result<U256, BoxError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(message.into()),
            None => Ok(U256::from(42u8)),
        }
    }
}

/// Signer that returns a fixed signature, or refuses like a dismissed prompt
pub struct FakeSigner {
    pub address: Address,
    pub refuse: bool,
    pub signature: Bytes,
}

impl FakeSigner {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            refuse: false,
            signature: Bytes::from(vec![0x5a; 65]),
        }
    }

    pub fn refusing(address: Address) -> Self {
        Self {
            refuse: true,
            ..Self::new(address)
        }
    }
}

impl Wallet for FakeSigner {
    async fn address(&self) -> Result<Address, BoxError> {
        Ok(self.address)
    }
}

impl TypedDataSigner for FakeSigner {
    async fn sign_typed_data(
        &self,
        _authorization: &DecryptAuthorization,
    ) -> Result<Bytes, BoxError> {
        if self.refuse {
            return Err("User rejected the request".into());
        }
        Ok(self.signature.clone())
    }
}
