//! Local private-key wallet

use alloy_primitives::{Address, Bytes, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use fhevm_core::DecryptAuthorization;
use thiserror::Error;

use crate::error::BoxError;
use crate::traits::{TypedDataSigner, Wallet};

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),
}

/// Signs decryption authorizations with an in-process secp256k1 key
#[derive(Clone)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
}

impl LocalWallet {
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    /// Accepts 32 bytes of hex, with or without `0x`
    pub fn from_private_key(key: &str) -> Result<Self, WalletError> {
        let bytes = hex::decode(key.trim().trim_start_matches("0x"))
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(WalletError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let signer = PrivateKeySigner::from_bytes(&B256::from_slice(&bytes))
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        Ok(Self { signer })
    }

    /// The account address, without going through the async trait
    pub fn account(&self) -> Address {
        self.signer.address()
    }

    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signer.to_bytes()))
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.account())
            .finish_non_exhaustive()
    }
}

impl Wallet for LocalWallet {
    async fn address(&self) -> Result<Address, BoxError> {
        Ok(self.account())
    }
}

impl TypedDataSigner for LocalWallet {
    async fn sign_typed_data(
        &self,
        authorization: &DecryptAuthorization,
    ) -> Result<Bytes, BoxError> {
        let signature = self.signer.sign_hash(&authorization.signing_hash()).await?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }
}
