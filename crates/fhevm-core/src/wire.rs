//! JSON bodies exchanged with a decryption gateway

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::{EncryptedInput, PublicKey};

/// POST /decrypt
///
/// `signature`, `user` and `timestamp` are present together for user
/// decryption and absent together for public decryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptBody {
    pub handle: U256,
    pub contract_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub value: U256,
}

/// GET /public-key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub public_key: PublicKey,
    pub chain_id: u64,
}

/// POST /inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    pub contract_address: Address,
    pub user_address: Address,
    pub input: EncryptedInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub handles: Vec<U256>,
}

/// POST /acl/allow and POST /acl/publish
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclRequest {
    pub handle: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Address>,
}

/// GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub chain_id: u64,
    pub handles: usize,
}
