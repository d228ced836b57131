//! EIP-712 authorization for user decryption
//!
//! Domain: `{name: "FHE Decryption", version: "1", chainId, verifyingContract}`
//! Primary type: `Decrypt(uint256 handle,address user,uint256 timestamp)`

use std::borrow::Cow;

use alloy_primitives::{Address, Signature, B256, U256};
use alloy_sol_types::{sol, Eip712Domain, SolStruct};
use serde_json::{json, Value};

use crate::constants::{EIP712_DOMAIN_NAME, EIP712_DOMAIN_VERSION};
use crate::Error;

sol! {
    /// Message signed by a data owner to release one handle's plaintext
    #[derive(Debug, PartialEq, Eq)]
    struct Decrypt {
        uint256 handle;
        address user;
        uint256 timestamp;
    }
}

/// Domain + message pair that a signer is asked to sign
#[derive(Debug, Clone)]
pub struct DecryptAuthorization {
    pub domain: Eip712Domain,
    pub message: Decrypt,
}

impl DecryptAuthorization {
    /// `timestamp` is Unix seconds
    pub fn new(chain_id: u64, contract: Address, handle: U256, user: Address, timestamp: u64) -> Self {
        Self {
            domain: Self::domain(chain_id, contract),
            message: Decrypt {
                handle,
                user,
                timestamp: U256::from(timestamp),
            },
        }
    }

    pub fn domain(chain_id: u64, contract: Address) -> Eip712Domain {
        Eip712Domain::new(
            Some(Cow::Borrowed(EIP712_DOMAIN_NAME)),
            Some(Cow::Borrowed(EIP712_DOMAIN_VERSION)),
            Some(U256::from(chain_id)),
            Some(contract),
            None,
        )
    }

    /// The 32-byte digest `keccak256(0x1901 || domainSeparator || hashStruct(message))`
    pub fn signing_hash(&self) -> B256 {
        self.message.eip712_signing_hash(&self.domain)
    }

    /// Field list for each type, as passed to `signTypedData`-style APIs
    pub fn types() -> Value {
        json!({
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" },
            ],
            "Decrypt": [
                { "name": "handle", "type": "uint256" },
                { "name": "user", "type": "address" },
                { "name": "timestamp", "type": "uint256" },
            ],
        })
    }

    /// Full `eth_signTypedData_v4` payload for external wallets
    pub fn typed_data_json(&self) -> Value {
        json!({
            "types": Self::types(),
            "primaryType": "Decrypt",
            "domain": {
                "name": EIP712_DOMAIN_NAME,
                "version": EIP712_DOMAIN_VERSION,
                "chainId": self.domain.chain_id.map(|id| id.to_string()),
                "verifyingContract": self.domain.verifying_contract,
            },
            "message": {
                "handle": self.message.handle.to_string(),
                "user": self.message.user,
                "timestamp": self.message.timestamp.to_string(),
            },
        })
    }

    /// Recover the address that produced `signature` over this authorization
    pub fn recover_signer(&self, signature: &[u8]) -> Result<Address, Error> {
        let signature = Signature::try_from(signature)
            .map_err(|e| Error::InvalidSignature(e.to_string()))?;
        signature
            .recover_address_from_prehash(&self.signing_hash())
            .map_err(|e| Error::InvalidSignature(e.to_string()))
    }

    pub fn timestamp(&self) -> u64 {
        u64::try_from(self.message.timestamp).unwrap_or(u64::MAX)
    }
}
