//! Encrypted input and decryption result shapes

use std::fmt;

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Network FHE public key (opaque bytes, hex on the wire)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(Bytes);

impl PublicKey {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({} bytes)", self.0.len())
    }
}

/// Ciphertext material ready for a contract call
///
/// `handles[i]` refers to the i-th value added to the builder. Pass
/// `handles`, `data` and `input_proof` to the contract verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedInput {
    pub data: Bytes,
    pub input_proof: Bytes,
    pub handles: Vec<U256>,
}

/// A request to decrypt one handle on behalf of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptionRequest {
    pub contract_address: Address,
    pub handle: U256,
    pub user_address: Address,
}

/// Result of a user-authorized decryption
///
/// Carries the signature that authorized it so callers can verify it
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDecryptResult {
    pub value: U256,
    pub signature: Bytes,
}

/// Result of a public decryption; no per-user authorization involved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicDecryptResult {
    pub value: U256,
    /// Unix milliseconds at completion
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypted_input_json() {
        let input = EncryptedInput {
            data: Bytes::from(vec![0xaa, 0xbb]),
            input_proof: Bytes::from(vec![0x01]),
            handles: vec![U256::from(1u8), U256::from(2u8)],
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["data"], "0xaabb");
        assert_eq!(json["inputProof"], "0x01");
        assert_eq!(json["handles"].as_array().unwrap().len(), 2);

        let back: EncryptedInput = serde_json::from_value(json).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn test_public_key_debug_hides_bytes() {
        let key = PublicKey::new(vec![0u8; 64]);
        assert_eq!(format!("{:?}", key), "PublicKey(64 bytes)");
    }
}
