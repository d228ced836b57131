//! Ciphertext handle layout
//!
//! A handle is 32 bytes, read as a big-endian integer:
//! ```text
//! [0..21]   digest prefix (binds ciphertext, contract, user)
//! [21]      index of the value within its encrypted input
//! [22..30]  chain id (u64, big-endian)
//! [30]      type tag (see EncryptedType::type_tag)
//! [31]      layout version
//! ```

use alloy_primitives::{B256, U256};

use crate::{EncryptedType, Error};

pub const HANDLE_VERSION: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleLayout {
    pub digest: [u8; 21],
    pub index: u8,
    pub chain_id: u64,
    pub kind: EncryptedType,
    pub version: u8,
}

impl HandleLayout {
    pub fn new(digest: B256, index: u8, chain_id: u64, kind: EncryptedType) -> Self {
        let mut prefix = [0u8; 21];
        prefix.copy_from_slice(&digest[..21]);
        Self {
            digest: prefix,
            index,
            chain_id,
            kind,
            version: HANDLE_VERSION,
        }
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[..21].copy_from_slice(&self.digest);
        out[21] = self.index;
        out[22..30].copy_from_slice(&self.chain_id.to_be_bytes());
        out[30] = self.kind.type_tag();
        out[31] = self.version;
        out
    }

    pub fn to_handle(&self) -> U256 {
        U256::from_be_bytes(self.to_bytes())
    }

    pub fn parse(handle: U256) -> Result<Self, Error> {
        let bytes: [u8; 32] = handle.to_be_bytes();

        let kind = EncryptedType::from_type_tag(bytes[30]).ok_or_else(|| {
            Error::InvalidCiphertext(format!("Unknown type tag in handle: {}", bytes[30]))
        })?;
        if bytes[31] != HANDLE_VERSION {
            return Err(Error::InvalidCiphertext(format!(
                "Unsupported handle version: {}",
                bytes[31]
            )));
        }

        let mut digest = [0u8; 21];
        digest.copy_from_slice(&bytes[..21]);
        let mut chain = [0u8; 8];
        chain.copy_from_slice(&bytes[22..30]);

        Ok(Self {
            digest,
            index: bytes[21],
            chain_id: u64::from_be_bytes(chain),
            kind,
            version: bytes[31],
        })
    }
}
