//! fhevm-core: Shared types for the FHEVM client SDK
//!
//! This crate defines everything that does not need a network or an FHE
//! runtime:
//! - Typed plaintext values and their bit-width validation
//! - Session configuration (network, ACL/KMS/gateway addresses)
//! - Encrypted input and decryption result shapes
//! - The EIP-712 authorization signed for user decryption
//! - The 32-byte ciphertext handle layout
//! - A transparent development codec shared by the dev engine and the
//!   reference gateway
//!
//! # Authorization Model
//!
//! | Mode | Authorization | Result |
//! |------|---------------|--------|
//! | User decryption | EIP-712 signature by the data owner | value + signature |
//! | Public decryption | none (handle must be published) | value + timestamp |
//!
//! The two result shapes are distinct types, so a publicly revealed
//! aggregate can never be passed where an individually authorized value is
//! expected.

mod config;
mod eip712;
mod error;
mod handle;
mod input;
mod types;
pub mod transparent;
pub mod validate;
pub mod wire;

pub use config::{FhevmConfig, NetworkConfig};
pub use eip712::{Decrypt, DecryptAuthorization};
pub use error::{Error, ValidationError};
pub use handle::{HandleLayout, HANDLE_VERSION};
pub use input::{
    DecryptionRequest, EncryptedInput, PublicDecryptResult, PublicKey, UserDecryptResult,
};
pub use types::{EncryptedType, TypedValue};

pub use alloy_primitives::{Address, Bytes, B256, U256};

pub type Result<T> = std::result::Result<T, Error>;

/// Constants shared by the client and the gateway
pub mod constants {
    /// Decryption service used when the configuration names none
    pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.zama.ai";

    /// EIP-712 domain name for decryption authorizations
    pub const EIP712_DOMAIN_NAME: &str = "FHE Decryption";

    /// EIP-712 domain version for decryption authorizations
    pub const EIP712_DOMAIN_VERSION: &str = "1";

    /// Sepolia testnet chain ID
    pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

    /// Chain ID used by local development nodes (hardhat/anvil)
    pub const LOCAL_CHAIN_ID: u64 = 31_337;

    /// Maximum number of entries in one encrypted input (handle index is one byte)
    pub const MAX_INPUT_ENTRIES: usize = 255;
}
