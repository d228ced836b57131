//! fhevm-sdk: Client SDK for FHE-enabled smart contracts
//!
//! Encrypt typed values for a contract call, and decrypt the resulting
//! handles later either as their owner (EIP-712 signed) or publicly.
//!
//! ```ignore
//! use fhevm_sdk::{create_dev_client, FhevmConfig, LocalWallet, NetworkConfig};
//!
//! let config = FhevmConfig::new(NetworkConfig::local("http://127.0.0.1:8545"))
//!     .with_gateway("http://127.0.0.1:8080");
//! let mut client = create_dev_client(config);
//! client.init().await?;
//!
//! let wallet = LocalWallet::random();
//! let mut input = client.create_encrypted_input(contract)?;
//! input.add_uint32(10u32)?.add_bool(true)?;
//! let encrypted = input.encrypt(&wallet).await?;
//! ```

pub use fhevm_client::*;
pub use fhevm_core::{
    constants, transparent, validate, wire, Address, Bytes, Decrypt, DecryptAuthorization,
    DecryptionRequest, EncryptedInput, EncryptedType, FhevmConfig, HandleLayout, NetworkConfig,
    PublicDecryptResult, PublicKey, TypedValue, UserDecryptResult, ValidationError, B256, U256,
};

/// SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "1.0.0");
    }
}
