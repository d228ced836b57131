//! fhevm-client: Client SDK for FHE-enabled contracts
//!
//! ```text
//! FhevmClient::init()            engine bootstrap, public key, context
//!   -> create_encrypted_input()  EncryptedInputBuilder (validates on add)
//!   -> encrypt(&wallet)          {data, input_proof, handles[]} for the contract call
//!   ...
//!   -> request_user_decrypt()    EIP-712 signature + gateway  -> {value, signature}
//!   -> request_public_decrypt()  gateway only                 -> {value, timestamp}
//! ```
//!
//! Cryptography and transport live behind the traits in [`traits`]; the SDK
//! ships [`DevEngine`], [`HttpGateway`] and [`LocalWallet`] implementations.

pub mod builder;
pub mod client;
pub mod decrypt;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod policy;
pub mod traits;
pub mod wallet;

#[cfg(test)]
mod fakes;

pub use builder::{EncryptedInputBuilder, IntoUint};
pub use client::{FhevmClient, SessionContext, SessionState};
pub use engine::{DevContext, DevEngine};
pub use error::{BoxError, ClientError, DecryptMode, ErrorKind, InitStage, Result};
pub use gateway::{HttpError, HttpGateway, HttpKeyProvider};
pub use policy::{CallPolicy, PolicyError};
pub use traits::{
    ContextParams, DecryptionGateway, FheEngine, GatewayRequest, TypedDataSigner,
    UserAuthorization, Wallet,
};
pub use wallet::{LocalWallet, WalletError};

/// Session wired to the development engine and an HTTP gateway at the
/// configured endpoint
pub fn create_dev_client(config: fhevm_core::FhevmConfig) -> FhevmClient<DevEngine, HttpGateway> {
    let gateway = HttpGateway::from_config(&config);
    FhevmClient::new(config, DevEngine::new(), gateway)
}
