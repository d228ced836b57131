//! Collaborator seams
//!
//! The session never performs cryptography or I/O itself. It drives three
//! collaborators:
//! - [`FheEngine`]: public key resolution, context building, input encryption
//! - [`DecryptionGateway`]: releases plaintexts for authorized handles
//! - [`Wallet`] / [`TypedDataSigner`]: user identity and EIP-712 signing
//!
//! All failures are reported as [`BoxError`] and wrapped by the session into
//! the matching [`crate::ClientError`] variant with the cause preserved.

use std::future::Future;

use fhevm_core::{
    Address, Bytes, DecryptAuthorization, EncryptedInput, FhevmConfig, PublicKey, TypedValue, U256,
};

use crate::error::BoxError;

/// Everything the engine needs to build a session context
#[derive(Debug, Clone)]
pub struct ContextParams<'a> {
    pub chain_id: u64,
    pub public_key: &'a PublicKey,
    pub gateway_url: &'a str,
    pub acl_address: Option<Address>,
    pub kms_verifier_address: Option<Address>,
}

pub trait FheEngine: Send + Sync {
    /// Engine-specific state produced by [`FheEngine::build_context`]
    type Context: Send + Sync;

    /// One-time runtime setup. Called before anything else on every init
    /// attempt; implementations should make repeated calls cheap.
    fn bootstrap(&self) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Fetch the network public key. Only called when the config carries none.
    fn resolve_public_key(
        &self,
        config: &FhevmConfig,
    ) -> impl Future<Output = Result<PublicKey, BoxError>> + Send;

    fn build_context(
        &self,
        params: ContextParams<'_>,
    ) -> impl Future<Output = Result<Self::Context, BoxError>> + Send;

    /// Encrypt `values` in order, bound to `contract` and `user`.
    ///
    /// Must return exactly one handle per value, in the same order.
    fn encrypt(
        &self,
        context: &Self::Context,
        contract: Address,
        user: Address,
        values: &[TypedValue],
    ) -> impl Future<Output = Result<EncryptedInput, BoxError>> + Send;
}

/// Proof of consent attached to a user decryption request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAuthorization {
    pub signature: Bytes,
    pub user: Address,
    /// Unix seconds, as signed
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    pub handle: U256,
    pub contract_address: Address,
    /// `None` for public decryption
    pub authorization: Option<UserAuthorization>,
}

pub trait DecryptionGateway: Send + Sync {
    fn decrypt(
        &self,
        request: &GatewayRequest,
    ) -> impl Future<Output = Result<U256, BoxError>> + Send;
}

pub trait Wallet: Send + Sync {
    /// Address of the account that will own submitted inputs
    fn address(&self) -> impl Future<Output = Result<Address, BoxError>> + Send;
}

/// A wallet that can produce EIP-712 signatures
///
/// Signing may involve the user (a wallet prompt); a refusal is reported as
/// an error.
pub trait TypedDataSigner: Wallet {
    fn sign_typed_data(
        &self,
        authorization: &DecryptAuthorization,
    ) -> impl Future<Output = Result<Bytes, BoxError>> + Send;
}
