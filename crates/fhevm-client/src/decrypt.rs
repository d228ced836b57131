//! Decryption protocol
//!
//! | Mode | Signed | Result |
//! |------|--------|--------|
//! | user | EIP-712 `Decrypt{handle, user, timestamp}` by the data owner | value + signature |
//! | public | no | value + completion time |

use std::time::{SystemTime, UNIX_EPOCH};

use fhevm_core::{
    Address, DecryptAuthorization, DecryptionRequest, PublicDecryptResult, UserDecryptResult, U256,
};
use thiserror::Error;

use crate::error::{BoxError, ClientError, DecryptMode, Result};
use crate::traits::{DecryptionGateway, GatewayRequest, TypedDataSigner, UserAuthorization};

/// Protocol violations detected before or after the gateway round-trip
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Signer is {actual}, but the request is for {expected}")]
    SignerMismatch { expected: Address, actual: Address },

    #[error("Signer returned an empty signature")]
    EmptySignature,
}

/// Current Unix time in whole seconds
pub fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Current Unix time in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub(crate) async fn user_decrypt<G, S>(
    gateway: &G,
    chain_id: u64,
    request: &DecryptionRequest,
    signer: &S,
) -> Result<UserDecryptResult>
where
    G: DecryptionGateway,
    S: TypedDataSigner,
{
    let fail = |source: BoxError| ClientError::decryption(DecryptMode::User, source);

    let signer_address = signer.address().await.map_err(fail)?;
    if signer_address != request.user_address {
        return Err(fail(
            ProtocolError::SignerMismatch {
                expected: request.user_address,
                actual: signer_address,
            }
            .into(),
        ));
    }

    let authorization = DecryptAuthorization::new(
        chain_id,
        request.contract_address,
        request.handle,
        request.user_address,
        unix_seconds(),
    );

    tracing::debug!(
        contract = %request.contract_address,
        user = %request.user_address,
        timestamp = authorization.timestamp(),
        "Requesting decryption signature"
    );
    let signature = signer
        .sign_typed_data(&authorization)
        .await
        .map_err(fail)?;
    if signature.is_empty() {
        return Err(fail(ProtocolError::EmptySignature.into()));
    }

    let value = gateway
        .decrypt(&GatewayRequest {
            handle: request.handle,
            contract_address: request.contract_address,
            authorization: Some(UserAuthorization {
                signature: signature.clone(),
                user: request.user_address,
                timestamp: authorization.timestamp(),
            }),
        })
        .await
        .map_err(fail)?;

    tracing::info!(
        mode = %DecryptMode::User,
        contract = %request.contract_address,
        "Decryption completed"
    );
    Ok(UserDecryptResult { value, signature })
}

pub(crate) async fn public_decrypt<G: DecryptionGateway>(
    gateway: &G,
    handle: U256,
    contract: Address,
) -> Result<PublicDecryptResult> {
    let value = gateway
        .decrypt(&GatewayRequest {
            handle,
            contract_address: contract,
            authorization: None,
        })
        .await
        .map_err(|source| ClientError::decryption(DecryptMode::Public, source))?;

    tracing::info!(
        mode = %DecryptMode::Public,
        contract = %contract,
        "Decryption completed"
    );
    Ok(PublicDecryptResult {
        value,
        timestamp: unix_millis(),
    })
}
