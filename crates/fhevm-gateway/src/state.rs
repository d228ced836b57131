//! Gateway state: registered ciphertexts and their access lists
//!
//! The gateway stands in for the on-chain ACL and the KMS. Inputs registered
//! through [`GatewayState::ingest`] are opened with the development codec and
//! kept in memory together with their owner and contract.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use fhevm_core::transparent::{self, InputBinding};
use fhevm_core::wire::{DecryptBody, IngestRequest};
use fhevm_core::{DecryptAuthorization, PublicKey, TypedValue};
use tokio::sync::RwLock;

use crate::config::{GatewayConfig, MAX_CLOCK_SKEW};
use crate::error::{GatewayError, Result};

#[derive(Debug, Clone)]
pub struct StoredValue {
    pub value: TypedValue,
    pub contract: Address,
    pub owner: Address,
    pub allowed: HashSet<Address>,
    pub public: bool,
}

pub struct GatewayState {
    chain_id: u64,
    public_key: PublicKey,
    max_signature_age: Duration,
    values: HashMap<U256, StoredValue>,
}

pub type SharedState = Arc<RwLock<GatewayState>>;

pub fn create_shared_state(config: &GatewayConfig) -> SharedState {
    Arc::new(RwLock::new(GatewayState::new(config)))
}

impl GatewayState {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            public_key: config.public_key(),
            max_signature_age: config.max_signature_age,
            values: HashMap::new(),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn handle_count(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, handle: &U256) -> Option<&StoredValue> {
        self.values.get(handle)
    }

    /// Verify and open an encrypted input; the submitting user owns every value
    pub fn ingest(&mut self, request: &IngestRequest) -> Result<Vec<U256>> {
        let binding = InputBinding {
            public_key: &self.public_key,
            chain_id: self.chain_id,
            contract: request.contract_address,
            user: request.user_address,
        };
        let opened = transparent::open(&binding, &request.input)?;

        let mut handles = Vec::with_capacity(opened.len());
        for (handle, value) in opened {
            match self.values.entry(handle) {
                Entry::Occupied(existing) => {
                    // same sealed input submitted again; ownership and ACL stay as they are
                    tracing::debug!(
                        handle = %handle,
                        contract = %request.contract_address,
                        owner = %existing.get().owner,
                        "Handle already registered, keeping existing entry"
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(StoredValue {
                        value,
                        contract: request.contract_address,
                        owner: request.user_address,
                        allowed: HashSet::from([request.user_address]),
                        public: false,
                    });
                }
            }
            handles.push(handle);
        }
        Ok(handles)
    }

    fn stored_mut(&mut self, handle: U256) -> Result<&mut StoredValue> {
        self.values
            .get_mut(&handle)
            .ok_or(GatewayError::UnknownHandle(handle))
    }

    pub fn allow(&mut self, handle: U256, user: Address) -> Result<()> {
        self.stored_mut(handle)?.allowed.insert(user);
        Ok(())
    }

    pub fn publish(&mut self, handle: U256) -> Result<()> {
        self.stored_mut(handle)?.public = true;
        Ok(())
    }

    /// Release a plaintext if the request is authorized. `now` is Unix seconds.
    ///
    /// Without authorization fields the handle must be published. With them,
    /// the EIP-712 signature must recover to `user`, `user` must be on the
    /// handle's ACL and the signed timestamp must be fresh.
    pub fn decrypt(&self, request: &DecryptBody, now: u64) -> Result<U256> {
        let stored = self
            .values
            .get(&request.handle)
            .ok_or(GatewayError::UnknownHandle(request.handle))?;
        if stored.contract != request.contract_address {
            return Err(GatewayError::Unauthorized(
                "handle does not belong to this contract".into(),
            ));
        }

        match (&request.signature, request.user, request.timestamp) {
            (None, None, None) => {
                if !stored.public {
                    return Err(GatewayError::Unauthorized(
                        "handle is not publicly decryptable".into(),
                    ));
                }
            }
            (Some(signature), Some(user), Some(timestamp)) => {
                self.check_timestamp(timestamp, now)?;

                let authorization = DecryptAuthorization::new(
                    self.chain_id,
                    request.contract_address,
                    request.handle,
                    user,
                    timestamp,
                );
                let signer = authorization
                    .recover_signer(signature)
                    .map_err(|e| GatewayError::BadRequest(e.to_string()))?;
                if signer != user {
                    return Err(GatewayError::Unauthorized(
                        "signature was not produced by the requesting user".into(),
                    ));
                }
                if !stored.allowed.contains(&user) {
                    return Err(GatewayError::Unauthorized(
                        "user is not allowed to decrypt this handle".into(),
                    ));
                }
            }
            _ => {
                return Err(GatewayError::BadRequest(
                    "signature, user and timestamp must be sent together".into(),
                ))
            }
        }

        stored.value.to_u256().ok_or_else(|| {
            GatewayError::BadRequest(format!(
                "{} value has no integer form",
                stored.value.kind()
            ))
        })
    }

    fn check_timestamp(&self, timestamp: u64, now: u64) -> Result<()> {
        if timestamp > now.saturating_add(MAX_CLOCK_SKEW.as_secs()) {
            return Err(GatewayError::Unauthorized(
                "signature timestamp is in the future".into(),
            ));
        }
        if now.saturating_sub(timestamp) > self.max_signature_age.as_secs() {
            return Err(GatewayError::Unauthorized("signature has expired".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, B256};
    use alloy_signer::SignerSync;
    use alloy_signer_local::PrivateKeySigner;
    use fhevm_core::EncryptedInput;

    const NOW: u64 = 1_700_000_000;

    fn contract() -> Address {
        Address::repeat_byte(0xc0)
    }

    fn state() -> GatewayState {
        GatewayState::new(&GatewayConfig::default())
    }

    fn seal_for(state: &GatewayState, user: Address, values: &[TypedValue]) -> EncryptedInput {
        let binding = InputBinding {
            public_key: state.public_key(),
            chain_id: state.chain_id(),
            contract: contract(),
            user,
        };
        transparent::seal(&binding, B256::repeat_byte(3), values).unwrap()
    }

    fn ingest(state: &mut GatewayState, user: Address, values: &[TypedValue]) -> Vec<U256> {
        let input = seal_for(state, user, values);
        state
            .ingest(&IngestRequest {
                contract_address: contract(),
                user_address: user,
                input,
            })
            .unwrap()
    }

    fn signed(
        signer: &PrivateKeySigner,
        handle: U256,
        user: Address,
        timestamp: u64,
    ) -> DecryptBody {
        let authorization =
            DecryptAuthorization::new(31_337, contract(), handle, user, timestamp);
        let signature = signer.sign_hash_sync(&authorization.signing_hash()).unwrap();
        DecryptBody {
            handle,
            contract_address: contract(),
            signature: Some(Bytes::from(signature.as_bytes().to_vec())),
            user: Some(user),
            timestamp: Some(timestamp),
        }
    }

    fn public(handle: U256) -> DecryptBody {
        DecryptBody {
            handle,
            contract_address: contract(),
            signature: None,
            user: None,
            timestamp: None,
        }
    }

    #[test]
    fn test_ingest_records_owner() {
        let mut state = state();
        let user = Address::repeat_byte(0x0a);
        let handles = ingest(&mut state, user, &[TypedValue::Uint32(10), TypedValue::Bool(true)]);

        assert_eq!(handles.len(), 2);
        assert_eq!(state.handle_count(), 2);
        let stored = state.get(&handles[0]).unwrap();
        assert_eq!(stored.value, TypedValue::Uint32(10));
        assert_eq!(stored.owner, user);
        assert!(stored.allowed.contains(&user));
        assert!(!stored.public);
    }

    #[test]
    fn test_reingest_keeps_existing_entry() {
        let mut state = state();
        let user = Address::repeat_byte(0x0a);
        let reader = Address::repeat_byte(0x0c);
        let values = [TypedValue::Uint16(7), TypedValue::Bool(false)];
        let first = ingest(&mut state, user, &values);
        state.allow(first[0], reader).unwrap();
        state.publish(first[1]).unwrap();

        let second = ingest(&mut state, user, &values);
        assert_eq!(second, first);
        assert_eq!(state.handle_count(), 2);

        let stored = state.get(&first[0]).unwrap();
        assert_eq!(stored.owner, user);
        assert!(stored.allowed.contains(&reader));
        assert!(state.get(&first[1]).unwrap().public);
    }

    #[test]
    fn test_ingest_rejects_wrong_user() {
        let mut state = state();
        let input = seal_for(&state, Address::repeat_byte(0x0a), &[TypedValue::Uint8(1)]);
        let err = state
            .ingest(&IngestRequest {
                contract_address: contract(),
                user_address: Address::repeat_byte(0x0b),
                input,
            })
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
    }

    #[test]
    fn test_owner_can_decrypt() {
        let mut state = state();
        let signer = PrivateKeySigner::random();
        let handles = ingest(&mut state, signer.address(), &[TypedValue::Uint64(99)]);

        let value = state
            .decrypt(&signed(&signer, handles[0], signer.address(), NOW), NOW)
            .unwrap();
        assert_eq!(value, U256::from(99u8));
    }

    #[test]
    fn test_user_decrypt_checks() {
        let mut state = state();
        let owner = PrivateKeySigner::random();
        let stranger = PrivateKeySigner::random();
        let handle = ingest(&mut state, owner.address(), &[TypedValue::Uint8(5)])[0];

        // not on the ACL
        let err = state
            .decrypt(&signed(&stranger, handle, stranger.address(), NOW), NOW)
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized(_)));

        // signature by someone else on the owner's behalf
        let err = state
            .decrypt(&signed(&stranger, handle, owner.address(), NOW), NOW)
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized(_)));

        // stale and future timestamps
        let old = NOW - 2 * 24 * 60 * 60;
        let err = state.decrypt(&signed(&owner, handle, owner.address(), old), NOW).unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized(_)));
        let future = NOW + 600;
        let err = state
            .decrypt(&signed(&owner, handle, owner.address(), future), NOW)
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized(_)));

        // within the skew allowance
        assert!(state.decrypt(&signed(&owner, handle, owner.address(), NOW + 30), NOW).is_ok());

        // granting access lets the stranger in
        state.allow(handle, stranger.address()).unwrap();
        assert!(state
            .decrypt(&signed(&stranger, handle, stranger.address(), NOW), NOW)
            .is_ok());
    }

    #[test]
    fn test_wrong_contract_rejected() {
        let mut state = state();
        let owner = PrivateKeySigner::random();
        let handle = ingest(&mut state, owner.address(), &[TypedValue::Uint8(5)])[0];
        state.publish(handle).unwrap();

        let mut request = public(handle);
        request.contract_address = Address::repeat_byte(0xdd);
        assert!(matches!(state.decrypt(&request, NOW), Err(GatewayError::Unauthorized(_))));
    }

    #[test]
    fn test_public_decrypt_requires_publish() {
        let mut state = state();
        let handle = ingest(&mut state, Address::repeat_byte(0x0a), &[TypedValue::Bool(true)])[0];

        assert!(matches!(state.decrypt(&public(handle), NOW), Err(GatewayError::Unauthorized(_))));
        state.publish(handle).unwrap();
        assert_eq!(state.decrypt(&public(handle), NOW).unwrap(), U256::from(1u8));
    }

    #[test]
    fn test_partial_authorization_is_bad_request() {
        let mut state = state();
        let handle = ingest(&mut state, Address::repeat_byte(0x0a), &[TypedValue::Bool(true)])[0];
        let mut request = public(handle);
        request.user = Some(Address::repeat_byte(0x0a));
        assert!(matches!(state.decrypt(&request, NOW), Err(GatewayError::BadRequest(_))));
    }

    #[test]
    fn test_unknown_handle() {
        let mut state = state();
        assert!(matches!(
            state.decrypt(&public(U256::from(1u8)), NOW),
            Err(GatewayError::UnknownHandle(_))
        ));
        assert!(matches!(state.publish(U256::from(1u8)), Err(GatewayError::UnknownHandle(_))));
    }
}
