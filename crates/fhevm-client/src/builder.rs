//! Encrypted input builder
//!
//! Accumulates typed values for one destination contract, validating each
//! on entry, then hands them to the engine in append order:
//!
//! ```ignore
//! let mut input = client.create_encrypted_input(contract)?;
//! input.add_uint32(10u32)?.add_bool(true)?.add_address(&owner)?;
//! let encrypted = input.encrypt(&wallet).await?;
//! // encrypted.handles[0] is the uint32, [1] the bool, [2] the address
//! ```
//!
//! A builder is single-use: after `encrypt()` every further call fails with
//! `AlreadyEncrypted`.

use std::sync::Arc;

use fhevm_core::constants::MAX_INPUT_ENTRIES;
use fhevm_core::{
    Address, Bytes, EncryptedInput, EncryptedType, TypedValue, ValidationError, U256,
};

use crate::client::SessionContext;
use crate::error::{ClientError, Result};
use crate::traits::{FheEngine, Wallet};

/// Native unsigned integers accepted by the `add_uint*` methods
pub trait IntoUint {
    fn into_uint(self) -> U256;
}

macro_rules! impl_into_uint {
    ($($t:ty),*) => {
        $(impl IntoUint for $t {
            fn into_uint(self) -> U256 {
                U256::from(self)
            }
        })*
    };
}

impl_into_uint!(u8, u16, u32, u64, u128, usize);

impl IntoUint for U256 {
    fn into_uint(self) -> U256 {
        self
    }
}

#[derive(Debug, thiserror::Error)]
enum EngineContractError {
    #[error("Engine returned {returned} handles for {expected} values")]
    HandleCount { expected: usize, returned: usize },
}

pub struct EncryptedInputBuilder<E: FheEngine> {
    engine: Arc<E>,
    session: Arc<SessionContext<E::Context>>,
    contract: Address,
    entries: Vec<TypedValue>,
    consumed: bool,
}

impl<E: FheEngine> std::fmt::Debug for EncryptedInputBuilder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedInputBuilder")
            .field("contract", &self.contract)
            .field("entries", &self.entries.len())
            .field("consumed", &self.consumed)
            .finish()
    }
}

impl<E: FheEngine> EncryptedInputBuilder<E> {
    pub(crate) fn new(
        engine: Arc<E>,
        session: Arc<SessionContext<E::Context>>,
        contract: Address,
    ) -> Self {
        Self {
            engine,
            session,
            contract,
            entries: Vec::new(),
            consumed: false,
        }
    }

    pub fn contract_address(&self) -> Address {
        self.contract
    }

    /// Pending values in append order
    pub fn entries(&self) -> &[TypedValue] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an already validated value
    pub fn add(&mut self, value: TypedValue) -> Result<&mut Self> {
        if self.consumed {
            return Err(ClientError::AlreadyEncrypted);
        }
        if self.entries.len() >= MAX_INPUT_ENTRIES {
            return Err(ValidationError::Format(format!(
                "An encrypted input holds at most {} values",
                MAX_INPUT_ENTRIES
            ))
            .into());
        }
        self.entries.push(value);
        Ok(self)
    }

    fn add_uint(&mut self, kind: EncryptedType, value: U256) -> Result<&mut Self> {
        let value = TypedValue::uint(kind, value)?;
        self.add(value)
    }

    pub fn add_uint8(&mut self, value: impl IntoUint) -> Result<&mut Self> {
        self.add_uint(EncryptedType::Uint8, value.into_uint())
    }

    pub fn add_uint16(&mut self, value: impl IntoUint) -> Result<&mut Self> {
        self.add_uint(EncryptedType::Uint16, value.into_uint())
    }

    pub fn add_uint32(&mut self, value: impl IntoUint) -> Result<&mut Self> {
        self.add_uint(EncryptedType::Uint32, value.into_uint())
    }

    pub fn add_uint64(&mut self, value: impl IntoUint) -> Result<&mut Self> {
        self.add_uint(EncryptedType::Uint64, value.into_uint())
    }

    pub fn add_uint128(&mut self, value: impl IntoUint) -> Result<&mut Self> {
        self.add_uint(EncryptedType::Uint128, value.into_uint())
    }

    pub fn add_uint256(&mut self, value: impl IntoUint) -> Result<&mut Self> {
        self.add_uint(EncryptedType::Uint256, value.into_uint())
    }

    /// `value` must be `0x` followed by exactly 40 hex digits
    pub fn add_address(&mut self, value: &str) -> Result<&mut Self> {
        let value = TypedValue::address(value)?;
        self.add(value)
    }

    pub fn add_bool(&mut self, value: bool) -> Result<&mut Self> {
        self.add(TypedValue::Bool(value))
    }

    pub fn add_bytes(&mut self, value: impl Into<Bytes>) -> Result<&mut Self> {
        self.add(TypedValue::Bytes(value.into()))
    }

    /// Encrypt all pending values for the wallet's account.
    ///
    /// The returned handles line up one-to-one with the values in the order
    /// they were added. The builder is consumed even if the engine fails.
    pub async fn encrypt<W: Wallet>(&mut self, wallet: &W) -> Result<EncryptedInput> {
        if self.consumed {
            return Err(ClientError::AlreadyEncrypted);
        }
        if self.entries.is_empty() {
            return Err(ClientError::EmptyInput);
        }

        let entries = std::mem::take(&mut self.entries);
        self.consumed = true;

        let user = wallet.address().await.map_err(ClientError::encryption)?;
        tracing::debug!(
            contract = %self.contract,
            user = %user,
            entries = entries.len(),
            "Encrypting input"
        );

        let input = self
            .engine
            .encrypt(&self.session.engine, self.contract, user, &entries)
            .await
            .map_err(ClientError::encryption)?;

        if input.handles.len() != entries.len() {
            return Err(ClientError::encryption(EngineContractError::HandleCount {
                expected: entries.len(),
                returned: input.handles.len(),
            }));
        }

        tracing::info!(
            contract = %self.contract,
            chain_id = self.session.chain_id,
            handles = input.handles.len(),
            "Encrypted input ready"
        );
        Ok(input)
    }
}
