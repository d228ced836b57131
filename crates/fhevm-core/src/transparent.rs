//! Transparent development codec
//!
//! Produces ciphertext-shaped material for local networks and tests. It is
//! NOT encryption: the key stream is SHAKE256 over the network public key and
//! public call data, so anyone holding the public key can open it. The
//! reference gateway uses [`open`] to ingest inputs produced by [`seal`].
//!
//! Data layout:
//! ```text
//! [0]       format version
//! [1]       entry count n
//! [2..34]   salt
//! n times:  [type tag][len: u16 BE][masked plaintext]
//! ```
//! Proof layout: `[n][n * 32-byte handle][32-byte binding]`.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use tiny_keccak::{Hasher, Shake, Xof};

use crate::constants::MAX_INPUT_ENTRIES;
use crate::{EncryptedInput, EncryptedType, Error, HandleLayout, PublicKey, TypedValue};

pub const FORMAT_VERSION: u8 = 1;

const KEYSTREAM_DOMAIN: &[u8] = b"fhevm-dev-keystream";
const HANDLE_DOMAIN: &[u8] = b"fhevm-dev-handle";
const PROOF_DOMAIN: &[u8] = b"fhevm-dev-proof";
const KEY_DOMAIN: &[u8] = b"fhevm-dev-public-key";

/// Size of a derived development public key
pub const DEV_KEY_LEN: usize = 256;

/// Everything an input is bound to besides its values
#[derive(Debug, Clone, Copy)]
pub struct InputBinding<'a> {
    pub public_key: &'a PublicKey,
    pub chain_id: u64,
    pub contract: Address,
    pub user: Address,
}

/// Deterministically derive a development public key from a seed
pub fn derive_public_key(seed: &[u8]) -> PublicKey {
    let mut shake = Shake::v256();
    shake.update(KEY_DOMAIN);
    shake.update(seed);
    let mut key = vec![0u8; DEV_KEY_LEN];
    shake.squeeze(&mut key);
    PublicKey::new(key)
}

fn keystream(binding: &InputBinding<'_>, salt: &B256, index: u8, len: usize) -> Vec<u8> {
    let mut shake = Shake::v256();
    shake.update(KEYSTREAM_DOMAIN);
    shake.update(binding.public_key.as_bytes());
    shake.update(&binding.chain_id.to_be_bytes());
    shake.update(binding.contract.as_slice());
    shake.update(binding.user.as_slice());
    shake.update(salt.as_slice());
    shake.update(&[index]);
    let mut out = vec![0u8; len];
    shake.squeeze(&mut out);
    out
}

fn xor(data: &[u8], stream: &[u8]) -> Vec<u8> {
    data.iter().zip(stream).map(|(a, b)| a ^ b).collect()
}

fn handle_for(
    binding: &InputBinding<'_>,
    salt: &B256,
    index: u8,
    kind: EncryptedType,
    masked: &[u8],
) -> U256 {
    let mut preimage = Vec::with_capacity(HANDLE_DOMAIN.len() + 32 + masked.len() + 41);
    preimage.extend_from_slice(HANDLE_DOMAIN);
    preimage.extend_from_slice(salt.as_slice());
    preimage.extend_from_slice(masked);
    preimage.extend_from_slice(binding.contract.as_slice());
    preimage.extend_from_slice(binding.user.as_slice());
    preimage.push(index);
    HandleLayout::new(keccak256(&preimage), index, binding.chain_id, kind).to_handle()
}

fn proof_binding(binding: &InputBinding<'_>, data: &[u8], handles: &[U256]) -> B256 {
    let mut preimage = Vec::new();
    preimage.extend_from_slice(PROOF_DOMAIN);
    preimage.extend_from_slice(binding.public_key.as_bytes());
    preimage.extend_from_slice(&binding.chain_id.to_be_bytes());
    preimage.extend_from_slice(binding.contract.as_slice());
    preimage.extend_from_slice(binding.user.as_slice());
    preimage.extend_from_slice(data);
    for handle in handles {
        preimage.extend_from_slice(&handle.to_be_bytes::<32>());
    }
    keccak256(&preimage)
}

/// Mask `values` in order and produce data, proof and one handle per value
pub fn seal(
    binding: &InputBinding<'_>,
    salt: B256,
    values: &[TypedValue],
) -> Result<EncryptedInput, Error> {
    if values.is_empty() || values.len() > MAX_INPUT_ENTRIES {
        return Err(Error::InvalidCiphertext(format!(
            "Input must hold 1..={} values, got {}",
            MAX_INPUT_ENTRIES,
            values.len()
        )));
    }

    let mut data = vec![FORMAT_VERSION, values.len() as u8];
    data.extend_from_slice(salt.as_slice());

    let mut handles = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        let index = index as u8;
        let plaintext = value.to_be_bytes();
        let len = u16::try_from(plaintext.len()).map_err(|_| {
            Error::InvalidCiphertext(format!("Value too large: {} bytes", plaintext.len()))
        })?;
        let masked = xor(&plaintext, &keystream(binding, &salt, index, plaintext.len()));

        data.push(value.kind().type_tag());
        data.extend_from_slice(&len.to_be_bytes());
        data.extend_from_slice(&masked);
        handles.push(handle_for(binding, &salt, index, value.kind(), &masked));
    }

    let mut proof = vec![handles.len() as u8];
    for handle in &handles {
        proof.extend_from_slice(&handle.to_be_bytes::<32>());
    }
    proof.extend_from_slice(proof_binding(binding, &data, &handles).as_slice());

    Ok(EncryptedInput {
        data: Bytes::from(data),
        input_proof: Bytes::from(proof),
        handles,
    })
}

/// Verify `input` against `binding` and recover `(handle, value)` pairs in order
pub fn open(binding: &InputBinding<'_>, input: &EncryptedInput) -> Result<Vec<(U256, TypedValue)>, Error> {
    let handles = verify_proof(binding, &input.data, &input.input_proof)?;
    if handles != input.handles {
        return Err(Error::InvalidCiphertext("Handles do not match proof".into()));
    }

    let data = input.data.as_ref();
    if data.len() < 34 || data[0] != FORMAT_VERSION {
        return Err(Error::InvalidCiphertext("Unsupported data header".into()));
    }
    let count = data[1] as usize;
    if count != handles.len() {
        return Err(Error::InvalidCiphertext(format!(
            "Data holds {} values, proof holds {}",
            count,
            handles.len()
        )));
    }
    let salt = B256::from_slice(&data[2..34]);

    let mut cursor = 34;
    let mut opened = Vec::with_capacity(count);
    for (index, expected) in handles.iter().enumerate() {
        let header = data
            .get(cursor..cursor + 3)
            .ok_or_else(|| Error::InvalidCiphertext(format!("Truncated entry {}", index)))?;
        let kind = EncryptedType::from_type_tag(header[0]).ok_or_else(|| {
            Error::InvalidCiphertext(format!("Unknown type tag {} at entry {}", header[0], index))
        })?;
        let len = u16::from_be_bytes([header[1], header[2]]) as usize;
        cursor += 3;

        let masked = data
            .get(cursor..cursor + len)
            .ok_or_else(|| Error::InvalidCiphertext(format!("Truncated entry {}", index)))?;
        cursor += len;

        let index = index as u8;
        if handle_for(binding, &salt, index, kind, masked) != *expected {
            return Err(Error::InvalidCiphertext(format!("Handle mismatch at entry {}", index)));
        }
        let plaintext = xor(masked, &keystream(binding, &salt, index, len));
        opened.push((*expected, TypedValue::from_be_bytes(kind, &plaintext)?));
    }

    if cursor != data.len() {
        return Err(Error::InvalidCiphertext("Trailing bytes after last entry".into()));
    }
    Ok(opened)
}

/// Check the proof's binding and return the handles it commits to
pub fn verify_proof(binding: &InputBinding<'_>, data: &[u8], proof: &[u8]) -> Result<Vec<U256>, Error> {
    let count = *proof
        .first()
        .ok_or_else(|| Error::InvalidCiphertext("Empty proof".into()))? as usize;
    if proof.len() != 1 + count * 32 + 32 {
        return Err(Error::InvalidCiphertext(format!(
            "Proof length {} does not match {} handles",
            proof.len(),
            count
        )));
    }

    let handles: Vec<U256> = proof[1..1 + count * 32]
        .chunks_exact(32)
        .map(U256::from_be_slice)
        .collect();
    let claimed = B256::from_slice(&proof[1 + count * 32..]);
    if proof_binding(binding, data, &handles) != claimed {
        return Err(Error::InvalidCiphertext("Proof binding mismatch".into()));
    }
    Ok(handles)
}
