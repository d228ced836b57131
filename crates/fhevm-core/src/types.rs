//! Encrypted value kinds and validated plaintext values

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validate;
use crate::{Error, ValidationError};

/// Kind of an encrypted value, as declared by the target contract
///
/// Serialized in its short form (`"uint8"`); the `e`-prefixed contract
/// spelling (`"euint8"`) is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptedType {
    #[serde(alias = "euint8")]
    Uint8,
    #[serde(alias = "euint16")]
    Uint16,
    #[serde(alias = "euint32")]
    Uint32,
    #[serde(alias = "euint64")]
    Uint64,
    #[serde(alias = "euint128")]
    Uint128,
    #[serde(alias = "euint256")]
    Uint256,
    #[serde(alias = "eaddress")]
    Address,
    #[serde(alias = "ebool")]
    Bool,
    #[serde(alias = "ebytes")]
    Bytes,
}

impl EncryptedType {
    pub const ALL: [EncryptedType; 9] = [
        EncryptedType::Uint8,
        EncryptedType::Uint16,
        EncryptedType::Uint32,
        EncryptedType::Uint64,
        EncryptedType::Uint128,
        EncryptedType::Uint256,
        EncryptedType::Address,
        EncryptedType::Bool,
        EncryptedType::Bytes,
    ];

    /// Bit width for integer kinds, `None` otherwise
    pub fn uint_bits(&self) -> Option<u32> {
        match self {
            EncryptedType::Uint8 => Some(8),
            EncryptedType::Uint16 => Some(16),
            EncryptedType::Uint32 => Some(32),
            EncryptedType::Uint64 => Some(64),
            EncryptedType::Uint128 => Some(128),
            EncryptedType::Uint256 => Some(256),
            EncryptedType::Address | EncryptedType::Bool | EncryptedType::Bytes => None,
        }
    }

    /// Contract-side type name (`euint8`, `eaddress`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptedType::Uint8 => "euint8",
            EncryptedType::Uint16 => "euint16",
            EncryptedType::Uint32 => "euint32",
            EncryptedType::Uint64 => "euint64",
            EncryptedType::Uint128 => "euint128",
            EncryptedType::Uint256 => "euint256",
            EncryptedType::Address => "eaddress",
            EncryptedType::Bool => "ebool",
            EncryptedType::Bytes => "ebytes",
        }
    }

    /// Type tag stored in byte 30 of a ciphertext handle
    pub fn type_tag(&self) -> u8 {
        match self {
            EncryptedType::Bool => 0,
            EncryptedType::Uint8 => 2,
            EncryptedType::Uint16 => 3,
            EncryptedType::Uint32 => 4,
            EncryptedType::Uint64 => 5,
            EncryptedType::Uint128 => 6,
            EncryptedType::Address => 7,
            EncryptedType::Uint256 => 8,
            EncryptedType::Bytes => 11,
        }
    }

    pub fn from_type_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_tag() == tag)
    }

    /// Plaintext width in bytes, `None` for variable-length bytes
    pub fn byte_len(&self) -> Option<usize> {
        match self {
            EncryptedType::Bool => Some(1),
            EncryptedType::Address => Some(20),
            EncryptedType::Bytes => None,
            uint => uint.uint_bits().map(|bits| bits as usize / 8),
        }
    }
}

impl fmt::Display for EncryptedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncryptedType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let name = lower.strip_prefix('e').unwrap_or(&lower);
        match name {
            "uint8" => Ok(EncryptedType::Uint8),
            "uint16" => Ok(EncryptedType::Uint16),
            "uint32" => Ok(EncryptedType::Uint32),
            "uint64" => Ok(EncryptedType::Uint64),
            "uint128" => Ok(EncryptedType::Uint128),
            "uint256" => Ok(EncryptedType::Uint256),
            "address" => Ok(EncryptedType::Address),
            "bool" => Ok(EncryptedType::Bool),
            "bytes" => Ok(EncryptedType::Bytes),
            _ => Err(ValidationError::Type(format!("Unknown encrypted type: {}", s))),
        }
    }
}

/// A plaintext value that has passed validation for its kind
///
/// Integers are narrowed to the smallest native type that holds the kind,
/// so a constructed value can never exceed its declared width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Uint128(u128),
    Uint256(U256),
    Address(Address),
    Bool(bool),
    Bytes(Bytes),
}

impl TypedValue {
    /// Build an integer value of `kind`, rejecting values wider than the kind
    pub fn uint(kind: EncryptedType, value: U256) -> Result<Self, ValidationError> {
        let value = validate::check_uint(kind, value)?;
        let narrowed = match kind {
            EncryptedType::Uint8 => u8::try_from(value).ok().map(TypedValue::Uint8),
            EncryptedType::Uint16 => u16::try_from(value).ok().map(TypedValue::Uint16),
            EncryptedType::Uint32 => u32::try_from(value).ok().map(TypedValue::Uint32),
            EncryptedType::Uint64 => u64::try_from(value).ok().map(TypedValue::Uint64),
            EncryptedType::Uint128 => u128::try_from(value).ok().map(TypedValue::Uint128),
            EncryptedType::Uint256 => Some(TypedValue::Uint256(value)),
            other => {
                return Err(ValidationError::Type(format!("{} is not an integer type", other)))
            }
        };
        narrowed.ok_or_else(|| ValidationError::Range {
            kind,
            value: value.to_string(),
            max: kind
                .uint_bits()
                .map(|bits| validate::max_for_bits(bits).to_string())
                .unwrap_or_default(),
        })
    }

    /// Build an address value from its `0x`-prefixed hex form
    pub fn address(text: &str) -> Result<Self, ValidationError> {
        validate::parse_address(text).map(TypedValue::Address)
    }

    /// Parse a value of `kind` from text, as typed on a command line
    pub fn parse(kind: EncryptedType, text: &str) -> Result<Self, ValidationError> {
        match kind {
            EncryptedType::Address => Self::address(text.trim()),
            EncryptedType::Bool => match text.trim().to_lowercase().as_str() {
                "true" | "1" => Ok(TypedValue::Bool(true)),
                "false" | "0" => Ok(TypedValue::Bool(false)),
                other => Err(ValidationError::Type(format!("Not a boolean: {}", other))),
            },
            EncryptedType::Bytes => {
                validate::parse_bytes(text.trim()).map(|b| TypedValue::Bytes(Bytes::from(b)))
            }
            uint => Self::uint(uint, validate::parse_uint(uint, text)?),
        }
    }

    /// Parse a `kind:value` pair such as `uint32:10` or `ebool:true`
    pub fn parse_pair(pair: &str) -> Result<Self, ValidationError> {
        let (kind, value) = pair.split_once(':').ok_or_else(|| {
            ValidationError::Format(format!("Expected <kind>:<value>, got {}", pair))
        })?;
        Self::parse(kind.parse()?, value)
    }

    /// Convert an untyped JSON value into a value of `kind`
    pub fn from_json(kind: EncryptedType, value: &Value) -> Result<Self, ValidationError> {
        let mismatch = || ValidationError::Type(format!("Expected {} value, got {}", kind, value));

        match kind {
            EncryptedType::Address => match value {
                Value::String(s) => Self::address(s),
                _ => Err(mismatch()),
            },
            EncryptedType::Bool => value.as_bool().map(TypedValue::Bool).ok_or_else(mismatch),
            EncryptedType::Bytes => match value {
                Value::String(s) => validate::parse_bytes(s).map(|b| TypedValue::Bytes(b.into())),
                Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        item.as_u64()
                            .and_then(|b| u8::try_from(b).ok())
                            .ok_or_else(mismatch)
                    })
                    .collect::<Result<Vec<u8>, _>>()
                    .map(|b| TypedValue::Bytes(b.into())),
                _ => Err(mismatch()),
            },
            uint => {
                let parsed = match value {
                    Value::Number(n) => match (n.as_u64(), n.as_f64()) {
                        (Some(v), _) => validate::check_uint(uint, U256::from(v))?,
                        (None, Some(f)) => validate::check_number(uint, f)?,
                        (None, None) => return Err(mismatch()),
                    },
                    Value::String(s) => validate::parse_uint(uint, s)?,
                    _ => return Err(mismatch()),
                };
                Self::uint(uint, parsed)
            }
        }
    }

    pub fn kind(&self) -> EncryptedType {
        match self {
            TypedValue::Uint8(_) => EncryptedType::Uint8,
            TypedValue::Uint16(_) => EncryptedType::Uint16,
            TypedValue::Uint32(_) => EncryptedType::Uint32,
            TypedValue::Uint64(_) => EncryptedType::Uint64,
            TypedValue::Uint128(_) => EncryptedType::Uint128,
            TypedValue::Uint256(_) => EncryptedType::Uint256,
            TypedValue::Address(_) => EncryptedType::Address,
            TypedValue::Bool(_) => EncryptedType::Bool,
            TypedValue::Bytes(_) => EncryptedType::Bytes,
        }
    }

    /// Canonical big-endian plaintext encoding at the kind's width
    pub fn to_be_bytes(&self) -> Vec<u8> {
        match self {
            TypedValue::Uint8(v) => v.to_be_bytes().to_vec(),
            TypedValue::Uint16(v) => v.to_be_bytes().to_vec(),
            TypedValue::Uint32(v) => v.to_be_bytes().to_vec(),
            TypedValue::Uint64(v) => v.to_be_bytes().to_vec(),
            TypedValue::Uint128(v) => v.to_be_bytes().to_vec(),
            TypedValue::Uint256(v) => v.to_be_bytes::<32>().to_vec(),
            TypedValue::Address(a) => a.to_vec(),
            TypedValue::Bool(b) => vec![u8::from(*b)],
            TypedValue::Bytes(b) => b.to_vec(),
        }
    }

    /// Inverse of [`TypedValue::to_be_bytes`]
    pub fn from_be_bytes(kind: EncryptedType, bytes: &[u8]) -> Result<Self, Error> {
        if let Some(len) = kind.byte_len() {
            if bytes.len() != len {
                return Err(Error::InvalidCiphertext(format!(
                    "{} plaintext must be {} bytes, got {}",
                    kind,
                    len,
                    bytes.len()
                )));
            }
        }

        let value = match kind {
            EncryptedType::Bool => match bytes[0] {
                0 => TypedValue::Bool(false),
                1 => TypedValue::Bool(true),
                other => {
                    return Err(Error::InvalidCiphertext(format!("Invalid bool byte: {}", other)))
                }
            },
            EncryptedType::Address => TypedValue::Address(Address::from_slice(bytes)),
            EncryptedType::Bytes => TypedValue::Bytes(Bytes::copy_from_slice(bytes)),
            uint => Self::uint(uint, U256::from_be_slice(bytes))?,
        };
        Ok(value)
    }

    /// The value as a wide integer, as a gateway reports it
    ///
    /// Byte strings longer than 32 bytes have no integer form.
    pub fn to_u256(&self) -> Option<U256> {
        match self {
            TypedValue::Uint8(v) => Some(U256::from(*v)),
            TypedValue::Uint16(v) => Some(U256::from(*v)),
            TypedValue::Uint32(v) => Some(U256::from(*v)),
            TypedValue::Uint64(v) => Some(U256::from(*v)),
            TypedValue::Uint128(v) => Some(U256::from(*v)),
            TypedValue::Uint256(v) => Some(*v),
            TypedValue::Address(a) => Some(U256::from_be_slice(a.as_slice())),
            TypedValue::Bool(b) => Some(U256::from(u8::from(*b))),
            TypedValue::Bytes(b) if b.len() <= 32 => Some(U256::from_be_slice(b)),
            TypedValue::Bytes(_) => None,
        }
    }
}
