//! Session configuration

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GATEWAY_URL, LOCAL_CHAIN_ID, SEPOLIA_CHAIN_ID};
use crate::{Error, PublicKey};

/// Network the session talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Chain ID (1=mainnet, 11155111=sepolia)
    pub chain_id: u64,
    /// Human-readable network name
    pub name: String,
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Network FHE public key; fetched during init when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKey>,
}

impl NetworkConfig {
    pub fn new(chain_id: u64, name: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
            rpc_url: rpc_url.into(),
            public_key: None,
        }
    }

    /// Sepolia testnet
    pub fn sepolia(rpc_url: impl Into<String>) -> Self {
        Self::new(SEPOLIA_CHAIN_ID, "Sepolia Testnet", rpc_url)
    }

    /// Local development node (hardhat/anvil)
    pub fn local(rpc_url: impl Into<String>) -> Self {
        Self::new(LOCAL_CHAIN_ID, "Local", rpc_url)
    }

    /// Use a known public key instead of fetching one during init
    pub fn with_public_key(mut self, key: PublicKey) -> Self {
        self.public_key = Some(key);
        self
    }
}

/// Immutable configuration for one client session
///
/// JSON layout mirrors the JavaScript SDK:
/// ```json
/// {
///   "network": { "chainId": 11155111, "name": "Sepolia", "rpcUrl": "https://..." },
///   "aclAddress": "0x...",
///   "gatewayAddress": "https://gateway.example"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FhevmConfig {
    pub network: NetworkConfig,
    /// ACL contract address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl_address: Option<Address>,
    /// KMS verifier contract address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_verifier_address: Option<Address>,
    /// Decryption gateway endpoint; [`DEFAULT_GATEWAY_URL`] when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_address: Option<String>,
}

impl FhevmConfig {
    pub fn new(network: NetworkConfig) -> Self {
        Self {
            network,
            acl_address: None,
            kms_verifier_address: None,
            gateway_address: None,
        }
    }

    pub fn with_acl_address(mut self, address: Address) -> Self {
        self.acl_address = Some(address);
        self
    }

    pub fn with_kms_verifier_address(mut self, address: Address) -> Self {
        self.kms_verifier_address = Some(address);
        self
    }

    pub fn with_gateway(mut self, url: impl Into<String>) -> Self {
        self.gateway_address = Some(url.into());
        self
    }

    pub fn chain_id(&self) -> u64 {
        self.network.chain_id
    }

    /// Gateway endpoint with trailing slashes removed
    pub fn gateway_url(&self) -> String {
        self.gateway_address
            .as_deref()
            .unwrap_or(DEFAULT_GATEWAY_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Load configuration from a JSON file
    ///
    /// Address fields go through the same hex check as encrypted address
    /// values, so a malformed address fails here rather than at first use.
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> crate::Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(content)?;
        for field in ["aclAddress", "kmsVerifierAddress"] {
            if let Some(value) = raw.get(field).and_then(|v| v.as_str()) {
                crate::validate::parse_address(value)?;
            }
        }

        let config: Self = serde_json::from_value(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    fn validate(&self) -> crate::Result<()> {
        if self.network.chain_id == 0 {
            return Err(Error::InvalidConfig("chainId must be non-zero".into()));
        }
        if let Some(gateway) = &self.gateway_address {
            if !(gateway.starts_with("http://") || gateway.starts_with("https://")) {
                return Err(Error::InvalidConfig(format!(
                    "gatewayAddress must be an http(s) URL: {}",
                    gateway
                )));
            }
        }
        Ok(())
    }
}
