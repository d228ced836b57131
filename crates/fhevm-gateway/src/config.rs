//! Gateway configuration

use std::net::SocketAddr;
use std::time::Duration;

use fhevm_core::constants::LOCAL_CHAIN_ID;
use fhevm_core::transparent;
use fhevm_core::PublicKey;

/// Largest clock difference tolerated for signed timestamps ahead of ours
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind: SocketAddr,
    pub chain_id: u64,
    /// Seed for the development public key
    pub key_seed: String,
    /// How long a user decryption signature stays valid
    pub max_signature_age: Duration,
    pub enable_metrics: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: ([127, 0, 0, 1], 8080).into(),
            chain_id: LOCAL_CHAIN_ID,
            key_seed: "fhevm-dev".to_string(),
            max_signature_age: Duration::from_secs(24 * 60 * 60),
            enable_metrics: false,
        }
    }
}

impl GatewayConfig {
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_key_seed(mut self, seed: impl Into<String>) -> Self {
        self.key_seed = seed.into();
        self
    }

    pub fn with_max_signature_age(mut self, age: Duration) -> Self {
        self.max_signature_age = age;
        self
    }

    pub fn public_key(&self) -> PublicKey {
        transparent::derive_public_key(self.key_seed.as_bytes())
    }
}
