//! fhevm-gateway: Reference decryption gateway
//!
//! Serves the network public key, registers encrypted inputs produced by the
//! development engine, and releases plaintexts:
//! - user decryption: EIP-712 signature by a user on the handle's ACL
//! - public decryption: only for handles marked public
//!
//! The ACL endpoints are unauthenticated; they stand in for the contract
//! calls that grant access on a real network. Development use only.

pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod state;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use routes::create_router;
pub use server::{GatewayBuilder, GatewayServer};
pub use state::{create_shared_state, GatewayState, SharedState, StoredValue};
