//! Liquidity locker service
//!
//! Serves one engine instance to concurrent callers, persists its durable
//! state and runs scripted simulations.

pub mod config;
pub mod error;
pub mod scenario;
pub mod service;
pub mod store;

pub use config::{create_example_config, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use scenario::{Scenario, ScenarioReport};
pub use service::{Engine, LockerService};
pub use store::{Snapshot, SnapshotStore, SNAPSHOT_SCHEMA_VERSION};

use solana_program::hash::hash;
use solana_program::pubkey::Pubkey;

/// Stable address for a human-readable actor name
pub fn named_address(name: &str) -> Pubkey {
    Pubkey::new_from_array(hash(name.as_bytes()).to_bytes())
}
