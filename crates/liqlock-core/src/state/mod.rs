pub mod config;
pub mod pubkey_serde;
pub mod rate_guard;

pub use config::*;
pub use rate_guard::*;

use serde::{Deserialize, Serialize};

/// The durable state surface: Config plus every Rate-Guard entry.
///
/// Logic upgrades and restarts must carry this value over unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockerState {
    pub config: LockerConfig,
    pub rate_guard: RateGuard,
}
