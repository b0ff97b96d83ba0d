use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::state::pubkey_serde;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineInitialized {
    #[serde(with = "pubkey_serde")]
    pub authority: Pubkey,
    #[serde(with = "pubkey_serde")]
    pub vault: Pubkey,
    pub logic_version: u32,
    pub timestamp: i64,
}

/// Operation record emitted by every committed `earn_reward`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEarned {
    #[serde(with = "pubkey_serde")]
    pub user: Pubkey,
    pub liquidity_amount: u64,
    pub reward_amount: u64,
    pub native_amount: u64,
    pub utility_amount: u64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDeposited {
    #[serde(with = "pubkey_serde")]
    pub depositor: Pubkey,
    pub amount: u64,
    pub total_deposited: u64,
    pub timestamp: i64,
}

/// Which group of parameters an authority setter changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSection {
    RewardParams,
    AmmAddresses,
    RateLimit,
    Vault,
    AmountLimits,
    SlippageLimits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdated {
    #[serde(with = "pubkey_serde")]
    pub authority: Pubkey,
    pub section: ConfigSection,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityTransferred {
    #[serde(with = "pubkey_serde")]
    pub old_authority: Pubkey,
    #[serde(with = "pubkey_serde")]
    pub new_authority: Pubkey,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicUpgraded {
    #[serde(with = "pubkey_serde")]
    pub authority: Pubkey,
    pub from_version: u32,
    pub to_version: u32,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LockerEvent {
    EngineInitialized(EngineInitialized),
    RewardEarned(RewardEarned),
    RewardDeposited(RewardDeposited),
    ConfigUpdated(ConfigUpdated),
    AuthorityTransferred(AuthorityTransferred),
    LogicUpgraded(LogicUpgraded),
}
