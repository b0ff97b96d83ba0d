use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::error::{LockerError, LockerResult};
use crate::math::{safe_add_u64, safe_sub_u64};

/// Singleton protocol configuration and running totals.
///
/// Mutated only through the authority-gated setters and the two accounting
/// paths (`earn_reward` settlement, `deposit`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockerConfig {
    #[serde(with = "super::pubkey_serde")]
    pub authority: Pubkey,
    #[serde(with = "super::pubkey_serde")]
    pub utility_token: Pubkey,
    #[serde(with = "super::pubkey_serde")]
    pub reward_token: Pubkey,
    #[serde(with = "super::pubkey_serde")]
    pub amm_router: Pubkey,
    #[serde(with = "super::pubkey_serde")]
    pub liquidity_token: Pubkey,
    /// May equal the engine's own address
    #[serde(with = "super::pubkey_serde")]
    pub vault: Pubkey,

    pub liquidity_divisor: u64,
    pub reward_ratio: u64,

    pub min_native_amount: u64,
    pub min_utility_amount: u64,
    pub max_slippage_bps: u16,
    pub default_slippage_bps: u16,

    pub rate_limit_enabled: bool,
    pub min_seconds_between_tx: i64,
    pub max_tx_per_block: u32,

    pub total_liquidity_locked: u64,
    pub total_reward_issued: u64,
    pub total_reward_deposited: u64,
}

impl LockerConfig {
    /// Reward tokens deposited but not yet issued
    pub fn available_reward(&self) -> LockerResult<u64> {
        safe_sub_u64(self.total_reward_deposited, self.total_reward_issued)
    }

    pub fn pool_summary(&self) -> LockerResult<PoolSummary> {
        Ok(PoolSummary {
            total_locked_liquidity: self.total_liquidity_locked,
            total_reward_issued: self.total_reward_issued,
            total_reward_deposited: self.total_reward_deposited,
            available_reward: self.available_reward()?,
        })
    }

    pub fn require_authority(&self, caller: &Pubkey) -> LockerResult<()> {
        if *caller != self.authority {
            return Err(LockerError::PermissionDenied { caller: *caller });
        }
        Ok(())
    }

    /// Apply a committed settlement to the running totals
    pub(crate) fn record_settlement(&mut self, liquidity: u64, reward: u64) -> LockerResult<()> {
        let locked = safe_add_u64(self.total_liquidity_locked, liquidity)?;
        let issued = safe_add_u64(self.total_reward_issued, reward)?;
        if issued > self.total_reward_deposited {
            return Err(LockerError::InsufficientVault {
                required: reward,
                available: self.available_reward()?,
            });
        }
        self.total_liquidity_locked = locked;
        self.total_reward_issued = issued;
        Ok(())
    }

    pub(crate) fn record_deposit(&mut self, amount: u64) -> LockerResult<u64> {
        self.total_reward_deposited = safe_add_u64(self.total_reward_deposited, amount)?;
        Ok(self.total_reward_deposited)
    }
}

/// Read-only view of the vault accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub total_locked_liquidity: u64,
    pub total_reward_issued: u64,
    pub total_reward_deposited: u64,
    pub available_reward: u64,
}
