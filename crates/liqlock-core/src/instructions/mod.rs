//! Externally invocable operations, one file per group, each an `impl` block
//! on `LiquidityLocker`.

pub mod authority_transfer;
pub mod deposit;
pub mod earn_reward;
pub mod initialize;
pub mod update_config;
pub mod upgrade_logic;

pub use earn_reward::EarnRewardParams;
pub use initialize::InitializeParams;

use solana_program::pubkey::Pubkey;

use crate::constants::MAX_SLIPPAGE_CEILING_BPS;
use crate::error::{LockerError, LockerResult};
use crate::state::LockerConfig;

pub(crate) fn require_nonzero(address: &Pubkey, name: &'static str) -> LockerResult<()> {
    if *address == Pubkey::default() {
        return Err(LockerError::ZeroAddress(name));
    }
    Ok(())
}

pub(crate) fn validate_reward_params(liquidity_divisor: u64, reward_ratio: u64) -> LockerResult<()> {
    if liquidity_divisor == 0 {
        return Err(LockerError::InvalidParameter("liquidity divisor must be positive"));
    }
    if reward_ratio == 0 {
        return Err(LockerError::InvalidParameter("reward ratio must be positive"));
    }
    Ok(())
}

pub(crate) fn validate_slippage_limits(max_slippage_bps: u16, default_slippage_bps: u16) -> LockerResult<()> {
    if max_slippage_bps > MAX_SLIPPAGE_CEILING_BPS {
        return Err(LockerError::InvalidParameter("max slippage above 100%"));
    }
    if default_slippage_bps > max_slippage_bps {
        return Err(LockerError::InvalidParameter("default slippage above max slippage"));
    }
    Ok(())
}

pub(crate) fn validate_rate_limit(min_seconds_between_tx: i64, max_tx_per_block: u32) -> LockerResult<()> {
    if min_seconds_between_tx < 0 {
        return Err(LockerError::InvalidParameter("cooldown must not be negative"));
    }
    if max_tx_per_block == 0 {
        return Err(LockerError::InvalidParameter("per-block cap must be at least 1"));
    }
    Ok(())
}

/// Every invariant a stored config must satisfy
pub fn validate_config(config: &LockerConfig) -> LockerResult<()> {
    require_nonzero(&config.authority, "authority")?;
    require_nonzero(&config.utility_token, "utility token")?;
    require_nonzero(&config.reward_token, "reward token")?;
    require_nonzero(&config.amm_router, "AMM router")?;
    require_nonzero(&config.liquidity_token, "liquidity token")?;
    require_nonzero(&config.vault, "vault")?;
    validate_reward_params(config.liquidity_divisor, config.reward_ratio)?;
    validate_slippage_limits(config.max_slippage_bps, config.default_slippage_bps)?;
    validate_rate_limit(config.min_seconds_between_tx, config.max_tx_per_block)?;
    if config.total_reward_issued > config.total_reward_deposited {
        return Err(LockerError::InvalidParameter("issued rewards exceed deposits"));
    }
    Ok(())
}
