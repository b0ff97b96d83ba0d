//! Swappable orchestration formulas.
//!
//! The engine holds its formulas behind `RewardLogic` so the authority can hot
//! swap them while Config and Rate-Guard state stay exactly as they were.

use crate::constants::STANDARD_LOGIC_VERSION;
use crate::error::LockerResult;
use crate::math::{apply_slippage_floor, safe_mul_div_u64, safe_mul_u64};
use crate::state::LockerConfig;

pub trait RewardLogic: Send + Sync + std::fmt::Debug {
    fn version(&self) -> u32;

    /// Liquidity the protocol expects for a deposit, independent of the AMM
    fn expected_liquidity(&self, config: &LockerConfig, utility: u64, native: u64) -> LockerResult<u64> {
        safe_mul_div_u64(utility, native, config.liquidity_divisor)
    }

    /// Smallest AMM output accepted for `expected` at `slippage_bps`
    fn liquidity_floor(&self, expected: u64, slippage_bps: u16) -> LockerResult<u64> {
        apply_slippage_floor(expected, slippage_bps)
    }

    fn reward_for(&self, config: &LockerConfig, liquidity: u64) -> LockerResult<u64> {
        safe_mul_u64(liquidity, config.reward_ratio)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLogic;

impl RewardLogic for StandardLogic {
    fn version(&self) -> u32 {
        STANDARD_LOGIC_VERSION
    }
}
