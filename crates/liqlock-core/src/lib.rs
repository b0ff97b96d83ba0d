//! # Liquidity Locker Core
//!
//! Reward engine that turns a utility-token + native-coin deposit into locked
//! AMM liquidity and pays reward tokens from a vault in proportion to the
//! liquidity created. Provides:
//!
//! - The `earn_reward` pipeline: input checks, per-address rate guard, the
//!   external AMM call with a protocol-owned slippage floor, vault settlement
//! - Vault funding and the authority-gated configuration surface
//! - Swappable reward formulas behind `RewardLogic`
//! - Collaborator traits for tokens and AMM routers, with in-process
//!   implementations and a deterministic test router

pub mod adapters;
pub mod clock;
pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod instructions;
pub mod interfaces;
pub mod logic;
pub mod math;
pub mod state;
pub mod testing;

// Re-export commonly used items
pub use clock::BlockClock;
pub use engine::{Checkpoint, LiquidityLocker};
pub use error::{ErrorCategory, LockerError, LockerResult, RateLimitViolation, RouterError, TokenError};
pub use events::*;
pub use instructions::{EarnRewardParams, InitializeParams};
pub use interfaces::{AddLiquidityReceipt, AddLiquidityRequest, AmmRouter, FungibleToken};
pub use logic::{RewardLogic, StandardLogic};
pub use state::{LockerConfig, LockerState, PoolSummary, RateGuard, RateGuardEntry};
