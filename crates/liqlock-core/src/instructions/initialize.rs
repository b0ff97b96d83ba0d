use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use tracing::info;

use crate::clock::BlockClock;
use crate::constants::*;
use crate::engine::LiquidityLocker;
use crate::error::{LockerError, LockerResult};
use crate::events::{EngineInitialized, LockerEvent};
use crate::instructions::{require_nonzero, validate_config};
use crate::interfaces::{AmmRouter, FungibleToken};
use crate::logic::{RewardLogic, StandardLogic};
use crate::state::{pubkey_serde, LockerConfig, LockerState, RateGuard};

/// Protocol parameters fixed at initialization. The AMM router address is
/// taken from the router backend handed to `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeParams {
    #[serde(with = "pubkey_serde")]
    pub utility_token: Pubkey,
    #[serde(with = "pubkey_serde")]
    pub reward_token: Pubkey,
    #[serde(with = "pubkey_serde")]
    pub liquidity_token: Pubkey,
    /// Defaults to the engine's own address
    #[serde(default, with = "pubkey_serde::option", skip_serializing_if = "Option::is_none")]
    pub vault: Option<Pubkey>,

    pub liquidity_divisor: u64,
    pub reward_ratio: u64,
    pub min_native_amount: u64,
    pub min_utility_amount: u64,
    pub max_slippage_bps: u16,
    pub default_slippage_bps: u16,

    pub rate_limit_enabled: bool,
    pub min_seconds_between_tx: i64,
    pub max_tx_per_block: u32,
}

impl Default for InitializeParams {
    fn default() -> Self {
        Self {
            utility_token: Pubkey::default(),
            reward_token: Pubkey::default(),
            liquidity_token: Pubkey::default(),
            vault: None,
            liquidity_divisor: DEFAULT_LIQUIDITY_DIVISOR,
            reward_ratio: DEFAULT_REWARD_RATIO,
            min_native_amount: 0,
            min_utility_amount: 0,
            max_slippage_bps: DEFAULT_MAX_SLIPPAGE_BPS,
            default_slippage_bps: DEFAULT_SLIPPAGE_BPS,
            rate_limit_enabled: true,
            min_seconds_between_tx: DEFAULT_MIN_SECONDS_BETWEEN_TX,
            max_tx_per_block: DEFAULT_MAX_TX_PER_BLOCK,
        }
    }
}

impl InitializeParams {
    pub fn to_config(&self, authority: Pubkey, engine: Pubkey, amm_router: Pubkey) -> LockerConfig {
        LockerConfig {
            authority,
            utility_token: self.utility_token,
            reward_token: self.reward_token,
            amm_router,
            liquidity_token: self.liquidity_token,
            vault: self.vault.unwrap_or(engine),
            liquidity_divisor: self.liquidity_divisor,
            reward_ratio: self.reward_ratio,
            min_native_amount: self.min_native_amount,
            min_utility_amount: self.min_utility_amount,
            max_slippage_bps: self.max_slippage_bps,
            default_slippage_bps: self.default_slippage_bps,
            rate_limit_enabled: self.rate_limit_enabled,
            min_seconds_between_tx: self.min_seconds_between_tx,
            max_tx_per_block: self.max_tx_per_block,
            total_liquidity_locked: 0,
            total_reward_issued: 0,
            total_reward_deposited: 0,
        }
    }
}

impl<R: AmmRouter, T: FungibleToken> LiquidityLocker<R, T> {
    /// Create the engine with fresh totals and the standard logic
    pub fn initialize(
        address: Pubkey,
        authority: Pubkey,
        params: &InitializeParams,
        router: R,
        utility: T,
        reward: T,
        clock: &BlockClock,
    ) -> LockerResult<Self> {
        require_nonzero(&address, "engine")?;
        let config = params.to_config(authority, address, router.address());
        validate_config(&config)?;

        let mut locker = Self {
            address,
            state: LockerState {
                config,
                rate_guard: RateGuard::new(),
            },
            logic: Box::new(StandardLogic),
            router,
            utility,
            reward,
            events: Vec::new(),
        };

        info!(
            engine = %address,
            authority = %authority,
            vault = %locker.state.config.vault,
            "Liquidity locker initialized"
        );
        let event = EngineInitialized {
            authority,
            vault: locker.state.config.vault,
            logic_version: locker.logic.version(),
            timestamp: clock.unix_timestamp,
        };
        locker.emit(LockerEvent::EngineInitialized(event));
        Ok(locker)
    }

    /// Rebuild an engine around previously exported state
    pub fn restore(
        address: Pubkey,
        state: LockerState,
        logic: Box<dyn RewardLogic>,
        router: R,
        utility: T,
        reward: T,
    ) -> LockerResult<Self> {
        require_nonzero(&address, "engine")?;
        validate_config(&state.config)?;
        if router.address() != state.config.amm_router {
            return Err(LockerError::InvalidParameter(
                "router backend does not match the configured AMM router",
            ));
        }

        info!(
            engine = %address,
            logic_version = logic.version(),
            rate_guard_entries = state.rate_guard.len(),
            "Liquidity locker restored"
        );
        Ok(Self {
            address,
            state,
            logic,
            router,
            utility,
            reward,
            events: Vec::new(),
        })
    }
}
