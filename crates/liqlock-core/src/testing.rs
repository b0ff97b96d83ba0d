//! Deterministic test doubles and fixtures.
//!
//! `MockRouter` returns a programmed `liquidity_minted` instead of running
//! pool math, which is what slippage and solvency paths need. `TestEnv`
//! wires a fully initialized engine around it.

use solana_program::pubkey::Pubkey;

use crate::adapters::TokenLedger;
use crate::clock::BlockClock;
use crate::engine::LiquidityLocker;
use crate::error::{LockerResult, RouterError};
use crate::events::{RewardDeposited, RewardEarned};
use crate::instructions::{EarnRewardParams, InitializeParams};
use crate::interfaces::{AddLiquidityReceipt, AddLiquidityRequest, AmmRouter, FungibleToken};
use crate::state::LockerConfig;

/// AMM double. Mints `token_amount_desired` liquidity unless programmed
/// otherwise, and always uses the full desired token amount.
#[derive(Debug, Clone, Default)]
pub struct MockRouter {
    address: Pubkey,
    liquidity: Option<u64>,
    failure: Option<String>,
    calls: Vec<AddLiquidityRequest>,
    positions: Vec<AddLiquidityReceipt>,
    unwound: Vec<AddLiquidityReceipt>,
}

impl MockRouter {
    pub fn new(address: Pubkey) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    pub fn with_liquidity(mut self, liquidity: u64) -> Self {
        self.liquidity = Some(liquidity);
        self
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    pub fn set_liquidity(&mut self, liquidity: u64) {
        self.liquidity = Some(liquidity);
    }

    pub fn set_failure(&mut self, reason: Option<&str>) {
        self.failure = reason.map(str::to_string);
    }

    /// Every request received, including failed ones
    pub fn calls(&self) -> &[AddLiquidityRequest] {
        &self.calls
    }

    pub fn unwound(&self) -> &[AddLiquidityReceipt] {
        &self.unwound
    }

    /// Liquidity minted and not unwound
    pub fn outstanding_liquidity(&self) -> u64 {
        self.positions.iter().map(|p| p.liquidity_minted).sum()
    }
}

impl AmmRouter for MockRouter {
    fn address(&self) -> Pubkey {
        self.address
    }

    fn add_liquidity_with_native(
        &mut self,
        token: &mut dyn FungibleToken,
        request: &AddLiquidityRequest,
    ) -> Result<AddLiquidityReceipt, RouterError> {
        self.calls.push(*request);
        if request.router != self.address {
            return Err(RouterError::UnknownRouter {
                expected: self.address,
                requested: request.router,
            });
        }
        if let Some(reason) = &self.failure {
            return Err(RouterError::CallFailed(reason.clone()));
        }

        token.transfer_from(&self.address, &request.payer, &self.address, request.token_amount_desired)?;
        let receipt = AddLiquidityReceipt {
            token_used: request.token_amount_desired,
            native_used: request.native_value,
            liquidity_minted: self.liquidity.unwrap_or(request.token_amount_desired),
        };
        self.positions.push(receipt);
        Ok(receipt)
    }

    fn remove_liquidity_with_native(
        &mut self,
        token: &mut dyn FungibleToken,
        receipt: &AddLiquidityReceipt,
        recipient: &Pubkey,
    ) -> Result<(), RouterError> {
        let index = self
            .positions
            .iter()
            .position(|p| p == receipt)
            .ok_or(RouterError::UnknownPosition)?;
        token.transfer(&self.address, recipient, receipt.token_used)?;
        self.unwound.push(self.positions.remove(index));
        Ok(())
    }
}

/// An initialized engine on a mock router with a self-held vault.
///
/// Parameters: divisor 1_000, ratio 2, minimums 100 native / 1_000 utility,
/// slippage 100 bps default and 500 max, 60 s cooldown, one tx per block.
pub struct TestEnv {
    pub locker: LiquidityLocker<MockRouter, TokenLedger>,
    pub authority: Pubkey,
    pub clock: BlockClock,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn params() -> InitializeParams {
        InitializeParams {
            utility_token: Pubkey::new_unique(),
            reward_token: Pubkey::new_unique(),
            liquidity_token: Pubkey::new_unique(),
            vault: None,
            liquidity_divisor: 1_000,
            reward_ratio: 2,
            min_native_amount: 100,
            min_utility_amount: 1_000,
            max_slippage_bps: 500,
            default_slippage_bps: 100,
            rate_limit_enabled: true,
            min_seconds_between_tx: 60,
            max_tx_per_block: 1,
        }
    }

    /// Standalone config with distinct non-zero addresses and zero totals
    pub fn default_config() -> LockerConfig {
        Self::params().to_config(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique())
    }

    pub fn new() -> Self {
        Self::with_params(&Self::params()).expect("fixture parameters are valid")
    }

    pub fn with_params(params: &InitializeParams) -> LockerResult<Self> {
        let authority = Pubkey::new_unique();
        let clock = BlockClock::new(1_700_000_000, 100);
        let locker = LiquidityLocker::initialize(
            Pubkey::new_unique(),
            authority,
            params,
            MockRouter::new(Pubkey::new_unique()),
            TokenLedger::new(params.utility_token),
            TokenLedger::new(params.reward_token),
            &clock,
        )?;
        Ok(Self {
            locker,
            authority,
            clock,
        })
    }

    /// Mint reward tokens to the authority and deposit them
    pub fn fund_vault(&mut self, amount: u64) -> RewardDeposited {
        let engine = self.locker.address();
        let authority = self.locker.config().authority;
        let reward = self.locker.reward_token_mut();
        reward.mint_to(&authority, amount).expect("mint reward");
        reward.approve(&authority, &engine, amount).expect("approve reward");
        let clock = self.clock;
        self.locker
            .deposit(&authority, amount, &clock)
            .expect("authority deposit")
    }

    /// Fresh address holding `amount` utility tokens, all approved to the engine
    pub fn user_with_utility(&mut self, amount: u64) -> Pubkey {
        let user = Pubkey::new_unique();
        let engine = self.locker.address();
        let utility = self.locker.utility_token_mut();
        utility.mint_to(&user, amount).expect("mint utility");
        utility.approve(&user, &engine, amount).expect("approve utility");
        user
    }

    pub fn user_with_reward(&mut self, amount: u64) -> Pubkey {
        let user = Pubkey::new_unique();
        self.locker
            .reward_token_mut()
            .mint_to(&user, amount)
            .expect("mint reward");
        user
    }

    /// `earn_reward` with matching native payment and default slippage
    pub fn earn(&mut self, user: &Pubkey, utility_amount: u64, native_amount: u64) -> LockerResult<RewardEarned> {
        let params = EarnRewardParams {
            utility_amount,
            native_amount,
            slippage_bps: None,
        };
        let clock = self.clock;
        self.locker.earn_reward(user, native_amount, &params, &clock)
    }

    /// Move to the next slot, `seconds` later
    pub fn advance(&mut self, seconds: i64) {
        self.clock = self.clock.next_slot(seconds);
    }
}
