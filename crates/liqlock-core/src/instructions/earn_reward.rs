//! `earn_reward`: deposit utility token + native coin, lock the resulting AMM
//! liquidity, receive reward tokens from the vault.
//!
//! The operation commits completely or not at all. Everything that can be
//! decided without side effects (input checks, rate guard, vault solvency for
//! the smallest acceptable AMM output) is decided before the first token
//! moves. Failures after the AMM call are compensated by removing the position
//! and returning the pulled utility tokens.

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use tracing::{error, info, warn};

use crate::clock::BlockClock;
use crate::engine::LiquidityLocker;
use crate::error::{LockerError, LockerResult};
use crate::events::{LockerEvent, RewardEarned};
use crate::interfaces::{AddLiquidityReceipt, AmmRouter, FungibleToken};
use crate::logic::vault_accountant::ensure_solvent;
use crate::logic::{plan_liquidity, verify_payment, LiquidityAdapter, LiquidityOrder, VaultAccountant};
use crate::state::RateLimitPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnRewardParams {
    pub utility_amount: u64,
    pub native_amount: u64,
    /// Falls back to the configured default slippage
    #[serde(default)]
    pub slippage_bps: Option<u16>,
}

/// Side effects already applied, undone in reverse on failure
enum Compensation {
    /// Give pulled utility back and reinstate the allowance it consumed
    ReturnUtility { to: Pubkey, amount: u64, allowance: u64 },
    UnwindPosition(AddLiquidityReceipt),
}

impl<R: AmmRouter, T: FungibleToken> LiquidityLocker<R, T> {
    pub fn earn_reward(
        &mut self,
        caller: &Pubkey,
        native_payment: u64,
        params: &EarnRewardParams,
        clock: &BlockClock,
    ) -> LockerResult<RewardEarned> {
        let result = self.try_earn_reward(caller, native_payment, params, clock);
        if let Err(ref e) = result {
            warn!(user = %caller, error = %e, category = ?e.category(), "earn_reward rejected");
        }
        result
    }

    fn try_earn_reward(
        &mut self,
        caller: &Pubkey,
        native_payment: u64,
        params: &EarnRewardParams,
        clock: &BlockClock,
    ) -> LockerResult<RewardEarned> {
        let config = self.state.config.clone();

        if params.native_amount < config.min_native_amount {
            return Err(LockerError::AmountTooLow {
                field: "native amount",
                amount: params.native_amount,
                minimum: config.min_native_amount,
            });
        }
        if params.utility_amount < config.min_utility_amount {
            return Err(LockerError::AmountTooLow {
                field: "utility amount",
                amount: params.utility_amount,
                minimum: config.min_utility_amount,
            });
        }

        let slippage_bps = params.slippage_bps.unwrap_or(config.default_slippage_bps);
        if slippage_bps > config.max_slippage_bps {
            return Err(LockerError::SlippageParameterTooHigh {
                requested: slippage_bps,
                maximum: config.max_slippage_bps,
            });
        }

        let order = LiquidityOrder {
            utility_amount: params.utility_amount,
            native_amount: params.native_amount,
            native_payment,
            slippage_bps,
        };
        verify_payment(&order)?;

        let guard_entry = self.state.rate_guard.check(
            caller,
            RateLimitPolicy::from(&config),
            clock.unix_timestamp,
            clock.slot,
        )?;

        let plan = plan_liquidity(self.logic.as_ref(), &config, &order)?;
        let min_reward = self.logic.reward_for(&config, plan.liquidity_floor)?;
        ensure_solvent(&config, &self.reward, min_reward)?;

        // Side effects start here
        let mut journal = Vec::with_capacity(2);

        let allowance = self.utility.allowance(caller, &self.address);
        self.utility
            .transfer_from(&self.address, caller, &self.address, params.utility_amount)?;
        journal.push(Compensation::ReturnUtility {
            to: *caller,
            amount: params.utility_amount,
            allowance,
        });

        let added = LiquidityAdapter::new(&mut self.router).add_liquidity(
            &mut self.utility,
            &config,
            &plan,
            &self.address,
            clock,
        );
        let receipt = match added {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.compensate(journal, e)),
        };
        journal.push(Compensation::UnwindPosition(receipt));

        let reward_amount = match self.logic.reward_for(&config, receipt.liquidity_minted) {
            Ok(amount) => amount,
            Err(e) => return Err(self.compensate(journal, e)),
        };

        let settled = VaultAccountant::new(&mut self.reward, self.address).settle_reward(
            &mut self.state.config,
            caller,
            receipt.liquidity_minted,
            reward_amount,
        );
        if let Err(e) = settled {
            return Err(self.compensate(journal, e));
        }

        self.state.rate_guard.commit(*caller, guard_entry);

        let record = RewardEarned {
            user: *caller,
            liquidity_amount: receipt.liquidity_minted,
            reward_amount,
            native_amount: params.native_amount,
            utility_amount: params.utility_amount,
            timestamp: clock.unix_timestamp,
        };
        info!(
            user = %caller,
            liquidity = record.liquidity_amount,
            reward = record.reward_amount,
            native = record.native_amount,
            utility = record.utility_amount,
            "Reward earned"
        );
        self.emit(LockerEvent::RewardEarned(record.clone()));
        Ok(record)
    }

    /// Undo applied side effects newest-first and hand back the original error
    fn compensate(&mut self, journal: Vec<Compensation>, cause: LockerError) -> LockerError {
        warn!(error = %cause, steps = journal.len(), "Rolling back earn_reward");
        for step in journal.into_iter().rev() {
            let undone = match step {
                Compensation::UnwindPosition(receipt) => LiquidityAdapter::new(&mut self.router)
                    .unwind(&mut self.utility, &receipt, &self.address),
                Compensation::ReturnUtility { to, amount, allowance } => self
                    .utility
                    .transfer(&self.address, &to, amount)
                    .and_then(|()| self.utility.approve(&to, &self.address, allowance))
                    .map_err(LockerError::from),
            };
            if let Err(e) = undone {
                error!(error = %e, "Compensation step failed; engine balances need reconciliation");
            }
        }
        cause
    }
}
