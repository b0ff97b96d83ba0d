//! Wraps the external AMM call.
//!
//! Bounds forwarded to the router come from the requested slippage. After the
//! call returns, the minted liquidity is checked again against the protocol's
//! own expected-output formula; a position below that floor is unwound before
//! the error is returned, so a failed adapter call never leaves a position
//! behind.

use solana_program::pubkey::Pubkey;
use tracing::{debug, error, warn};

use crate::clock::BlockClock;
use crate::constants::ROUTER_DEADLINE_SECS;
use crate::error::{LockerError, LockerResult};
use crate::interfaces::{AddLiquidityReceipt, AddLiquidityRequest, AmmRouter, FungibleToken};
use crate::logic::RewardLogic;
use crate::math::apply_slippage_floor;
use crate::state::LockerConfig;

/// What the caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityOrder {
    pub utility_amount: u64,
    pub native_amount: u64,
    /// Native value actually attached to the call
    pub native_payment: u64,
    pub slippage_bps: u16,
}

/// Bounds and protocol expectations computed before the router is called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityPlan {
    pub utility_amount: u64,
    pub native_amount: u64,
    pub slippage_bps: u16,
    pub token_amount_min: u64,
    pub native_amount_min: u64,
    pub expected_liquidity: u64,
    pub liquidity_floor: u64,
}

/// The attached native value must equal the declared amount exactly
pub fn verify_payment(order: &LiquidityOrder) -> LockerResult<()> {
    if order.native_payment != order.native_amount {
        return Err(LockerError::AmountMismatch {
            declared: order.native_amount,
            supplied: order.native_payment,
        });
    }
    Ok(())
}

pub fn plan_liquidity(
    logic: &dyn RewardLogic,
    config: &LockerConfig,
    order: &LiquidityOrder,
) -> LockerResult<LiquidityPlan> {
    verify_payment(order)?;

    let expected_liquidity =
        logic.expected_liquidity(config, order.utility_amount, order.native_amount)?;
    let liquidity_floor = logic.liquidity_floor(expected_liquidity, order.slippage_bps)?;

    Ok(LiquidityPlan {
        utility_amount: order.utility_amount,
        native_amount: order.native_amount,
        slippage_bps: order.slippage_bps,
        token_amount_min: apply_slippage_floor(order.utility_amount, order.slippage_bps)?,
        native_amount_min: apply_slippage_floor(order.native_amount, order.slippage_bps)?,
        expected_liquidity,
        liquidity_floor,
    })
}

pub struct LiquidityAdapter<'a, R: AmmRouter> {
    router: &'a mut R,
}

impl<'a, R: AmmRouter> LiquidityAdapter<'a, R> {
    pub fn new(router: &'a mut R) -> Self {
        Self { router }
    }

    /// Forward the call and verify its output.
    ///
    /// `engine` holds the utility tokens; the router draws them through a
    /// temporary allowance which is restored before this returns.
    pub fn add_liquidity(
        &mut self,
        token: &mut dyn FungibleToken,
        config: &LockerConfig,
        plan: &LiquidityPlan,
        engine: &Pubkey,
        clock: &BlockClock,
    ) -> LockerResult<AddLiquidityReceipt> {
        let router_address = self.router.address();
        let prior_allowance = token.allowance(engine, &router_address);
        token.approve(engine, &router_address, plan.utility_amount)?;

        let request = AddLiquidityRequest {
            router: config.amm_router,
            token: config.utility_token,
            payer: *engine,
            token_amount_desired: plan.utility_amount,
            token_amount_min: plan.token_amount_min,
            native_amount_min: plan.native_amount_min,
            native_value: plan.native_amount,
            recipient: *engine,
            deadline: clock.unix_timestamp.saturating_add(ROUTER_DEADLINE_SECS),
            now: clock.unix_timestamp,
        };
        let outcome = self.router.add_liquidity_with_native(token, &request);
        let restored = token.approve(engine, &router_address, prior_allowance);

        let receipt = match outcome {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(router = %router_address, error = %e, "AMM router call failed");
                restored?;
                return Err(e.into());
            }
        };

        // The position exists now; any failure from here on removes it first
        if let Err(e) = restored {
            warn!(error = %e, "Failed to restore router allowance, unwinding position");
            self.unwind(token, &receipt, engine)?;
            return Err(e.into());
        }

        debug!(
            minted = receipt.liquidity_minted,
            expected = plan.expected_liquidity,
            floor = plan.liquidity_floor,
            "AMM router returned"
        );

        if receipt.liquidity_minted < plan.liquidity_floor {
            warn!(
                minted = receipt.liquidity_minted,
                floor = plan.liquidity_floor,
                "AMM output below protocol slippage floor, unwinding position"
            );
            self.unwind(token, &receipt, engine)?;
            return Err(LockerError::SlippageExceeded {
                minted: receipt.liquidity_minted,
                floor: plan.liquidity_floor,
            });
        }

        Ok(receipt)
    }

    /// Compensating call: remove a position this adapter created
    pub fn unwind(
        &mut self,
        token: &mut dyn FungibleToken,
        receipt: &AddLiquidityReceipt,
        engine: &Pubkey,
    ) -> LockerResult<()> {
        self.router
            .remove_liquidity_with_native(token, receipt, engine)
            .map_err(|e| {
                error!(error = %e, "Failed to unwind AMM position");
                LockerError::from(e)
            })
    }
}
