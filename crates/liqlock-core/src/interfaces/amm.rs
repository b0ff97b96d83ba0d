use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::error::RouterError;
use crate::interfaces::FungibleToken;

/// Arguments of `add_liquidity_with_native`, plus the native value attached
/// to the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityRequest {
    /// Router the call is addressed to
    pub router: Pubkey,
    pub token: Pubkey,
    /// Address whose allowance the router draws the token from
    pub payer: Pubkey,
    pub token_amount_desired: u64,
    pub token_amount_min: u64,
    pub native_amount_min: u64,
    pub native_value: u64,
    pub recipient: Pubkey,
    pub deadline: i64,
    /// Block time at which the call executes
    pub now: i64,
}

/// What the router reports back after minting a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityReceipt {
    pub token_used: u64,
    pub native_used: u64,
    pub liquidity_minted: u64,
}

/// An automated market maker that mints liquidity for a token/native pair.
///
/// The engine treats implementations as opaque. `remove_liquidity_with_native`
/// is the compensating call: it must return exactly `receipt.token_used` of the
/// token to `recipient` and forget the minted liquidity.
pub trait AmmRouter {
    fn address(&self) -> Pubkey;

    fn add_liquidity_with_native(
        &mut self,
        token: &mut dyn FungibleToken,
        request: &AddLiquidityRequest,
    ) -> Result<AddLiquidityReceipt, RouterError>;

    fn remove_liquidity_with_native(
        &mut self,
        token: &mut dyn FungibleToken,
        receipt: &AddLiquidityReceipt,
        recipient: &Pubkey,
    ) -> Result<(), RouterError>;
}
