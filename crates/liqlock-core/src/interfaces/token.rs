use solana_program::pubkey::Pubkey;

use crate::error::TokenError;

/// Standard fungible-token surface. Nothing beyond these calls is assumed
/// about the utility or the reward token.
///
/// `transfer` moves from `sender`'s own balance; `transfer_from` moves on
/// behalf of `from` and consumes `spender`'s allowance.
pub trait FungibleToken {
    fn balance_of(&self, owner: &Pubkey) -> u64;

    fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u64;

    fn transfer(&mut self, sender: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), TokenError>;

    fn transfer_from(
        &mut self,
        spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<(), TokenError>;

    fn approve(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u64) -> Result<(), TokenError>;
}
