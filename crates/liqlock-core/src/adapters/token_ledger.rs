use solana_program::pubkey::Pubkey;
use std::collections::HashMap;

use crate::error::TokenError;
use crate::interfaces::FungibleToken;

/// In-memory fungible token with mint, balances and allowances
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenLedger {
    mint: Pubkey,
    total_supply: u64,
    balances: HashMap<Pubkey, u64>,
    allowances: HashMap<(Pubkey, Pubkey), u64>,
}

impl TokenLedger {
    pub fn new(mint: Pubkey) -> Self {
        Self {
            mint,
            ..Self::default()
        }
    }

    pub fn mint(&self) -> Pubkey {
        self.mint
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    pub fn mint_to(&mut self, to: &Pubkey, amount: u64) -> Result<(), TokenError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow)?;
        let balance = self.balance_of(to);
        // supply bounds every balance, so this cannot overflow once supply fits
        self.balances.insert(*to, balance + amount);
        self.total_supply = supply;
        Ok(())
    }

    fn debit(&mut self, owner: &Pubkey, amount: u64) -> Result<(), TokenError> {
        let balance = self.balance_of(owner);
        if balance < amount {
            return Err(TokenError::InsufficientBalance {
                owner: *owner,
                balance,
                required: amount,
            });
        }
        self.balances.insert(*owner, balance - amount);
        Ok(())
    }

    fn credit(&mut self, owner: &Pubkey, amount: u64) {
        let balance = self.balance_of(owner);
        self.balances.insert(*owner, balance + amount);
    }
}

impl FungibleToken for TokenLedger {
    fn balance_of(&self, owner: &Pubkey) -> u64 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u64 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    fn transfer(&mut self, sender: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), TokenError> {
        self.debit(sender, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<(), TokenError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: *from,
                spender: *spender,
                allowance,
                required: amount,
            });
        }
        self.debit(from, amount)?;
        self.credit(to, amount);
        self.allowances.insert((*from, *spender), allowance - amount);
        Ok(())
    }

    fn approve(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u64) -> Result<(), TokenError> {
        self.allowances.insert((*owner, *spender), amount);
        Ok(())
    }
}
