//! Vault accounting: solvency before payout, totals updated together with the
//! token movement.

use solana_program::pubkey::Pubkey;
use tracing::debug;

use crate::error::{LockerError, LockerResult};
use crate::interfaces::FungibleToken;
use crate::state::LockerConfig;

pub struct VaultAccountant<'a, T: FungibleToken> {
    reward: &'a mut T,
    engine: Pubkey,
}

/// Reward the vault can pay right now: the smaller of its token balance and
/// the deposited-but-unissued total.
pub fn payable_reward(config: &LockerConfig, reward: &dyn FungibleToken) -> LockerResult<u64> {
    let balance = reward.balance_of(&config.vault);
    Ok(balance.min(config.available_reward()?))
}

/// Solvency check that touches nothing
pub fn ensure_solvent(
    config: &LockerConfig,
    reward: &dyn FungibleToken,
    amount: u64,
) -> LockerResult<()> {
    let available = payable_reward(config, reward)?;
    if available < amount {
        return Err(LockerError::InsufficientVault {
            required: amount,
            available,
        });
    }
    Ok(())
}

impl<'a, T: FungibleToken> VaultAccountant<'a, T> {
    pub fn new(reward: &'a mut T, engine: Pubkey) -> Self {
        Self { reward, engine }
    }

    /// Pay `reward_amount` to `recipient` and book `liquidity_amount` as locked.
    ///
    /// Totals change only if the transfer succeeds.
    pub fn settle_reward(
        &mut self,
        config: &mut LockerConfig,
        recipient: &Pubkey,
        liquidity_amount: u64,
        reward_amount: u64,
    ) -> LockerResult<u64> {
        ensure_solvent(config, &*self.reward, reward_amount)?;

        let mut next = config.clone();
        next.record_settlement(liquidity_amount, reward_amount)?;

        if config.vault == self.engine {
            self.reward.transfer(&self.engine, recipient, reward_amount)?;
        } else {
            self.reward
                .transfer_from(&self.engine, &config.vault, recipient, reward_amount)?;
        }

        *config = next;
        debug!(
            liquidity_amount,
            reward_amount,
            total_issued = config.total_reward_issued,
            "Vault settled reward"
        );
        Ok(reward_amount)
    }

    /// Move `amount` reward tokens from `depositor` into the vault; returns the
    /// new deposited total. The depositor must have approved the engine.
    pub fn deposit(
        &mut self,
        config: &mut LockerConfig,
        depositor: &Pubkey,
        amount: u64,
    ) -> LockerResult<u64> {
        if amount == 0 {
            return Err(LockerError::InvalidParameter("deposit amount must be positive"));
        }

        let mut next = config.clone();
        let total = next.record_deposit(amount)?;

        self.reward
            .transfer_from(&self.engine, depositor, &config.vault, amount)?;

        *config = next;
        Ok(total)
    }
}
