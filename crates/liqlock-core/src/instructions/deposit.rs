use solana_program::pubkey::Pubkey;
use tracing::{info, warn};

use crate::clock::BlockClock;
use crate::engine::LiquidityLocker;
use crate::error::LockerResult;
use crate::events::{LockerEvent, RewardDeposited};
use crate::interfaces::{AmmRouter, FungibleToken};
use crate::logic::VaultAccountant;

impl<R: AmmRouter, T: FungibleToken> LiquidityLocker<R, T> {
    /// Fund the vault. Authority only; the authority must have approved the
    /// engine for `amount` reward tokens.
    pub fn deposit(
        &mut self,
        caller: &Pubkey,
        amount: u64,
        clock: &BlockClock,
    ) -> LockerResult<RewardDeposited> {
        self.state.config.require_authority(caller)?;

        let total_deposited =
            match VaultAccountant::new(&mut self.reward, self.address).deposit(&mut self.state.config, caller, amount) {
                Ok(total) => total,
                Err(e) => {
                    warn!(depositor = %caller, amount, error = %e, "Deposit rejected");
                    return Err(e);
                }
            };

        info!(depositor = %caller, amount, total_deposited, "Reward deposited");
        let record = RewardDeposited {
            depositor: *caller,
            amount,
            total_deposited,
            timestamp: clock.unix_timestamp,
        };
        self.emit(LockerEvent::RewardDeposited(record.clone()));
        Ok(record)
    }
}
