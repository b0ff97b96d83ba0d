use solana_program::pubkey::Pubkey;
use tracing::info;

use crate::clock::BlockClock;
use crate::engine::LiquidityLocker;
use crate::error::LockerResult;
use crate::events::{AuthorityTransferred, LockerEvent};
use crate::instructions::require_nonzero;
use crate::interfaces::{AmmRouter, FungibleToken};

impl<R: AmmRouter, T: FungibleToken> LiquidityLocker<R, T> {
    /// Hand the authority role to `new_authority`. Takes effect immediately;
    /// the caller loses access to every gated operation.
    pub fn transfer_authority(
        &mut self,
        caller: &Pubkey,
        new_authority: Pubkey,
        clock: &BlockClock,
    ) -> LockerResult<()> {
        self.state.config.require_authority(caller)?;
        require_nonzero(&new_authority, "new authority")?;

        let old_authority = self.state.config.authority;
        self.state.config.authority = new_authority;

        info!(from = %old_authority, to = %new_authority, "Authority transferred");
        self.emit(LockerEvent::AuthorityTransferred(AuthorityTransferred {
            old_authority,
            new_authority,
            timestamp: clock.unix_timestamp,
        }));
        Ok(())
    }
}
