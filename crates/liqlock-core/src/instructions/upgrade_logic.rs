use solana_program::pubkey::Pubkey;
use tracing::info;

use crate::clock::BlockClock;
use crate::engine::LiquidityLocker;
use crate::error::LockerResult;
use crate::events::{LockerEvent, LogicUpgraded};
use crate::interfaces::{AmmRouter, FungibleToken};
use crate::logic::RewardLogic;

impl<R: AmmRouter, T: FungibleToken> LiquidityLocker<R, T> {
    /// Swap the orchestration formulas and hand back the replaced ones.
    /// Config and Rate-Guard entries are not touched.
    pub fn upgrade_logic(
        &mut self,
        caller: &Pubkey,
        logic: Box<dyn RewardLogic>,
        clock: &BlockClock,
    ) -> LockerResult<Box<dyn RewardLogic>> {
        self.state.config.require_authority(caller)?;

        let from_version = self.logic.version();
        let to_version = logic.version();
        let previous = std::mem::replace(&mut self.logic, logic);

        info!(from_version, to_version, "Orchestration logic upgraded");
        self.emit(LockerEvent::LogicUpgraded(LogicUpgraded {
            authority: *caller,
            from_version,
            to_version,
            timestamp: clock.unix_timestamp,
        }));
        Ok(previous)
    }
}
