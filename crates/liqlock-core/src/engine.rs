//! The engine instance: one owned state object that every operation takes by
//! `&mut self`. Callers that serve concurrent requests wrap it in a single
//! exclusive lock (see `liqlock-service`).

use solana_program::pubkey::Pubkey;
use tracing::{info, warn};

use crate::error::LockerResult;
use crate::events::LockerEvent;
use crate::interfaces::{AmmRouter, FungibleToken};
use crate::logic::RewardLogic;
use crate::state::{LockerConfig, LockerState, PoolSummary, RateGuardEntry};

pub struct LiquidityLocker<R: AmmRouter, T: FungibleToken> {
    pub(crate) address: Pubkey,
    pub(crate) state: LockerState,
    pub(crate) logic: Box<dyn RewardLogic>,
    pub(crate) router: R,
    pub(crate) utility: T,
    pub(crate) reward: T,
    pub(crate) events: Vec<LockerEvent>,
}

impl<R: AmmRouter, T: FungibleToken> LiquidityLocker<R, T> {
    /// The engine's own address: holds pulled utility tokens, receives the
    /// minted liquidity, and may double as the vault.
    pub fn address(&self) -> Pubkey {
        self.address
    }

    pub fn config(&self) -> &LockerConfig {
        &self.state.config
    }

    pub fn pool_summary(&self) -> LockerResult<PoolSummary> {
        self.state.config.pool_summary()
    }

    pub fn rate_guard_entry(&self, address: &Pubkey) -> Option<&RateGuardEntry> {
        self.state.rate_guard.entry(address)
    }

    /// Copy of the durable state surface
    pub fn export_state(&self) -> LockerState {
        self.state.clone()
    }

    pub fn logic_version(&self) -> u32 {
        self.logic.version()
    }

    pub fn events(&self) -> &[LockerEvent] {
        &self.events
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut R {
        &mut self.router
    }

    pub fn utility_token(&self) -> &T {
        &self.utility
    }

    pub fn utility_token_mut(&mut self) -> &mut T {
        &mut self.utility
    }

    pub fn reward_token(&self) -> &T {
        &self.reward
    }

    pub fn reward_token_mut(&mut self) -> &mut T {
        &mut self.reward
    }

    /// Reward tokens currently held at the vault address
    pub fn vault_balance(&self) -> u64 {
        self.reward.balance_of(&self.state.config.vault)
    }

    pub(crate) fn emit(&mut self, event: LockerEvent) {
        info!(event = ?event, "emit");
        self.events.push(event);
    }
}

/// Everything a committed operation can change, taken before it runs so a
/// caller whose own follow-up step fails can take the commit back.
pub struct Checkpoint<R, T> {
    state: LockerState,
    router: R,
    utility: T,
    reward: T,
    events: usize,
    logic: Option<Box<dyn RewardLogic>>,
}

impl<R, T> Checkpoint<R, T> {
    /// Also put back `logic` on rollback, for checkpoints spanning an upgrade
    pub fn with_logic(mut self, logic: Box<dyn RewardLogic>) -> Self {
        self.logic = Some(logic);
        self
    }
}

impl<R: AmmRouter + Clone, T: FungibleToken + Clone> LiquidityLocker<R, T> {
    pub fn checkpoint(&self) -> Checkpoint<R, T> {
        Checkpoint {
            state: self.state.clone(),
            router: self.router.clone(),
            utility: self.utility.clone(),
            reward: self.reward.clone(),
            events: self.events.len(),
            logic: None,
        }
    }

    /// Return to `checkpoint`, dropping every change and event since
    pub fn rollback(&mut self, checkpoint: Checkpoint<R, T>) {
        let dropped = self.events.len().saturating_sub(checkpoint.events);
        self.state = checkpoint.state;
        self.router = checkpoint.router;
        self.utility = checkpoint.utility;
        self.reward = checkpoint.reward;
        self.events.truncate(checkpoint.events);
        if let Some(logic) = checkpoint.logic {
            self.logic = logic;
        }
        warn!(dropped_events = dropped, "Engine rolled back to checkpoint");
    }
}

#[cfg(test)]
mod tests {
    use crate::interfaces::FungibleToken;
    use crate::testing::TestEnv;

    #[test]
    fn test_rollback_restores_everything() {
        let mut env = TestEnv::new();
        env.fund_vault(1_000_000);
        let user = env.user_with_utility(10_000);

        let checkpoint = env.locker.checkpoint();
        let state = env.locker.export_state();
        let events = env.locker.events().len();

        env.earn(&user, 10_000, 1_000).unwrap();
        assert!(env.locker.rate_guard_entry(&user).is_some());

        env.locker.rollback(checkpoint);
        assert_eq!(env.locker.export_state(), state);
        assert_eq!(env.locker.events().len(), events);
        assert_eq!(env.locker.utility_token().balance_of(&user), 10_000);
        assert_eq!(env.locker.vault_balance(), 1_000_000);
        assert_eq!(env.locker.router().outstanding_liquidity(), 0);

        // same call goes through again, nothing was recorded
        env.earn(&user, 10_000, 1_000).unwrap();
    }
}
