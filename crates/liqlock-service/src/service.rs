//! Concurrent front end for one engine instance.
//!
//! Every call, reads included, takes the same async mutex, so operations are
//! totally ordered and nobody sees a half-applied mutation. Committed
//! mutations are written to the snapshot store before the lock is released.

use solana_program::pubkey::Pubkey;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use liqlock_core::adapters::{ConstantProductRouter, TokenLedger};
use liqlock_core::{
    BlockClock, EarnRewardParams, LiquidityLocker, LockerConfig, LockerEvent, LockerResult, PoolSummary,
    RateGuardEntry, RewardDeposited, RewardEarned, RewardLogic, StandardLogic,
};

use crate::config::ServiceConfig;
use crate::error::ServiceResult;
use crate::store::{Snapshot, SnapshotStore};

pub type Engine = LiquidityLocker<ConstantProductRouter, TokenLedger>;

#[derive(Clone)]
pub struct LockerService {
    engine: Arc<Mutex<Engine>>,
    store: Option<SnapshotStore>,
}

impl LockerService {
    pub fn new(engine: Engine, store: Option<SnapshotStore>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            store,
        }
    }

    /// Restore from the snapshot if one exists, otherwise initialize fresh
    pub async fn bootstrap(config: &ServiceConfig, clock: &BlockClock) -> ServiceResult<Self> {
        let store = SnapshotStore::new(&config.storage.snapshot_path);
        let router = ConstantProductRouter::with_reserves(
            config.pool.router,
            config.pool.token_reserve,
            config.pool.native_reserve,
            config.pool.total_liquidity,
        );
        let utility = TokenLedger::new(config.engine.params.utility_token);
        let reward = TokenLedger::new(config.engine.params.reward_token);

        let engine = match store.load().await? {
            Some(snapshot) => {
                let logic: Box<dyn RewardLogic> = Box::new(StandardLogic);
                if snapshot.logic_version != logic.version() {
                    warn!(
                        stored = snapshot.logic_version,
                        running = logic.version(),
                        "Snapshot was taken under different logic; continuing with the running version"
                    );
                }
                info!(path = %store.path().display(), "Restoring engine from snapshot");
                let state = snapshot.into_state();
                let utility = TokenLedger::new(state.config.utility_token);
                let reward = TokenLedger::new(state.config.reward_token);
                LiquidityLocker::restore(config.engine.address, state, logic, router, utility, reward)?
            }
            None => {
                info!("No snapshot found, initializing engine");
                LiquidityLocker::initialize(
                    config.engine.address,
                    config.engine.authority,
                    &config.engine.params,
                    router,
                    utility,
                    reward,
                    clock,
                )?
            }
        };

        let store = config.storage.persist_on_commit.then_some(store);
        let service = Self::new(engine, store);
        {
            let engine = service.engine.lock().await;
            service.persist(&engine).await?;
        }
        Ok(service)
    }

    pub async fn earn_reward(
        &self,
        caller: &Pubkey,
        native_payment: u64,
        params: &EarnRewardParams,
        clock: &BlockClock,
    ) -> ServiceResult<RewardEarned> {
        self.mutate(|engine| engine.earn_reward(caller, native_payment, params, clock))
            .await
    }

    pub async fn deposit(&self, caller: &Pubkey, amount: u64, clock: &BlockClock) -> ServiceResult<RewardDeposited> {
        self.mutate(|engine| engine.deposit(caller, amount, clock)).await
    }

    pub async fn update_reward_params(
        &self,
        caller: &Pubkey,
        liquidity_divisor: u64,
        reward_ratio: u64,
        clock: &BlockClock,
    ) -> ServiceResult<()> {
        self.mutate(|engine| engine.update_reward_params(caller, liquidity_divisor, reward_ratio, clock))
            .await
    }

    pub async fn update_amm_addresses(
        &self,
        caller: &Pubkey,
        amm_router: Pubkey,
        liquidity_token: Pubkey,
        clock: &BlockClock,
    ) -> ServiceResult<()> {
        self.mutate(|engine| engine.update_amm_addresses(caller, amm_router, liquidity_token, clock))
            .await
    }

    pub async fn replace_router(
        &self,
        caller: &Pubkey,
        router: ConstantProductRouter,
        liquidity_token: Pubkey,
        clock: &BlockClock,
    ) -> ServiceResult<ConstantProductRouter> {
        self.mutate(|engine| engine.replace_router(caller, router, liquidity_token, clock))
            .await
    }

    pub async fn update_rate_limit(
        &self,
        caller: &Pubkey,
        enabled: bool,
        min_seconds_between_tx: i64,
        max_tx_per_block: u32,
        clock: &BlockClock,
    ) -> ServiceResult<()> {
        self.mutate(|engine| {
            engine.update_rate_limit(caller, enabled, min_seconds_between_tx, max_tx_per_block, clock)
        })
        .await
    }

    pub async fn update_vault(&self, caller: &Pubkey, vault: Pubkey, clock: &BlockClock) -> ServiceResult<()> {
        self.mutate(|engine| engine.update_vault(caller, vault, clock)).await
    }

    pub async fn update_amount_limits(
        &self,
        caller: &Pubkey,
        min_native_amount: u64,
        min_utility_amount: u64,
        clock: &BlockClock,
    ) -> ServiceResult<()> {
        self.mutate(|engine| {
            engine.update_amount_limits(caller, min_native_amount, min_utility_amount, clock)
        })
        .await
    }

    pub async fn update_slippage_limits(
        &self,
        caller: &Pubkey,
        max_slippage_bps: u16,
        default_slippage_bps: u16,
        clock: &BlockClock,
    ) -> ServiceResult<()> {
        self.mutate(|engine| {
            engine.update_slippage_limits(caller, max_slippage_bps, default_slippage_bps, clock)
        })
        .await
    }

    pub async fn transfer_authority(
        &self,
        caller: &Pubkey,
        new_authority: Pubkey,
        clock: &BlockClock,
    ) -> ServiceResult<()> {
        self.mutate(|engine| engine.transfer_authority(caller, new_authority, clock))
            .await
    }

    pub async fn upgrade_logic(
        &self,
        caller: &Pubkey,
        logic: Box<dyn RewardLogic>,
        clock: &BlockClock,
    ) -> ServiceResult<()> {
        let mut engine = self.engine.lock().await;
        let checkpoint = engine.checkpoint();
        let previous = engine.upgrade_logic(caller, logic, clock)?;
        if let Err(e) = self.persist(&engine).await {
            engine.rollback(checkpoint.with_logic(previous));
            return Err(e);
        }
        Ok(())
    }

    pub async fn summary(&self) -> ServiceResult<PoolSummary> {
        Ok(self.engine.lock().await.pool_summary()?)
    }

    pub async fn config(&self) -> LockerConfig {
        self.engine.lock().await.config().clone()
    }

    pub async fn rate_guard_entry(&self, address: &Pubkey) -> Option<RateGuardEntry> {
        self.engine.lock().await.rate_guard_entry(address).copied()
    }

    pub async fn snapshot(&self) -> Snapshot {
        let engine = self.engine.lock().await;
        Snapshot::new(engine.export_state(), engine.logic_version())
    }

    /// Events emitted from position `from` onward in the journal
    pub async fn events_since(&self, from: usize) -> Vec<LockerEvent> {
        let engine = self.engine.lock().await;
        engine.events().iter().skip(from).cloned().collect()
    }

    /// Run `f` with exclusive access to the engine. Changes made here are
    /// not persisted; use it for token bookkeeping outside the durable state.
    pub async fn with_engine<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&mut Engine) -> O,
    {
        let mut engine = self.engine.lock().await;
        f(&mut engine)
    }

    /// Apply `op` under the lock and persist the result. An operation whose
    /// snapshot cannot be written is rolled back before the error returns.
    async fn mutate<O>(&self, op: impl FnOnce(&mut Engine) -> LockerResult<O>) -> ServiceResult<O> {
        let mut engine = self.engine.lock().await;
        let checkpoint = self.store.as_ref().map(|_| engine.checkpoint());
        let outcome = op(&mut *engine)?;
        if let Err(e) = self.persist(&engine).await {
            if let Some(checkpoint) = checkpoint {
                engine.rollback(checkpoint);
            }
            return Err(e);
        }
        Ok(outcome)
    }

    async fn persist(&self, engine: &Engine) -> ServiceResult<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let snapshot = Snapshot::new(engine.export_state(), engine.logic_version());
        store.save(&snapshot).await.map_err(|e| {
            error!(error = %e, path = %store.path().display(), "Failed to persist snapshot, operation rolled back");
            e
        })
    }
}
