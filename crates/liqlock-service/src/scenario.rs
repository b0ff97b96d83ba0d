//! Scripted runs against a live service, used by `liqlock simulate`.
//!
//! Actors are named; each name maps to a stable address derived from its
//! hash, so scripts never spell out keys. A rejected step is recorded and the
//! script continues: failures are part of what a scenario checks.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use liqlock_core::{BlockClock, EarnRewardParams, ErrorCategory, FungibleToken, LockerEvent, PoolSummary};

use crate::error::{ServiceError, ServiceResult};
use crate::named_address;
use crate::service::LockerService;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// Block time of the first step
    #[serde(default)]
    pub start: Option<BlockClock>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Utility,
    Reward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Create tokens out of thin air for an actor
    Mint { token: TokenKind, to: String, amount: u64 },
    /// Let the engine pull `amount` from `owner`
    Approve { token: TokenKind, owner: String, amount: u64 },
    Deposit { from: String, amount: u64 },
    Earn {
        user: String,
        utility_amount: u64,
        native_amount: u64,
        /// Defaults to `native_amount`
        #[serde(default)]
        native_payment: Option<u64>,
        #[serde(default)]
        slippage_bps: Option<u16>,
    },
    /// Move the clock forward
    Advance {
        seconds: i64,
        #[serde(default = "one_slot")]
        slots: u64,
    },
    SetRateLimit {
        caller: String,
        enabled: bool,
        min_seconds_between_tx: i64,
        max_tx_per_block: u32,
    },
    SetRewardParams { caller: String, liquidity_divisor: u64, reward_ratio: u64 },
    SetAmountLimits { caller: String, min_native_amount: u64, min_utility_amount: u64 },
    SetSlippageLimits { caller: String, max_slippage_bps: u16, default_slippage_bps: u16 },
    SetVault { caller: String, vault: String },
    TransferAuthority { caller: String, to: String },
}

fn one_slot() -> u64 {
    1
}

impl Step {
    fn action(&self) -> &'static str {
        match self {
            Step::Mint { .. } => "mint",
            Step::Approve { .. } => "approve",
            Step::Deposit { .. } => "deposit",
            Step::Earn { .. } => "earn",
            Step::Advance { .. } => "advance",
            Step::SetRateLimit { .. } => "set_rate_limit",
            Step::SetRewardParams { .. } => "set_reward_params",
            Step::SetAmountLimits { .. } => "set_amount_limits",
            Step::SetSlippageLimits { .. } => "set_slippage_limits",
            Step::SetVault { .. } => "set_vault",
            Step::TransferAuthority { .. } => "transfer_authority",
        }
    }
}

/// What one step did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub index: usize,
    pub action: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set for engine rejections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
    pub events: Vec<LockerEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub outcomes: Vec<StepOutcome>,
    pub summary: PoolSummary,
}

impl ScenarioReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.ok).count()
    }
}

impl Scenario {
    pub fn from_json(text: &str) -> ServiceResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub async fn run(&self, service: &LockerService) -> ServiceResult<ScenarioReport> {
        let mut clock = self.start.unwrap_or_else(|| BlockClock::new(0, 0));
        let mut seen = service.events_since(0).await.len();
        let mut outcomes = Vec::with_capacity(self.steps.len());

        info!(name = %self.name, steps = self.steps.len(), "Running scenario");
        for (index, step) in self.steps.iter().enumerate() {
            let result = apply(service, step, &mut clock).await;
            let events = service.events_since(seen).await;
            seen += events.len();

            let outcome = match result {
                Ok(()) => StepOutcome {
                    index,
                    action: step.action().to_string(),
                    ok: true,
                    error: None,
                    category: None,
                    events,
                },
                Err(e) => StepOutcome {
                    index,
                    action: step.action().to_string(),
                    ok: false,
                    category: e.engine_error().map(|le| le.category()),
                    error: Some(e.to_string()),
                    events,
                },
            };
            debug!(index, action = %outcome.action, ok = outcome.ok, "Scenario step");
            outcomes.push(outcome);
        }

        Ok(ScenarioReport {
            name: self.name.clone(),
            outcomes,
            summary: service.summary().await?,
        })
    }
}

async fn apply(service: &LockerService, step: &Step, clock: &mut BlockClock) -> ServiceResult<()> {
    match step {
        Step::Mint { token, to, amount } => {
            let to = named_address(to);
            service
                .with_engine(|engine| match token {
                    TokenKind::Utility => engine.utility_token_mut().mint_to(&to, *amount),
                    TokenKind::Reward => engine.reward_token_mut().mint_to(&to, *amount),
                })
                .await
                .map_err(|e| ServiceError::Engine(e.into()))
        }
        Step::Approve { token, owner, amount } => {
            let owner = named_address(owner);
            service
                .with_engine(|engine| {
                    let spender = engine.address();
                    match token {
                        TokenKind::Utility => engine.utility_token_mut().approve(&owner, &spender, *amount),
                        TokenKind::Reward => engine.reward_token_mut().approve(&owner, &spender, *amount),
                    }
                })
                .await
                .map_err(|e| ServiceError::Engine(e.into()))
        }
        Step::Deposit { from, amount } => {
            service.deposit(&named_address(from), *amount, clock).await?;
            Ok(())
        }
        Step::Earn {
            user,
            utility_amount,
            native_amount,
            native_payment,
            slippage_bps,
        } => {
            let params = EarnRewardParams {
                utility_amount: *utility_amount,
                native_amount: *native_amount,
                slippage_bps: *slippage_bps,
            };
            let payment = native_payment.unwrap_or(*native_amount);
            service
                .earn_reward(&named_address(user), payment, &params, clock)
                .await?;
            Ok(())
        }
        Step::Advance { seconds, slots } => {
            *clock = BlockClock::new(clock.unix_timestamp + seconds, clock.slot + slots);
            Ok(())
        }
        Step::SetRateLimit {
            caller,
            enabled,
            min_seconds_between_tx,
            max_tx_per_block,
        } => {
            service
                .update_rate_limit(
                    &named_address(caller),
                    *enabled,
                    *min_seconds_between_tx,
                    *max_tx_per_block,
                    clock,
                )
                .await
        }
        Step::SetRewardParams {
            caller,
            liquidity_divisor,
            reward_ratio,
        } => {
            service
                .update_reward_params(&named_address(caller), *liquidity_divisor, *reward_ratio, clock)
                .await
        }
        Step::SetAmountLimits {
            caller,
            min_native_amount,
            min_utility_amount,
        } => {
            service
                .update_amount_limits(&named_address(caller), *min_native_amount, *min_utility_amount, clock)
                .await
        }
        Step::SetSlippageLimits {
            caller,
            max_slippage_bps,
            default_slippage_bps,
        } => {
            service
                .update_slippage_limits(&named_address(caller), *max_slippage_bps, *default_slippage_bps, clock)
                .await
        }
        Step::SetVault { caller, vault } => {
            service
                .update_vault(&named_address(caller), named_address(vault), clock)
                .await
        }
        Step::TransferAuthority { caller, to } => {
            service
                .transfer_authority(&named_address(caller), named_address(to), clock)
                .await
        }
    }
}
