//! Pipeline components composed by the orchestrator in `instructions`

pub mod liquidity_adapter;
pub mod reward_logic;
pub mod vault_accountant;

pub use liquidity_adapter::{plan_liquidity, verify_payment, LiquidityAdapter, LiquidityOrder, LiquidityPlan};
pub use reward_logic::{RewardLogic, StandardLogic};
pub use vault_accountant::VaultAccountant;
