//! End-to-end `earn_reward` scenarios against the mock and constant-product
//! routers.

use liqlock_core::adapters::{ConstantProductRouter, TokenLedger};
use liqlock_core::testing::TestEnv;
use liqlock_core::*;
use solana_program::pubkey::Pubkey;

/// Everything a failed call must leave untouched
#[derive(Debug, PartialEq)]
struct Observed {
    state: LockerState,
    events: usize,
    user_utility: u64,
    user_reward: u64,
    engine_utility: u64,
    vault: u64,
}

fn observe(env: &TestEnv, user: &Pubkey) -> Observed {
    let engine = env.locker.address();
    Observed {
        state: env.locker.export_state(),
        events: env.locker.events().len(),
        user_utility: env.locker.utility_token().balance_of(user),
        user_reward: env.locker.reward_token().balance_of(user),
        engine_utility: env.locker.utility_token().balance_of(&engine),
        vault: env.locker.vault_balance(),
    }
}

#[test]
fn committed_earn_moves_totals_by_exact_amounts() {
    let mut env = TestEnv::new();
    env.fund_vault(500_000);
    let user = env.user_with_utility(12_000);
    env.locker.router_mut().set_liquidity(11_950);
    let before = env.locker.pool_summary().unwrap();

    let record = env.earn(&user, 12_000, 1_000).unwrap();
    let after = env.locker.pool_summary().unwrap();

    assert_eq!(record.liquidity_amount, 11_950);
    assert_eq!(record.reward_amount, 11_950 * 2);
    assert_eq!(after.total_locked_liquidity - before.total_locked_liquidity, 11_950);
    assert_eq!(after.total_reward_issued - before.total_reward_issued, 23_900);
    assert_eq!(env.locker.vault_balance(), 500_000 - 23_900);
    assert_eq!(
        env.locker.events().last(),
        Some(&LockerEvent::RewardEarned(record.clone()))
    );
    assert_eq!(record.timestamp, env.clock.unix_timestamp);
}

#[test]
fn utility_minimum_boundary() {
    let mut env = TestEnv::new();
    env.fund_vault(1_000_000);
    let min_utility = env.locker.config().min_utility_amount;
    let user = env.user_with_utility(min_utility);

    let err = env.earn(&user, min_utility - 1, 1_000).unwrap_err();
    assert_eq!(
        err,
        LockerError::AmountTooLow {
            field: "utility amount",
            amount: min_utility - 1,
            minimum: min_utility,
        }
    );
    assert_eq!(err.category(), ErrorCategory::InputValidation);

    let record = env.earn(&user, min_utility, 1_000).unwrap();
    assert_eq!(record.utility_amount, min_utility);
}

#[test]
fn native_minimum_boundary() {
    let mut env = TestEnv::new();
    env.fund_vault(1_000_000);
    let min_native = env.locker.config().min_native_amount;
    let user = env.user_with_utility(100_000);

    assert!(matches!(
        env.earn(&user, 100_000, min_native - 1),
        Err(LockerError::AmountTooLow { field: "native amount", .. })
    ));
    env.earn(&user, 100_000, min_native).unwrap();
}

#[test]
fn any_native_payment_delta_fails() {
    let mut env = TestEnv::new();
    env.fund_vault(1_000_000);
    let user = env.user_with_utility(10_000);
    let before = observe(&env, &user);
    let clock = env.clock;
    let params = EarnRewardParams {
        utility_amount: 10_000,
        native_amount: 1_000,
        slippage_bps: Some(0),
    };

    for payment in [0, 1, 999, 1_001, 2_000, u64::MAX] {
        let err = env.locker.earn_reward(&user, payment, &params, &clock).unwrap_err();
        assert_eq!(err, LockerError::AmountMismatch { declared: 1_000, supplied: payment });
    }
    assert_eq!(observe(&env, &user), before);
    assert!(env.locker.router().calls().is_empty());
}

#[test]
fn replay_without_cooldown_changes_nothing() {
    let mut env = TestEnv::new();
    env.fund_vault(1_000_000);
    let user = env.user_with_utility(20_000);

    env.earn(&user, 10_000, 1_000).unwrap();
    let after_first = observe(&env, &user);

    // later in time but still inside the cooldown, and a new slot
    env.advance(30);
    let err = env.earn(&user, 10_000, 1_000).unwrap_err();
    assert!(matches!(
        err,
        LockerError::RateLimited {
            violation: RateLimitViolation::Cooldown { elapsed: 30, required: 60 },
            ..
        }
    ));
    assert_eq!(observe(&env, &user), after_first);
    assert_eq!(env.locker.router().calls().len(), 1);

    env.advance(30);
    env.earn(&user, 10_000, 1_000).unwrap();
}

#[test]
fn per_block_cap_counts_per_address() {
    let mut env = TestEnv::new();
    env.fund_vault(1_000_000);
    let authority = env.authority;
    let clock = env.clock;
    env.locker.update_rate_limit(&authority, true, 1, 2, &clock).unwrap();

    let alice = env.user_with_utility(30_000);
    let bob = env.user_with_utility(10_000);
    env.earn(&alice, 10_000, 1_000).unwrap();
    // cooldown satisfied, still the same slot
    env.clock = env.clock.after(1);
    env.earn(&alice, 10_000, 1_000).unwrap();
    env.earn(&bob, 10_000, 1_000).unwrap();
    env.clock = env.clock.after(1);

    let err = env.earn(&alice, 10_000, 1_000).unwrap_err();
    assert!(matches!(
        err,
        LockerError::RateLimited {
            violation: RateLimitViolation::BlockCapReached { max_per_block: 2, .. },
            ..
        }
    ));

    env.advance(1);
    env.earn(&alice, 10_000, 1_000).unwrap();
    let entry = env.locker.rate_guard_entry(&alice).unwrap();
    assert_eq!(entry.tx_in_slot, 1);
    assert_eq!(entry.last_slot, env.clock.slot);
}

#[test]
fn disabled_rate_limit_allows_back_to_back() {
    let mut env = TestEnv::new();
    env.fund_vault(1_000_000);
    let authority = env.authority;
    let clock = env.clock;
    env.locker.update_rate_limit(&authority, false, 3_600, 1, &clock).unwrap();

    let user = env.user_with_utility(30_000);
    for _ in 0..3 {
        env.earn(&user, 10_000, 1_000).unwrap();
    }
    assert_eq!(env.locker.rate_guard_entry(&user).unwrap().tx_in_slot, 3);
}

#[test]
fn slippage_floor_boundary() {
    // expected = 10_000 * 1_000 / 1_000 = 10_000; 100 bps floor = 9_900
    let mut env = TestEnv::new();
    env.fund_vault(1_000_000);
    let user = env.user_with_utility(10_000);
    env.locker.router_mut().set_liquidity(9_899);
    let before = observe(&env, &user);

    let err = env.earn(&user, 10_000, 1_000).unwrap_err();
    assert_eq!(err, LockerError::SlippageExceeded { minted: 9_899, floor: 9_900 });
    assert_eq!(err.category(), ErrorCategory::ExternalCall);
    assert_eq!(observe(&env, &user), before);
    assert_eq!(env.locker.router().outstanding_liquidity(), 0);

    env.locker.router_mut().set_liquidity(9_900);
    let record = env.earn(&user, 10_000, 1_000).unwrap();
    assert_eq!(record.liquidity_amount, 9_900);
    assert_eq!(env.locker.router().outstanding_liquidity(), 9_900);
}

#[test]
fn explicit_slippage_above_ceiling_rejected() {
    let mut env = TestEnv::new();
    env.fund_vault(1_000_000);
    let user = env.user_with_utility(10_000);
    let clock = env.clock;
    let max = env.locker.config().max_slippage_bps;

    let params = EarnRewardParams {
        utility_amount: 10_000,
        native_amount: 1_000,
        slippage_bps: Some(max + 1),
    };
    assert_eq!(
        env.locker.earn_reward(&user, 1_000, &params, &clock),
        Err(LockerError::SlippageParameterTooHigh { requested: max + 1, maximum: max })
    );

    // at the ceiling the floor widens accordingly
    env.locker.router_mut().set_liquidity(9_500);
    let params = EarnRewardParams { slippage_bps: Some(max), ..params };
    env.locker.earn_reward(&user, 1_000, &params, &clock).unwrap();
}

#[test]
fn empty_vault_fails_before_any_external_call() {
    let mut env = TestEnv::new();
    let user = env.user_with_utility(10_000);
    let before = observe(&env, &user);

    let err = env.earn(&user, 10_000, 1_000).unwrap_err();
    assert!(matches!(err, LockerError::InsufficientVault { available: 0, .. }));
    assert_eq!(err.category(), ErrorCategory::Solvency);
    assert!(env.locker.router().calls().is_empty());
    assert_eq!(observe(&env, &user), before);
}

#[test]
fn router_failure_returns_utility() {
    let mut env = TestEnv::new();
    env.fund_vault(1_000_000);
    let user = env.user_with_utility(10_000);
    env.locker.router_mut().set_failure(Some("pool paused"));
    let before = observe(&env, &user);

    let err = env.earn(&user, 10_000, 1_000).unwrap_err();
    assert_eq!(
        err,
        LockerError::ExternalCall(RouterError::CallFailed("pool paused".into()))
    );
    assert_eq!(observe(&env, &user), before);

    // the failed attempt did not start a cooldown
    env.locker.router_mut().set_failure(None);
    env.earn(&user, 10_000, 1_000).unwrap();
}

#[test]
fn external_vault_pays_through_allowance() {
    let mut env = TestEnv::new();
    let authority = env.authority;
    let clock = env.clock;
    let engine = env.locker.address();
    let vault = Pubkey::new_unique();
    env.locker.update_vault(&authority, vault, &clock).unwrap();
    env.fund_vault(100_000);
    env.locker.reward_token_mut().approve(&vault, &engine, u64::MAX).unwrap();

    let user = env.user_with_utility(10_000);
    let record = env.earn(&user, 10_000, 1_000).unwrap();
    assert_eq!(env.locker.reward_token().balance_of(&vault), 100_000 - record.reward_amount);
    assert_eq!(env.locker.reward_token().balance_of(&engine), 0);
}

fn constant_product_locker(
    router: ConstantProductRouter,
    liquidity_divisor: u64,
) -> (LiquidityLocker<ConstantProductRouter, TokenLedger>, Pubkey, BlockClock) {
    let params = InitializeParams {
        liquidity_divisor,
        reward_ratio: 1,
        ..TestEnv::params()
    };
    let authority = Pubkey::new_unique();
    let clock = BlockClock::new(1_700_000_000, 10);
    let mut locker = LiquidityLocker::initialize(
        Pubkey::new_unique(),
        authority,
        &params,
        router,
        TokenLedger::new(params.utility_token),
        TokenLedger::new(params.reward_token),
        &clock,
    )
    .unwrap();

    let engine = locker.address();
    locker.reward_token_mut().mint_to(&authority, 1_000_000).unwrap();
    locker.reward_token_mut().approve(&authority, &engine, 1_000_000).unwrap();
    locker.deposit(&authority, 1_000_000, &clock).unwrap();
    (locker, authority, clock)
}

fn funded_user(locker: &mut LiquidityLocker<ConstantProductRouter, TokenLedger>, amount: u64) -> Pubkey {
    let user = Pubkey::new_unique();
    let engine = locker.address();
    locker.utility_token_mut().mint_to(&user, amount).unwrap();
    locker.utility_token_mut().approve(&user, &engine, amount).unwrap();
    user
}

#[test]
fn constant_product_pool_first_deposit() {
    // isqrt(10_000 * 1_000) = 3_162 and the protocol expects 10_000_000 / 3_162 = 3_162
    let router = ConstantProductRouter::new(Pubkey::new_unique());
    let (mut locker, _, clock) = constant_product_locker(router, 3_162);
    let user = funded_user(&mut locker, 10_000);

    let params = EarnRewardParams {
        utility_amount: 10_000,
        native_amount: 1_000,
        slippage_bps: Some(0),
    };
    let record = locker.earn_reward(&user, 1_000, &params, &clock).unwrap();
    assert_eq!(record.liquidity_amount, 3_162);
    assert_eq!(record.reward_amount, 3_162);
    assert_eq!(locker.router().reserves(), (10_000, 1_000));
    assert_eq!(locker.router().total_liquidity(), 3_162);
}

#[test]
fn constant_product_ratio_mismatch_rolls_back() {
    // pool price is 4 token per native: 1_000 native only takes 4_000 token,
    // far below the 9_900 token minimum
    let router = ConstantProductRouter::with_reserves(Pubkey::new_unique(), 40_000, 10_000, 20_000);
    let (mut locker, _, clock) = constant_product_locker(router, 1_000);
    let user = funded_user(&mut locker, 10_000);
    let before = locker.export_state();

    let err = locker.earn_reward(&user, 1_000, &EarnRewardParams {
        utility_amount: 10_000,
        native_amount: 1_000,
        slippage_bps: None,
    }, &clock).unwrap_err();
    assert!(matches!(err, LockerError::ExternalCall(RouterError::BoundViolated(_))));
    assert_eq!(locker.export_state(), before);
    assert_eq!(locker.utility_token().balance_of(&user), 10_000);
    assert_eq!(locker.router().reserves(), (40_000, 10_000));
}

#[test]
fn constant_product_pool_at_price() {
    let router = ConstantProductRouter::with_reserves(Pubkey::new_unique(), 40_000, 10_000, 20_000);
    let (mut locker, _, clock) = constant_product_locker(router, 2_000);
    let user = funded_user(&mut locker, 4_000);

    let record = locker
        .earn_reward(&user, 1_000, &EarnRewardParams {
            utility_amount: 4_000,
            native_amount: 1_000,
            slippage_bps: None,
        }, &clock)
        .unwrap();
    assert_eq!(record.liquidity_amount, 2_000);
    assert_eq!(locker.router().reserves(), (44_000, 11_000));
    assert_eq!(locker.utility_token().balance_of(&user), 0);
    assert_eq!(locker.config().total_liquidity_locked, 2_000);
}
