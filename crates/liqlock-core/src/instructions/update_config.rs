//! Authority-gated setters. Each validates the new values against the rest
//! of the stored config before writing anything.

use solana_program::pubkey::Pubkey;
use tracing::info;

use crate::clock::BlockClock;
use crate::engine::LiquidityLocker;
use crate::error::{LockerError, LockerResult};
use crate::events::{ConfigSection, ConfigUpdated, LockerEvent};
use crate::instructions::{
    require_nonzero, validate_rate_limit, validate_reward_params, validate_slippage_limits,
};
use crate::interfaces::{AmmRouter, FungibleToken};

impl<R: AmmRouter, T: FungibleToken> LiquidityLocker<R, T> {
    pub fn update_reward_params(
        &mut self,
        caller: &Pubkey,
        liquidity_divisor: u64,
        reward_ratio: u64,
        clock: &BlockClock,
    ) -> LockerResult<()> {
        self.state.config.require_authority(caller)?;
        validate_reward_params(liquidity_divisor, reward_ratio)?;

        let config = &mut self.state.config;
        config.liquidity_divisor = liquidity_divisor;
        config.reward_ratio = reward_ratio;
        info!(liquidity_divisor, reward_ratio, "Reward parameters updated");
        self.config_updated(caller, ConfigSection::RewardParams, clock);
        Ok(())
    }

    /// Point the config at a different router and liquidity token. The
    /// bound router backend must already answer to `amm_router`; use
    /// `replace_router` to swap the backend itself.
    pub fn update_amm_addresses(
        &mut self,
        caller: &Pubkey,
        amm_router: Pubkey,
        liquidity_token: Pubkey,
        clock: &BlockClock,
    ) -> LockerResult<()> {
        self.state.config.require_authority(caller)?;
        require_nonzero(&amm_router, "AMM router")?;
        require_nonzero(&liquidity_token, "liquidity token")?;
        if amm_router != self.router.address() {
            return Err(LockerError::InvalidParameter(
                "router backend does not match the configured AMM router",
            ));
        }

        let config = &mut self.state.config;
        config.amm_router = amm_router;
        config.liquidity_token = liquidity_token;
        info!(amm_router = %amm_router, liquidity_token = %liquidity_token, "AMM addresses updated");
        self.config_updated(caller, ConfigSection::AmmAddresses, clock);
        Ok(())
    }

    /// Swap the AMM backend and record its address
    pub fn replace_router(
        &mut self,
        caller: &Pubkey,
        router: R,
        liquidity_token: Pubkey,
        clock: &BlockClock,
    ) -> LockerResult<R> {
        self.state.config.require_authority(caller)?;
        let amm_router = router.address();
        require_nonzero(&amm_router, "AMM router")?;
        require_nonzero(&liquidity_token, "liquidity token")?;

        let previous = std::mem::replace(&mut self.router, router);
        let config = &mut self.state.config;
        config.amm_router = amm_router;
        config.liquidity_token = liquidity_token;
        info!(
            from = %previous.address(),
            to = %amm_router,
            "AMM router backend replaced"
        );
        self.config_updated(caller, ConfigSection::AmmAddresses, clock);
        Ok(previous)
    }

    pub fn update_rate_limit(
        &mut self,
        caller: &Pubkey,
        enabled: bool,
        min_seconds_between_tx: i64,
        max_tx_per_block: u32,
        clock: &BlockClock,
    ) -> LockerResult<()> {
        self.state.config.require_authority(caller)?;
        validate_rate_limit(min_seconds_between_tx, max_tx_per_block)?;

        let config = &mut self.state.config;
        config.rate_limit_enabled = enabled;
        config.min_seconds_between_tx = min_seconds_between_tx;
        config.max_tx_per_block = max_tx_per_block;
        info!(enabled, min_seconds_between_tx, max_tx_per_block, "Rate limit updated");
        self.config_updated(caller, ConfigSection::RateLimit, clock);
        Ok(())
    }

    /// Move payouts to a different vault address. Totals carry over; tokens
    /// already at the old vault are not moved.
    pub fn update_vault(&mut self, caller: &Pubkey, vault: Pubkey, clock: &BlockClock) -> LockerResult<()> {
        self.state.config.require_authority(caller)?;
        require_nonzero(&vault, "vault")?;

        self.state.config.vault = vault;
        info!(vault = %vault, "Vault updated");
        self.config_updated(caller, ConfigSection::Vault, clock);
        Ok(())
    }

    pub fn update_amount_limits(
        &mut self,
        caller: &Pubkey,
        min_native_amount: u64,
        min_utility_amount: u64,
        clock: &BlockClock,
    ) -> LockerResult<()> {
        self.state.config.require_authority(caller)?;

        let config = &mut self.state.config;
        config.min_native_amount = min_native_amount;
        config.min_utility_amount = min_utility_amount;
        info!(min_native_amount, min_utility_amount, "Amount limits updated");
        self.config_updated(caller, ConfigSection::AmountLimits, clock);
        Ok(())
    }

    pub fn update_slippage_limits(
        &mut self,
        caller: &Pubkey,
        max_slippage_bps: u16,
        default_slippage_bps: u16,
        clock: &BlockClock,
    ) -> LockerResult<()> {
        self.state.config.require_authority(caller)?;
        validate_slippage_limits(max_slippage_bps, default_slippage_bps)?;

        let config = &mut self.state.config;
        config.max_slippage_bps = max_slippage_bps;
        config.default_slippage_bps = default_slippage_bps;
        info!(max_slippage_bps, default_slippage_bps, "Slippage limits updated");
        self.config_updated(caller, ConfigSection::SlippageLimits, clock);
        Ok(())
    }

    fn config_updated(&mut self, caller: &Pubkey, section: ConfigSection, clock: &BlockClock) {
        self.emit(LockerEvent::ConfigUpdated(ConfigUpdated {
            authority: *caller,
            section,
            timestamp: clock.unix_timestamp,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockRouter, TestEnv};

    #[test]
    fn test_setters_reject_non_authority() {
        let mut env = TestEnv::new();
        let outsider = Pubkey::new_unique();
        let clock = env.clock;
        let before = env.locker.export_state();
        let denied = LockerError::PermissionDenied { caller: outsider };

        assert_eq!(env.locker.update_reward_params(&outsider, 5, 5, &clock), Err(denied.clone()));
        assert_eq!(
            env.locker.update_amm_addresses(&outsider, Pubkey::new_unique(), Pubkey::new_unique(), &clock),
            Err(denied.clone())
        );
        assert_eq!(env.locker.update_rate_limit(&outsider, false, 0, 5, &clock), Err(denied.clone()));
        assert_eq!(env.locker.update_vault(&outsider, outsider, &clock), Err(denied.clone()));
        assert_eq!(env.locker.update_amount_limits(&outsider, 0, 0, &clock), Err(denied.clone()));
        assert_eq!(env.locker.update_slippage_limits(&outsider, 100, 50, &clock), Err(denied.clone()));
        assert_eq!(
            env.locker
                .replace_router(&outsider, MockRouter::new(Pubkey::new_unique()), Pubkey::new_unique(), &clock)
                .err(),
            Some(denied)
        );

        assert_eq!(env.locker.export_state(), before);
    }

    #[test]
    fn test_authority_updates_apply() {
        let mut env = TestEnv::new();
        let authority = env.authority;
        let clock = env.clock;

        env.locker.update_reward_params(&authority, 10, 7, &clock).unwrap();
        env.locker.update_rate_limit(&authority, false, 0, 4, &clock).unwrap();
        env.locker.update_amount_limits(&authority, 3, 4, &clock).unwrap();
        env.locker.update_slippage_limits(&authority, 1_000, 250, &clock).unwrap();
        let vault = Pubkey::new_unique();
        env.locker.update_vault(&authority, vault, &clock).unwrap();

        let config = env.locker.config();
        assert_eq!((config.liquidity_divisor, config.reward_ratio), (10, 7));
        assert!(!config.rate_limit_enabled);
        assert_eq!(config.max_tx_per_block, 4);
        assert_eq!((config.min_native_amount, config.min_utility_amount), (3, 4));
        assert_eq!((config.max_slippage_bps, config.default_slippage_bps), (1_000, 250));
        assert_eq!(config.vault, vault);

        let sections: Vec<_> = env
            .locker
            .events()
            .iter()
            .filter_map(|e| match e {
                LockerEvent::ConfigUpdated(u) => Some(u.section),
                _ => None,
            })
            .collect();
        assert_eq!(
            sections,
            vec![
                ConfigSection::RewardParams,
                ConfigSection::RateLimit,
                ConfigSection::AmountLimits,
                ConfigSection::SlippageLimits,
                ConfigSection::Vault,
            ]
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut env = TestEnv::new();
        let authority = env.authority;
        let clock = env.clock;
        let before = env.locker.export_state();

        assert!(env.locker.update_reward_params(&authority, 0, 1, &clock).is_err());
        assert!(env.locker.update_reward_params(&authority, 1, 0, &clock).is_err());
        assert!(env.locker.update_rate_limit(&authority, true, -1, 1, &clock).is_err());
        assert!(env.locker.update_rate_limit(&authority, true, 0, 0, &clock).is_err());
        assert!(env.locker.update_slippage_limits(&authority, 10_001, 0, &clock).is_err());
        assert!(env.locker.update_slippage_limits(&authority, 100, 101, &clock).is_err());
        assert_eq!(
            env.locker.update_vault(&authority, Pubkey::default(), &clock),
            Err(LockerError::ZeroAddress("vault"))
        );
        // config router must stay bound to the live backend
        assert!(matches!(
            env.locker
                .update_amm_addresses(&authority, Pubkey::new_unique(), Pubkey::new_unique(), &clock),
            Err(LockerError::InvalidParameter(_))
        ));

        assert_eq!(env.locker.export_state(), before);
    }

    #[test]
    fn test_replace_router_rebinds_config() {
        let mut env = TestEnv::new();
        let authority = env.authority;
        let clock = env.clock;
        let old_address = env.locker.router().address();
        let new_router = MockRouter::new(Pubkey::new_unique());
        let new_address = new_router.address();
        let lp = Pubkey::new_unique();

        let previous = env.locker.replace_router(&authority, new_router, lp, &clock).unwrap();
        assert_eq!(previous.address(), old_address);
        assert_eq!(env.locker.config().amm_router, new_address);
        assert_eq!(env.locker.config().liquidity_token, lp);

        env.locker
            .update_amm_addresses(&authority, new_address, Pubkey::new_unique(), &clock)
            .unwrap();
    }
}
