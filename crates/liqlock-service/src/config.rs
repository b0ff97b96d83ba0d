use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use std::fs;
use std::path::{Path, PathBuf};

use liqlock_core::instructions::validate_config;
use liqlock_core::state::pubkey_serde;
use liqlock_core::InitializeParams;

use crate::error::{ServiceError, ServiceResult};
use crate::named_address;

/// Service configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Engine identity and initial protocol parameters
    pub engine: EngineConfig,

    /// Snapshot persistence
    pub storage: StorageConfig,

    /// Logging
    pub monitoring: MonitoringConfig,

    /// In-process constant-product pool backing the AMM router
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Engine address; holds pulled utility tokens and, by default, the vault
    #[serde(with = "pubkey_serde")]
    pub address: Pubkey,

    /// Initial authority principal
    #[serde(with = "pubkey_serde")]
    pub authority: Pubkey,

    /// Used only when no snapshot exists yet
    pub params: InitializeParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageConfig {
    pub snapshot_path: PathBuf,

    /// Write the snapshot after every committed mutation
    pub persist_on_commit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MonitoringConfig {
    pub log_level: String,

    /// JSON log lines instead of human-readable output
    pub structured_logging: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PoolConfig {
    /// Router address recorded in the engine config
    #[serde(with = "pubkey_serde")]
    pub router: Pubkey,

    pub token_reserve: u64,
    pub native_reserve: u64,
    pub total_liquidity: u64,
}

impl ServiceConfig {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ServiceError::InvalidConfig(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: ServiceConfig = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> ServiceResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ServiceResult<()> {
        if self.engine.address == Pubkey::default() {
            return Err(ServiceError::InvalidConfig("engine address must not be zero".into()));
        }

        let initial = self
            .engine
            .params
            .to_config(self.engine.authority, self.engine.address, self.pool.router);
        validate_config(&initial)
            .map_err(|e| ServiceError::InvalidConfig(format!("engine parameters: {}", e)))?;

        self.pool.validate()?;
        self.monitoring.validate()?;

        if self.storage.snapshot_path.as_os_str().is_empty() {
            return Err(ServiceError::InvalidConfig("storage.snapshot_path is empty".into()));
        }

        Ok(())
    }
}

impl PoolConfig {
    fn validate(&self) -> ServiceResult<()> {
        let seeded = [self.token_reserve, self.native_reserve, self.total_liquidity];
        let empty = seeded.iter().all(|v| *v == 0);
        let funded = seeded.iter().all(|v| *v > 0);
        if !empty && !funded {
            return Err(ServiceError::InvalidConfig(
                "pool reserves and liquidity must be all zero or all positive".into(),
            ));
        }
        Ok(())
    }
}

impl MonitoringConfig {
    fn validate(&self) -> ServiceResult<()> {
        self.log_level
            .parse::<tracing::Level>()
            .map_err(|_| ServiceError::InvalidConfig(format!("unknown log level {}", self.log_level)))?;
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            storage: StorageConfig::default(),
            monitoring: MonitoringConfig::default(),
            pool: PoolConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            address: named_address("engine"),
            authority: named_address("authority"),
            params: InitializeParams {
                utility_token: named_address("utility-token"),
                reward_token: named_address("reward-token"),
                liquidity_token: named_address("liquidity-token"),
                ..InitializeParams::default()
            },
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("liqlock-state.json"),
            persist_on_commit: true,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            structured_logging: false,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            router: named_address("amm-router"),
            token_reserve: 0,
            native_reserve: 0,
            total_liquidity: 0,
        }
    }
}

/// Create example configuration file
pub fn create_example_config(path: impl AsRef<Path>) -> ServiceResult<()> {
    let mut example = ServiceConfig::default();
    // utility * native / 2_000 equals what the seeded pool mints at its price
    example.engine.params.liquidity_divisor = 2_000;
    example.engine.params.reward_ratio = 2;
    example.engine.params.min_native_amount = 100;
    example.engine.params.min_utility_amount = 1_000;
    // 4 utility per native, seeded by the pool operator
    example.pool.token_reserve = 4_000_000;
    example.pool.native_reserve = 1_000_000;
    example.pool.total_liquidity = 2_000_000;

    example.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        ServiceConfig::default().validate().unwrap();
    }

    #[test]
    fn test_example_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liqlock.toml");
        create_example_config(&path).unwrap();

        let loaded = ServiceConfig::load(&path).unwrap();
        assert_eq!(loaded.engine.params.liquidity_divisor, 2_000);
        assert_eq!(loaded.pool.native_reserve, 1_000_000);
        assert_eq!(loaded.engine.params.vault, None);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains(&named_address("engine").to_string()));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = ServiceConfig::default();
        config.engine.authority = Pubkey::default();
        assert!(matches!(config.validate(), Err(ServiceError::InvalidConfig(_))));

        let mut config = ServiceConfig::default();
        config.engine.params.default_slippage_bps = config.engine.params.max_slippage_bps + 1;
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.pool.token_reserve = 10;
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.monitoring.log_level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ServiceConfig::load("/nonexistent/liqlock.toml"),
            Err(ServiceError::InvalidConfig(_))
        ));
    }
}
