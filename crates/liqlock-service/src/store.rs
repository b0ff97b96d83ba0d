//! Versioned snapshot of the durable state surface.
//!
//! Only the engine config and the rate-guard entries are persisted. Token
//! balances and the event journal belong to their own systems and are not
//! part of the snapshot.
//!
//! Schema history:
//! - 1: config without `max_tx_per_block`; rate-guard records carry only
//!   `address` and `last_timestamp`
//! - 2: per-block cap in config, `last_slot` and `tx_in_slot` per record

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use liqlock_core::constants::DEFAULT_MAX_TX_PER_BLOCK;
use liqlock_core::{LockerConfig, LockerState, PoolSummary, RateGuard};

use crate::error::{ServiceError, ServiceResult};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: u32,
    /// Logic version that was running when the snapshot was taken
    pub logic_version: u32,
    pub config: LockerConfig,
    pub rate_guard: RateGuard,
}

impl Snapshot {
    pub fn new(state: LockerState, logic_version: u32) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            logic_version,
            config: state.config,
            rate_guard: state.rate_guard,
        }
    }

    /// Totals as recorded in the stored config
    pub fn pool_summary(&self) -> ServiceResult<PoolSummary> {
        Ok(self.config.pool_summary()?)
    }

    pub fn into_state(self) -> LockerState {
        LockerState {
            config: self.config,
            rate_guard: self.rate_guard,
        }
    }

    /// Parse any known schema, migrating older ones forward
    pub fn from_json(bytes: &[u8]) -> ServiceResult<Self> {
        let mut value: Value = serde_json::from_slice(bytes)?;
        let version = value
            .get("schema_version")
            .and_then(Value::as_u64)
            .ok_or_else(|| ServiceError::MalformedSnapshot("missing schema_version".into()))?;

        match version {
            1 => migrate_v1(&mut value)?,
            v if v == SNAPSHOT_SCHEMA_VERSION as u64 => {}
            v => {
                return Err(ServiceError::UnsupportedSchema {
                    found: u32::try_from(v).unwrap_or(u32::MAX),
                    supported: SNAPSHOT_SCHEMA_VERSION,
                })
            }
        }

        Ok(serde_json::from_value(value)?)
    }
}

fn migrate_v1(value: &mut Value) -> ServiceResult<()> {
    let config = value
        .get_mut("config")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| ServiceError::MalformedSnapshot("config is not an object".into()))?;
    config
        .entry("max_tx_per_block")
        .or_insert(json!(DEFAULT_MAX_TX_PER_BLOCK));

    let records = value
        .get_mut("rate_guard")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| ServiceError::MalformedSnapshot("rate_guard is not an array".into()))?;
    for record in records.iter_mut() {
        let record = record
            .as_object_mut()
            .ok_or_else(|| ServiceError::MalformedSnapshot("rate_guard record is not an object".into()))?;
        record.entry("last_slot").or_insert(json!(0));
        record.entry("tx_in_slot").or_insert(json!(0));
    }

    value["schema_version"] = json!(SNAPSHOT_SCHEMA_VERSION);
    info!(from = 1, to = SNAPSHOT_SCHEMA_VERSION, "Migrated snapshot schema");
    Ok(())
}

/// Snapshot file written atomically: temp file in the same directory, then
/// rename over the target.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> ServiceResult<Option<Snapshot>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Snapshot::from_json(&bytes).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, snapshot: &Snapshot) -> ServiceResult<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Snapshot written");
        Ok(())
    }
}
