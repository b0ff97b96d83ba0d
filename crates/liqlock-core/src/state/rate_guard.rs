//! Per-address anti-abuse state.
//!
//! Entries are created lazily on an address's first committed operation and
//! never deleted. The in-slot counter resets whenever the slot advances.

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use std::collections::BTreeMap;

use crate::error::{LockerError, LockerResult, RateLimitViolation};
use crate::state::LockerConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateGuardEntry {
    pub last_timestamp: i64,
    pub last_slot: u64,
    pub tx_in_slot: u32,
}

/// Rate-limit parameters, read from the config at check time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub enabled: bool,
    pub min_seconds_between_tx: i64,
    pub max_tx_per_block: u32,
}

impl From<&LockerConfig> for RateLimitPolicy {
    fn from(config: &LockerConfig) -> Self {
        Self {
            enabled: config.rate_limit_enabled,
            min_seconds_between_tx: config.min_seconds_between_tx,
            max_tx_per_block: config.max_tx_per_block,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<RateGuardRecord>", from = "Vec<RateGuardRecord>")]
pub struct RateGuard {
    entries: BTreeMap<Pubkey, RateGuardEntry>,
}

/// Flat form of one entry, used for persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateGuardRecord {
    #[serde(with = "super::pubkey_serde")]
    pub address: Pubkey,
    #[serde(flatten)]
    pub entry: RateGuardEntry,
}

impl From<RateGuard> for Vec<RateGuardRecord> {
    fn from(guard: RateGuard) -> Self {
        guard
            .entries
            .into_iter()
            .map(|(address, entry)| RateGuardRecord { address, entry })
            .collect()
    }
}

impl From<Vec<RateGuardRecord>> for RateGuard {
    fn from(records: Vec<RateGuardRecord>) -> Self {
        Self {
            entries: records.into_iter().map(|r| (r.address, r.entry)).collect(),
        }
    }
}

impl RateGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, address: &Pubkey) -> Option<&RateGuardEntry> {
        self.entries.get(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pubkey, &RateGuardEntry)> {
        self.entries.iter()
    }

    /// Validate an attempt without touching state; returns the entry to
    /// store if the operation commits.
    pub fn check(
        &self,
        address: &Pubkey,
        policy: RateLimitPolicy,
        now: i64,
        slot: u64,
    ) -> LockerResult<RateGuardEntry> {
        let prior = self.entries.get(address).copied();

        if policy.enabled {
            if let Some(prior) = prior {
                let elapsed = now.saturating_sub(prior.last_timestamp);
                if elapsed < policy.min_seconds_between_tx {
                    return Err(LockerError::RateLimited {
                        address: *address,
                        violation: RateLimitViolation::Cooldown {
                            elapsed,
                            required: policy.min_seconds_between_tx,
                        },
                    });
                }
                if prior.last_slot == slot && prior.tx_in_slot >= policy.max_tx_per_block {
                    return Err(LockerError::RateLimited {
                        address: *address,
                        violation: RateLimitViolation::BlockCapReached {
                            slot,
                            max_per_block: policy.max_tx_per_block,
                        },
                    });
                }
            }
        }

        let next = match prior {
            Some(prior) if prior.last_slot == slot => RateGuardEntry {
                last_timestamp: now,
                last_slot: slot,
                tx_in_slot: prior.tx_in_slot.saturating_add(1),
            },
            _ => RateGuardEntry {
                last_timestamp: now,
                last_slot: slot,
                tx_in_slot: 1,
            },
        };
        Ok(next)
    }

    pub fn commit(&mut self, address: Pubkey, entry: RateGuardEntry) {
        self.entries.insert(address, entry);
    }

    pub fn check_and_record(
        &mut self,
        address: &Pubkey,
        policy: RateLimitPolicy,
        now: i64,
        slot: u64,
    ) -> LockerResult<()> {
        let entry = self.check(address, policy, now, slot)?;
        self.commit(*address, entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(min_seconds: i64, per_block: u32) -> RateLimitPolicy {
        RateLimitPolicy {
            enabled: true,
            min_seconds_between_tx: min_seconds,
            max_tx_per_block: per_block,
        }
    }

    #[test]
    fn test_first_use_always_passes() {
        let mut guard = RateGuard::new();
        let user = Pubkey::new_unique();
        guard.check_and_record(&user, policy(3600, 1), 10, 1).unwrap();
        let entry = guard.entry(&user).unwrap();
        assert_eq!(entry.last_timestamp, 10);
        assert_eq!(entry.last_slot, 1);
        assert_eq!(entry.tx_in_slot, 1);
    }

    #[test]
    fn test_cooldown() {
        let mut guard = RateGuard::new();
        let user = Pubkey::new_unique();
        guard.check_and_record(&user, policy(60, 10), 1_000, 1).unwrap();

        let err = guard.check_and_record(&user, policy(60, 10), 1_059, 2).unwrap_err();
        assert!(matches!(
            err,
            LockerError::RateLimited {
                violation: RateLimitViolation::Cooldown { elapsed: 59, required: 60 },
                ..
            }
        ));
        // rejected attempt leaves the entry alone
        assert_eq!(guard.entry(&user).unwrap().last_timestamp, 1_000);

        guard.check_and_record(&user, policy(60, 10), 1_060, 3).unwrap();
        assert_eq!(guard.entry(&user).unwrap().last_timestamp, 1_060);
    }

    #[test]
    fn test_block_cap_resets_on_new_slot() {
        let mut guard = RateGuard::new();
        let user = Pubkey::new_unique();
        let p = policy(0, 2);

        guard.check_and_record(&user, p, 100, 7).unwrap();
        guard.check_and_record(&user, p, 100, 7).unwrap();
        assert_eq!(guard.entry(&user).unwrap().tx_in_slot, 2);

        let err = guard.check_and_record(&user, p, 100, 7).unwrap_err();
        assert!(matches!(
            err,
            LockerError::RateLimited {
                violation: RateLimitViolation::BlockCapReached { slot: 7, max_per_block: 2 },
                ..
            }
        ));

        guard.check_and_record(&user, p, 101, 8).unwrap();
        let entry = guard.entry(&user).unwrap();
        assert_eq!(entry.last_slot, 8);
        assert_eq!(entry.tx_in_slot, 1);
    }

    #[test]
    fn test_disabled_bypasses_checks_but_still_records() {
        let mut guard = RateGuard::new();
        let user = Pubkey::new_unique();
        let disabled = RateLimitPolicy {
            enabled: false,
            min_seconds_between_tx: 3600,
            max_tx_per_block: 1,
        };
        for _ in 0..3 {
            guard.check_and_record(&user, disabled, 5, 1).unwrap();
        }
        assert_eq!(guard.entry(&user).unwrap().tx_in_slot, 3);
    }

    #[test]
    fn test_addresses_are_independent() {
        let mut guard = RateGuard::new();
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        guard.check_and_record(&a, policy(60, 1), 0, 0).unwrap();
        guard.check_and_record(&b, policy(60, 1), 0, 0).unwrap();
        assert!(guard.check_and_record(&a, policy(60, 1), 1, 0).is_err());
        assert_eq!(guard.len(), 2);
    }

    #[test]
    fn test_clock_going_backwards_is_rate_limited() {
        let mut guard = RateGuard::new();
        let user = Pubkey::new_unique();
        guard.check_and_record(&user, policy(1, 5), 500, 1).unwrap();
        assert!(guard.check_and_record(&user, policy(1, 5), 400, 2).is_err());
    }

    #[test]
    fn test_persists_as_flat_records() {
        let mut guard = RateGuard::new();
        let user = Pubkey::new_unique();
        guard.check_and_record(&user, policy(0, 1), 42, 9).unwrap();

        let json = serde_json::to_value(&guard).unwrap();
        assert_eq!(json[0]["address"], user.to_string());
        assert_eq!(json[0]["last_timestamp"], 42);
        assert_eq!(json[0]["last_slot"], 9);
        assert_eq!(json[0]["tx_in_slot"], 1);

        let back: RateGuard = serde_json::from_value(json).unwrap();
        assert_eq!(back, guard);
    }
}
