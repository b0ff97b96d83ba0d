use serde::{Deserialize, Serialize};

/// Block context an operation executes in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockClock {
    pub unix_timestamp: i64,
    pub slot: u64,
}

impl BlockClock {
    pub fn new(unix_timestamp: i64, slot: u64) -> Self {
        Self { unix_timestamp, slot }
    }

    /// Same slot, `seconds` later
    pub fn after(&self, seconds: i64) -> Self {
        Self {
            unix_timestamp: self.unix_timestamp + seconds,
            slot: self.slot,
        }
    }

    /// Next slot, `seconds` later
    pub fn next_slot(&self, seconds: i64) -> Self {
        Self {
            unix_timestamp: self.unix_timestamp + seconds,
            slot: self.slot + 1,
        }
    }
}
