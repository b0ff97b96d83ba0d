//! Protocol constants

/// Basis-point denominator (100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Highest slippage any configuration may allow
pub const MAX_SLIPPAGE_CEILING_BPS: u16 = 10_000;

/// Seconds the AMM router has to execute a forwarded call
pub const ROUTER_DEADLINE_SECS: i64 = 300;

/// Version reported by the built-in orchestration logic
pub const STANDARD_LOGIC_VERSION: u32 = 1;

// Defaults used by `InitializeParams::default()`
pub const DEFAULT_LIQUIDITY_DIVISOR: u64 = 1_000_000;
pub const DEFAULT_REWARD_RATIO: u64 = 1;
pub const DEFAULT_MAX_SLIPPAGE_BPS: u16 = 500; // 5%
pub const DEFAULT_SLIPPAGE_BPS: u16 = 100; // 1%
pub const DEFAULT_MIN_SECONDS_BETWEEN_TX: i64 = 60;
pub const DEFAULT_MAX_TX_PER_BLOCK: u32 = 1;
