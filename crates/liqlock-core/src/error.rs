//! # Engine Error Types
//!
//! Every rejected operation carries exactly one `LockerError`. Rejection always
//! happens with zero state mutation, so callers never need to inspect partial
//! progress.

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use thiserror::Error;

/// Failure classes used by callers that route errors without string matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    InputValidation,
    Authorization,
    RateLimit,
    ExternalCall,
    Solvency,
    Arithmetic,
    Token,
}

/// Why the rate guard rejected an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitViolation {
    /// Cooldown since the previous transaction has not elapsed
    Cooldown { elapsed: i64, required: i64 },
    /// The address already used its per-block allowance
    BlockCapReached { slot: u64, max_per_block: u32 },
}

impl std::fmt::Display for RateLimitViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cooldown { elapsed, required } => {
                write!(f, "cooldown not elapsed ({}s of {}s)", elapsed, required)
            }
            Self::BlockCapReached { slot, max_per_block } => {
                write!(f, "per-block cap of {} reached in slot {}", max_per_block, slot)
            }
        }
    }
}

/// Token-level failures surfaced by `FungibleToken` implementations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient balance: {owner} holds {balance}, needs {required}")]
    InsufficientBalance {
        owner: Pubkey,
        balance: u64,
        required: u64,
    },

    #[error("Insufficient allowance: {spender} may spend {allowance} of {owner}, needs {required}")]
    InsufficientAllowance {
        owner: Pubkey,
        spender: Pubkey,
        allowance: u64,
        required: u64,
    },

    #[error("Token supply overflow")]
    SupplyOverflow,

    #[error("Token account {account} is frozen")]
    Frozen { account: Pubkey },
}

/// Failures reported by an AMM router backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Router {expected} does not serve calls addressed to {requested}")]
    UnknownRouter { expected: Pubkey, requested: Pubkey },

    #[error("Deadline {deadline} passed at {now}")]
    DeadlineExpired { deadline: i64, now: i64 },

    #[error("Router bound violated: {0}")]
    BoundViolated(String),

    #[error("Unknown liquidity position")]
    UnknownPosition,

    #[error("Router token movement failed: {0}")]
    Token(#[from] TokenError),

    #[error("Router call failed: {0}")]
    CallFailed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockerError {
    // ========================================================================
    // Input Validation Errors
    // ========================================================================
    #[error("Amount too low: {field} {amount} is below minimum {minimum}")]
    AmountTooLow {
        field: &'static str,
        amount: u64,
        minimum: u64,
    },

    #[error("Slippage parameter too high: {requested} bps exceeds maximum {maximum} bps")]
    SlippageParameterTooHigh { requested: u16, maximum: u16 },

    #[error("Amount mismatch: declared native amount {declared}, payment supplied {supplied}")]
    AmountMismatch { declared: u64, supplied: u64 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("Zero address not allowed for {0}")]
    ZeroAddress(&'static str),

    // ========================================================================
    // Authorization Errors
    // ========================================================================
    #[error("Permission denied: {caller} is not the authority")]
    PermissionDenied { caller: Pubkey },

    // ========================================================================
    // Rate Limit Errors
    // ========================================================================
    #[error("Rate limit exceeded for {address}: {violation}")]
    RateLimited {
        address: Pubkey,
        violation: RateLimitViolation,
    },

    // ========================================================================
    // External Call Errors
    // ========================================================================
    #[error("Slippage exceeded: AMM minted {minted} liquidity, floor is {floor}")]
    SlippageExceeded { minted: u64, floor: u64 },

    #[error("External call failed: {0}")]
    ExternalCall(#[from] RouterError),

    // ========================================================================
    // Solvency Errors
    // ========================================================================
    #[error("Insufficient vault: reward {required} exceeds available {available}")]
    InsufficientVault { required: u64, available: u64 },

    // ========================================================================
    // Arithmetic Errors
    // ========================================================================
    #[error("Math overflow")]
    MathOverflow,

    #[error("Math underflow")]
    MathUnderflow,

    #[error("Division by zero")]
    DivisionByZero,

    // ========================================================================
    // Token Errors
    // ========================================================================
    #[error("Token transfer failed: {0}")]
    Token(#[from] TokenError),
}

impl LockerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AmountTooLow { .. }
            | Self::SlippageParameterTooHigh { .. }
            | Self::AmountMismatch { .. }
            | Self::InvalidParameter(_) => ErrorCategory::InputValidation,
            Self::ZeroAddress(_) | Self::PermissionDenied { .. } => ErrorCategory::Authorization,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::SlippageExceeded { .. } | Self::ExternalCall(_) => ErrorCategory::ExternalCall,
            Self::InsufficientVault { .. } => ErrorCategory::Solvency,
            Self::MathOverflow | Self::MathUnderflow | Self::DivisionByZero => {
                ErrorCategory::Arithmetic
            }
            Self::Token(_) => ErrorCategory::Token,
        }
    }
}

/// Result type using engine errors
pub type LockerResult<T> = Result<T, LockerError>;
