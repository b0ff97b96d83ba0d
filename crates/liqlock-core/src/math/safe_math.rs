//! # Safe Math Operations
//!
//! Overflow-checked arithmetic for the reward pipeline. Amounts are `u64`;
//! products are formed in `u128` and narrowed back with an explicit check.

use crate::constants::BPS_DENOMINATOR;
use crate::error::{LockerError, LockerResult};

/// Macro to generate safe arithmetic functions
macro_rules! safe_arith {
    // Binary operations with checked methods
    ($fn_name:ident, $type:ty, $checked_method:ident, $error:expr) => {
        pub fn $fn_name(a: $type, b: $type) -> LockerResult<$type> {
            a.$checked_method(b).ok_or($error)
        }
    };

    // Division operations with zero check
    (div, $fn_name:ident, $type:ty) => {
        pub fn $fn_name(a: $type, b: $type) -> LockerResult<$type> {
            if b == 0 {
                return Err(LockerError::DivisionByZero);
            }
            Ok(a / b)
        }
    };

    // Narrowing cast with only max check
    (cast_max, $fn_name:ident, $from_type:ty, $to_type:ty, $max_val:expr) => {
        pub fn $fn_name(value: $from_type) -> LockerResult<$to_type> {
            if value > $max_val {
                return Err(LockerError::MathOverflow);
            }
            Ok(value as $to_type)
        }
    };
}

safe_arith!(safe_add_u64, u64, checked_add, LockerError::MathOverflow);
safe_arith!(safe_sub_u64, u64, checked_sub, LockerError::MathUnderflow);
safe_arith!(safe_mul_u64, u64, checked_mul, LockerError::MathOverflow);
safe_arith!(div, safe_div_u64, u64);

safe_arith!(safe_mul_u128, u128, checked_mul, LockerError::MathOverflow);
safe_arith!(div, safe_div_u128, u128);

safe_arith!(cast_max, safe_cast_u128_to_u64, u128, u64, u64::MAX as u128);

/// `a * b / denominator` with a `u128` intermediate, rounding down
pub fn safe_mul_div_u64(a: u64, b: u64, denominator: u64) -> LockerResult<u64> {
    let product = safe_mul_u128(a as u128, b as u128)?;
    safe_cast_u128_to_u64(safe_div_u128(product, denominator as u128)?)
}

/// `value * (10000 - bps) / 10000`, the smallest amount a `bps` slippage allows
pub fn apply_slippage_floor(value: u64, bps: u16) -> LockerResult<u64> {
    let bps = bps as u64;
    if bps > BPS_DENOMINATOR {
        return Err(LockerError::InvalidParameter("slippage above 100%"));
    }
    safe_mul_div_u64(value, BPS_DENOMINATOR - bps, BPS_DENOMINATOR)
}
