//! Checked arithmetic used by every accounting path

pub mod safe_math;

pub use safe_math::*;
