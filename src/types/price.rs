//! Fixed-point price and quantity utilities.
//!
//! ## Overview
//!
//! All prices and quantities use fixed-point representation to avoid
//! floating-point errors. Values are stored as u64 scaled by 10^8.
//!
//! Using floating-point as a ladder key is fragile (NaN, rounding, platform
//! divergence). Integer ticks make ordering and equality exact, so the book
//! never needs an epsilon tolerance anywhere.
//!
//! ## Scale Factor
//!
//! The scale factor is 10^8 (100,000,000), providing 8 decimal places.
//!
//! ## Examples
//!
//! ```
//! use lobcore::types::price::{to_fixed, from_fixed};
//!
//! // Convert 50000.12345678 to fixed-point
//! let price = to_fixed("50000.12345678").unwrap();
//! assert_eq!(price, 5_000_012_345_678);
//!
//! // Convert back to string
//! let s = from_fixed(price);
//! assert_eq!(s, "50000.12345678");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Scaling factor for fixed-point arithmetic: 10^8
///
/// This provides 8 decimal places of precision.
pub const SCALE: u64 = 100_000_000;

/// Maximum value that can be safely represented
///
/// u64::MAX / SCALE ≈ 184,467,440,737 (184 billion)
pub const MAX_VALUE: u64 = u64::MAX / SCALE;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to fixed-point u64
///
/// # Returns
///
/// * `Some(u64)` - The fixed-point representation
/// * `None` - If parsing fails, the value is negative, or out of range
///
/// # Example
///
/// ```
/// use lobcore::types::price::to_fixed;
///
/// assert_eq!(to_fixed("1.0"), Some(100_000_000));
/// assert_eq!(to_fixed("0.00000001"), Some(1));
/// assert_eq!(to_fixed("-1.0"), None);
/// ```
pub fn to_fixed(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a Decimal to fixed-point u64
///
/// Rejects negative values; rounds to the nearest representable tick.
pub fn decimal_to_fixed(d: Decimal) -> Option<u64> {
    if d.is_sign_negative() {
        return None;
    }

    let scaled = d.checked_mul(Decimal::from(SCALE))?;
    let rounded = scaled.round_dp(0);
    rounded.to_u64()
}

/// Convert fixed-point u64 to a Decimal
pub fn fixed_to_decimal(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

/// Convert fixed-point u64 to a string with 8 decimal places
///
/// # Example
///
/// ```
/// use lobcore::types::price::from_fixed;
///
/// assert_eq!(from_fixed(100_000_000), "1.00000000");
/// assert_eq!(from_fixed(5_000_012_345_678), "50000.12345678");
/// ```
pub fn from_fixed(value: u64) -> String {
    let decimal = fixed_to_decimal(value);
    format!("{:.8}", decimal)
}

/// Convert fixed-point u64 to a human-readable string (trimmed trailing zeros)
///
/// # Example
///
/// ```
/// use lobcore::types::price::from_fixed_trimmed;
///
/// assert_eq!(from_fixed_trimmed(100_000_000), "1");
/// assert_eq!(from_fixed_trimmed(150_000_000), "1.5");
/// ```
pub fn from_fixed_trimmed(value: u64) -> String {
    let decimal = fixed_to_decimal(value);
    format!("{}", decimal.normalize())
}

// ============================================================================
// Unit Tests
// ============================================================================
