//! Core data types for the order book
//!
//! All wire-shaped types implement SSZ serialization for deterministic
//! encoding. All numeric values use fixed-point representation (scaled by
//! 10^8).
//!
//! ## Types
//!
//! - [`Order`]: A limit order supplied by the caller
//! - [`Side`]: Buy or Sell
//! - [`BookLevel`]: One aggregated level of a depth snapshot
//! - [`BookStats`]: Lifetime counters and top-of-book summary
//!
//! ## Fixed-Point Arithmetic
//!
//! All prices and quantities are stored as `u64` scaled by 10^8.
//! Example: 50000.12345678 is stored as 5_000_012_345_678u64

mod depth;
mod order;
pub mod price;

// Re-export all types at module level
pub use depth::{BookLevel, BookStats};
pub use order::{Order, Side};
