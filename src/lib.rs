//! # lobcore
//!
//! In-memory limit order book core.
//!
//! ## Architecture
//!
//! - **Types**: Core data structures (Order, BookLevel, BookStats)
//! - **OrderBook**: Price-time-prioritized book with slab-based memory pooling
//!
//! ## Design Principles
//!
//! 1. **No Floating Point**: All prices and quantities use fixed-point
//!    arithmetic (10^8 scaling), so ladder ordering and equality are exact
//! 2. **Pre-allocated Memory**: Slab pools for O(1) order and level
//!    lifecycle without heap churn
//! 3. **Synchronous Execution**: Single-threaded, no async in the hot path;
//!    FIFO priority is exactly caller invocation order
//! 4. **Detection, not execution**: the book reports crossing via
//!    `can_match` and leaves matching to an external engine
//!
//! ## Performance Targets
//!
//! - Throughput: >1,000,000 ops/second sustained
//! - Latency: microseconds per mutation or top-of-book read
//! - Memory: grows only with peak live orders

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, Side, BookLevel, BookStats
pub mod types;

/// Order book: ladder, FIFO levels, id index, slab pools
pub mod orderbook;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use orderbook::{OrderBook, OrderNode, PriceLevel};
pub use types::{BookLevel, BookStats, Order, Side};
