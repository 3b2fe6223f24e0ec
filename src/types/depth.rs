//! Aggregated market-data records produced by the book's read path.

use ssz_rs::prelude::*;

/// One aggregated ladder level in a depth snapshot.
///
/// Per-order detail is never exposed through snapshots; consumers see only
/// the per-level totals, in natural order (bids descending, asks ascending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, SimpleSerialize)]
pub struct BookLevel {
    /// Price for this level (fixed-point, scaled by 10^8)
    pub price: u64,

    /// Sum of the resting quantity across every order at this price
    pub total_quantity: u64,
}

/// Lifetime counters and top-of-book summary.
///
/// The operation counters are monotonic over the book's lifetime: they only
/// count operations that actually took effect (a rejected add or an unknown-id
/// cancel leaves them untouched).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookStats {
    /// Orders successfully added
    pub total_adds: u64,

    /// Orders successfully cancelled
    pub total_cancels: u64,

    /// Orders successfully amended (either path)
    pub total_amends: u64,

    /// Depth snapshots served
    pub total_snapshots: u64,

    /// Orders currently resting
    pub active_orders: u64,

    /// Populated bid price levels
    pub bid_levels: usize,

    /// Populated ask price levels
    pub ask_levels: usize,

    /// Best bid, or 0 if the bid side is empty
    pub best_bid: u64,

    /// Best ask, or u64::MAX if the ask side is empty
    pub best_ask: u64,

    /// best_ask - best_bid when both sides are populated, else 0.
    /// Negative when the book is crossed.
    pub spread: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_level_ssz_roundtrip() {
        let level = BookLevel {
            price: 5_000_000_000_000,
            total_quantity: 300_000_000,
        };

        let bytes = ssz_rs::serialize(&level).expect("Failed to serialize");
        let back: BookLevel = ssz_rs::deserialize(&bytes).expect("Failed to deserialize");

        assert_eq!(level, back);
    }

    #[test]
    fn test_book_stats_default() {
        let stats = BookStats::default();
        assert_eq!(stats.total_adds, 0);
        assert_eq!(stats.active_orders, 0);
        assert_eq!(stats.spread, 0);
    }
}
