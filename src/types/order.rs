//! Order input record for the book.
//!
//! ## SSZ Serialization
//!
//! All core types derive `SimpleSerialize` from ssz_rs for deterministic
//! encoding. Per the SSZ spec (ethereum.org):
//! - Basic types (u64, u8): Direct little-endian encoding
//! - Fixed-size composites: Concatenated little-endian fields
//!
//! ## Fixed-Point Representation
//!
//! Prices and quantities are stored as u64 scaled by 10^8 (SCALE constant).
//! This provides 8 decimal places of precision without floating-point errors.

use ssz_rs::prelude::*;

// Note: SCALE constant is defined in price.rs module
// Use: crate::types::price::SCALE

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 for SSZ compatibility:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Buy order (bid) - rests on the bid ladder
    #[default]
    Buy,
    /// Sell order (ask) - rests on the ask ladder
    Sell,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Convert from a boolean buy flag
    pub fn from_is_buy(is_buy: bool) -> Self {
        if is_buy {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A limit order supplied to the book by the caller.
///
/// ## Fields
///
/// Price and quantity use fixed-point representation (scaled by 10^8).
/// `timestamp_ns` is informational only: FIFO position within a price level
/// is determined by insertion order, never by this field.
///
/// ## Example
///
/// ```
/// use lobcore::types::{Order, Side};
///
/// // A buy order for 1 unit at 50,000
/// let order = Order::new(
///     1,                      // id
///     Side::Buy,              // side
///     5_000_000_000_000,      // price: 50000.00000000
///     100_000_000,            // quantity: 1.00000000
///     1703577600000000000,    // timestamp (ns)
/// );
/// assert_eq!(order.side(), Side::Buy);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Unique order identifier, supplied by the caller.
    /// Must be unique among currently resting orders; a retired id
    /// may be reused for a fresh add.
    pub id: u64,

    /// Order side as u8 (0=Buy, 1=Sell)
    /// Stored as u8 for SSZ compatibility
    pub side_raw: u8,

    /// Price in fixed-point (scaled by 10^8)
    /// Example: 50000.00000000 = 5_000_000_000_000u64
    pub price: u64,

    /// Quantity in fixed-point (scaled by 10^8), strictly positive
    pub quantity: u64,

    /// Unix timestamp in nanoseconds when the order was created
    pub timestamp_ns: u64,
}

impl Order {
    /// Create a new limit order
    ///
    /// # Arguments
    ///
    /// * `id` - Unique order identifier
    /// * `side` - Buy or Sell
    /// * `price` - Price in fixed-point (scaled by 10^8)
    /// * `quantity` - Quantity in fixed-point (scaled by 10^8)
    /// * `timestamp_ns` - Unix timestamp in nanoseconds
    pub fn new(id: u64, side: Side, price: u64, quantity: u64, timestamp_ns: u64) -> Self {
        Self {
            id,
            side_raw: side.to_u8(),
            price,
            quantity,
            timestamp_ns,
        }
    }

    /// Get the order side
    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or(Side::Buy)
    }

    /// Set the order side
    pub fn set_side(&mut self, side: Side) {
        self.side_raw = side.to_u8();
    }

    /// Whether this is a buy order
    pub fn is_buy(&self) -> bool {
        self.side() == Side::Buy
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_conversion() {
        assert_eq!(Side::Buy.to_u8(), 0);
        assert_eq!(Side::Sell.to_u8(), 1);
        assert_eq!(Side::from_u8(0), Some(Side::Buy));
        assert_eq!(Side::from_u8(1), Some(Side::Sell));
        assert_eq!(Side::from_u8(2), None);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_side_from_is_buy() {
        assert_eq!(Side::from_is_buy(true), Side::Buy);
        assert_eq!(Side::from_is_buy(false), Side::Sell);
    }

    #[test]
    fn test_order_new() {
        let order = Order::new(
            1,
            Side::Buy,
            5_000_000_000_000, // 50000.00000000
            100_000_000,       // 1.00000000
            1703577600000000000,
        );

        assert_eq!(order.id, 1);
        assert_eq!(order.side(), Side::Buy);
        assert!(order.is_buy());
        assert_eq!(order.price, 5_000_000_000_000);
        assert_eq!(order.quantity, 100_000_000);
        assert_eq!(order.timestamp_ns, 1703577600000000000);
    }

    #[test]
    fn test_order_ssz_roundtrip() {
        let order = Order::new(1, Side::Sell, 5_000_000_000_000, 100_000_000, 42);

        let serialized = ssz_rs::serialize(&order).expect("Failed to serialize");
        let deserialized: Order = ssz_rs::deserialize(&serialized).expect("Failed to deserialize");

        assert_eq!(order, deserialized);
    }

    #[test]
    fn test_order_deterministic_serialization() {
        // Same order must always produce identical bytes
        let order = Order::new(1, Side::Buy, 5_000_000_000_000, 100_000_000, 1703577600000000000);

        let bytes1 = ssz_rs::serialize(&order).expect("Failed to serialize");
        let bytes2 = ssz_rs::serialize(&order).expect("Failed to serialize");

        assert_eq!(bytes1, bytes2, "SSZ serialization must be deterministic");
    }

    #[test]
    fn test_order_ssz_size() {
        let order = Order::new(1, Side::Buy, 5_000_000_000_000, 100_000_000, 0);
        let bytes = ssz_rs::serialize(&order).expect("Failed to serialize");

        // id + side_raw + price + quantity + timestamp_ns = 8+1+8+8+8
        assert_eq!(bytes.len(), 33, "Order should serialize to 33 bytes");
    }
}
