//! Limit order book implementation.
//!
//! ## Architecture
//!
//! The book uses a hybrid data structure for optimal performance:
//!
//! - **Slab pools**: Pre-allocated storage for order nodes and price levels
//! - **BTreeMap ladders**: Sorted price levels for efficient best bid/ask lookup
//! - **HashMap index**: Order ID to slab key mapping for O(1) cancel
//!
//! ## Price Ordering
//!
//! - **Bids** (buy orders): Sorted high-to-low (best bid = highest price)
//! - **Asks** (sell orders): Sorted low-to-high (best ask = lowest price)
//!
//! ## Memory Model
//!
//! Per slab docs (https://docs.rs/slab/0.4.11):
//! - `Slab::with_capacity(n)` pre-allocates n slots
//! - Keys are reused after removal (LIFO, so a hot slot just freed is
//!   reissued next)
//! - O(1) insert, remove, and lookup
//!
//! Both order nodes and price levels draw from slab pools; an emptied level
//! is unlinked from its ladder and its slot returned for reuse, so storage
//! grows only with peak live orders.
//!
//! ## Example
//!
//! ```
//! use lobcore::{Order, OrderBook, Side};
//!
//! let mut book = OrderBook::with_capacity(10_000);
//!
//! book.add(Order::new(1, Side::Buy, 5_000_000_000_000, 100_000_000, 0));
//! book.add(Order::new(2, Side::Sell, 5_100_000_000_000, 100_000_000, 1));
//!
//! assert_eq!(book.best_bid(), Some(5_000_000_000_000));
//! assert_eq!(book.best_ask(), Some(5_100_000_000_000));
//! assert!(!book.can_match());
//! ```

use std::cell::Cell;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};
use slab::Slab;

use crate::orderbook::{OrderNode, PriceLevel};
use crate::types::{BookLevel, BookStats, Order, Side};

/// Wall-clock nanoseconds, used to restamp an order on a price amend.
fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// A price-time-prioritized limit order book.
///
/// Single-threaded by design: every operation runs to completion before the
/// next begins, so FIFO priority is exactly caller invocation order. The
/// book never executes trades; it only reports matchable liquidity via
/// [`can_match`](OrderBook::can_match).
#[derive(Debug, Clone)]
pub struct OrderBook {
    /// Pool of order nodes
    /// Key: slab index, Value: OrderNode
    orders: Slab<OrderNode>,

    /// Pool of price levels; the ladders store keys into this slab
    levels: Slab<PriceLevel>,

    /// Bid ladder (sorted high to low)
    /// Key: Reverse(price) for descending order, Value: level pool key
    bids: BTreeMap<Reverse<u64>, usize>,

    /// Ask ladder (sorted low to high)
    /// Key: price for ascending order, Value: level pool key
    asks: BTreeMap<u64, usize>,

    /// Order ID to slab key mapping (for O(1) cancel/amend)
    order_index: HashMap<u64, usize>,

    /// Total number of resting bid orders
    bid_count: usize,

    /// Total number of resting ask orders
    ask_count: usize,

    // Lifetime operation counters
    total_adds: u64,
    total_cancels: u64,
    total_amends: u64,
    total_snapshots: Cell<u64>,

    // Best-price cache, invalidated by every mutator and lazily rebuilt on
    // read. Plain Cells: the book is single-threaded by contract.
    cached_best_bid: Cell<u64>,
    cached_best_ask: Cell<u64>,
    cache_valid: Cell<bool>,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    /// Best-bid value reported when the bid side is empty
    pub const EMPTY_BID: u64 = 0;

    /// Best-ask value reported when the ask side is empty
    pub const EMPTY_ASK: u64 = u64::MAX;

    /// Create a new empty book
    pub fn new() -> Self {
        Self {
            orders: Slab::new(),
            levels: Slab::new(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_index: HashMap::new(),
            bid_count: 0,
            ask_count: 0,
            total_adds: 0,
            total_cancels: 0,
            total_amends: 0,
            total_snapshots: Cell::new(0),
            cached_best_bid: Cell::new(Self::EMPTY_BID),
            cached_best_ask: Cell::new(Self::EMPTY_ASK),
            cache_valid: Cell::new(false),
        }
    }

    /// Create a book with pre-allocated capacity
    ///
    /// Pre-sizes the order pool and the id index so the hot path never
    /// rehashes or reallocates up to `order_capacity` resting orders. The
    /// level pool is sized at a quarter of that, matching the typical
    /// orders-per-level ratio.
    ///
    /// # Example
    ///
    /// ```
    /// use lobcore::OrderBook;
    ///
    /// let book = OrderBook::with_capacity(100_000);
    /// assert!(book.capacity() >= 100_000);
    /// ```
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            levels: Slab::with_capacity(order_capacity / 4),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_index: HashMap::with_capacity(order_capacity),
            bid_count: 0,
            ask_count: 0,
            total_adds: 0,
            total_cancels: 0,
            total_amends: 0,
            total_snapshots: Cell::new(0),
            cached_best_bid: Cell::new(Self::EMPTY_BID),
            cached_best_ask: Cell::new(Self::EMPTY_ASK),
            cache_valid: Cell::new(false),
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    /// Get the current order pool capacity (pre-allocated slots)
    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Get the total number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Get the number of resting bid orders
    #[inline]
    pub fn bid_count(&self) -> usize {
        self.bid_count
    }

    /// Get the number of resting ask orders
    #[inline]
    pub fn ask_count(&self) -> usize {
        self.ask_count
    }

    /// Check if the book is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Get the number of bid price levels
    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Get the number of ask price levels
    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    // ========================================================================
    // Mutating Operations
    // ========================================================================

    /// Add an order to the book
    ///
    /// Rejected (returns `false`, book untouched) when the quantity or price
    /// is zero, or when `order.id` is already resting. A retired id may be
    /// reused freely.
    ///
    /// # Example
    ///
    /// ```
    /// use lobcore::{Order, OrderBook, Side};
    ///
    /// let mut book = OrderBook::with_capacity(100);
    /// let order = Order::new(1, Side::Buy, 5_000_000_000_000, 100_000_000, 0);
    ///
    /// assert!(book.add(order.clone()));
    /// assert!(!book.add(order)); // duplicate id
    /// assert_eq!(book.order_count(), 1);
    /// ```
    pub fn add(&mut self, order: Order) -> bool {
        if order.quantity == 0 || order.price == 0 {
            return false;
        }
        if self.order_index.contains_key(&order.id) {
            return false;
        }

        self.link_order(order);
        self.total_adds += 1;
        self.cache_valid.set(false);
        true
    }

    /// Cancel a resting order by id
    ///
    /// Returns `true` iff the order existed. Cancelling an unknown id is a
    /// no-op returning `false`, not an error.
    ///
    /// # Example
    ///
    /// ```
    /// use lobcore::{Order, OrderBook, Side};
    ///
    /// let mut book = OrderBook::with_capacity(100);
    /// book.add(Order::new(42, Side::Buy, 5_000_000_000_000, 100_000_000, 0));
    ///
    /// assert!(book.cancel(42));
    /// assert!(!book.cancel(42));
    /// assert!(book.is_empty());
    /// ```
    pub fn cancel(&mut self, order_id: u64) -> bool {
        let key = match self.order_index.get(&order_id) {
            Some(&k) => k,
            None => return false,
        };

        self.unlink_order(key);
        self.total_cancels += 1;
        self.cache_valid.set(false);
        true
    }

    /// Amend a resting order's price and/or quantity
    ///
    /// Returns `false` for an unknown id, and rejects a zero `new_quantity`
    /// or `new_price` without mutating the book (an amend to zero is not a
    /// cancel; callers must cancel explicitly).
    ///
    /// Two paths:
    /// - **Quantity-only** (`new_price` equals the resting price exactly):
    ///   the quantity is replaced in place and the order keeps its FIFO
    ///   position.
    /// - **Price change**: the order is removed and reinserted at the new
    ///   price with a fresh timestamp, landing at the tail of the new
    ///   level. Time priority is lost.
    pub fn amend(&mut self, order_id: u64, new_price: u64, new_quantity: u64) -> bool {
        if new_quantity == 0 || new_price == 0 {
            return false;
        }
        let key = match self.order_index.get(&order_id) {
            Some(&k) => k,
            None => return false,
        };

        let (old_price, side) = {
            let node = self
                .orders
                .get(key)
                .expect("order index references a vacant slot");
            (node.price(), node.order.side())
        };

        // Integer prices make equality exact, so there is no tolerance here
        if new_price == old_price {
            let level_key = self.level_key(side, old_price);
            let level = self
                .levels
                .get_mut(level_key)
                .expect("ladder references a vacant level slot");
            level.update_quantity(key, new_quantity, &mut self.orders);
        } else {
            let mut order = self.unlink_order(key);
            order.price = new_price;
            order.quantity = new_quantity;
            order.timestamp_ns = now_ns();
            self.link_order(order);
        }

        self.total_amends += 1;
        self.cache_valid.set(false);
        true
    }

    /// Drop every resting order and level
    ///
    /// Pool storage is retained for reuse; lifetime counters keep counting.
    pub fn clear(&mut self) {
        self.orders.clear();
        self.levels.clear();
        self.bids.clear();
        self.asks.clear();
        self.order_index.clear();
        self.bid_count = 0;
        self.ask_count = 0;
        self.cache_valid.set(false);
    }

    // ========================================================================
    // Read Operations
    // ========================================================================

    /// Best bid and ask, with sentinels for empty sides
    ///
    /// Returns `(EMPTY_BID, ...)` / `(..., EMPTY_ASK)` when a side is empty.
    /// Backed by a cache that every mutator invalidates, so repeated
    /// top-of-book reads between mutations cost two `Cell` loads.
    pub fn best_prices(&self) -> (u64, u64) {
        if !self.cache_valid.get() {
            let bid = self
                .bids
                .keys()
                .next()
                .map(|r| r.0)
                .unwrap_or(Self::EMPTY_BID);
            let ask = self.asks.keys().next().copied().unwrap_or(Self::EMPTY_ASK);
            self.cached_best_bid.set(bid);
            self.cached_best_ask.set(ask);
            self.cache_valid.set(true);
        }
        (self.cached_best_bid.get(), self.cached_best_ask.get())
    }

    /// Get the best bid price (highest buy price)
    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Get the best ask price (lowest sell price)
    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.keys().next().copied()
    }

    /// Signed spread (best_ask - best_bid), `None` if either side is empty
    ///
    /// Negative when the book is crossed.
    pub fn spread(&self) -> Option<i64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask as i64 - bid as i64),
            _ => None,
        }
    }

    /// Whether resting liquidity crosses
    ///
    /// `true` iff both sides are non-empty and best_bid >= best_ask. The
    /// book itself never trades; an external matching engine consumes this
    /// signal.
    ///
    /// # Example
    ///
    /// ```
    /// use lobcore::{Order, OrderBook, Side};
    ///
    /// let mut book = OrderBook::new();
    /// book.add(Order::new(1, Side::Buy, 10_100_000_000, 10, 0));
    /// book.add(Order::new(2, Side::Sell, 10_000_000_000, 10, 1));
    ///
    /// assert!(book.can_match());
    /// ```
    pub fn can_match(&self) -> bool {
        if self.bids.is_empty() || self.asks.is_empty() {
            return false;
        }
        let (best_bid, best_ask) = self.best_prices();
        best_bid >= best_ask
    }

    /// Fill `out_bids`/`out_asks` with up to `depth` aggregated levels per side
    ///
    /// Bids come out descending, asks ascending. Both buffers are cleared
    /// and reserved before filling; a depth beyond the populated levels
    /// yields all levels, no padding. Pure read apart from the snapshot
    /// counter.
    pub fn get_snapshot(
        &self,
        depth: usize,
        out_bids: &mut Vec<BookLevel>,
        out_asks: &mut Vec<BookLevel>,
    ) {
        self.total_snapshots.set(self.total_snapshots.get() + 1);

        out_bids.clear();
        out_asks.clear();
        out_bids.reserve(depth.min(self.bids.len()));
        out_asks.reserve(depth.min(self.asks.len()));

        for (&Reverse(price), &level_key) in self.bids.iter().take(depth) {
            let level = self
                .levels
                .get(level_key)
                .expect("ladder references a vacant level slot");
            out_bids.push(BookLevel {
                price,
                total_quantity: level.total_quantity,
            });
        }

        for (&price, &level_key) in self.asks.iter().take(depth) {
            let level = self
                .levels
                .get(level_key)
                .expect("ladder references a vacant level slot");
            out_asks.push(BookLevel {
                price,
                total_quantity: level.total_quantity,
            });
        }
    }

    /// Lifetime counters plus a top-of-book summary
    pub fn stats(&self) -> BookStats {
        let (best_bid, best_ask) = self.best_prices();
        let spread = if self.bids.is_empty() || self.asks.is_empty() {
            0
        } else {
            best_ask as i64 - best_bid as i64
        };

        BookStats {
            total_adds: self.total_adds,
            total_cancels: self.total_cancels,
            total_amends: self.total_amends,
            total_snapshots: self.total_snapshots.get(),
            active_orders: self.order_index.len() as u64,
            bid_levels: self.bids.len(),
            ask_levels: self.asks.len(),
            best_bid,
            best_ask,
            spread,
        }
    }

    /// Check if an order is resting
    #[inline]
    pub fn contains_order(&self, order_id: u64) -> bool {
        self.order_index.contains_key(&order_id)
    }

    /// Get a resting order by id
    pub fn get_order(&self, order_id: u64) -> Option<&Order> {
        let key = *self.order_index.get(&order_id)?;
        self.orders.get(key).map(|node| &node.order)
    }

    /// Iterate one level's orders from head (oldest) to tail (newest)
    ///
    /// Yields nothing if no level rests at `price` on `side`.
    pub fn level_orders(&self, side: Side, price: u64) -> impl Iterator<Item = &Order> {
        let level_key = match side {
            Side::Buy => self.bids.get(&Reverse(price)).copied(),
            Side::Sell => self.asks.get(&price).copied(),
        };

        level_key
            .and_then(|k| self.levels.get(k))
            .into_iter()
            .flat_map(|level| level.iter(&self.orders))
            .map(|node| &node.order)
    }

    /// SHA-256 digest over the SSZ encoding of every resting order
    ///
    /// Orders are visited in ladder order: bids best to worst, then asks
    /// best to worst, FIFO within each level. Two books holding identical
    /// orders produce identical roots, which is what the determinism tests
    /// check.
    pub fn state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();

        for &level_key in self.bids.values() {
            self.hash_level(level_key, &mut hasher);
        }
        for &level_key in self.asks.values() {
            self.hash_level(level_key, &mut hasher);
        }

        let digest = hasher.finalize();
        let mut root = [0u8; 32];
        root.copy_from_slice(&digest);
        root
    }

    // ========================================================================
    // Internal plumbing
    // ========================================================================

    /// Insert a validated order: pool allocation, ladder linkage, indexing.
    fn link_order(&mut self, order: Order) {
        let order_id = order.id;
        let price = order.price;
        let side = order.side();

        let key = self.orders.insert(OrderNode::new(order));
        self.order_index.insert(order_id, key);

        let level_key = match side {
            Side::Buy => *self
                .bids
                .entry(Reverse(price))
                .or_insert_with(|| self.levels.insert(PriceLevel::new(price))),
            Side::Sell => *self
                .asks
                .entry(price)
                .or_insert_with(|| self.levels.insert(PriceLevel::new(price))),
        };

        let level = self
            .levels
            .get_mut(level_key)
            .expect("ladder references a vacant level slot");
        level.push_back(key, &mut self.orders);

        match side {
            Side::Buy => self.bid_count += 1,
            Side::Sell => self.ask_count += 1,
        }
    }

    /// Remove a resting order by slab key, collapsing its level if emptied.
    ///
    /// Returns the order so a price amend can reinsert it.
    fn unlink_order(&mut self, key: usize) -> Order {
        let node = self
            .orders
            .get(key)
            .expect("order index references a vacant slot");
        let order_id = node.order_id();
        let price = node.price();
        let side = node.order.side();

        let level_key = self.level_key(side, price);
        let level = self
            .levels
            .get_mut(level_key)
            .expect("ladder references a vacant level slot");
        level.remove(key, &mut self.orders);

        // Unlink the emptied level and return its slot to the pool
        if level.is_empty() {
            match side {
                Side::Buy => {
                    self.bids.remove(&Reverse(price));
                }
                Side::Sell => {
                    self.asks.remove(&price);
                }
            }
            self.levels.remove(level_key);
        }

        match side {
            Side::Buy => self.bid_count -= 1,
            Side::Sell => self.ask_count -= 1,
        }

        self.order_index.remove(&order_id);
        self.orders.remove(key).order
    }

    /// Level pool key for a price that must be resting on `side`.
    fn level_key(&self, side: Side, price: u64) -> usize {
        match side {
            Side::Buy => *self
                .bids
                .get(&Reverse(price))
                .expect("resting bid has no ladder level"),
            Side::Sell => *self
                .asks
                .get(&price)
                .expect("resting ask has no ladder level"),
        }
    }

    fn hash_level(&self, level_key: usize, hasher: &mut Sha256) {
        let level = self
            .levels
            .get(level_key)
            .expect("ladder references a vacant level slot");
        for node in level.iter(&self.orders) {
            let bytes = ssz_rs::serialize(&node.order)
                .expect("fixed-size order serialization is infallible");
            hasher.update(&bytes);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
