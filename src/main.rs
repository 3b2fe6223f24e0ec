//! lobcore - Binary Entry Point
//!
//! Small demonstration driver for the order book library.

use lobcore::types::price::{from_fixed_trimmed, to_fixed};
use lobcore::{Order, OrderBook, Side};

fn main() {
    println!("===========================================");
    println!("  lobcore - limit order book core");
    println!("===========================================");
    println!();

    let mut book = OrderBook::with_capacity(1_000);

    // Market makers seed both sides
    println!("Seeding the book...");
    book.add(Order::new(1, Side::Buy, to_fixed("99.95").unwrap(), 1_000, 1));
    book.add(Order::new(2, Side::Buy, to_fixed("99.90").unwrap(), 2_000, 2));
    book.add(Order::new(3, Side::Sell, to_fixed("100.05").unwrap(), 1_000, 3));
    book.add(Order::new(4, Side::Sell, to_fixed("100.10").unwrap(), 2_000, 4));

    let (bid, ask) = book.best_prices();
    println!(
        "Top of book: {} / {}",
        from_fixed_trimmed(bid),
        from_fixed_trimmed(ask)
    );

    // Quantity amend keeps queue position; price amend does not
    book.amend(1, to_fixed("99.95").unwrap(), 1_500);
    book.amend(2, to_fixed("99.97").unwrap(), 2_000);

    let mut bids = Vec::new();
    let mut asks = Vec::new();
    book.get_snapshot(5, &mut bids, &mut asks);

    println!();
    println!("Depth snapshot:");
    for level in &asks {
        println!("  ask {} x {}", from_fixed_trimmed(level.price), level.total_quantity);
    }
    for level in &bids {
        println!("  bid {} x {}", from_fixed_trimmed(level.price), level.total_quantity);
    }

    book.cancel(4);

    let stats = book.stats();
    println!();
    println!("Stats:");
    println!("  adds:       {}", stats.total_adds);
    println!("  cancels:    {}", stats.total_cancels);
    println!("  amends:     {}", stats.total_amends);
    println!("  active:     {}", stats.active_orders);
    println!("  crossable:  {}", book.can_match());
}
