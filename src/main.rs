use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tick_book::config::{Backend, ReplayConfig};
use tick_book::feed::{self, FeedEvent};
use tick_book::{ArrayIndex, HashIndex, MatchingEngine, Order, PriceIndex, Side, TreeIndex};

fn main() -> Result<()> {
    let config = ReplayConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match config.backend {
        Backend::Array => run::<ArrayIndex>(&config),
        Backend::Hash => run::<HashIndex>(&config),
        Backend::Tree => run::<TreeIndex>(&config),
    }
}

/// Counters for one replay run.
#[derive(Debug, Default)]
struct ReplayStats {
    submitted: usize,
    cancelled: usize,
    rejected: usize,
    unknown_cancels: usize,
    skipped: usize,
    matched: usize,
}

fn run<I: PriceIndex>(config: &ReplayConfig) -> Result<()> {
    let mut engine = MatchingEngine::<I>::new(&config.instrument, config.max_price);

    let events = match &config.feed {
        Some(path) => feed::load_events(path)
            .with_context(|| format!("failed to load feed {}", path.display()))?,
        None => demo_flow(),
    };

    let mut stats = ReplayStats::default();
    for event in events {
        match event {
            FeedEvent::Submit {
                order_ref,
                side,
                price,
                quantity,
                ..
            } => {
                // The sample format carries no trader column; the raw order
                // reference doubles as the trader id so matches stay traceable.
                let order = Order::with_id(
                    feed::order_uuid(order_ref),
                    order_ref,
                    side,
                    price,
                    quantity,
                );
                match engine.add(order) {
                    Ok(result) => {
                        stats.submitted += 1;
                        stats.matched += result.matches.len();
                    }
                    Err(error) => {
                        stats.rejected += 1;
                        tracing::warn!(%error, order_ref, "submission rejected");
                    }
                }
            }
            FeedEvent::Cancel { order_ref, .. } => {
                match engine.cancel(&feed::order_uuid(order_ref)) {
                    Ok(_) => stats.cancelled += 1,
                    Err(error) => {
                        // Cancels of orders submitted before the excerpt
                        // starts are expected with real feed samples.
                        stats.unknown_cancels += 1;
                        tracing::debug!(%error, order_ref, "cancel skipped");
                    }
                }
            }
            FeedEvent::Execution { .. } | FeedEvent::Halt { .. } => {
                stats.skipped += 1;
            }
        }
    }

    if config.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&engine.depth_snapshot(config.levels))?
        );
    } else {
        print_book(&engine, config.levels);
    }

    tracing::info!(
        submitted = stats.submitted,
        cancelled = stats.cancelled,
        rejected = stats.rejected,
        unknown_cancels = stats.unknown_cancels,
        skipped = stats.skipped,
        matches = stats.matched,
        resting = engine.open_orders(),
        "replay finished"
    );
    Ok(())
}

/// Renders the top of the book and the latest matches as aligned tables,
/// asks above bids so the ladder reads like a market display.
fn print_book<I: PriceIndex>(engine: &MatchingEngine<I>, levels: usize) {
    println!("Limit order book for {}", engine.book().name());

    println!("\nAsks (best last)");
    println!("{:>12} {:>12} {:>8}", "Price", "Quantity", "Orders");
    for row in engine.top_asks(levels).iter().rev() {
        println!("{:>12} {:>12} {:>8}", row.price, row.quantity, row.num_orders);
    }

    println!("\nBids (best first)");
    println!("{:>12} {:>12} {:>8}", "Price", "Quantity", "Orders");
    for row in engine.top_bids(levels) {
        println!("{:>12} {:>12} {:>8}", row.price, row.quantity, row.num_orders);
    }

    match (engine.best_bid(), engine.best_ask(), engine.spread()) {
        (Some(bid), Some(ask), Some(spread)) => {
            println!("\nBest bid {bid}, best ask {ask}, spread {spread}");
        }
        _ => println!("\nOne or both sides empty"),
    }

    println!("\nMatches (latest {levels})");
    println!(
        "{:>12} {:>12} {:>12} {:>12}",
        "Buyer", "Seller", "Price", "Quantity"
    );
    for m in engine.recent_matches(levels) {
        println!(
            "{:>12} {:>12} {:>12} {:>12}",
            m.buy_trader_id, m.sell_trader_id, m.price, m.quantity
        );
    }
}

/// A small scripted flow used when no feed file is given: a couple of
/// crossings, a residual rest and a cancel.
fn demo_flow() -> Vec<FeedEvent> {
    let submit = |order_ref, side, price, quantity| FeedEvent::Submit {
        time: 0.0,
        order_ref,
        side,
        price,
        quantity,
    };
    vec![
        submit(1, Side::Sell, 10_100, 50),
        submit(2, Side::Sell, 10_050, 30),
        submit(3, Side::Buy, 10_000, 40),
        submit(4, Side::Buy, 10_075, 35),
        FeedEvent::Cancel {
            time: 0.0,
            order_ref: 1,
        },
        submit(5, Side::Sell, 10_025, 20),
    ]
}
