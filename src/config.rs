use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::domain::models::types::Price;

/// Which price-index back-end drives the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Dense array of per-price queues: O(1) lookups, memory grows with the
    /// tick range.
    Array,
    /// Hash map of per-price queues: lazy allocation, tick-by-tick neighbour
    /// walks.
    Hash,
    /// Ordered tree of per-price queues: O(log n) everything, memory grows
    /// with active levels.
    Tree,
}

/// Replay a tabular limit order feed through the matching engine and print
/// the resulting book.
#[derive(Debug, Parser)]
#[command(name = "tick-book", version, about)]
pub struct ReplayConfig {
    /// Path to a feed file (Time,Type,OrderID,Size,Price,Direction rows).
    /// A small built-in demo flow is replayed when omitted.
    pub feed: Option<PathBuf>,

    /// Price index back-end to run the book on.
    #[arg(long, value_enum, default_value_t = Backend::Tree)]
    pub backend: Backend,

    /// Highest permissible tick price.
    #[arg(long, default_value_t = 1_000_000)]
    pub max_price: Price,

    /// Instrument name for the book.
    #[arg(long, default_value = "DEMO")]
    pub instrument: String,

    /// Number of price levels to show per side.
    #[arg(long, default_value_t = 10)]
    pub levels: usize,

    /// Emit the final depth snapshot as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}
