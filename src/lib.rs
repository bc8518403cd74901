// Expose the modules
pub mod config;
pub mod domain;
pub mod feed;

// Re-export key types for easier usage
pub use domain::models::types::{Match, Order, Price, Quantity, Side, TraderId};
pub use domain::services::matching_engine::{
    ArrayBook, HashBook, MatchResult, MatchingEngine, TreeBook,
};
pub use domain::services::orderbook::{
    ArrayIndex, BookError, DepthSnapshot, HashIndex, LevelSnapshot, OrderBook, PriceIndex,
    PriceQueue, TreeIndex,
};
