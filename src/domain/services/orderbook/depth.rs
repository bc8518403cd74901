//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the aggregated views of the order book: per-level snapshot
// rows and the combined two-sided depth snapshot handed to subscribers.
//
// | Name            | Description                                     | Key Methods        |
// |-----------------|-------------------------------------------------|--------------------|
// | LevelSnapshot   | Aggregated (price, quantity, order count) row   |                    |
// | DepthSnapshot   | Immutable two-sided top-of-book view            | best_bid, best_ask |
// |                 |                                                 | spread             |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::types::{Price, Quantity};

/// An aggregated price level: total resting quantity and number of orders at
/// one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    /// The price for this level.
    pub price: Price,
    /// Total resting quantity at this price.
    pub quantity: Quantity,
    /// Number of resting orders at this price.
    pub num_orders: usize,
}

/// An immutable snapshot of order book depth at a specific point in time.
///
/// Bid levels are ordered best-first (descending price), ask levels
/// best-first (ascending price). Only non-empty levels appear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthSnapshot {
    /// Name of the instrument this snapshot belongs to.
    pub instrument: String,
    /// Bid levels, best (highest) price first.
    pub bids: Vec<LevelSnapshot>,
    /// Ask levels, best (lowest) price first.
    pub asks: Vec<LevelSnapshot>,
    /// Timestamp when this snapshot was taken.
    pub captured_at: DateTime<Utc>,
}

impl DepthSnapshot {
    /// Creates a new depth snapshot stamped with the current time.
    pub fn new(instrument: &str, bids: Vec<LevelSnapshot>, asks: Vec<LevelSnapshot>) -> Self {
        Self {
            instrument: instrument.to_string(),
            bids,
            asks,
            captured_at: Utc::now(),
        }
    }

    /// Returns the best bid price, if any bids are present.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|level| level.price)
    }

    /// Returns the best ask price, if any asks are present.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|level| level.price)
    }

    /// Returns the spread (best ask minus best bid) when both sides are present.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_ask(), self.best_bid()) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }
}
