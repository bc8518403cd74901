//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the core value types used throughout the matching engine:
// resting limit orders, executed match records and the integer tick aliases.
//
// | Section            | Description                                                      |
// |--------------------|------------------------------------------------------------------|
// | ALIASES            | Integer tick types (Price, Quantity, TraderId).                  |
// | ENUMS              | Side of an order (Buy/Sell).                                     |
// | STRUCTS            | Order and Match records.                                         |
// | TESTS              | Unit tests for the defined types.                                |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Price in integer ticks. Valid book prices are non-negative; the signed
/// representation leaves room for the out-of-range empty-bid sentinel used
/// inside the book state.
pub type Price = i64;

/// Order quantity in integer units. A resting order always has a strictly
/// positive quantity.
pub type Quantity = u64;

/// Identifier of the trader who submitted an order.
pub type TraderId = u64;

/// Represents the side of an order (Buy or Sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// A buy order, resting on the bid side of the book.
    Buy,
    /// A sell order, resting on the ask side of the book.
    Sell,
}

impl Side {
    /// Returns the opposite side, i.e. the side an incoming order matches against.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

/// A plain resting limit order.
///
/// Two orders are considered equal iff their identifiers are equal; all other
/// fields are mutable book state (the matching engine decrements `quantity`
/// in place on partial fills) and do not participate in equality.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique identifier for the order. Generated when not supplied by the caller.
    pub id: Uuid,
    /// Identifier of the submitting trader.
    pub trader_id: TraderId,
    /// Side of the order (Buy or Sell).
    pub side: Side,
    /// Limit price in ticks.
    pub price: Price,
    /// Remaining quantity. Strictly positive for any resting order.
    pub quantity: Quantity,
}

impl Order {
    /// Creates a new limit order with an engine-generated identifier.
    pub fn new(trader_id: TraderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Self::with_id(Uuid::new_v4(), trader_id, side, price, quantity)
    }

    /// Creates a new limit order with a caller-supplied identifier.
    pub fn with_id(
        id: Uuid,
        trader_id: TraderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            id,
            trader_id,
            side,
            price,
            quantity,
        }
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Order {}

/// Represents a completed match between a buy and a sell order.
///
/// Immutable once produced; the book appends matches to its execution log in
/// the exact order they were generated by the matching loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// Unique identifier for the match.
    pub id: Uuid,
    /// Trader on the buy side of the execution.
    pub buy_trader_id: TraderId,
    /// Trader on the sell side of the execution.
    pub sell_trader_id: TraderId,
    /// Execution price in ticks. Always the resting (maker) order's price.
    pub price: Price,
    /// Executed quantity.
    pub quantity: Quantity,
    /// Timestamp of the execution.
    pub executed_at: DateTime<Utc>,
}

impl Match {
    /// Creates a new match record with a generated identifier.
    pub fn new(
        buy_trader_id: TraderId,
        sell_trader_id: TraderId,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            buy_trader_id,
            sell_trader_id,
            price,
            quantity,
            executed_at: Utc::now(),
        }
    }
}

impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Match {}
