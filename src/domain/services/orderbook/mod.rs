use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::types::{Price, Quantity};

pub mod depth;
pub mod index;
pub mod orderbook;
pub mod queue;

pub use self::depth::{DepthSnapshot, LevelSnapshot};
pub use self::index::{ArrayIndex, HashIndex, PriceIndex, TreeIndex};
pub use self::orderbook::OrderBook;
pub use self::queue::PriceQueue;

/// Errors that can occur during order book operations.
///
/// Every variant is a caller-visible precondition failure. Validation runs
/// before any state change, so a rejected operation leaves the book exactly
/// as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookError {
    /// The order price lies outside the book's configured tick range.
    #[error("price {price} outside valid range 0..={max_price}")]
    InvalidPrice { price: Price, max_price: Price },

    /// The order quantity is not strictly positive.
    #[error("invalid order quantity: {0}")]
    InvalidQuantity(Quantity),

    /// No resting order with the given identifier exists in the book.
    #[error("order {0} not found in the book")]
    UnknownOrderId(Uuid),

    /// A caller-supplied identifier collides with a resting order.
    #[error("order id {0} is already resting in the book")]
    DuplicateOrderId(Uuid),
}
