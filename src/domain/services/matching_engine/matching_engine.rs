//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the core matching engine: validation of incoming
// limit orders, the price-time priority crossing loop, residual resting,
// cancellation and the read-only book observers.
//
// The engine is generic over the price index back-end, so the algorithm below
// is byte-for-byte identical for the dense array, hash map and ordered tree
// books. For any sequence of valid operations the three back-ends produce the
// same match stream and the same resting liquidity.
//
// | Name            | Description                                     | Key Methods          |
// |-----------------|-------------------------------------------------|----------------------|
// | MatchingEngine  | Crossing algorithm over a pluggable book        | add                  |
// |                 |                                                 | cancel               |
// |                 |                                                 | recent_matches       |
// | MatchResult     | Matches and residual produced by one submission |                      |
//--------------------------------------------------------------------------------------------------

use uuid::Uuid;

use crate::domain::models::types::{Match, Order, Price, Quantity, Side, TraderId};
use crate::domain::services::orderbook::depth::{DepthSnapshot, LevelSnapshot};
use crate::domain::services::orderbook::index::{ArrayIndex, HashIndex, PriceIndex, TreeIndex};
use crate::domain::services::orderbook::orderbook::OrderBook;
use crate::domain::services::orderbook::BookError;

/// A matching engine over the dense array book. Best for dense books with a
/// small tick range.
pub type ArrayBook = MatchingEngine<ArrayIndex>;

/// A matching engine over the hash map book. Best for moderately sparse books
/// when the tick range is large.
pub type HashBook = MatchingEngine<HashIndex>;

/// A matching engine over the ordered tree book. Best for very sparse books
/// over wide price ranges.
pub type TreeBook = MatchingEngine<TreeIndex>;

/// The outcome of a single submission: the matches it generated, in
/// execution order, and the id of the residual order if any quantity rested.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// Matches generated by this submission, in execution order.
    pub matches: Vec<Match>,
    /// Id of the incoming order if a residual was enqueued as resting
    /// liquidity, `None` if it was fully consumed.
    pub resting: Option<Uuid>,
}

/// The core matching engine for a single instrument.
///
/// # Price-time priority
///
/// An incoming buy is crossed against the ask side from the best (lowest)
/// price upward while it remains marketable; within a level, resting orders
/// are consumed strictly in arrival order. Sells are handled symmetrically
/// against the bid side. Matches always execute at the resting order's
/// price, so any price improvement accrues to the aggressor.
///
/// # Concurrency
///
/// One engine owns one book and is driven from a single thread. Every public
/// operation runs to completion with no suspension points; multi-book
/// deployments place one engine per thread and share nothing.
#[derive(Debug)]
pub struct MatchingEngine<I: PriceIndex> {
    /// The book state this engine is managing.
    book: OrderBook<I>,
    /// Append-only log of every match, in execution order.
    matches: Vec<Match>,
}

impl<I: PriceIndex> MatchingEngine<I> {
    /// Creates an engine with an empty book for the given instrument,
    /// covering tick prices `0..=max_price`.
    pub fn new(name: &str, max_price: Price) -> Self {
        Self {
            book: OrderBook::new(name, max_price),
            matches: Vec::new(),
        }
    }

    /// Submits a fresh limit order.
    ///
    /// The order is first validated; a rejected submission leaves the book
    /// untouched. It is then crossed against the opposite side while it
    /// remains marketable, and any residual quantity is enqueued as resting
    /// liquidity at its limit price.
    ///
    /// # Errors
    ///
    /// * [`BookError::InvalidPrice`] if the price is outside `0..=max_price`
    /// * [`BookError::InvalidQuantity`] if the quantity is zero
    /// * [`BookError::DuplicateOrderId`] if the id collides with a resting order
    pub fn add(&mut self, order: Order) -> Result<MatchResult, BookError> {
        self.validate(&order)?;
        tracing::debug!(
            instrument = %self.book.name(),
            order_id = %order.id,
            side = %order.side,
            price = order.price,
            quantity = order.quantity,
            "order accepted"
        );
        Ok(self.cross_and_rest(order))
    }

    /// Cancels the resting order with the given id, removing it from its
    /// price queue and the id lookup.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::UnknownOrderId`] if no resting order carries this
    /// id. The book is left unchanged in that case.
    pub fn cancel(&mut self, order_id: &Uuid) -> Result<Order, BookError> {
        let order = self.book.remove(order_id)?;
        tracing::debug!(
            instrument = %self.book.name(),
            order_id = %order_id,
            side = %order.side,
            price = order.price,
            quantity = order.quantity,
            "order cancelled"
        );
        Ok(order)
    }

    /// Crosses an incoming order against the opposite side and rests the
    /// residual, appending every generated match to the log.
    fn cross_and_rest(&mut self, mut order: Order) -> MatchResult {
        let taker_side = order.side;
        let maker_side = taker_side.opposite();
        let mut emitted: Vec<Match> = Vec::new();

        while order.quantity > 0 {
            // Raw best tick of the maker side. The empty-side sentinels are
            // out of range, so the crossing test below also covers the
            // empty-book case.
            let best = match maker_side {
                Side::Buy => self.book.best_bid_tick(),
                Side::Sell => self.book.best_ask_tick(),
            };
            let crosses = match taker_side {
                Side::Buy => order.price >= best,
                Side::Sell => order.price <= best,
            };
            if !crosses {
                break;
            }

            let head_quantity = match self.book.level_front(maker_side, best) {
                Some(head) => head.quantity,
                None => {
                    // The cached best points at a dead level (possible after
                    // cancellations in the lazy back-ends); step past it and
                    // retest the cross.
                    self.book.advance_best(maker_side);
                    continue;
                }
            };

            if head_quantity <= order.quantity {
                // The resting order is fully consumed and leaves the book.
                if let Some(filled) = self.book.pop_level_front(maker_side, best) {
                    order.quantity -= filled.quantity;
                    emitted.push(self.execute(
                        taker_side,
                        &order,
                        filled.trader_id,
                        filled.price,
                        filled.quantity,
                    ));
                }
            } else {
                // The resting order outsizes the incoming one. Decrement it
                // in place so it keeps its time priority.
                let fill = order.quantity;
                let maker = match self.book.level_front_mut(maker_side, best) {
                    Some(head) => {
                        head.quantity -= fill;
                        (head.trader_id, head.price)
                    }
                    None => {
                        self.book.advance_best(maker_side);
                        continue;
                    }
                };
                order.quantity = 0;
                emitted.push(self.execute(taker_side, &order, maker.0, maker.1, fill));
            }

            // Exhausted the whole level: release it and move the best price
            // past it (in-order neighbour for the tree, upward/downward scan
            // for array and hash).
            if self.book.level_is_empty(maker_side, best) {
                self.book.advance_best(maker_side);
            }
        }

        let resting = if order.quantity > 0 {
            let id = order.id;
            self.book.rest_order(order);
            Some(id)
        } else {
            None
        };

        MatchResult {
            matches: emitted,
            resting,
        }
    }

    /// Records one execution: builds the match with the taker mapped to its
    /// side, appends it to the log and returns it.
    fn execute(
        &mut self,
        taker_side: Side,
        taker: &Order,
        maker_trader: TraderId,
        price: Price,
        quantity: Quantity,
    ) -> Match {
        let executed = match taker_side {
            Side::Buy => Match::new(taker.trader_id, maker_trader, price, quantity),
            Side::Sell => Match::new(maker_trader, taker.trader_id, price, quantity),
        };
        tracing::debug!(
            instrument = %self.book.name(),
            buy_trader = executed.buy_trader_id,
            sell_trader = executed.sell_trader_id,
            price = executed.price,
            quantity = executed.quantity,
            "match executed"
        );
        self.matches.push(executed.clone());
        executed
    }

    /// Validates a submission without touching any state.
    fn validate(&self, order: &Order) -> Result<(), BookError> {
        if order.price < 0 || order.price > self.book.max_price() {
            return Err(BookError::InvalidPrice {
                price: order.price,
                max_price: self.book.max_price(),
            });
        }
        if order.quantity == 0 {
            return Err(BookError::InvalidQuantity(order.quantity));
        }
        if self.book.contains_order(&order.id) {
            return Err(BookError::DuplicateOrderId(order.id));
        }
        Ok(())
    }

    /// Returns the best bid price, or `None` if no bids rest.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.book.best_bid()
    }

    /// Returns the best ask price, or `None` if no asks rest.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.book.best_ask()
    }

    /// Returns the spread when both sides have resting liquidity.
    #[inline]
    pub fn spread(&self) -> Option<Price> {
        self.book.spread()
    }

    /// Returns up to `levels` aggregated bid rows, best first.
    pub fn top_bids(&self, levels: usize) -> Vec<LevelSnapshot> {
        self.book.top_bids(levels)
    }

    /// Returns up to `levels` aggregated ask rows, best first.
    pub fn top_asks(&self, levels: usize) -> Vec<LevelSnapshot> {
        self.book.top_asks(levels)
    }

    /// Captures a timestamped two-sided depth snapshot.
    pub fn depth_snapshot(&self, levels: usize) -> DepthSnapshot {
        self.book.depth_snapshot(levels)
    }

    /// The full execution log, oldest first.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// The most recent `n` matches, oldest of those first.
    pub fn recent_matches(&self, n: usize) -> &[Match] {
        let start = self.matches.len().saturating_sub(n);
        &self.matches[start..]
    }

    /// Looks up a resting order by id.
    pub fn order(&self, order_id: &Uuid) -> Option<&Order> {
        self.book.order(order_id)
    }

    /// Number of resting orders across both sides.
    pub fn open_orders(&self) -> usize {
        self.book.open_orders()
    }

    /// Read access to the underlying book state.
    pub fn book(&self) -> &OrderBook<I> {
        &self.book
    }
}
