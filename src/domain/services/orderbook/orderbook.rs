//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the book state for a single trading instrument: two
// price indexes (bids and asks), an id lookup covering every resting order,
// cached best-bid/best-ask prices and the aggregated depth views.
//
// The book is generic over the price index back-end, so the same state logic
// serves the dense array, hash map and ordered tree indexes.
//
// | Name          | Description                                        | Key Methods              |
// |---------------|----------------------------------------------------|--------------------------|
// | OrderBook     | Book state over a pluggable price index            | rest_order               |
// |               |                                                    | remove                   |
// |               |                                                    | best_bid / best_ask      |
// |               |                                                    | top_bids / top_asks      |
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::models::types::{Order, Price, Quantity, Side};
use crate::domain::services::orderbook::depth::{DepthSnapshot, LevelSnapshot};
use crate::domain::services::orderbook::index::PriceIndex;
use crate::domain::services::orderbook::BookError;

/// Internal sentinel for an empty bid side. Out of range, so it can never
/// collide with the valid price 0.
const EMPTY_BID: Price = -1;

/// The book state: resting liquidity for one instrument, organized as two
/// price indexes plus an id lookup for every resting order.
///
/// Best prices are cached as raw ticks using out-of-range sentinels
/// (`-1` for an empty bid side, `max_price + 1` for an empty ask side); the
/// public accessors translate those to `Option`. The cache is corrected
/// eagerly whenever a removal drains the level it points at, so between
/// operations it always references a live level or a sentinel.
#[derive(Debug)]
pub struct OrderBook<I: PriceIndex> {
    /// Name of the instrument this book manages.
    name: String,
    /// Highest permissible tick price.
    max_price: Price,
    /// Bid side levels.
    bids: I,
    /// Ask side levels.
    asks: I,
    /// Location of every resting order, keyed by id.
    orders: HashMap<Uuid, (Side, Price)>,
    /// Cached best bid tick, `EMPTY_BID` when no bids rest.
    best_bid: Price,
    /// Cached best ask tick, `max_price + 1` when no asks rest.
    best_ask: Price,
}

impl<I: PriceIndex> OrderBook<I> {
    /// Creates an empty book for the given instrument covering tick prices
    /// `0..=max_price`.
    pub fn new(name: &str, max_price: Price) -> Self {
        Self {
            name: name.to_string(),
            max_price,
            bids: I::with_max_price(max_price),
            asks: I::with_max_price(max_price),
            orders: HashMap::new(),
            best_bid: EMPTY_BID,
            best_ask: max_price + 1,
        }
    }

    /// The instrument name this book manages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The highest permissible tick price.
    #[inline]
    pub fn max_price(&self) -> Price {
        self.max_price
    }

    /// Returns the best bid price, or `None` if no bids rest.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        (self.best_bid >= 0).then_some(self.best_bid)
    }

    /// Returns the best ask price, or `None` if no asks rest.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        (self.best_ask <= self.max_price).then_some(self.best_ask)
    }

    /// Returns the spread (best ask minus best bid) when both sides have
    /// resting liquidity.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_ask(), self.best_bid()) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Raw best bid tick including the empty-side sentinel. The matching loop
    /// compares incoming prices against this directly.
    #[inline]
    pub(crate) fn best_bid_tick(&self) -> Price {
        self.best_bid
    }

    /// Raw best ask tick including the empty-side sentinel.
    #[inline]
    pub(crate) fn best_ask_tick(&self) -> Price {
        self.best_ask
    }

    /// Number of resting orders across both sides.
    pub fn open_orders(&self) -> usize {
        self.orders.len()
    }

    /// Returns true if an order with this id is resting in the book.
    pub fn contains_order(&self, order_id: &Uuid) -> bool {
        self.orders.contains_key(order_id)
    }

    /// Looks up a resting order by id.
    ///
    /// The id map stores the order's location; the order itself lives in its
    /// price queue, so this walks that queue to the entry.
    pub fn order(&self, order_id: &Uuid) -> Option<&Order> {
        let (side, price) = *self.orders.get(order_id)?;
        self.index(side)
            .level(price)?
            .iter()
            .find(|order| order.id == *order_id)
    }

    /// Total resting quantity at a price level, zero if the level is empty.
    pub fn volume_at_price(&self, side: Side, price: Price) -> Quantity {
        self.index(side)
            .level(price)
            .map_or(0, |queue| queue.total_quantity())
    }

    /// Number of resting orders at a price level.
    pub fn order_count_at_price(&self, side: Side, price: Price) -> usize {
        self.index(side).level(price).map_or(0, |queue| queue.len())
    }

    /// Number of live bid levels.
    pub fn bid_levels(&self) -> usize {
        self.bids.live_levels()
    }

    /// Number of live ask levels.
    pub fn ask_levels(&self) -> usize {
        self.asks.live_levels()
    }

    /// Enqueues a validated order as resting liquidity on its own side,
    /// registers it in the id map and improves the cached best if the new
    /// level is better.
    pub(crate) fn rest_order(&mut self, order: Order) {
        let side = order.side;
        let price = order.price;
        let id = order.id;

        self.index_mut(side).ensure_level(price).push_back(order);
        self.orders.insert(id, (side, price));

        match side {
            Side::Buy if price > self.best_bid => self.best_bid = price,
            Side::Sell if price < self.best_ask => self.best_ask = price,
            _ => {}
        }

        tracing::trace!(
            instrument = %self.name,
            order_id = %id,
            %side,
            price,
            "order rested"
        );
    }

    /// Removes a resting order from the book (the cancellation path).
    ///
    /// The order is unlinked from its price queue and deleted from the id
    /// map. If that drains the level, the level is released and a cached best
    /// pointing at it is moved to the next live level immediately.
    pub fn remove(&mut self, order_id: &Uuid) -> Result<Order, BookError> {
        let (side, price) = *self
            .orders
            .get(order_id)
            .ok_or(BookError::UnknownOrderId(*order_id))?;

        let index = self.index_mut(side);
        let Some(queue) = index.level_mut(price) else {
            return Err(BookError::UnknownOrderId(*order_id));
        };
        let Some(order) = queue.remove(order_id) else {
            return Err(BookError::UnknownOrderId(*order_id));
        };
        let drained = queue.is_empty();
        if drained {
            index.remove_level(price);
        }

        self.orders.remove(order_id);
        if drained {
            self.refresh_best_after_drain(side, price);
        }

        tracing::trace!(
            instrument = %self.name,
            order_id = %order_id,
            %side,
            price,
            "order removed"
        );
        Ok(order)
    }

    /// Returns the head order of the queue at this price.
    pub(crate) fn level_front(&self, side: Side, price: Price) -> Option<&Order> {
        self.index(side).level(price)?.front()
    }

    /// Returns a mutable reference to the head order of the queue at this
    /// price, for in-place partial fills.
    pub(crate) fn level_front_mut(&mut self, side: Side, price: Price) -> Option<&mut Order> {
        self.index_mut(side).level_mut(price)?.front_mut()
    }

    /// Pops the head order of the queue at this price and drops it from the
    /// id map.
    pub(crate) fn pop_level_front(&mut self, side: Side, price: Price) -> Option<Order> {
        let order = self.index_mut(side).level_mut(price)?.pop_front()?;
        self.orders.remove(&order.id);
        Some(order)
    }

    /// Returns true if no live level exists at this price.
    pub(crate) fn level_is_empty(&self, side: Side, price: Price) -> bool {
        !self.index(side).contains(price)
    }

    /// Moves the cached best of a side past its current (exhausted) level to
    /// the next live one, releasing the exhausted level from the index.
    ///
    /// No-op when the side is already empty.
    pub(crate) fn advance_best(&mut self, side: Side) {
        match side {
            Side::Buy => {
                let current = self.best_bid;
                if current < 0 {
                    return;
                }
                self.bids.remove_level(current);
                self.best_bid = self.bids.next_below(current).unwrap_or(EMPTY_BID);
            }
            Side::Sell => {
                let current = self.best_ask;
                if current > self.max_price {
                    return;
                }
                self.asks.remove_level(current);
                self.best_ask = self.asks.next_above(current).unwrap_or(self.max_price + 1);
            }
        }
    }

    /// Returns up to `levels` aggregated bid rows, walking from the best bid
    /// toward worse prices over live levels only.
    pub fn top_bids(&self, levels: usize) -> Vec<LevelSnapshot> {
        let mut rows = Vec::with_capacity(levels.min(self.bids.live_levels()));
        let mut cursor = self.best_bid();
        while let Some(price) = cursor {
            if rows.len() == levels {
                break;
            }
            if let Some(queue) = self.bids.level(price) {
                if !queue.is_empty() {
                    rows.push(queue.aggregate());
                }
            }
            cursor = self.bids.next_below(price);
        }
        rows
    }

    /// Returns up to `levels` aggregated ask rows, walking from the best ask
    /// toward worse prices over live levels only.
    pub fn top_asks(&self, levels: usize) -> Vec<LevelSnapshot> {
        let mut rows = Vec::with_capacity(levels.min(self.asks.live_levels()));
        let mut cursor = self.best_ask();
        while let Some(price) = cursor {
            if rows.len() == levels {
                break;
            }
            if let Some(queue) = self.asks.level(price) {
                if !queue.is_empty() {
                    rows.push(queue.aggregate());
                }
            }
            cursor = self.asks.next_above(price);
        }
        rows
    }

    /// Captures a timestamped two-sided depth snapshot limited to `levels`
    /// rows per side.
    pub fn depth_snapshot(&self, levels: usize) -> DepthSnapshot {
        DepthSnapshot::new(&self.name, self.top_bids(levels), self.top_asks(levels))
    }

    #[inline]
    fn index(&self, side: Side) -> &I {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline]
    fn index_mut(&mut self, side: Side) -> &mut I {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Refreshes the cached best of a side after the level at `price`
    /// drained, walking to the next live level or the empty sentinel.
    fn refresh_best_after_drain(&mut self, side: Side, price: Price) {
        match side {
            Side::Buy if price == self.best_bid => {
                self.best_bid = self.bids.next_below(price).unwrap_or(EMPTY_BID);
            }
            Side::Sell if price == self.best_ask => {
                self.best_ask = self.asks.next_above(price).unwrap_or(self.max_price + 1);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::orderbook::index::{ArrayIndex, HashIndex, TreeIndex};

    fn buy(trader_id: u64, price: Price, quantity: Quantity) -> Order {
        Order::new(trader_id, Side::Buy, price, quantity)
    }

    fn sell(trader_id: u64, price: Price, quantity: Quantity) -> Order {
        Order::new(trader_id, Side::Sell, price, quantity)
    }

    #[test]
    fn test_empty_book() {
        let book = OrderBook::<TreeIndex>::new("TEST", 1_000);
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.best_ask(), None);
        assert_eq!(book.spread(), None);
        assert_eq!(book.open_orders(), 0);
        assert_eq!(book.volume_at_price(Side::Buy, 100), 0);
    }

    #[test]
    fn test_rest_updates_best_and_id_map() {
        let mut book = OrderBook::<TreeIndex>::new("TEST", 1_000);
        let order = buy(1, 100, 10);
        let id = order.id;
        book.rest_order(order);

        assert_eq!(book.best_bid(), Some(100));
        assert_eq!(book.best_ask(), None);
        assert!(book.contains_order(&id));
        assert_eq!(book.order(&id).unwrap().quantity, 10);
        assert_eq!(book.volume_at_price(Side::Buy, 100), 10);
    }

    #[test]
    fn test_best_only_improves() {
        let mut book = OrderBook::<TreeIndex>::new("TEST", 1_000);
        book.rest_order(buy(1, 100, 10));
        book.rest_order(buy(1, 99, 10));
        assert_eq!(book.best_bid(), Some(100));

        book.rest_order(sell(2, 105, 10));
        book.rest_order(sell(2, 104, 10));
        assert_eq!(book.best_ask(), Some(104));
        assert_eq!(book.spread(), Some(4));
    }

    #[test]
    fn test_remove_unknown_order() {
        let mut book = OrderBook::<TreeIndex>::new("TEST", 1_000);
        let missing = Uuid::new_v4();
        assert_eq!(
            book.remove(&missing),
            Err(BookError::UnknownOrderId(missing))
        );
    }

    #[test]
    fn test_remove_refreshes_best_eagerly() {
        let mut book = OrderBook::<TreeIndex>::new("TEST", 1_000);
        let best = sell(1, 100, 10);
        let best_id = best.id;
        book.rest_order(best);
        book.rest_order(sell(2, 103, 5));
        assert_eq!(book.best_ask(), Some(100));

        book.remove(&best_id).unwrap();
        assert_eq!(book.best_ask(), Some(103));
        assert!(!book.contains_order(&best_id));

        let top = book.top_asks(1)[0];
        assert_eq!(top.price, 103);
    }

    #[test]
    fn test_remove_last_order_empties_side() {
        let mut book = OrderBook::<HashIndex>::new("TEST", 1_000);
        let order = buy(1, 0, 10);
        let id = order.id;
        book.rest_order(order);
        assert_eq!(book.best_bid(), Some(0));

        book.remove(&id).unwrap();
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.open_orders(), 0);
    }

    #[test]
    fn test_remove_keeps_best_when_level_not_drained() {
        let mut book = OrderBook::<ArrayIndex>::new("TEST", 1_000);
        let first = sell(1, 100, 10);
        let first_id = first.id;
        book.rest_order(first);
        book.rest_order(sell(2, 100, 5));

        book.remove(&first_id).unwrap();
        assert_eq!(book.best_ask(), Some(100));
        assert_eq!(book.volume_at_price(Side::Sell, 100), 5);
    }

    #[test]
    fn test_pop_level_front_unregisters() {
        let mut book = OrderBook::<TreeIndex>::new("TEST", 1_000);
        let order = sell(1, 100, 10);
        let id = order.id;
        book.rest_order(order);

        let popped = book.pop_level_front(Side::Sell, 100).unwrap();
        assert_eq!(popped.id, id);
        assert!(!book.contains_order(&id));
    }

    #[test]
    fn test_advance_best_skips_to_next_live_level() {
        let mut book = OrderBook::<ArrayIndex>::new("TEST", 1_000);
        book.rest_order(sell(1, 100, 10));
        book.rest_order(sell(2, 140, 5));

        book.pop_level_front(Side::Sell, 100).unwrap();
        book.advance_best(Side::Sell);
        assert_eq!(book.best_ask(), Some(140));

        book.pop_level_front(Side::Sell, 140).unwrap();
        book.advance_best(Side::Sell);
        assert_eq!(book.best_ask(), None);

        // Advancing an empty side stays put.
        book.advance_best(Side::Sell);
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn test_top_walks_are_best_first() {
        let mut book = OrderBook::<TreeIndex>::new("TEST", 1_000);
        book.rest_order(buy(1, 95, 5));
        book.rest_order(buy(1, 99, 10));
        book.rest_order(buy(2, 99, 20));
        book.rest_order(sell(3, 101, 7));
        book.rest_order(sell(3, 110, 3));

        let bids = book.top_bids(10);
        assert_eq!(bids.len(), 2);
        assert_eq!(bids[0].price, 99);
        assert_eq!(bids[0].quantity, 30);
        assert_eq!(bids[0].num_orders, 2);
        assert_eq!(bids[1].price, 95);

        let asks = book.top_asks(1);
        assert_eq!(asks.len(), 1);
        assert_eq!(asks[0].price, 101);

        let snapshot = book.depth_snapshot(10);
        assert_eq!(snapshot.best_bid(), Some(99));
        assert_eq!(snapshot.best_ask(), Some(101));
        assert_eq!(snapshot.spread(), Some(2));
    }

    #[test]
    fn test_level_counts() {
        let mut book = OrderBook::<HashIndex>::new("TEST", 1_000);
        book.rest_order(buy(1, 95, 5));
        book.rest_order(buy(1, 99, 10));
        book.rest_order(sell(2, 101, 7));

        assert_eq!(book.bid_levels(), 2);
        assert_eq!(book.ask_levels(), 1);
        assert_eq!(book.order_count_at_price(Side::Buy, 99), 1);
    }
}
