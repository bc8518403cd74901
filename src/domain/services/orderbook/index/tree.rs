use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use crate::domain::models::types::Price;
use crate::domain::services::orderbook::index::PriceIndex;
use crate::domain::services::orderbook::queue::PriceQueue;

/// A sparse price index backed by a balanced ordered map.
///
/// Levels are inserted on first order at a price and deleted immediately once
/// they drain, so the map only ever holds live levels and neighbour walks are
/// in-order lookups. This keeps every operation O(log n) in the number of
/// active levels, independent of the tick range, which suits very sparse
/// books over wide price ranges.
#[derive(Debug)]
pub struct TreeIndex {
    max_price: Price,
    levels: BTreeMap<Price, PriceQueue>,
}

impl PriceIndex for TreeIndex {
    fn with_max_price(max_price: Price) -> Self {
        Self {
            max_price,
            levels: BTreeMap::new(),
        }
    }

    #[inline]
    fn contains(&self, price: Price) -> bool {
        self.levels.get(&price).is_some_and(|queue| !queue.is_empty())
    }

    #[inline]
    fn level(&self, price: Price) -> Option<&PriceQueue> {
        self.levels.get(&price)
    }

    #[inline]
    fn level_mut(&mut self, price: Price) -> Option<&mut PriceQueue> {
        self.levels.get_mut(&price)
    }

    #[inline]
    fn ensure_level(&mut self, price: Price) -> &mut PriceQueue {
        self.levels.entry(price).or_insert_with(|| PriceQueue::new(price))
    }

    #[inline]
    fn remove_level(&mut self, price: Price) {
        self.levels.remove(&price);
    }

    fn next_above(&self, price: Price) -> Option<Price> {
        self.levels
            .range((Excluded(price), Unbounded))
            .find(|(p, queue)| **p <= self.max_price && !queue.is_empty())
            .map(|(p, _)| *p)
    }

    fn next_below(&self, price: Price) -> Option<Price> {
        self.levels
            .range((Unbounded, Excluded(price)))
            .rev()
            .find(|(_, queue)| !queue.is_empty())
            .map(|(p, _)| *p)
    }

    fn is_empty(&self) -> bool {
        self.levels.values().all(|queue| queue.is_empty())
    }

    fn live_levels(&self) -> usize {
        self.levels.values().filter(|queue| !queue.is_empty()).count()
    }
}
