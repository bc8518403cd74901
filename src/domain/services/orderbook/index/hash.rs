use std::collections::HashMap;

use crate::domain::models::types::Price;
use crate::domain::services::orderbook::index::PriceIndex;
use crate::domain::services::orderbook::queue::PriceQueue;

/// A sparse price index backed by a hash map.
///
/// Levels are created on first insertion at a price and deleted once they
/// drain, so memory tracks the number of active levels rather than the tick
/// range. The map has no ordered iteration, so neighbour walks step the price
/// by one tick and retest membership, exactly like the array back-end with
/// lazy allocation. That walk degenerates on books that are sparse within a
/// wide active range; prefer the tree back-end there.
#[derive(Debug)]
pub struct HashIndex {
    max_price: Price,
    levels: HashMap<Price, PriceQueue>,
}

impl PriceIndex for HashIndex {
    fn with_max_price(max_price: Price) -> Self {
        Self {
            max_price,
            levels: HashMap::new(),
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
        ((price + 1)..=self.max_price).find(|p| self.contains(*p))
    }

    fn next_below(&self, price: Price) -> Option<Price> {
        (0..price.min(self.max_price + 1))
            .rev()
            .find(|p| self.contains(*p))
    }

    fn is_empty(&self) -> bool {
        self.levels.values().all(|queue| queue.is_empty())
    }

    fn live_levels(&self) -> usize {
        self.levels.values().filter(|queue| !queue.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::types::{Order, Side};

    fn seed(index: &mut HashIndex, price: Price) {
        index
            .ensure_level(price)
            .push_back(Order::new(1, Side::Buy, price, 10));
    }

    #[test]
    fn test_levels_created_on_demand() {
        let mut index = HashIndex::with_max_price(100);
        assert!(index.level(50).is_none());
        assert!(index.is_empty());

        seed(&mut index, 50);
        assert!(index.contains(50));
        assert_eq!(index.level(50).unwrap().price(), 50);
        assert_eq!(index.live_levels(), 1);
    }

    #[test]
    fn test_remove_level_drops_entry() {
        let mut index = HashIndex::with_max_price(100);
        seed(&mut index, 50);
        index.remove_level(50);

        assert!(index.level(50).is_none());
        assert!(!index.contains(50));
        assert!(index.is_empty());
    }

    #[test]
    fn test_neighbour_walks_by_membership() {
        let mut index = HashIndex::with_max_price(100);
        seed(&mut index, 5);
        seed(&mut index, 60);

        assert_eq!(index.next_above(5), Some(60));
        assert_eq!(index.next_above(60), None);
        assert_eq!(index.next_below(60), Some(5));
        assert_eq!(index.next_below(5), None);
    }

    #[test]
    fn test_boundary_prices() {
        let mut index = HashIndex::with_max_price(100);
        seed(&mut index, 0);
        seed(&mut index, 100);

        assert_eq!(index.next_above(0), Some(100));
        assert_eq!(index.next_below(100), Some(0));
    }
}
