use crate::domain::models::types::Price;
use crate::domain::services::orderbook::index::PriceIndex;
use crate::domain::services::orderbook::queue::PriceQueue;

/// A dense price index: one pre-allocated queue per integer tick.
///
/// All queues are created at construction and never released, so lookups are
/// a single array access. Neighbour walks scan linearly through empty slots,
/// which is cheap when the book is dense within its active range. Memory is
/// proportional to `max_price` regardless of how many levels are live, making
/// this the back-end of choice for small tick ranges.
#[derive(Debug)]
pub struct ArrayIndex {
    max_price: Price,
    /// One slot per price in `0..=max_price`.
    slots: Vec<PriceQueue>,
}

impl PriceIndex for ArrayIndex {
    fn with_max_price(max_price: Price) -> Self {
        let slots = (0..=max_price).map(PriceQueue::new).collect();
        Self { max_price, slots }
    }

    #[inline]
    fn contains(&self, price: Price) -> bool {
        self.level(price).is_some_and(|queue| !queue.is_empty())
    }

    #[inline]
    fn level(&self, price: Price) -> Option<&PriceQueue> {
        if (0..=self.max_price).contains(&price) {
            self.slots.get(price as usize)
        } else {
            None
        }
    }

    #[inline]
    fn level_mut(&mut self, price: Price) -> Option<&mut PriceQueue> {
        if (0..=self.max_price).contains(&price) {
            self.slots.get_mut(price as usize)
        } else {
            None
        }
    }

    #[inline]
    fn ensure_level(&mut self, price: Price) -> &mut PriceQueue {
        &mut self.slots[price as usize]
    }

    #[inline]
    fn remove_level(&mut self, _price: Price) {
        // Slots are fixed at construction; a drained level simply stays empty
        // and the neighbour walks skip over it.
    }

    fn next_above(&self, price: Price) -> Option<Price> {
        ((price + 1)..=self.max_price).find(|&p| !self.slots[p as usize].is_empty())
    }

    fn next_below(&self, price: Price) -> Option<Price> {
        (0..price.min(self.max_price + 1))
            .rev()
            .find(|&p| !self.slots[p as usize].is_empty())
    }

    fn is_empty(&self) -> bool {
        self.slots.iter().all(|queue| queue.is_empty())
    }

    fn live_levels(&self) -> usize {
        self.slots.iter().filter(|queue| !queue.is_empty()).count()
    }
}
