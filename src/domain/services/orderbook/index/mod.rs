//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the price index contract and its three interchangeable
// back-ends. A price index maps integer tick prices to FIFO queues of resting
// orders; the matching engine is generic over this contract, so the crossing
// algorithm is identical for all back-ends.
//
// | Back-end     | Lookup        | Neighbour walk           | Memory            |
// |--------------|---------------|--------------------------|-------------------|
// | ArrayIndex   | O(1)          | O(k) scan through gaps   | one slot per tick |
// | HashIndex    | expected O(1) | O(k) membership retests  | active levels     |
// | TreeIndex    | O(log n)      | O(log n) in-order        | active levels     |
//--------------------------------------------------------------------------------------------------

mod array;
mod hash;
mod tree;

pub use self::array::ArrayIndex;
pub use self::hash::HashIndex;
pub use self::tree::TreeIndex;

use crate::domain::models::types::Price;
use crate::domain::services::orderbook::queue::PriceQueue;

/// The contract shared by all price-level indexes.
///
/// A level is *live* when it holds at least one resting order. The neighbour
/// walks ([`PriceIndex::next_above`], [`PriceIndex::next_below`]) only ever
/// yield live levels; how expensive that walk is depends on the back-end.
///
/// All prices passed to these methods must lie within `0..=max_price` as
/// configured at construction. The book state validates submissions before
/// touching the index.
pub trait PriceIndex {
    /// Creates an index covering tick prices `0..=max_price`.
    fn with_max_price(max_price: Price) -> Self;

    /// Returns true if a live (non-empty) level exists at this price.
    fn contains(&self, price: Price) -> bool;

    /// Returns the queue at this price, if one is stored.
    ///
    /// For the array back-end this may be an empty queue; use
    /// [`PriceIndex::contains`] to test for liveness.
    fn level(&self, price: Price) -> Option<&PriceQueue>;

    /// Returns a mutable reference to the queue at this price, if one is stored.
    fn level_mut(&mut self, price: Price) -> Option<&mut PriceQueue>;

    /// Returns the queue at this price, creating an empty one on demand where
    /// the back-end allocates lazily.
    fn ensure_level(&mut self, price: Price) -> &mut PriceQueue;

    /// Releases the level at this price once it has drained.
    ///
    /// Sparse back-ends delete the entry; the array back-end keeps its
    /// (empty) slot, since its storage is fixed at construction.
    fn remove_level(&mut self, price: Price);

    /// Returns the lowest live level strictly above `price`, if any.
    fn next_above(&self, price: Price) -> Option<Price>;

    /// Returns the highest live level strictly below `price`, if any.
    fn next_below(&self, price: Price) -> Option<Price>;

    /// Returns true if the index holds no resting orders at any price.
    fn is_empty(&self) -> bool;

    /// Number of live levels. O(levels) for the array back-end; used for
    /// diagnostics, not in the matching path.
    fn live_levels(&self) -> usize;
}
