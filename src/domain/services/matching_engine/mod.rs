pub mod matching_engine;

/// Re-export key types for convenience
pub use self::matching_engine::{ArrayBook, HashBook, MatchResult, MatchingEngine, TreeBook};
