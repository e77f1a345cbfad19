//! Cellular automata rules.
//!
//! For the notations of rule strings, please see
//! [this article on LifeWiki](https://conwaylife.com/wiki/Rulestring).

mod life;

pub use life::RuleSet;

/// The largest neighbor count in a Moore neighborhood.
///
/// Rule sets may contain larger counts, but they can never match.
pub const MAX_NEIGHBORS: u32 = 8;
