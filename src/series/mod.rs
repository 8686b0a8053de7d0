//! Table assembly: duplicate resolution, outer join, and date indexing.
//!
//! Flow: per-input rows → `merge` (dates parsed per input, joined on the date) → `index` (ascending).

pub mod duplicates;
pub mod index;
pub mod merge;

pub use duplicates::*;
pub use index::*;
pub use merge::*;
