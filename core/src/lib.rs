//! Lumen core: chat signal normalization and the insight-map engine.
//!
//! Everything here is synchronous and pure. Callers load records, hand them
//! to [`insight_map::build_insight_map`] and serialize the result.

pub mod cooccurrence;
pub mod error;
pub mod graph;
pub mod highlight;
pub mod insight_map;
pub mod numeric;
pub mod records;
pub mod signals;
pub mod synthesis;
pub mod window;
