//! Shared utilities for the Ember node.

pub mod stats;
pub mod time;

pub use stats::{calculate_percentiles_by_weight, NUM_PERCENTILES, PERCENTILE_MARKS};
pub use time::format_duration;
