//! Fundamental types for the Ember node.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! fixed-point monetary amounts, timestamps, the injectable clock, and network ids.

pub mod amount;
pub mod error;
pub mod network;
pub mod time;

pub use amount::{parse_fixed_point, Amount, COIN, DECIMALS, MAX_MONEY};
pub use error::AmountError;
pub use network::NetworkId;
pub use time::{Clock, SystemClock, Timestamp};
