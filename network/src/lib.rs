//! Network policy for the Ember node.
//!
//! Owns the operator-managed ban list: parsing of IP/subnet text into
//! canonical CIDR form, the ban-list manager with clock-based expiry, the
//! storage seam used to persist bans across restarts, and the switch that
//! turns peer-to-peer activity on and off.

pub mod activity;
pub mod banlist;
pub mod error;
pub mod store;
pub mod subnet;

pub use activity::NetworkActivity;
pub use banlist::{BanEntry, BanList, BanListing};
pub use error::NetworkError;
pub use store::{BanStore, MemoryBanStore};
pub use subnet::parse_subnet;
