//! Test doubles for the node's outside dependencies.
//!
//! Wall time is the only one the control plane reads directly; everything
//! else it talks to (chain, peers, transaction relay, ban storage) already
//! sits behind a trait with an in-memory implementation next to the real one.

pub mod clock;

pub use clock::NullClock;
