//! # dbconnect-cache
//!
//! A connection cache that observes connections without owning them.
//!
//! ## Core Types
//!
//! - **[`ConnectionCache`]**: request key → weak connection handle, with per-key
//!   construction coordination
//! - **[`Liveness`]**: the `is_closed()` predicate every cached connection exposes
//!
//! ## Architecture
//!
//! - **Non-owning**: entries are [`std::sync::Weak`] handles; dropping the last
//!   `Arc` frees the connection and the entry reads as a miss
//! - **Closed is a miss**: a connection reporting `is_closed()` is never returned
//! - **One construction per key**: concurrent misses for the same key wait for
//!   the first caller's construction instead of starting their own
//! - **Short map lock**: the key map is locked only to find a slot; construction
//!   runs under that key's own async guard
//!
mod cache;

pub use cache::{ConnectionCache, Liveness};
