//! Adapters Layer
//!
//! Inbound: HTTP API. Outbound: MaxMind country lookup, SQLite tracking.

pub mod inbound;
pub mod outbound;
