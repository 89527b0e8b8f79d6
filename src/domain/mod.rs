//! Domain Layer
//!
//! Entities, value objects, ports and the pure extraction rules.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{ClientInfo, LoginTracking};
pub use value_objects::{Browser, Platform, UNKNOWN};
