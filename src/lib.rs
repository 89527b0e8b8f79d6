//! client-meta Library
//!
//! Client metadata extraction for HTTP requests (IP, browser, platform,
//! language, UTC offset, country) and login-tracking persistence.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{CdnTrustPolicy, MetadataExtractor};
pub use config::load_config;
pub use domain::entities::{ClientInfo, LoginTracking};
pub use domain::ports::{CountryResolver, ResolverError, TrackingError, TrackingRecorder};
pub use domain::value_objects::{Browser, Platform};
