//! Country Resolver Port
//!
//! Defines the interface for resolving IP addresses to country codes.

use std::net::IpAddr;

/// Errors raised while bringing a resolver up.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// The geo database could not be read or is not a valid database.
    #[error("geo database unavailable at {path}: {reason}")]
    ResourceUnavailable { path: String, reason: String },
}

/// Resolver for IP address to ISO 3166-1 alpha-2 country code.
///
/// This is an outbound port that abstracts the GeoIP database. Lookups
/// never fail: every problem collapses to `None`.
pub trait CountryResolver: Send + Sync {
    /// Look up the country for a parsed address.
    fn lookup(&self, ip: IpAddr) -> Option<String>;

    /// Look up the country for a textual address.
    ///
    /// Unparseable input and empty codes yield `None`.
    fn resolve(&self, ip: &str) -> Option<String> {
        let addr: IpAddr = ip.trim().parse().ok()?;
        self.lookup(addr).filter(|code| !code.is_empty())
    }

    /// Release the underlying database. Safe to call more than once.
    fn close(&self) {}
}
