//! Metadata Extractor - Main application use case
//!
//! Turns the headers and peer address of one request into a `ClientInfo`.
//! Extraction never fails; anything it cannot determine becomes a
//! sentinel value.

use crate::domain::entities::{ClientInfo, REQUEST_TIME_FORMAT};
use crate::domain::ports::CountryResolver;
use crate::domain::services::headers::{
    non_empty, CF_IPCOUNTRY, X_CLIENT_UTC_OFFSET, X_FORWARDED_FOR,
};
use crate::domain::services::{classify, first_language, resolve_client_ip};
use crate::domain::value_objects::UNKNOWN;
use axum::http::{header, HeaderMap};
use chrono::{Local, NaiveDateTime};
use std::net::IpAddr;
use std::sync::Arc;

/// When to honour the CDN country header.
///
/// The header is only meaningful if every request reaches the service
/// through the CDN. With `trusted_peers` set, the header is honoured only
/// when the connection peer is one of those addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdnTrustPolicy {
    pub enabled: bool,
    pub trusted_peers: Vec<IpAddr>,
}

impl CdnTrustPolicy {
    /// Honour the header from any peer.
    pub fn always() -> Self {
        Self {
            enabled: true,
            trusted_peers: Vec::new(),
        }
    }

    /// Ignore the header entirely.
    pub fn never() -> Self {
        Self {
            enabled: false,
            trusted_peers: Vec::new(),
        }
    }

    /// Honour the header only from the given peers.
    pub fn from_peers(peers: Vec<IpAddr>) -> Self {
        Self {
            enabled: true,
            trusted_peers: peers,
        }
    }

    /// Whether a request from `peer_addr` may set the country.
    pub fn trusts(&self, peer_addr: &str) -> bool {
        if !self.enabled {
            return false;
        }
        if self.trusted_peers.is_empty() {
            return true;
        }
        resolve_client_ip(None, peer_addr)
            .parse::<IpAddr>()
            .map(|ip| self.trusted_peers.contains(&ip))
            .unwrap_or(false)
    }
}

impl Default for CdnTrustPolicy {
    fn default() -> Self {
        Self::always()
    }
}

/// Client metadata extractor.
///
/// Holds the optional country resolver; without one, country falls back
/// to the CDN header or `"Unknown"`.
pub struct MetadataExtractor {
    geo_resolver: Option<Arc<dyn CountryResolver>>,
    cdn_policy: CdnTrustPolicy,
}

impl MetadataExtractor {
    /// Create an extractor that trusts the CDN header from any peer.
    pub fn new(geo_resolver: Option<Arc<dyn CountryResolver>>) -> Self {
        Self {
            geo_resolver,
            cdn_policy: CdnTrustPolicy::default(),
        }
    }

    /// Replace the CDN trust policy.
    pub fn with_cdn_policy(mut self, policy: CdnTrustPolicy) -> Self {
        self.cdn_policy = policy;
        self
    }

    /// Whether a GeoIP fallback is configured.
    pub fn has_resolver(&self) -> bool {
        self.geo_resolver.is_some()
    }

    /// Extract metadata, stamping the current local time.
    pub fn extract(&self, headers: &HeaderMap, peer_addr: &str) -> ClientInfo {
        self.extract_at(headers, peer_addr, Local::now().naive_local())
    }

    /// Extract metadata, stamping `now` as the request time.
    pub fn extract_at(&self, headers: &HeaderMap, peer_addr: &str, now: NaiveDateTime) -> ClientInfo {
        let user_agent = header_lossy(headers, header::USER_AGENT.as_str());
        let (browser, platform) = classify(&user_agent);
        let ip = resolve_client_ip(header_str(headers, X_FORWARDED_FOR), peer_addr);
        let lang = first_language(
            header_str(headers, header::ACCEPT_LANGUAGE.as_str()).unwrap_or_default(),
        );
        let country_code = self.resolve_country(headers, peer_addr, &ip);
        let gmt_time = non_empty(header_str(headers, X_CLIENT_UTC_OFFSET)).unwrap_or_default();

        let info = ClientInfo {
            ip,
            platform,
            browser,
            country_code,
            gmt_time,
            lang,
            user_agent,
            request_time: now.format(REQUEST_TIME_FORMAT).to_string(),
        };

        tracing::debug!(
            "extracted client ip={} country={} browser={} platform={}",
            info.ip,
            info.country_code,
            info.browser,
            info.platform
        );

        info
    }

    /// Country priority: CDN header, then GeoIP, then `"Unknown"`.
    fn resolve_country(&self, headers: &HeaderMap, peer_addr: &str, ip: &str) -> String {
        if let Some(code) = non_empty(header_str(headers, CF_IPCOUNTRY)) {
            if self.cdn_policy.trusts(peer_addr) {
                return code;
            }
            tracing::warn!(
                "ignoring {} header from untrusted peer {:?}",
                CF_IPCOUNTRY,
                peer_addr
            );
        }

        if ip.is_empty() {
            return UNKNOWN.to_string();
        }

        self.geo_resolver
            .as_ref()
            .and_then(|resolver| resolver.resolve(ip))
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Release the resolver, if any.
    pub fn close(&self) {
        if let Some(resolver) = &self.geo_resolver {
            resolver.close();
        }
    }
}

/// Header value as text; non-UTF-8 values are treated as absent.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Header value with invalid bytes replaced, `""` when absent.
fn header_lossy(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default()
}
