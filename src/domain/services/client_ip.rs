//! Client IP resolution
//!
//! Picks the originating client address from the proxy chain header or the
//! connection peer.

use std::net::IpAddr;

/// Resolve the client address.
///
/// Priority, first match wins:
/// 1. first entry of the comma-separated `forwarded_for` list that parses
///    as an IP, returned as written (trimmed)
/// 2. host part of a `host:port` peer address
/// 3. the peer address itself when it is a bare IP
/// 4. empty string
pub fn resolve_client_ip(forwarded_for: Option<&str>, peer_addr: &str) -> String {
    if let Some(ip) = forwarded_for.and_then(first_valid_ip) {
        return ip.to_string();
    }

    let peer = peer_addr.trim();
    if let Some(ip) = split_host(peer).and_then(|host| host.parse::<IpAddr>().ok()) {
        return ip.to_string();
    }
    if let Ok(ip) = peer.parse::<IpAddr>() {
        return ip.to_string();
    }

    String::new()
}

/// Host part of `host:port` or `[host]:port`. The port is not validated.
fn split_host(addr: &str) -> Option<&str> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        return tail.starts_with(':').then_some(host);
    }
    let (host, _port) = addr.rsplit_once(':')?;
    // an unbracketed host may not contain colons (bare IPv6)
    (!host.contains(':')).then_some(host)
}

/// First syntactically valid address in a proxy chain.
fn first_valid_ip(chain: &str) -> Option<&str> {
    chain
        .split(',')
        .map(str::trim)
        .find(|candidate| candidate.parse::<IpAddr>().is_ok())
}
