//! Request header helpers

/// Proxy chain, client first.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
/// Country injected by Cloudflare at the edge.
pub const CF_IPCOUNTRY: &str = "cf-ipcountry";
/// Client UTC offset in minutes, computed by the browser as
/// `String(-new Date().getTimezoneOffset())`.
pub const X_CLIENT_UTC_OFFSET: &str = "x-client-utc-offset";

/// Highest-priority tag of an Accept-Language value, unmodified.
///
/// A value starting with a comma has no leading tag and is kept whole.
pub fn first_language(accept_language: &str) -> String {
    let value = accept_language.trim();
    match value.find(',') {
        Some(i) if i > 0 => value[..i].to_string(),
        _ => value.to_string(),
    }
}

/// Trimmed header value; `None` when absent or blank.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
