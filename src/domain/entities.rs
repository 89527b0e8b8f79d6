//! Domain Entities - Core business objects
//!
//! `ClientInfo` is the snapshot produced for one request; `LoginTracking`
//! is the row handed to the tracking recorder.

use crate::domain::value_objects::{Browser, Platform};
use serde::{Deserialize, Serialize};

/// Format of `ClientInfo::request_time`.
pub const REQUEST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Client metadata extracted from a single request.
///
/// Every field carries either a value or its sentinel: `"Unknown"` for
/// browser, platform and country, an empty string for ip, lang and
/// gmt_time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Best-effort client address
    pub ip: String,
    /// OS guess from the User-Agent
    pub platform: Platform,
    /// Browser guess from the User-Agent
    pub browser: Browser,
    /// CDN header or GeoIP lookup (ISO 3166-1 alpha-2)
    pub country_code: String,
    /// Client UTC offset in minutes, e.g. "-360", as sent by the client
    pub gmt_time: String,
    /// First tag of Accept-Language, e.g. "es-CR"
    pub lang: String,
    /// Raw User-Agent
    pub user_agent: String,
    /// Server local time at extraction
    pub request_time: String,
}

impl ClientInfo {
    /// Render as an indented JSON document.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// A login event ready to be written to the `logintracking` table.
///
/// Field order matches the column order of the insert statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginTracking {
    pub user_id: String,
    pub email: String,
    pub date_local_access: String,
    pub ip: String,
    pub platform: String,
    pub mac_address: String,
    pub browser: String,
    pub country_code: String,
    pub gmt_time: String,
    pub lang: String,
    pub action: String,
    pub json_string: String,
}

impl LoginTracking {
    /// Build a record from extracted metadata and caller-supplied fields.
    ///
    /// The MAC address is not observable over HTTP and is left empty. The
    /// JSON column holds the rendered `ClientInfo`; use `with_json` to
    /// store a different payload.
    pub fn from_client_info(
        info: &ClientInfo,
        user_id: impl Into<String>,
        email: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            date_local_access: info.request_time.clone(),
            ip: info.ip.clone(),
            platform: info.platform.as_str().to_string(),
            mac_address: String::new(),
            browser: info.browser.as_str().to_string(),
            country_code: info.country_code.clone(),
            gmt_time: info.gmt_time.clone(),
            lang: info.lang.clone(),
            action: action.into(),
            json_string: info.to_pretty_json(),
        }
    }

    /// Replace the JSON column.
    pub fn with_json(mut self, json: impl Into<String>) -> Self {
        self.json_string = json.into();
        self
    }
}
