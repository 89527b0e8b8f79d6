use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub listen_addr: String,
    pub debug: bool,

    // Country resolution
    pub geoip_path: Option<String>,
    pub geoip_optional: bool,
    pub trust_cdn_country: bool,
    pub cdn_trusted_peers: Vec<IpAddr>,

    // Login tracking
    pub tracking_db_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            debug: false,
            geoip_path: None,
            geoip_optional: false,
            trust_cdn_country: true,
            cdn_trusted_peers: Vec::new(),
            tracking_db_path: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid listen address {0:?}")]
    InvalidListenAddr(String),
}

impl Config {
    /// Build a config from a variable lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(default)
        };
        let path = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_addr = lookup("CLIENTMETA_LISTEN_ADDR").unwrap_or(defaults.listen_addr);
        if listen_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidListenAddr(listen_addr));
        }

        let debug = lookup("DEBUG").is_some();

        let geoip_path = path("CLIENTMETA_GEOIP_PATH");
        let geoip_optional = flag("CLIENTMETA_GEOIP_OPTIONAL", defaults.geoip_optional);
        let trust_cdn_country = flag("CLIENTMETA_TRUST_CDN_COUNTRY", defaults.trust_cdn_country);

        // Unparseable entries are skipped
        let cdn_trusted_peers = lookup("CLIENTMETA_CDN_TRUSTED_PEERS")
            .map(|v| {
                v.split(',')
                    .filter_map(|s| s.trim().parse::<IpAddr>().ok())
                    .collect()
            })
            .unwrap_or_default();

        let tracking_db_path = path("CLIENTMETA_TRACKING_DB_PATH");

        Ok(Config {
            listen_addr,
            debug,
            geoip_path,
            geoip_optional,
            trust_cdn_country,
            cdn_trusted_peers,
            tracking_db_path,
        })
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    Ok(Config::from_lookup(|key| std::env::var(key).ok())?)
}
