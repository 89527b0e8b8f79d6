//! MaxMind Country Resolver
//!
//! Implements CountryResolver using a MaxMind GeoLite2/GeoIP2 database.

use crate::domain::ports::{CountryResolver, ResolverError};
use maxminddb::Reader;
use parking_lot::RwLock;
use serde::Deserialize;
use std::net::IpAddr;

/// MaxMind country resolver.
///
/// Loads the whole database into memory at open time. Lookups take a read
/// lock; `close` takes the write lock once to drop the reader.
pub struct MaxMindCountryResolver {
    reader: RwLock<Option<Reader<Vec<u8>>>>,
}

impl MaxMindCountryResolver {
    /// Load a database from a file path (e.g. `./GeoLite2-Country.mmdb`).
    pub fn open(path: &str) -> Result<Self, ResolverError> {
        let reader = Reader::open_readfile(path).map_err(|e| ResolverError::ResourceUnavailable {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!(
            "GeoIP DB loaded from {} (type={} build_epoch={})",
            path,
            reader.metadata.database_type,
            reader.metadata.build_epoch
        );

        Ok(Self::from_reader(reader))
    }

    /// Load a database from an in-memory buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ResolverError> {
        let reader = Reader::from_source(bytes).map_err(|e| ResolverError::ResourceUnavailable {
            path: "<memory>".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_reader(reader))
    }

    fn from_reader(reader: Reader<Vec<u8>>) -> Self {
        Self {
            reader: RwLock::new(Some(reader)),
        }
    }

    /// Whether the database is still loaded.
    pub fn is_open(&self) -> bool {
        self.reader.read().is_some()
    }
}

impl CountryResolver for MaxMindCountryResolver {
    fn lookup(&self, ip: IpAddr) -> Option<String> {
        #[derive(Debug, Deserialize)]
        struct Country {
            iso_code: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        struct CountryResp {
            country: Option<Country>,
        }

        let guard = self.reader.read();
        let reader = guard.as_ref()?;

        match reader.lookup::<CountryResp>(ip) {
            Ok(resp) => resp.country?.iso_code,
            Err(e) => {
                tracing::debug!("GeoIP lookup miss for {}: {}", ip, e);
                None
            }
        }
    }

    fn close(&self) {
        if self.reader.write().take().is_some() {
            tracing::info!("GeoIP DB closed");
        }
    }
}
