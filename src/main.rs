//! client-meta - client metadata service
//!
//! This is the composition root that wires together all the components.

use client_meta::adapters::inbound::{ApiServer, ApiState};
use client_meta::adapters::outbound::{MaxMindCountryResolver, SqliteTrackingRecorder};
use client_meta::config::Config;
use client_meta::infrastructure::shutdown_signal;
use client_meta::{load_config, CdnTrustPolicy, CountryResolver, MetadataExtractor, TrackingRecorder};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!("starting client-meta listen={}", cfg.listen_addr);

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters
    let geo_resolver = open_geo_resolver(&cfg)?;
    let recorder = open_recorder(&cfg)?;

    // 2. Application service
    let extractor = Arc::new(
        MetadataExtractor::new(geo_resolver).with_cdn_policy(cdn_policy(&cfg)),
    );

    // 3. Inbound adapter
    let server = ApiServer::new(
        cfg.listen_addr.clone(),
        ApiState::new(extractor.clone(), recorder),
    );
    let result = server.run(shutdown_signal()).await;

    extractor.close();
    result
}

/// Open the GeoIP database if configured.
///
/// A configured database that cannot be opened stops startup unless
/// `geoip_optional` is set, in which case the service runs without the
/// country fallback.
fn open_geo_resolver(cfg: &Config) -> anyhow::Result<Option<Arc<dyn CountryResolver>>> {
    let Some(path) = &cfg.geoip_path else {
        tracing::info!("no GeoIP DB configured, country fallback disabled");
        return Ok(None);
    };

    match MaxMindCountryResolver::open(path) {
        Ok(resolver) => Ok(Some(Arc::new(resolver) as Arc<dyn CountryResolver>)),
        Err(e) if cfg.geoip_optional => {
            tracing::error!("{}; continuing without country fallback", e);
            Ok(None)
        }
        Err(e) => {
            tracing::error!("{}", e);
            Err(e.into())
        }
    }
}

/// Open the tracking database if configured.
fn open_recorder(cfg: &Config) -> anyhow::Result<Option<Arc<dyn TrackingRecorder>>> {
    match &cfg.tracking_db_path {
        Some(path) => {
            let recorder = SqliteTrackingRecorder::open(path)?;
            Ok(Some(Arc::new(recorder) as Arc<dyn TrackingRecorder>))
        }
        None => {
            tracing::info!("no tracking DB configured, /api/v1/track disabled");
            Ok(None)
        }
    }
}

fn cdn_policy(cfg: &Config) -> CdnTrustPolicy {
    if !cfg.trust_cdn_country {
        CdnTrustPolicy::never()
    } else if cfg.cdn_trusted_peers.is_empty() {
        CdnTrustPolicy::always()
    } else {
        CdnTrustPolicy::from_peers(cfg.cdn_trusted_peers.clone())
    }
}
