//! Client Metadata API Server
//!
//! HTTP surface that exposes extraction (`/whoami`) and login tracking
//! (`/api/v1/track`) to clients.

use crate::application::MetadataExtractor;
use crate::domain::entities::{ClientInfo, LoginTracking};
use crate::domain::ports::TrackingRecorder;
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Tracking request from a client that just authenticated.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackRequest {
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    pub action: String,
    /// Stored in the JSON column instead of the rendered metadata.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

/// Tracking response.
#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub inserted: bool,
    pub info: ClientInfo,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub geoip_enabled: bool,
    pub tracking_enabled: bool,
}

/// API Server state.
#[derive(Clone)]
pub struct ApiState {
    pub extractor: Arc<MetadataExtractor>,
    /// Absent when no tracking database is configured
    pub recorder: Option<Arc<dyn TrackingRecorder>>,
}

impl ApiState {
    pub fn new(
        extractor: Arc<MetadataExtractor>,
        recorder: Option<Arc<dyn TrackingRecorder>>,
    ) -> Self {
        Self {
            extractor,
            recorder,
        }
    }
}

/// API Server for client metadata.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
}

impl ApiServer {
    pub fn new(listen_addr: String, state: ApiState) -> Self {
        Self { listen_addr, state }
    }

    /// Build the router with all routes and tracing.
    pub fn router(state: ApiState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/whoami", get(whoami_handler))
            .route("/api/v1/track", post(track_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind the configured address and serve until `shutdown` completes.
    pub async fn run<F>(&self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` completes.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = Self::router(self.state.clone());
        tracing::info!("client-meta API listening on {}", listener.local_addr()?);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        tracing::info!("client-meta API stopped");
        Ok(())
    }
}

// Handler functions

fn peer_string(connect_info: Option<ConnectInfo<SocketAddr>>) -> String {
    connect_info
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default()
}

async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        geoip_enabled: state.extractor.has_resolver(),
        tracking_enabled: state.recorder.is_some(),
    })
}

async fn whoami_handler(
    State(state): State<ApiState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let info = state.extractor.extract(&headers, &peer_string(connect_info));
    tracing::info!("whoami:\n{}", info.to_pretty_json());
    Json(info)
}

async fn track_handler(
    State(state): State<ApiState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<TrackRequest>,
) -> Response {
    let Some(recorder) = state.recorder.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "error": "tracking is not configured"
            })),
        )
            .into_response();
    };

    let info = state.extractor.extract(&headers, &peer_string(connect_info));
    let mut record = LoginTracking::from_client_info(&info, req.user_id, req.email, req.action);
    if let Some(payload) = req.payload {
        record = record.with_json(payload.to_string());
    }

    match recorder.insert(&record).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(TrackResponse {
                inserted: true,
                info,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("tracking insert failed for user {}: {}", record.user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "inserted": false,
                    "error": e.to_string()
                })),
            )
                .into_response()
        }
    }
}
