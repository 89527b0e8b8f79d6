//! Integration tests for the client metadata API
//!
//! Runs the real server on an ephemeral port and drives it over HTTP.

use client_meta::adapters::inbound::{ApiServer, ApiState};
use client_meta::adapters::outbound::{SqliteTrackingRecorder, LOGIN_TRACKING_SCHEMA};
use client_meta::{MetadataExtractor, TrackingRecorder};
use rusqlite::Connection;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    async fn start(recorder: Option<Arc<dyn TrackingRecorder>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let extractor = Arc::new(MetadataExtractor::new(None));
        let server = ApiServer::new(addr.to_string(), ApiState::new(extractor, recorder));

        let (stop, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = rx.await;
                })
                .await
        });

        Self { addr, stop, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn shutdown(self) {
        let _ = self.stop.send(());
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}

fn tracking_db() -> (NamedTempFile, String) {
    let file = NamedTempFile::new().unwrap();
    let path = file.path().to_str().unwrap().to_string();
    Connection::open(&path)
        .unwrap()
        .execute_batch(LOGIN_TRACKING_SCHEMA)
        .unwrap();
    (file, path)
}

/// Peer address becomes the client IP when no proxy header is sent
#[tokio::test]
async fn test_whoami_over_tcp_uses_peer_address() {
    let server = TestServer::start(None).await;

    let resp = reqwest::Client::new()
        .get(server.url("/whoami"))
        .header("user-agent", "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Firefox/121.0")
        .header("accept-language", "es-CR,en;q=0.8")
        .header("x-client-utc-offset", "-360")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["ip"], "127.0.0.1");
    assert_eq!(body["browser"], "Firefox");
    assert_eq!(body["platform"], "Linux");
    assert_eq!(body["lang"], "es-CR");
    assert_eq!(body["gmt_time"], "-360");
    assert_eq!(body["country_code"], "Unknown");

    server.shutdown().await;
}

/// Forwarded header and CDN country win over the socket
#[tokio::test]
async fn test_whoami_behind_proxy() {
    let server = TestServer::start(None).await;

    let resp = reqwest::Client::new()
        .get(server.url("/whoami"))
        .header("user-agent", "Mozilla/5.0 (Windows NT 10.0) Chrome/120.0")
        .header("accept-language", "en-US,en;q=0.9")
        .header("cf-ipcountry", "US")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["platform"], "Windows");
    assert_eq!(body["browser"], "Chrome");
    assert_eq!(body["country_code"], "US");
    assert_eq!(body["lang"], "en-US");
    assert_eq!(body["ip"], "203.0.113.7");

    server.shutdown().await;
}

/// Track writes one row per call to the SQLite table
#[tokio::test]
async fn test_track_persists_rows() {
    let (_file, path) = tracking_db();
    let recorder: Arc<dyn TrackingRecorder> = Arc::new(SqliteTrackingRecorder::open(&path).unwrap());
    let server = TestServer::start(Some(recorder)).await;

    let client = reqwest::Client::new();
    for _ in 0..2 {
        let resp = client
            .post(server.url("/api/v1/track"))
            .header("cf-ipcountry", "CR")
            .json(&serde_json::json!({
                "user_id": "u-100",
                "email": "ana@example.com",
                "action": "login"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let conn = Connection::open(&path).unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM logintracking WHERE userid = 'u-100'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 2);

    let (ip, country, action): (String, String, String) = conn
        .query_row(
            "SELECT ip, countrycode, action FROM logintracking LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(ip, "127.0.0.1");
    assert_eq!(country, "CR");
    assert_eq!(action, "login");

    server.shutdown().await;
}

/// A table that does not exist surfaces as a server error
#[tokio::test]
async fn test_track_without_table_fails() {
    let file = NamedTempFile::new().unwrap();
    let recorder: Arc<dyn TrackingRecorder> =
        Arc::new(SqliteTrackingRecorder::open(file.path().to_str().unwrap()).unwrap());
    let server = TestServer::start(Some(recorder)).await;

    let resp = reqwest::Client::new()
        .post(server.url("/api/v1/track"))
        .json(&serde_json::json!({ "user_id": "u-1", "action": "login" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["inserted"], false);

    server.shutdown().await;
}
