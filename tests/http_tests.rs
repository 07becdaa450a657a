use rpunch::db::initialize::init_db;
use rpunch::db::pool::DbPool;
use rpunch::errors::AppError;
use rpunch::models::presence::{PresenceTier, RawStatus};
use rpunch::models::punch_kind::PunchKind;
use rpunch::net::transport::{HttpTransport, PunchTransport};
use rpunch::server::{AppState, serve_listener};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::oneshot;

mod common;
use common::intent;

const TOKEN: &str = "s3cret";

/// Punch server on an ephemeral port, stopped on drop.
struct TestServer {
    url: String,
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    _dir: TempDir,
}

impl TestServer {
    fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("server.sqlite").to_string_lossy().to_string();
        init_db(&DbPool::new(&db_path).unwrap().conn).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (stop, stopped) = oneshot::channel::<()>();

        let handle = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            runtime
                .block_on(serve_listener(
                    listener,
                    AppState::new(&db_path, TOKEN),
                    async move {
                        let _ = stopped.await;
                    },
                ))
                .unwrap();
        });

        Self {
            url,
            stop: Some(stop),
            handle: Some(handle),
            _dir: dir,
        }
    }

    fn transport(&self, token: &str) -> HttpTransport {
        HttpTransport::new(&self.url, token, Duration::from_secs(5)).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[test]
fn test_time_in_and_out_over_http() {
    let server = TestServer::start();
    let t = server.transport(TOKEN);

    let opened = t.send_punch(&intent("w1", PunchKind::TimeIn, 8, 30)).unwrap();
    assert!(opened.is_open);
    assert_eq!(opened.worker_id, "w1");
    assert_eq!(opened.time_zone, "Europe/Rome");

    let status = t.fetch_status("w1").unwrap();
    assert!(status.is_clocked_in);
    assert_eq!(status.open_session.map(|s| s.id), Some(opened.id));

    let closed = t.send_punch(&intent("w1", PunchKind::TimeOut, 17, 0)).unwrap();
    assert_eq!(closed.id, opened.id);
    assert!(!closed.is_open);
    assert!(!t.fetch_status("w1").unwrap().is_clocked_in);
}

#[test]
fn test_conflicts_carry_server_message() {
    let server = TestServer::start();
    let t = server.transport(TOKEN);

    let err = t.send_punch(&intent("w1", PunchKind::TimeOut, 8, 0)).unwrap_err();
    assert!(matches!(&err, AppError::Conflict(m) if m == "No active time-in found."));

    t.send_punch(&intent("w1", PunchKind::TimeIn, 8, 0)).unwrap();
    let err = t.send_punch(&intent("w1", PunchKind::TimeIn, 8, 5)).unwrap_err();
    assert!(matches!(&err, AppError::Conflict(m) if m == "User is already time-in."));
    assert!(err.is_conflict());
}

#[test]
fn test_wrong_token_is_unauthorized() {
    let server = TestServer::start();

    let err = server
        .transport("wrong")
        .send_punch(&intent("w1", PunchKind::TimeIn, 8, 0))
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let err = server.transport("").fetch_status("w1").unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
}

#[test]
fn test_presence_over_http() {
    let server = TestServer::start();
    let t = server.transport(TOKEN);

    assert_eq!(t.fetch_presence("w1").unwrap().tier, PresenceTier::Offline);

    t.set_presence("w1", RawStatus::Active).unwrap();
    let view = t.fetch_presence("w1").unwrap();
    assert_eq!(view.worker_id, "w1");
    assert_eq!(view.tier, PresenceTier::Active);
    assert_eq!(view.tooltip, "Active now");

    t.set_presence("w1", RawStatus::Offline).unwrap();
    assert_eq!(t.fetch_presence("w1").unwrap().tier, PresenceTier::Offline);
}

#[test]
fn test_unreachable_server_is_transient() {
    // bind then drop to get a port nobody listens on
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let t = HttpTransport::new(
        &format!("http://127.0.0.1:{}", port),
        TOKEN,
        Duration::from_secs(2),
    )
    .unwrap();

    let err = t.send_punch(&intent("w1", PunchKind::TimeIn, 8, 0)).unwrap_err();
    assert!(err.is_transient());
}

fn post_raw(server: &TestServer, path: &str, token: Option<&str>, body: &str) -> (u16, serde_json::Value) {
    let client = reqwest::blocking::Client::new();
    let mut req = client
        .post(format!("{}/{}", server.url, path))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body.to_string());
    if let Some(t) = token {
        req = req.bearer_auth(t);
    }
    let resp = req.send().unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().unwrap())
}

#[test]
fn test_malformed_body_gets_json_400() {
    let server = TestServer::start();
    let no_date = r#"{"workerId":"w1","deviceInfo":"d","timeZone":"UTC","isTimeIn":true}"#;

    let (status, body) = post_raw(&server, "time-in", Some(TOKEN), no_date);
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("date"));

    let (status, body) = post_raw(&server, "presence", Some(TOKEN), "{not json");
    assert_eq!(status, 400);
    assert!(body["message"].is_string());

    // nothing was opened by the rejected request
    let t = server.transport(TOKEN);
    assert!(!t.fetch_status("w1").unwrap().is_clocked_in);
}

#[test]
fn test_missing_content_type_gets_json_400() {
    let server = TestServer::start();

    let resp = reqwest::blocking::Client::new()
        .post(format!("{}/time-out", server.url))
        .bearer_auth(TOKEN)
        .body("{}")
        .send()
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().unwrap();
    assert!(body["message"].is_string());
}

#[test]
fn test_auth_is_checked_before_the_body() {
    let server = TestServer::start();

    let (status, body) = post_raw(&server, "time-in", Some("wrong"), "{}");
    assert_eq!(status, 401);
    assert_eq!(body["message"], "Unauthorized");
}

#[test]
fn test_invalid_request_is_not_a_conflict() {
    let server = TestServer::start();
    let t = server.transport(TOKEN);

    let err = t.send_punch(&intent("", PunchKind::TimeIn, 8, 0)).unwrap_err();

    assert!(matches!(&err, AppError::Rejected(m) if m.contains("workerId is required")));
    assert!(!err.is_conflict());
    assert!(!err.is_transient());
}
