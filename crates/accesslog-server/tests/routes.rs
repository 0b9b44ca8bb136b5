//! End-to-end route behavior against real file and SQLite backends.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::path::Path;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use accesslog_core::timestamp;
use accesslog_server::{
    app_state::AppState,
    config::{BackendMode, ServerConfig, StoragePaths},
    router,
};

async fn app(mode: BackendMode, dir: &TempDir) -> Router {
    let cfg = ServerConfig {
        listen: "127.0.0.1:0".into(),
        backend: mode,
        storage: StoragePaths {
            sqlite_db: dir.path().join("sqlite.db"),
            server_log: dir.path().join("server.log"),
        },
    };
    let state = AppState::new(cfg).await.expect("backend must open");
    assert_eq!(state.cfg().backend, mode);
    router::build_router(state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/user")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn counter(app: &Router, name: &str) -> u64 {
    let (_, text) = send(app, get("/metrics")).await;
    text.lines()
        .find_map(|l| l.strip_prefix(name).and_then(|v| v.strip_prefix(' ')))
        .unwrap_or_else(|| panic!("{name} missing from:\n{text}"))
        .parse()
        .unwrap()
}

fn log_lines(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(s) => s.lines().map(str::to_owned).collect(),
        Err(_) => Vec::new(),
    }
}

fn assert_access_line(line: &str, user: &str) {
    let ts = line
        .strip_prefix(&format!("{user}: "))
        .unwrap_or_else(|| panic!("unexpected line {line:?}"));
    timestamp::parse(ts).unwrap();
}

#[tokio::test]
async fn hello_counts_gets() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::File, &dir).await;

    for _ in 0..3 {
        let (status, body) = send(&app, get("/hello")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Hello Page\n");
    }
    assert_eq!(counter(&app, "http_requests_get_total").await, 3);
    assert_eq!(counter(&app, "http_requests_post_total").await, 0);
}

#[tokio::test]
async fn metrics_exposition_format() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::File, &dir).await;

    let resp = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_owned();
    assert!(ct.starts_with("text/plain; version=0.0.4"));

    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("# TYPE http_requests_get_total counter"));
    assert!(text.contains("# TYPE http_requests_post_total counter"));
}

#[tokio::test]
async fn file_mode_appends_submissions() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::File, &dir).await;
    let log = dir.path().join("server.log");

    for body in ["name=alice", "name=bob", "name=alice", ""] {
        let (status, text) = send(&app, post_form(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(text.is_empty());
    }

    let lines = log_lines(&log);
    assert_eq!(lines.len(), 4);
    assert_access_line(&lines[0], "alice");
    assert_access_line(&lines[1], "bob");
    assert_access_line(&lines[2], "alice");
    assert_access_line(&lines[3], "");
    assert_eq!(counter(&app, "http_requests_post_total").await, 4);
}

#[tokio::test]
async fn file_mode_rejects_non_post() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::File, &dir).await;
    let log = dir.path().join("server.log");

    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let req = Request::builder()
            .method(method)
            .uri("/user?name=alice")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, "Invalid HTTP method\n");
    }

    assert!(log_lines(&log).is_empty());
    assert_eq!(counter(&app, "http_requests_get_total").await, 0);
    assert_eq!(counter(&app, "http_requests_post_total").await, 0);
}

#[tokio::test]
async fn post_name_falls_back_to_query() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::File, &dir).await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/user?name=carol")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let lines = log_lines(&dir.path().join("server.log"));
    assert_eq!(lines.len(), 1);
    assert_access_line(&lines[0], "carol");
}

#[tokio::test]
async fn store_mode_submit_then_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::Sqlite, &dir).await;

    let (status, _) = send(&app, post_form("name=alice")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/user?name=alice")).await;
    assert_eq!(status, StatusCode::OK);
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 1);
    assert_access_line(lines[0], "alice");

    assert_eq!(counter(&app, "http_requests_post_total").await, 1);
    assert_eq!(counter(&app, "http_requests_get_total").await, 1);
}

#[tokio::test]
async fn store_mode_duplicates_keep_order() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::Sqlite, &dir).await;

    send(&app, post_form("name=alice")).await;
    send(&app, post_form("name=bob")).await;
    send(&app, post_form("name=alice")).await;

    let (_, body) = send(&app, get("/user?name=alice")).await;
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert_access_line(line, "alice");
    }
    let first = timestamp::parse(lines[0].trim_start_matches("alice: ")).unwrap();
    let second = timestamp::parse(lines[1].trim_start_matches("alice: ")).unwrap();
    assert!(first <= second);
}

#[tokio::test]
async fn store_mode_get_counter_tracks_hello_and_lookups() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::Sqlite, &dir).await;

    send(&app, get("/hello")).await;
    send(&app, get("/hello")).await;
    let (status, body) = send(&app, get("/user?name=nobody")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    send(&app, get("/user?name=nobody")).await;
    send(&app, get("/user?name=nobody")).await;

    assert_eq!(counter(&app, "http_requests_get_total").await, 5);
}

#[tokio::test]
async fn store_mode_lookup_without_name_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::Sqlite, &dir).await;
    send(&app, post_form("")).await;

    for uri in ["/user", "/user?name=", "/user?other=x"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body.is_empty(), "{uri}");
    }
    assert_eq!(counter(&app, "http_requests_get_total").await, 0);
}

#[tokio::test]
async fn store_mode_ignores_other_methods() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::Sqlite, &dir).await;

    for method in [Method::PUT, Method::DELETE] {
        let req = Request::builder()
            .method(method.clone())
            .uri("/user?name=alice")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK, "{method}");
        assert!(body.is_empty(), "{method}");
    }

    let (_, body) = send(&app, get("/user?name=alice")).await;
    assert!(body.is_empty());
    assert_eq!(counter(&app, "http_requests_get_total").await, 1);
    assert_eq!(counter(&app, "http_requests_post_total").await, 0);
}

#[tokio::test]
async fn repeated_name_in_body_records_first() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::File, &dir).await;

    let (status, _) = send(&app, post_form("name=alice&name=bob")).await;
    assert_eq!(status, StatusCode::OK);

    let lines = log_lines(&dir.path().join("server.log"));
    assert_eq!(lines.len(), 1);
    assert_access_line(&lines[0], "alice");
}

#[tokio::test]
async fn body_name_wins_over_query() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::File, &dir).await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/user?name=carol")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("name=dave"))
        .unwrap();
    send(&app, req).await;

    let lines = log_lines(&dir.path().join("server.log"));
    assert_access_line(&lines[0], "dave");
}

#[tokio::test]
async fn repeated_name_in_query_looks_up_first() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::Sqlite, &dir).await;
    send(&app, post_form("name=alice")).await;

    let (status, body) = send(&app, get("/user?name=alice&name=bob")).await;
    assert_eq!(status, StatusCode::OK);
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 1);
    assert_access_line(lines[0], "alice");
}

#[tokio::test]
async fn repeated_name_in_query_still_gets_405_in_file_mode() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::File, &dir).await;

    let req = Request::builder()
        .method(Method::PUT)
        .uri("/user?name=a&name=b")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, "Invalid HTTP method\n");

    let (status, body) = send(&app, get("/user?name=a&name=b")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, "Invalid HTTP method\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_file_submissions_stay_whole() {
    const REQUESTS: usize = 100;

    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::File, &dir).await;

    let mut tasks = Vec::with_capacity(REQUESTS);
    for i in 0..REQUESTS {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            send(&app, post_form(&format!("name=user{i}"))).await
        }));
    }
    for task in tasks {
        let (status, _) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let mut lines = log_lines(&dir.path().join("server.log"));
    assert_eq!(lines.len(), REQUESTS);
    lines.sort();
    let mut users: Vec<String> = lines
        .iter()
        .map(|line| line.split(": ").next().unwrap().to_owned())
        .collect();
    for (line, user) in lines.iter().zip(&users) {
        assert_access_line(line, user);
    }
    users.sort();
    users.dedup();
    assert_eq!(users.len(), REQUESTS);

    assert_eq!(counter(&app, "http_requests_post_total").await, REQUESTS as u64);
}

#[tokio::test]
async fn store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let app = app(BackendMode::Sqlite, &dir).await;
        send(&app, post_form("name=alice")).await;
    }

    let app = app(BackendMode::Sqlite, &dir).await;
    let (_, body) = send(&app, get("/user?name=alice")).await;
    assert_eq!(body.lines().count(), 1);
}

#[tokio::test]
async fn storage_failure_is_500_and_server_stays_up() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::Sqlite, &dir).await;
    std::fs::remove_file(dir.path().join("sqlite.db")).unwrap();

    let (status, body) = send(&app, post_form("name=alice")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["code"], "STORAGE");
    assert_eq!(counter(&app, "http_requests_post_total").await, 0);

    let (status, _) = send(&app, get("/hello")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn healthz_is_not_counted() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(BackendMode::File, &dir).await;

    let (status, body) = send(&app, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
    assert_eq!(counter(&app, "http_requests_get_total").await, 0);
}
