mod support;

use std::io::Write;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono_tz::Tz;
use relaybot::app::ingest::Ingestor;
use relaybot::app::rate_limiter::RateLimiter;
use relaybot::domain::model::PortError;
use relaybot::ports::notifier::Notifier;
use relaybot::server::{router, AppState};
use support::{limiter, ManualClock, RecordingNotifier, Sent, START_MS};
use tower::ServiceExt;

struct Harness {
    app: axum::Router,
    notifier: Arc<RecordingNotifier>,
    limiter: Arc<RateLimiter>,
    clock: Arc<ManualClock>,
}

fn harness(capacity: u32) -> Harness {
    let clock = ManualClock::at(START_MS);
    let limiter = limiter(capacity, 20, clock.clone());
    let notifier = Arc::new(RecordingNotifier::default());
    let port: Arc<dyn Notifier> = notifier.clone();
    let ingestor = Arc::new(Ingestor::new(limiter.clone(), port, clock.clone(), Tz::UTC));
    Harness {
        app: router(AppState { ingestor }),
        notifier,
        limiter,
        clock,
    }
}

async fn post(app: &axum::Router, body: impl Into<Body>) -> (StatusCode, String) {
    let req = Request::builder()
        .method("POST")
        .uri("/updated")
        .body(body.into())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn text_event_is_forwarded_verbatim() {
    let h = harness(5);
    let (status, body) = post(&h.app, r#"{"key":"text","content":"hello"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
    assert_eq!(h.notifier.sent(), vec![Sent::Text("hello".into())]);
}

#[tokio::test]
async fn object_without_key_is_text() {
    let h = harness(5);
    let (status, _) = post(&h.app, r#"{"content":"motion at gate"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.notifier.sent(), vec![Sent::Text("motion at gate".into())]);
}

#[tokio::test]
async fn sixth_event_in_window_is_dropped() {
    let h = harness(5);
    for expected in [4, 3, 2, 1, 0] {
        h.clock.advance_ms(1_000);
        let (status, body) = post(&h.app, r#"{"key":"text","content":"x"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
        assert_eq!(h.limiter.snapshot().await.remaining, expected);
    }

    h.clock.advance_ms(1_000);
    let (status, body) = post(&h.app, r#"{"key":"text","content":"x"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
    assert_eq!(h.notifier.sent().len(), 5);
}

#[tokio::test]
async fn bare_path_sends_file_with_caption() {
    let h = harness(5);
    let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    file.write_all(b"\xff\xd8jpeg").unwrap();
    let path = file.path().to_path_buf();

    let (status, body) = post(&h.app, path.display().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    let Sent::File {
        caption,
        file_name,
        bytes,
    } = &sent[0]
    else {
        panic!("expected a file, got {sent:?}");
    };
    assert_eq!(caption, "2023-11-14 22:13:20 cnt: 4");
    assert_eq!(file_name, path.file_name().unwrap().to_str().unwrap());
    assert_eq!(bytes.as_slice(), b"\xff\xd8jpeg");
}

#[tokio::test]
async fn structured_file_path_and_legacy_alias() {
    let h = harness(5);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"frame").unwrap();
    let path = serde_json::to_string(&file.path().display().to_string()).unwrap();

    for key in ["file-path", "img_path"] {
        let body = format!(r#"{{"key":"{key}","content":{path}}}"#);
        let (status, _) = post(&h.app, body).await;
        assert_eq!(status, StatusCode::OK, "{key}");
    }
    // A JSON string literal is the legacy path form too.
    let (status, _) = post(&h.app, path.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|s| matches!(s, Sent::File { .. })));
}

#[tokio::test]
async fn missing_file_is_server_error_without_forward() {
    let h = harness(5);
    let (status, body) = post(&h.app, "/definitely/not/here.jpg").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("internal_error"), "{body}");
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn malformed_json_only_touches_idle_timestamp() {
    let h = harness(5);
    h.clock.advance_ms(5_000);
    let (status, _) = post(&h.app, r#"{"key":"text","content":"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = post(&h.app, r#"{"key":"video","content":"x"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let snap = h.limiter.snapshot().await;
    assert_eq!(snap.remaining, 5);
    assert_eq!(snap.last_event_at_ms, START_MS + 5_000);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn unreadable_body_is_client_error() {
    let h = harness(5);
    let (status, body) = post(&h.app, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("bad_request"), "{body}");

    let (status, _) = post(&h.app, vec![0xffu8, 0xfe, 0xfd]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(h.limiter.snapshot().await.remaining, 5);
}

#[tokio::test]
async fn forward_failure_is_server_error() {
    let h = harness(5);
    h.notifier.fail_next(PortError::Status {
        status: 429,
        body: "slow down".into(),
    });
    let (status, body) = post(&h.app, r#"{"key":"text","content":"hello"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("slow down"), "{body}");
    // The failed forward still spent its unit; nothing is retried.
    assert_eq!(h.limiter.snapshot().await.remaining, 4);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn health_answers_ok() {
    let h = harness(1);
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = h.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
