//! End-to-end tests against a real listener: HTTP commands in, SSE
//! countdowns out. These run on the wall clock with short durations.

use std::sync::Arc;
use std::time::Duration;

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use minuteur_server::server::{self, AppConfig, AppState};
use minuteur_server::timer::{self, CompletionAlert};
use minuteur_shared::api::TimerEvent;
use reqwest::StatusCode;
use serde_json::{Value, json};

struct NoopAlert;

#[async_trait::async_trait]
impl CompletionAlert for NoopAlert {
    async fn timer_ended(&self) {}
}

struct TestServer {
    base: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
    shutdown: tokio_util::sync::CancellationToken,
}

impl TestServer {
    async fn spawn() -> Self {
        let state = AppState::new(AppConfig::default(), timer::spawn(Arc::new(NoopAlert)));
        let shutdown = state.shutdown_token();
        let app = server::router(state);
        let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
            handle,
            shutdown,
        }
    }

    async fn command(&self, body: Value) -> StatusCode {
        self.client
            .post(format!("{}/api/v1/timer", self.base))
            .json(&body)
            .send()
            .await
            .expect("send command")
            .status()
    }

    /// Opens the SSE stream and decodes each data frame into a timer event.
    async fn events(&self) -> BoxStream<'static, TimerEvent> {
        let res = self
            .client
            .get(format!("{}/api/v1/events", self.base))
            .send()
            .await
            .expect("open event stream");
        assert_eq!(res.status(), StatusCode::OK);
        res.bytes_stream()
            .eventsource()
            .filter_map(|frame| async move {
                let frame = frame.ok()?;
                serde_json::from_str::<TimerEvent>(&frame.data).ok()
            })
            .boxed()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn next_event(stream: &mut BoxStream<'static, TimerEvent>) -> TimerEvent {
    tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("timed out waiting for event")
        .expect("event stream closed")
}

fn update(minutes: u32, seconds: u32) -> TimerEvent {
    TimerEvent::TimerUpdate { minutes, seconds }
}

#[tokio::test]
async fn health_and_version() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .get(format!("{}/healthz", srv.base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "ok");

    let res = srv
        .client
        .get(format!("{}/api/v1/version", srv.base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn rejects_bad_commands() {
    let srv = TestServer::spawn().await;

    let status = srv
        .command(json!({"action": "startTimer", "duration": 0}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let status = srv.command(json!({"action": "explode"})).await;
    assert!(status.is_client_error(), "got {status}");

    let status = srv.command(json!({"action": "stopTimer"})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn countdown_streams_to_every_subscriber() {
    let srv = TestServer::spawn().await;
    let mut a = srv.events().await;
    let mut b = srv.events().await;

    let status = srv
        .command(json!({"action": "startTimer", "duration": 2}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for stream in [&mut a, &mut b] {
        assert_eq!(next_event(stream).await, update(0, 2));
        assert_eq!(next_event(stream).await, update(0, 1));
        assert_eq!(next_event(stream).await, TimerEvent::TimerEnded);
    }
}

#[tokio::test]
async fn stop_silences_the_stream() {
    let srv = TestServer::spawn().await;
    let mut events = srv.events().await;

    let status = srv
        .command(json!({"action": "startTimer", "duration": 60}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(next_event(&mut events).await, update(1, 0));

    let status = srv.command(json!({"action": "stopTimer"})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Drain whatever tick raced with the stop, then expect silence.
    let res = tokio::time::timeout(Duration::from_millis(2500), async {
        let mut last = None;
        while let Some(ev) = events.next().await {
            assert_ne!(ev, TimerEvent::TimerEnded, "stop must not complete");
            last = Some(ev);
        }
        last
    })
    .await;
    assert!(res.is_err(), "stream stayed active after stop");
}

#[tokio::test]
async fn shutdown_token_ends_open_event_streams() {
    let srv = TestServer::spawn().await;
    let mut events = srv.events().await;

    let status = srv
        .command(json!({"action": "startTimer", "duration": 60}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(next_event(&mut events).await, update(1, 0));

    srv.shutdown.cancel();

    // The stream must terminate, not merely go quiet.
    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        while events.next().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok(), "event stream stayed open after shutdown");
}

#[tokio::test]
async fn serves_the_embedded_page() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(&srv.base).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"), "{content_type}");
    assert!(res.text().await.unwrap().contains("minuteur"));
}
