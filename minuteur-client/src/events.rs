//! Background listener on the daemon's event stream. Events are re-broadcast
//! locally so several parts of the session (renderer, fallback notifier) can
//! subscribe independently.

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use minuteur_shared::api::{TimerEvent, endpoints};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const EVENT_QUEUE: usize = 64;

#[derive(Clone)]
pub struct EventHub {
    tx: broadcast::Sender<TimerEvent>,
}

impl EventHub {
    /// Spawn the listener; it reconnects forever with capped backoff.
    pub fn spawn(server_base: &str) -> Self {
        let url = endpoints::events(server_base);
        let (tx, _) = broadcast::channel(EVENT_QUEUE);
        let tx_task = tx.clone();
        tokio::spawn(async move { listen(url, tx_task).await });
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.tx.subscribe()
    }
}

async fn listen(url: String, tx: broadcast::Sender<TimerEvent>) {
    let client = reqwest::Client::new();
    let mut backoff_secs = 1u64;
    loop {
        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => {
                info!("event stream connected");
                backoff_secs = 1;
                let mut stream = res.bytes_stream().eventsource();
                while let Some(item) = stream.next().await {
                    match item {
                        Ok(msg) => {
                            if msg.data.is_empty() {
                                continue;
                            }
                            match serde_json::from_str::<TimerEvent>(&msg.data) {
                                Ok(ev) => {
                                    let _ = tx.send(ev);
                                }
                                Err(e) => {
                                    debug!(error=%e, data=%msg.data, "ignoring unparseable event")
                                }
                            }
                        }
                        Err(e) => {
                            warn!(error=%e, "event stream read error");
                            break;
                        }
                    }
                }
            }
            Ok(res) => {
                warn!(status=%res.status(), "event stream rejected");
            }
            Err(e) => {
                warn!(error=%e, "event stream connect failed");
            }
        }
        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
        backoff_secs = std::cmp::min(backoff_secs * 2, 30);
    }
}
