//! Desktop notification raised when a countdown expires naturally.
//!
//! Failures are logged and never retried; the completion broadcast has
//! already fired by the time this runs, so clients can fall back to their
//! own notification. After the first failure the notifier downgrades itself
//! to log-only output.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::timer::CompletionAlert;

pub struct Notifier {
    log_only: AtomicBool,
    app_name: String,
    body: String,
    app_url: String,
}

impl Notifier {
    pub fn new(app_name: String, body: String, app_url: String, enabled: bool) -> Self {
        // Non-Linux targets have no wired notification backend; they start
        // downgraded and only log completions.
        let log_only = !enabled || !cfg!(target_os = "linux");
        Self {
            log_only: AtomicBool::new(log_only),
            app_name,
            body,
            app_url,
        }
    }
}

#[async_trait]
impl CompletionAlert for Notifier {
    async fn timer_ended(&self) {
        if self.log_only.load(Ordering::Relaxed) {
            info!("[TIMER] {}", self.body);
            return;
        }
        #[cfg(target_os = "linux")]
        self.show_desktop().await;
    }
}

#[cfg(target_os = "linux")]
impl Notifier {
    async fn show_desktop(&self) {
        let mut n = notify_rust::Notification::new();
        let res = n
            .appname(&self.app_name)
            .summary(&self.app_name)
            .body(&self.body)
            .urgency(notify_rust::Urgency::Critical)
            .action("open", "Ouvrir l'app")
            .show_async()
            .await;

        match res {
            Ok(handle) => {
                let app_url = self.app_url.clone();
                tokio::task::spawn_blocking(move || {
                    handle.wait_for_action(|action| {
                        if action == "open" {
                            open_app(&app_url);
                        }
                    });
                });
            }
            Err(e) => {
                warn!(error=%e, "desktop notification failed; downgrading to log-only alerts");
                self.log_only.store(true, Ordering::Relaxed);
                info!("[TIMER] {}", self.body);
            }
        }
    }
}

/// Open the app page in the user's browser. Focusing an already-open window
/// is not expressible portably, so this always opens a new one.
#[cfg(target_os = "linux")]
fn open_app(url: &str) {
    match std::process::Command::new("xdg-open").arg(url).spawn() {
        Ok(_) => info!(url, "opening app page"),
        Err(e) => warn!(error=%e, url, "failed to open app page"),
    }
}
