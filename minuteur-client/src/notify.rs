//! Client-side fallback notification, raised on a completion event when
//! consent is granted. Redundant with the daemon's own attempt by design:
//! the daemon never confirms whether its notification was displayed.

use async_trait::async_trait;
use tracing::{info, warn};

/// Abstraction for the fallback completion notification.
#[async_trait]
pub trait NotificationBackend: Send {
    async fn timer_ended(&mut self, app_name: &str, body: &str);
}

#[derive(Debug, Default)]
pub struct Notifier {
    // Set after the first failure; from then on completions only log.
    log_only: bool,
}

#[async_trait]
impl NotificationBackend for Notifier {
    async fn timer_ended(&mut self, app_name: &str, body: &str) {
        if self.log_only {
            info!("[TIMER] {body}");
            return;
        }
        #[cfg(target_os = "linux")]
        {
            let mut n = notify_rust::Notification::new();
            let res = n
                .appname(app_name)
                .summary(app_name)
                .body(body)
                .urgency(notify_rust::Urgency::Critical)
                .show_async()
                .await;
            match res {
                Ok(_) => info!("fallback notification shown"),
                Err(e) => {
                    warn!(error=%e, "fallback notification failed; switching to log-only");
                    self.log_only = true;
                    info!("[TIMER] {body}");
                }
            }
        }
        #[cfg(not(target_os = "linux"))]
        {
            let _ = app_name;
            info!("[TIMER] {body}");
        }
    }
}
