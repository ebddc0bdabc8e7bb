//! Notification consent, the desktop analogue of the browser permission
//! prompt. Consent is explicit and user-gated, persisted in the client
//! config, and has no effect on whether the countdown runs; only the
//! completion alert is suppressed without it.

use std::fmt;
use std::io::{self, BufRead, Write};

use crate::AppError;
use crate::config::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Unrequested,
    Granted,
    Denied,
    Unsupported,
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PermissionState::Unrequested => "Non demandées",
            PermissionState::Granted => "Autorisées",
            PermissionState::Denied => "Refusées",
            PermissionState::Unsupported => "Non supportées",
        };
        f.write_str(label)
    }
}

pub fn supported() -> bool {
    cfg!(target_os = "linux")
}

/// Read the current state; never cached beyond the current invocation.
pub fn current(cfg: &ClientConfig) -> PermissionState {
    if !supported() {
        return PermissionState::Unsupported;
    }
    match cfg.notifications {
        Some(true) => PermissionState::Granted,
        Some(false) => PermissionState::Denied,
        None => PermissionState::Unrequested,
    }
}

/// Run the consent prompt and record the outcome in the config (the caller
/// persists it). Re-running after a denial is allowed.
pub fn request(cfg: &mut ClientConfig) -> Result<PermissionState, AppError> {
    if !supported() {
        return Ok(PermissionState::Unsupported);
    }
    print!("Autoriser les notifications de fin de minuteur ? [o/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let granted = matches!(
        line.trim().to_lowercase().as_str(),
        "o" | "oui" | "y" | "yes"
    );
    cfg.notifications = Some(granted);
    Ok(if granted {
        PermissionState::Granted
    } else {
        PermissionState::Denied
    })
}
