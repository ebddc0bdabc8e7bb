use std::io::Write;
use std::path::Path;

use minuteur_shared::api::{self, TimerCommand, rest::RestError};
use tracing::{info, warn};

pub mod cli;
pub mod config;
pub mod controller;
pub mod events;
pub mod notify;
pub mod permission;

pub use cli::{Cli, Command};
pub use config::ClientConfig;

use controller::{Controller, Reaction};
use notify::NotificationBackend;
use permission::PermissionState;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Input(String),
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    init_tracing();

    let (cfg_path, mut cfg) = config::find_and_load(cli.config)?;
    let base = config::normalize_server_url(&cfg.server_url);

    match cli.command.unwrap_or(Command::Watch) {
        Command::Start { minutes, seconds } => start(&base, minutes, seconds).await,
        Command::Stop => stop(&base).await,
        Command::Reset => reset(&base).await,
        Command::Watch => watch(&base, &cfg).await,
        Command::Permission { request } => permission_cmd(&cfg_path, &mut cfg, request),
        Command::TestNotify => test_notify(&cfg).await,
    }
}

async fn start(base: &str, minutes: u32, seconds: u32) -> Result<(), AppError> {
    let mut ui = Controller::new();
    // Rejected locally before anything is sent.
    let duration = ui
        .start(minutes, seconds)
        .map_err(|e| AppError::Input(e.to_string()))?;
    send(base, &TimerCommand::StartTimer { duration }).await?;
    // Optimistic render; the daemon's echoed progress event is for watchers.
    println!("Minuteur démarré : {}", ui.display());
    Ok(())
}

async fn stop(base: &str) -> Result<(), AppError> {
    send(base, &TimerCommand::StopTimer).await?;
    // No acknowledgement ever comes back for a stop.
    println!("Minuteur arrêté");
    Ok(())
}

async fn reset(base: &str) -> Result<(), AppError> {
    // A one-shot invocation cannot know whether a countdown is running;
    // a stop on an idle daemon has no side effects.
    send(base, &TimerCommand::StopTimer).await?;
    let mut ui = Controller::new();
    ui.reset();
    println!(
        "Réinitialisé : {:02}:{:02}",
        ui.input_minutes, ui.input_seconds
    );
    Ok(())
}

async fn watch(base: &str, cfg: &ClientConfig) -> Result<(), AppError> {
    match api::rest::version(base).await {
        Ok(v) => {
            if v.version != env!("CARGO_PKG_VERSION") {
                warn!(daemon=%v.version, client=%env!("CARGO_PKG_VERSION"), "version mismatch");
            }
            info!(daemon=%v.version, "connected");
        }
        Err(e) => return Err(daemon_unreachable(base, e)),
    }

    let consent = permission::current(cfg);
    if consent == PermissionState::Unrequested {
        println!("Notifications non demandées ; lancez `minuteur permission --request` pour les activer.");
    }

    let hub = events::EventHub::spawn(base);
    let mut rx = hub.subscribe();
    let mut ui = Controller::new();
    let mut notifier = notify::Notifier::default();

    println!("Connecté à {base} — Ctrl-C pour quitter");
    render(&ui);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                info!("bye");
                break;
            }
            ev = rx.recv() => match ev {
                Ok(ev) => match ui.on_event(&ev) {
                    Reaction::Rendered => render(&ui),
                    Reaction::Completed => {
                        render(&ui);
                        println!();
                        println!("{}", minuteur_shared::COMPLETION_BODY);
                        if consent == PermissionState::Granted {
                            notifier
                                .timer_ended(
                                    minuteur_shared::APP_NAME,
                                    minuteur_shared::COMPLETION_BODY,
                                )
                                .await;
                        }
                    }
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed=%n, "renderer lagged; resyncing on next event");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    }
    Ok(())
}

fn render(ui: &Controller) {
    print!("\r  {}  ", ui.display());
    let _ = std::io::stdout().flush();
}

fn permission_cmd(cfg_path: &Path, cfg: &mut ClientConfig, request: bool) -> Result<(), AppError> {
    if request {
        let state = permission::request(cfg)?;
        if state != PermissionState::Unsupported {
            config::save_config(cfg_path, cfg)?;
        }
        println!("Status des permissions : {state}");
        if state == PermissionState::Denied {
            println!(
                "Sans autorisation des notifications, vous ne recevrez pas d'alerte à la fin du minuteur."
            );
        }
        return Ok(());
    }

    let state = permission::current(cfg);
    println!("Status des permissions : {state}");
    // Once granted there is nothing further to request.
    if matches!(
        state,
        PermissionState::Unrequested | PermissionState::Denied
    ) {
        println!("Lancez `minuteur permission --request` pour les activer.");
    }
    Ok(())
}

async fn test_notify(cfg: &ClientConfig) -> Result<(), AppError> {
    if permission::current(cfg) != PermissionState::Granted {
        println!("Vous devez d'abord autoriser les notifications");
        return Ok(());
    }
    let mut notifier = notify::Notifier::default();
    notifier
        .timer_ended(
            minuteur_shared::APP_NAME,
            "Ceci est une notification de test",
        )
        .await;
    Ok(())
}

async fn send(base: &str, cmd: &TimerCommand) -> Result<(), AppError> {
    api::rest::send_command(base, cmd)
        .await
        .map_err(|e| match e {
            RestError::Http(_) => daemon_unreachable(base, e),
            other => AppError::Http(other.to_string()),
        })
}

fn daemon_unreachable(base: &str, e: RestError) -> AppError {
    AppError::Http(format!(
        "cannot reach the daemon at {base} ({e}); is minuteur-server running?"
    ))
}
