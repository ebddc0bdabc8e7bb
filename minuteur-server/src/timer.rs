//! The countdown state machine. A single spawned task owns the timer state
//! and is its sole mutator: commands arrive over an mpsc channel, ticks come
//! from a 1 Hz interval, and every observable change leaves through a
//! broadcast channel that each connected client subscribes to.

use std::sync::Arc;
use std::time::Duration;

use minuteur_shared::api::{TimerCommand, TimerEvent};
use minuteur_shared::domain::TimeLeft;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
const COMMAND_QUEUE: usize = 16;
const EVENT_QUEUE: usize = 64;

/// Hook invoked exactly once per natural expiry. Production wires this to a
/// desktop notification; failures are the implementation's problem and must
/// never reach the tick loop.
#[async_trait::async_trait]
pub trait CompletionAlert: Send + Sync + 'static {
    async fn timer_ended(&self);
}

#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    #[error("timer task is gone")]
    Closed,
}

/// Cloneable handle to the timer task: command entry point plus event
/// subscription. Dropping every handle shuts the task down.
#[derive(Clone)]
pub struct TimerHandle {
    cmd_tx: mpsc::Sender<TimerCommand>,
    events: broadcast::Sender<TimerEvent>,
}

impl TimerHandle {
    pub async fn dispatch(&self, cmd: TimerCommand) -> Result<(), TimerError> {
        self.cmd_tx.send(cmd).await.map_err(|_| TimerError::Closed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }
}

struct TimerState {
    remaining_seconds: u32,
    active: bool,
}

pub fn spawn(alert: Arc<dyn CompletionAlert>) -> TimerHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel(COMMAND_QUEUE);
    let (events, _) = broadcast::channel(EVENT_QUEUE);
    let events_task = events.clone();

    tokio::spawn(async move {
        let mut state = TimerState {
            remaining_seconds: 0,
            active: false,
        };
        // Replaced on every start; never polled while idle.
        let mut ticker = new_ticker();
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else {
                        info!("timer task: command channel closed; exiting");
                        break;
                    };
                    handle_command(cmd, &mut state, &mut ticker, &events_task);
                }
                _ = ticker.tick(), if state.active => {
                    handle_tick(&mut state, &events_task, &alert);
                }
            }
        }
    });

    TimerHandle { cmd_tx, events }
}

fn new_ticker() -> Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn handle_command(
    cmd: TimerCommand,
    state: &mut TimerState,
    ticker: &mut Interval,
    events: &broadcast::Sender<TimerEvent>,
) {
    match cmd {
        TimerCommand::StartTimer { duration } => {
            if duration == 0 {
                // Callers validate before sending; a zero here is a foreign
                // client slipping past the HTTP guard.
                warn!("ignoring start command with zero duration");
                return;
            }
            if state.active {
                debug!(
                    superseded = state.remaining_seconds,
                    "start while running; previous countdown cancelled"
                );
            }
            state.remaining_seconds = duration;
            state.active = true;
            // Fresh ticker so the first decrement lands a full second from
            // now, regardless of any previous run's phase.
            *ticker = new_ticker();
            // Immediate echo so observers show the starting value without
            // waiting out the first tick.
            broadcast(events, TimerEvent::update(TimeLeft::from_secs(duration)));
        }
        TimerCommand::StopTimer => {
            // No final event: the requesting client resets its own UI on send.
            state.active = false;
            state.remaining_seconds = 0;
        }
    }
}

fn handle_tick(
    state: &mut TimerState,
    events: &broadcast::Sender<TimerEvent>,
    alert: &Arc<dyn CompletionAlert>,
) {
    state.remaining_seconds = state.remaining_seconds.saturating_sub(1);
    if state.remaining_seconds == 0 {
        state.active = false;
        info!("countdown finished");
        let alert = Arc::clone(alert);
        // Off the tick loop; a stuck notification backend must not stall
        // command processing.
        tokio::spawn(async move { alert.timer_ended().await });
        broadcast(events, TimerEvent::TimerEnded);
    } else {
        broadcast(
            events,
            TimerEvent::update(TimeLeft::from_secs(state.remaining_seconds)),
        );
    }
}

fn broadcast(events: &broadcast::Sender<TimerEvent>, ev: TimerEvent) {
    match events.send(ev) {
        Ok(n) => debug!(observers = n, ?ev, "event broadcast"),
        Err(_) => debug!(?ev, "no observers connected; event dropped"),
    }
}
