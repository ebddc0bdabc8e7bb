//! Pure UI-reconciliation state for one client session ("page"). Holds no
//! authority: the daemon owns the countdown, and the display only ever shows
//! values echoed back in events, never a locally computed clock. Control
//! enablement is driven solely by this session's own start/stop calls, so a
//! session that did not initiate a run still mirrors the countdown while its
//! controls stay put.

use std::fmt;

use minuteur_shared::api::TimerEvent;
use minuteur_shared::domain::TimeLeft;

pub const DEFAULT_MINUTES: u32 = 0;
pub const DEFAULT_SECONDS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    ZeroDuration,
    TooLong,
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::ZeroDuration => {
                write!(f, "Veuillez définir une durée pour le minuteur")
            }
            StartError::TooLong => {
                write!(f, "La durée du minuteur est trop longue")
            }
        }
    }
}

/// What the caller should do after reconciling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Progress: re-render the display, nothing else.
    Rendered,
    /// Countdown ended: re-render, then attempt the fallback notification
    /// if consent was granted.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controller {
    pub input_minutes: u32,
    pub input_seconds: u32,
    running: bool,
    display: TimeLeft,
    inputs_enabled: bool,
    stop_enabled: bool,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            input_minutes: DEFAULT_MINUTES,
            input_seconds: DEFAULT_SECONDS,
            running: false,
            display: TimeLeft::zero(),
            inputs_enabled: true,
            stop_enabled: false,
        }
    }

    pub fn display(&self) -> TimeLeft {
        self.display
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn inputs_enabled(&self) -> bool {
        self.inputs_enabled
    }

    pub fn stop_enabled(&self) -> bool {
        self.stop_enabled
    }

    /// Validate and apply the local side of a start. Returns the duration in
    /// whole seconds to send to the daemon. The entered duration is rendered
    /// immediately rather than waiting for the echoed progress event, which
    /// would otherwise cost a visible one-tick delay.
    pub fn start(&mut self, minutes: u32, seconds: u32) -> Result<u32, StartError> {
        // The inputs come straight from the CLI, so the total may not fit.
        let duration = minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .ok_or(StartError::TooLong)?;
        if duration == 0 {
            return Err(StartError::ZeroDuration);
        }
        self.input_minutes = minutes;
        self.input_seconds = seconds;
        self.running = true;
        self.inputs_enabled = false;
        self.stop_enabled = true;
        self.display = TimeLeft { minutes, seconds };
        Ok(duration)
    }

    /// Optimistic local reset: the daemon never acknowledges a stop, so
    /// controls are restored on send.
    pub fn stop(&mut self) {
        self.running = false;
        self.inputs_enabled = true;
        self.stop_enabled = false;
    }

    /// Stop (when running) plus default inputs and a zeroed display. Returns
    /// whether a stop command must be sent; on an already-idle session only
    /// the inputs and display are re-rendered.
    pub fn reset(&mut self) -> bool {
        let send_stop = self.running;
        if send_stop {
            self.stop();
        }
        self.input_minutes = DEFAULT_MINUTES;
        self.input_seconds = DEFAULT_SECONDS;
        self.display = TimeLeft::zero();
        send_stop
    }

    pub fn on_event(&mut self, ev: &TimerEvent) -> Reaction {
        match ev {
            TimerEvent::TimerUpdate { minutes, seconds } => {
                self.display = TimeLeft {
                    minutes: *minutes,
                    seconds: *seconds,
                };
                Reaction::Rendered
            }
            TimerEvent::TimerEnded => {
                self.running = false;
                self.inputs_enabled = true;
                self.stop_enabled = false;
                self.display = TimeLeft::zero();
                Reaction::Completed
            }
        }
    }
}
