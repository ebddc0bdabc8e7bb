use serde::{Deserialize, Serialize};

use crate::domain::TimeLeft;

pub mod endpoints;
#[cfg(feature = "rest-client")]
pub mod rest;

pub const API_V1_PREFIX: &str = "/api/v1";

/// Command sent by a client to the timer daemon.
///
/// The wire shape is fixed: `{"action":"startTimer","duration":N}` and
/// `{"action":"stopTimer"}`. `duration` is whole seconds and must be
/// positive; clients validate before sending, the daemon rejects zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum TimerCommand {
    StartTimer { duration: u32 },
    StopTimer,
}

/// Event broadcast by the daemon to every connected client.
///
/// Wire shape: `{"type":"timerUpdate","minutes":M,"seconds":S}` and
/// `{"type":"timerEnded"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimerEvent {
    TimerUpdate { minutes: u32, seconds: u32 },
    TimerEnded,
}

impl TimerEvent {
    pub fn update(left: TimeLeft) -> Self {
        TimerEvent::TimerUpdate {
            minutes: left.minutes,
            seconds: left.seconds,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionDto {
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_wire_shapes() {
        let start = serde_json::to_value(TimerCommand::StartTimer { duration: 600 }).unwrap();
        assert_eq!(start, json!({"action": "startTimer", "duration": 600}));

        let stop = serde_json::to_value(TimerCommand::StopTimer).unwrap();
        assert_eq!(stop, json!({"action": "stopTimer"}));
    }

    #[test]
    fn event_wire_shapes() {
        let update = serde_json::to_value(TimerEvent::TimerUpdate {
            minutes: 1,
            seconds: 5,
        })
        .unwrap();
        assert_eq!(
            update,
            json!({"type": "timerUpdate", "minutes": 1, "seconds": 5})
        );

        let ended = serde_json::to_value(TimerEvent::TimerEnded).unwrap();
        assert_eq!(ended, json!({"type": "timerEnded"}));
    }

    #[test]
    fn commands_parse_from_raw_json() {
        let cmd: TimerCommand =
            serde_json::from_str(r#"{"action":"startTimer","duration":10}"#).unwrap();
        assert_eq!(cmd, TimerCommand::StartTimer { duration: 10 });

        let cmd: TimerCommand = serde_json::from_str(r#"{"action":"stopTimer"}"#).unwrap();
        assert_eq!(cmd, TimerCommand::StopTimer);

        // Negative durations never parse; the daemon only sees whole seconds.
        assert!(serde_json::from_str::<TimerCommand>(r#"{"action":"startTimer","duration":-5}"#)
            .is_err());
    }
}
