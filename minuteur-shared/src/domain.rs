use std::fmt;

use serde::{Deserialize, Serialize};

/// Remaining time split into whole minutes and leftover seconds, the way
/// every observer renders it. Observers never derive this from their own
/// clock; it always comes from a timer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLeft {
    pub minutes: u32,
    pub seconds: u32,
}

impl TimeLeft {
    pub fn from_secs(total: u32) -> Self {
        Self {
            minutes: total / 60,
            seconds: total % 60,
        }
    }

    pub fn zero() -> Self {
        Self::from_secs(0)
    }

    pub fn total_secs(&self) -> u32 {
        self.minutes.saturating_mul(60).saturating_add(self.seconds)
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_minutes_and_seconds() {
        assert_eq!(
            TimeLeft::from_secs(70),
            TimeLeft {
                minutes: 1,
                seconds: 10
            }
        );
        assert_eq!(TimeLeft::from_secs(60).seconds, 0);
        assert_eq!(TimeLeft::from_secs(59).minutes, 0);
    }

    #[test]
    fn renders_zero_padded() {
        assert_eq!(TimeLeft::from_secs(65).to_string(), "01:05");
        assert_eq!(TimeLeft::zero().to_string(), "00:00");
        assert_eq!(TimeLeft::from_secs(600).to_string(), "10:00");
    }

    #[test]
    fn roundtrips_total_seconds() {
        assert_eq!(TimeLeft::from_secs(123).total_secs(), 123);
    }

    #[test]
    fn total_seconds_saturates_instead_of_wrapping() {
        let huge = TimeLeft {
            minutes: u32::MAX,
            seconds: 5,
        };
        assert_eq!(huge.total_secs(), u32::MAX);
    }
}
