use serde::{Deserialize, Serialize};

use crate::types::ClockTime;

/// Daily heating window in whole wall-clock hours, `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            start_hour: 6,
            end_hour: 22,
        }
    }
}

impl Schedule {
    pub fn validate(&self) -> bool {
        self.start_hour <= self.end_hour && self.end_hour <= 24
    }

    pub fn is_armed(&self, now: ClockTime) -> bool {
        self.start_hour <= now.hour && now.hour < self.end_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_includes_start_and_excludes_end() {
        let schedule = Schedule {
            start_hour: 6,
            end_hour: 22,
        };

        assert!(!schedule.is_armed(ClockTime::new(5, 59, 59)));
        assert!(schedule.is_armed(ClockTime::new(6, 0, 0)));
        assert!(schedule.is_armed(ClockTime::new(21, 59, 59)));
        assert!(!schedule.is_armed(ClockTime::new(22, 0, 0)));
    }

    #[test]
    fn empty_window_is_never_armed() {
        let schedule = Schedule {
            start_hour: 9,
            end_hour: 9,
        };

        for hour in 0..24 {
            assert!(!schedule.is_armed(ClockTime::new(hour, 0, 0)));
        }
    }

    #[test]
    fn inverted_window_fails_validation() {
        assert!(Schedule::default().validate());
        assert!(!Schedule {
            start_hour: 22,
            end_hour: 6
        }
        .validate());
        assert!(!Schedule {
            start_hour: 0,
            end_hour: 25
        }
        .validate());
    }
}
