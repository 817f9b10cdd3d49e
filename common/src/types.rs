use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Left,
    Right,
}

/// UI mode of the two-button menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    #[default]
    Normal,
    /// Both buttons went down together; waiting for both to come back up.
    EnterSet,
    SetHour,
    SetMinute,
    SetSecond,
    SetTarget,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::EnterSet => "ENTER_SET",
            Self::SetHour => "SET_HOUR",
            Self::SetMinute => "SET_MINUTE",
            Self::SetSecond => "SET_SECOND",
            Self::SetTarget => "SET_TARGET",
        }
    }

    pub fn is_setting(self) -> bool {
        self != Self::Normal
    }
}

/// Wall-clock time of day as reported by the clock source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl ClockTime {
    pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60 && self.second < 60
    }

    pub fn seconds_from_midnight(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }

    pub fn to_naive(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Snapshot of the controller, logged periodically by the host.
#[derive(Debug, Clone, Serialize)]
pub struct ControllerStatus {
    pub mode: &'static str,
    #[serde(rename = "targetTemp")]
    pub target_temp: i32,
    #[serde(rename = "currentTemp")]
    pub current_temp: i32,
    #[serde(rename = "rawSample")]
    pub raw_sample: i32,
    pub time: String,
    pub heating: bool,
    pub armed: bool,
    pub cold: bool,
    pub hot: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_formats_with_leading_zeros() {
        assert_eq!(ClockTime::new(7, 5, 9).to_string(), "07:05:09");
    }

    #[test]
    fn clock_time_converts_from_naive_time() {
        let naive = NaiveTime::from_hms_opt(23, 59, 58).unwrap();
        let time = ClockTime::from(naive);

        assert_eq!(time, ClockTime::new(23, 59, 58));
        assert_eq!(time.to_naive(), Some(naive));
        assert_eq!(time.seconds_from_midnight(), 86_398);
    }

    #[test]
    fn only_normal_is_a_resting_mode() {
        assert!(!Mode::Normal.is_setting());
        for mode in [
            Mode::EnterSet,
            Mode::SetHour,
            Mode::SetMinute,
            Mode::SetSecond,
            Mode::SetTarget,
        ] {
            assert!(mode.is_setting(), "{}", mode.as_str());
        }
        assert_eq!(Mode::default(), Mode::Normal);
    }
}
