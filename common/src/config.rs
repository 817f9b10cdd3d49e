use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    calibration::{CalibrationConfig, CalibrationError},
    schedule::Schedule,
    types::ClockTime,
};

pub const TARGET_MIN: i32 = 60;
pub const TARGET_MAX: i32 = 80;
pub const DEFAULT_TARGET: i32 = 68;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("target range {min}..={max} is empty")]
    EmptyTargetRange { min: i32, max: i32 },
    #[error("hysteresis tolerances must be >= 0 (down {down}, up {up})")]
    NegativeTolerance { down: i32, up: i32 },
    #[error("schedule window {start}..{end} is not within one day")]
    InvalidSchedule { start: u8, end: u8 },
    #[error("invalid calibration: {0}")]
    Calibration(#[from] CalibrationError),
    #[error("display width must be at least {min} characters, got {width}")]
    DisplayTooNarrow { width: usize, min: usize },
    #[error("{0} must be greater than zero")]
    ZeroPeriod(&'static str),
    #[error("clock epoch {0} is not a valid time of day")]
    InvalidClockEpoch(ClockTime),
}

/// How the two buttons map onto the setting menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuLayout {
    /// Both buttons together enter clock setting; LEFT/RIGHT nudge the target in normal mode.
    #[default]
    Gesture,
    /// LEFT alone cycles through every field including the target.
    Cycle,
}

/// What happens when a target step would leave `[target_min, target_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetOverflow {
    #[default]
    Clamp,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlPolicy {
    /// Heat below the band, stop above it, hold in between.
    #[default]
    Banded,
    /// Heat exactly while below target. No dead zone.
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HysteresisBand {
    pub tolerance_down: i32,
    pub tolerance_up: i32,
}

impl HysteresisBand {
    pub fn symmetric(tolerance: i32) -> Self {
        Self {
            tolerance_down: tolerance,
            tolerance_up: tolerance,
        }
    }
}

impl Default for HysteresisBand {
    fn default() -> Self {
        Self::symmetric(2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub target_min: i32,
    pub target_max: i32,
    pub default_target: i32,
    pub target_overflow: TargetOverflow,
    pub layout: MenuLayout,
    pub band: HysteresisBand,
    pub policy: ControlPolicy,
    pub schedule: Schedule,
    pub calibration: CalibrationConfig,
    pub flash_period_ms: u64,
    pub display_width: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            target_min: TARGET_MIN,
            target_max: TARGET_MAX,
            default_target: DEFAULT_TARGET,
            target_overflow: TargetOverflow::Clamp,
            layout: MenuLayout::Gesture,
            band: HysteresisBand::default(),
            policy: ControlPolicy::Banded,
            schedule: Schedule::default(),
            calibration: CalibrationConfig::default(),
            flash_period_ms: 200,
            display_width: 16,
        }
    }
}

impl ControllerConfig {
    /// Narrowest display that still fits `HH:MM:SS HEATING`.
    pub const MIN_DISPLAY_WIDTH: usize = 16;

    pub fn sanitize(&mut self) {
        if self.target_min <= self.target_max {
            self.default_target = self.default_target.clamp(self.target_min, self.target_max);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_min > self.target_max {
            return Err(ConfigError::EmptyTargetRange {
                min: self.target_min,
                max: self.target_max,
            });
        }
        if self.band.tolerance_down < 0 || self.band.tolerance_up < 0 {
            return Err(ConfigError::NegativeTolerance {
                down: self.band.tolerance_down,
                up: self.band.tolerance_up,
            });
        }
        if !self.schedule.validate() {
            return Err(ConfigError::InvalidSchedule {
                start: self.schedule.start_hour,
                end: self.schedule.end_hour,
            });
        }
        if self.display_width < Self::MIN_DISPLAY_WIDTH {
            return Err(ConfigError::DisplayTooNarrow {
                width: self.display_width,
                min: Self::MIN_DISPLAY_WIDTH,
            });
        }
        if self.flash_period_ms == 0 {
            return Err(ConfigError::ZeroPeriod("flash_period_ms"));
        }
        self.calibration.build()?;
        Ok(())
    }
}

/// Parameters of the simulated room used by the host build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_temp_f: f64,
    pub ambient_temp_f: f64,
    /// Degrees per minute gained while the heater runs.
    pub heat_rate_f_per_min: f64,
    /// Fraction of the gap to ambient lost per minute.
    pub loss_per_min: f64,
    /// Ticks a scripted tap holds a button down.
    pub tap_ticks: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_temp_f: 64.0,
            ambient_temp_f: 55.0,
            heat_rate_f_per_min: 1.5,
            loss_per_min: 0.05,
            tap_ticks: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub controller: ControllerConfig,
    pub tick_ms: u64,
    pub status_interval_ms: u64,
    pub clock_epoch: ClockTime,
    pub simulation: SimulationConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            tick_ms: 20,
            status_interval_ms: 10_000,
            clock_epoch: ClockTime::new(12, 0, 0),
            simulation: SimulationConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_json_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    pub fn sanitize(&mut self) {
        self.controller.sanitize();
        self.simulation.tap_ticks = self.simulation.tap_ticks.max(1);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.controller.validate()?;
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroPeriod("tick_ms"));
        }
        if self.status_interval_ms == 0 {
            return Err(ConfigError::ZeroPeriod("status_interval_ms"));
        }
        if !self.clock_epoch.is_valid() {
            return Err(ConfigError::InvalidClockEpoch(self.clock_epoch));
        }
        Ok(())
    }
}
