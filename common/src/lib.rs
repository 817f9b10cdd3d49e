pub mod board;
pub mod buttons;
pub mod calibration;
pub mod config;
pub mod controller;
pub mod display;
pub mod modes;
pub mod schedule;
pub mod thermostat;
pub mod types;

pub use board::Board;
pub use buttons::{ButtonDebouncer, ButtonEdgeState, ButtonSnapshot};
pub use calibration::{
    Calibration, CalibrationConfig, CalibrationError, CalibrationPoint, LinearCalibration,
    TemperatureMapping, TwoPointCalibration,
};
pub use config::{
    ConfigError, ControlPolicy, ControllerConfig, HysteresisBand, MenuLayout, RuntimeConfig,
    SimulationConfig, TargetOverflow,
};
pub use controller::{Controller, ControllerEvent, ControllerState, TickReport};
pub use display::{DisplayRenderer, DisplayView, Frame, Status};
pub use modes::{ModeEffect, ModeStateMachine};
pub use schedule::Schedule;
pub use thermostat::{Decision, ThermostatEngine, ThermostatInputs};
pub use types::{ButtonId, ClockTime, ControllerStatus, Mode};
