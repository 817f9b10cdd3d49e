use crate::{
    board::Board,
    buttons::ButtonDebouncer,
    calibration::{Calibration, CalibrationError, TemperatureMapping},
    config::ControllerConfig,
    display::{DisplayRenderer, DisplayView, Frame},
    modes::ModeStateMachine,
    thermostat::{Decision, ThermostatEngine, ThermostatInputs},
    types::{ButtonId, ClockTime, ControllerStatus, Mode},
};

/// Everything the control loop mutates. Lives for the device's uptime and is
/// rebuilt from config on boot.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub mode: Mode,
    pub target: i32,
    pub heating: bool,
    pub buttons: ButtonDebouncer,
}

impl ControllerState {
    pub fn new(target: i32) -> Self {
        Self {
            mode: Mode::Normal,
            target,
            heating: false,
            buttons: ButtonDebouncer::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    ModeChanged { from: Mode, to: Mode },
    TargetChanged { from: i32, to: i32 },
    ClockAdjusted { delta_seconds: i32 },
    HeaterSwitched { on: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub raw: i32,
    pub temp_f: i32,
    pub time: ClockTime,
    pub decision: Decision,
    pub frame: Frame,
    pub events: Vec<ControllerEvent>,
}

/// Runs the read → decide → act → render sequence once per tick.
#[derive(Debug, Clone)]
pub struct Controller<M = Calibration> {
    state: ControllerState,
    modes: ModeStateMachine,
    calibration: M,
    thermostat: ThermostatEngine,
    renderer: DisplayRenderer,
    last: Option<TickReport>,
}

impl Controller<Calibration> {
    pub fn from_config(config: &ControllerConfig) -> Result<Self, CalibrationError> {
        let calibration = config.calibration.build()?;
        Ok(Self::with_mapping(config, calibration))
    }
}

impl<M: TemperatureMapping> Controller<M> {
    pub fn with_mapping(config: &ControllerConfig, calibration: M) -> Self {
        Self {
            state: ControllerState::new(config.default_target),
            modes: ModeStateMachine::new(config),
            calibration,
            thermostat: ThermostatEngine::new(config),
            renderer: DisplayRenderer::new(config),
            last: None,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn calibration(&self) -> &M {
        &self.calibration
    }

    pub fn tick<B: Board>(&mut self, board: &mut B, elapsed_ms: u64) -> TickReport {
        let mut events = Vec::new();

        let left = board.read_button(ButtonId::Left);
        let right = board.read_button(ButtonId::Right);
        let buttons = self.state.buttons.sample(left, right);

        let mode_before = self.state.mode;
        let target_before = self.state.target;
        let adjustments = self.modes.apply(&mut self.state, &buttons, board.read_clock());
        for delta_seconds in adjustments {
            board.adjust_clock(delta_seconds);
            events.push(ControllerEvent::ClockAdjusted { delta_seconds });
        }
        if self.state.target != target_before {
            events.push(ControllerEvent::TargetChanged {
                from: target_before,
                to: self.state.target,
            });
        }
        if self.state.mode != mode_before {
            events.push(ControllerEvent::ModeChanged {
                from: mode_before,
                to: self.state.mode,
            });
        }

        let raw = board.read_sensor_raw();
        let temp_f = self.calibration.degrees(raw);
        let time = board.read_clock();

        let decision = self.thermostat.evaluate(&ThermostatInputs {
            temp_f,
            time,
            target_f: self.state.target,
            mode: self.state.mode,
            heating: self.state.heating,
        });
        if decision.heat != self.state.heating {
            events.push(ControllerEvent::HeaterSwitched { on: decision.heat });
        }
        self.state.heating = decision.heat;
        board.write_heater(decision.heat);

        let frame = self.renderer.render(&DisplayView {
            mode: self.state.mode,
            temp_f,
            raw,
            target_f: self.state.target,
            time,
            heating: self.state.heating,
            armed: decision.armed,
            cold: decision.cold,
            hot: decision.hot,
            elapsed_ms,
        });
        for (row, line) in frame.lines.iter().enumerate() {
            board.write_display_line(row, line);
        }

        let report = TickReport {
            raw,
            temp_f,
            time,
            decision,
            frame,
            events,
        };
        self.last = Some(report.clone());
        report
    }

    /// Snapshot of the most recent tick, or `None` before the first one.
    pub fn status(&self) -> Option<ControllerStatus> {
        let last = self.last.as_ref()?;
        Some(ControllerStatus {
            mode: self.state.mode.as_str(),
            target_temp: self.state.target,
            current_temp: last.temp_f,
            raw_sample: last.raw,
            time: last.time.to_string(),
            heating: self.state.heating,
            armed: last.decision.armed,
            cold: last.decision.cold,
            hot: last.decision.hot,
        })
    }
}
