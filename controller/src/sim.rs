use std::{collections::VecDeque, str::FromStr};

use anyhow::{bail, Context};
use chrono::{Duration, NaiveTime};

use thermoclock_common::{
    Board, ButtonId, Calibration, ClockTime, RuntimeConfig, SimulationConfig, TemperatureMapping,
};

/// Wall clock kept in software: an epoch plus monotonic time plus whatever the
/// menu has dialled in. Wraps at midnight.
#[derive(Debug, Clone)]
pub struct SoftClock {
    epoch: NaiveTime,
    offset_secs: i64,
}

impl SoftClock {
    pub fn new(epoch: ClockTime) -> Self {
        Self {
            epoch: epoch.to_naive().unwrap_or(NaiveTime::MIN),
            offset_secs: 0,
        }
    }

    pub fn now(&self, elapsed_ms: u64) -> ClockTime {
        let elapsed = Duration::milliseconds(elapsed_ms.min(i64::MAX as u64) as i64)
            + Duration::seconds(self.offset_secs);
        let (time, _) = self.epoch.overflowing_add_signed(elapsed);
        ClockTime::from(time)
    }

    pub fn adjust(&mut self, delta_seconds: i32) {
        self.offset_secs =
            (self.offset_secs + delta_seconds as i64).rem_euclid(ClockTime::SECONDS_PER_DAY as i64);
    }
}

/// First-order room: gains heat at a fixed rate while the heater runs and
/// relaxes toward ambient in proportion to the gap.
#[derive(Debug, Clone)]
pub struct ThermalModel {
    temp_f: f64,
    ambient_f: f64,
    heat_rate_f_per_min: f64,
    loss_per_min: f64,
}

impl ThermalModel {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            temp_f: config.initial_temp_f,
            ambient_f: config.ambient_temp_f,
            heat_rate_f_per_min: config.heat_rate_f_per_min,
            loss_per_min: config.loss_per_min,
        }
    }

    pub fn temp_f(&self) -> f64 {
        self.temp_f
    }

    pub fn advance(&mut self, dt_ms: u64, heating: bool) {
        let minutes = dt_ms as f64 / 60_000.0;
        if heating {
            self.temp_f += self.heat_rate_f_per_min * minutes;
        }
        let loss = (self.loss_per_min * minutes).min(1.0);
        self.temp_f -= (self.temp_f - self.ambient_f) * loss;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonCommand {
    TapLeft,
    TapRight,
    /// Both buttons down together, then both up.
    Chord,
    HoldLeft(u32),
    HoldRight(u32),
}

impl FromStr for ButtonCommand {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        let ticks = parts
            .next()
            .map(|value| value.parse::<u32>().context("hold length must be a tick count"))
            .transpose()?;
        if parts.next().is_some() {
            bail!("too many arguments in `{input}`");
        }

        match (verb.as_str(), ticks) {
            ("l" | "left", None) => Ok(Self::TapLeft),
            ("r" | "right", None) => Ok(Self::TapRight),
            ("b" | "both", None) => Ok(Self::Chord),
            ("hl", Some(ticks)) => Ok(Self::HoldLeft(ticks)),
            ("hr", Some(ticks)) => Ok(Self::HoldRight(ticks)),
            ("hl" | "hr", None) => bail!("`{verb}` needs a tick count"),
            _ => bail!("unknown button command `{input}` (use l, r, b, hl <n>, hr <n>)"),
        }
    }
}

/// Queue of per-tick `(left, right)` levels produced from button commands.
#[derive(Debug, Clone)]
pub struct ButtonScript {
    pending: VecDeque<(bool, bool)>,
    tap_ticks: u32,
}

impl ButtonScript {
    pub fn new(tap_ticks: u32) -> Self {
        Self {
            pending: VecDeque::new(),
            tap_ticks: tap_ticks.max(1),
        }
    }

    pub fn push(&mut self, command: ButtonCommand) {
        let (levels, ticks) = match command {
            ButtonCommand::TapLeft => ((true, false), self.tap_ticks),
            ButtonCommand::TapRight => ((false, true), self.tap_ticks),
            ButtonCommand::Chord => ((true, true), self.tap_ticks),
            ButtonCommand::HoldLeft(ticks) => ((true, false), ticks.max(1)),
            ButtonCommand::HoldRight(ticks) => ((false, true), ticks.max(1)),
        };
        self.pending.extend(std::iter::repeat(levels).take(ticks as usize));
        self.pending.push_back((false, false));
    }

    pub fn next_levels(&mut self) -> (bool, bool) {
        self.pending.pop_front().unwrap_or((false, false))
    }
}

/// Host stand-in for the real board.
#[derive(Debug, Clone)]
pub struct SimBoard {
    clock: SoftClock,
    room: ThermalModel,
    buttons: ButtonScript,
    calibration: Calibration,
    heater: bool,
    now_ms: u64,
    levels: (bool, bool),
    rows: [String; 2],
    frame_changed: bool,
}

impl SimBoard {
    pub fn new(runtime: &RuntimeConfig, calibration: Calibration) -> Self {
        Self {
            clock: SoftClock::new(runtime.clock_epoch),
            room: ThermalModel::new(&runtime.simulation),
            buttons: ButtonScript::new(runtime.simulation.tap_ticks),
            calibration,
            heater: false,
            now_ms: 0,
            levels: (false, false),
            rows: [String::new(), String::new()],
            frame_changed: false,
        }
    }

    pub fn queue(&mut self, command: ButtonCommand) {
        self.buttons.push(command);
    }

    pub fn room_temp_f(&self) -> f64 {
        self.room.temp_f()
    }

    /// Advances the room to `now_ms` and latches this tick's button levels.
    pub fn begin_tick(&mut self, now_ms: u64) {
        let dt_ms = now_ms.saturating_sub(self.now_ms);
        self.room.advance(dt_ms, self.heater);
        self.now_ms = now_ms;
        self.levels = self.buttons.next_levels();
    }

    pub fn take_changed_frame(&mut self) -> Option<&[String; 2]> {
        if !self.frame_changed {
            return None;
        }
        self.frame_changed = false;
        Some(&self.rows)
    }
}

impl Board for SimBoard {
    fn read_button(&mut self, button: ButtonId) -> bool {
        match button {
            ButtonId::Left => self.levels.0,
            ButtonId::Right => self.levels.1,
        }
    }

    fn read_sensor_raw(&mut self) -> i32 {
        self.calibration.raw_for_degrees(self.room.temp_f())
    }

    fn read_clock(&self) -> ClockTime {
        self.clock.now(self.now_ms)
    }

    fn adjust_clock(&mut self, delta_seconds: i32) {
        self.clock.adjust(delta_seconds);
    }

    fn write_heater(&mut self, on: bool) {
        self.heater = on;
    }

    fn write_display_line(&mut self, row: usize, text: &str) {
        let Some(current) = self.rows.get_mut(row) else {
            return;
        };
        if current != text {
            *current = text.to_string();
            self.frame_changed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use thermoclock_common::{CalibrationConfig, Controller, ControllerConfig, Mode};

    use super::*;

    #[test]
    fn soft_clock_runs_from_its_epoch() {
        let clock = SoftClock::new(ClockTime::new(12, 0, 0));

        assert_eq!(clock.now(0), ClockTime::new(12, 0, 0));
        assert_eq!(clock.now(999), ClockTime::new(12, 0, 0));
        assert_eq!(clock.now(61_000), ClockTime::new(12, 1, 1));
    }

    #[test]
    fn soft_clock_wraps_at_midnight_both_ways() {
        let mut clock = SoftClock::new(ClockTime::new(23, 30, 0));
        clock.adjust(3600);
        assert_eq!(clock.now(0), ClockTime::new(0, 30, 0));

        let mut clock = SoftClock::new(ClockTime::new(0, 0, 30));
        clock.adjust(-59);
        assert_eq!(clock.now(0), ClockTime::new(23, 59, 31));
    }

    #[test]
    fn room_warms_while_heating_and_cools_otherwise() {
        let mut room = ThermalModel::new(&SimulationConfig {
            initial_temp_f: 60.0,
            ambient_temp_f: 50.0,
            heat_rate_f_per_min: 2.0,
            loss_per_min: 0.0,
            tap_ticks: 1,
        });

        room.advance(60_000, true);
        assert!((room.temp_f() - 62.0).abs() < 1e-9);

        let mut leaky = ThermalModel::new(&SimulationConfig {
            initial_temp_f: 60.0,
            ambient_temp_f: 50.0,
            heat_rate_f_per_min: 2.0,
            loss_per_min: 0.5,
            tap_ticks: 1,
        });
        leaky.advance(60_000, false);
        assert!((leaky.temp_f() - 55.0).abs() < 1e-9);
    }

    #[test]
    fn parses_button_commands() {
        assert_eq!("l".parse::<ButtonCommand>().unwrap(), ButtonCommand::TapLeft);
        assert_eq!("RIGHT".parse::<ButtonCommand>().unwrap(), ButtonCommand::TapRight);
        assert_eq!("b".parse::<ButtonCommand>().unwrap(), ButtonCommand::Chord);
        assert_eq!(
            "hl 40".parse::<ButtonCommand>().unwrap(),
            ButtonCommand::HoldLeft(40)
        );
        assert!("hr".parse::<ButtonCommand>().is_err());
        assert!("l 3".parse::<ButtonCommand>().is_err());
        assert!("x".parse::<ButtonCommand>().is_err());
        assert!("hl many".parse::<ButtonCommand>().is_err());
    }

    #[test]
    fn script_expands_taps_into_levels() {
        let mut script = ButtonScript::new(2);
        script.push(ButtonCommand::TapLeft);
        script.push(ButtonCommand::Chord);

        let levels: Vec<_> = (0..7).map(|_| script.next_levels()).collect();
        assert_eq!(
            levels,
            vec![
                (true, false),
                (true, false),
                (false, false),
                (true, true),
                (true, true),
                (false, false),
                (false, false),
            ]
        );
        assert!(script.pending.is_empty());
    }

    #[test]
    fn frame_changes_are_reported_once() {
        let runtime = RuntimeConfig::default();
        let calibration = CalibrationConfig::default().build().unwrap();
        let mut board = SimBoard::new(&runtime, calibration);

        board.write_display_line(0, "hello");
        assert!(board.take_changed_frame().is_some());
        board.write_display_line(0, "hello");
        assert!(board.take_changed_frame().is_none());
        board.write_display_line(5, "ignored");
        assert!(board.take_changed_frame().is_none());
    }

    #[test]
    fn chord_script_drives_controller_into_clock_setting() {
        let runtime = RuntimeConfig::default();
        let mut controller = Controller::from_config(&ControllerConfig::default()).unwrap();
        let mut board = SimBoard::new(&runtime, *controller.calibration());

        board.queue(ButtonCommand::Chord);
        board.queue(ButtonCommand::TapRight);

        let mut now_ms = 0;
        while !board.buttons.pending.is_empty() {
            now_ms += runtime.tick_ms;
            board.begin_tick(now_ms);
            controller.tick(&mut board, now_ms);
        }

        assert_eq!(controller.state().mode, Mode::SetHour);
        assert_eq!(board.read_clock().hour, 13);
        assert!(!board.heater);
    }

    #[test]
    fn heater_warms_the_simulated_room() {
        let mut runtime = RuntimeConfig::default();
        runtime.simulation.initial_temp_f = 60.0;
        runtime.simulation.loss_per_min = 0.0;
        let mut controller = Controller::from_config(&runtime.controller).unwrap();
        let mut board = SimBoard::new(&runtime, *controller.calibration());

        board.begin_tick(0);
        controller.tick(&mut board, 0);
        assert!(board.heater);

        board.begin_tick(60_000);
        let report = controller.tick(&mut board, 60_000);
        assert!(board.room_temp_f() > 61.0);
        assert_eq!(report.temp_f, 62);
    }
}
