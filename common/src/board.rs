use crate::types::{ButtonId, ClockTime};

/// I/O the control loop talks to. Every call is synchronous and expected to
/// complete well inside one tick.
pub trait Board {
    /// Instantaneous level, already polarity-corrected (`true` = pressed).
    fn read_button(&mut self, button: ButtonId) -> bool;

    fn read_sensor_raw(&mut self) -> i32;

    fn read_clock(&self) -> ClockTime;

    /// Relative shift; the clock carries across minute, hour and day boundaries.
    fn adjust_clock(&mut self, delta_seconds: i32);

    /// Holds until the next call.
    fn write_heater(&mut self, on: bool);

    fn write_display_line(&mut self, row: usize, text: &str);
}
