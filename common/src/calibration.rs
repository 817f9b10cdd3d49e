//! Raw sensor sample to whole degrees.
//!
//! Two interchangeable forms sit behind [`TemperatureMapping`]: a line through two
//! measured calibration points, and fixed `a·raw + b` coefficients for boards that
//! ship with constants. Samples outside the calibrated span extrapolate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("calibration points share raw sample {0}")]
    DuplicateRawSample(i32),
    #[error("calibration coefficients must be finite (scale {scale}, offset {offset})")]
    NonFiniteCoefficients { scale: f64, offset: f64 },
    #[error("calibration scale must be non-zero")]
    ZeroScale,
}

pub trait TemperatureMapping {
    /// Degrees for one raw sample, rounded to the nearest integer.
    fn degrees(&self, raw: i32) -> i32;

    /// Raw sample that would read as `degrees`. Used to drive simulated sensors.
    fn raw_for_degrees(&self, degrees: f64) -> i32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub raw: i32,
    pub degrees: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoPointCalibration {
    low: CalibrationPoint,
    high: CalibrationPoint,
}

impl TwoPointCalibration {
    pub fn new(low: CalibrationPoint, high: CalibrationPoint) -> Result<Self, CalibrationError> {
        if low.raw == high.raw {
            return Err(CalibrationError::DuplicateRawSample(low.raw));
        }
        // Anchor on the lower raw sample so rounding does not depend on argument order.
        if low.raw > high.raw {
            return Ok(Self {
                low: high,
                high: low,
            });
        }
        Ok(Self { low, high })
    }

    fn slope(&self) -> f64 {
        (self.high.degrees as f64 - self.low.degrees as f64)
            / (self.high.raw as f64 - self.low.raw as f64)
    }
}

impl TemperatureMapping for TwoPointCalibration {
    fn degrees(&self, raw: i32) -> i32 {
        // Any i32 points fit in i128 without overflow; the result saturates.
        let rise = self.high.degrees as i128 - self.low.degrees as i128;
        let offset = (raw as i128 - self.low.raw as i128) * rise;
        let span = self.high.raw as i128 - self.low.raw as i128;
        let degrees = self.low.degrees as i128 + round_div(offset, span);
        degrees.clamp(i32::MIN as i128, i32::MAX as i128) as i32
    }

    fn raw_for_degrees(&self, degrees: f64) -> i32 {
        let slope = self.slope();
        if slope == 0.0 {
            return self.low.raw;
        }
        (self.low.raw as f64 + (degrees - self.low.degrees as f64) / slope).round() as i32
    }
}

/// Integer division rounding half away from zero.
fn round_div(numerator: i128, denominator: i128) -> i128 {
    let (numerator, denominator) = if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };
    if numerator >= 0 {
        (2 * numerator + denominator) / (2 * denominator)
    } else {
        -((-2 * numerator + denominator) / (2 * denominator))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearCalibration {
    scale: f64,
    offset: f64,
}

impl LinearCalibration {
    pub fn new(scale: f64, offset: f64) -> Result<Self, CalibrationError> {
        if !scale.is_finite() || !offset.is_finite() {
            return Err(CalibrationError::NonFiniteCoefficients { scale, offset });
        }
        if scale == 0.0 {
            return Err(CalibrationError::ZeroScale);
        }
        Ok(Self { scale, offset })
    }
}

impl TemperatureMapping for LinearCalibration {
    fn degrees(&self, raw: i32) -> i32 {
        (self.scale * raw as f64 + self.offset).round() as i32
    }

    fn raw_for_degrees(&self, degrees: f64) -> i32 {
        ((degrees - self.offset) / self.scale).round() as i32
    }
}

/// Configured calibration, as read from the runtime config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationConfig {
    TwoPoint {
        low: CalibrationPoint,
        high: CalibrationPoint,
    },
    Linear {
        scale: f64,
        offset: f64,
    },
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        // LM35-style divider on a 10-bit ADC: 0.5 F per count around room temperature.
        Self::TwoPoint {
            low: CalibrationPoint {
                raw: 100,
                degrees: 40,
            },
            high: CalibrationPoint {
                raw: 200,
                degrees: 90,
            },
        }
    }
}

impl CalibrationConfig {
    pub fn build(&self) -> Result<Calibration, CalibrationError> {
        match *self {
            Self::TwoPoint { low, high } => {
                TwoPointCalibration::new(low, high).map(Calibration::TwoPoint)
            }
            Self::Linear { scale, offset } => {
                LinearCalibration::new(scale, offset).map(Calibration::Linear)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Calibration {
    TwoPoint(TwoPointCalibration),
    Linear(LinearCalibration),
}

impl TemperatureMapping for Calibration {
    fn degrees(&self, raw: i32) -> i32 {
        match self {
            Self::TwoPoint(mapping) => mapping.degrees(raw),
            Self::Linear(mapping) => mapping.degrees(raw),
        }
    }

    fn raw_for_degrees(&self, degrees: f64) -> i32 {
        match self {
            Self::TwoPoint(mapping) => mapping.raw_for_degrees(degrees),
            Self::Linear(mapping) => mapping.raw_for_degrees(degrees),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(raw: i32, degrees: i32) -> CalibrationPoint {
        CalibrationPoint { raw, degrees }
    }

    #[test]
    fn calibration_points_map_back_exactly() {
        let mapping = TwoPointCalibration::new(point(312, 58), point(547, 83)).unwrap();

        assert_eq!(mapping.degrees(312), 58);
        assert_eq!(mapping.degrees(547), 83);
    }

    #[test]
    fn interpolates_and_rounds_to_nearest() {
        let mapping = TwoPointCalibration::new(point(100, 40), point(200, 90)).unwrap();

        assert_eq!(mapping.degrees(150), 65);
        // 40 + 51 * 0.5 = 65.5 rounds away from zero.
        assert_eq!(mapping.degrees(151), 66);
        assert_eq!(mapping.degrees(153), 67);
    }

    #[test]
    fn extrapolates_outside_the_points() {
        let mapping = TwoPointCalibration::new(point(100, 40), point(200, 90)).unwrap();

        assert_eq!(mapping.degrees(0), -10);
        assert_eq!(mapping.degrees(1023), 502);
        assert_eq!(mapping.degrees(-3), -12);
    }

    #[test]
    fn points_may_be_given_in_either_order() {
        let forward = TwoPointCalibration::new(point(100, 40), point(200, 90)).unwrap();
        let reversed = TwoPointCalibration::new(point(200, 90), point(100, 40)).unwrap();

        for raw in [0, 99, 150, 151, 333, 1023] {
            assert_eq!(forward.degrees(raw), reversed.degrees(raw), "raw {raw}");
        }
    }

    #[test]
    fn extreme_points_do_not_overflow() {
        let wide = TwoPointCalibration::new(
            point(-2_000_000_000, -2_000_000_000),
            point(2_000_000_000, 2_000_000_000),
        )
        .unwrap();

        assert_eq!(wide.degrees(0), 0);
        assert_eq!(wide.degrees(i32::MAX), i32::MAX);
        assert_eq!(wide.degrees(i32::MIN), i32::MIN);
        assert_eq!(wide.raw_for_degrees(12.0), 12);

        let steep = TwoPointCalibration::new(point(0, 0), point(1, 2_000_000_000)).unwrap();
        assert_eq!(steep.degrees(10), i32::MAX);
        assert_eq!(steep.degrees(-10), i32::MIN);
    }

    #[test]
    fn duplicate_raw_sample_is_rejected() {
        let err = TwoPointCalibration::new(point(400, 60), point(400, 80)).unwrap_err();
        assert_eq!(err, CalibrationError::DuplicateRawSample(400));
    }

    #[test]
    fn linear_form_uses_fixed_coefficients() {
        let mapping = LinearCalibration::new(0.5, -10.0).unwrap();

        assert_eq!(mapping.degrees(150), 65);
        assert_eq!(mapping.raw_for_degrees(65.0), 150);
        assert!(LinearCalibration::new(f64::NAN, 0.0).is_err());
        assert_eq!(LinearCalibration::new(0.0, 1.0), Err(CalibrationError::ZeroScale));
    }

    #[test]
    fn inverse_mapping_round_trips_whole_degrees() {
        let mapping = CalibrationConfig::default().build().unwrap();

        for degrees in 55..=85 {
            let raw = mapping.raw_for_degrees(degrees as f64);
            assert_eq!(mapping.degrees(raw), degrees);
        }
    }

    #[test]
    fn config_deserializes_tagged_forms() {
        let two_point: CalibrationConfig = serde_json::from_str(
            r#"{"kind":"two_point","low":{"raw":100,"degrees":40},"high":{"raw":200,"degrees":90}}"#,
        )
        .unwrap();
        assert_eq!(two_point, CalibrationConfig::default());

        let linear: CalibrationConfig =
            serde_json::from_str(r#"{"kind":"linear","scale":0.5,"offset":-10.0}"#).unwrap();
        assert_eq!(linear.build().unwrap().degrees(150), 65);
    }
}
