use crate::{
    config::{ControlPolicy, ControllerConfig, HysteresisBand},
    schedule::Schedule,
    types::{ClockTime, Mode},
};

/// Everything the heater decision reads on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThermostatInputs {
    pub temp_f: i32,
    pub time: ClockTime,
    pub target_f: i32,
    pub mode: Mode,
    pub heating: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    pub armed: bool,
    pub cold: bool,
    pub hot: bool,
    /// Actuator command for this tick.
    pub heat: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThermostatEngine {
    band: HysteresisBand,
    schedule: Schedule,
    policy: ControlPolicy,
}

impl ThermostatEngine {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            band: config.band,
            schedule: config.schedule,
            policy: config.policy,
        }
    }

    pub fn evaluate(&self, inputs: &ThermostatInputs) -> Decision {
        let armed = self.schedule.is_armed(inputs.time);
        let editing = inputs.mode != Mode::Normal;

        match self.policy {
            ControlPolicy::Banded => {
                let cold = inputs.temp_f <= inputs.target_f - self.band.tolerance_down;
                let hot = inputs.temp_f >= inputs.target_f + self.band.tolerance_up;

                let heat = if hot || !armed || editing {
                    false
                } else if cold {
                    true
                } else {
                    inputs.heating
                };

                Decision {
                    armed,
                    cold,
                    hot,
                    heat,
                }
            }
            ControlPolicy::Direct => {
                let cold = inputs.temp_f < inputs.target_f;
                let hot = inputs.temp_f > inputs.target_f;

                Decision {
                    armed,
                    cold,
                    hot,
                    heat: armed && cold && !editing,
                }
            }
        }
    }
}
