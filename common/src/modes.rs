//! Two-button menu.
//!
//! [`transition`] and [`effects`] are pure functions of the mode at the start of the
//! tick and that tick's button snapshot. [`ModeStateMachine::apply`] combines them
//! against [`ControllerState`]: it commits target changes itself and hands clock
//! adjustments back, since the clock belongs to the board.

use crate::{
    buttons::ButtonSnapshot,
    config::{ControllerConfig, MenuLayout, TargetOverflow},
    controller::ControllerState,
    types::{ClockTime, Mode},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEffect {
    /// Move the target by this many degrees.
    StepTarget(i32),
    /// Shift the wall clock by this many seconds.
    AdjustClock(i32),
}

pub fn transition(layout: MenuLayout, mode: Mode, buttons: &ButtonSnapshot) -> Mode {
    let advance = buttons.left.released();

    match (layout, mode) {
        (MenuLayout::Gesture, Mode::Normal) => {
            let chord = (buttons.left.pressed() && buttons.right.is_down())
                || (buttons.right.pressed() && buttons.left.is_down());
            if chord {
                Mode::EnterSet
            } else {
                Mode::Normal
            }
        }
        (_, Mode::EnterSet) => {
            if buttons.both_up() {
                Mode::SetHour
            } else {
                Mode::EnterSet
            }
        }
        (MenuLayout::Cycle, Mode::Normal) if advance => Mode::SetHour,
        (_, Mode::SetHour) if advance => Mode::SetMinute,
        (_, Mode::SetMinute) if advance => Mode::SetSecond,
        (MenuLayout::Gesture, Mode::SetSecond) if advance => Mode::Normal,
        (MenuLayout::Cycle, Mode::SetSecond) if advance => Mode::SetTarget,
        (_, Mode::SetTarget) if advance => Mode::Normal,
        (_, mode) => mode,
    }
}

pub fn effects(
    layout: MenuLayout,
    mode: Mode,
    buttons: &ButtonSnapshot,
    now: ClockTime,
) -> Vec<ModeEffect> {
    let mut effects = Vec::new();
    let change = buttons.right.released();

    match mode {
        Mode::Normal => {
            if layout == MenuLayout::Gesture {
                if buttons.left.released() {
                    effects.push(ModeEffect::StepTarget(1));
                }
                if change {
                    effects.push(ModeEffect::StepTarget(-1));
                }
            }
        }
        Mode::EnterSet => {}
        Mode::SetHour if change => effects.push(ModeEffect::AdjustClock(3600)),
        // Step back to :00 ourselves at 59 so the clock's carry never bumps the
        // next field up.
        Mode::SetMinute if change => {
            let delta = if now.minute >= 59 { -59 * 60 } else { 60 };
            effects.push(ModeEffect::AdjustClock(delta));
        }
        Mode::SetSecond if change => {
            let delta = if now.second >= 59 { -59 } else { 1 };
            effects.push(ModeEffect::AdjustClock(delta));
        }
        Mode::SetTarget if change => effects.push(ModeEffect::StepTarget(1)),
        _ => {}
    }

    effects
}

/// Result of stepping the target once under an overflow policy.
pub fn step_target(target: i32, delta: i32, min: i32, max: i32, overflow: TargetOverflow) -> i32 {
    let next = target.saturating_add(delta);
    match overflow {
        TargetOverflow::Clamp => next.clamp(min, max),
        TargetOverflow::Wrap => {
            if next > max {
                min
            } else if next < min {
                max
            } else {
                next
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeStateMachine {
    layout: MenuLayout,
    target_min: i32,
    target_max: i32,
    overflow: TargetOverflow,
}

impl ModeStateMachine {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            layout: config.layout,
            target_min: config.target_min,
            target_max: config.target_max,
            overflow: config.target_overflow,
        }
    }

    /// Advances `state.mode` on this tick's edges, applies target steps, and returns
    /// the clock adjustments the caller must forward to the clock source.
    pub fn apply(
        &self,
        state: &mut ControllerState,
        buttons: &ButtonSnapshot,
        now: ClockTime,
    ) -> Vec<i32> {
        let mode = state.mode;
        let mut adjustments = Vec::new();
        // The target field only steps upward and always wraps.
        let overflow = if mode == Mode::SetTarget {
            TargetOverflow::Wrap
        } else {
            self.overflow
        };

        for effect in effects(self.layout, mode, buttons, now) {
            match effect {
                ModeEffect::StepTarget(delta) => {
                    state.target = step_target(
                        state.target,
                        delta,
                        self.target_min,
                        self.target_max,
                        overflow,
                    );
                }
                ModeEffect::AdjustClock(delta) => adjustments.push(delta),
            }
        }

        state.mode = transition(self.layout, mode, buttons);
        adjustments
    }
}
