use crate::types::ButtonId;

/// Last two samples of one button, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonEdgeState {
    pub was_down: bool,
    pub is_down: bool,
}

impl ButtonEdgeState {
    fn shift(&mut self, down: bool) {
        self.was_down = self.is_down;
        self.is_down = down;
    }

    pub fn pressed(self) -> bool {
        self.is_down && !self.was_down
    }

    pub fn released(self) -> bool {
        !self.is_down && self.was_down
    }

    pub fn is_down(self) -> bool {
        self.is_down
    }
}

/// Both buttons as sampled on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonSnapshot {
    pub left: ButtonEdgeState,
    pub right: ButtonEdgeState,
}

impl ButtonSnapshot {
    pub fn get(&self, button: ButtonId) -> ButtonEdgeState {
        match button {
            ButtonId::Left => self.left,
            ButtonId::Right => self.right,
        }
    }

    pub fn both_up(&self) -> bool {
        !self.left.is_down && !self.right.is_down
    }
}

/// Single-sample edge detector for the two menu buttons.
///
/// Levels are expected already polarity-corrected (`true` = pressed). Mechanical
/// bounce is assumed to be filtered by hardware or by the tick rate.
#[derive(Debug, Clone, Default)]
pub struct ButtonDebouncer {
    snapshot: ButtonSnapshot,
}

impl ButtonDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one tick's levels. Both buttons are shifted before any query is
    /// answered so the tick sees a consistent pair.
    pub fn sample(&mut self, left_down: bool, right_down: bool) -> ButtonSnapshot {
        self.snapshot.left.shift(left_down);
        self.snapshot.right.shift(right_down);
        self.snapshot
    }

    pub fn pressed_this_tick(&self, button: ButtonId) -> bool {
        self.snapshot.get(button).pressed()
    }

    pub fn released_this_tick(&self, button: ButtonId) -> bool {
        self.snapshot.get(button).released()
    }

    pub fn is_currently_down(&self, button: ButtonId) -> bool {
        self.snapshot.get(button).is_down()
    }
}
