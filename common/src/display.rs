use crate::{
    config::ControllerConfig,
    types::{ClockTime, Mode},
};

/// State the renderer draws from. Built fresh every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayView {
    pub mode: Mode,
    pub temp_f: i32,
    pub raw: i32,
    pub target_f: i32,
    pub time: ClockTime,
    pub heating: bool,
    pub armed: bool,
    pub cold: bool,
    pub hot: bool,
    /// Monotonic milliseconds since boot; drives the flash phase.
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub lines: [String; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Heating,
    Setup,
    Heat,
    TooHot,
    TempOk,
    Cold,
    Standby,
}

impl Status {
    pub fn from_view(view: &DisplayView) -> Self {
        if view.heating {
            Self::Heating
        } else if view.mode.is_setting() {
            Self::Setup
        } else if view.cold && view.armed {
            Self::Heat
        } else if view.hot {
            Self::TooHot
        } else if view.armed {
            Self::TempOk
        } else if view.cold {
            Self::Cold
        } else {
            Self::Standby
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heating => "HEATING",
            Self::Setup => "SETUP",
            Self::Heat => "HEAT",
            Self::TooHot => "TOO HOT",
            Self::TempOk => "TEMP OK",
            Self::Cold => "COLD",
            Self::Standby => "STANDBY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRenderer {
    width: usize,
    flash_period_ms: u64,
}

impl DisplayRenderer {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            width: config.display_width,
            flash_period_ms: config.flash_period_ms.max(1),
        }
    }

    /// `true` during the lit half of the flash cycle.
    pub fn flash_visible(&self, elapsed_ms: u64) -> bool {
        elapsed_ms % self.flash_period_ms.saturating_mul(2) < self.flash_period_ms
    }

    pub fn render(&self, view: &DisplayView) -> Frame {
        let lit = self.flash_visible(view.elapsed_ms);
        let blank = |editing: bool| editing && !lit;

        let target = if blank(view.mode == Mode::SetTarget) {
            "   ".to_string()
        } else {
            format!("{:>3}", view.target_f)
        };
        let top = format!("{:>3}F {:>4} SET{target}", view.temp_f, view.raw);

        let hour = field(view.time.hour, blank(view.mode == Mode::SetHour));
        let minute = field(view.time.minute, blank(view.mode == Mode::SetMinute));
        let second = field(view.time.second, blank(view.mode == Mode::SetSecond));

        let status = Status::from_view(view);
        let word = if status == Status::Heating && !lit {
            ""
        } else {
            status.as_str()
        };
        let bottom = format!("{hour}:{minute}:{second} {word}");

        Frame {
            lines: [fit(&top, self.width), fit(&bottom, self.width)],
        }
    }
}

fn field(value: u8, blank: bool) -> String {
    if blank {
        "  ".to_string()
    } else {
        format!("{value:02}")
    }
}

fn fit(text: &str, width: usize) -> String {
    let mut line: String = text.chars().take(width).collect();
    let len = line.chars().count();
    line.extend(std::iter::repeat(' ').take(width - len));
    line
}
