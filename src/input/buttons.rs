use serde::{Deserialize, Serialize};

/// Physical buttons on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonId {
    Back,
    Up,
    Select,
    Down,
}

/// The three buttons that carry tile content, top to bottom
pub const ACTION_BUTTONS: [ButtonId; 3] = [ButtonId::Up, ButtonId::Select, ButtonId::Down];

impl ButtonId {
    /// Row of the label/icon this button drives (0 = top)
    pub fn row(self) -> Option<usize> {
        match self {
            ButtonId::Up => Some(0),
            ButtonId::Select => Some(1),
            ButtonId::Down => Some(2),
            ButtonId::Back => None,
        }
    }

    /// Integer form written to the resume marker
    pub fn code(self) -> u8 {
        match self {
            ButtonId::Back => 0,
            ButtonId::Up => 1,
            ButtonId::Select => 2,
            ButtonId::Down => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ButtonId::Back),
            1 => Some(ButtonId::Up),
            2 => Some(ButtonId::Select),
            3 => Some(ButtonId::Down),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ButtonId::Back => "back",
            ButtonId::Up => "up",
            ButtonId::Select => "select",
            ButtonId::Down => "down",
        }
    }
}

/// Discrete input events delivered to the windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Press and release shorter than the long-press threshold
    Click(ButtonId),
    /// Button held past the long-press threshold
    LongPressStart(ButtonId),
    /// Release of a button whose long press already fired
    LongPressRelease(ButtonId),
    /// Clicks counted together inside the multi-click window
    MultiClick { button: ButtonId, count: u8 },
    /// Wrist flick / tap detected by the motion sensor
    Tap,
}
