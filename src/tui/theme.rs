use ratatui::style::Color;

use crate::model::task::Quadrant;

/// Colors used by the board
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub dim: Color,
    /// Finished tasks
    pub done: Color,
    /// Overdue countdown, refusals
    pub alert: Color,
    pub highlight: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    /// Pane backgrounds in board order
    pub quadrant_bg: [Color; 4],
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x2C, 0x3E, 0x50),
            text: Color::Rgb(0xF0, 0xF0, 0xF0),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            dim: Color::Rgb(0x95, 0xA1, 0xAC),
            done: Color::Rgb(0xA0, 0xA0, 0xA0),
            alert: Color::Rgb(0xFF, 0x76, 0x75),
            highlight: Color::Rgb(0x1A, 0xBC, 0x9C),
            selection_bg: Color::Rgb(0x1A, 0xBC, 0x9C),
            selection_fg: Color::Rgb(0x10, 0x1C, 0x26),
            quadrant_bg: [
                Color::Rgb(0x50, 0x52, 0x4A),
                Color::Rgb(0x57, 0x3E, 0x4C),
                Color::Rgb(0x2B, 0x54, 0x61),
                Color::Rgb(0x49, 0x3E, 0x5D),
            ],
        }
    }
}

impl Theme {
    pub fn quadrant_bg(&self, quadrant: Quadrant) -> Color {
        self.quadrant_bg[quadrant.index()]
    }

    /// Countdown color: alert once the target date has passed
    pub fn countdown_color(&self, overdue: bool) -> Color {
        if overdue { self.alert } else { self.text_bright }
    }
}
