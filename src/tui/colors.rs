//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Status;

/// Brand accent: headers, focused borders, the status bar.
pub const PLUM: Color = Color::Rgb(123, 25, 132);
/// TO-DO header
pub const PINK: Color = Color::Rgb(250, 195, 255);
/// IN-PROGRESS header
pub const SKY: Color = Color::Rgb(133, 217, 241);
/// COMPLETED header
pub const SAGE: Color = Color::Rgb(162, 214, 160);
/// Card background
pub const CARD: Color = Color::Rgb(241, 241, 241);
/// Inline validation errors
pub const ERROR_RED: Color = Color::Rgb(200, 40, 40);

/// Header colour for a status section or board column.
pub fn status_color(status: Status) -> Color {
    match status {
        Status::ToDo => PINK,
        Status::InProgress => SKY,
        Status::Completed => SAGE,
    }
}
