use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(14, 18, 22);
pub const SURFACE: Color = Color::Rgb(22, 28, 34);
pub const BORDER: Color = Color::Rgb(48, 60, 70);
pub const TEXT: Color = Color::Rgb(222, 228, 232);
pub const TEXT_DIM: Color = Color::Rgb(112, 126, 138);
pub const GOLD: Color = Color::Rgb(196, 160, 68);
pub const TEAL: Color = Color::Rgb(72, 168, 160);
pub const RED: Color = Color::Rgb(180, 82, 62);
pub const ALERT_BG: Color = Color::Rgb(150, 20, 20);
pub const ALERT_TEXT: Color = Color::Rgb(10, 10, 10);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn teal() -> Style {
    Style::default().fg(TEAL)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn alert() -> Style {
    Style::default().fg(ALERT_TEXT).bg(ALERT_BG)
}
