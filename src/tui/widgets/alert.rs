use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::Line,
    widgets::{Block, Clear, Paragraph},
};
use tui_big_text::{BigText, PixelSize};

use crate::alert::AlertSession;
use crate::tui::theme;
use crate::utils::format::format_time;

/// Full-screen alert surface. `open` is how many alerts are stacked,
/// this one included.
pub fn render(frame: &mut Frame, area: Rect, session: &AlertSession, open: usize) {
    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(theme::alert()), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(8), // big text
            Constraint::Length(2),
            Constraint::Min(0),    // details
            Constraint::Length(1), // hint
        ])
        .split(area);

    let big = BigText::builder()
        .pixel_size(PixelSize::Full)
        .style(theme::alert().add_modifier(Modifier::BOLD))
        .lines(vec![Line::from("Pray.")])
        .alignment(Alignment::Center)
        .build();
    frame.render_widget(big, chunks[1]);

    let mut details = Vec::new();
    match session.prayer {
        Some(p) => details.push(Line::from(format!(
            "{}  ·  {}",
            p.name.display_name().to_uppercase(),
            format_time(p.at.time())
        ))),
        None => details.push(Line::from("Test alert")),
    }
    details.push(Line::from(format!(
        "since {}",
        session.fired_at.format("%H:%M:%S")
    )));
    if let Some(bg) = session.background_name() {
        details.push(Line::from(format!("background: {}", bg)));
    }
    if session.is_playing() {
        details.push(Line::from("♪ playing"));
    }
    frame.render_widget(
        Paragraph::new(details)
            .style(theme::alert())
            .alignment(Alignment::Center),
        chunks[3],
    );

    let hint = if open > 1 {
        format!("[Esc] dismiss  ·  {} alerts open", open)
    } else {
        "[Esc] dismiss".to_string()
    };
    frame.render_widget(
        Paragraph::new(hint)
            .style(theme::alert())
            .alignment(Alignment::Center),
        chunks[4],
    );
}
