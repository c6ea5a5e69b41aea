use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::prayer_times::Countdown;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, countdown: &Countdown) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let headline_style = match countdown.next {
        Some(_) => theme::gold().add_modifier(Modifier::BOLD),
        None => theme::dim(),
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(countdown.headline(), headline_style)),
        Line::from(""),
        Line::from(Span::styled(
            countdown.clock(),
            theme::teal().add_modifier(Modifier::BOLD),
        )),
    ];

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
