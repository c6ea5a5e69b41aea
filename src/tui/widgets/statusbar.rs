use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, status: Option<&str>) {
    let line = match status {
        Some(msg) => Line::from(Span::styled(msg, theme::teal())),
        None => {
            let hints = [
                ("[r]", " refresh  "),
                ("[l]", " location  "),
                ("[^⇧D]", " test alert  "),
                ("[?]", " help  "),
                ("[q]", " quit"),
            ];
            let mut spans = Vec::new();
            for (key, label) in hints {
                spans.push(Span::styled(key, theme::gold()));
                spans.push(Span::styled(label, theme::dim()));
            }
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
