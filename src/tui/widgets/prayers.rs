use chrono::NaiveDateTime;
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
};

use crate::models::{NextPrayer, PrayerName, PrayerSchedule};
use crate::tui::theme;
use crate::utils::format::format_time;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    schedule: &PrayerSchedule,
    next: Option<&NextPrayer>,
    now: NaiveDateTime,
) {
    let block = Block::default()
        .title(Span::styled(" Today ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let items: Vec<ListItem> = PrayerName::ALL
        .iter()
        .map(|name| {
            let at = schedule.get(*name);
            let is_next = next.is_some_and(|n| n.name == *name);

            let time_str = at
                .map(|t| format_time(t.time()))
                .unwrap_or_else(|| "--:--".to_string());

            let (icon, label, style) = match at {
                _ if is_next => ("▶", "next", theme::gold().add_modifier(Modifier::BOLD)),
                Some(t) if t <= now => ("·", "passed", theme::dim()),
                Some(_) => ("○", "upcoming", theme::bold()),
                None => ("?", "no data", theme::red()),
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("  {} ", icon), style),
                Span::styled(format!("{:<9}", name.display_name()), style),
                Span::styled(format!("{:<7}", time_str), theme::dim()),
                Span::styled(label, theme::dim()),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
