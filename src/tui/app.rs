use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::info;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::sync::Arc;
use std::time::Duration;

use crate::alert::{AlertSession, Alerter};
use crate::models::{LocationCell, PrayerSchedule};
use crate::prayer_times::{Countdown, CountdownTicker, RefreshLoop, Refresher, ScheduleStore};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{alert, header, next_prayer, prayers, statusbar};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationField {
    City,
    Country,
}

/// Free-text city/country entry. Applying it drops any detected coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationForm {
    pub city: String,
    pub country: String,
    pub field: LocationField,
    pub error: Option<String>,
}

impl LocationForm {
    pub fn new(city: &str, country: &str) -> Self {
        Self {
            city: city.to_string(),
            country: country.to_string(),
            field: LocationField::City,
            error: None,
        }
    }

    fn focused(&mut self) -> &mut String {
        match self.field {
            LocationField::City => &mut self.city,
            LocationField::Country => &mut self.country,
        }
    }

    pub fn switch_field(&mut self) {
        self.field = match self.field {
            LocationField::City => LocationField::Country,
            LocationField::Country => LocationField::City,
        };
    }

    pub fn push(&mut self, c: char) {
        self.focused().push(c);
        self.error = None;
    }

    pub fn pop(&mut self) {
        self.focused().pop();
        self.error = None;
    }

    /// Trimmed (city, country), or an error message when either is blank.
    pub fn validate(&self) -> Result<(String, String), String> {
        let city = self.city.trim();
        let country = self.country.trim();
        if city.is_empty() || country.is_empty() {
            return Err("City and country are both required".to_string());
        }
        Ok((city.to_string(), country.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Location(LocationForm),
}

/// What a key press asks the outside world to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Quit,
    Refresh,
    FireAlert,
    DismissAlert,
    SetLocation { city: String, country: String },
}

pub struct App {
    pub location: LocationCell,
    pub store: ScheduleStore,
    pub input_mode: InputMode,
    pub show_help: bool,
    pub status: Option<String>,
    pub countdown: Countdown,
    pub now: NaiveDateTime,
    pub alerts: Vec<AlertSession>,
}

impl App {
    pub fn new(location: LocationCell, store: ScheduleStore) -> Self {
        App {
            location,
            store,
            input_mode: InputMode::Normal,
            show_help: false,
            status: None,
            countdown: Countdown::empty(),
            now: Local::now().naive_local(),
            alerts: Vec::new(),
        }
    }

    /// Map a key to an action, updating purely local UI state on the way.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        // Some terminals also report release/repeat
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }
        if is_debug_alert(&key) {
            return Action::FireAlert;
        }
        if !self.alerts.is_empty() {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => Action::DismissAlert,
                _ => Action::None,
            };
        }

        match &mut self.input_mode {
            InputMode::Location(form) => match key.code {
                KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                    Action::None
                }
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    form.switch_field();
                    Action::None
                }
                KeyCode::Enter => match form.validate() {
                    Ok((city, country)) => {
                        self.input_mode = InputMode::Normal;
                        Action::SetLocation { city, country }
                    }
                    Err(msg) => {
                        form.error = Some(msg);
                        Action::None
                    }
                },
                KeyCode::Backspace => {
                    form.pop();
                    Action::None
                }
                KeyCode::Char(c) => {
                    form.push(c);
                    Action::None
                }
                _ => Action::None,
            },
            InputMode::Normal => {
                if self.show_help {
                    self.show_help = false;
                    return Action::None;
                }
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
                    KeyCode::Char('r') => Action::Refresh,
                    KeyCode::Char('l') => {
                        let loc = self.location.get();
                        self.input_mode = InputMode::Location(LocationForm::new(&loc.city, &loc.country));
                        Action::None
                    }
                    KeyCode::Char('?') => {
                        self.show_help = true;
                        Action::None
                    }
                    _ => Action::None,
                }
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        if let Some(top) = self.alerts.last() {
            alert::render(frame, area, top, self.alerts.len());
            return;
        }

        self.draw_dashboard(frame, area);

        if let InputMode::Location(form) = &self.input_mode {
            draw_location_form(frame, area, form);
        }
        if self.show_help {
            draw_help_overlay(frame, area);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer[0], &self.location.get().label(), self.now);
        statusbar::render(frame, outer[2], self.status.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(outer[1]);

        let schedule: PrayerSchedule = self.store.snapshot();
        prayers::render(frame, columns[0], &schedule, self.countdown.next.as_ref(), self.now);
        next_prayer::render(frame, columns[1], &self.countdown);
    }
}

/// Ctrl+Shift+D. Terminals disagree on whether shift shows up as a modifier
/// or only as the upper-case letter.
fn is_debug_alert(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && (key.code == KeyCode::Char('D')
            || (key.code == KeyCode::Char('d') && key.modifiers.contains(KeyModifiers::SHIFT)))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_location_form(frame: &mut Frame, area: Rect, form: &LocationForm) {
    let height = if form.error.is_some() { 9 } else { 7 };
    let popup = centered(area, 56, height);
    frame.render_widget(Clear, popup);

    let field = |label: &str, value: &str, focused: bool| {
        let value_style = if focused {
            theme::gold().add_modifier(Modifier::BOLD)
        } else {
            theme::bold()
        };
        let mut spans = vec![
            Span::styled(format!("  {:<9}", label), theme::dim()),
            Span::styled(value.to_string(), value_style),
        ];
        if focused {
            spans.push(Span::styled("█", theme::gold()));
        }
        Line::from(spans)
    };

    let mut text = vec![
        Line::from(""),
        field("City:", &form.city, form.field == LocationField::City),
        field("Country:", &form.country, form.field == LocationField::Country),
        Line::from(""),
        Line::from(Span::styled(
            "  [Tab] switch  ·  [Enter] apply  ·  [Esc] cancel",
            theme::dim(),
        )),
    ];
    if let Some(err) = &form.error {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
    }

    let block = Block::default()
        .title(Span::styled(" Set Location ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if form.error.is_some() { theme::red() } else { theme::gold() })
        .style(theme::surface());

    frame.render_widget(Paragraph::new(text).block(block), popup);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered(area, 48, 12);
    frame.render_widget(Clear, popup);

    let keys = [
        ("[r]", "Refresh prayer times now"),
        ("[l]", "Set city / country"),
        ("[Ctrl+Shift+D]", "Show a test alert"),
        ("[Esc]", "Dismiss alert"),
        ("[?]", "Toggle help"),
        ("[q] / [Esc]", "Quit"),
    ];

    let mut help_text = vec![
        Line::from(Span::styled("  Keybindings", theme::gold().add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];
    for (key, what) in keys {
        help_text.push(Line::from(vec![
            Span::styled(format!("  {:<16}", key), theme::gold()),
            Span::styled(what, theme::dim()),
        ]));
    }

    let block = Block::default()
        .title(Span::styled(" Help ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface());

    frame.render_widget(Paragraph::new(help_text).block(block), popup);
}

/// Run the TUI event loop. The refresh worker is stopped before returning.
pub fn run(
    refresher: Arc<Refresher>,
    refresh_loop: RefreshLoop,
    mut alerter: Alerter,
) -> Result<()> {
    let ticker = CountdownTicker::new(refresher.clone());
    let mut app = App::new(refresher.location().clone(), refresher.store().clone());

    let mut terminal = ratatui::init();
    let events = EventHandler::new(TICK);

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame)).context("Drawing frame")?;

            match events.next().context("Event channel closed")? {
                Event::Key(key) => match app.handle_key(key) {
                    Action::None => {}
                    Action::Quit => break,
                    Action::Refresh => {
                        refresh_loop.request_refresh();
                        app.status = Some("Refreshing prayer times…".to_string());
                    }
                    Action::FireAlert => {
                        let session = alerter.fire(app.countdown.next);
                        app.alerts.push(session);
                    }
                    Action::DismissAlert => {
                        app.alerts.pop();
                    }
                    Action::SetLocation { city, country } => {
                        app.location.set_city_country(&city, &country);
                        info!("location set to {}, {}", city, country);
                        refresh_loop.request_refresh();
                        app.status = Some(format!("Location set to {}, {}", city, country));
                    }
                },
                Event::Resize => {}
                Event::Tick => {
                    app.now = Local::now().naive_local();
                    app.countdown = ticker.tick(app.now);
                    if app.countdown.is_due() {
                        let session = alerter.fire(app.countdown.next);
                        app.alerts.push(session);
                    }
                    if app.status.is_some() && !app.store.is_empty() {
                        app.status = None;
                    }
                }
            }
        }
        Ok(())
    })();

    ratatui::restore();
    app.alerts.clear();
    refresh_loop.stop();
    result
}
