use crate::api::{ApiError, OptimizerClient, SelectedCourse};
use crate::blocker_form::{BlockerForm, BlockerFormState, FormOutput};
use crate::calendar::{Agenda, BusyDays, ListView, MonthView, TimeGrid, YearView};
use crate::config_menu::{ConfigMenu, ConfigMenuState, ConfigOutput};
use crate::configuration::Configuration;
use crate::context::{CalendarContext, SidebarState, View};
use crate::coordinator::{Coordinator, ViewEvent};
use crate::goto::{GoTo, GoToInput, GoToOutput, GoToState};
use crate::header::{Header, HeaderRegions, HeaderTarget};
use crate::help::Help;
use crate::settings::Settings;
use crate::shortcuts::{Intent, KeyDispatcher};
use crate::sidebar::{Sidebar, SIDEBAR_WIDTH};
use crate::theme::{self, Theme};
use crate::throttle::{Throttle, INPUT_INTERVAL};
use crate::transition::Direction;
use crate::view_menu::{ViewMenu, ViewMenuOutput, ViewMenuState};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::Span,
    widgets::{StatefulWidget, Widget},
    DefaultTerminal,
};
use std::io::{self, Write};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};
use time::Date;
use tokio::runtime::Handle;

/// How long to wait for terminal input before redrawing anyway, so that
/// slide markers expire and network replies show up
const POLL_INTERVAL: Duration = Duration::from_millis(50);

static STATUS_HINT: &str = "? shortcuts  a configure  f blockers  o optimize  q quit";

#[derive(Debug)]
pub(crate) struct App {
    settings: Settings,
    config: Configuration,
    coordinator: Coordinator,
    keys: KeyDispatcher,
    header_throttle: Throttle,
    header: HeaderRegions,
    overlay: Overlay,
    /// The view the view menu marks as active
    styled_view: View,
    /// Any date in the month shown by the sidebar's date picker
    picker: Date,
    courses: Vec<SelectedCourse>,
    departments: Vec<String>,
    status: Option<Status>,
    optimizing: bool,
    client: OptimizerClient,
    runtime: Handle,
    replies_tx: Sender<Reply>,
    replies_rx: Receiver<Reply>,
    quitting: bool,
}

impl App {
    pub(crate) fn new(settings: Settings, today: Date, runtime: Handle) -> App {
        let context = CalendarContext::new(today, settings.default_view);
        let (replies_tx, replies_rx) = channel();
        App {
            config: Configuration::new(),
            coordinator: Coordinator::new(context, settings.animations),
            keys: KeyDispatcher::new(settings.shortcuts),
            header_throttle: Throttle::new(INPUT_INTERVAL),
            header: HeaderRegions::default(),
            overlay: Overlay::None,
            styled_view: settings.default_view,
            picker: today,
            courses: Vec::new(),
            departments: Vec::new(),
            status: None,
            optimizing: false,
            client: OptimizerClient::new(&settings.server),
            runtime,
            replies_tx,
            replies_rx,
            quitting: false,
            settings,
        }
    }

    /// Start out showing the period containing `date` instead of today
    pub(crate) fn start_date(mut self, date: Date) -> App {
        self.coordinator.jump_to(date);
        self
    }

    pub(crate) fn run(mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        let initial = self.coordinator.context().view();
        self.coordinator.render_option(initial, true);
        self.fetch_departments();
        while !self.quitting {
            self.receive_replies();
            self.process_view_events();
            terminal.draw(|frame| frame.render_widget(&mut self, frame.area()))?;
            if event::poll(POLL_INTERVAL)? {
                self.handle_event(event::read()?, Instant::now())?;
            }
        }
        tracing::info!("Quitting");
        Ok(())
    }

    fn handle_event(&mut self, ev: Event, now: Instant) -> io::Result<()> {
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = ev.as_key_press_event()
        {
            if !self.handle_key(code, modifiers, now) {
                self.beep()?;
            }
            return Ok(());
        }
        if let Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) = ev
        {
            self.handle_click(column, row, now);
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed a key an open overlay rejects
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) -> bool {
        if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
            self.quitting = true;
            return true;
        }
        let overlay_open = self.overlay.is_open();
        if let Some(intent) = self.keys.dispatch(code, modifiers, overlay_open, now) {
            self.perform(intent, now);
            true
        } else if overlay_open && !modifiers.contains(KeyModifiers::CONTROL) {
            self.handle_overlay_key(code)
        } else {
            // Unknown, throttled, and disabled shortcuts fall through
            true
        }
    }

    fn handle_click(&mut self, column: u16, row: u16, now: Instant) {
        if self.overlay.is_open() || !self.header_throttle.admit(now) {
            return;
        }
        if let Some(target) = self.header.target_at(column, row) {
            tracing::debug!(?target, "Header clicked");
            self.perform(target.intent(), now);
        }
    }

    fn perform(&mut self, intent: Intent, now: Instant) {
        match intent {
            Intent::ShowView(view) => {
                self.coordinator.render_option(view, false);
            }
            Intent::ToggleSidebar => self.coordinator.context_mut().toggle_sidebar(),
            Intent::OpenForm => self.overlay = Overlay::Blockers(BlockerFormState::new()),
            Intent::ToggleViewMenu => {
                let active = self.coordinator.context().view();
                self.overlay = Overlay::ViewMenu(ViewMenuState::new(active));
            }
            Intent::Previous => self.coordinator.navigate(Direction::Previous, now),
            Intent::Next => self.coordinator.navigate(Direction::Next, now),
            Intent::Today => self.coordinator.today(),
            Intent::OpenConfigMenu => {
                self.overlay = Overlay::Config(ConfigMenuState::new(
                    &self.config,
                    &self.settings.semesters,
                ));
            }
            Intent::ShowShortcuts => self.overlay = Overlay::Help,
            Intent::CycleColorScheme => self.coordinator.context_mut().cycle_color_scheme(),
            Intent::OpenGoTo => self.overlay = Overlay::GoTo(GoToState::new()),
            Intent::Optimize => self.optimize(),
            Intent::Quit => self.quitting = true,
        }
        self.process_view_events();
    }

    fn handle_overlay_key(&mut self, key: KeyCode) -> bool {
        match &mut self.overlay {
            Overlay::None => false,
            Overlay::Help => {
                self.overlay = Overlay::None;
                true
            }
            Overlay::GoTo(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.overlay = Overlay::None;
                    return true;
                }
                let output = match key {
                    KeyCode::Char(c) => c
                        .to_digit(10)
                        .and_then(|d| u8::try_from(d).ok())
                        .map_or(GoToOutput::Invalid, |d| {
                            state.handle_input(GoToInput::Digit(d))
                        }),
                    KeyCode::Backspace | KeyCode::Delete => {
                        state.handle_input(GoToInput::Backspace)
                    }
                    KeyCode::Enter => state.handle_input(GoToInput::Enter),
                    _ => GoToOutput::Invalid,
                };
                match output {
                    GoToOutput::Ok => true,
                    GoToOutput::Invalid => false,
                    GoToOutput::Jump(date) => {
                        self.overlay = Overlay::None;
                        tracing::debug!(%date, "Jumping to date");
                        self.coordinator.jump_to(date);
                        self.process_view_events();
                        true
                    }
                }
            }
            Overlay::ViewMenu(state) => match state.handle_key(key) {
                ViewMenuOutput::Ok => true,
                ViewMenuOutput::Invalid => false,
                ViewMenuOutput::Close => {
                    self.overlay = Overlay::None;
                    true
                }
                ViewMenuOutput::Choose(view) => {
                    if !self.coordinator.render_option(view, false) {
                        self.overlay = Overlay::None;
                    }
                    self.process_view_events();
                    true
                }
            },
            Overlay::Config(state) => {
                match state.handle_key(key, &mut self.config, &self.departments) {
                    ConfigOutput::Ok => true,
                    ConfigOutput::Invalid => false,
                    ConfigOutput::Close => {
                        self.overlay = Overlay::None;
                        true
                    }
                    ConfigOutput::Applied => {
                        self.overlay = Overlay::None;
                        self.status = Some(Status::Info(String::from("Configuration applied")));
                        true
                    }
                }
            }
            Overlay::Blockers(state) => match state.handle_key(key, &mut self.config) {
                FormOutput::Ok => true,
                FormOutput::Invalid => false,
                FormOutput::Close => {
                    self.overlay = Overlay::None;
                    true
                }
            },
        }
    }

    /// Hand coordinator events to the parts of the screen that follow them
    fn process_view_events(&mut self) {
        for ev in self.coordinator.drain_events() {
            match ev {
                ViewEvent::Transition {
                    view,
                    direction,
                    window,
                } => tracing::trace!(%view, ?direction, ?window, "Transition started"),
                ViewEvent::OptionsClosed => {
                    if matches!(self.overlay, Overlay::ViewMenu(_)) {
                        self.overlay = Overlay::None;
                    }
                }
                // The whole screen is redrawn on every loop turn
                ViewEvent::Rendered(view) => tracing::trace!(%view, "Re-rendering"),
                ViewEvent::OptionStyled(view) => self.styled_view = view,
                ViewEvent::DatepickerSynced(date) => self.picker = date,
            }
        }
    }

    fn optimize(&mut self) {
        if self.optimizing {
            self.status = Some(Status::Info(String::from("Still waiting for the optimizer…")));
            return;
        }
        let body = self.config.to_json();
        let client = self.client.clone();
        let tx = self.replies_tx.clone();
        self.optimizing = true;
        self.status = Some(Status::Info(String::from("Optimizing…")));
        self.runtime.spawn(async move {
            let reply = Reply::Optimized(client.optimize(&body).await);
            if tx.send(reply).is_err() {
                tracing::debug!("Optimizer reply arrived after shutdown");
            }
        });
    }

    fn fetch_departments(&self) {
        let client = self.client.clone();
        let tx = self.replies_tx.clone();
        self.runtime.spawn(async move {
            let reply = Reply::Departments(client.departments().await);
            if tx.send(reply).is_err() {
                tracing::debug!("Department list arrived after shutdown");
            }
        });
    }

    fn receive_replies(&mut self) {
        while let Ok(reply) = self.replies_rx.try_recv() {
            self.apply_reply(reply);
        }
    }

    fn apply_reply(&mut self, reply: Reply) {
        match reply {
            Reply::Optimized(Ok(courses)) => {
                self.optimizing = false;
                self.status = Some(Status::Info(format!(
                    "Optimizer selected {} course(s)",
                    courses.len()
                )));
                self.courses = courses;
            }
            Reply::Optimized(Err(e)) => {
                self.optimizing = false;
                tracing::error!(error = %e, "Optimization failed");
                self.status = Some(Status::Error(format!("Optimization failed: {e}")));
            }
            Reply::Departments(Ok(departments)) => {
                tracing::debug!(count = departments.len(), "Received departments");
                self.departments = departments;
            }
            Reply::Departments(Err(e)) => {
                tracing::warn!(error = %e, "Could not fetch departments");
                self.status = Some(Status::Error(format!("Could not load departments: {e}")));
            }
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn theme(&self) -> &'static Theme {
        theme::for_scheme(self.coordinator.context().color_scheme())
    }

    fn render_calendar(&self, area: Rect, buf: &mut Buffer) {
        let ctx = self.coordinator.context();
        let theme = self.theme();
        let agenda = Agenda {
            courses: &self.courses,
            blockers: self.config.blockers(),
        };
        let styler = BusyDays {
            agenda,
            busy: theme.base.add_modifier(Modifier::UNDERLINED | Modifier::BOLD),
            free: theme.base,
        };
        match ctx.view() {
            View::Day => TimeGrid::day(agenda, theme, ctx.date())
                .today(ctx.today())
                .selected(ctx.date_selected())
                .hours(self.settings.first_hour, self.settings.last_hour)
                .render(area, buf),
            View::Week => TimeGrid::week(agenda, theme, ctx.date())
                .today(ctx.today())
                .selected(ctx.date_selected())
                .hours(self.settings.first_hour, self.settings.last_hour)
                .render(area, buf),
            View::Month => MonthView {
                styler,
                theme,
                today: ctx.today(),
                selected: ctx.date_selected(),
                date: ctx.date(),
            }
            .render(area, buf),
            View::Year => YearView {
                styler,
                theme,
                year: ctx.date().year(),
                today: ctx.today(),
                selected: ctx.date_selected(),
            }
            .render(area, buf),
            View::List => ListView { agenda, theme }.render(area, buf),
        }
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme();
        let span = match &self.status {
            Some(Status::Info(msg)) => Span::styled(msg.as_str(), theme.base),
            Some(Status::Error(msg)) => Span::styled(msg.as_str(), theme.error),
            None => Span::styled(STATUS_HINT, theme.muted),
        };
        span.render(area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme();
        buf.set_style(area, theme.base);
        let [header_area, body, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);
        let title = self.coordinator.context().month_name();
        let header = Header {
            title: &title,
            marker: self.coordinator.marker(Instant::now()),
            theme,
        };
        self.header = HeaderRegions::layout(header_area, header.title_width());
        header.render(header_area, buf);
        let main = if self.coordinator.context().sidebar() == SidebarState::Open {
            let [side, main] =
                Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
                    .areas(body);
            let ctx = self.coordinator.context();
            Sidebar {
                config: &self.config,
                theme,
                today: ctx.today(),
                selected: ctx.date_selected(),
                picker: self.picker,
            }
            .render(side, buf);
            main
        } else {
            body
        };
        self.render_calendar(main, buf);
        self.render_status(status_area, buf);
        let menu_x = self
            .header
            .region_of(HeaderTarget::DateTime)
            .map_or(body.x, |r| r.x);
        match &mut self.overlay {
            Overlay::None => (),
            Overlay::Help => Help(theme.base).render(body, buf),
            Overlay::GoTo(state) => GoTo(theme).render(body, buf, state),
            Overlay::ViewMenu(state) => ViewMenu {
                theme,
                active: self.styled_view,
            }
            .render(
                Rect {
                    x: menu_x,
                    width: body.right().saturating_sub(menu_x),
                    ..body
                },
                buf,
                state,
            ),
            Overlay::Config(state) => ConfigMenu {
                config: &self.config,
                departments: &self.departments,
                theme,
            }
            .render(body, buf, state),
            Overlay::Blockers(state) => BlockerForm {
                blockers: self.config.blockers(),
                theme,
            }
            .render(body, buf, state),
        }
    }
}

/// Whatever is drawn over the calendar and takes the keyboard while open
#[derive(Clone, Debug, Eq, PartialEq)]
enum Overlay {
    None,
    Help,
    GoTo(GoToState),
    ViewMenu(ViewMenuState),
    Config(ConfigMenuState),
    Blockers(BlockerFormState),
}

impl Overlay {
    fn is_open(&self) -> bool {
        !matches!(self, Overlay::None)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Status {
    Info(String),
    Error(String),
}

/// Results of background requests, delivered to the UI loop
#[derive(Debug)]
enum Reply {
    Optimized(Result<Vec<SelectedCourse>, ApiError>),
    Departments(Result<Vec<String>, ApiError>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ColorScheme;
    use time::macros::date;
    use tokio::runtime::Runtime;

    const STEP: Duration = Duration::from_millis(200);

    fn app_with(settings: Settings) -> (App, Runtime) {
        let rt = Runtime::new().unwrap();
        let app = App::new(settings, date!(2026 - 10 - 18), rt.handle().clone());
        (app, rt)
    }

    fn app() -> (App, Runtime) {
        app_with(Settings::default())
    }

    fn screen(app: &mut App) -> Vec<String> {
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_owned()))
                    .collect::<String>()
            })
            .collect()
    }

    /// Press the given keys one throttle interval apart
    fn press(app: &mut App, keys: &str, start: Instant) -> Instant {
        let mut now = start;
        for c in keys.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE, now);
            now += STEP;
        }
        now
    }

    #[test]
    fn test_initial_screen() {
        let (mut app, _rt) = app();
        let rows = screen(&mut app);
        assert!(rows[0].contains("Today"), "{:?}", rows[0]);
        assert!(rows[0].contains("October 2026"), "{:?}", rows[0]);
        assert!(rows[1].contains("Mon 12"), "{:?}", rows[1]);
        assert!(rows[1].contains("Sun 18"), "{:?}", rows[1]);
        assert!(rows[29].contains("? shortcuts"));
    }

    #[test]
    fn test_view_shortcuts() {
        let (mut app, _rt) = app();
        let now = press(&mut app, "m", Instant::now());
        assert_eq!(app.coordinator.context().view(), View::Month);
        assert_eq!(app.styled_view, View::Month);
        press(&mut app, "n", now);
        assert_eq!(app.coordinator.context().date(), date!(2026 - 11 - 18));
        assert_eq!(app.picker, date!(2026 - 11 - 18));
    }

    #[test]
    fn test_throttled_keys_are_dropped() {
        let (mut app, _rt) = app();
        let now = Instant::now();
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE, now);
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE, now + Duration::from_millis(50));
        assert_eq!(app.coordinator.context().date(), date!(2026 - 10 - 25));
    }

    #[test]
    fn test_overlay_blocks_shortcuts() {
        let (mut app, _rt) = app();
        let now = press(&mut app, "?", Instant::now());
        assert_eq!(app.overlay, Overlay::Help);
        // The key dismisses the help instead of switching views
        press(&mut app, "m", now);
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.coordinator.context().view(), View::Week);
    }

    #[test]
    fn test_control_is_suppressed() {
        let (mut app, _rt) = app();
        app.handle_key(KeyCode::Char('m'), KeyModifiers::CONTROL, Instant::now());
        assert_eq!(app.coordinator.context().view(), View::Week);
        assert!(!app.quitting);
        app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL, Instant::now());
        assert!(app.quitting);
    }

    #[test]
    fn test_shortcuts_disabled() {
        let (mut app, _rt) = app_with(Settings {
            shortcuts: false,
            ..Settings::default()
        });
        press(&mut app, "m0s", Instant::now());
        assert_eq!(app.coordinator.context().view(), View::Week);
        assert_eq!(app.coordinator.context().color_scheme(), ColorScheme::Dark);
    }

    #[test]
    fn test_header_clicks() {
        let (mut app, _rt) = app();
        screen(&mut app);
        let now = Instant::now();
        // " › " starts at column 15
        app.handle_click(15, 0, now);
        assert_eq!(app.coordinator.context().date(), date!(2026 - 10 - 25));
        // Throttled
        app.handle_click(15, 0, now + Duration::from_millis(100));
        assert_eq!(app.coordinator.context().date(), date!(2026 - 10 - 25));
        // Not on a button
        app.handle_click(40, 5, now + STEP);
        assert_eq!(app.overlay, Overlay::None);
        app.handle_click(99, 0, now + STEP * 2);
        assert!(matches!(app.overlay, Overlay::Config(_)));
    }

    #[test]
    fn test_go_to_date() {
        let (mut app, _rt) = app();
        let now = press(&mut app, "g", Instant::now());
        assert!(matches!(app.overlay, Overlay::GoTo(_)));
        press(&mut app, "20270301", now);
        assert!(app.handle_key(KeyCode::Enter, KeyModifiers::NONE, now));
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.coordinator.context().date(), date!(2027 - 03 - 01));
        assert_eq!(app.coordinator.context().date_selected(), date!(2027 - 03 - 01));
    }

    #[test]
    fn test_view_menu() {
        let (mut app, _rt) = app();
        let now = press(&mut app, "v", Instant::now());
        assert!(matches!(app.overlay, Overlay::ViewMenu(_)));
        let rows = screen(&mut app);
        assert!(rows.iter().any(|r| r.contains("• 2 week")));
        press(&mut app, "4", now);
        assert_eq!(app.coordinator.context().view(), View::Year);
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn test_blocker_form_adds_to_configuration() {
        let (mut app, _rt) = app();
        let now = press(&mut app, "f", Instant::now());
        app.handle_key(KeyCode::Tab, KeyModifiers::NONE, now);
        press(&mut app, "12:00", now);
        app.handle_key(KeyCode::Tab, KeyModifiers::NONE, now);
        press(&mut app, "13:00", now);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE, now);
        app.handle_key(KeyCode::Esc, KeyModifiers::NONE, now);
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.config.blockers().len(), 1);
        let rows = screen(&mut app);
        assert!(rows.iter().any(|r| r.contains("Blocked")));
    }

    #[test]
    fn test_optimize_round_trip() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/optimize")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"subject": "IN0001", "appointments": [
                    {"weekday": "Wednesday", "from": "10:00:00", "to": "12:00:00"}
                ]}]"#,
            )
            .create();
        let (mut app, _rt) = app_with(Settings {
            server: server.url(),
            ..Settings::default()
        });
        press(&mut app, "o", Instant::now());
        assert!(app.optimizing);
        let reply = app
            .replies_rx
            .recv_timeout(Duration::from_secs(10))
            .unwrap();
        app.apply_reply(reply);
        mock.assert();
        assert!(!app.optimizing);
        assert_eq!(app.courses.len(), 1);
        let rows = screen(&mut app);
        assert!(rows.iter().any(|r| r.contains("IN0001")));
        assert!(rows[29].contains("Optimizer selected 1 course(s)"));
    }

    #[test]
    fn test_optimize_failure_is_reported() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/optimize")
            .with_status(500)
            .create();
        let (mut app, _rt) = app_with(Settings {
            server: server.url(),
            ..Settings::default()
        });
        press(&mut app, "o", Instant::now());
        let reply = app
            .replies_rx
            .recv_timeout(Duration::from_secs(10))
            .unwrap();
        app.apply_reply(reply);
        assert!(matches!(&app.status, Some(Status::Error(msg)) if msg.contains("500")));
        assert!(app.courses.is_empty());
    }
}
