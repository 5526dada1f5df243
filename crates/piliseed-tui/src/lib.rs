// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use piliseed_app::{
    AppCommand, AppEvent, AppState, HistorySession, LoginFormInput, NavAnimation, NavBarView,
    Page, PathPromptInput, Tab, User, DEFAULT_ANIMATION,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// Pixels of bar geometry per terminal cell.
pub const PX_PER_CELL: u32 = 4;

const IDLE_POLL: Duration = Duration::from_millis(120);
const FRAME_POLL: Duration = Duration::from_millis(16);
const HIGHLIGHT_MARK: char = '━';

/// Everything the terminal client needs from the outside world.
pub trait AppRuntime {
    /// Registers the farmer and remembers them for the next launch.
    fn login(&mut self, input: &LoginFormInput) -> Result<User>;
    fn logout(&mut self) -> Result<()>;
    fn load_history(&mut self, user: &User) -> Result<Vec<HistorySession>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub animation: Duration,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            animation: DEFAULT_ANIMATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LoginField {
    #[default]
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct LoginUiState {
    input: LoginFormInput,
    field: LoginField,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct HistoryUiState {
    sessions: Vec<HistorySession>,
    selected: usize,
    error: Option<String>,
    loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone)]
struct ViewData {
    login: LoginUiState,
    history: HistoryUiState,
    prompt: Option<String>,
    focus: Tab,
    animation: NavAnimation,
    status_token: u64,
}

impl ViewData {
    fn new(state: &AppState, options: UiOptions) -> Self {
        Self {
            login: LoginUiState::default(),
            history: HistoryUiState::default(),
            prompt: None,
            focus: state.navbar().active_tab(),
            animation: NavAnimation::settled(state.navbar().view(), options.animation),
            status_token: 0,
        }
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(state, options);
    let (internal_tx, internal_rx) = mpsc::channel();
    sync_nav(state, &mut view_data);
    if state.resolution().page == Page::History {
        refresh_history(state, runtime, &mut view_data, &internal_tx);
    }

    let mut result = Ok(());
    let mut last_tick = Instant::now();
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        let now = Instant::now();
        view_data.animation.advance(now - last_tick);
        last_tick = now;

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let timeout = if view_data.animation.is_settled() {
            IDLE_POLL
        } else {
            FRAME_POLL
        };
        // Input errors end the loop so the terminal is always restored below.
        match next_key(timeout, event::poll, event::read) {
            Ok(Some(key)) => {
                if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(None) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn next_key(
    timeout: Duration,
    poll: impl FnOnce(Duration) -> io::Result<bool>,
    read: impl FnOnce() -> io::Result<Event>,
) -> Result<Option<KeyEvent>> {
    if !poll(timeout).context("poll event")? {
        return Ok(None);
    }
    match read().context("read event")? {
        Event::Key(key) => Ok(Some(key)),
        _ => Ok(None),
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if state.user.is_none() {
        return handle_login_key(state, runtime, view_data, internal_tx, key);
    }

    if view_data.prompt.is_some() {
        handle_prompt_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Left => move_focus(state, view_data, -1),
        KeyCode::Right => move_focus(state, view_data, 1),
        KeyCode::Up => move_history_selection(view_data, -1),
        KeyCode::Down => move_history_selection(view_data, 1),
        KeyCode::Enter => handle_enter(state, runtime, view_data, internal_tx),
        KeyCode::Char(':') => view_data.prompt = Some(String::new()),
        KeyCode::Esc | KeyCode::Backspace => {
            let events = state.dispatch(AppCommand::Back);
            apply_events(state, runtime, view_data, internal_tx, events);
        }
        KeyCode::Char('L') => match runtime.logout() {
            Ok(()) => {
                view_data.history = HistoryUiState::default();
                let events = state.dispatch(AppCommand::Logout);
                apply_events(state, runtime, view_data, internal_tx, events);
            }
            Err(error) => emit_status(
                state,
                view_data,
                internal_tx,
                format!("logout failed: {error:#}"),
            ),
        },
        _ => {}
    }
    false
}

fn handle_login_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let login = &mut view_data.login;
    let field = match login.field {
        LoginField::First => &mut login.input.first_name,
        LoginField::Last => &mut login.input.last_name,
    };
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            login.field = match login.field {
                LoginField::First => LoginField::Last,
                LoginField::Last => LoginField::First,
            };
        }
        KeyCode::Backspace => {
            field.pop();
        }
        KeyCode::Char(ch) => field.push(ch),
        KeyCode::Enter => submit_login(state, runtime, view_data, internal_tx),
        _ => {}
    }
    false
}

fn submit_login<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let input = view_data.login.input.clone();
    if let Err(error) = input.validate() {
        view_data.login.error = Some(error.to_string());
        return;
    }

    match runtime.login(&input) {
        Ok(user) => {
            view_data.login = LoginUiState::default();
            let events = state.dispatch(AppCommand::Login(user));
            apply_events(state, runtime, view_data, internal_tx, events);
            if state.resolution().page == Page::History {
                refresh_history(state, runtime, view_data, internal_tx);
            }
        }
        Err(error) => {
            tracing::warn!(error = %format!("{error:#}"), "login failed");
            view_data.login.error = Some(format!("login failed: {error:#}"));
        }
    }
}

fn handle_prompt_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(prompt) = view_data.prompt.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => view_data.prompt = None,
        KeyCode::Backspace => {
            prompt.pop();
        }
        KeyCode::Char(ch) => prompt.push(ch),
        KeyCode::Enter => {
            let input = PathPromptInput::new(prompt.as_str());
            view_data.prompt = None;
            match input.validate() {
                Ok(path) => {
                    let events = state.dispatch(AppCommand::Navigate(path));
                    apply_events(state, runtime, view_data, internal_tx, events);
                }
                Err(error) => emit_status(state, view_data, internal_tx, error.to_string()),
            }
        }
        _ => {}
    }
}

fn handle_enter<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if state.resolution().page == Page::History
        && let Some(session) = view_data.history.sessions.get(view_data.history.selected)
    {
        if !session.id.is_path_segment() {
            tracing::warn!(session_id = %session.id, "history entry has an unusable id");
            let message = format!(
                "session {:?} cannot be opened: its id is not a path segment",
                session.id.as_str()
            );
            emit_status(state, view_data, internal_tx, message);
            return;
        }
        let path = format!("/history/{}", session.id);
        let events = state.dispatch(AppCommand::Navigate(path));
        apply_events(state, runtime, view_data, internal_tx, events);
        return;
    }

    if state.navbar().is_hidden() {
        return;
    }
    let events = state.dispatch(AppCommand::ClickButton(view_data.focus));
    apply_events(state, runtime, view_data, internal_tx, events);
}

fn apply_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: Vec<AppEvent>,
) {
    let mut reload_history = false;
    let mut route_changed = false;
    for event in &events {
        match event {
            AppEvent::RouteChanged { page, .. } => {
                route_changed = true;
                reload_history = *page == Page::History;
            }
            AppEvent::StatusUpdated(_) => {
                view_data.status_token = view_data.status_token.saturating_add(1);
                schedule_status_clear(internal_tx, view_data.status_token);
            }
            AppEvent::NavigationIgnored(tab) => {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    format!("{} has nowhere to go from here", tab.as_str()),
                );
            }
            _ => {}
        }
    }
    if route_changed {
        sync_nav(state, view_data);
    }
    if reload_history {
        refresh_history(state, runtime, view_data, internal_tx);
    }
}

fn sync_nav(state: &AppState, view_data: &mut ViewData) {
    let navbar = state.navbar();
    view_data.animation.retarget(navbar.view());
    view_data.focus = if navbar.layout().position(navbar.active_tab()).is_some() {
        navbar.active_tab()
    } else {
        navbar.layout().buttons().first().copied().unwrap_or(Tab::Home)
    };
}

fn move_focus(state: &AppState, view_data: &mut ViewData, delta: isize) {
    if state.navbar().is_hidden() {
        return;
    }
    let buttons = state.navbar().layout().buttons();
    if buttons.is_empty() {
        return;
    }
    let current = buttons
        .iter()
        .position(|tab| *tab == view_data.focus)
        .unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(buttons.len() as isize) as usize;
    view_data.focus = buttons[next];
}

fn move_history_selection(view_data: &mut ViewData, delta: isize) {
    let len = view_data.history.sessions.len();
    if len == 0 {
        return;
    }
    let current = view_data.history.selected as isize;
    view_data.history.selected = (current + delta).clamp(0, len as isize - 1) as usize;
}

fn refresh_history<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(user) = state.user.clone() else {
        return;
    };
    match runtime.load_history(&user) {
        Ok(sessions) => {
            let selected = view_data
                .history
                .selected
                .min(sessions.len().saturating_sub(1));
            view_data.history = HistoryUiState {
                sessions,
                selected,
                error: None,
                loaded: true,
            };
        }
        Err(error) => {
            let message = format!("history load failed: {error:#}");
            view_data.history.error = Some(message.clone());
            view_data.history.loaded = true;
            emit_status(state, view_data, internal_tx, message);
        }
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    if state.user.is_none() {
        render_login(frame, view_data);
        return;
    }

    let bar = view_data.animation.frame();
    let bar_height = if bar.hidden { 0 } else { 4 };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(bar_height),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(render_header_text(state))
        .block(Block::default().title("piliseed").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let body = Paragraph::new(render_page_text(state, view_data)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(state.resolution().page.title()),
    );
    frame.render_widget(body, layout[1]);

    if !bar.hidden {
        let [buttons, highlight] = render_nav_bar_lines(&bar);
        let focus_line = render_focus_line(&bar, view_data.focus);
        let text = format!("{buttons}\n{highlight}");
        let widget = Paragraph::new(format!("{text}\n{focus_line}"))
            .style(Style::default().fg(Color::Green))
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(widget, layout[2]);
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, layout[3]);

    if let Some(prompt) = &view_data.prompt {
        let area = centered_rect(60, 20, frame.area());
        frame.render_widget(Clear, area);
        let widget = Paragraph::new(format!(":{prompt}"))
            .block(Block::default().title("go to path").borders(Borders::ALL));
        frame.render_widget(widget, area);
    }
}

fn render_login(frame: &mut ratatui::Frame<'_>, view_data: &ViewData) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);
    let widget = Paragraph::new(render_login_text(&view_data.login)).block(
        Block::default()
            .title("PiliSeed sign in")
            .borders(Borders::ALL)
            .style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
    );
    frame.render_widget(widget, area);
}

fn render_login_text(login: &LoginUiState) -> String {
    let marker = |field: LoginField| if login.field == field { "›" } else { " " };
    let mut lines = vec![
        "Smart crop recommendations for your greenhouse".to_owned(),
        String::new(),
        format!(
            "{} first name: {}",
            marker(LoginField::First),
            login.input.first_name
        ),
        format!(
            "{} last name:  {}",
            marker(LoginField::Last),
            login.input.last_name
        ),
        String::new(),
        "tab switch field | enter continue | esc quit".to_owned(),
    ];
    if let Some(error) = &login.error {
        lines.push(String::new());
        lines.push(format!("! {error}"));
    }
    lines.join("\n")
}

fn render_header_text(state: &AppState) -> String {
    let user = state
        .user
        .as_ref()
        .map(User::display_name)
        .unwrap_or_default();
    format!("{}  ·  {}", state.current_path(), user)
}

fn render_page_text(state: &AppState, view_data: &ViewData) -> String {
    let resolution = state.resolution();
    let mut lines = Vec::new();
    let params = &resolution.params;
    if let Some(id) = &params.greenhouse_id {
        lines.push(format!("greenhouse: {id}"));
    }
    if let Some(id) = &params.sensor_id {
        lines.push(format!("sensor: {id}"));
    }
    if let Some(id) = &params.session_id {
        lines.push(format!("session: {id}"));
    }
    if let Some(id) = &params.filter_id {
        lines.push(format!("filter: {id}"));
    }
    if let Some(index) = params.crop_index {
        lines.push(format!("crop #{index}"));
    }

    if !resolution.is_resolved() {
        lines.push(format!("no page at {}", resolution.path));
    } else if resolution.page == Page::History {
        lines.extend(render_history_lines(&view_data.history));
    }
    lines.join("\n")
}

fn render_history_lines(history: &HistoryUiState) -> Vec<String> {
    if let Some(error) = &history.error {
        return vec![error.clone()];
    }
    if !history.loaded {
        return vec!["loading history...".to_owned()];
    }
    if history.sessions.is_empty() {
        return vec!["no recommendation sessions yet".to_owned()];
    }
    let mut lines = Vec::with_capacity(history.sessions.len() + 1);
    for (index, session) in history.sessions.iter().enumerate() {
        let selected = index == history.selected;
        lines.push(format!(
            "{} {}  {}  {}/{} planted",
            if selected { "›" } else { " " },
            session.location_label(),
            session.timestamp_label(),
            session.planted_count,
            session.total_crops,
        ));
        // The selected row also shows the full address when it says more.
        if let Some(location) = session.location.as_ref().filter(|_| selected)
            && location.full() != location.label()
        {
            lines.push(format!("    {}", location.full()));
        }
    }
    lines
}

/// Button row and highlight row for a bar frame, one cell per
/// `PX_PER_CELL` pixels.
fn render_nav_bar_lines(view: &NavBarView) -> [String; 2] {
    let cells = px_to_cells(view.bar_width_px);
    let mut row = vec![' '; cells];
    for button in view.buttons.iter().filter(|button| button.width_px > 0) {
        let start = px_to_cells(button.offset_px);
        let width = px_to_cells(button.width_px);
        let label = format!("{} {}", button.tab.glyph(), button.tab.as_str());
        for (slot, ch) in row
            .iter_mut()
            .skip(start)
            .take(width)
            .zip(label.chars())
        {
            *slot = ch;
        }
    }

    let mut highlight = vec![' '; cells];
    let start = px_to_cells(view.highlight_offset_px);
    let width = view
        .button(view.active_tab)
        .map_or(0, |button| button.width_px)
        .max(piliseed_app::BUTTON_WIDTH_PX);
    for slot in highlight.iter_mut().skip(start).take(px_to_cells(width)) {
        *slot = HIGHLIGHT_MARK;
    }

    [row.into_iter().collect(), highlight.into_iter().collect()]
}

fn render_focus_line(view: &NavBarView, focus: Tab) -> String {
    let cells = px_to_cells(view.bar_width_px);
    let mut line = vec![' '; cells];
    if let Some(button) = view.button(focus).filter(|button| button.width_px > 0) {
        let start = px_to_cells(button.offset_px);
        if let Some(slot) = line.get_mut(start) {
            *slot = '^';
        }
    }
    line.into_iter().collect()
}

fn px_to_cells(px: u32) -> usize {
    px.div_ceil(PX_PER_CELL) as usize
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.prompt.is_some() {
        return "enter go | esc cancel".to_owned();
    }
    let enter_hint = if state.resolution().page == Page::History {
        "open session"
    } else {
        "press button"
    };
    let default = format!(
        "←/→ focus | enter {enter_hint} | ↑/↓ select | : path | esc back | L logout | q quit"
    );
    match &state.status_line {
        Some(status) => format!("{status} | {default}"),
        None => default,
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
