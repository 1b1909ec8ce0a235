use std::{cmp, io, path::PathBuf, sync::Arc, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use coverfinder_core::{
    api::GamesDbClient,
    error::ClientError,
    models::{GameDetail, GameSummary, Platform},
    platform::{icon_candidates, resolve_icon, retro_platforms, PLACEHOLDER_ICON},
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
    },
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{error, info, warn};

const TICK_RATE: Duration = Duration::from_millis(250);
const SEARCH_ERROR_MESSAGE: &str = "Search failed. Check your connection and try again.";
const PLATFORMS_ERROR_MESSAGE: &str = "Could not load platforms.";
const NO_DETAILS_MESSAGE: &str = "Detailed information is not available for this game.";

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Platforms,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    Results,
}

enum AppEvent {
    Input(Event),
    Tick,
    PlatformsLoaded(Result<Vec<Platform>, ClientError>),
    SearchFinished(Result<Vec<GameSummary>, ClientError>),
    DetailsLoaded {
        summary: GameSummary,
        result: Result<GameDetail, ClientError>,
    },
    CoverDownloaded(Result<PathBuf, ClientError>),
}

/// Selected-row and scroll bookkeeping for a list of `len` items.
#[derive(Debug, Default)]
struct ListCursor {
    cursor: usize,
    offset: usize,
    height: usize,
}

impl ListCursor {
    fn reset(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.reset();
            return;
        }
        let idx = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = idx as usize;
        self.ensure_visible(len);
    }

    fn move_to(&mut self, index: usize, len: usize) {
        if len == 0 {
            self.reset();
            return;
        }
        self.cursor = index.min(len - 1);
        self.ensure_visible(len);
    }

    fn page(&mut self, forward: bool, len: usize) {
        let step = self.height.max(1).min(len.max(1)) as isize;
        self.move_by(if forward { step } else { -step }, len);
    }

    fn ensure_visible(&mut self, len: usize) {
        if len == 0 || self.height == 0 {
            self.offset = 0;
            return;
        }
        if self.cursor >= len {
            self.cursor = len - 1;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + self.height {
            self.offset = self.cursor + 1 - self.height;
        }
        self.offset = self.offset.min(len.saturating_sub(self.height));
    }

    fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = (self.offset + self.height).min(items.len());
        &items[start..end]
    }
}

#[derive(Default)]
struct PlatformState {
    all: Vec<Platform>,
    filtered: Vec<Platform>,
    filter: String,
    list: ListCursor,
    loading: bool,
    error: Option<String>,
}

impl PlatformState {
    fn set_platforms(&mut self, platforms: Vec<Platform>) {
        self.all = retro_platforms(platforms);
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        let needle = self.filter.trim().to_lowercase();
        self.filtered = self
            .all
            .iter()
            .filter(|platform| {
                needle.is_empty()
                    || platform.name.to_lowercase().contains(&needle)
                    || platform
                        .alias
                        .as_ref()
                        .map(|alias| alias.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .cloned()
            .collect();
        self.list.reset();
    }

    fn current(&self) -> Option<&Platform> {
        self.filtered.get(self.list.cursor)
    }
}

struct SearchState {
    platform: Option<Platform>,
    query: String,
    focus: Focus,
    results: Vec<GameSummary>,
    list: ListCursor,
    loading: bool,
    error: Option<String>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            platform: None,
            query: String::new(),
            focus: Focus::Input,
            results: Vec::new(),
            list: ListCursor::default(),
            loading: false,
            error: None,
        }
    }
}

impl SearchState {
    fn current(&self) -> Option<&GameSummary> {
        self.results.get(self.list.cursor)
    }
}

/// Detail dialog; shows the summary until the full record arrives.
struct DetailModal {
    summary: GameSummary,
    detail: Option<GameDetail>,
    loading: bool,
}

impl DetailModal {
    fn shown(&self) -> GameDetail {
        self.detail
            .clone()
            .unwrap_or_else(|| GameDetail::from_summary(self.summary.clone()))
    }
}

/// High-level application state for the cover finder TUI.
pub struct CoverFinderApp {
    client: Arc<GamesDbClient>,
    assets_dir: Option<PathBuf>,
    download_dir: PathBuf,
    screen: Screen,
    platforms: PlatformState,
    search: SearchState,
    detail: Option<DetailModal>,
    status: String,
    should_quit: bool,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl CoverFinderApp {
    pub fn new(
        client: Arc<GamesDbClient>,
        assets_dir: Option<PathBuf>,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            client,
            assets_dir,
            download_dir,
            screen: Screen::Platforms,
            platforms: PlatformState::default(),
            search: SearchState::default(),
            detail: None,
            status: "Ready".to_string(),
            should_quit: false,
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);
        self.load_platforms();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) || self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = format!("[{}] {}", Local::now().format("%H:%M:%S"), message.into());
    }

    fn sender(&self) -> Option<mpsc::Sender<AppEvent>> {
        self.event_tx.clone()
    }

    fn load_platforms(&mut self) {
        let Some(tx) = self.sender() else { return };
        self.platforms.loading = true;
        self.platforms.error = None;
        self.set_status("Loading platforms...");
        let client = Arc::clone(&self.client);
        spawn(async move {
            let result = client.fetch_platforms().await;
            let _ = tx.send(AppEvent::PlatformsLoaded(result)).await;
        });
    }

    fn start_search(&mut self) {
        let Some(tx) = self.sender() else { return };
        let query = self.search.query.clone();
        let platform_id = self.search.platform.as_ref().map(|platform| platform.id);
        self.search.loading = true;
        self.search.error = None;
        self.set_status(format!("Searching for \"{}\"...", query.trim()));
        let client = Arc::clone(&self.client);
        spawn(async move {
            let result = client.search(&query, platform_id).await;
            let _ = tx.send(AppEvent::SearchFinished(result)).await;
        });
    }

    fn open_details(&mut self) {
        let Some(summary) = self.search.current().cloned() else { return };
        let Some(tx) = self.sender() else { return };
        self.detail = Some(DetailModal {
            summary: summary.clone(),
            detail: None,
            loading: true,
        });
        let client = Arc::clone(&self.client);
        spawn(async move {
            let result = client.fetch_details(summary.id).await;
            let _ = tx.send(AppEvent::DetailsLoaded { summary, result }).await;
        });
    }

    fn download_cover(&mut self) {
        let Some(modal) = &self.detail else { return };
        let game = modal.shown().summary;
        if game.cover.is_none() {
            self.set_status("This game has no cover to download");
            return;
        }
        let Some(tx) = self.sender() else { return };
        self.set_status(format!("Downloading cover for {}...", game.display_name()));
        let client = Arc::clone(&self.client);
        let dir = self.download_dir.clone();
        spawn(async move {
            let result = client.download_cover(&game, &dir).await;
            let _ = tx.send(AppEvent::CoverDownloaded(result)).await;
        });
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => true,
            Some(AppEvent::PlatformsLoaded(result)) => {
                self.platforms.loading = false;
                match result {
                    Ok(platforms) => {
                        self.platforms.set_platforms(platforms);
                        info!(shown = self.platforms.all.len(), "Platforms ready");
                        let message = format!("Loaded {} platforms", self.platforms.all.len());
                        self.set_status(message);
                    }
                    Err(err) => {
                        error!(?err, "Platform load failed");
                        self.platforms.error = Some(PLATFORMS_ERROR_MESSAGE.to_string());
                        self.set_status(format!("{err}"));
                    }
                }
                true
            }
            Some(AppEvent::SearchFinished(result)) => {
                self.search.loading = false;
                self.search.list.reset();
                match result {
                    Ok(games) => {
                        let message = format!("{} results", games.len());
                        self.search.results = games;
                        if !self.search.results.is_empty() {
                            self.search.focus = Focus::Results;
                        }
                        self.set_status(message);
                    }
                    Err(err) => {
                        error!(?err, "Search failed");
                        self.search.results.clear();
                        self.search.error = Some(SEARCH_ERROR_MESSAGE.to_string());
                        self.set_status(format!("{err}"));
                    }
                }
                true
            }
            Some(AppEvent::CoverDownloaded(result)) => {
                match result {
                    Ok(path) => self.set_status(format!("Cover saved to {}", path.display())),
                    Err(err) => {
                        error!(?err, "Cover download failed");
                        self.set_status(format!("{err}"));
                    }
                }
                true
            }
            Some(AppEvent::DetailsLoaded { summary, result }) => {
                let Some(modal) = self.detail.as_mut() else {
                    return true;
                };
                if modal.summary.id != summary.id {
                    return true;
                }
                modal.loading = false;
                modal.detail = Some(match result {
                    Ok(detail) => detail,
                    Err(err) => {
                        warn!(?err, game_id = summary.id, "Details unavailable; showing summary");
                        GameDetail::from_summary(summary)
                    }
                });
                true
            }
            None => false,
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }
        if self.detail.is_some() {
            self.handle_detail_key(key);
            return Ok(());
        }
        match self.screen {
            Screen::Platforms => self.handle_platform_key(key),
            Screen::Search => match self.search.focus {
                Focus::Input => self.handle_input_key(key),
                Focus::Results => self.handle_results_key(key),
            },
        }
        Ok(())
    }

    fn handle_platform_key(&mut self, key: KeyEvent) {
        let len = self.platforms.filtered.len();
        match key.code {
            KeyCode::Esc => {
                if self.platforms.filter.is_empty() {
                    self.should_quit = true;
                } else {
                    self.platforms.filter.clear();
                    self.platforms.apply_filter();
                }
            }
            KeyCode::Down => self.platforms.list.move_by(1, len),
            KeyCode::Up => self.platforms.list.move_by(-1, len),
            KeyCode::PageDown => self.platforms.list.page(true, len),
            KeyCode::PageUp => self.platforms.list.page(false, len),
            KeyCode::Home => self.platforms.list.move_to(0, len),
            KeyCode::End => self.platforms.list.move_to(len.saturating_sub(1), len),
            KeyCode::Backspace => {
                self.platforms.filter.pop();
                self.platforms.apply_filter();
            }
            KeyCode::Char('r') if key.modifiers == KeyModifiers::CONTROL => self.load_platforms(),
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.platforms.filter.push(c);
                    self.platforms.apply_filter();
                }
            }
            KeyCode::Enter => {
                if let Some(platform) = self.platforms.current().cloned() {
                    self.select_platform(platform);
                }
            }
            _ => {}
        }
    }

    fn select_platform(&mut self, platform: Platform) {
        info!(platform_id = platform.id, name = %platform.name, "Platform selected");
        self.set_status(format!("Search games on {}", platform.name));
        self.search = SearchState {
            platform: Some(platform),
            ..SearchState::default()
        };
        self.screen = Screen::Search;
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.screen = Screen::Platforms;
                self.set_status("Choose a platform");
            }
            KeyCode::Enter => {
                if !self.search.loading {
                    self.start_search();
                }
            }
            KeyCode::Backspace => {
                self.search.query.pop();
            }
            KeyCode::Tab | KeyCode::Down => {
                if !self.search.results.is_empty() {
                    self.search.focus = Focus::Results;
                }
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.search.query.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        let len = self.search.results.len();
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.should_quit = true,
            KeyCode::Esc | KeyCode::Tab | KeyCode::Char('/') => self.search.focus = Focus::Input,
            KeyCode::Char('j') | KeyCode::Down => self.search.list.move_by(1, len),
            KeyCode::Char('k') | KeyCode::Up => self.search.list.move_by(-1, len),
            KeyCode::Char('g') | KeyCode::Home => self.search.list.move_to(0, len),
            KeyCode::Char('G') | KeyCode::End => {
                self.search.list.move_to(len.saturating_sub(1), len)
            }
            KeyCode::PageDown => self.search.list.page(true, len),
            KeyCode::PageUp => self.search.list.page(false, len),
            KeyCode::Enter => self.open_details(),
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('d') {
            self.download_cover();
            return;
        }
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Backspace
        ) {
            self.detail = None;
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(3)])
            .split(area);

        match self.screen {
            Screen::Platforms => self.draw_platforms(frame, chunks[0]),
            Screen::Search => self.draw_search(frame, chunks[0]),
        }
        self.render_status(frame, chunks[1]);

        if let Some(modal) = &self.detail {
            self.render_detail(frame, modal);
        }
    }

    fn draw_platforms(&mut self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        let title = if self.platforms.filter.is_empty() {
            "Choose a platform (type to filter)".to_string()
        } else {
            format!("Choose a platform: {}", self.platforms.filter)
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if let Some(message) = self.placeholder_for_platforms() {
            frame.render_widget(
                Paragraph::new(message).block(block).alignment(Alignment::Center),
                columns[0],
            );
        } else {
            let list = &mut self.platforms.list;
            list.height = columns[0].height.saturating_sub(2) as usize;
            list.ensure_visible(self.platforms.filtered.len());
            let rows: Vec<ListItem> = list
                .visible(&self.platforms.filtered)
                .iter()
                .map(|platform| ListItem::new(platform.name.clone()))
                .collect();
            self.render_list(frame, columns[0], block, rows, &self.platforms.list);
        }

        self.render_platform_info(frame, columns[1]);
    }

    fn placeholder_for_platforms(&self) -> Option<Line<'static>> {
        if self.platforms.loading {
            return Some(Line::from("Loading platforms..."));
        }
        if let Some(error) = &self.platforms.error {
            return Some(Line::from(Span::styled(
                format!("{error} Press Ctrl+R to retry."),
                Style::default().fg(self.theme.danger),
            )));
        }
        if self.platforms.filtered.is_empty() {
            return Some(Line::from("No platforms match"));
        }
        None
    }

    fn render_platform_info(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Platform");
        let Some(platform) = self.platforms.current() else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let icon = match &self.assets_dir {
            Some(root) => resolve_icon(root, platform).display().to_string(),
            None => icon_candidates(platform)
                .into_iter()
                .next()
                .unwrap_or_else(|| PLACEHOLDER_ICON.to_string()),
        };
        let mut lines = vec![
            Line::from(Span::styled(
                platform.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("ID: {}", platform.id)),
        ];
        if let Some(alias) = &platform.alias {
            lines.push(Line::from(format!("Alias: {alias}")));
        }
        lines.push(Line::from(format!("Icon: {icon}")));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter select  Esc quit",
            Style::default().fg(self.theme.muted),
        )));
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }

    fn draw_search(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)])
            .split(area);
        self.render_search_input(frame, rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        self.render_results(frame, columns[0]);
        self.render_result_info(frame, columns[1]);
    }

    fn render_search_input(&self, frame: &mut Frame, area: Rect) {
        let platform = self
            .search
            .platform
            .as_ref()
            .map(|platform| platform.name.as_str())
            .unwrap_or("any platform");
        let focused = self.search.focus == Focus::Input;
        let border = if focused {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default()
        };
        let label = if self.search.loading {
            "Searching...".to_string()
        } else {
            format!("Search a game on {platform}")
        };
        let input = Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(self.search.query.clone()),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(label),
        );
        frame.render_widget(input, area);

        if focused && self.detail.is_none() {
            let cursor_x = (area.x + 3 + self.search.query.chars().count() as u16)
                .min(area.x + area.width.saturating_sub(2));
            frame.set_cursor(cursor_x, area.y + 1);
        }
    }

    fn render_results(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!("Results ({})", self.search.results.len());
        let mut block = Block::default().borders(Borders::ALL).title(title);
        if self.search.focus == Focus::Results {
            block = block.border_style(Style::default().fg(self.theme.accent));
        }

        if let Some(error) = &self.search.error {
            let message = Paragraph::new(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(self.theme.danger),
            )))
            .block(block)
            .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }
        if self.search.results.is_empty() {
            let hint = if self.search.loading {
                "Searching..."
            } else {
                "Type a title and press Enter"
            };
            frame.render_widget(Paragraph::new(hint).block(block), area);
            return;
        }

        let list = &mut self.search.list;
        list.height = area.height.saturating_sub(2) as usize;
        list.ensure_visible(self.search.results.len());
        let rows: Vec<ListItem> = list
            .visible(&self.search.results)
            .iter()
            .map(|game| {
                let mut spans = vec![Span::styled(
                    game.display_name().to_string(),
                    Style::default()
                        .fg(self.theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                )];
                if let Some(year) = game.release_year() {
                    spans.push(Span::styled(
                        format!(" ({year})"),
                        Style::default().fg(self.theme.muted),
                    ));
                }
                if game.cover.is_none() {
                    spans.push(Span::styled(
                        " · no cover",
                        Style::default().fg(self.theme.muted),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        self.render_list(frame, area, block, rows, &self.search.list);
    }

    fn render_result_info(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Game");
        let Some(game) = self.search.current() else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };
        let mut lines = vec![Line::from(Span::styled(
            game.display_name().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if let Some(date) = &game.release_date {
            lines.push(Line::from(format!("Released: {date}")));
        }
        if !game.platform.is_empty() {
            lines.push(Line::from(format!("Platform: {}", game.platform)));
        }
        lines.push(Line::from(format!(
            "Cover: {}",
            game.cover.as_deref().unwrap_or("not available")
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter details  Tab edit search  Esc back",
            Style::default().fg(self.theme.muted),
        )));
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }

    fn render_list(
        &self,
        frame: &mut Frame,
        area: Rect,
        block: Block,
        rows: Vec<ListItem>,
        cursor: &ListCursor,
    ) {
        let mut state = ListState::default();
        if !rows.is_empty() {
            let selected = cursor
                .cursor
                .saturating_sub(cursor.offset)
                .min(rows.len() - 1);
            state.select(Some(selected));
        }
        let list = List::new(rows)
            .block(block)
            .highlight_symbol("▶ ")
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_detail(&self, frame: &mut Frame, modal: &DetailModal) {
        let frame_area = frame.size();
        let width = cmp::max(cmp::min(90_u16, frame_area.width.saturating_sub(4)), 30);
        let height = cmp::max(cmp::min(24_u16, frame_area.height.saturating_sub(2)), 8);
        let area = centered_rect(width, height, frame_area);
        frame.render_widget(Clear, area);

        let detail = modal.shown();
        let mut lines = Vec::new();
        if modal.loading {
            lines.push(Line::from(Span::styled(
                "Loading details...",
                Style::default().fg(self.theme.muted),
            )));
        } else if detail.summary.has_no_details() {
            lines.push(Line::from(Span::styled(
                NO_DETAILS_MESSAGE,
                Style::default().fg(self.theme.muted),
            )));
        }
        for (label, value) in detail.describe() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{label}: "),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(value),
            ]));
        }
        if let Some(overview) = &detail.summary.overview {
            lines.push(Line::from(""));
            let muted = Style::default().fg(self.theme.muted);
            lines.extend(
                overview
                    .lines()
                    .map(|line| Line::from(Span::styled(line.to_string(), muted))),
            );
        }

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(detail.summary.display_name().to_string())
                    .title(Title::from("d download cover  Esc close").position(Position::Bottom)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let paragraph = Paragraph::new(Line::from(self.status.clone()))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
