use crossterm::event::{KeyCode, KeyEvent};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, StatefulWidget, Widget, Wrap};
use ratatui::buffer::Buffer;

pub mod cli;
pub mod columns;
pub mod config;
pub mod export;
pub mod filters;
pub mod highlight;
pub mod rows;
pub mod source;
pub mod widgets;

pub use cli::Args;
pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme,
};
pub use export::ExportFormat;
pub use source::RowSource;

use filters::FilterValue;
use rows::RowSet;
use widgets::controls::Controls;
use widgets::export_modal::{render_export_modal, ExportFocus, ExportModal};
use widgets::grid::{GridState, OrderGrid};
use widgets::image_modal::{render_image_modal, ImageModal};
use widgets::text_input::{TextInput, TextInputEvent};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "trakui";

/// A named dataset the dashboard can show.
#[derive(Clone, Debug)]
pub struct View {
    pub name: String,
    pub source: RowSource,
}

pub enum AppEvent {
    Key(KeyEvent),
    /// Switch to a view and start loading it.
    Open(usize),
    /// Internal event to actually fetch, sent after the loading state rendered
    DoLoad(usize),
    Search(String),
    Refresh,
    Export(ExportFormat, PathBuf),
    Resize(u16, u16),
    Exit,
    Crash(String),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    Filter,
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

#[derive(Clone, Debug, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading {
        view: String,
        phase: String,
    },
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading { .. })
    }
}

pub struct App {
    views: Vec<View>,
    active_view: usize,
    pub grid: GridState,
    events: Sender<AppEvent>,
    pub input_mode: InputMode,
    search_input: TextInput,
    search_before_edit: String,
    filter_input: TextInput,
    filter_column: Option<String>,
    filter_before_edit: String,
    pub export_modal: ExportModal,
    image_modal: ImageModal,
    error_modal: ErrorModal,
    loading_state: LoadingState,
    show_help: bool,
    theme: Theme,
    config: AppConfig,
    status: Option<String>,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> App {
        Self::new_with_config(events, Theme::default(), AppConfig::default(), Vec::new())
    }

    pub fn new_with_config(
        events: Sender<AppEvent>,
        theme: Theme,
        config: AppConfig,
        views: Vec<View>,
    ) -> App {
        let grid = GridState::new(config.display.image_columns.clone());
        App {
            views,
            active_view: 0,
            grid,
            events,
            input_mode: InputMode::Normal,
            search_input: TextInput::new(),
            search_before_edit: String::new(),
            filter_input: TextInput::new(),
            filter_column: None,
            filter_before_edit: String::new(),
            export_modal: ExportModal::new(),
            image_modal: ImageModal::new(),
            error_modal: ErrorModal::new(),
            loading_state: LoadingState::Idle,
            show_help: false,
            theme,
            config,
            status: None,
        }
    }

    pub fn send_event(&mut self, event: AppEvent) -> color_eyre::Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn active_view(&self) -> Option<&View> {
        self.views.get(self.active_view)
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Dispatch one application event. A returned event is fed back through
    /// the channel by the runner.
    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => return self.handle_key(key),
            AppEvent::Open(index) => {
                let Some(view) = self.views.get(*index) else {
                    return None;
                };
                self.active_view = *index;
                let phase = match &view.source {
                    RowSource::Local(_) => "Reading file",
                    RowSource::Http(_) => "Contacting server",
                };
                self.loading_state = LoadingState::Loading {
                    view: view.name.clone(),
                    phase: phase.to_string(),
                };
                return Some(AppEvent::DoLoad(*index));
            }
            AppEvent::DoLoad(index) => {
                let Some(view) = self.views.get(*index) else {
                    self.loading_state = LoadingState::Idle;
                    return None;
                };
                match view.source.load_rows(self.config.network.timeout_secs) {
                    Ok(rows) => {
                        let count = rows.len();
                        self.grid.replace_rows(RowSet::new(rows));
                        self.status = Some(format!("Loaded {} rows from {}", count, view.name));
                    }
                    Err(e) => self.error_modal.show(e.to_string()),
                }
                self.loading_state = LoadingState::Idle;
            }
            AppEvent::Search(term) => self.grid.set_global_search(term.clone()),
            AppEvent::Refresh => return Some(AppEvent::Open(self.active_view)),
            AppEvent::Export(format, path) => self.do_export(*format, path),
            AppEvent::Resize(_, _) => {}
            // Handled by the runner, never dispatched here
            AppEvent::Exit | AppEvent::Crash(_) => {}
        }
        None
    }

    fn do_export(&mut self, format: ExportFormat, path: &Path) {
        let title = self
            .views
            .get(self.active_view)
            .map(|v| v.name.clone())
            .unwrap_or_else(|| APP_NAME.to_string());
        // No rendered grid or no visible rows: nothing to export, not an error
        let Some((columns, rows)) = self.grid.export_snapshot() else {
            return;
        };
        match export::write_export(
            format,
            path,
            &title,
            &columns,
            &rows,
            self.config.export.document_rows_per_page,
        ) {
            Ok(true) => {
                self.status = Some(format!("Exported {} rows to {}", rows.len(), path.display()))
            }
            Ok(false) => {}
            Err(e) => self.error_modal.show(format!("Export failed: {}", e)),
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        if self.error_modal.active {
            self.error_modal.hide();
            return None;
        }
        if self.image_modal.active {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.image_modal.hide();
            }
            return None;
        }
        if self.show_help {
            self.show_help = false;
            return None;
        }
        if self.export_modal.active {
            return self.handle_export_modal_key(key);
        }
        match self.input_mode {
            InputMode::Search => self.handle_search_key(key),
            InputMode::Filter => self.handle_filter_key(key),
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_search_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        match self.search_input.handle_key(key) {
            TextInputEvent::Submit => self.input_mode = InputMode::Normal,
            TextInputEvent::Cancel => {
                self.input_mode = InputMode::Normal;
                let previous = self.search_before_edit.clone();
                self.search_input.set_value(previous.clone());
                self.grid.set_global_search(previous);
            }
            TextInputEvent::None => {
                // Highlights and visibility track every keystroke
                self.grid
                    .set_global_search(self.search_input.value().to_string());
            }
        }
        None
    }

    fn handle_filter_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        let Some(column) = self.filter_column.clone() else {
            self.input_mode = InputMode::Normal;
            return None;
        };
        match self.filter_input.handle_key(key) {
            TextInputEvent::Submit => {
                self.input_mode = InputMode::Normal;
                self.filter_column = None;
            }
            TextInputEvent::Cancel => {
                self.grid
                    .set_filter(&column, FilterValue::Text(self.filter_before_edit.clone()));
                self.input_mode = InputMode::Normal;
                self.filter_column = None;
            }
            TextInputEvent::None => {
                self.grid.set_filter(
                    &column,
                    FilterValue::Text(self.filter_input.value().to_string()),
                );
            }
        }
        None
    }

    fn handle_normal_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('/') => {
                self.search_before_edit = self.grid.global_search().to_string();
                self.search_input = TextInput::new().with_theme(&self.theme);
                self.search_input.set_value(self.search_before_edit.clone());
                self.input_mode = InputMode::Search;
            }
            KeyCode::Char('f') => {
                if let Some(column) = self.grid.selected_column() {
                    let column_key = column.key.clone();
                    let current = self
                        .grid
                        .filters()
                        .pattern_for(&column_key)
                        .unwrap_or_default()
                        .to_string();
                    self.filter_before_edit = current.clone();
                    self.filter_input = TextInput::new().with_theme(&self.theme);
                    self.filter_input.set_value(current);
                    self.filter_column = Some(column_key);
                    self.input_mode = InputMode::Filter;
                }
            }
            KeyCode::Char('c') => {
                self.grid.clear_filters();
                self.search_input.clear();
            }
            KeyCode::Char('r') => return Some(AppEvent::Refresh),
            KeyCode::Char('e') => {
                let name = self
                    .views
                    .get(self.active_view)
                    .map(|v| v.name.as_str())
                    .unwrap_or(APP_NAME)
                    .to_string();
                self.export_modal.open(&name, &self.theme);
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => {
                if self.views.len() > 1 {
                    let next = (self.active_view + 1) % self.views.len();
                    return Some(AppEvent::Open(next));
                }
            }
            KeyCode::BackTab => {
                if self.views.len() > 1 {
                    let prev = (self.active_view + self.views.len() - 1) % self.views.len();
                    return Some(AppEvent::Open(prev));
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.grid.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.grid.select_previous(),
            KeyCode::PageDown => self.grid.page_down(),
            KeyCode::PageUp => self.grid.page_up(),
            KeyCode::Home | KeyCode::Char('g') => self.grid.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.grid.select_last(),
            KeyCode::Right | KeyCode::Char('l') => self.grid.select_next_column(),
            KeyCode::Left | KeyCode::Char('h') => self.grid.select_prev_column(),
            KeyCode::Enter => {
                if let Some(locator) = self.grid.selected_image_locator() {
                    let label = self
                        .grid
                        .selected_column()
                        .map(|c| c.label.clone())
                        .unwrap_or_default();
                    self.image_modal.show(label, locator);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_export_modal_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Esc => {
                self.export_modal.close();
                return None;
            }
            KeyCode::Tab => {
                self.export_modal.next_focus();
                return None;
            }
            KeyCode::BackTab => {
                self.export_modal.prev_focus();
                return None;
            }
            _ => {}
        }
        match self.export_modal.focus {
            ExportFocus::FormatSelector => {
                if matches!(
                    key.code,
                    KeyCode::Up | KeyCode::Down | KeyCode::Char(' ') | KeyCode::Enter
                ) {
                    self.export_modal.cycle_format();
                }
            }
            ExportFocus::PathInput => match self.export_modal.path_input.handle_key(key) {
                TextInputEvent::Submit => return self.confirm_export(),
                TextInputEvent::Cancel => self.export_modal.close(),
                TextInputEvent::None => {}
            },
            ExportFocus::ExportButton => {
                if key.code == KeyCode::Enter {
                    return self.confirm_export();
                }
            }
            ExportFocus::CancelButton => {
                if key.code == KeyCode::Enter {
                    self.export_modal.close();
                }
            }
        }
        None
    }

    fn confirm_export(&mut self) -> Option<AppEvent> {
        let path = self.export_modal.path().trim().to_string();
        if path.is_empty() {
            return None;
        }
        let format = self.export_modal.selected_format;
        self.export_modal.close();
        Some(AppEvent::Export(format, PathBuf::from(path)))
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let mut spans: Vec<Span> = Vec::new();
        if let Some(view) = self.views.get(self.active_view) {
            spans.push(Span::styled(
                view.name.clone(),
                Style::default()
                    .fg(self.theme.get("primary"))
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" · {}", view.source.describe()),
                Style::default().fg(self.theme.get("dimmed")),
            ));
        }
        if let Some(rows) = self.grid.rows() {
            spans.push(Span::styled(
                format!(" · fetched {}", rows.fetched_at().format("%H:%M:%S")),
                Style::default().fg(self.theme.get("dimmed")),
            ));
        }
        if !self.grid.global_search().is_empty() {
            spans.push(Span::styled(
                format!(" · search: {}", self.grid.global_search()),
                Style::default().fg(self.theme.get("highlight_search")),
            ));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);

        if let Some(status) = &self.status {
            Paragraph::new(Span::styled(
                status.clone(),
                Style::default().fg(self.theme.get("success")),
            ))
            .right_aligned()
            .render(area, buf);
        }
    }

    fn render_input_strip(&mut self, area: Rect, buf: &mut Buffer) {
        let (title, input) = match self.input_mode {
            InputMode::Search => ("Search".to_string(), &mut self.search_input),
            InputMode::Filter => {
                let label = self
                    .filter_column
                    .as_deref()
                    .map(|key| key.replace('_', " ").to_uppercase())
                    .unwrap_or_default();
                (format!("Filter: {}", label), &mut self.filter_input)
            }
            InputMode::Normal => return,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("modal_border_active")))
            .title(title);
        let inner = block.inner(area);
        block.render(area, buf);
        input.set_focused(true);
        (&*input).render(inner, buf);
    }

    fn render_loading(&self, area: Rect, buf: &mut Buffer) {
        let LoadingState::Loading { view, phase } = &self.loading_state else {
            return;
        };
        let popup = centered_rect(area, 40, 3);
        Clear.render(popup, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("modal_border")))
            .title("Loading");
        let inner = block.inner(popup);
        block.render(popup, buf);
        Paragraph::new(format!("{}: {}…", view, phase))
            .centered()
            .render(inner, buf);
    }

    fn render_error_modal(&self, area: Rect, buf: &mut Buffer) {
        let popup = centered_rect(area, 60, 7);
        Clear.render(popup, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("modal_border_error")))
            .title("Error");
        let inner = block.inner(popup);
        block.render(popup, buf);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(1)])
            .split(inner);
        Paragraph::new(self.error_modal.message.clone())
            .wrap(Wrap { trim: false })
            .render(chunks[0], buf);
        Paragraph::new(Span::styled(
            "Press any key to dismiss",
            Style::default().fg(self.theme.get("dimmed")),
        ))
        .centered()
        .render(chunks[1], buf);
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        const BINDINGS: [(&str, &str); 13] = [
            ("/", "Edit the global search term"),
            ("f", "Edit the selected column's filter"),
            ("c", "Clear all filters and the search term"),
            ("r", "Refresh the current view"),
            ("e", "Export the visible rows"),
            ("Tab / Shift-Tab", "Cycle views"),
            ("↑/↓, j/k", "Select row"),
            ("←/→, h/l", "Select column"),
            ("PgUp / PgDn", "Page through rows"),
            ("g / G", "First / last row"),
            ("Enter", "Open the selected image cell"),
            ("?", "Toggle this help"),
            ("q", "Quit"),
        ];
        let popup = centered_rect(area, 56, BINDINGS.len() as u16 + 2);
        Clear.render(popup, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("modal_border")))
            .title("Help");
        let inner = block.inner(popup);
        block.render(popup, buf);
        let lines: Vec<Line> = BINDINGS
            .iter()
            .map(|(key, action)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<16}", key),
                        Style::default()
                            .fg(self.theme.get("primary"))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(*action),
                ])
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let editing = matches!(self.input_mode, InputMode::Search | InputMode::Filter);
        let constraints = if editing {
            vec![
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(3),
                Constraint::Length(1),
            ]
        } else {
            vec![
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
            ]
        };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        self.render_header(layout[0], buf);

        let grid_widget = OrderGrid::new()
            .with_header_colors(self.theme.get("table_header"), Color::Reset)
            .with_match_colors(
                self.theme.get("highlight_filter"),
                self.theme.get("highlight_search"),
            )
            .with_image_color(self.theme.get("dimmed"));
        StatefulWidget::render(&grid_widget, layout[1], buf, &mut self.grid);

        if editing {
            self.render_input_strip(layout[2], buf);
        }

        let controls = Controls::new()
            .with_row_counts(self.grid.visible_count(), self.grid.total_rows())
            .with_search_active(!self.grid.global_search().is_empty())
            .with_dimmed(self.loading_state.is_loading())
            .with_bg(self.theme.get("controls_bg"));
        (&controls).render(layout[layout.len() - 1], buf);

        if self.loading_state.is_loading() {
            self.render_loading(layout[1], buf);
        }
        if self.export_modal.active {
            let popup = centered_rect(area, 62, 10);
            Clear.render(popup, buf);
            let border = self.theme.get("modal_border");
            let active = self.theme.get("modal_border_active");
            render_export_modal(popup, buf, &mut self.export_modal, border, active);
        }
        if self.image_modal.active {
            render_image_modal(
                centered_rect(area, 70, 8),
                buf,
                &self.image_modal,
                self.theme.get("modal_border"),
                self.theme.get("text_primary"),
                self.theme.get("dimmed"),
            );
        }
        if self.show_help {
            self.render_help(area, buf);
        }
        if self.error_modal.active {
            self.render_error_modal(area, buf);
        }
    }
}
