//! Export modal state and rendering.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Widget};

use crate::config::Theme;
use crate::export::{default_filename, ExportFormat};
use crate::widgets::text_input::TextInput;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExportFocus {
    FormatSelector,
    #[default]
    PathInput,
    ExportButton,
    CancelButton,
}

pub struct ExportModal {
    pub active: bool,
    pub focus: ExportFocus,
    pub selected_format: ExportFormat,
    pub path_input: TextInput,
    view_name: String,
    /// The generated suggestion; replaced on format change only while the
    /// user hasn't typed a path of their own.
    suggested_path: String,
}

impl ExportModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, view_name: &str, theme: &Theme) {
        self.active = true;
        self.focus = ExportFocus::PathInput;
        self.view_name = view_name.to_string();
        self.path_input = TextInput::new().with_theme(theme);
        self.suggest_path();
    }

    pub fn close(&mut self) {
        self.active = false;
        self.focus = ExportFocus::PathInput;
        self.path_input.clear();
        self.suggested_path.clear();
    }

    fn suggest_path(&mut self) {
        self.suggested_path = default_filename(&self.view_name, self.selected_format);
        self.path_input.set_value(self.suggested_path.clone());
    }

    pub fn path(&self) -> &str {
        self.path_input.value()
    }

    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            ExportFocus::FormatSelector => ExportFocus::PathInput,
            ExportFocus::PathInput => ExportFocus::ExportButton,
            ExportFocus::ExportButton => ExportFocus::CancelButton,
            ExportFocus::CancelButton => ExportFocus::FormatSelector,
        };
    }

    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            ExportFocus::FormatSelector => ExportFocus::CancelButton,
            ExportFocus::PathInput => ExportFocus::FormatSelector,
            ExportFocus::ExportButton => ExportFocus::PathInput,
            ExportFocus::CancelButton => ExportFocus::ExportButton,
        };
    }

    pub fn cycle_format(&mut self) {
        let formats = ExportFormat::ALL;
        let index = formats
            .iter()
            .position(|f| *f == self.selected_format)
            .unwrap_or(0);
        self.selected_format = formats[(index + 1) % formats.len()];
        if self.path_input.value() == self.suggested_path {
            self.suggest_path();
        }
    }
}

impl Default for ExportModal {
    fn default() -> Self {
        Self {
            active: false,
            focus: ExportFocus::PathInput,
            selected_format: ExportFormat::Xlsx,
            path_input: TextInput::new(),
            view_name: String::new(),
            suggested_path: String::new(),
        }
    }
}

/// Render the export modal: format selector on the left, path input and
/// footer buttons on the right.
pub fn render_export_modal(
    area: Rect,
    buf: &mut ratatui::buffer::Buffer,
    modal: &mut ExportModal,
    border_color: Color,
    active_color: Color,
) {
    Clear.render(area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title("Export Rows");
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16), // Format list width
            Constraint::Min(30),    // Path + buttons
        ])
        .split(inner);

    render_format_list(chunks[0], buf, modal, border_color, active_color);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Path input
            Constraint::Fill(1),
            Constraint::Length(3), // Buttons
        ])
        .split(chunks[1]);

    render_path_input(right_chunks[0], buf, modal, border_color, active_color);
    render_footer(right_chunks[2], buf, modal, border_color, active_color);
}

fn render_format_list(
    area: Rect,
    buf: &mut ratatui::buffer::Buffer,
    modal: &ExportModal,
    border_color: Color,
    active_color: Color,
) {
    let is_focused = modal.focus == ExportFocus::FormatSelector;
    let border_style = if is_focused {
        Style::default().fg(active_color)
    } else {
        Style::default().fg(border_color)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title("Format");
    let inner = block.inner(area);
    block.render(area, buf);

    let items: Vec<ListItem> = ExportFormat::ALL
        .iter()
        .map(|format| {
            let marker = if modal.selected_format == *format {
                "●"
            } else {
                "○"
            };
            let style = if modal.selected_format == *format {
                Style::default().fg(active_color)
            } else {
                Style::default().fg(border_color)
            };
            ListItem::new(Line::from(vec![Span::styled(
                format!("{} {}", marker, format.as_str()),
                style,
            )]))
        })
        .collect();

    List::new(items).render(inner, buf);
}

fn render_path_input(
    area: Rect,
    buf: &mut ratatui::buffer::Buffer,
    modal: &mut ExportModal,
    border_color: Color,
    active_color: Color,
) {
    let is_focused = modal.focus == ExportFocus::PathInput;
    let border_style = if is_focused {
        Style::default().fg(active_color)
    } else {
        Style::default().fg(border_color)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title("File Path");
    let inner = block.inner(area);
    block.render(area, buf);

    modal.path_input.set_focused(is_focused);
    (&modal.path_input).render(inner, buf);
}

fn render_footer(
    area: Rect,
    buf: &mut ratatui::buffer::Buffer,
    modal: &ExportModal,
    border_color: Color,
    active_color: Color,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (chunk, label, focus) in [
        (chunks[0], "Export", ExportFocus::ExportButton),
        (chunks[1], "Cancel", ExportFocus::CancelButton),
    ] {
        let style = if modal.focus == focus {
            Style::default().fg(active_color)
        } else {
            Style::default().fg(border_color)
        };
        Paragraph::new(label)
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(style))
            .centered()
            .render(chunk, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_prefills_a_suggested_path() {
        let mut modal = ExportModal::new();
        modal.open("Server 11", &Theme::default());
        assert!(modal.active);
        assert!(modal.path().starts_with("server_11_"));
        assert!(modal.path().ends_with(".xlsx"));
    }

    #[test]
    fn test_cycle_format_updates_untouched_suggestion() {
        let mut modal = ExportModal::new();
        modal.open("Orders", &Theme::default());
        modal.cycle_format();
        assert_eq!(modal.selected_format, ExportFormat::Document);
        assert!(modal.path().ends_with(".txt"));
    }

    #[test]
    fn test_cycle_format_keeps_user_path() {
        let mut modal = ExportModal::new();
        modal.open("Orders", &Theme::default());
        modal.path_input.set_value("weekly.xlsx".to_string());
        modal.cycle_format();
        assert_eq!(modal.path(), "weekly.xlsx");
    }

    #[test]
    fn test_focus_cycle_wraps() {
        let mut modal = ExportModal::new();
        modal.focus = ExportFocus::FormatSelector;
        modal.next_focus();
        assert_eq!(modal.focus, ExportFocus::PathInput);
        modal.prev_focus();
        assert_eq!(modal.focus, ExportFocus::FormatSelector);
        modal.prev_focus();
        assert_eq!(modal.focus, ExportFocus::CancelButton);
    }
}
