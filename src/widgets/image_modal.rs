//! Popup for image cells: the terminal can't draw the image itself, so the
//! full locator is shown instead of the grid's abbreviated basename.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};

#[derive(Default)]
pub struct ImageModal {
    pub active: bool,
    pub column_label: String,
    pub locator: String,
}

impl ImageModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, column_label: String, locator: String) {
        self.active = true;
        self.column_label = column_label;
        self.locator = locator;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.column_label.clear();
        self.locator.clear();
    }
}

pub fn render_image_modal(
    area: Rect,
    buf: &mut ratatui::buffer::Buffer,
    modal: &ImageModal,
    border_color: Color,
    text_color: Color,
    dimmed_color: Color,
) {
    Clear.render(area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(modal.column_label.clone());
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(1)])
        .split(inner);

    Paragraph::new(modal.locator.clone())
        .style(Style::default().fg(text_color))
        .wrap(Wrap { trim: false })
        .render(chunks[0], buf);

    Paragraph::new(Line::from(Span::styled(
        "Open in a browser to view · Esc to close",
        Style::default().fg(dimmed_color),
    )))
    .render(chunks[1], buf);
}
