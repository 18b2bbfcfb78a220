use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

#[derive(Default)]
pub struct Controls {
    pub visible_rows: Option<usize>,
    pub total_rows: Option<usize>,
    pub dimmed: bool,
    pub search_active: bool,
    pub bg: Color,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_counts(mut self, visible: usize, total: usize) -> Self {
        self.visible_rows = Some(visible);
        self.total_rows = Some(total);
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_search_active(mut self, search_active: bool) -> Self {
        self.search_active = search_active;
        self
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        const CONTROLS: [(&str, &str); 8] = [
            ("/", "Search"),
            ("f", "Filter"),
            ("c", "Clear"),
            ("r", "Refresh"),
            ("e", "Export"),
            ("Tab", "View"),
            ("?", "Help"),
            ("q", "Quit"),
        ];

        let mut constraints = CONTROLS.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });

        // Space for "Rows: 12345/12345"
        if self.visible_rows.is_some() {
            constraints.push(Constraint::Length(20));
        }
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let bg = self.bg;

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        for (i, (key, action)) in CONTROLS.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            // Make the "Search" label stand out while a search is applied
            let action_style = if *action == "Search" && self.search_active {
                base_style.bg(bg).fg(Color::Cyan)
            } else {
                base_style.bg(bg)
            };
            Paragraph::new(*action)
                .style(action_style)
                .render(layout[j + 1], buf);
        }

        let mut fill_start_idx = CONTROLS.len() * 2;
        if let (Some(visible), Some(total)) = (self.visible_rows, self.total_rows) {
            let row_count_text = if visible == total {
                format!("Rows: {}", total)
            } else {
                format!("Rows: {}/{}", visible, total)
            };
            Paragraph::new(row_count_text)
                .style(base_style.bg(bg).fg(if self.dimmed {
                    Color::DarkGray
                } else {
                    Color::White
                }))
                .right_aligned()
                .render(layout[fill_start_idx], buf);
            fill_start_idx += 1;
        }

        Paragraph::new("")
            .style(base_style.bg(bg))
            .render(layout[fill_start_idx], buf);
    }
}
