//! The filterable highlight grid.
//!
//! One parameterized grid serves every view: columns are derived from the
//! first row of whatever dataset is loaded, each column carries its own
//! filter, and the dashboard-wide search term is applied on top. Cell text is
//! rendered through the highlight segmenter so column-filter and
//! global-search matches are styled independently.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Cell, Row as TableRow, StatefulWidget, Table, TableState},
};

use crate::columns::{derive_columns, Column, ColumnKind};
use crate::filters::{ColumnFilters, FilterValue};
use crate::highlight::{segment_cell, MatchKind};
use crate::rows::{cell_text, Row, RowSet};

/// Live grid state: the dataset snapshot, derived columns, filter state, and
/// scroll/selection positions.
pub struct GridState {
    rows: Option<RowSet>,
    columns: Vec<Column>,
    filters: ColumnFilters,
    global_search: String,
    pub table_state: TableState,
    selected_col: usize,
    termcol_index: usize,
    visible_rows_hint: usize,
    visible_cols_hint: usize,
    rendered: bool,
    image_keys: Vec<String>,
}

impl GridState {
    pub fn new(image_keys: Vec<String>) -> Self {
        Self {
            rows: None,
            columns: Vec::new(),
            filters: ColumnFilters::new(),
            global_search: String::new(),
            table_state: TableState::default(),
            selected_col: 0,
            termcol_index: 0,
            visible_rows_hint: 0,
            visible_cols_hint: 1,
            rendered: false,
            image_keys,
        }
    }

    /// Replace the dataset wholesale: columns are re-derived from the new
    /// first row, filters reset, and the viewport returns to the origin. A
    /// refresh never merges with the previous snapshot.
    pub fn replace_rows(&mut self, rows: RowSet) {
        self.columns = derive_columns(rows.rows(), &self.image_keys);
        self.rows = Some(rows);
        self.filters.clear();
        self.selected_col = 0;
        self.termcol_index = 0;
        self.table_state = TableState::default();
        self.clamp_selection();
    }

    pub fn rows(&self) -> Option<&RowSet> {
        self.rows.as_ref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn filters(&self) -> &ColumnFilters {
        &self.filters
    }

    pub fn global_search(&self) -> &str {
        &self.global_search
    }

    /// The search term is owned by the surrounding app; the grid only reads
    /// it for visibility and highlighting.
    pub fn set_global_search(&mut self, term: String) {
        self.global_search = term;
        self.clamp_selection();
    }

    /// Record a filter change for one column. Empty values clear the entry.
    pub fn set_filter(&mut self, column: &str, value: FilterValue) {
        self.filters.set(column, value);
        self.clamp_selection();
    }

    /// Drop all column filters and the search term.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.global_search.clear();
        self.clamp_selection();
    }

    pub fn total_rows(&self) -> usize {
        self.rows.as_ref().map(RowSet::len).unwrap_or(0)
    }

    /// Indices of rows passing the active filters, in dataset order.
    pub fn visible_indices(&self) -> Vec<usize> {
        let Some(rows) = &self.rows else {
            return Vec::new();
        };
        rows.rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                self.filters
                    .row_visible(row, &self.columns, &self.global_search)
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible_indices().len()
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_count();
        if count == 0 {
            self.table_state.select(None);
        } else {
            let selected = self.table_state.selected().unwrap_or(0);
            self.table_state.select(Some(selected.min(count - 1)));
        }
    }

    pub fn select_next(&mut self) {
        let count = self.visible_count();
        if count == 0 {
            return;
        }
        let next = self.table_state.selected().map(|s| s + 1).unwrap_or(0);
        self.table_state.select(Some(next.min(count - 1)));
    }

    pub fn select_previous(&mut self) {
        if self.visible_count() == 0 {
            return;
        }
        let prev = self
            .table_state
            .selected()
            .map(|s| s.saturating_sub(1))
            .unwrap_or(0);
        self.table_state.select(Some(prev));
    }

    pub fn page_down(&mut self) {
        for _ in 0..self.visible_rows_hint.max(1) {
            self.select_next();
        }
    }

    pub fn page_up(&mut self) {
        for _ in 0..self.visible_rows_hint.max(1) {
            self.select_previous();
        }
    }

    pub fn select_first(&mut self) {
        if self.visible_count() > 0 {
            self.table_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let count = self.visible_count();
        if count > 0 {
            self.table_state.select(Some(count - 1));
        }
    }

    pub fn select_next_column(&mut self) {
        if self.columns.is_empty() {
            return;
        }
        self.selected_col = (self.selected_col + 1).min(self.columns.len() - 1);
        let window = self.visible_cols_hint.max(1);
        if self.selected_col >= self.termcol_index + window {
            self.termcol_index = self.selected_col + 1 - window;
        }
    }

    pub fn select_prev_column(&mut self) {
        self.selected_col = self.selected_col.saturating_sub(1);
        if self.selected_col < self.termcol_index {
            self.termcol_index = self.selected_col;
        }
    }

    pub fn selected_column(&self) -> Option<&Column> {
        self.columns.get(self.selected_col)
    }

    pub fn selected_row(&self) -> Option<&Row> {
        let rows = self.rows.as_ref()?;
        let visible = self.visible_indices();
        let selected = self.table_state.selected()?;
        let index = *visible.get(selected)?;
        rows.rows().get(index)
    }

    /// Locator of the selected cell when the selected column renders images.
    pub fn selected_image_locator(&self) -> Option<String> {
        let column = self.selected_column()?;
        if column.kind != ColumnKind::Image {
            return None;
        }
        let text = cell_text(self.selected_row()?, &column.key);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// The export trigger contract: the displayed column list and the rows
    /// that currently pass the filters. `None` before the grid has rendered
    /// once or when no rows are visible; callers treat that as a no-op, not
    /// an error.
    pub fn export_snapshot(&self) -> Option<(Vec<Column>, Vec<&Row>)> {
        if !self.rendered {
            return None;
        }
        let rows = self.rows.as_ref()?;
        let visible: Vec<&Row> = self
            .visible_indices()
            .into_iter()
            .filter_map(|i| rows.rows().get(i))
            .collect();
        if visible.is_empty() {
            return None;
        }
        Some((self.columns.clone(), visible))
    }
}

fn basename(locator: &str) -> &str {
    locator
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(locator)
}

/// Renders a [`GridState`]: two-line header (labels plus active filter
/// texts), content-fit column widths with horizontal scrolling, and
/// highlighted cell text.
pub struct OrderGrid {
    header_fg: Color,
    header_bg: Color,
    filter_match: Color,
    search_match: Color,
    image_fg: Color,
    filter_row_fg: Color,
    cell_padding: u16,
}

impl OrderGrid {
    pub fn new() -> Self {
        Self {
            header_fg: Color::White,
            header_bg: Color::Reset,
            filter_match: Color::LightRed,
            search_match: Color::LightGreen,
            image_fg: Color::DarkGray,
            filter_row_fg: Color::DarkGray,
            cell_padding: 2,
        }
    }

    pub fn with_header_colors(mut self, fg: Color, bg: Color) -> Self {
        self.header_fg = fg;
        self.header_bg = bg;
        self
    }

    /// Colors for the two match kinds. Swapping the arguments swaps which
    /// match kind gets which visual tag.
    pub fn with_match_colors(mut self, filter_match: Color, search_match: Color) -> Self {
        self.filter_match = filter_match;
        self.search_match = search_match;
        self
    }

    pub fn with_image_color(mut self, color: Color) -> Self {
        self.image_fg = color;
        self.filter_row_fg = color;
        self
    }

    pub fn with_cell_padding(mut self, padding: u16) -> Self {
        self.cell_padding = padding;
        self
    }

    fn highlight_style(&self, kind: MatchKind) -> Style {
        match kind {
            MatchKind::None => Style::default(),
            MatchKind::ColumnFilter => Style::default()
                .fg(self.filter_match)
                .add_modifier(Modifier::BOLD),
            MatchKind::GlobalSearch => Style::default()
                .fg(self.search_match)
                .add_modifier(Modifier::BOLD),
        }
    }

    fn cell_line(&self, state: &GridState, row: &Row, column: &Column) -> Line<'static> {
        let text = cell_text(row, &column.key);
        match column.kind {
            ColumnKind::Image => Line::from(Span::styled(
                basename(&text).to_string(),
                Style::default().fg(self.image_fg),
            )),
            ColumnKind::Text => {
                let column_filter = state.filters.pattern_for(&column.key).unwrap_or_default();
                let spans: Vec<Span> =
                    segment_cell(&text, column_filter, &state.global_search)
                        .into_iter()
                        .filter(|segment| !segment.text.is_empty())
                        .map(|segment| {
                            Span::styled(segment.text, self.highlight_style(segment.kind))
                        })
                        .collect();
                Line::from(spans)
            }
        }
    }
}

impl Default for OrderGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl StatefulWidget for &OrderGrid {
    type State = GridState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut GridState) {
        // Exports key off this: before the first render there is no live
        // state to snapshot.
        state.rendered = true;
        state.visible_rows_hint = area.height.saturating_sub(2) as usize;

        if state.columns.is_empty() {
            return;
        }

        let visible = state.visible_indices();
        let rows_ref = match &state.rows {
            Some(rows) => rows,
            None => return,
        };

        // Fit each column to its widest content, walking right from the
        // horizontal scroll position until the area is full. The last column
        // may render partially.
        let window: Vec<&Column> = state.columns[state.termcol_index..].iter().collect();
        let mut widths: Vec<u16> = Vec::new();
        let mut used_width: u16 = 0;
        for column in &window {
            let mut max_len = column.label.chars().count() as u16;
            if let Some(pattern) = state.filters.pattern_for(&column.key) {
                max_len = max_len.max(pattern.chars().count() as u16);
            }
            for &i in &visible {
                let text = cell_text(&rows_ref.rows()[i], &column.key);
                let shown = match column.kind {
                    ColumnKind::Image => basename(&text).chars().count(),
                    ColumnKind::Text => text.chars().count(),
                };
                max_len = max_len.max(shown as u16);
            }
            if used_width + max_len > area.width {
                if widths.is_empty() {
                    widths.push(area.width);
                }
                break;
            }
            widths.push(max_len);
            used_width += max_len + self.cell_padding;
        }

        let header_cells: Vec<Cell> = window
            .iter()
            .take(widths.len())
            .enumerate()
            .map(|(i, column)| {
                let is_selected = state.termcol_index + i == state.selected_col;
                let label_style = if is_selected {
                    Style::default()
                        .fg(self.header_fg)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(self.header_fg)
                };
                let filter_text = state
                    .filters
                    .pattern_for(&column.key)
                    .unwrap_or_default()
                    .to_string();
                Cell::from(Text::from(vec![
                    Line::from(Span::styled(column.label.clone(), label_style)),
                    Line::from(Span::styled(
                        filter_text,
                        Style::default().fg(self.filter_row_fg),
                    )),
                ]))
            })
            .collect();
        let header_style = if self.header_bg == Color::Reset {
            Style::default()
        } else {
            Style::default().bg(self.header_bg)
        };

        let table_rows: Vec<TableRow> = visible
            .iter()
            .map(|&i| {
                let row = &rows_ref.rows()[i];
                let cells: Vec<Cell> = window
                    .iter()
                    .take(widths.len())
                    .map(|column| Cell::from(self.cell_line(state, row, column)))
                    .collect();
                TableRow::new(cells)
            })
            .collect();

        state.visible_cols_hint = widths.len().max(1);
        let widths: Vec<ratatui::layout::Constraint> = widths
            .into_iter()
            .map(ratatui::layout::Constraint::Length)
            .collect();

        StatefulWidget::render(
            Table::new(table_rows, widths)
                .column_spacing(self.cell_padding)
                .header(TableRow::new(header_cells).height(2).style(header_style))
                .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            area,
            buf,
            &mut state.table_state,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grid_with_rows(value: serde_json::Value) -> GridState {
        let rows: Vec<Row> = serde_json::from_value(value).unwrap();
        let mut state = GridState::new(vec!["mainimagepath".to_string()]);
        state.replace_rows(RowSet::new(rows));
        state
    }

    #[test]
    fn test_replace_rows_derives_columns_and_resets_filters() {
        let mut state = grid_with_rows(json!([
            {"order_no": "HF-1", "status": "Pending"},
            {"order_no": "HF-2", "status": "Shipped"},
        ]));
        state.set_filter("status", FilterValue::Text("pend".to_string()));
        assert_eq!(state.visible_count(), 1);

        let replacement: Vec<Row> =
            serde_json::from_value(json!([{"line": "A", "stage": "Cutting"}])).unwrap();
        state.replace_rows(RowSet::new(replacement));
        assert!(state.filters().is_empty());
        let labels: Vec<&str> = state.columns().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["LINE", "STAGE"]);
    }

    #[test]
    fn test_selection_clamps_when_filters_shrink_the_view() {
        let mut state = grid_with_rows(json!([
            {"status": "Pending"},
            {"status": "Shipped"},
            {"status": "Pending"},
        ]));
        state.select_last();
        assert_eq!(state.table_state.selected(), Some(2));
        state.set_filter("status", FilterValue::Text("shipped".to_string()));
        assert_eq!(state.table_state.selected(), Some(0));
        state.set_filter("status", FilterValue::Text("nowhere".to_string()));
        assert_eq!(state.table_state.selected(), None);
    }

    #[test]
    fn test_selected_image_locator() {
        let mut state = grid_with_rows(json!([
            {"mainimagepath": "https://img.example.com/o/1042.jpg", "order_no": "HF-1"},
        ]));
        state.select_first();
        assert_eq!(
            state.selected_image_locator().as_deref(),
            Some("https://img.example.com/o/1042.jpg")
        );
        state.select_next_column();
        assert!(state.selected_image_locator().is_none());
    }

    #[test]
    fn test_export_snapshot_requires_a_render() {
        let state = grid_with_rows(json!([{"a": 1}]));
        assert!(state.export_snapshot().is_none());
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("https://img.example.com/o/1042.jpg"), "1042.jpg");
        assert_eq!(basename("C:\\images\\1042.jpg"), "1042.jpg");
        assert_eq!(basename("1042.jpg"), "1042.jpg");
    }
}
