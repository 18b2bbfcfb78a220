//! Two-tier match highlighting for grid cells.
//!
//! Every text cell can be highlighted against two independent patterns at
//! once: the cell's own column filter and the dashboard-wide search term.
//! [`segment_cell`] decomposes a cell's text into contiguous segments, each
//! tagged with at most one match kind, so the renderer can style them without
//! re-scanning the text. Concatenating the segments always reproduces the
//! input exactly.

use regex::RegexBuilder;

/// How one segment of cell text matched the active patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// No pattern matched this run of text.
    None,
    /// Matched the column's own filter text. Wins ties against the search term.
    ColumnFilter,
    /// Matched the dashboard-wide search term.
    GlobalSearch,
}

/// A contiguous run of cell text carrying at most one match kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub kind: MatchKind,
}

impl Segment {
    fn new(text: impl Into<String>, kind: MatchKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Tag a matched segment. Column-filter equality is checked first so the
/// column filter wins when both patterns would cover the same run.
fn tag_match(part: &str, column_filter: &str, global_search: &str) -> MatchKind {
    if !column_filter.is_empty() && eq_ignore_case(part, column_filter) {
        MatchKind::ColumnFilter
    } else if !global_search.is_empty() && eq_ignore_case(part, global_search) {
        MatchKind::GlobalSearch
    } else {
        MatchKind::None
    }
}

/// Split `text` into highlight segments for the given column filter and
/// global search term.
///
/// Both patterns are matched literally (regex metacharacters in user input
/// are escaped) and case-insensitively. The search term is dropped when it is
/// case-insensitively identical to the column filter, and the longer pattern
/// is matched first so a pattern containing the other is never fragmented by
/// it. Empty segments are dropped; when both patterns are empty the whole
/// text comes back as a single unmatched segment without any regex work.
///
/// Never fails: any input degrades to unmatched text at worst.
pub fn segment_cell(text: &str, column_filter: &str, global_search: &str) -> Vec<Segment> {
    if column_filter.is_empty() && global_search.is_empty() {
        return vec![Segment::new(text, MatchKind::None)];
    }

    let mut patterns: Vec<&str> = Vec::with_capacity(2);
    if !column_filter.is_empty() {
        patterns.push(column_filter);
    }
    if !global_search.is_empty() && !eq_ignore_case(global_search, column_filter) {
        patterns.push(global_search);
    }

    // Stable sort: longest first, column filter ahead of an equal-length term.
    patterns.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

    let alternation = patterns
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    let Ok(re) = RegexBuilder::new(&alternation).case_insensitive(true).build() else {
        // Escaped literals always compile; degrade to plain text regardless.
        return vec![Segment::new(text, MatchKind::None)];
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::new(&text[last..m.start()], MatchKind::None));
        }
        segments.push(Segment::new(
            m.as_str(),
            tag_match(m.as_str(), column_filter, global_search),
        ));
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment::new(&text[last..], MatchKind::None));
    }
    segments
}
