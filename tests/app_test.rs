use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use std::sync::mpsc;
use tempfile::TempDir;

use trakui::{App, AppConfig, AppEvent, ExportFormat, InputMode, RowSource, Theme, View};

mod common;

fn app_with_fixture(dir: &TempDir) -> App {
    let rows = common::order_rows();
    let path = common::write_fixture(dir.path(), "orders.json", &rows);
    let (tx, _rx) = mpsc::channel();
    let views = vec![View {
        name: "Orders".to_string(),
        source: RowSource::parse(&path.to_string_lossy()),
    }];
    App::new_with_config(tx, Theme::default(), AppConfig::default(), views)
}

fn drive(app: &mut App, event: AppEvent) {
    let mut next = app.event(&event);
    while let Some(event) = next.take() {
        next = app.event(&event);
    }
}

fn render(app: &mut App) {
    let area = Rect::new(0, 0, 100, 30);
    let mut buf = Buffer::empty(area);
    app.render(area, &mut buf);
}

#[test]
fn test_app_creation() {
    let (tx, _) = mpsc::channel();
    let app = App::new(tx);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.view_count(), 0);
}

#[test]
fn test_open_loads_the_fixture() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_fixture(&dir);

    drive(&mut app, AppEvent::Open(0));

    assert_eq!(app.grid.total_rows(), 3);
    assert_eq!(app.active_view().unwrap().name, "Orders");
    let labels: Vec<&str> = app.grid.columns().iter().map(|c| c.label.as_str()).collect();
    assert!(labels.contains(&"ORDER NO"));
}

#[test]
fn test_refresh_replaces_the_snapshot() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_fixture(&dir);
    drive(&mut app, AppEvent::Open(0));
    assert_eq!(app.grid.total_rows(), 3);

    // The file shrinks between loads; the refresh must replace, not merge.
    let smaller = vec![common::order_rows()[0].clone()];
    common::write_fixture(dir.path(), "orders.json", &smaller);
    drive(&mut app, AppEvent::Refresh);
    assert_eq!(app.grid.total_rows(), 1);
}

#[test]
fn test_search_event_reaches_the_grid() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_fixture(&dir);
    drive(&mut app, AppEvent::Open(0));

    drive(&mut app, AppEvent::Search("coastline".to_string()));
    assert_eq!(app.grid.global_search(), "coastline");
    assert_eq!(app.grid.visible_count(), 1);
}

#[test]
fn test_export_before_first_render_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_fixture(&dir);
    drive(&mut app, AppEvent::Open(0));

    let out = dir.path().join("early.xlsx");
    drive(&mut app, AppEvent::Export(ExportFormat::Xlsx, out.clone()));
    assert!(!out.exists());
}

#[test]
fn test_export_after_render_writes_a_file() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_fixture(&dir);
    drive(&mut app, AppEvent::Open(0));
    render(&mut app);

    let out = dir.path().join("orders.xlsx");
    drive(&mut app, AppEvent::Export(ExportFormat::Xlsx, out.clone()));
    assert!(out.exists());

    let out = dir.path().join("orders.txt");
    drive(&mut app, AppEvent::Export(ExportFormat::Document, out.clone()));
    let content = std::fs::read_to_string(&out).unwrap();
    assert!(content.contains("Orders"));
    assert!(content.contains("HF-1042"));
}

#[test]
fn test_quit_key_requests_exit() {
    let (tx, _) = mpsc::channel();
    let mut app = App::new(tx);
    let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
    assert!(matches!(
        app.event(&AppEvent::Key(key)),
        Some(AppEvent::Exit)
    ));
}

#[test]
fn test_search_key_enters_and_leaves_search_mode() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_fixture(&dir);
    drive(&mut app, AppEvent::Open(0));

    let slash = KeyEvent::new(KeyCode::Char('/'), KeyModifiers::NONE);
    drive(&mut app, AppEvent::Key(slash));
    assert_eq!(app.input_mode, InputMode::Search);

    // Typing narrows the view immediately
    for c in "coast".chars() {
        let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        drive(&mut app, AppEvent::Key(key));
    }
    assert_eq!(app.grid.visible_count(), 1);

    let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
    drive(&mut app, AppEvent::Key(enter));
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.grid.global_search(), "coast");

    // Esc reverts to the term that was active before editing
    let slash = KeyEvent::new(KeyCode::Char('/'), KeyModifiers::NONE);
    drive(&mut app, AppEvent::Key(slash));
    for c in "xyz".chars() {
        let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        drive(&mut app, AppEvent::Key(key));
    }
    let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
    drive(&mut app, AppEvent::Key(esc));
    assert_eq!(app.grid.global_search(), "coast");
}

#[test]
fn test_filter_key_edits_the_selected_column() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_fixture(&dir);
    drive(&mut app, AppEvent::Open(0));

    // Move selection to the second column ("buyer") and filter it
    let right = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
    drive(&mut app, AppEvent::Key(right));
    let f = KeyEvent::new(KeyCode::Char('f'), KeyModifiers::NONE);
    drive(&mut app, AppEvent::Key(f));
    assert_eq!(app.input_mode, InputMode::Filter);

    for c in "north".chars() {
        let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        drive(&mut app, AppEvent::Key(key));
    }
    let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
    drive(&mut app, AppEvent::Key(enter));

    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.grid.filters().pattern_for("buyer"), Some("north"));
    assert_eq!(app.grid.visible_count(), 1);

    // 'c' clears filters and search together
    let c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
    drive(&mut app, AppEvent::Key(c));
    assert!(app.grid.filters().is_empty());
    assert_eq!(app.grid.visible_count(), 3);
}

#[test]
fn test_export_modal_flow() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_fixture(&dir);
    drive(&mut app, AppEvent::Open(0));
    render(&mut app);

    let e = KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE);
    drive(&mut app, AppEvent::Key(e));
    assert!(app.export_modal.active);
    assert!(app.export_modal.path().ends_with(".xlsx"));

    // Esc closes without exporting
    let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
    drive(&mut app, AppEvent::Key(esc));
    assert!(!app.export_modal.active);
}
