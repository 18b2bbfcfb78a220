use ratatui::style::Color;
use std::fs;
use tempfile::TempDir;

use trakui::config::{AppConfig, ColorParser, ConfigManager, Theme, ThemeConfig};
use trakui::{rgb_to_256_color, rgb_to_basic_ansi};

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.3");

    assert_eq!(
        config.display.image_columns,
        vec!["mainimagepath".to_string(), "o_filnam".to_string()]
    );

    assert_eq!(config.network.timeout_secs, 10);
    assert_eq!(config.export.document_rows_per_page, 40);
    assert_eq!(config.ui.event_poll_interval_ms, 25);

    assert_eq!(config.theme.color_mode, "auto");
    assert_eq!(config.theme.colors.highlight_filter, "light_red");
    assert_eq!(config.theme.colors.highlight_search, "light_green");
    assert_eq!(config.theme.colors.controls_bg, "indexed(236)");

    assert!(config.views.is_empty());
    assert!(config.validate().is_ok());
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[display]"));
    assert!(template.contains("[network]"));
    assert!(template.contains("[export]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[ui]"));
    assert!(template.contains("version = \"0.3\""));

    // The template's uncommented settings must themselves parse and validate
    let parsed: AppConfig = toml::from_str(&template).expect("template parses");
    assert!(parsed.validate().is_ok());
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    assert!(config_path.exists());

    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[display]"));
    assert!(content.contains("version = \"0.3\""));
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    config_manager
        .write_default_config(false)
        .expect("First write should succeed");

    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("already exists"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let first_path = config_manager
        .write_default_config(false)
        .expect("First write should succeed");

    let second_path = config_manager
        .write_default_config(true)
        .expect("Second write with force should succeed");

    assert_eq!(first_path, second_path);
    assert!(first_path.exists());
}

#[test]
fn test_load_from_path_merges_over_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
version = "0.3"

[network]
timeout_secs = 30

[theme.colors]
highlight_filter = "light_green"
highlight_search = "light_red"

[[views]]
name = "Server 11"
source = "https://example.com/api/data"
"#,
    )
    .unwrap();

    let config = AppConfig::load_from_path(&path).unwrap();
    // Overridden values
    assert_eq!(config.network.timeout_secs, 30);
    assert_eq!(config.theme.colors.highlight_filter, "light_green");
    assert_eq!(config.theme.colors.highlight_search, "light_red");
    assert_eq!(config.views.len(), 1);
    assert_eq!(config.views[0].name, "Server 11");
    // Untouched values keep their defaults
    assert_eq!(config.export.document_rows_per_page, 40);
    assert_eq!(config.theme.colors.primary, "cyan");
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = AppConfig::default();
    config.network.timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.theme.color_mode = "sepia".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.theme.colors.primary = "not_a_color".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.views.push(trakui::config::ViewConfig {
        name: "Orders".to_string(),
        source: String::new(),
    });
    assert!(config.validate().is_err());
}

#[test]
fn test_color_parser_named_and_indexed() {
    let parser = ColorParser::new();
    assert_eq!(parser.parse("cyan").unwrap(), Color::Cyan);
    assert_eq!(parser.parse("dark_gray").unwrap(), Color::DarkGray);
    assert_eq!(parser.parse("default").unwrap(), Color::Reset);
    assert_eq!(parser.parse("indexed(236)").unwrap(), Color::Indexed(236));
    assert!(parser.parse("#00ff00").is_ok());
    assert!(parser.parse("#12345").is_err());
    assert!(parser.parse("chartreuse-ish").is_err());
    assert!(parser.parse("indexed(300)").is_err());
}

#[test]
fn test_rgb_downgrade_helpers() {
    // Grayscale ramp
    assert_eq!(rgb_to_256_color(0, 0, 0), 16);
    assert_eq!(rgb_to_256_color(255, 255, 255), 231);
    // Pure primaries land on the color cube
    assert_eq!(rgb_to_256_color(255, 0, 0), 196);
    assert_eq!(rgb_to_256_color(0, 255, 0), 46);
    assert_eq!(rgb_to_256_color(0, 0, 255), 21);

    assert_eq!(rgb_to_basic_ansi(255, 0, 0), Color::LightRed);
    assert_eq!(rgb_to_basic_ansi(128, 0, 0), Color::Red);
    assert_eq!(rgb_to_basic_ansi(250, 250, 250), Color::White);
}

#[test]
fn test_theme_lookup_and_fallback() {
    let theme = Theme::from_config(&ThemeConfig::default()).unwrap();
    assert_eq!(theme.get("highlight_filter"), Color::LightRed);
    assert_eq!(theme.get("highlight_search"), Color::LightGreen);
    assert_eq!(theme.get("no_such_color"), Color::Reset);
}

#[test]
fn test_swapping_highlight_colors_swaps_the_tags() {
    let mut config = ThemeConfig::default();
    std::mem::swap(
        &mut config.colors.highlight_filter,
        &mut config.colors.highlight_search,
    );
    let theme = Theme::from_config(&config).unwrap();
    assert_eq!(theme.get("highlight_filter"), Color::LightGreen);
    assert_eq!(theme.get("highlight_search"), Color::LightRed);
}
