use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub display: DisplayConfig,
    pub network: NetworkConfig,
    pub export: ExportConfig,
    pub theme: ThemeConfig,
    pub ui: UiConfig,
    pub views: Vec<ViewConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Row keys rendered as image locators instead of highlighted text,
    /// compared case-insensitively.
    pub image_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub document_rows_per_page: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub color_mode: String,
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub success: String,
    pub error: String,
    pub dimmed: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_inverse: String,
    pub table_header: String,
    pub table_border: String,
    pub modal_border: String,
    pub modal_border_active: String,
    pub modal_border_error: String,
    /// Style tag for column-filter matches. Swap with `highlight_search` to
    /// swap which match kind gets which color.
    pub highlight_filter: String,
    /// Style tag for global-search matches.
    pub highlight_search: String,
    pub cursor_focused: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub event_poll_interval_ms: u64,
}

/// One named dataset the dashboard can show.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ViewConfig {
    pub name: String,
    /// Local fixture path or http(s) endpoint.
    pub source: String,
}

// Default implementations
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.3".to_string(),
            display: DisplayConfig::default(),
            network: NetworkConfig::default(),
            export: ExportConfig::default(),
            theme: ThemeConfig::default(),
            ui: UiConfig::default(),
            views: Vec::new(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            image_columns: vec!["mainimagepath".to_string(), "o_filnam".to_string()],
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            document_rows_per_page: crate::export::DEFAULT_DOCUMENT_ROWS_PER_PAGE,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_mode: "auto".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "yellow".to_string(),
            success: "green".to_string(),
            error: "red".to_string(),
            dimmed: "dark_gray".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            text_inverse: "black".to_string(),
            table_header: "white".to_string(),
            table_border: "cyan".to_string(),
            modal_border: "cyan".to_string(),
            modal_border_active: "yellow".to_string(),
            modal_border_error: "red".to_string(),
            highlight_filter: "light_red".to_string(),
            highlight_search: "light_green".to_string(),
            cursor_focused: "default".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let mut config = AppConfig::default();

        if let Ok(user_config) = Self::load_user_config(app_name) {
            config.merge(user_config);
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from an explicit file path (the `--config` flag),
    /// merged over the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read config file at {}: {}", path.display(), e))?;
        let user_config: AppConfig = toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file at {}: {}", path.display(), e))?;

        let mut config = AppConfig::default();
        config.merge(user_config);
        config.validate()?;
        Ok(config)
    }

    /// Load user configuration from the platform config directory
    fn load_user_config(app_name: &str) -> Result<AppConfig> {
        let config_manager = ConfigManager::new(app_name)?;
        let config_path = config_manager.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.display.merge(other.display);
        self.network.merge(other.network);
        self.export.merge(other.export);
        self.theme.merge(other.theme);
        self.ui.merge(other.ui);
        if !other.views.is_empty() {
            self.views = other.views;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.3") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.3.x",
                self.version
            ));
        }

        if self.network.timeout_secs == 0 {
            return Err(eyre!("timeout_secs must be greater than 0"));
        }

        if self.export.document_rows_per_page == 0 {
            return Err(eyre!("document_rows_per_page must be greater than 0"));
        }

        if self.ui.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        match self.theme.color_mode.as_str() {
            "light" | "dark" | "auto" => {}
            _ => {
                return Err(eyre!(
                    "Invalid color_mode: {}. Must be 'light', 'dark', or 'auto'",
                    self.theme.color_mode
                ))
            }
        }

        for view in &self.views {
            if view.name.is_empty() {
                return Err(eyre!("Every [[views]] entry needs a name"));
            }
            if view.source.is_empty() {
                return Err(eyre!("View '{}' has no source", view.name));
            }
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        if other.image_columns != DisplayConfig::default().image_columns {
            self.image_columns = other.image_columns;
        }
    }
}

impl NetworkConfig {
    pub fn merge(&mut self, other: Self) {
        if other.timeout_secs != NetworkConfig::default().timeout_secs {
            self.timeout_secs = other.timeout_secs;
        }
    }
}

impl ExportConfig {
    pub fn merge(&mut self, other: Self) {
        if other.document_rows_per_page != ExportConfig::default().document_rows_per_page {
            self.document_rows_per_page = other.document_rows_per_page;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        if other.color_mode != ThemeConfig::default().color_mode {
            self.color_mode = other.color_mode;
        }
        self.colors.merge(other.colors);
    }
}

impl UiConfig {
    pub fn merge(&mut self, other: Self) {
        if other.event_poll_interval_ms != UiConfig::default().event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ColorConfig {
    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    /// Field name / value pairs, the names matching [`Theme::get`] keys.
    fn entries(&self) -> [(&'static str, &str); 16] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("success", &self.success),
            ("error", &self.error),
            ("dimmed", &self.dimmed),
            ("controls_bg", &self.controls_bg),
            ("text_primary", &self.text_primary),
            ("text_inverse", &self.text_inverse),
            ("table_header", &self.table_header),
            ("table_border", &self.table_border),
            ("modal_border", &self.modal_border),
            ("modal_border_active", &self.modal_border_active),
            ("modal_border_error", &self.modal_border_error),
            ("highlight_filter", &self.highlight_filter),
            ("highlight_search", &self.highlight_search),
            ("cursor_focused", &self.cursor_focused),
        ]
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();
        macro_rules! merge_color {
            ($field:ident) => {
                if other.$field != default.$field {
                    self.$field = other.$field;
                }
            };
        }
        merge_color!(primary);
        merge_color!(secondary);
        merge_color!(success);
        merge_color!(error);
        merge_color!(dimmed);
        merge_color!(controls_bg);
        merge_color!(text_primary);
        merge_color!(text_inverse);
        merge_color!(table_header);
        merge_color!(table_border);
        merge_color!(modal_border);
        merge_color!(modal_border_active);
        merge_color!(modal_border_error);
        merge_color!(highlight_filter);
        merge_color!(highlight_search);
        merge_color!(cursor_focused);
    }
}

/// Convert an RGB triple to the nearest xterm-256 palette index.
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    // Grayscale ramp when the channels are close together
    if r == g && g == b {
        if r < 8 {
            return 16;
        }
        if r > 248 {
            return 231;
        }
        return 232 + ((r as u16 - 8) * 24 / 240) as u8;
    }
    let quant = |c: u8| -> u16 {
        if c < 48 {
            0
        } else if c < 115 {
            1
        } else {
            ((c as u16 - 35) / 40).min(5)
        }
    };
    (16 + 36 * quant(r) + 6 * quant(g) + quant(b)) as u8
}

/// Convert an RGB triple to the closest of the 16 basic ANSI colors.
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    const BASIC: [(u8, u8, u8, Color); 16] = [
        (0, 0, 0, Color::Black),
        (128, 0, 0, Color::Red),
        (0, 128, 0, Color::Green),
        (128, 128, 0, Color::Yellow),
        (0, 0, 128, Color::Blue),
        (128, 0, 128, Color::Magenta),
        (0, 128, 128, Color::Cyan),
        (192, 192, 192, Color::Gray),
        (128, 128, 128, Color::DarkGray),
        (255, 0, 0, Color::LightRed),
        (0, 255, 0, Color::LightGreen),
        (255, 255, 0, Color::LightYellow),
        (0, 0, 255, Color::LightBlue),
        (255, 0, 255, Color::LightMagenta),
        (0, 255, 255, Color::LightCyan),
        (255, 255, 255, Color::White),
    ];
    let mut best = Color::White;
    let mut best_dist = u32::MAX;
    for (br, bg, bb, color) in BASIC {
        let dist = (r as i32 - br as i32).pow(2) as u32
            + (g as i32 - bg as i32).pow(2) as u32
            + (b as i32 - bb as i32).pow(2) as u32;
        if dist < best_dist {
            best_dist = dist;
            best = color;
        }
    }
    best
}

/// Terminal color depth the parser downgrades RGB values to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorDepth {
    Basic,
    Ansi256,
    TrueColor,
}

/// Parses config color strings: named colors, `indexed(n)`, `#rrggbb` hex,
/// and `default` for the terminal's own color. Hex values are downgraded to
/// what the terminal actually supports.
pub struct ColorParser {
    depth: ColorDepth,
}

impl ColorParser {
    pub fn new() -> Self {
        let depth = match supports_color::on(Stream::Stdout) {
            Some(level) if level.has_16m => ColorDepth::TrueColor,
            Some(level) if level.has_256 => ColorDepth::Ansi256,
            Some(_) => ColorDepth::Basic,
            None => ColorDepth::Basic,
        };
        Self { depth }
    }

    pub fn parse(&self, value: &str) -> Result<Color> {
        let value = value.trim();
        let lower = value.to_lowercase();

        if let Some(color) = named_color(&lower) {
            return Ok(color);
        }

        if let Some(index) = lower
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let index: u8 = index
                .trim()
                .parse()
                .map_err(|_| eyre!("indexed() expects a number from 0 to 255, got '{}'", value))?;
            return Ok(Color::Indexed(index));
        }

        if let Some(hex) = lower.strip_prefix('#') {
            if hex.len() != 6 {
                return Err(eyre!("Hex colors must be #rrggbb, got '{}'", value));
            }
            let parse_channel = |s: &str| {
                u8::from_str_radix(s, 16).map_err(|_| eyre!("Invalid hex color '{}'", value))
            };
            let r = parse_channel(&hex[0..2])?;
            let g = parse_channel(&hex[2..4])?;
            let b = parse_channel(&hex[4..6])?;
            return Ok(match self.depth {
                ColorDepth::TrueColor => Color::Rgb(r, g, b),
                ColorDepth::Ansi256 => Color::Indexed(rgb_to_256_color(r, g, b)),
                ColorDepth::Basic => rgb_to_basic_ansi(r, g, b),
            });
        }

        Err(eyre!("Unrecognized color '{}'", value))
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name {
        "default" => Color::Reset,
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "dark_gray" | "dark_grey" => Color::DarkGray,
        "light_red" => Color::LightRed,
        "light_green" => Color::LightGreen,
        "light_yellow" => Color::LightYellow,
        "light_blue" => Color::LightBlue,
        "light_magenta" => Color::LightMagenta,
        "light_cyan" => Color::LightCyan,
        "white" => Color::White,
        _ => return None,
    };
    Some(color)
}

/// Resolved UI colors, looked up by the same names as the config fields.
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Resolve a [`ThemeConfig`] into concrete colors.
    pub fn from_config(config: &ThemeConfig) -> Result<Theme> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        for (name, value) in config.colors.entries() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Theme { colors })
    }

    /// Look up a color by name; unknown names fall back to the terminal
    /// default rather than failing a render pass.
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::from_config(&ThemeConfig::default()).unwrap_or(Theme {
            colors: HashMap::new(),
        })
    }
}

pub const DEFAULT_CONFIG_TEMPLATE: &str = r##"# trakui configuration
version = "0.3"

[display]
# Row keys rendered as image locators instead of highlighted text
# (compared case-insensitively).
image_columns = ["mainimagepath", "o_filnam"]

[network]
# Seconds to wait for HTTP sources before giving up.
timeout_secs = 10

[export]
# Rows per page of the Document export.
document_rows_per_page = 40

[theme]
# "light", "dark", or "auto"
color_mode = "auto"

[theme.colors]
# Colors accept names ("cyan", "dark_gray"), "indexed(n)", or "#rrggbb".
primary = "cyan"
secondary = "yellow"
success = "green"
error = "red"
dimmed = "dark_gray"
controls_bg = "indexed(236)"
text_primary = "white"
text_inverse = "black"
table_header = "white"
table_border = "cyan"
modal_border = "cyan"
modal_border_active = "yellow"
modal_border_error = "red"
# Swap these two to swap which match kind gets which color.
highlight_filter = "light_red"
highlight_search = "light_green"
cursor_focused = "default"

[ui]
event_poll_interval_ms = 25

# Named datasets. The first entry is shown on startup; Tab cycles.
# [[views]]
# name = "Orders"
# source = "https://example.com/api/data"
#
# [[views]]
# name = "Server 11"
# source = "fixtures/server11.json"
"##;
