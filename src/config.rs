use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::sizing::{CellMetrics, SizingBounds};

/// Environment variable overriding `server.page_url`.
pub const PAGE_URL_ENV: &str = "CHATBOT_PAGE_URL";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tui: TuiConfig,
    pub server: ServerConfig,
    pub composer: ComposerConfig,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
    /// Enable mouse support (clicking the send button, wheel scrolling).
    pub mouse_enabled: bool,
}

/// Where and how to reach the chatbot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Page URL whose last path segment names the bot.
    pub page_url: String,
    /// Endpoint path; `{bot}` is replaced by the bot name.
    pub endpoint_template: String,
    /// Sent as the `Cookie` header when set.
    pub session_cookie: Option<String>,
    /// Whole-request timeout. Unset means a reply may stream indefinitely.
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: u64,
}

/// Composer sizing, in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub placeholder: String,
    pub min_width_px: u32,
    pub max_width_px: u32,
    pub padding_px: u32,
    pub max_height_px: u32,
    /// Used when the terminal does not report its pixel size.
    pub cell_width_px: u32,
    pub cell_height_px: u32,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 50,
            mouse_enabled: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            page_url: "http://localhost:8005/chat/chatbot1".to_string(),
            endpoint_template: "/api/chat/{bot}".to_string(),
            session_cookie: None,
            request_timeout_secs: None,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        let bounds = SizingBounds::default();
        let cell = CellMetrics::default();
        Self {
            placeholder: "Type your message here...".to_string(),
            min_width_px: bounds.min_width,
            max_width_px: bounds.max_width,
            padding_px: bounds.padding,
            max_height_px: bounds.max_height,
            cell_width_px: cell.width_px,
            cell_height_px: cell.height_px,
        }
    }
}

impl ComposerConfig {
    pub fn bounds(&self) -> SizingBounds {
        SizingBounds {
            min_width: self.min_width_px,
            max_width: self.max_width_px,
            padding: self.padding_px,
            max_height: self.max_height_px,
        }
    }

    pub fn fallback_cell(&self) -> CellMetrics {
        CellMetrics::new(self.cell_width_px, self.cell_height_px)
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/chatbot-tui/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &std::path::Path) -> Self {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e} - using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {} - using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Apply the page URL override: CLI argument first, then environment.
    pub fn with_page_url_override(mut self, cli_arg: Option<String>, env: Option<String>) -> Self {
        if let Some(url) = cli_arg.or(env).filter(|u| !u.trim().is_empty()) {
            log::info!("Page URL override: {url}");
            self.server.page_url = url;
        }
        self
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("chatbot-tui").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
