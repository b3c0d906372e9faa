//! Configuration file support

use hookchat_core::webhook::WEBHOOK_URL_ENV;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "HOOKCHAT_CONFIG_PATH";

/// Configuration for hookchat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Webhook URL replies are fetched from
    pub endpoint: Option<String>,
    /// Name used in the greeting
    pub agency_name: Option<String>,
    /// Number of prior messages sent as context
    pub context_window: Option<usize>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
    /// Color theme (dark, light)
    pub theme: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hookchat")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            endpoint: None,
            agency_name: Some(hookchat_session::DEFAULT_AGENCY_NAME.to_string()),
            context_window: Some(hookchat_session::DEFAULT_CONTEXT_WINDOW),
            tui: Some(true),
            theme: Some("dark".to_string()),
        };

        default_config.save_to(&path)?;
        Ok(path)
    }

    /// Resolve the webhook URL: CLI flag, then environment, then this file
    pub fn resolve_endpoint(&self, cli: Option<String>) -> Option<String> {
        pick_endpoint(cli, std::env::var(WEBHOOK_URL_ENV).ok(), self.endpoint.clone())
    }
}

fn pick_endpoint(
    cli: Option<String>,
    env: Option<String>,
    file: Option<String>,
) -> Option<String> {
    [cli, env, file]
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# hookchat configuration file
# Place at ~/.config/hookchat/config.toml (Linux/Mac) or %APPDATA%\hookchat\config.toml (Windows)
# Override the location with HOOKCHAT_CONFIG_PATH.

# Webhook that answers chat messages (required unless passed with --endpoint
# or set in HOOKCHAT_WEBHOOK_URL)
# endpoint = "https://automation.example.com/webhook/chat"

# Name shown in the greeting
agency_name = "our team"

# How many earlier messages are sent along as context
context_window = 5

# Whether to use TUI mode by default (true by default)
# Set to false for simple stdin/stdout mode
tui = true

# Color theme (dark, light)
theme = "dark"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("hookchat-test-{}-{}", std::process::id(), name))
            .join("config.toml")
    }

    #[test]
    fn test_endpoint_precedence() {
        let cli = Some("https://cli.example/hook".to_string());
        let env = Some("https://env.example/hook".to_string());
        let file = Some("https://file.example/hook".to_string());

        assert_eq!(
            pick_endpoint(cli.clone(), env.clone(), file.clone()),
            cli
        );
        assert_eq!(pick_endpoint(None, env.clone(), file.clone()), env);
        assert_eq!(pick_endpoint(None, None, file.clone()), file);
        assert_eq!(pick_endpoint(None, None, None), None);
    }

    #[test]
    fn test_blank_endpoint_is_skipped() {
        assert_eq!(
            pick_endpoint(Some("  ".into()), None, Some("https://file.example".into())),
            Some("https://file.example".to_string())
        );
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.endpoint, None);
        assert_eq!(config.agency_name.as_deref(), Some("our team"));
        assert_eq!(config.context_window, Some(5));
        assert_eq!(config.tui, Some(true));
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("roundtrip");
        let config = Config {
            endpoint: Some("https://example.com/webhook".into()),
            agency_name: Some("Acme".into()),
            context_window: Some(3),
            tui: Some(false),
            theme: None,
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);

        if let Some(dir) = path.parent() {
            fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_missing_or_invalid_file_gives_defaults() {
        let path = temp_path("invalid");
        assert_eq!(Config::load_from(&path), Config::default());

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "context_window = \"five\"").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
