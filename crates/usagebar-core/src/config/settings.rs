use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::usage::DEFAULT_USAGE_URL;

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Subscription usage monitor")]
pub struct Config {
    /// Enable debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Refresh interval in seconds
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// OAuth access token (overrides the config file)
    #[arg(long, env = "USAGEBAR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Fetch once, print the result and exit
    #[arg(long)]
    pub once: bool,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Refresh interval in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Usage endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// OAuth access token
    #[serde(default, alias = "oauth_token", skip_serializing)]
    pub token: Option<String>,

    /// Notification settings
    #[serde(default)]
    pub notifications: NotificationSettings,
}

fn default_refresh_interval() -> u64 {
    120
}

fn default_request_timeout() -> u64 {
    15
}

fn default_endpoint() -> String {
    DEFAULT_USAGE_URL.to_string()
}

/// Desktop notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Show startup and threshold notifications
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
}

fn default_notifications_enabled() -> bool {
    true
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            request_timeout_secs: default_request_timeout(),
            endpoint: default_endpoint(),
            token: None,
            notifications: NotificationSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                return Self::load_file(p);
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("usagebar/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/usagebar/config.toml")),
            dirs::home_dir().map(|p| p.join(".usagebar.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_file(path);
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(interval) = cli.interval {
            self.refresh_interval_secs = interval;
        }
        if let Some(token) = &cli.token {
            self.token = Some(token.clone());
        }
    }

    /// Validate and normalize settings values
    ///
    /// Keeps the refresh interval from hammering the endpoint.
    pub fn validate(&mut self) {
        const MIN_REFRESH_INTERVAL: u64 = 10;
        const MIN_REQUEST_TIMEOUT: u64 = 1;

        if self.refresh_interval_secs < MIN_REFRESH_INTERVAL {
            self.refresh_interval_secs = MIN_REFRESH_INTERVAL;
        }
        if self.request_timeout_secs < MIN_REQUEST_TIMEOUT {
            self.request_timeout_secs = MIN_REQUEST_TIMEOUT;
        }
        if let Some(token) = &self.token {
            if token.trim().is_empty() {
                self.token = None;
            }
        }
    }

    /// Polling interval
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// HTTP request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.refresh_interval_secs, 120);
        assert_eq!(settings.request_timeout_secs, 15);
        assert_eq!(settings.endpoint, DEFAULT_USAGE_URL);
        assert!(settings.token.is_none());
        assert!(settings.notifications.enabled);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            refresh_interval_secs = 300
            oauth_token = "sk-ant-oat01-abc"

            [notifications]
            enabled = false
        "#;

        let settings: Settings = toml::from_str(toml).expect("Should parse TOML");
        assert_eq!(settings.refresh_interval_secs, 300);
        assert_eq!(settings.request_timeout_secs, 15);
        assert_eq!(settings.token.as_deref(), Some("sk-ant-oat01-abc"));
        assert!(!settings.notifications.enabled);
    }

    #[test]
    fn test_token_not_serialized() {
        let settings = Settings {
            token: Some("secret".to_string()),
            ..Settings::default()
        };
        let out = toml::to_string(&settings).unwrap();
        assert!(!out.contains("secret"));
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "refresh_interval_secs = 60\ntoken = \"abc\"").unwrap();

        let path = file.path().to_path_buf();
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.refresh_interval_secs, 60);
        assert_eq!(settings.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "refresh_interval_secs = \"soon\"").unwrap();

        let path = file.path().to_path_buf();
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_merge_cli_and_validate() {
        let mut settings = Settings::default();
        let cli = Config {
            interval: Some(2),
            token: Some("  ".to_string()),
            ..Config::default()
        };
        settings.merge_cli(&cli);
        settings.validate();

        assert_eq!(settings.refresh_interval_secs, 10);
        assert!(settings.token.is_none());
        assert_eq!(settings.refresh_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_cli_token_from_env() {
        temp_env::with_var("USAGEBAR_TOKEN", Some("from-env"), || {
            let cli = Config::try_parse_from(["usagebar", "--once"]).unwrap();
            assert_eq!(cli.token.as_deref(), Some("from-env"));
            assert!(cli.once);
        });
        temp_env::with_var_unset("USAGEBAR_TOKEN", || {
            let cli = Config::try_parse_from(["usagebar", "-i", "300"]).unwrap();
            assert!(cli.token.is_none());
            assert_eq!(cli.interval, Some(300));
        });
    }
}
