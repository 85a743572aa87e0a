//! Service configuration
//!
//! Resolution priority: command-line argument, then environment variable
//! (both handled by clap in main), then TOML config file, then compiled
//! default.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Resolved live service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,
    /// SQLite database path
    pub db_path: PathBuf,
    /// Base URL the transcoding pipeline publishes media under
    pub media_base_url: String,
    /// Shared secret for player agent endpoints; empty string disables
    /// the check (development only)
    pub agent_secret: String,
    /// Club-local hour the broadcast day opens (inclusive)
    pub open_hour: u32,
    /// Club-local hour the broadcast day closes (exclusive)
    pub close_hour: u32,
}

/// Optional values read from the TOML config file
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    port: Option<u16>,
    db_path: Option<PathBuf>,
    media_base_url: Option<String>,
    agent_secret: Option<String>,
    open_hour: Option<u32>,
    close_hour: Option<u32>,
}

/// Values already resolved from CLI/env, overriding the file
#[derive(Debug, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub db_path: Option<PathBuf>,
    pub media_base_url: Option<String>,
    pub agent_secret: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5750,
            db_path: PathBuf::from("clubcast.db"),
            media_base_url: "http://localhost:5750/media".to_string(),
            agent_secret: String::new(),
            open_hour: 16,
            close_hour: 6,
        }
    }
}

impl Config {
    /// Resolve configuration from an optional TOML file plus CLI/env overrides
    pub fn resolve(config_file: Option<&Path>, overrides: Overrides) -> Result<Config> {
        let file = match config_file {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Cannot read {}: {}", path.display(), e))
                })?;
                toml::from_str::<FileConfig>(&content)
                    .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?
            }
            None => FileConfig::default(),
        };

        let defaults = Config::default();
        Ok(Config {
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            db_path: overrides
                .db_path
                .or(file.db_path)
                .unwrap_or(defaults.db_path),
            media_base_url: overrides
                .media_base_url
                .or(file.media_base_url)
                .unwrap_or(defaults.media_base_url),
            agent_secret: overrides
                .agent_secret
                .or(file.agent_secret)
                .unwrap_or(defaults.agent_secret),
            open_hour: file.open_hour.unwrap_or(defaults.open_hour),
            close_hour: file.close_hour.unwrap_or(defaults.close_hour),
        })
    }

    /// Streaming URL for a transcoded media file
    pub fn media_url(&self, filename: &str) -> String {
        format!(
            "{}/{}/playlist.m3u8",
            self.media_base_url.trim_end_matches('/'),
            filename
        )
    }

    /// Whether a club-local hour falls inside the operating window.
    /// The window wraps midnight: open at 16:00, close at 06:00.
    pub fn is_operating_hour(&self, hour: u32) -> bool {
        hour >= self.open_hour || hour < self.close_hour
    }

    /// Whether the player agent secret matches. An empty configured secret
    /// disables authentication entirely.
    pub fn agent_secret_matches(&self, provided: Option<&str>) -> bool {
        if self.agent_secret.is_empty() {
            return true;
        }
        provided == Some(self.agent_secret.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operating_window_wraps_midnight() {
        let config = Config::default();
        assert!(config.is_operating_hour(16));
        assert!(config.is_operating_hour(23));
        assert!(config.is_operating_hour(0));
        assert!(config.is_operating_hour(5));
        assert!(!config.is_operating_hour(6));
        assert!(!config.is_operating_hour(12));
        assert!(!config.is_operating_hour(15));
    }

    #[test]
    fn test_media_url_construction() {
        let config = Config {
            media_base_url: "https://cdn.example.com/".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.media_url("clip_42"),
            "https://cdn.example.com/clip_42/playlist.m3u8"
        );
    }

    #[test]
    fn test_empty_secret_disables_agent_auth() {
        let config = Config::default();
        assert!(config.agent_secret_matches(None));
        assert!(config.agent_secret_matches(Some("anything")));

        let secured = Config {
            agent_secret: "s3cret".to_string(),
            ..Config::default()
        };
        assert!(secured.agent_secret_matches(Some("s3cret")));
        assert!(!secured.agent_secret_matches(Some("wrong")));
        assert!(!secured.agent_secret_matches(None));
    }

    #[test]
    fn test_overrides_beat_file_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("clubcast.toml");
        std::fs::write(&path, "port = 6000\nmedia_base_url = \"https://file.example\"\n")
            .expect("write config");

        let config = Config::resolve(
            Some(&path),
            Overrides {
                port: Some(7000),
                ..Overrides::default()
            },
        )
        .expect("resolve");

        assert_eq!(config.port, 7000);
        assert_eq!(config.media_base_url, "https://file.example");
    }
}
