use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Where the podcast catalog lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Responsive page-size parameters for the show grid.
///
/// Widths are logical pixels; the terminal front-end converts columns to
/// pixels with `column_px`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_card_width_px")]
    pub card_width_px: u32,
    #[serde(default = "default_max_rows")]
    pub max_rows: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    #[serde(default = "default_narrow_breakpoint_px")]
    pub narrow_breakpoint_px: u32,
    #[serde(default = "default_column_px")]
    pub column_px: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_enabled")]
    pub enabled: bool,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding favorites, the last track, theme and the log.
    #[serde(default = "platform::data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            card_width_px: default_card_width_px(),
            max_rows: default_max_rows(),
            max_page_size: default_max_page_size(),
            narrow_breakpoint_px: default_narrow_breakpoint_px(),
            column_px: default_column_px(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            enabled: default_player_enabled(),
            volume: default_volume(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: platform::data_dir(),
        }
    }
}

fn default_base_url() -> String {
    "https://podcast-api.netlify.app".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_card_width_px() -> u32 {
    260
}

fn default_max_rows() -> u32 {
    2
}

fn default_max_page_size() -> usize {
    8
}

fn default_narrow_breakpoint_px() -> u32 {
    1024
}

fn default_column_px() -> u32 {
    8
}

fn default_player_enabled() -> bool {
    true
}

fn default_volume() -> f32 {
    0.7
}

impl Config {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://podcast-api.netlify.app");
        assert_eq!(config.listing.card_width_px, 260);
        assert_eq!(config.listing.max_page_size, 8);
        assert_eq!(config.listing.narrow_breakpoint_px, 1024);
        assert!(config.player.enabled);
        assert!(config.paths.data_dir.ends_with("podshelf"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[api]\nbase_url = \"http://localhost:9000\"\n").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.listing.max_rows, 2);
    }

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.listing.column_px, 8);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.api.base_url, config.api.base_url);
    }
}
