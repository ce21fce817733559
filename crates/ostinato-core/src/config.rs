use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for ostinato.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (OST_* prefix)
/// 3. Config file (~/.config/ostinato/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Discord bot token (required to run the bot).
    ///
    /// Can be set via:
    /// - ENV: OST_DISCORD_TOKEN
    /// - Config: discord_token = "..."
    pub discord_token: Option<String>,

    /// Last.fm API key (required for all scrobble lookups).
    ///
    /// Can be set via:
    /// - ENV: OST_LASTFM_API_KEY
    /// - Config: lastfm_api_key = "..."
    pub lastfm_api_key: Option<String>,

    /// Spotify client id for cover-art search (optional; charts fall
    /// back to Last.fm-supplied images without it).
    pub spotify_client_id: Option<String>,

    /// Spotify client secret, paired with `spotify_client_id`.
    pub spotify_client_secret: Option<String>,

    /// Path to the SQLite identity store.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: OST_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/ostinato/links.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_token: None,
            lastfm_api_key: None,
            spotify_client_id: None,
            spotify_client_secret: None,
            database_path: default_db_path(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/ostinato/config.toml
    /// Reads environment variables with OST_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("ost");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with a custom database path (the --db flag).
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }
}

/// Get the default identity-store path.
///
/// Returns: ~/.local/share/ostinato/links.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ostinato")
        .join("links.db")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/ostinato/config.toml
/// - macOS: ~/Library/Application Support/ostinato/config.toml
/// - Windows: %APPDATA%\ostinato\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ostinato")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Ostinato Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (OST_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Discord bot token
#
# Create a bot and grab its token at: https://discord.com/developers/applications
# The bot needs the MESSAGE CONTENT intent enabled.
#
# Can also be set via:
# - Environment: OST_DISCORD_TOKEN=your-token-here
discord_token = "your-discord-bot-token-here"

# Last.fm API key, used for every scrobble lookup
#
# Register for a free API key at: https://www.last.fm/api/account/create
#
# Can also be set via:
# - Environment: OST_LASTFM_API_KEY=your-key-here
lastfm_api_key = "your-lastfm-api-key-here"

# Spotify client credentials (optional)
#
# When present, chart cover art is searched on Spotify first, which has
# much better coverage than the images Last.fm returns. Without them,
# charts still render using Last.fm-supplied images.
#spotify_client_id = "your-spotify-client-id"
#spotify_client_secret = "your-spotify-client-secret"

# Path to the SQLite identity store
#
# Stores the Discord user -> Last.fm username links
#
# Can also be set via:
# - CLI: ostinato --db /custom/path.db
# - Environment: OST_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/links.db"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.database_path.as_os_str().is_empty());
        assert!(config.discord_token.is_none());
        assert!(config.lastfm_api_key.is_none());
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_db_path() {
        let custom_path = PathBuf::from("/tmp/test.db");
        let config = Config::load_with_db_path(custom_path.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().database_path, custom_path);
    }
}
