//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/tandem/config.toml)
//! 3. Environment variables (TANDEM_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "TANDEM";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for local snapshots (lists, profile)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Remote record store base URL (optional)
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Whether background sync is enabled
    #[serde(default)]
    pub sync_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            remote_url: None,
            sync_enabled: false,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (TANDEM_DATA_DIR, TANDEM_REMOTE_URL, TANDEM_SYNC_ENABLED)
    /// 2. Config file (~/.config/tandem/config.toml or TANDEM_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // TANDEM_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // TANDEM_REMOTE_URL
        if let Ok(val) = std::env::var(format!("{}_REMOTE_URL", ENV_PREFIX)) {
            self.remote_url = if val.is_empty() { None } else { Some(val) };
        }

        // TANDEM_SYNC_ENABLED
        if let Ok(val) = std::env::var(format!("{}_SYNC_ENABLED", ENV_PREFIX)) {
            self.sync_enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with TANDEM_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tandem")
            .join("config.toml")
    }

    /// Get the path of the list collection snapshot
    pub fn lists_path(&self) -> PathBuf {
        self.data_dir.join("lists.json")
    }

    /// Get the path of the user profile snapshot
    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join("profile.json")
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tandem")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &["TANDEM_DATA_DIR", "TANDEM_REMOTE_URL", "TANDEM_SYNC_ENABLED"];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.sync_enabled);
        assert!(config.remote_url.is_none());
        assert!(config.data_dir.ends_with("tandem"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.lists_path().ends_with("lists.json"));
        assert!(config.profile_path().ends_with("profile.json"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("TANDEM_DATA_DIR", "/tmp/tandem-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/tandem-test"));
    }

    #[test]
    fn test_env_override_sync_enabled() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(!config.sync_enabled);

        env::set_var("TANDEM_SYNC_ENABLED", "true");
        config.apply_env_overrides();
        assert!(config.sync_enabled);

        env::set_var("TANDEM_SYNC_ENABLED", "1");
        config.sync_enabled = false;
        config.apply_env_overrides();
        assert!(config.sync_enabled);

        env::set_var("TANDEM_SYNC_ENABLED", "false");
        config.apply_env_overrides();
        assert!(!config.sync_enabled);
    }

    #[test]
    fn test_env_override_remote_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(config.remote_url.is_none());

        env::set_var("TANDEM_REMOTE_URL", "https://records.example.com");
        config.apply_env_overrides();
        assert_eq!(
            config.remote_url,
            Some("https://records.example.com".to_string())
        );

        // Empty string clears it
        env::set_var("TANDEM_REMOTE_URL", "");
        config.apply_env_overrides();
        assert!(config.remote_url.is_none());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/tandem"),
            remote_url: Some("https://records.example.com".to_string()),
            sync_enabled: true,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("remote_url"));
        assert!(toml_str.contains("sync_enabled"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.remote_url, config.remote_url);
        assert_eq!(parsed.sync_enabled, config.sync_enabled);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            remote_url = "https://records.example.com"
            sync_enabled = true
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(
            config.remote_url,
            Some("https://records.example.com".to_string())
        );
        assert!(config.sync_enabled);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var(
            "TANDEM_DATA_DIR",
            temp_dir.path().join("data").to_str().unwrap(),
        );

        let path = temp_dir.path().join("missing-config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert!(!config.sync_enabled);
        assert!(config.remote_url.is_none());
    }
}
