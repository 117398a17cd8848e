use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "ENTRENA_CONFIG";
pub const BACKEND_URL_ENV: &str = "ENTRENA_BACKEND_URL";
pub const ANON_KEY_ENV: &str = "ENTRENA_ANON_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Where this config was loaded from and is saved back to
    #[serde(skip)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_url")]
    pub url: String,

    /// Public (anon) API key sent as the `apikey` header
    #[serde(default)]
    pub anon_key: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: String,

    #[serde(default)]
    pub user_id: String,
}

fn default_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_bucket() -> String {
    "rutinas-media".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            anon_key: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl BackendConfig {
    /// Backend settings with `ENTRENA_BACKEND_URL` / `ENTRENA_ANON_KEY` applied.
    /// The overrides live only in the returned copy and are never saved.
    pub fn effective(&self) -> BackendConfig {
        self.overridden_by(
            std::env::var(BACKEND_URL_ENV).ok(),
            std::env::var(ANON_KEY_ENV).ok(),
        )
    }

    fn overridden_by(&self, url: Option<String>, anon_key: Option<String>) -> BackendConfig {
        let mut backend = self.clone();
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            backend.url = url;
        }
        if let Some(key) = anon_key.filter(|k| !k.is_empty()) {
            backend.anon_key = key;
        }
        backend
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
        }
    }
}

impl Config {
    /// Get config directory path (~/.entrena/)
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".entrena"))
    }

    /// Resolve the config file path: explicit path, then `ENTRENA_CONFIG`,
    /// then ~/.entrena/config.toml
    pub fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_file = Self::config_file(explicit)?;

        let mut config = if config_file.exists() {
            let contents =
                fs::read_to_string(&config_file).context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", config_file);
            Config::default()
        };

        config.path = Some(config_file);
        Ok(config)
    }

    /// Attach a file path without reading it (used by `config init` and tests)
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Save configuration to the file it was loaded from.
    /// A config with no path is in-memory only.
    pub fn save(&self) -> Result<()> {
        let Some(config_file) = &self.path else {
            tracing::debug!("Config has no backing file, skipping save");
            return Ok(());
        };

        if let Some(dir) = config_file.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).context("Failed to create config directory")?;
            }
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_file, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Check if user is authenticated
    pub fn is_authenticated(&self) -> bool {
        !self.auth.access_token.is_empty() && !self.auth.user_id.is_empty()
    }

    /// Store a fresh session
    pub fn set_session(&mut self, access_token: String, refresh_token: String, user_id: String) {
        self.auth.access_token = access_token;
        self.auth.refresh_token = refresh_token;
        self.auth.user_id = user_id;
    }

    /// Update tokens after a refresh; the user stays the same
    pub fn set_tokens(&mut self, access_token: String, refresh_token: String) {
        self.auth.access_token = access_token;
        self.auth.refresh_token = refresh_token;
    }

    /// Clear auth session
    pub fn clear_session(&mut self) {
        self.auth.access_token.clear();
        self.auth.refresh_token.clear();
        self.auth.user_id.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.url, "http://localhost:54321");
        assert_eq!(config.backend.timeout_seconds, 30);
        assert_eq!(config.storage.bucket, "rutinas-media");
        assert!(!config.is_authenticated());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[backend]\nanon_key = \"abc\"\n").unwrap();
        assert_eq!(config.backend.anon_key, "abc");
        assert_eq!(config.backend.url, "http://localhost:54321");
        assert_eq!(config.storage.bucket, "rutinas-media");
    }

    #[test]
    fn test_save_and_load_roundtrip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default().with_path(&path);
        config.backend.url = "https://demo.example.co".to_string();
        config.set_session("access".into(), "refresh".into(), "user-1".into());
        config.save()?;

        let loaded = Config::load(Some(path.as_path()))?;
        assert_eq!(loaded.auth.user_id, "user-1");
        assert_eq!(loaded.path(), Some(path.as_path()));
        assert!(loaded.is_authenticated());

        Ok(())
    }

    #[test]
    fn test_overrides_do_not_touch_stored_backend() {
        let mut config = Config::default();
        config.backend.url = "https://stored.example.co".to_string();

        let backend = config
            .backend
            .overridden_by(Some("https://override.example.co".into()), Some(String::new()));
        assert_eq!(backend.url, "https://override.example.co");
        assert_eq!(backend.anon_key, "");
        assert_eq!(config.backend.url, "https://stored.example.co");

        let saved = toml::to_string_pretty(&config).unwrap();
        assert!(!saved.contains("override"));
    }

    #[test]
    fn test_session_requires_user_id() {
        let mut config = Config::default();
        config.set_tokens("access".into(), "refresh".into());
        assert!(!config.is_authenticated());

        config.set_session("access".into(), "refresh".into(), "user-1".into());
        assert!(config.is_authenticated());

        config.clear_session();
        assert!(!config.is_authenticated());
    }
}
