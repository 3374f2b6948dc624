//! Library configuration.
//!
//! Configuration is stored at `~/.config/latchkey/config.json` and covers
//! the service base URL, the credential mode, and where the bearer
//! credential is kept. Environment variables override the file, and a
//! local `.env` is honored for development setups.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::auth::{CredentialMode, TokenVault};

/// Application name used for config/data directory paths
const APP_NAME: &str = "latchkey";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default service endpoint for local development.
const DEFAULT_SERVICE_URL: &str = "http://localhost:8001";

/// Environment override for the service base URL.
const ENV_SERVICE_URL: &str = "LATCHKEY_SERVICE_URL";

/// Environment override for the credential mode (`cookie` or `bearer`).
const ENV_AUTH_MODE: &str = "LATCHKEY_AUTH_MODE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service_url: String,
    pub mode: CredentialMode,
    /// Overrides the platform data directory for the credential vault.
    pub data_dir: Option<PathBuf>,
    /// Keep the bearer credential in the OS keychain instead of a file.
    pub use_keychain: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            mode: CredentialMode::default(),
            data_dir: None,
            use_keychain: false,
        }
    }
}

impl Config {
    /// Load the config file if present, then apply environment overrides.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(ENV_SERVICE_URL) {
            self.service_url = url;
        }
        if let Ok(mode) = std::env::var(ENV_AUTH_MODE) {
            self.mode = mode.parse()?;
        }
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Where the credential vault lives when file-backed.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub(crate) fn token_vault(&self) -> Result<TokenVault> {
        if self.use_keychain {
            Ok(TokenVault::keychain(APP_NAME))
        } else {
            Ok(TokenVault::file(self.data_dir()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.mode, CredentialMode::Cookie);
        assert!(config.data_dir.is_none());
        assert!(!config.use_keychain);
    }

    #[test]
    fn test_partial_config_file_falls_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"mode":"bearer"}"#).expect("partial config parses");
        assert_eq!(config.mode, CredentialMode::Bearer);
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
    }

    #[test]
    fn test_serde_round_trip() {
        let config = Config {
            service_url: "https://auth.example.com".to_string(),
            mode: CredentialMode::Bearer,
            data_dir: Some(PathBuf::from("/tmp/latchkey")),
            use_keychain: true,
        };
        let json = serde_json::to_string_pretty(&config).expect("serializes");
        let parsed: Config = serde_json::from_str(&json).expect("parses back");
        assert_eq!(parsed.service_url, config.service_url);
        assert_eq!(parsed.mode, config.mode);
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.use_keychain, config.use_keychain);
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                (ENV_SERVICE_URL, Some("https://auth.example.com")),
                (ENV_AUTH_MODE, Some("bearer")),
            ],
            || {
                let mut config = Config::default();
                config.apply_env_overrides().expect("valid overrides");
                assert_eq!(config.service_url, "https://auth.example.com");
                assert_eq!(config.mode, CredentialMode::Bearer);
            },
        );
    }

    #[test]
    fn test_env_override_rejects_unknown_mode() {
        temp_env::with_var(ENV_AUTH_MODE, Some("saml"), || {
            let mut config = Config::default();
            assert!(config.apply_env_overrides().is_err());
        });
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/latchkey-test")),
            ..Config::default()
        };
        assert_eq!(
            config.data_dir().expect("resolves"),
            PathBuf::from("/tmp/latchkey-test")
        );
    }
}
