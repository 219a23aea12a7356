use crate::error::{Result, WispError};
use crate::view::FilterKey;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "WISP_API_URL";
pub const ENV_ACCESS_TOKEN: &str = "WISP_ACCESS_TOKEN";

/// Client configuration, stored as `config.json` in the config directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WispConfig {
    /// Base URL of the REST backend
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token forwarded on every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Filter key used by `list` when none is given
    #[serde(default = "default_filter")]
    pub default_filter: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_filter() -> String {
    FilterKey::AllPrompts.to_string()
}

impl Default for WispConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            access_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_filter: default_filter(),
        }
    }
}

impl WispConfig {
    pub const KEYS: [&'static str; 4] = ["api-url", "access-token", "timeout", "default-filter"];

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: WispConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Environment variables win over the file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            self.api_url = url;
        }
        if let Ok(token) = std::env::var(ENV_ACCESS_TOKEN) {
            self.access_token = Some(token);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api-url" => Some(self.api_url.clone()),
            // never echo the token itself
            "access-token" => Some(match self.access_token {
                Some(_) => "(set)".to_string(),
                None => "(unset)".to_string(),
            }),
            "timeout" => Some(self.timeout_secs.to_string()),
            "default-filter" => Some(self.default_filter.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api-url" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(WispError::Config(format!(
                        "api-url must start with http:// or https://, got '{}'",
                        value
                    )));
                }
                self.api_url = value.trim_end_matches('/').to_string();
            }
            "access-token" => {
                self.access_token = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "timeout" => {
                let secs: u64 = value.parse().map_err(|_| {
                    WispError::Config(format!("timeout must be a number of seconds, got '{}'", value))
                })?;
                if secs == 0 {
                    return Err(WispError::Config("timeout must be at least 1 second".into()));
                }
                self.timeout_secs = secs;
            }
            "default-filter" => {
                let key: FilterKey = value
                    .parse()
                    .map_err(|e| WispError::Config(format!("{}", e)))?;
                self.default_filter = key.to_string();
            }
            other => return Err(WispError::Config(format!("Unknown config key: {}", other))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WispConfig::default();
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.default_filter, "all-prompts");
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = WispConfig::load(dir.path()).unwrap();
        assert_eq!(config, WispConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("wisp");

        let mut config = WispConfig::default();
        config.set("api-url", "https://wisp.example.com/api/").unwrap();
        config.set("timeout", "5").unwrap();
        config.save(&nested).unwrap();

        let loaded = WispConfig::load(&nested).unwrap();
        assert_eq!(loaded.api_url, "https://wisp.example.com/api");
        assert_eq!(loaded.timeout_secs, 5);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{"api_url": "https://x.test"}"#,
        )
        .unwrap();
        let config = WispConfig::load(dir.path()).unwrap();
        assert_eq!(config.api_url, "https://x.test");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = WispConfig::default();
        assert!(config.set("api-url", "ftp://nope").is_err());
        assert!(config.set("timeout", "soon").is_err());
        assert!(config.set("timeout", "0").is_err());
        assert!(config.set("default-filter", "trending").is_err());
        assert!(config.set("color", "blue").is_err());
        assert_eq!(config, WispConfig::default());
    }

    #[test]
    fn test_token_is_masked() {
        let mut config = WispConfig::default();
        assert_eq!(config.get("access-token").unwrap(), "(unset)");
        config.set("access-token", "secret").unwrap();
        assert_eq!(config.get("access-token").unwrap(), "(set)");
        config.set("access-token", "").unwrap();
        assert!(config.access_token.is_none());
    }
}
