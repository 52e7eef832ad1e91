use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LinearError, LinearResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.linear.app/graphql";
pub const DEFAULT_API_KEY_ENV: &str = "LINEAR_API_KEY";
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Top-level configuration, typically loaded from `linear-mcp.toml`.
///
/// Every field has a default so an empty file (or no file at all) is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LinearConfig {
    /// GraphQL endpoint of the tracking service
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Inline API key; takes precedence over `api_key_env` when set
    pub api_key: Option<String>,
    /// Request timeout applied by the HTTP client
    pub timeout_seconds: u64,
    /// Page size used by search tools when the caller gives none
    pub default_page_size: u32,
    /// Name reported in the MCP `initialize` handshake
    pub server_name: String,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            timeout_seconds: 30,
            default_page_size: DEFAULT_PAGE_SIZE,
            server_name: "linear-mcp".to_string(),
        }
    }
}

impl LinearConfig {
    pub fn from_toml_str(raw: &str) -> LinearResult<Self> {
        let config: LinearConfig =
            toml::from_str(raw).map_err(|e| LinearError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> LinearResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            LinearError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Resolve the API key: inline value first, then the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    fn validate(&self) -> LinearResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(LinearError::Config("endpoint must not be empty".to_string()));
        }
        if self.default_page_size == 0 {
            return Err(LinearError::Config(
                "default_page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = LinearConfig::from_toml_str("").unwrap();
        assert_eq!(config, LinearConfig::default());
        assert_eq!(config.default_page_size, 50);
    }

    #[test]
    fn file_values_override_defaults() {
        let config = LinearConfig::from_toml_str(
            r#"
            endpoint = "http://localhost:4000/graphql"
            default_page_size = 10
            api_key = "lin_api_inline"
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:4000/graphql");
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.resolve_api_key().as_deref(), Some("lin_api_inline"));
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = LinearConfig::from_toml_str("default_page_size = 0").unwrap_err();
        assert!(matches!(err, LinearError::Config(_)));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linear-mcp.toml");
        std::fs::write(&path, "server_name = \"tracker\"\n").unwrap();
        let config = LinearConfig::load(&path).unwrap();
        assert_eq!(config.server_name, "tracker");
    }

    #[test]
    fn blank_inline_key_falls_back_to_env_var() {
        let config = LinearConfig {
            api_key: Some("   ".to_string()),
            api_key_env: "LINEAR_MCP_TEST_UNSET_KEY_VAR".to_string(),
            ..LinearConfig::default()
        };
        assert_eq!(config.resolve_api_key(), None);
    }
}
