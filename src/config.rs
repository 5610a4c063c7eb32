use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Base URL of the recipe backend (without the `/recipes` path)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Signed-in user id; `None` means the session starts signed out
    #[serde(default)]
    pub user: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            user: None,
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("recipe-search/{}", env!("CARGO_PKG_VERSION"))
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_SEARCH__ prefix
    /// 2. recipe-search.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_SEARCH__BASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Parse settings from a TOML document, ignoring the environment
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Load configuration from file and environment variables
///
/// See [`Settings::load`] for the lookup order.
pub fn load_config() -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("recipe-search").required(false))
        // Use double underscore as separator: RECIPE_SEARCH__BASE_URL
        .add_source(
            Environment::with_prefix("RECIPE_SEARCH")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.base_url, "http://localhost:5000");
        assert_eq!(settings.timeout, 30);
        assert!(settings.user_agent.starts_with("recipe-search/"));
        assert!(settings.user.is_none());
    }

    #[test]
    fn test_from_toml_overrides_defaults() {
        let settings = Settings::from_toml(
            r#"
            base_url = "https://recipes.example.com/api"
            timeout = 5
            user = "alice"
            "#,
        )
        .unwrap();

        assert_eq!(settings.base_url, "https://recipes.example.com/api");
        assert_eq!(settings.timeout(), Duration::from_secs(5));
        assert_eq!(settings.user.as_deref(), Some("alice"));
        assert_eq!(settings.user_agent, default_user_agent());
    }

    #[test]
    fn test_from_toml_empty_uses_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.base_url, default_base_url());
        assert_eq!(settings.timeout, default_timeout());
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        let result = Settings::from_toml(r#"timeout = "soon""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_env_overrides_defaults() {
        env::set_var("RECIPE_SEARCH__BASE_URL", "http://env.example:1");
        env::set_var("RECIPE_SEARCH__TIMEOUT", "7");
        env::set_var("RECIPE_SEARCH__USER", "12345");

        let result = load_config();

        env::remove_var("RECIPE_SEARCH__BASE_URL");
        env::remove_var("RECIPE_SEARCH__TIMEOUT");
        env::remove_var("RECIPE_SEARCH__USER");

        let settings = result.unwrap();
        assert_eq!(settings.base_url, "http://env.example:1");
        assert_eq!(settings.timeout(), Duration::from_secs(7));
        assert_eq!(settings.user.as_deref(), Some("12345"));
        assert_eq!(settings.user_agent, default_user_agent());
    }
}
