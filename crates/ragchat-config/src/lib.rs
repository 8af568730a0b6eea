//! Configuration management for ragchat.
//!
//! Parses `ragchat.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Backend URL selection
//!
//! When `api.base_url` is not set, the backend URL is derived from the
//! deployment host and port with [`select_base_url`], the same way the web
//! client picks its API prefix.
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `api.base_url`
//! - `api.host`
//! - `client.user_id_file`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override backend base URL.
    pub base_url: Option<String>,
    /// Override deployment host used for URL selection.
    pub host: Option<String>,
    /// Override deployment port used for URL selection.
    pub port: Option<u16>,
    /// Override request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Override the user id file.
    pub user_id_file: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "ragchat.toml";

/// Default user id file, relative to the config directory.
const DEFAULT_USER_ID_FILE: &str = ".ragchat/user_id";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API configuration.
    pub api: ApiConfig,
    /// Client state configuration (paths are relative strings from TOML).
    client: ClientConfigRaw,
    /// Chat presentation configuration.
    pub chat: ChatConfig,

    /// Resolved client configuration (set after loading).
    #[serde(skip)]
    pub client_resolved: ClientConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Backend API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Explicit backend base URL. Takes precedence over host-based selection.
    pub base_url: Option<String>,
    /// Deployment host the client runs under.
    pub host: String,
    /// Deployment port the client runs under.
    pub port: Option<u16>,
    /// Timeout for question requests, in seconds.
    pub timeout_secs: u64,
    /// Retries after a transport failure (total attempts = retries + 1).
    pub max_retries: u32,
    /// Delay between retries, in milliseconds.
    pub retry_delay_ms: u64,
    /// Timeout for health checks, in seconds.
    pub health_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            host: "localhost".to_owned(),
            port: None,
            timeout_secs: 120,
            max_retries: 2,
            retry_delay_ms: 1000,
            health_timeout_secs: 3,
        }
    }
}

impl ApiConfig {
    /// Absolute backend base URL without trailing slash.
    ///
    /// Uses `base_url` when set, otherwise [`select_base_url`]. Relative
    /// results are joined to `http://{host}[:{port}]`.
    #[must_use]
    pub fn resolved_base_url(&self) -> String {
        let base = self
            .base_url
            .clone()
            .unwrap_or_else(|| select_base_url(&self.host, self.port).to_owned());

        let base = if base.starts_with('/') {
            match self.port {
                Some(port) => format!("http://{}:{port}{base}", self.host),
                None => format!("http://{}{base}", self.host),
            }
        } else {
            base
        };
        base.trim_end_matches('/').to_owned()
    }

    /// Question request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay between retries.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Health check timeout.
    #[must_use]
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}

/// Pick the backend API prefix for a deployment host and port.
///
/// - production domain (`deeplogix.io` and subdomains) → `/rag/api`
/// - reverse proxy on port 7001 or the production address → `/api`
/// - local development → `http://localhost:7000/api`
/// - anything else → `/api`
///
/// # Examples
///
/// ```
/// use ragchat_config::select_base_url;
///
/// assert_eq!(select_base_url("deeplogix.io", None), "/rag/api");
/// assert_eq!(select_base_url("localhost", None), "http://localhost:7000/api");
/// assert_eq!(select_base_url("localhost", Some(7001)), "/api");
/// ```
#[must_use]
pub fn select_base_url(host: &str, port: Option<u16>) -> &'static str {
    if host.contains("deeplogix.io") {
        "/rag/api"
    } else if port == Some(7001) || host == "54.88.62.150" {
        "/api"
    } else if host == "localhost" || host == "127.0.0.1" {
        "http://localhost:7000/api"
    } else {
        "/api"
    }
}

/// Raw client configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ClientConfigRaw {
    user_id_file: Option<String>,
}

/// Resolved client configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ClientConfig {
    /// File holding the persisted client identifier.
    pub user_id_file: PathBuf,
}

/// Chat presentation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Message shown at the start of a new conversation.
    pub welcome_message: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            welcome_message: "Hello, I can help you with any question".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`api.base_url`").
        field: String,
        /// Error message (e.g., "${`RAGCHAT_API`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a numeric field to be greater than zero.
fn require_positive(value: u64, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `ragchat.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated once more after overrides.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url {
            self.api.base_url = Some(base_url.clone());
        }
        if let Some(host) = &settings.host {
            self.api.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.api.port = Some(port);
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.api.timeout_secs = timeout_secs;
        }
        if let Some(user_id_file) = &settings.user_id_file {
            self.client_resolved.user_id_file.clone_from(user_id_file);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            api: ApiConfig::default(),
            client: ClientConfigRaw::default(),
            chat: ChatConfig::default(),
            client_resolved: ClientConfig {
                user_id_file: base.join(DEFAULT_USER_ID_FILE),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_api()?;
        require_non_empty(
            &self.client_resolved.user_id_file.to_string_lossy(),
            "client.user_id_file",
        )?;
        Ok(())
    }

    /// Validate API configuration.
    fn validate_api(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.api.host, "api.host")?;

        if let Some(ref base_url) = self.api.base_url {
            require_non_empty(base_url, "api.base_url")?;
            require_http_url(base_url, "api.base_url")?;
        }

        require_positive(self.api.timeout_secs, "api.timeout_secs")?;
        require_positive(self.api.health_timeout_secs, "api.health_timeout_secs")?;

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.api.host = expand::expand_env(&self.api.host, "api.host")?;

        if let Some(ref url) = self.api.base_url {
            self.api.base_url = Some(expand::expand_env(url, "api.base_url")?);
        }

        if let Some(ref file) = self.client.user_id_file {
            self.client.user_id_file = Some(expand::expand_env(file, "client.user_id_file")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let user_id_file = self
            .client
            .user_id_file
            .as_deref()
            .unwrap_or(DEFAULT_USER_ID_FILE);

        self.client_resolved = ClientConfig {
            user_id_file: config_dir.join(user_id_file),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.api.host, "localhost");
        assert_eq!(config.api.port, None);
        assert_eq!(config.api.timeout_secs, 120);
        assert_eq!(config.api.max_retries, 2);
        assert_eq!(config.api.retry_delay_ms, 1000);
        assert_eq!(config.api.health_timeout_secs, 3);
        assert_eq!(
            config.client_resolved.user_id_file,
            PathBuf::from("/test/.ragchat/user_id")
        );
        assert_eq!(
            config.chat.welcome_message,
            "Hello, I can help you with any question"
        );
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.host, "localhost");
        assert!(config.api.base_url.is_none());
    }

    #[test]
    fn test_parse_api_config() {
        let toml = r#"
[api]
base_url = "https://qa.example.com/api/"
timeout_secs = 30
max_retries = 5
retry_delay_ms = 250
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.max_retries, 5);
        assert_eq!(config.api.retry_delay(), Duration::from_millis(250));
        assert_eq!(config.api.resolved_base_url(), "https://qa.example.com/api");
    }

    #[test]
    fn test_parse_chat_config() {
        let toml = r#"
[chat]
welcome_message = "Ask me about admissions"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.chat.welcome_message, "Ask me about admissions");
    }

    #[test]
    fn test_select_base_url_production_domain() {
        assert_eq!(select_base_url("deeplogix.io", None), "/rag/api");
        assert_eq!(select_base_url("chat.deeplogix.io", Some(443)), "/rag/api");
    }

    #[test]
    fn test_select_base_url_proxy() {
        assert_eq!(select_base_url("example.org", Some(7001)), "/api");
        assert_eq!(select_base_url("54.88.62.150", None), "/api");
    }

    #[test]
    fn test_select_base_url_local() {
        assert_eq!(select_base_url("localhost", None), "http://localhost:7000/api");
        assert_eq!(select_base_url("127.0.0.1", Some(8080)), "http://localhost:7000/api");
    }

    #[test]
    fn test_select_base_url_fallback() {
        assert_eq!(select_base_url("intranet", None), "/api");
    }

    #[test]
    fn test_resolved_base_url_joins_relative_prefix() {
        let api = ApiConfig {
            host: "deeplogix.io".to_owned(),
            ..Default::default()
        };
        assert_eq!(api.resolved_base_url(), "http://deeplogix.io/rag/api");

        let api = ApiConfig {
            host: "proxy.local".to_owned(),
            port: Some(7001),
            ..Default::default()
        };
        assert_eq!(api.resolved_base_url(), "http://proxy.local:7001/api");
    }

    #[test]
    fn test_resolved_base_url_default_is_local_backend() {
        assert_eq!(
            ApiConfig::default().resolved_base_url(),
            "http://localhost:7000/api"
        );
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[client]
user_id_file = "state/uid"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.client_resolved.user_id_file,
            PathBuf::from("/project/state/uid")
        );
    }

    #[test]
    fn test_resolve_paths_default_user_id_file() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.client_resolved.user_id_file,
            PathBuf::from("/project/.ragchat/user_id")
        );
    }

    #[test]
    fn test_apply_cli_settings_base_url() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            base_url: Some("http://10.0.0.5:7000/api".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.api.resolved_base_url(), "http://10.0.0.5:7000/api");
        assert_eq!(config.api.host, "localhost"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_host_and_port() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            host: Some("gateway".to_owned()),
            port: Some(7001),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.api.resolved_base_url(), "http://gateway:7001/api");
    }

    #[test]
    fn test_apply_cli_settings_timeout_and_user_id_file() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            timeout_secs: Some(10),
            user_id_file: Some(PathBuf::from("/tmp/uid")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.client_resolved.user_id_file, PathBuf::from("/tmp/uid"));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let config_before = Config::default_with_base(Path::new("/test"));
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.api.host, config_before.api.host);
        assert_eq!(config.api.base_url, config_before.api.base_url);
        assert_eq!(
            config.client_resolved.user_id_file,
            config_before.client_resolved.user_id_file
        );
    }

    #[test]
    fn test_expand_env_vars_base_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TEST_RAGCHAT_API", "https://qa.test.com/api");
        }

        let toml = r#"
[api]
base_url = "${TEST_RAGCHAT_API}"
host = "${TEST_RAGCHAT_HOST:-localhost}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.api.base_url.as_deref(), Some("https://qa.test.com/api"));
        assert_eq!(config.api.host, "localhost");

        unsafe {
            std::env::remove_var("TEST_RAGCHAT_API");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_RAGCHAT_TEST");
        }

        let toml = r#"
[client]
user_id_file = "${MISSING_VAR_RAGCHAT_TEST}/uid"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let result = config.expand_env_vars();

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_RAGCHAT_TEST"));
        assert!(err.to_string().contains("client.user_id_file"));
    }

    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(msg.contains(s), "Expected '{s}' in error: {msg}");
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_base_url_scheme() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.api.base_url = Some("ftp://example.com".to_owned());
        assert_validation_error(&config, &["api.base_url", "http://"]);
    }

    #[test]
    fn test_validate_host_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.api.host = String::new();
        assert_validation_error(&config, &["api.host", "empty"]);
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.api.timeout_secs = 0;
        assert_validation_error(&config, &["api.timeout_secs"]);

        let mut config = Config::default_with_base(Path::new("/test"));
        config.api.health_timeout_secs = 0;
        assert_validation_error(&config, &["api.health_timeout_secs"]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[api]\nbase_url = \"http://backend:7000/api\"\n\n[client]\nuser_id_file = \"uid\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.api.resolved_base_url(), "http://backend:7000/api");
        assert_eq!(config.client_resolved.user_id_file, dir.path().join("uid"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/nonexistent/ragchat.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_rejects_invalid_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            base_url: Some("backend:7000".to_owned()),
            ..Default::default()
        };
        let result = Config::load(Some(&path), Some(&settings));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[api\nhost = ").unwrap();

        let result = Config::load(Some(&path), None);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
