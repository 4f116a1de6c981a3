use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "PiggyChef";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND: &str = "127.0.0.1:8000";
const DEFAULT_MAX_UPLOAD_MB: usize = 25;
const DEFAULT_PASSWORD_ITERATIONS: u32 = 310_000;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

pub const DEEPSEEK_DEFAULT_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_DEFAULT_MODEL: &str = "deepseek-chat";
pub const ARK_DEFAULT_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";
pub const ARK_DEFAULT_MODEL: &str = "doubao-pro-32k";

/// Default tracing filter, overridden by `RUST_LOG`.
pub fn default_log_filter() -> &'static str {
    "piggychef=info,tower_http=info"
}

/// Get the application data directory
/// ~/PiggyChef/ on all platforms, falling back to the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite database location.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("piggychef.db")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Connection settings for one OpenAI-compatible chat-completion provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Human-readable provider name used in logs.
    pub name: String,
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    /// Bearer credential. `None` disables the provider without failing calls.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn deepseek(api_key: Option<String>) -> Self {
        Self {
            name: "deepseek".into(),
            base_url: DEEPSEEK_DEFAULT_URL.into(),
            model: DEEPSEEK_DEFAULT_MODEL.into(),
            api_key,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }

    pub fn ark(api_key: Option<String>) -> Self {
        Self {
            name: "ark".into(),
            base_url: ARK_DEFAULT_URL.into(),
            model: ARK_DEFAULT_MODEL.into(),
            api_key,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub max_upload_bytes: usize,
    pub password_iterations: u32,
    /// Serves structure extraction, cross-linking and task generation.
    pub structuring: ProviderConfig,
    /// Serves the syllabus refiner.
    pub refining: ProviderConfig,
}

impl ServerConfig {
    /// Build configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present;
    /// variables already set in the environment take precedence.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("PIGGYCHEF_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "PIGGYCHEF_BIND",
            value: bind_raw.clone(),
        })?;

        let db_path = get("PIGGYCHEF_DB")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let max_upload_mb: usize = parse_or("PIGGYCHEF_MAX_UPLOAD_MB", get("PIGGYCHEF_MAX_UPLOAD_MB"), DEFAULT_MAX_UPLOAD_MB)?;
        let password_iterations: u32 = parse_or(
            "PIGGYCHEF_PASSWORD_ITERATIONS",
            get("PIGGYCHEF_PASSWORD_ITERATIONS"),
            DEFAULT_PASSWORD_ITERATIONS,
        )?;
        let timeout_secs: u64 = parse_or("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"), DEFAULT_LLM_TIMEOUT_SECS)?;
        let timeout = Duration::from_secs(timeout_secs);

        let mut structuring = ProviderConfig::deepseek(get("DEEPSEEK_API_KEY"));
        if let Some(url) = get("DEEPSEEK_API_URL") {
            structuring.base_url = url;
        }
        if let Some(model) = get("DEEPSEEK_MODEL") {
            structuring.model = model;
        }
        structuring.timeout = timeout;

        let mut refining = ProviderConfig::ark(get("ARK_API_KEY"));
        if let Some(url) = get("ARK_API_URL") {
            refining.base_url = url;
        }
        if let Some(model) = get("ARK_MODEL") {
            refining.model = model;
        }
        refining.timeout = timeout;

        Ok(Self {
            bind,
            db_path,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            password_iterations,
            structuring,
            refining,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_empty() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind.to_string(), "127.0.0.1:8000");
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(config.password_iterations, 310_000);
        assert!(config.structuring.api_key.is_none());
        assert_eq!(config.structuring.model, "deepseek-chat");
        assert_eq!(config.refining.base_url, ARK_DEFAULT_URL);
        assert_eq!(config.structuring.timeout, Duration::from_secs(60));
        assert!(config.db_path.ends_with("piggychef.db"));
    }

    #[test]
    fn reads_provider_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DEEPSEEK_API_KEY", "sk-test"),
            ("DEEPSEEK_MODEL", "deepseek-reasoner"),
            ("ARK_API_KEY", "ark-test"),
            ("ARK_MODEL", "ep-2024"),
            ("LLM_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.structuring.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.structuring.model, "deepseek-reasoner");
        assert_eq!(config.refining.api_key.as_deref(), Some("ark-test"));
        assert_eq!(config.refining.model, "ep-2024");
        assert_eq!(config.refining.timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = ServerConfig::from_lookup(lookup(&[("DEEPSEEK_API_KEY", "  ")])).unwrap();
        assert!(config.structuring.api_key.is_none());
    }

    #[test]
    fn rejects_bad_bind_address() {
        let err = ServerConfig::from_lookup(lookup(&[("PIGGYCHEF_BIND", "not-an-addr")]))
            .unwrap_err();
        assert!(err.to_string().contains("PIGGYCHEF_BIND"));
    }

    #[test]
    fn rejects_non_numeric_limits() {
        assert!(ServerConfig::from_lookup(lookup(&[("PIGGYCHEF_MAX_UPLOAD_MB", "lots")])).is_err());
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("PiggyChef"));
    }
}
