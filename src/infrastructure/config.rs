use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

const PLACEHOLDER_URL: &str = "YOUR_NGROK_HTTPS_FORWARDING_URL_HERE";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub polling: PollingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    #[serde(default = "default_true")]
    pub skip_browser_warning: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl UpstreamSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_interval_secs() -> u64 {
    30
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("upstream.base_url must be a valid https tunnel URL, got {0:?}")]
    InvalidBaseUrl(String),

    #[error("polling.interval_secs must be greater than zero")]
    ZeroInterval,

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

impl AppConfig {
    /// Check the values the service cannot run without and normalize the base URL
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let base_url = self.upstream.base_url.trim().trim_end_matches('/').to_string();
        if base_url.contains(PLACEHOLDER_URL) || base_url.len() < 20 || !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl(self.upstream.base_url));
        }
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        self.upstream.base_url = base_url;
        Ok(self)
    }
}

/// Load `config/laundry.*` (optional) overlaid with `LAUNDRY__*` environment variables
pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/laundry").required(false))
        .add_source(config::Environment::with_prefix("LAUNDRY").separator("__"))
        .build()
        .map_err(ConfigError::from)?;

    let app_config: AppConfig = settings.try_deserialize().map_err(ConfigError::from)?;
    Ok(app_config.validate()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn parse(toml: &str) -> Result<AppConfig, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        let app_config: AppConfig = settings.try_deserialize()?;
        app_config.validate()
    }

    #[test]
    fn test_defaults() {
        let cfg = parse(
            r#"
            [upstream]
            base_url = "https://7eaa-172-56-118-125.ngrok-free.app/"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.upstream.base_url, "https://7eaa-172-56-118-125.ngrok-free.app");
        assert!(cfg.upstream.skip_browser_warning);
        assert_eq!(cfg.upstream.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.server.bind.port(), 8080);
        assert_eq!(cfg.polling.interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let cfg = parse(
            r#"
            [upstream]
            base_url = "https://laundry-pi.example.org"
            skip_browser_warning = false

            [server]
            bind = "127.0.0.1:9000"

            [polling]
            interval_secs = 5
            "#,
        )
        .unwrap();

        assert!(!cfg.upstream.skip_browser_warning);
        assert_eq!(cfg.server.bind.port(), 9000);
        assert_eq!(cfg.polling.interval_secs, 5);
    }

    #[test]
    fn test_rejects_bad_base_urls() {
        for url in [
            "http://laundry-pi.example.org",
            "https://short.io",
            "https://YOUR_NGROK_HTTPS_FORWARDING_URL_HERE",
        ] {
            let toml = format!("[upstream]\nbase_url = \"{}\"\n", url);
            assert!(matches!(parse(&toml), Err(ConfigError::InvalidBaseUrl(_))), "{url}");
        }
    }

    #[test]
    fn test_rejects_zero_interval() {
        let toml = "[upstream]\nbase_url = \"https://laundry-pi.example.org\"\n[polling]\ninterval_secs = 0\n";
        assert!(matches!(parse(toml), Err(ConfigError::ZeroInterval)));
    }

    #[test]
    fn test_missing_base_url_is_an_error() {
        assert!(matches!(parse("[server]\nbind = \"127.0.0.1:9000\"\n"), Err(ConfigError::Source(_))));
    }
}
