//! Worker configuration loading from file and environment variables.

use antiphon_agent::{LiveKitConfig, RealtimeConfig, WeatherConfig};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level worker configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Dispatch API network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LiveKit control-plane credentials.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    /// Realtime model provider settings. The API key is taken from the
    /// `OPENAI_API_KEY` environment variable, never from this file.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Weather tool settings.
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the dispatch API.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "antiphon_worker=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `ANTIPHON_HOST` overrides `server.host`
/// - `ANTIPHON_PORT` overrides `server.port`
/// - `LIVEKIT_URL` overrides `livekit.url`
/// - `LIVEKIT_API_KEY` overrides `livekit.api_key`
/// - `LIVEKIT_API_SECRET` overrides `livekit.api_secret`
/// - `ANTIPHON_WEATHER_URL` overrides `weather.base_url`
/// - `ANTIPHON_LOG_LEVEL` overrides `logging.level`
/// - `ANTIPHON_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("ANTIPHON_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("ANTIPHON_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(url) = std::env::var("LIVEKIT_URL") {
        config.livekit.url = url;
    }
    if let Ok(api_key) = std::env::var("LIVEKIT_API_KEY") {
        config.livekit.api_key = api_key;
    }
    if let Ok(api_secret) = std::env::var("LIVEKIT_API_SECRET") {
        config.livekit.api_secret = api_secret;
    }
    if let Ok(base_url) = std::env::var("ANTIPHON_WEATHER_URL") {
        config.weather.base_url = base_url;
    }
    if let Ok(level) = std::env::var("ANTIPHON_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("ANTIPHON_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}
