//! Application-level configuration loading, including draw animation cadence and share links.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SEAT_LOTTERY_BACK_CONFIG_PATH";
/// Environment variable that overrides the configured public base URL.
const PUBLIC_BASE_URL_ENV: &str = "PUBLIC_BASE_URL";

const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_MAX_SEATS: u16 = 100;
const DEFAULT_SESSION_ID_LENGTH: usize = 6;
const DEFAULT_DRAW_TICK_COUNT: u32 = 20;
const DEFAULT_DRAW_TICK_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Base URL participants use to reach the frontend, used to build share links.
    pub public_base_url: String,
    /// Upper bound for a session's seat count.
    pub max_seats: u16,
    /// Number of characters in generated session identifiers.
    pub session_id_length: usize,
    /// Number of cosmetic countdown ticks broadcast during a draw.
    pub draw_tick_count: u32,
    /// Delay between two countdown ticks.
    pub draw_tick_interval: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration from file");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_env_overrides()
    }

    /// Build the shareable join URL for a session.
    pub fn share_url(&self, session_id: &str) -> String {
        format!("{}/?s={session_id}", self.public_base_url.trim_end_matches('/'))
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = env::var(PUBLIC_BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                self.public_base_url = base_url;
            }
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_owned(),
            max_seats: DEFAULT_MAX_SEATS,
            session_id_length: DEFAULT_SESSION_ID_LENGTH,
            draw_tick_count: DEFAULT_DRAW_TICK_COUNT,
            draw_tick_interval: Duration::from_millis(DEFAULT_DRAW_TICK_INTERVAL_MS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    public_base_url: Option<String>,
    max_seats: Option<u16>,
    session_id_length: Option<usize>,
    draw_tick_count: Option<u32>,
    draw_tick_interval_ms: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            public_base_url: raw.public_base_url.unwrap_or(defaults.public_base_url),
            max_seats: raw.max_seats.unwrap_or(defaults.max_seats),
            session_id_length: raw.session_id_length.unwrap_or(defaults.session_id_length),
            draw_tick_count: raw.draw_tick_count.unwrap_or(defaults.draw_tick_count),
            draw_tick_interval: raw
                .draw_tick_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.draw_tick_interval),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_url_joins_base_and_session_id() {
        let config = AppConfig {
            public_base_url: "https://lottery.example.com/".into(),
            ..AppConfig::default()
        };
        assert_eq!(
            config.share_url("AB12CD"),
            "https://lottery.example.com/?s=AB12CD"
        );
    }

    #[test]
    fn raw_config_fills_missing_fields_with_defaults() {
        let raw: RawConfig = serde_json::from_str(r#"{"max_seats": 40}"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.max_seats, 40);
        assert_eq!(config.session_id_length, DEFAULT_SESSION_ID_LENGTH);
        assert_eq!(config.draw_tick_count, DEFAULT_DRAW_TICK_COUNT);
    }
}
