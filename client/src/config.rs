//! Client configuration parsed from environment variables.
//!
//! Endpoints and HTTP timeouts come from `SPECTO_*` variables; chat tunables
//! default to the forum's interaction constants and are only overridden in
//! code (tests shorten them).

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_TYPING_TTL: Duration = Duration::from_secs(3);
pub const DEFAULT_TYPING_THROTTLE: Duration = Duration::from_secs(2);
pub const DEFAULT_SCROLL_THRESHOLD_PX: f64 = 100.0;
pub const DEFAULT_INPUT_MAX_CHARS: usize = 500;

/// Errors produced while building configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A base URL did not use one of the supported schemes.
    #[error("invalid base URL `{0}`: expected http(s):// or ws(s)://")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl HttpTimeouts {
    /// Read `SPECTO_REQUEST_TIMEOUT_SECS` / `SPECTO_CONNECT_TIMEOUT_SECS`,
    /// falling back to defaults for absent or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            request_secs: env_parse_u64("SPECTO_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("SPECTO_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Interaction constants of the chat view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatTuning {
    /// How long a typing roster entry lives after it was last observed.
    pub typing_ttl: Duration,
    /// Minimum spacing between outbound typing pings.
    pub typing_throttle: Duration,
    /// Distance from the newest message that still counts as "at the bottom".
    pub scroll_threshold_px: f64,
    /// Maximum length of the composer input, in characters.
    pub input_max_chars: usize,
}

impl Default for ChatTuning {
    fn default() -> Self {
        Self {
            typing_ttl: DEFAULT_TYPING_TTL,
            typing_throttle: DEFAULT_TYPING_THROTTLE,
            scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
            input_max_chars: DEFAULT_INPUT_MAX_CHARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// REST base URL, without trailing slash.
    pub api_base_url: String,
    /// Websocket base URL, without trailing slash.
    pub ws_base_url: String,
    pub timeouts: HttpTimeouts,
    pub tuning: ChatTuning,
}

impl ClientConfig {
    /// Build a config for the given REST base URL, deriving the websocket
    /// base by swapping the scheme.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL is not http(s).
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_owned();
        let ws_base_url = ws_base_from_http(&api_base_url)?;
        Ok(Self {
            api_base_url,
            ws_base_url,
            timeouts: HttpTimeouts::default(),
            tuning: ChatTuning::default(),
        })
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `SPECTO_API_BASE_URL`: default `http://127.0.0.1:8000`
    /// - `SPECTO_WS_BASE_URL`: derived from the API base when absent
    /// - `SPECTO_REQUEST_TIMEOUT_SECS`: default 15
    /// - `SPECTO_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] for unsupported URL schemes.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base = env_non_empty("SPECTO_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let mut config = Self::new(&api_base)?;
        if let Some(ws_base) = env_non_empty("SPECTO_WS_BASE_URL") {
            config = config.with_ws_base_url(&ws_base)?;
        }
        config.timeouts = HttpTimeouts::from_env();
        Ok(config)
    }

    /// Replace the REST base URL and re-derive the websocket base from it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL is not http(s).
    pub fn with_api_base_url(mut self, api_base_url: &str) -> Result<Self, ConfigError> {
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_owned();
        self.ws_base_url = ws_base_from_http(&api_base_url)?;
        self.api_base_url = api_base_url;
        Ok(self)
    }

    /// Override the websocket base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless the URL is ws(s) or http(s).
    pub fn with_ws_base_url(mut self, ws_base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = ws_base_url.trim().trim_end_matches('/');
        self.ws_base_url = if trimmed.starts_with("ws://") || trimmed.starts_with("wss://") {
            trimmed.to_owned()
        } else {
            ws_base_from_http(trimmed)?
        };
        Ok(self)
    }

    #[must_use]
    pub fn with_tuning(mut self, tuning: ChatTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Absolute REST URL for `path`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.api_base_url)
        } else {
            format!("{}/{path}", self.api_base_url)
        }
    }
}

fn ws_base_from_http(base_url: &str) -> Result<String, ConfigError> {
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}"));
    }
    Err(ConfigError::InvalidBaseUrl(base_url.to_owned()))
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
