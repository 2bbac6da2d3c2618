//! Configuration options for the Telegram HTTP API client.

use std::time::Duration;

use crate::error::{Error, Result};

/// Well-known Bot API prefix; the access token and endpoint are appended to it.
pub const BASE_BOT_URL: &str = "https://api.telegram.org/bot";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the Telegram client.
#[derive(Clone, Debug)]
pub struct Config {
    /// Overrides [`BASE_BOT_URL`], e.g. to point at a mock server or a local Bot API server.
    pub base_bot_url: Option<String>,
    /// Timeout given to requests created through the client.
    pub timeout: Duration,
    /// Connect timeout given to requests created through the client.
    pub connect_timeout: Duration,
    /// User agent used by the default transport.
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_bot_url: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: None,
        }
    }
}

impl Config {
    pub fn with_base_bot_url<U: Into<String>>(mut self, url: U) -> Self {
        self.base_bot_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_user_agent<U: Into<String>>(mut self, user_agent: U) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Reads `TELEGRAM_BOT_API_URL`, `TELEGRAM_TIMEOUT_SECS` and
    /// `TELEGRAM_CONNECT_TIMEOUT_SECS` on top of the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup("TELEGRAM_BOT_API_URL") {
            config.base_bot_url = Some(url);
        }
        if let Some(secs) = lookup("TELEGRAM_TIMEOUT_SECS") {
            config.timeout = parse_secs("TELEGRAM_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("TELEGRAM_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout = parse_secs("TELEGRAM_CONNECT_TIMEOUT_SECS", &secs)?;
        }
        Ok(config)
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| Error::invalid_argument(format!("{} must be a whole number of seconds, got {:?}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(config.base_bot_url.is_none());
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn env_overrides_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_API_URL", "http://localhost:8081/bot"),
            ("TELEGRAM_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_bot_url.as_deref(), Some("http://localhost:8081/bot"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn env_rejects_bad_timeout() {
        let err = Config::from_lookup(lookup(&[("TELEGRAM_CONNECT_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
