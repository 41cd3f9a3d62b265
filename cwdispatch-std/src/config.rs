//! Dispatcher configuration.
//!
//! Settings can be built in code, deserialized with serde, or read from the
//! environment:
//!
//! | Variable                        | Values                     |
//! |---------------------------------|----------------------------|
//! | `CWDISPATCH_MODE`               | `concurrent`, `sequential` |
//! | `CWDISPATCH_LOG_RAW_MESSAGE`    | `true`/`false`, `1`/`0`    |
//! | `CWDISPATCH_HANDLER_TIMEOUT_MS` | whole milliseconds         |

use cwdispatch_core::ConfigError;
use serde::{Deserialize, Deserializer};
use std::{str::FromStr, time::Duration};

const MODE_VAR: &str = "CWDISPATCH_MODE";
const LOG_RAW_VAR: &str = "CWDISPATCH_LOG_RAW_MESSAGE";
const TIMEOUT_VAR: &str = "CWDISPATCH_HANDLER_TIMEOUT_MS";

/// How matched handlers are run for one envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// All handlers are polled together; outcomes keep match order.
    #[default]
    Concurrent,
    /// Handlers run one after another, in match order.
    Sequential,
}

impl FromStr for DispatchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concurrent" | "parallel" => Ok(DispatchMode::Concurrent),
            "sequential" => Ok(DispatchMode::Sequential),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

/// Dispatcher settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Handler scheduling.
    pub mode: DispatchMode,
    /// Log the raw inbound text before parsing.
    pub log_raw_message: bool,
    /// Time limit for each handler; overruns are reported as handler errors.
    #[serde(rename = "handler_timeout_ms", deserialize_with = "millis")]
    pub handler_timeout: Option<Duration>,
}

impl DispatcherConfig {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler scheduling mode.
    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable raw-message logging.
    pub fn with_log_raw_message(mut self, enabled: bool) -> Self {
        self.log_raw_message = enabled;
        self
    }

    /// Limit each handler to `timeout`.
    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = Some(timeout);
        self
    }

    /// Read settings from `CWDISPATCH_*` environment variables, falling back
    /// to defaults for unset ones.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`DispatcherConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(mode) = lookup(MODE_VAR) {
            config.mode = mode.parse()?;
        }
        if let Some(flag) = lookup(LOG_RAW_VAR) {
            config.log_raw_message =
                parse_bool(&flag).ok_or_else(|| ConfigError::InvalidFlag {
                    key: LOG_RAW_VAR,
                    value: flag.clone(),
                })?;
        }
        if let Some(ms) = lookup(TIMEOUT_VAR) {
            let parsed = ms
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidDuration {
                    key: TIMEOUT_VAR,
                    value: ms.clone(),
                })?;
            config.handler_timeout = Some(Duration::from_millis(parsed));
        }

        Ok(config)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}
