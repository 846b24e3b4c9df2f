use std::time::Duration;

use custom_resource_core::contract::ValidationError;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_RESPONSE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub log_level: String,
    pub response_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            response_timeout: Duration::from_secs(DEFAULT_RESPONSE_TIMEOUT_SECS),
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source. Unset or blank
    /// variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ValidationError> {
        let mut config = Self::default();

        if let Some(level) = non_blank(lookup("LOG_LEVEL")) {
            config.log_level = level.to_ascii_lowercase();
        }

        if let Some(raw) = non_blank(lookup("RESPONSE_TIMEOUT_SECS")) {
            let seconds = raw.parse::<u64>().map_err(|_| {
                ValidationError::new(format!(
                    "RESPONSE_TIMEOUT_SECS must be a positive integer, got '{raw}'"
                ))
            })?;
            if seconds == 0 {
                return Err(ValidationError::new(
                    "RESPONSE_TIMEOUT_SECS must be a positive integer",
                ));
            }
            config.response_timeout = Duration::from_secs(seconds);
        }

        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
