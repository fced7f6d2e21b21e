use thiserror::Error;
use tracing::info;

pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be true or false, got {value:?}")]
    InvalidBool { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Reject ballots for labels the poll never declared.
    pub strict_vote_options: bool,
    /// Origin prefix allowed by the CORS fairing.
    pub allowed_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            strict_vote_options: false,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

impl AppConfig {
    /// Builds the config from a key lookup, such as the deployment secret store.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("STRICT_VOTE_OPTIONS") {
            config.strict_vote_options = parse_bool("STRICT_VOTE_OPTIONS", &value)?;
        }

        if let Some(origin) = lookup("CORS_ALLOWED_ORIGIN").filter(|o| !o.trim().is_empty()) {
            config.allowed_origin = origin.trim().to_string();
        }

        info!(
            strict_vote_options = config.strict_vote_options,
            allowed_origin = %config.allowed_origin,
            "Loaded configuration"
        );
        Ok(config)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool { key, value: value.to_string() }),
    }
}
