use notes_core::note::{DEFAULT_DESCRIPTION_LIMIT, DEFAULT_TITLE_LIMIT};
use notes_core::FieldLimits;
use std::time::Duration;
use url::Url;

const API_URL_VAR: &str = "NOTES_API_URL";
const TITLE_LIMIT_VAR: &str = "NOTES_TITLE_LIMIT";
const DESCRIPTION_LIMIT_VAR: &str = "NOTES_DESCRIPTION_LIMIT";
const REQUEST_TIMEOUT_VAR: &str = "NOTES_REQUEST_TIMEOUT_SECS";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the note service; endpoints live under `{api_url}/notes`
    pub api_url: Url,
    /// Character limits for title and description
    pub limits: FieldLimits,
    /// Timeout applied to every request
    pub request_timeout: Duration,
}

impl Config {
    /// Configuration with default limits for the given base URL.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            limits: FieldLimits::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `NOTES_API_URL`: base URL of the note service
    ///
    /// Optional:
    /// - `NOTES_TITLE_LIMIT` (default 20)
    /// - `NOTES_DESCRIPTION_LIMIT` (default 200)
    /// - `NOTES_REQUEST_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup(API_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingApiUrl)?;

        let mut config = Self::new(api_url.trim())?;
        config.limits = FieldLimits {
            title: positive(&lookup, TITLE_LIMIT_VAR, DEFAULT_TITLE_LIMIT as u64)? as usize,
            description: positive(&lookup, DESCRIPTION_LIMIT_VAR, DEFAULT_DESCRIPTION_LIMIT as u64)?
                as usize,
        };
        config.request_timeout = Duration::from_secs(positive(
            &lookup,
            REQUEST_TIMEOUT_VAR,
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        Ok(config)
    }
}

fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidApiUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidApiUrl {
            value: value.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }
    Ok(url)
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(default);
    };
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { var, value }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("NOTES_API_URL environment variable not set")]
    MissingApiUrl,

    #[error("Invalid API URL '{value}': {reason}")]
    InvalidApiUrl { value: String, reason: String },

    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}
