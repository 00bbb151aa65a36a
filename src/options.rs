use crate::{Result, RetryingHttpError};

const ENV_TIMEOUT_MS: &str = "RETRYING_HTTP_TIMEOUT_MS";
const ENV_MAX_RETRIES: &str = "RETRYING_HTTP_MAX_RETRIES";
const ENV_RETRY_TRANSPORT_ERRORS: &str = "RETRYING_HTTP_RETRY_TRANSPORT_ERRORS";

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds, enforced by the transport.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Whether transient transport failures (timeouts, refused connections)
    /// consume the retry budget instead of failing immediately.
    pub retry_transport_errors: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 0,
            retry_transport_errors: false,
        }
    }
}

impl ClientOptions {
    /// Reads options from the environment.
    ///
    /// - `RETRYING_HTTP_TIMEOUT_MS`
    /// - `RETRYING_HTTP_MAX_RETRIES`
    /// - `RETRYING_HTTP_RETRY_TRANSPORT_ERRORS` (`true`/`false`/`1`/`0`)
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientOptions::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(value) = read(ENV_TIMEOUT_MS) {
            opts.timeout_ms = parse_number(ENV_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = read(ENV_MAX_RETRIES) {
            opts.max_retries = parse_number(ENV_MAX_RETRIES, &value)?;
        }
        if let Some(value) = read(ENV_RETRY_TRANSPORT_ERRORS) {
            opts.retry_transport_errors = parse_bool(ENV_RETRY_TRANSPORT_ERRORS, &value)?;
        }
        Ok(opts)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        RetryingHttpError::Config(format!(
            "{name} must be a non-negative integer, got '{value}'"
        ))
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(RetryingHttpError::Config(format!(
            "{name} must be a boolean, got '{value}'"
        ))),
    }
}
