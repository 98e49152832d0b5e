use std::time::Duration;

use reqwest::Url;

/// Fixed-count retry with linear backoff.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Number of retries after the initial attempt.
    pub retries: usize,
    /// Base delay in milliseconds; the wait before attempt `k + 1` is `k * retry_delay_ms`.
    pub retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_ms: 300,
        }
    }
}

impl RetryPolicy {
    /// Policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            retries: 0,
            ..Self::default()
        }
    }

    /// Delay to wait before running `attempt` (zero-based).
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let factor = u64::try_from(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.retry_delay_ms.saturating_mul(factor))
    }

    /// Total attempts this policy allows.
    pub fn max_attempts(&self) -> usize {
        self.retries.saturating_add(1)
    }
}

/// Configures the client's transport timeouts, default retry policy and base URL.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds. `None` leaves it to the transport.
    pub timeout_ms: Option<u64>,
    /// Deadline for the whole retry sequence in milliseconds. `None` is unbounded.
    pub deadline_ms: Option<u64>,
    /// Retry policy used by requests built from [`crate::ApiClient::request`].
    pub retry: RetryPolicy,
    /// Base that relative request URLs are joined onto.
    pub base_url: Option<Url>,
}

impl ClientOptions {
    /// Reads options from environment variables.
    ///
    /// Reads:
    /// - `API_URL`: base URL for relative requests
    /// - `API_RETRIES`: retry count
    /// - `API_RETRY_DELAY_MS`: linear backoff base delay
    /// - `API_TIMEOUT_MS`: per-attempt timeout
    /// - `API_DEADLINE_MS`: deadline for the whole retry sequence
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientOptions::from_env`] but with a caller-supplied lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let mut options = Self::default();

        if let Some(raw) = read("API_URL") {
            let url =
                Url::parse(&raw).map_err(|err| format!("API_URL is not a valid URL: {err}"))?;
            options.base_url = Some(url);
        }
        if let Some(raw) = read("API_RETRIES") {
            options.retry.retries = parse_number("API_RETRIES", &raw)?;
        }
        if let Some(raw) = read("API_RETRY_DELAY_MS") {
            options.retry.retry_delay_ms = parse_number("API_RETRY_DELAY_MS", &raw)?;
        }
        if let Some(raw) = read("API_TIMEOUT_MS") {
            options.timeout_ms = Some(parse_number("API_TIMEOUT_MS", &raw)?);
        }
        if let Some(raw) = read("API_DEADLINE_MS") {
            options.deadline_ms = Some(parse_number("API_DEADLINE_MS", &raw)?);
        }

        Ok(options)
    }
}

fn parse_number<N: std::str::FromStr>(key: &str, raw: &str) -> Result<N, String> {
    raw.parse()
        .map_err(|_| format!("{key} must be a non-negative integer, got '{raw}'"))
}
