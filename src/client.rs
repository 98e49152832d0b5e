use std::fmt;
use std::time::Duration;

use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Method, Url,
};
use serde::Serialize;
use tokio::time::{sleep, timeout};

use crate::{
    body::decode_body, ApiError, ClientOptions, RequestConfig, ResponseBody, Result, StatusPayload,
    Validator,
};

#[derive(Clone, Default)]
/// HTTP request executor with linear-backoff retries and response validation.
pub struct ApiClient {
    http: reqwest::Client,
    options: ClientOptions,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client on top of an existing `reqwest::Client`.
    ///
    /// Useful to share a connection pool or to preconfigure proxies and TLS.
    pub fn with_http(http: reqwest::Client) -> Self {
        Self {
            http,
            options: ClientOptions::default(),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// See [`ClientOptions::from_env`] for the variables read. Returns an
    /// error naming the offending variable if one is malformed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use api_fetch::ApiClient;
    ///
    /// let client = ApiClient::from_env().expect("invalid API_* env vars");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        Ok(Self::new().with_options(ClientOptions::from_env()?))
    }

    /// Applies client options such as timeouts, deadline and retry defaults.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Starts a GET request config seeded with this client's retry policy.
    pub fn request(&self) -> RequestConfig {
        RequestConfig::new(Method::GET).retry(self.options.retry)
    }

    /// Sends `config` to `url`, retrying failed attempts with linear backoff.
    ///
    /// Relative URLs are joined onto the configured base URL. Transport
    /// failures, non-2xx statuses, undecodable JSON and validator rejections
    /// are all retried the same way; once attempts run out the last failure
    /// is returned.
    pub async fn execute<T>(&self, url: &str, config: RequestConfig<T>) -> Result<T> {
        let url = self.resolve_url(url)?;

        match self.options.deadline_ms {
            Some(deadline_ms) => {
                timeout(
                    Duration::from_millis(deadline_ms),
                    self.send_with_retry(&url, &config),
                )
                .await
                .map_err(|_| ApiError::DeadlineExceeded { deadline_ms })?
            }
            None => self.send_with_retry(&url, &config).await,
        }
    }

    /// Sends a GET request. Any body in `config` is dropped.
    pub async fn get<T>(&self, url: &str, mut config: RequestConfig<T>) -> Result<T> {
        config.body = None;
        self.execute(url, config.method(Method::GET)).await
    }

    /// Sends `body` as JSON in a POST request.
    ///
    /// `Content-Type: application/json` is set unless `config` already
    /// carries a content type.
    pub async fn post<T, B>(&self, url: &str, body: &B, config: RequestConfig<T>) -> Result<T>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body)
            .map_err(|err| ApiError::Encode(format!("request body is not serializable: {err}")))?;

        let mut config = config.method(Method::POST).body(payload);
        config
            .headers
            .entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static("application/json"));

        self.execute(url, config).await
    }

    /// Fetches a `{ "status": ..., "data": ... }` payload with this client's retry policy.
    pub async fn get_status(&self, url: &str) -> Result<StatusPayload> {
        let config = self.request().validate_with(Validator::json());
        self.get(url, config).await
    }

    /// Fetches `url` with this client's retry policy and returns the decoded body.
    pub async fn get_body(&self, url: &str) -> Result<ResponseBody> {
        self.get(url, self.request()).await
    }

    fn resolve_url(&self, url: &str) -> Result<Url> {
        let resolved = match &self.options.base_url {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        resolved.map_err(|err| ApiError::InvalidUrl(format!("'{url}': {err}")))
    }

    async fn send_with_retry<T>(&self, url: &Url, config: &RequestConfig<T>) -> Result<T> {
        let retry = config.retry;
        let mut last_error = None;

        for attempt in 0..=retry.retries {
            if attempt > 0 {
                sleep(retry.backoff_delay(attempt)).await;
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(method = %config.method, %url, attempt, "sending request");

            match self.send_once(url, config).await {
                Ok(value) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(%url, attempt, "request succeeded");
                    return Ok(value);
                }
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    {
                        if attempt < retry.retries {
                            tracing::warn!(
                                %url,
                                attempt,
                                delay_ms = retry.backoff_delay(attempt + 1).as_millis() as u64,
                                error = %err,
                                "request attempt failed, retrying"
                            );
                        } else {
                            tracing::warn!(%url, attempts = attempt + 1, error = %err, "request failed");
                        }
                    }

                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or(ApiError::Unknown))
    }

    async fn send_once<T>(&self, url: &Url, config: &RequestConfig<T>) -> Result<T> {
        let mut request = self
            .http
            .request(config.method.clone(), url.clone())
            .headers(config.headers.clone());
        if let Some(body) = &config.body {
            request = request.body(body.clone());
        }
        if let Some(timeout_ms) = self.options.timeout_ms {
            request = request.timeout(Duration::from_millis(timeout_ms));
        }

        let response = request.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await.map_err(ApiError::Transport)?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = decode_body(&headers, text)?;
        config.validate(body).map_err(ApiError::from)
    }
}
