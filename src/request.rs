use std::fmt;

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};

use crate::{ResponseBody, RetryPolicy, ValidationError, Validator};

/// Per-call request settings: method, headers, body, retry policy and validator.
///
/// `T` is the value a successful call yields. A config from
/// [`RequestConfig::new`] yields the decoded [`ResponseBody`];
/// [`RequestConfig::validate_with`] narrows it.
pub struct RequestConfig<T = ResponseBody> {
    pub method: Method,
    pub headers: HeaderMap,
    /// Raw body, re-sent on every attempt.
    pub body: Option<Vec<u8>>,
    pub retry: RetryPolicy,
    validator: Validator<T>,
}

impl RequestConfig<ResponseBody> {
    /// Creates a config with no headers, no body and the default retry policy.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
            retry: RetryPolicy::default(),
            validator: Validator::identity(),
        }
    }
}

impl Default for RequestConfig<ResponseBody> {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl<T> RequestConfig<T> {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Adds a header, replacing any existing value for the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retries(mut self, retries: usize) -> Self {
        self.retry.retries = retries;
        self
    }

    pub fn retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Replaces the validator, changing the result type.
    pub fn validate_with<U>(self, validator: Validator<U>) -> RequestConfig<U> {
        RequestConfig {
            method: self.method,
            headers: self.headers,
            body: self.body,
            retry: self.retry,
            validator,
        }
    }

    pub(crate) fn validate(&self, body: ResponseBody) -> Result<T, ValidationError> {
        self.validator.validate(body)
    }
}

impl<T> Clone for RequestConfig<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            retry: self.retry,
            validator: self.validator.clone(),
        }
    }
}

impl<T> fmt::Debug for RequestConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{
        header::{HeaderValue, ACCEPT},
        Method,
    };
    use serde_json::json;

    use super::RequestConfig;
    use crate::{ResponseBody, RetryPolicy, StatusPayload, Validator};

    #[test]
    fn new_uses_default_retry_policy_and_identity() {
        let config = RequestConfig::new(Method::GET);
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.body.is_none());
        let body = ResponseBody::Text("pong".to_owned());
        assert_eq!(config.validate(body.clone()), Ok(body));
    }

    #[test]
    fn builder_sets_fields() {
        let config = RequestConfig::default()
            .method(Method::PUT)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .body("payload")
            .retries(1)
            .retry_delay_ms(5);

        assert_eq!(config.method, Method::PUT);
        assert_eq!(config.headers[ACCEPT], "application/json");
        assert_eq!(config.body.as_deref(), Some(b"payload".as_slice()));
        assert_eq!(
            config.retry,
            RetryPolicy {
                retries: 1,
                retry_delay_ms: 5
            }
        );
    }

    #[test]
    fn validate_with_keeps_request_fields() {
        let config = RequestConfig::new(Method::POST)
            .retries(0)
            .validate_with(Validator::<StatusPayload>::json());
        assert_eq!(config.method, Method::POST);
        assert_eq!(config.retry.retries, 0);

        let payload = config
            .validate(ResponseBody::Json(json!({"status": "ok"})))
            .expect("must validate");
        assert_eq!(payload.status, "ok");
    }
}
