//! Response validators.
//!
//! A [`Validator`] narrows a decoded [`ResponseBody`] into the caller's
//! result type, or rejects it with a [`ValidationError`].

use std::{fmt, sync::Arc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::ResponseBody;

/// Rejection raised by a [`Validator`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

type ValidateFn<T> = dyn Fn(ResponseBody) -> Result<T, ValidationError> + Send + Sync;

/// Shared function turning a decoded body into `T`.
pub struct Validator<T> {
    inner: Arc<ValidateFn<T>>,
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator")
    }
}

impl<T> Validator<T> {
    /// Wraps a validation function.
    pub fn new<F>(validate: F) -> Self
    where
        F: Fn(ResponseBody) -> Result<T, ValidationError> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(validate),
        }
    }

    pub fn validate(&self, body: ResponseBody) -> Result<T, ValidationError> {
        (self.inner)(body)
    }
}

impl Validator<ResponseBody> {
    /// Passes the decoded body through untouched.
    pub fn identity() -> Self {
        Self::new(Ok)
    }
}

impl<T: DeserializeOwned> Validator<T> {
    /// Requires a JSON body that deserializes into `T`.
    ///
    /// Text bodies are rejected.
    pub fn json() -> Self {
        Self::new(|body| match body {
            ResponseBody::Json(value) => {
                serde_json::from_value(value).map_err(|err| ValidationError::new(err.to_string()))
            }
            ResponseBody::Text(_) => Err(ValidationError::new("expected a JSON response body")),
        })
    }
}

/// Common `{ "status": ..., "data": ... }` service payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{StatusPayload, ValidationError, Validator};
    use crate::ResponseBody;

    #[test]
    fn identity_returns_body_unchanged() {
        let body = ResponseBody::Text("pong".to_owned());
        assert_eq!(Validator::identity().validate(body.clone()), Ok(body));
    }

    #[test]
    fn json_validator_narrows_status_payload() {
        let validator = Validator::<StatusPayload>::json();
        let payload = validator
            .validate(ResponseBody::Json(json!({"status": "ok", "data": [1, 2]})))
            .expect("payload must validate");
        assert_eq!(payload.status, "ok");
        assert_eq!(payload.data, Some(json!([1, 2])));

        let payload = validator
            .validate(ResponseBody::Json(json!({"status": "ok"})))
            .expect("data is optional");
        assert_eq!(payload.data, None);
    }

    #[test]
    fn json_validator_rejects_wrong_shape_and_text() {
        let validator = Validator::<StatusPayload>::json();
        let err = validator
            .validate(ResponseBody::Json(json!({"status": 7})))
            .expect_err("status must be a string");
        assert!(err.message().contains("invalid type"));

        let err = validator
            .validate(ResponseBody::Text("ok".to_owned()))
            .expect_err("text must be rejected");
        assert_eq!(err, ValidationError::new("expected a JSON response body"));
    }

    #[test]
    fn custom_validator_maps_text() {
        let validator = Validator::new(|body: ResponseBody| {
            body.as_text()
                .map(str::len)
                .ok_or_else(|| ValidationError::new("expected text"))
        });
        assert_eq!(validator.validate(ResponseBody::from("pong")), Ok(4));
    }
}
