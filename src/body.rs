use reqwest::header::{HeaderMap, CONTENT_TYPE};

use crate::{ApiError, Result};

/// Decoded response body.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    /// Body of a response declaring a JSON content type.
    Json(serde_json::Value),
    /// Body of any other response, read as text.
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(value) => Some(value.as_str()),
        }
    }

    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

impl From<serde_json::Value> for ResponseBody {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ResponseBody {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Whether the headers declare a JSON body.
///
/// Matches any `Content-Type` containing `application/json`, so parameters
/// such as `; charset=utf-8` are accepted.
pub(crate) fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("application/json"))
}

pub(crate) fn decode_body(headers: &HeaderMap, text: String) -> Result<ResponseBody> {
    if !is_json(headers) {
        return Ok(ResponseBody::Text(text));
    }

    serde_json::from_str(&text)
        .map(ResponseBody::Json)
        .map_err(|err| ApiError::Decode(format!("invalid JSON response: {err}; body: {text}")))
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
    use serde_json::json;

    use super::{decode_body, is_json, ResponseBody};
    use crate::ApiError;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        map
    }

    #[test]
    fn json_content_type_decodes_structured() {
        let body = decode_body(
            &headers("application/json; charset=utf-8"),
            r#"{"status":"ok"}"#.to_owned(),
        )
        .expect("json must decode");
        assert_eq!(body, ResponseBody::Json(json!({"status": "ok"})));
    }

    #[test]
    fn other_content_types_decode_as_text() {
        let body = decode_body(&headers("text/plain"), r#"{"status":"ok"}"#.to_owned())
            .expect("text must decode");
        assert_eq!(body.as_text(), Some(r#"{"status":"ok"}"#));

        let body = decode_body(&HeaderMap::new(), "pong".to_owned()).expect("text must decode");
        assert_eq!(body, ResponseBody::Text("pong".to_owned()));
    }

    #[test]
    fn content_type_match_ignores_case() {
        assert!(is_json(&headers("Application/JSON")));
        assert!(!is_json(&headers("text/html")));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = decode_body(&headers("application/json"), "not json".to_owned())
            .expect_err("must fail");
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
