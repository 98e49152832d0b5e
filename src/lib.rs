//! `api-fetch` is an async HTTP request executor with fixed-count retries.
//!
//! Every call goes through [`ApiClient::execute`]:
//! - failed attempts are retried with linear backoff (`retry_delay_ms * attempt`)
//! - JSON responses are decoded into [`serde_json::Value`], others into text
//! - an optional [`Validator`] narrows the decoded body into a typed result
//!
//! [`ApiClient::get`] and [`ApiClient::post`] are thin wrappers with the same
//! retry semantics.

mod body;
mod client;
mod error;
mod options;
mod request;
mod validate;

pub use body::ResponseBody;
pub use client::ApiClient;
pub use error::ApiError;
pub use options::{ClientOptions, RetryPolicy};
pub use request::RequestConfig;
pub use reqwest::{header, Method, Url};
pub use validate::{StatusPayload, ValidationError, Validator};

pub type Result<T> = std::result::Result<T, ApiError>;
