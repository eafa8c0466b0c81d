use std::collections::HashMap;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// The inbound event as delivered by the hosting layer: the raw
/// form-encoded body of the platform's HTTP request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    pub body: String,
}

impl ApiRequest {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

/// The HTTP-shaped response handed back to the hosting layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status_code: u16,
    pub is_base64_encoded: bool,
    pub body: String,
    pub headers: HashMap<String, String>,
}

impl ApiResponse {
    fn with_status(status_code: u16, body: impl Into<String>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_owned(), "application/json".to_owned());
        Self { status_code, is_base64_encoded: false, body: body.into(), headers }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    pub fn bad_request(body: impl Into<String>) -> Self {
        Self::with_status(400, body)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("form decode failed: {0}")]
    Form(String),
    #[error("payload decode failed: {0}")]
    Payload(String),
}

/// Decodes an `application/x-www-form-urlencoded` body into a serde
/// struct. Missing required fields fail the decode; the handlers fail
/// closed on that.
pub fn decode_form<T: DeserializeOwned>(body: &str) -> Result<T, DecodeError> {
    serde_urlencoded::from_str(body).map_err(|error| DecodeError::Form(error.to_string()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::{decode_form, ApiResponse, DecodeError};

    #[derive(Debug, Deserialize, PartialEq, Eq)]
    struct Sample {
        token: String,
        text: String,
    }

    #[test]
    fn responses_always_carry_the_json_content_type() {
        let response = ApiResponse::ok("");
        assert_eq!(response.status_code, 200);
        assert!(!response.is_base64_encoded);
        assert_eq!(
            response.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );

        let response = ApiResponse::bad_request("nope");
        assert_eq!(response.status_code, 400);
        assert_eq!(response.body, "nope");
    }

    #[test]
    fn decode_form_handles_percent_encoding() {
        let decoded: Sample =
            decode_form("token=abc&text=Alice%20W%26B").expect("decode");
        assert_eq!(decoded, Sample { token: "abc".to_owned(), text: "Alice W&B".to_owned() });
    }

    #[test]
    fn decode_form_fails_closed_on_missing_fields() {
        let error = decode_form::<Sample>("token=abc").expect_err("missing text must fail");
        assert!(matches!(error, DecodeError::Form(_)));
    }
}
