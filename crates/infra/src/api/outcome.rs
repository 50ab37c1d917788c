//! Uniform decoding of remote responses
//!
//! Every gateway call produces exactly one [`RemoteCallOutcome`]. Status codes
//! of 400 and above become [`RemoteCallOutcome::Failure`] carrying a
//! [`DecodedErrorBody`]; the expected body shape is chosen from the status
//! through [`ErrorShape`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ApiError;

/// Error response shapes, keyed by status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorShape {
    BadRequest,
    Forbidden,
    NotFound,
    RequestEntityTooLarge,
    UnsupportedMediaType,
    TooManyRequests,
    InternalServerError,
    ServiceUnavailable,
    /// Any other status; the body is decoded opportunistically.
    Other(u16),
}

impl ErrorShape {
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            413 => Self::RequestEntityTooLarge,
            415 => Self::UnsupportedMediaType,
            429 => Self::TooManyRequests,
            500 => Self::InternalServerError,
            503 => Self::ServiceUnavailable,
            other => Self::Other(other),
        }
    }

    pub const fn status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::RequestEntityTooLarge => 413,
            Self::UnsupportedMediaType => 415,
            Self::TooManyRequests => 429,
            Self::InternalServerError => 500,
            Self::ServiceUnavailable => 503,
            Self::Other(status) => status,
        }
    }

    /// Documented statuses carry an `{"errors": [...]}` list.
    const fn expects_error_list(self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// One entry of the remote error list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteErrorEntry {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorList {
    errors: Vec<RemoteErrorEntry>,
}

/// Body of a failed call after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorPayload {
    Errors(Vec<RemoteErrorEntry>),
    Json(Value),
    Text(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedErrorBody {
    pub shape: ErrorShape,
    pub payload: ErrorPayload,
    raw: String,
}

impl DecodedErrorBody {
    pub fn decode(status: u16, raw: &str) -> Self {
        let shape = ErrorShape::from_status(status);
        let trimmed = raw.trim();

        let payload = if trimmed.is_empty() {
            ErrorPayload::Empty
        } else if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            let list = if shape.expects_error_list() {
                serde_json::from_value::<ErrorList>(value.clone()).ok()
            } else {
                None
            };
            match list {
                Some(list) => ErrorPayload::Errors(list.errors),
                None => ErrorPayload::Json(value),
            }
        } else {
            ErrorPayload::Text(trimmed.to_string())
        };

        Self { shape, payload, raw: trimmed.to_string() }
    }

    /// Body text exactly as received (trimmed).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Error messages, when the body was a structured list.
    pub fn messages(&self) -> Vec<&str> {
        match &self.payload {
            ErrorPayload::Errors(entries) => entries.iter().map(|e| e.message.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Result of one gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCallOutcome {
    Success { status: u16, payload: Value },
    Failure { status: u16, error: DecodedErrorBody },
}

impl RemoteCallOutcome {
    /// Classify a response by status code.
    pub fn decode(status: u16, body: &str) -> Self {
        if status >= 400 {
            return Self::Failure { status, error: DecodedErrorBody::decode(status, body) };
        }

        let trimmed = body.trim();
        let payload = if trimmed.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
        };
        Self::Success { status, payload }
    }

    pub const fn status(&self) -> u16 {
        match self {
            Self::Success { status, .. } | Self::Failure { status, .. } => *status,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Convert a failure into [`ApiError::Remote`].
    ///
    /// # Errors
    /// Returns `ApiError::Remote` carrying the status and raw body.
    pub fn into_result(self) -> Result<Value, ApiError> {
        match self {
            Self::Success { payload, .. } => Ok(payload),
            Self::Failure { status, error } => Err(ApiError::Remote { status, body: error.raw }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table_round_trips_known_codes() {
        for status in [400, 403, 404, 413, 415, 429, 500, 503] {
            let shape = ErrorShape::from_status(status);
            assert!(!matches!(shape, ErrorShape::Other(_)), "{status} unmapped");
            assert_eq!(shape.status(), status);
        }
        assert_eq!(ErrorShape::from_status(418), ErrorShape::Other(418));
    }

    #[test]
    fn error_list_decoded_for_documented_status() {
        let body = r#"{"errors":[{"code":"InvalidInput","message":"SKU-1 requires prepOwner but NONE was assigned","details":""}]}"#;
        let outcome = RemoteCallOutcome::decode(400, body);

        let RemoteCallOutcome::Failure { status, error } = &outcome else {
            panic!("expected failure");
        };
        assert_eq!(*status, 400);
        assert_eq!(error.shape, ErrorShape::BadRequest);
        assert_eq!(error.messages(), vec!["SKU-1 requires prepOwner but NONE was assigned"]);
        assert_eq!(error.raw(), body);
    }

    #[test]
    fn unexpected_bodies_are_kept() {
        let html = RemoteCallOutcome::decode(503, "<html>down</html>");
        let RemoteCallOutcome::Failure { error, .. } = html else { panic!("expected failure") };
        assert_eq!(error.payload, ErrorPayload::Text("<html>down</html>".into()));

        let odd = RemoteCallOutcome::decode(418, r#"{"teapot":true}"#);
        let RemoteCallOutcome::Failure { error, .. } = odd else { panic!("expected failure") };
        assert!(matches!(error.payload, ErrorPayload::Json(_)));

        let empty = RemoteCallOutcome::decode(404, "");
        let RemoteCallOutcome::Failure { error, .. } = empty else { panic!("expected failure") };
        assert_eq!(error.payload, ErrorPayload::Empty);
    }

    #[test]
    fn success_payload_passes_through() {
        let outcome = RemoteCallOutcome::decode(200, r#"{"payload":{"a":1}}"#);
        assert!(outcome.is_success());
        assert_eq!(outcome.into_result().unwrap()["payload"]["a"], 1);

        assert_eq!(RemoteCallOutcome::decode(204, "").into_result().unwrap(), Value::Null);
    }

    #[test]
    fn into_result_carries_status_and_body() {
        let err = RemoteCallOutcome::decode(429, r#"{"errors":[]}"#).into_result().unwrap_err();
        match err {
            ApiError::Remote { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, r#"{"errors":[]}"#);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
