//! Error types shared by the dispatcher, transport and import/export adapter.
//!
//! Three families of failure exist:
//! - configuration errors (missing or unknown application kind, bad connection settings)
//! - remote request errors ([`ReqError`]), carrying the name and message the remote
//!   application put in its error body
//! - transport and serialization errors, surfaced verbatim
//!
//! Caller-facing operations wrap any of these in a [`Failure`], whose message is the
//! translated, human-readable sentence shown by the front end.

use thiserror::Error;

/// Longest response body kept on a [`ReqError`].
pub const MAX_ERROR_BODY: usize = 512;

/// Errors produced while talking to a Starr application.
#[derive(Error, Debug)]
pub enum StarrError {
    #[error("missing application kind")]
    MissingApp,

    #[error("unsupported application: {0}")]
    UnsupportedApp(String),

    #[error("invalid application provided")]
    InvalidApp,

    #[error("{app} does not support {operation} for {kind}")]
    UnsupportedOperation {
        app: String,
        kind: &'static str,
        operation: &'static str,
    },

    #[error("invalid connection settings: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Request(#[from] ReqError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no file selected")]
    Cancelled,
}

impl StarrError {
    /// Text used in place of `{error}` inside user-facing messages.
    ///
    /// A remote request error with a non-empty message is rewritten to
    /// `"<name>: <message>"`; everything else keeps its display text.
    pub fn surface(&self) -> String {
        match self {
            StarrError::Request(req) if !req.msg.is_empty() => {
                format!("{}: {}", req.name, req.msg)
            }
            other => other.to_string(),
        }
    }

    /// Whether the error was raised locally, before any request left the process.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            StarrError::MissingApp
                | StarrError::UnsupportedApp(_)
                | StarrError::InvalidApp
                | StarrError::UnsupportedOperation { .. }
                | StarrError::InvalidConfig(_)
        )
    }
}

/// Result type for Starr operations
pub type StarrResult<T> = Result<T, StarrError>;

/// A non-success response from a Starr application.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid status code {code}: {body}")]
pub struct ReqError {
    /// HTTP status code
    pub code: u16,
    /// Remote-supplied name: the failing property, or the status reason phrase
    pub name: String,
    /// Remote-supplied message, empty when the body carried none
    pub msg: String,
    /// Response body, truncated to [`MAX_ERROR_BODY`] bytes
    pub body: String,
}

impl ReqError {
    /// Build a request error from a status code and raw response body.
    ///
    /// Servarr applications answer validation failures with an array of
    /// `{propertyName, errorMessage}` objects and other failures with
    /// `{message}`; both are unpacked into `name`/`msg`.
    pub fn from_response(code: u16, reason: &str, body: &str) -> Self {
        let (name, msg) = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(serde_json::Value::Array(items)) => items
                .first()
                .map(|first| {
                    (
                        json_str(first, "propertyName"),
                        json_str(first, "errorMessage"),
                    )
                })
                .unwrap_or_default(),
            Ok(obj @ serde_json::Value::Object(_)) => {
                let msg = json_str(&obj, "message");
                if msg.is_empty() {
                    (String::new(), String::new())
                } else {
                    (reason.to_string(), msg)
                }
            }
            _ => (String::new(), String::new()),
        };

        Self {
            code,
            name,
            msg,
            body: truncate(body, MAX_ERROR_BODY),
        }
    }
}

fn json_str(value: &serde_json::Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }

    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// A caller-facing failure: the translated sentence plus the underlying cause.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Failure {
    pub message: String,
    #[source]
    pub cause: StarrError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_array_unpacked() {
        let body = r#"[{"propertyName":"Host","errorMessage":"Unable to connect","severity":"error"}]"#;
        let err = ReqError::from_response(400, "Bad Request", body);

        assert_eq!(err.code, 400);
        assert_eq!(err.name, "Host");
        assert_eq!(err.msg, "Unable to connect");
    }

    #[test]
    fn test_message_object_uses_reason_as_name() {
        let err = ReqError::from_response(404, "Not Found", r#"{"message":"NotFound"}"#);
        assert_eq!(err.name, "Not Found");
        assert_eq!(err.msg, "NotFound");
    }

    #[test]
    fn test_plain_body_has_no_message() {
        let err = ReqError::from_response(502, "Bad Gateway", "<html>oops</html>");
        assert!(err.name.is_empty());
        assert!(err.msg.is_empty());
        assert_eq!(err.body, "<html>oops</html>");
    }

    #[test]
    fn test_surface_rewrites_remote_message() {
        let err = StarrError::from(ReqError {
            code: 400,
            name: "Host".to_string(),
            msg: "Unable to connect".to_string(),
            body: String::new(),
        });
        assert_eq!(err.surface(), "Host: Unable to connect");
    }

    #[test]
    fn test_surface_keeps_empty_remote_message() {
        let err = StarrError::from(ReqError::from_response(500, "Internal Server Error", ""));
        assert_eq!(err.surface(), err.to_string());
        assert_eq!(err.surface(), "invalid status code 500: ");
    }

    #[test]
    fn test_surface_keeps_local_errors() {
        let err = StarrError::UnsupportedApp("foo".to_string());
        assert_eq!(err.surface(), "unsupported application: foo");
        assert!(err.is_local());
    }

    #[test]
    fn test_long_body_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY * 2);
        let err = ReqError::from_response(500, "Internal Server Error", &body);
        assert_eq!(err.body.len(), MAX_ERROR_BODY + 3);
        assert!(err.body.ends_with("..."));
    }
}
