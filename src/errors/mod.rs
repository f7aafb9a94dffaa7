//! Structured `(code, message)` errors
//!
//! Business functions fail with [`Error`] wrapped in an [`anyhow::Error`].
//! The helpers here inspect such errors by code. They treat any other error
//! payload as a programming mistake and panic; the response formatter is
//! the only place that tolerates foreign errors.

pub mod codes;

use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

pub use codes::{INVALID_REQUEST, OK, UNKNOWN_EXCEPTION};

/// Error carrying a domain code and a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("code: {code}, msg: {msg}")]
pub struct Error {
    pub code: i32,
    pub msg: String,
}

impl Error {
    /// Create an error from a code and message. Codes are not validated.
    pub fn new(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
        }
    }

    /// Wrap an arbitrary error's text under [`UNKNOWN_EXCEPTION`]
    pub fn unknown_exception(err: impl std::fmt::Display) -> Self {
        Self::new(UNKNOWN_EXCEPTION, err.to_string())
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Whether this error carries `code`
    pub fn is(&self, code: i32) -> bool {
        self.code == code
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        crate::response::failure_with_code_msg(self.code, self.msg)
    }
}

/// Borrow the structured error inside `err`.
///
/// # Panics
///
/// Panics if `err` does not wrap an [`Error`].
pub fn to_error(err: &anyhow::Error) -> &Error {
    match err.downcast_ref::<Error>() {
        Some(e) => e,
        None => panic!("bad err type: {err}"),
    }
}

/// Code of a structured error. Panics on any other error kind.
pub fn code(err: &anyhow::Error) -> i32 {
    to_error(err).code
}

/// Message of a structured error. Panics on any other error kind.
pub fn message(err: &anyhow::Error) -> String {
    to_error(err).msg.clone()
}

/// Whether the structured error in `err` carries `code`
pub fn equal(err: &anyhow::Error, code: i32) -> bool {
    self::code(err) == code
}
