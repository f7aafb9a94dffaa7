//! Uniform response envelope and the domain code to HTTP status mapping
//!
//! Every answer leaving a dispatched handler has the shape
//! `{"code": int, "msg": string, "data": ...}` where `data` is only present
//! on success. Handlers never pick transport statuses themselves: success is
//! always 200 and a failure's status is derived from its domain code by
//! [`status_for_code`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::errors::{codes, Error};
use crate::metrics::ENVELOPE_FAILURES_TOTAL;

/// Wire envelope shared by success and failure responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Domain code, `0` on success
    pub code: i32,
    /// Human-readable message
    pub msg: String,
    /// Business payload, omitted on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: codes::OK,
            msg: codes::OK_MSG.to_string(),
            data: Some(data),
        }
    }

    pub fn failure(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == codes::OK
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        // Only a payload-carrying OK envelope is a success
        let status = if self.is_success() && self.data.is_some() {
            StatusCode::OK
        } else {
            status_for_code(self.code)
        };
        (status, Json(self)).into_response()
    }
}

/// HTTP status for a failure's domain code.
///
/// Codes in the `4xxxx` group map to 400, everything else (including a
/// failure that carries `OK`) to 500.
pub fn status_for_code(code: i32) -> StatusCode {
    if codes::is_client_error(code) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Route a business result to [`success`] or [`failure`]
pub fn process_result<T: Serialize>(result: anyhow::Result<T>) -> Response {
    match result {
        Ok(data) => success(data),
        Err(err) => failure(&err),
    }
}

/// Successful envelope with status 200
pub fn success<T: Serialize>(data: T) -> Response {
    // Serialize up front so an unrepresentable payload still yields an envelope
    match serde_json::to_value(&data) {
        Ok(value) => (StatusCode::OK, Json(Envelope::success(value))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to serialize response payload");
            failure_with_code_msg(codes::UNKNOWN_EXCEPTION, codes::UNKNOWN_EXCEPTION_MSG)
        }
    }
}

/// Failure envelope for `err`.
///
/// Structured [`Error`]s keep their code and message. Any other error is
/// reported as [`codes::UNKNOWN_EXCEPTION`] and its text is only logged.
pub fn failure(err: &anyhow::Error) -> Response {
    match err.downcast_ref::<Error>() {
        Some(e) => failure_with_code_msg(e.code, e.msg.clone()),
        None => {
            error!(error = %format!("{err:#}"), "Unstructured error reached the client boundary");
            failure_with_code_msg(codes::UNKNOWN_EXCEPTION, codes::UNKNOWN_EXCEPTION_MSG)
        }
    }
}

/// Failure envelope for a code and message with no [`Error`] behind them
pub fn failure_with_code_msg(code: i32, msg: impl Into<String>) -> Response {
    let msg = msg.into();
    debug!(code, msg = %msg, "Responding with failure envelope");
    ENVELOPE_FAILURES_TOTAL
        .with_label_values(&[&code.to_string()])
        .inc();
    let status = status_for_code(code);
    (status, Json(Envelope::<()>::failure(code, msg))).into_response()
}
