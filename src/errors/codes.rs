//! Reserved error codes shared by every handler in the process.
//!
//! Business code ranges are up to the application. The formatter only cares
//! about the leading digit group: `code / 10000 == 4` is a client error,
//! anything else that is not [`OK`] is a server error.

/// Success sentinel carried by every successful envelope
pub const OK: i32 = 0;

/// The inbound payload could not be bound into the request type
pub const INVALID_REQUEST: i32 = 40000;

/// Anything that is not a structured [`Error`](super::Error), including panics
pub const UNKNOWN_EXCEPTION: i32 = 50000;

/// Message paired with [`UNKNOWN_EXCEPTION`] when no better one exists
pub const UNKNOWN_EXCEPTION_MSG: &str = "unknown exception";

/// Message paired with [`INVALID_REQUEST`] on bind failures
pub const INVALID_REQUEST_MSG: &str = "invalid param";

/// Message carried by every successful envelope
pub const OK_MSG: &str = "ok";

/// Whether a code falls into the client error class
pub fn is_client_error(code: i32) -> bool {
    code / 10000 == 4
}
