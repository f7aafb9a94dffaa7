//! Typed request dispatch, uniform `{code, msg, data}` envelopes and panic
//! recovery for axum services.

pub mod api;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod errors;
pub mod metrics;
pub mod recovery;
pub mod response;

pub use context::{get_key, set_key, Context, RequestId};
pub use dispatch::{handle, handle_with_options, Dispatch};
pub use errors::Error;
pub use recovery::recovery;
pub use response::{failure, failure_with_code_msg, process_result, success, Envelope};
