use axum::{extract::Request, middleware::Next, response::Response};
use tracing::debug;

use crate::api::handlers::set_uid;

/// Authentication stub.
///
/// Real credential checks are out of scope for the demo: every caller is
/// treated as user 10, which is stored for the dispatcher's pre-processing
/// hook to pick up. A real implementation would answer with
/// `failure_with_code_msg` and return without calling `next` on rejection.
pub async fn verify(mut request: Request, next: Next) -> Response {
    let uid = 10;
    set_uid(request.extensions_mut(), uid);
    debug!(uid, "Request authenticated");

    next.run(request).await
}
