//! Panic recovery middleware
//!
//! The last line of defense: a panic anywhere below this layer is logged and
//! answered with the `UNKNOWN_EXCEPTION` envelope instead of tearing down the
//! connection. Domain failures should still be reported as
//! [`Error`](crate::errors::Error)s.

use std::any::Any;

use axum::response::Response;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

use crate::errors::codes;
use crate::metrics::PANICS_RECOVERED_TOTAL;
use crate::response::failure_with_code_msg;

/// Panic payload handed over by the unwinding machinery
pub type PanicPayload = Box<dyn Any + Send + 'static>;

/// Layer returned by [`recovery`]
pub type RecoveryLayer = CatchPanicLayer<fn(PanicPayload) -> Response>;

/// Build the recovery layer. Install it once, outermost on the router.
pub fn recovery() -> RecoveryLayer {
    CatchPanicLayer::custom(handle_panic as fn(PanicPayload) -> Response)
}

fn handle_panic(payload: PanicPayload) -> Response {
    error!(panic = %panic_message(payload.as_ref()), "A panic was captured");
    PANICS_RECOVERED_TOTAL.inc();
    failure_with_code_msg(codes::UNKNOWN_EXCEPTION, codes::UNKNOWN_EXCEPTION_MSG)
}

/// Best-effort text of a panic payload
fn panic_message<'a>(payload: &'a (dyn Any + Send + 'static)) -> &'a str {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::handle;
    use crate::context::Context;
    use axum::{body::Body, http::{Request, StatusCode}, routing::get, Router};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn explode() -> &'static str {
        panic!("boom")
    }

    async fn explode_dispatched(_ctx: Context, _req: Value) -> anyhow::Result<Value> {
        let items: Vec<i32> = Vec::new();
        Ok(Value::from(items[3]))
    }

    fn app() -> Router {
        Router::new()
            .route("/plain", get(explode))
            .route("/dispatched", get(handle(None, explode_dispatched)))
            .route("/fine", get(|| async { "fine" }))
            .layer(recovery())
    }

    #[tokio::test]
    async fn test_panic_in_plain_handler() {
        let (status, body) = call(app(), "/plain").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], codes::UNKNOWN_EXCEPTION);
        assert_eq!(body["msg"], "unknown exception");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_panic_in_dispatched_handler() {
        let (status, body) = call(app(), "/dispatched").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], codes::UNKNOWN_EXCEPTION);
    }

    #[tokio::test]
    async fn test_no_panic_passes_through() {
        let response = app()
            .oneshot(Request::builder().uri("/fine").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_panic_message() {
        let owned: PanicPayload = Box::new(String::from("owned"));
        let borrowed: PanicPayload = Box::new("borrowed");
        let other: PanicPayload = Box::new(7u8);
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}
