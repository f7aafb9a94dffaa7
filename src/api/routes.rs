use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{get_user_info, health, stamp_uid, update_user_info, AppState};
use super::middleware::{logging_middleware, verify};
use super::openapi::ApiDoc;
use crate::dispatch::Dispatch;
use crate::metrics;
use crate::recovery::recovery;

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.body_limit_bytes;

    Router::new()
        // Health check
        .route("/health", get(health))
        // Plain request, no authentication
        .route(
            "/user/info/get",
            get(Dispatch::new()
                .body_limit(body_limit)
                .service(get_user_info)
                .into_handler()),
        )
        // Authenticated: verify stores the uid, the hook copies it into the request
        .route(
            "/user/info/update",
            post(
                Dispatch::new()
                    .body_limit(body_limit)
                    .pre_process(stamp_uid)
                    .service(update_user_info)
                    .into_handler(),
            )
            .route_layer(middleware::from_fn(verify)),
        )
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler))
        // OpenAPI documentation
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware (order matters: cors -> trace -> recovery -> metrics -> logging).
        // Recovery must stay inside metrics and logging.
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(recovery())
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(middleware::from_fn(logging_middleware))
        // Add shared state
        .with_state(state)
}
