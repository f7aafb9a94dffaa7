//! Panic recovery and dispatch on a standalone router

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower::ServiceExt;

use typed_rest::errors::codes;
use typed_rest::{
    failure_with_code_msg, handle, handle_with_options, recovery, set_key, Context, Dispatch,
    Error,
};

#[derive(Debug, Deserialize)]
struct OrderReq {
    item: String,
    #[serde(default)]
    quantity: u32,
    #[serde(default)]
    tenant: String,
}

#[derive(Debug, Serialize)]
struct OrderRsp {
    item: String,
    quantity: u32,
    tenant: String,
    priority: String,
}

#[derive(Debug, Clone)]
enum OrderOpt {
    Priority(&'static str),
}

async fn place_order(_ctx: Context, req: OrderReq) -> anyhow::Result<OrderRsp> {
    match req.quantity {
        0 => Err(Error::new(40010, "quantity must be positive").into()),
        n if n > 100 => Err(Error::new(50010, "warehouse unavailable").into()),
        13 => panic!("unlucky quantity"),
        _ => Ok(OrderRsp {
            item: req.item,
            quantity: req.quantity,
            tenant: req.tenant,
            priority: "normal".to_string(),
        }),
    }
}

async fn place_order_with(
    ctx: Context,
    req: OrderReq,
    opts: Vec<OrderOpt>,
) -> anyhow::Result<OrderRsp> {
    let mut rsp = place_order(ctx, req).await?;
    for opt in opts {
        match opt {
            OrderOpt::Priority(p) => rsp.priority = p.to_string(),
        }
    }
    Ok(rsp)
}

async fn tenant_middleware(mut request: Request<Body>, next: Next) -> Response {
    match request.headers().get("x-tenant").and_then(|v| v.to_str().ok()) {
        Some(tenant) => {
            let tenant = tenant.to_string();
            set_key(request.extensions_mut(), "tenant", tenant);
            next.run(request).await
        }
        // Rejection ends the chain; the handler never runs
        None => failure_with_code_msg(40300, "missing tenant"),
    }
}

async fn explode() -> &'static str {
    panic!("plain handler panic")
}

fn app() -> Router {
    Router::new()
        .route("/orders", post(handle(None, place_order)))
        .route(
            "/orders/express",
            post(handle_with_options(
                None,
                place_order_with,
                vec![OrderOpt::Priority("express")],
            )),
        )
        .route(
            "/tenant/orders",
            post(
                Dispatch::new()
                    .pre_process(|ctx: &Context, req: &mut OrderReq| {
                        req.tenant = ctx.get_key("tenant");
                    })
                    .service(place_order)
                    .into_handler(),
            )
            .route_layer(middleware::from_fn(tenant_middleware)),
        )
        .route("/panic", get(explode))
        .layer(recovery())
}

async fn post_json(uri: &str, body: Value, tenant: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(tenant) = tenant {
        builder = builder.header("x-tenant", tenant);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_order_success() {
    let (status, body) = post_json("/orders", json!({"item": "pen", "quantity": 2}), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], codes::OK);
    assert_eq!(body["data"]["item"], "pen");
    assert_eq!(body["data"]["priority"], "normal");
}

#[tokio::test]
async fn test_client_class_error() {
    let (status, body) = post_json("/orders", json!({"item": "pen", "quantity": 0}), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"code": 40010, "msg": "quantity must be positive"}));
}

#[tokio::test]
async fn test_server_class_error() {
    let (status, body) = post_json("/orders", json!({"item": "pen", "quantity": 500}), None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"code": 50010, "msg": "warehouse unavailable"}));
}

#[tokio::test]
async fn test_panic_in_business_function() {
    let (status, body) = post_json("/orders", json!({"item": "pen", "quantity": 13}), None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"code": codes::UNKNOWN_EXCEPTION, "msg": "unknown exception"})
    );
}

#[tokio::test]
async fn test_panic_in_plain_handler() {
    let request = Request::builder().uri("/panic").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_options_reach_service() {
    let (status, body) = post_json(
        "/orders/express",
        json!({"item": "ink", "quantity": 1}),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["priority"], "express");
}

#[tokio::test]
async fn test_hook_reads_middleware_value() {
    let (status, body) = post_json(
        "/tenant/orders",
        json!({"item": "ink", "quantity": 1, "tenant": "spoofed"}),
        Some("acme"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tenant"], "acme");
}

#[tokio::test]
async fn test_middleware_rejection_stops_chain() {
    let (status, body) = post_json(
        "/tenant/orders",
        json!({"item": "ink", "quantity": 13}),
        None,
    )
    .await;

    // quantity 13 would panic if the handler ran
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"code": 40300, "msg": "missing tenant"}));
}

#[tokio::test]
async fn test_invalid_payload_never_reaches_service() {
    // quantity 13 would panic if the service ran
    let (status, body) = post_json("/orders", json!({"quantity": 13}), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], codes::INVALID_REQUEST);
}
