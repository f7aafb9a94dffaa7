use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;

use crate::context::{set_key, Context};
use crate::errors::Error;

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub instance_id: String,
    pub body_limit_bytes: usize,
}

/// Key under which the authenticated user id is stored
pub const KEY_USER_ID: &str = "KeyUserID";

/// The requested user does not exist
pub const ERR_CODE_USER_NOT_EXISTS: i32 = 40100;

/// Authenticated user id, `0` when nobody was authenticated
pub fn get_uid(ctx: &Context) -> i64 {
    ctx.get_key(KEY_USER_ID)
}

pub fn set_uid(extensions: &mut axum::http::Extensions, uid: i64) {
    set_key(extensions, KEY_USER_ID, uid);
}

/// User info lookup
#[derive(Debug, Deserialize, ToSchema)]
pub struct GetUserInfoReq {
    pub uid: i64,
}

/// Public user profile
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GetUserInfoRsp {
    pub uid: i64,
    pub username: String,
    pub age: i32,
}

/// Profile update. `uid` is overwritten with the authenticated user.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserInfoReq {
    #[serde(default)]
    pub uid: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub age: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateUserInfoRsp {}

// Concrete envelopes for OpenAPI generation
/// User info envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfoResponse {
    /// Domain code, 0 on success
    pub code: i32,
    /// Human-readable message
    pub msg: String,
    /// Present on success only
    pub data: Option<GetUserInfoRsp>,
}

/// Update envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateUserInfoResponse {
    /// Domain code, 0 on success
    pub code: i32,
    /// Human-readable message
    pub msg: String,
    /// Present on success only
    pub data: Option<UpdateUserInfoRsp>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "typed-rest",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Get a user's profile
#[utoipa::path(
    get,
    path = "/user/info/get",
    tag = "user",
    request_body = GetUserInfoReq,
    responses(
        (status = 200, description = "User found", body = UserInfoResponse),
        (status = 400, description = "Invalid request or user not found", body = UserInfoResponse),
        (status = 500, description = "Internal server error", body = UserInfoResponse)
    )
)]
pub async fn get_user_info(ctx: Context, req: GetUserInfoReq) -> anyhow::Result<GetUserInfoRsp> {
    info!(request_id = %ctx.request_id(), uid = req.uid, "Get user info");

    if req.uid != 10 {
        return Err(Error::new(ERR_CODE_USER_NOT_EXISTS, "user not exists").into());
    }

    Ok(GetUserInfoRsp {
        uid: req.uid,
        username: format!("user_{}", req.uid),
        age: 10,
    })
}

/// Update the authenticated user's profile
#[utoipa::path(
    post,
    path = "/user/info/update",
    tag = "user",
    request_body = UpdateUserInfoReq,
    responses(
        (status = 200, description = "Profile updated", body = UpdateUserInfoResponse),
        (status = 400, description = "Invalid request or user not found", body = UpdateUserInfoResponse),
        (status = 500, description = "Internal server error", body = UpdateUserInfoResponse)
    )
)]
pub async fn update_user_info(
    ctx: Context,
    req: UpdateUserInfoReq,
) -> anyhow::Result<UpdateUserInfoRsp> {
    info!(
        request_id = %ctx.request_id(),
        uid = req.uid,
        username = %req.username,
        age = req.age,
        "Update user info"
    );

    if req.uid != 10 {
        return Err(Error::new(ERR_CODE_USER_NOT_EXISTS, "user not exists").into());
    }

    Ok(UpdateUserInfoRsp {})
}

/// Stamp the authenticated user into an update request
pub fn stamp_uid(ctx: &Context, req: &mut UpdateUserInfoReq) {
    req.uid = get_uid(ctx);
}
