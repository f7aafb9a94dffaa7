use utoipa::OpenApi;

use crate::api::handlers::{
    GetUserInfoReq, GetUserInfoRsp, UpdateUserInfoReq, UpdateUserInfoResponse,
    UpdateUserInfoRsp, UserInfoResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "typed-rest demo",
        version = "0.1.0",
        description = "Demo user API served through the typed dispatcher. Every response is wrapped in a {code, msg, data} envelope; data is omitted on failure.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::get_user_info,
        crate::api::handlers::update_user_info,
    ),
    components(
        schemas(
            GetUserInfoReq,
            GetUserInfoRsp,
            UserInfoResponse,
            UpdateUserInfoReq,
            UpdateUserInfoRsp,
            UpdateUserInfoResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "user", description = "User profile endpoints"),
    )
)]
pub struct ApiDoc;
