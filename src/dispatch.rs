//! Typed handler dispatch
//!
//! Turns a business function of shape `async fn(Context, Req) ->
//! anyhow::Result<Rsp>` into an axum handler. For every call the dispatcher
//!
//! 1. binds the JSON body into a fresh `Req` (failure answers
//!    `INVALID_REQUEST` / `"invalid param"` and the business function is
//!    never called),
//! 2. runs the optional pre-processing hook on the bound request,
//! 3. invokes the business function,
//! 4. hands the result to [`process_result`].
//!
//! Panics are not caught here. Install [`recovery`](crate::recovery::recovery)
//! on the router for that.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/user/info/get", get(handle(None, get_user_info)))
//!     .route(
//!         "/user/info/update",
//!         post(
//!             Dispatch::new()
//!                 .pre_process(|ctx: &Context, req: &mut UpdateUserInfoReq| {
//!                     req.uid = ctx.get_key(KEY_USER_ID);
//!                 })
//!                 .service(update_user_info)
//!                 .into_handler(),
//!         ),
//!     )
//!     .layer(recovery());
//! ```

use std::future::Future;
use std::sync::Arc;

use axum::{body::Body, extract::Request, response::Response};
use futures::future::BoxFuture;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::context::Context;
use crate::errors::codes;
use crate::response::{failure_with_code_msg, process_result};

/// Body size accepted when none is configured (2 MiB, axum's default)
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Hook run on the bound request before the business function
pub type PreProcessFn<Req> = Arc<dyn Fn(&Context, &mut Req) + Send + Sync>;

type ServiceFn<Req, Rsp> =
    Arc<dyn Fn(Context, Req) -> BoxFuture<'static, anyhow::Result<Rsp>> + Send + Sync>;

type ServiceOptFn<Req, Rsp, Opt> =
    Arc<dyn Fn(Context, Req, Vec<Opt>) -> BoxFuture<'static, anyhow::Result<Rsp>> + Send + Sync>;

enum Service<Req, Rsp, Opt> {
    Plain(ServiceFn<Req, Rsp>),
    WithOptions(ServiceOptFn<Req, Rsp, Opt>, Vec<Opt>),
}

/// Builder for a dispatched handler
pub struct Dispatch<Req, Rsp, Opt = ()> {
    pre_process: Option<PreProcessFn<Req>>,
    service: Option<Service<Req, Rsp, Opt>>,
    body_limit: usize,
}

impl<Req, Rsp> Dispatch<Req, Rsp, ()> {
    pub fn new() -> Self {
        Self {
            pre_process: None,
            service: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl<Req, Rsp> Default for Dispatch<Req, Rsp, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Rsp, Opt> Dispatch<Req, Rsp, Opt>
where
    Req: DeserializeOwned + Send + 'static,
    Rsp: Serialize + Send + 'static,
    Opt: Clone + Send + Sync + 'static,
{
    /// Mutate the bound request before the business call, e.g. to stamp
    /// an identity stored by an authentication middleware.
    pub fn pre_process<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context, &mut Req) + Send + Sync + 'static,
    {
        self.pre_process = Some(Arc::new(hook));
        self
    }

    /// Keep an already type-erased hook, or clear it with `None`
    pub fn pre_process_fn(mut self, hook: Option<PreProcessFn<Req>>) -> Self {
        self.pre_process = hook;
        self
    }

    /// Maximum accepted body size in bytes. Larger bodies fail binding.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Business function without call-site options. Replaces any service
    /// configured earlier.
    pub fn service<F, Fut>(mut self, service: F) -> Self
    where
        F: Fn(Context, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Rsp>> + Send + 'static,
    {
        let service: ServiceFn<Req, Rsp> =
            Arc::new(move |ctx: Context, req: Req| -> BoxFuture<'static, anyhow::Result<Rsp>> {
                Box::pin(service(ctx, req))
            });
        self.service = Some(Service::Plain(service));
        self
    }

    /// Business function receiving `opts` on every call. Replaces any
    /// service configured earlier.
    pub fn service_with_options<O, F, Fut>(self, service: F, opts: Vec<O>) -> Dispatch<Req, Rsp, O>
    where
        O: Clone + Send + Sync + 'static,
        F: Fn(Context, Req, Vec<O>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Rsp>> + Send + 'static,
    {
        let service: ServiceOptFn<Req, Rsp, O> =
            Arc::new(move |ctx: Context, req: Req, opts: Vec<O>| -> BoxFuture<'static, anyhow::Result<Rsp>> {
                Box::pin(service(ctx, req, opts))
            });
        Dispatch {
            pre_process: self.pre_process,
            service: Some(Service::WithOptions(service, opts)),
            body_limit: self.body_limit,
        }
    }

    /// Finish the builder into an axum handler.
    ///
    /// # Panics
    ///
    /// Panics if neither [`service`](Self::service) nor
    /// [`service_with_options`](Self::service_with_options) was called.
    pub fn into_handler(
        self,
    ) -> impl Fn(Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
        let Some(service) = self.service else {
            panic!("must set service or service_with_options");
        };

        let dispatcher = Arc::new(Dispatcher {
            pre_process: self.pre_process,
            service,
            body_limit: self.body_limit,
        });

        move |request: Request| -> BoxFuture<'static, Response> {
            let dispatcher = dispatcher.clone();
            Box::pin(async move { dispatcher.dispatch(request).await })
        }
    }
}

struct Dispatcher<Req, Rsp, Opt> {
    pre_process: Option<PreProcessFn<Req>>,
    service: Service<Req, Rsp, Opt>,
    body_limit: usize,
}

impl<Req, Rsp, Opt> Dispatcher<Req, Rsp, Opt>
where
    Req: DeserializeOwned + Send + 'static,
    Rsp: Serialize + Send + 'static,
    Opt: Clone + Send + Sync + 'static,
{
    async fn dispatch(&self, request: Request) -> Response {
        let (parts, body) = request.into_parts();
        let ctx = Context::from_parts(&parts);

        let mut req = match bind_json::<Req>(body, self.body_limit).await {
            Ok(req) => req,
            Err(response) => return response,
        };

        if let Some(hook) = &self.pre_process {
            hook(&ctx, &mut req);
        }

        let result = match &self.service {
            Service::Plain(service) => service(ctx, req).await,
            Service::WithOptions(service, opts) => service(ctx, req, opts.clone()).await,
        };

        process_result(result)
    }
}

/// Handler for a business function without options (see [`Dispatch`])
pub fn handle<Req, Rsp, F, Fut>(
    hook: Option<PreProcessFn<Req>>,
    service: F,
) -> impl Fn(Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
where
    Req: DeserializeOwned + Send + 'static,
    Rsp: Serialize + Send + 'static,
    F: Fn(Context, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Rsp>> + Send + 'static,
{
    Dispatch::new()
        .pre_process_fn(hook)
        .service(service)
        .into_handler()
}

/// Handler for a business function parameterized by call-site options
pub fn handle_with_options<Req, Rsp, Opt, F, Fut>(
    hook: Option<PreProcessFn<Req>>,
    service: F,
    opts: Vec<Opt>,
) -> impl Fn(Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
where
    Req: DeserializeOwned + Send + 'static,
    Rsp: Serialize + Send + 'static,
    Opt: Clone + Send + Sync + 'static,
    F: Fn(Context, Req, Vec<Opt>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Rsp>> + Send + 'static,
{
    Dispatch::<Req, Rsp>::new()
        .pre_process_fn(hook)
        .service_with_options(service, opts)
        .into_handler()
}

/// Read at most `limit` bytes of `body` and decode them as JSON.
///
/// The content type is not checked. On failure the `Err` holds the
/// ready-made `INVALID_REQUEST` response.
pub async fn bind_json<T: DeserializeOwned>(body: Body, limit: usize) -> Result<T, Response> {
    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, limit, "Failed to read request body");
            return Err(invalid_request());
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| {
        debug!(error = %e, "Failed to bind request body");
        invalid_request()
    })
}

fn invalid_request() -> Response {
    failure_with_code_msg(codes::INVALID_REQUEST, codes::INVALID_REQUEST_MSG)
}
