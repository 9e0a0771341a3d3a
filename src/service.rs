use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::{BoxFuture, FutureExt};
use http::{Request, Response};
use hyper::{service::Service, Body};

use crate::{
    DirectoryServer, ErrorMode, ErrorResponseBuilder, RequestContext, ServeError,
    SingleFileServer,
};

/// Outcome of serving a request.
#[derive(Debug)]
pub enum ServeResult {
    /// A response was produced (200, 304, or the `OPTIONS` answer).
    Served(Response<Body>),
    /// The request is not for this handler; try the next one.
    NotHandled,
    /// The request failed.
    Failed(ServeError),
}

impl ServeResult {
    /// Whether a response was produced.
    pub fn is_served(&self) -> bool {
        matches!(*self, ServeResult::Served(_))
    }
}

/// A handler that may answer a request, or pass it on.
pub trait StaticHandler: Send + Sync {
    /// Serve a request described by its context.
    fn handle<'a>(&'a self, ctx: &'a RequestContext<'a>) -> BoxFuture<'a, ServeResult>;
}

impl StaticHandler for DirectoryServer {
    fn handle<'a>(&'a self, ctx: &'a RequestContext<'a>) -> BoxFuture<'a, ServeResult> {
        self.serve_context(ctx).boxed()
    }
}

impl StaticHandler for SingleFileServer {
    fn handle<'a>(&'a self, ctx: &'a RequestContext<'a>) -> BoxFuture<'a, ServeResult> {
        let result = self.serve_context(ctx);
        async move { result }.boxed()
    }
}

/// High-level interface: an ordered chain of handlers behind one Hyper service.
///
/// Each handler is asked in turn. The first one that serves or fails decides the outcome;
/// handlers that pass go on to the next. When every handler passes, the response is a 404.
/// Failures are turned into error responses according to the error mode.
///
/// This struct also implements the `hyper::Service` trait, which simply wraps `Cascade::serve`.
#[derive(Clone, Default)]
pub struct Cascade {
    handlers: Vec<Arc<dyn StaticHandler>>,
    errors: ErrorResponseBuilder,
}

impl Cascade {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the chain.
    pub fn handler(&mut self, handler: impl StaticHandler + 'static) -> &mut Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Set the error exposure policy.
    pub fn error_mode(&mut self, mode: ErrorMode) -> &mut Self {
        self.errors.mode(mode);
        self
    }

    /// Ask each handler in turn.
    pub async fn dispatch(&self, ctx: &RequestContext<'_>) -> ServeResult {
        for handler in &self.handlers {
            match handler.handle(ctx).await {
                ServeResult::NotHandled => continue,
                outcome => return outcome,
            }
        }
        ServeResult::NotHandled
    }

    /// Serve a request, turning failures into error responses.
    pub async fn serve<B>(&self, req: Request<B>) -> Response<Body> {
        let (parts, _) = req.into_parts();
        let ctx = RequestContext::from_parts(&parts);
        let err = match self.dispatch(&ctx).await {
            ServeResult::Served(res) => return res,
            ServeResult::NotHandled => ServeError::NotFound,
            ServeResult::Failed(err) => err,
        };
        if err.status().is_server_error() {
            tracing::error!(path = ctx.path(), error = %err, detail = ?err.detail(), "request failed");
        }
        self.errors.build(ctx.headers(), &err)
    }
}

impl StaticHandler for Cascade {
    fn handle<'a>(&'a self, ctx: &'a RequestContext<'a>) -> BoxFuture<'a, ServeResult> {
        self.dispatch(ctx).boxed()
    }
}

impl<B> Service<Request<B>> for Cascade
where
    B: Send + 'static,
{
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response<Body>, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let cascade = self.clone();
        async move { Ok(cascade.serve(request).await) }.boxed()
    }
}
