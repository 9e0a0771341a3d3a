use http::header::{self, HeaderValue};
use http::{Method, Response, StatusCode};
use hyper::Body;

use crate::{RequestContext, ServeError};

/// Value of the `Allow` header for static resources.
pub const ALLOW_METHODS: &str = "GET,HEAD,OPTIONS";

/// Method dispatch shared by both servers.
///
/// - `OPTIONS` is answered here: `Ok(Some(response))`.
/// - `GET` and `HEAD` continue: `Ok(None)`.
/// - Anything else fails with 405.
pub fn handle_method(ctx: &RequestContext<'_>) -> Result<Option<Response<Body>>, ServeError> {
    match *ctx.method() {
        Method::OPTIONS => {
            let mut res = Response::new(Body::empty());
            *res.status_mut() = StatusCode::OK;
            res.headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(ALLOW_METHODS));
            Ok(Some(res))
        }
        Method::GET | Method::HEAD => Ok(None),
        _ => Err(ServeError::MethodNotAllowed),
    }
}
