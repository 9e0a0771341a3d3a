use http::{request::Parts, HeaderMap, Method, Request};
use mime_guess::Mime;

use crate::util::{decode_request_path, negotiate};

/// The parts of a request that static serving looks at.
///
/// Borrows method and headers from the request. The path is percent-decoded once, up front.
#[derive(Debug)]
pub struct RequestContext<'a> {
    method: &'a Method,
    headers: &'a HeaderMap,
    path: String,
}

impl<'a> RequestContext<'a> {
    /// Build a context from its pieces. `raw_path` is the undecoded URI path.
    pub fn new(method: &'a Method, raw_path: &str, headers: &'a HeaderMap) -> Self {
        RequestContext {
            method,
            headers,
            path: decode_request_path(raw_path),
        }
    }

    /// Build a context for a request.
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self::new(req.method(), req.uri().path(), req.headers())
    }

    /// Build a context from request parts, once the body has been split off.
    pub fn from_parts(parts: &'a Parts) -> Self {
        Self::new(&parts.method, parts.uri.path(), &parts.headers)
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        self.method
    }

    /// Percent-decoded request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        self.headers
    }

    /// Whether the client accepts the given media type.
    pub fn accepts(&self, mime: &Mime) -> bool {
        negotiate::accepts_media_type(self.headers, mime)
    }

    /// Whether the client accepts the given content coding.
    pub fn accepts_encoding(&self, encoding: &str) -> bool {
        negotiate::accepts_encoding(self.headers, encoding)
    }

    /// Whether the client accepts the given language.
    pub fn accepts_language(&self, language: &str) -> bool {
        negotiate::accepts_language(self.headers, language)
    }

    /// Whether the client accepts the given charset.
    pub fn accepts_charset(&self, charset: &str) -> bool {
        negotiate::accepts_charset(self.headers, charset)
    }
}
