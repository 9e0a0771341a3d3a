use std::time::SystemTime;

use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::{Method, Response, StatusCode};
use hyper::Body;
use mime_guess::Mime;

use crate::util::{is_fresh, FileBody};
use crate::{EntityTag, RequestContext, ServeError};

/// Everything needed to respond with a file.
#[derive(Debug)]
pub struct ServedFile {
    /// Size in bytes.
    pub size: u64,
    /// Last modification time. The current time is sent when unknown.
    pub modified: Option<SystemTime>,
    /// Entity tag.
    pub etag: EntityTag,
    /// Media type.
    pub mime: Mime,
    /// The body, used only for `GET` responses that are not 304.
    pub body: FileBody,
}

/// `Content-Type` value for a media type, with a UTF-8 charset for textual types.
pub fn content_type_for(mime: &Mime) -> String {
    let textual = mime.type_() == mime_guess::mime::TEXT
        || *mime == mime_guess::mime::APPLICATION_JAVASCRIPT
        || *mime == mime_guess::mime::APPLICATION_JSON;
    if textual && mime.get_param(mime_guess::mime::CHARSET).is_none() {
        format!("{}; charset=utf-8", mime)
    } else {
        mime.to_string()
    }
}

fn header_value(name: HeaderName, value: String) -> Result<HeaderValue, ServeError> {
    HeaderValue::try_from(value).map_err(|source| ServeError::InvalidHeader { name, source })
}

/// Utility to build the response for a resolved file.
///
/// Sets the representation headers, then decides between 200 and 304 based on the request's
/// conditional headers. The body is attached only to a `GET` that is not 304.
#[derive(Clone, Debug)]
pub struct FileResponseBuilder<'a> {
    /// Request headers, for the conditional check.
    pub request_headers: &'a HeaderMap,
    /// Whether the body should be sent.
    pub is_get: bool,
    /// Value of the `Cache-Control` header. Empty or `None` sends no header.
    pub cache_control: Option<String>,
}

impl<'a> FileResponseBuilder<'a> {
    /// Create a new builder for the given request.
    pub fn from_context(ctx: &'a RequestContext<'_>) -> Self {
        FileResponseBuilder {
            request_headers: ctx.headers(),
            is_get: *ctx.method() == Method::GET,
            cache_control: None,
        }
    }

    /// Send this `Cache-Control` value.
    pub fn cache_control(&mut self, value: Option<String>) -> &mut Self {
        self.cache_control = value;
        self
    }

    /// Build a response for the given file.
    pub fn build(&self, file: ServedFile) -> Result<Response<Body>, ServeError> {
        let mut headers = HeaderMap::new();

        let modified = file.modified.unwrap_or_else(SystemTime::now);
        headers.insert(
            header::LAST_MODIFIED,
            header_value(header::LAST_MODIFIED, httpdate::fmt_http_date(modified))?,
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(file.size));
        headers.insert(
            header::CONTENT_TYPE,
            header_value(header::CONTENT_TYPE, content_type_for(&file.mime))?,
        );
        headers.insert(
            header::ETAG,
            header_value(header::ETAG, file.etag.to_string())?,
        );
        match self.cache_control {
            Some(ref value) if !value.is_empty() => {
                headers.insert(
                    header::CACHE_CONTROL,
                    header_value(header::CACHE_CONTROL, value.clone())?,
                );
            }
            _ => {}
        }

        // Headers must be in place before the freshness check reads them.
        let (status, body) = if is_fresh(self.request_headers, &headers) {
            headers.remove(header::CONTENT_TYPE);
            headers.remove(header::CONTENT_LENGTH);
            (StatusCode::NOT_MODIFIED, Body::empty())
        } else if self.is_get {
            (StatusCode::OK, Body::from(file.body))
        } else {
            (StatusCode::OK, Body::empty())
        };

        let mut res = Response::new(body);
        *res.status_mut() = status;
        *res.headers_mut() = headers;
        Ok(res)
    }
}
