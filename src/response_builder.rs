use std::fmt::Write as _;

use http::header::{self, HeaderMap, HeaderValue};
use http::Response;
use hyper::Body;

use crate::util::negotiate::preferred_media_type;
use crate::ServeError;

/// How much of an error is revealed to clients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Every message is shown.
    #[default]
    Development,
    /// Messages are shown for client errors only, unless the error decides otherwise.
    Production,
}

impl ErrorMode {
    /// `production` selects `Production`; anything else is `Development`.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("production") {
            ErrorMode::Production
        } else {
            ErrorMode::Development
        }
    }
}

/// Utility to build the response for a failed request.
///
/// The body is JSON or plain text, depending on the request's `Accept` header. Extra headers the
/// error carries (like `Allow`) are copied onto the response.
#[derive(Clone, Debug, Default)]
pub struct ErrorResponseBuilder {
    /// Exposure policy.
    pub mode: ErrorMode,
}

impl ErrorResponseBuilder {
    /// Create a new response builder with a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given exposure policy.
    pub fn mode(&mut self, value: ErrorMode) -> &mut Self {
        self.mode = value;
        self
    }

    /// Whether the error's own message and details may be shown.
    pub fn exposes(&self, err: &ServeError) -> bool {
        match self.mode {
            ErrorMode::Development => true,
            ErrorMode::Production => err
                .expose()
                .unwrap_or_else(|| err.status().as_u16() < 500),
        }
    }

    /// Build a response for the given request headers and error.
    pub fn build(&self, request_headers: &HeaderMap, err: &ServeError) -> Response<Body> {
        let status = err.status();
        let expose = self.exposes(err);
        let message = if expose {
            err.to_string()
        } else {
            status.canonical_reason().unwrap_or("Error").to_owned()
        };
        let code = err.code().filter(|_| expose);
        let detail = err.detail().filter(|_| expose);

        let offers = ["text/html", "application/json", "text/plain"];
        let (content_type, body) = match preferred_media_type(request_headers, &offers) {
            Some("application/json") => {
                let mut json = serde_json::json!({
                    "error_description": message,
                    "status": status.as_u16(),
                });
                if let Some(code) = code {
                    json["error"] = code.into();
                }
                ("application/json", json.to_string())
            }
            _ => {
                let mut text = format!("Error {}: ", status.as_u16());
                if let Some(code) = code {
                    let _ = write!(text, "[{}] ", code);
                }
                let _ = writeln!(text, "{}", message);
                if let Some(detail) = detail {
                    let _ = writeln!(text, "{}", detail);
                }
                ("text/plain; charset=utf-8", text)
            }
        };

        let mut res = Response::new(Body::from(body));
        *res.status_mut() = status;
        let headers = res.headers_mut();
        for (name, value) in err.headers().iter() {
            headers.insert(name.clone(), value.clone());
        }
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        res
    }
}
