use std::io::Error as IoError;
use std::path::PathBuf;

use http::header::{self, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use http::StatusCode;
use thiserror::Error;

use crate::util::ALLOW_METHODS;

/// A failed request, carrying everything the error layer needs to respond.
///
/// Besides the status code, an error may carry extra response headers, an explicit decision on
/// whether its message may be shown to the client, a machine-readable code and a detail line.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServeError {
    /// A path segment starts with a dot and hidden files are not served.
    #[error("Bad Request")]
    HiddenPath {
        /// The offending segment.
        segment: String,
    },
    /// No candidate file exists.
    #[error("Not Found")]
    NotFound,
    /// The method is not one of `GET`, `HEAD`, `OPTIONS`.
    #[error("Not Allowed")]
    MethodNotAllowed,
    /// The client refuses the file's type, encoding, language or charset.
    #[error("Not Acceptable")]
    NotAcceptable,
    /// A file system error other than a missing file.
    #[error("failed to open {}", path.display())]
    Io {
        /// Candidate path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: IoError,
    },
    /// A computed header value cannot be sent.
    #[error("invalid value for {name} header")]
    InvalidHeader {
        /// Header name.
        name: HeaderName,
        /// Underlying error.
        #[source]
        source: InvalidHeaderValue,
    },
}

impl ServeError {
    /// Status code to respond with.
    pub fn status(&self) -> StatusCode {
        match *self {
            ServeError::HiddenPath { .. } => StatusCode::BAD_REQUEST,
            ServeError::NotFound => StatusCode::NOT_FOUND,
            ServeError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServeError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            ServeError::Io { .. } | ServeError::InvalidHeader { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Headers to merge into the error response.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let ServeError::MethodNotAllowed = *self {
            headers.insert(header::ALLOW, HeaderValue::from_static(ALLOW_METHODS));
        }
        headers
    }

    /// Explicit exposure decision. `None` leaves it to the error layer's defaults.
    pub fn expose(&self) -> Option<bool> {
        match *self {
            ServeError::MethodNotAllowed => Some(false),
            _ => None,
        }
    }

    /// Machine-readable error code, for failures the status alone doesn't describe.
    pub fn code(&self) -> Option<&'static str> {
        match *self {
            ServeError::Io { .. } => Some("io_error"),
            ServeError::InvalidHeader { .. } => Some("invalid_header"),
            _ => None,
        }
    }

    /// Human-readable detail line.
    pub fn detail(&self) -> Option<String> {
        match *self {
            ServeError::HiddenPath { ref segment } => {
                Some(format!("path segment `{}` is hidden", segment))
            }
            ServeError::Io { ref source, .. } => Some(source.to_string()),
            ServeError::InvalidHeader { ref source, .. } => Some(source.to_string()),
            _ => None,
        }
    }
}

/// Error constructing a server.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// The index file would resolve outside of the root.
    #[error("index file `{0}` resolves outside of the root")]
    UnsafeIndexFile(String),
    /// A single-file server was pointed at something other than a regular file.
    #[error("can only serve regular files: {}", .0.display())]
    NotAFile(PathBuf),
    /// The root or file could not be read.
    #[error(transparent)]
    Io(#[from] IoError),
}
