use std::fs;
use std::path::Path;
use std::time::SystemTime;

use http::Request;
use hyper::body::Bytes;
use mime_guess::{Mime, MimeGuess};

use crate::util::{handle_method, FileBody, FileResponseBuilder, ServedFile};
use crate::{BuildError, EntityTag, RequestContext, ServeError, ServeResult};

/// Serves one file, loaded into memory at construction.
///
/// Meant for a handful of known assets such as a favicon or a web manifest. The file is read and
/// tagged (MD5) once; later changes on disk are not noticed.
///
/// Content negotiation is strict: a request that refuses the file's media type, the `identity`
/// encoding, English, or UTF-8 fails with 406.
///
/// Without a route, every request is answered with the file.
#[derive(Clone, Debug)]
pub struct SingleFileServer {
    contents: Bytes,
    modified: Option<SystemTime>,
    etag: EntityTag,
    mime: Mime,
    cache_control: String,
    route: Option<String>,
}

impl SingleFileServer {
    /// Load the file at `path`.
    ///
    /// Blocks while reading. Fails if the path is not a regular file.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(BuildError::NotAFile(path.to_path_buf()));
        }
        let contents = Bytes::from(fs::read(path)?);

        Ok(SingleFileServer {
            etag: EntityTag::from_md5(&contents),
            contents,
            modified: metadata.modified().ok(),
            mime: MimeGuess::from_path(path).first_or_octet_stream(),
            cache_control: "public".to_owned(),
            route: None,
        })
    }

    /// Send this `Cache-Control` value. Defaults to `public`.
    pub fn cache_control(&mut self, value: impl Into<String>) -> &mut Self {
        self.cache_control = value.into();
        self
    }

    /// Only answer requests for this exact (decoded) path; leave others to the next handler.
    pub fn route(&mut self, path: impl Into<String>) -> &mut Self {
        self.route = Some(path.into());
        self
    }

    /// Entity tag of the file.
    pub fn etag(&self) -> &EntityTag {
        &self.etag
    }

    /// Serve a request.
    pub fn serve<B>(&self, req: &Request<B>) -> ServeResult {
        self.serve_context(&RequestContext::from_request(req))
    }

    /// Serve a request described by its context.
    pub fn serve_context(&self, ctx: &RequestContext<'_>) -> ServeResult {
        if let Some(ref route) = self.route {
            if ctx.path() != route {
                return ServeResult::NotHandled;
            }
        }

        match handle_method(ctx) {
            Ok(Some(res)) => return ServeResult::Served(res),
            Ok(None) => {}
            Err(err) => return ServeResult::Failed(err),
        }

        if !ctx.accepts(&self.mime)
            || !ctx.accepts_encoding("identity")
            || !ctx.accepts_language("en")
            || !ctx.accepts_charset("utf-8")
        {
            return ServeResult::Failed(ServeError::NotAcceptable);
        }

        let file = ServedFile {
            size: self.contents.len() as u64,
            modified: self.modified,
            etag: self.etag.clone(),
            mime: self.mime.clone(),
            body: FileBody::Buffered(self.contents.clone()),
        };
        match FileResponseBuilder::from_context(ctx)
            .cache_control(Some(self.cache_control.clone()))
            .build(file)
        {
            Ok(res) => ServeResult::Served(res),
            Err(err) => ServeResult::Failed(err),
        }
    }
}
