use std::path::{Path, PathBuf};
use std::sync::Arc;

use http::Request;

use crate::cache::MetadataCache;
use crate::resolve::{candidates, resolve_candidates};
use crate::util::{
    handle_method, hidden_segment, normalize_root, resolve_within, FileResponseBuilder, Stem,
};
use crate::{BuildError, RequestContext, ServeError, ServeResult, ServerOptions};

/// Serves files from a root directory, keeping small files in memory.
///
/// A request path is matched against the stem, and the remainder is resolved within the root.
/// The exact path is tried first, then the path with each configured extension appended, then
/// the index file. The first candidate that exists is served.
///
/// Files up to `max_cache` bytes are read once, tagged with a SHA-256 entity tag and kept in a
/// cache for the lifetime of the server. Larger files are opened and streamed on every request,
/// with a weak entity tag derived from size and modification time.
///
/// Cloning is cheap, and clones share the cache.
#[derive(Clone, Debug)]
pub struct DirectoryServer {
    root: PathBuf,
    stem: Stem,
    index_path: Option<PathBuf>,
    options: Arc<ServerOptions>,
    cache: Arc<MetadataCache>,
}

impl DirectoryServer {
    /// Create a server for the given root directory.
    ///
    /// The root is made absolute and normalized. Fails if the index file would resolve outside
    /// of the root.
    pub fn new(root: impl AsRef<Path>, options: ServerOptions) -> Result<Self, BuildError> {
        let root = normalize_root(root.as_ref())?;
        let index_path = match options.index_file {
            Some(ref file) => Some(
                resolve_within(&root, file)
                    .ok_or_else(|| BuildError::UnsafeIndexFile(file.clone()))?,
            ),
            None => None,
        };

        Ok(DirectoryServer {
            stem: Stem::new(&options.stem),
            root,
            index_path,
            options: Arc::new(options),
            cache: Arc::new(MetadataCache::new()),
        })
    }

    /// Absolute root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Options this server was built with.
    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// The cache of small files.
    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Serve a request.
    pub async fn serve<B>(&self, req: &Request<B>) -> ServeResult {
        self.serve_context(&RequestContext::from_request(req)).await
    }

    /// Serve a request described by its context.
    pub async fn serve_context(&self, ctx: &RequestContext<'_>) -> ServeResult {
        match handle_method(ctx) {
            Ok(Some(res)) => return ServeResult::Served(res),
            Ok(None) => {}
            Err(err) => return ServeResult::Failed(err),
        }

        if !self.options.hidden {
            if let Some(segment) = hidden_segment(ctx.path()) {
                return ServeResult::Failed(ServeError::HiddenPath {
                    segment: segment.to_owned(),
                });
            }
        }

        let capture = match self.stem.capture(ctx.path()) {
            Some(capture) if !capture.is_empty() || self.index_path.is_some() => capture,
            _ => return self.unresolved(ctx),
        };

        let list = candidates(
            &self.root,
            capture,
            &self.options.extensions,
            self.index_path.as_deref(),
        );
        let resolved = match resolve_candidates(list, &self.cache, self.options.max_cache).await {
            Ok(Some(resolved)) => resolved,
            Ok(None) => return self.unresolved(ctx),
            Err(err) => return ServeResult::Failed(err),
        };

        tracing::debug!(
            path = %resolved.path.display(),
            is_index = resolved.is_index,
            from_cache = resolved.from_cache,
            "serving file"
        );
        let cache_control = self.options.cache_control.resolve(ctx, resolved.is_index);
        match FileResponseBuilder::from_context(ctx)
            .cache_control(Some(cache_control))
            .build(resolved.file)
        {
            Ok(res) => ServeResult::Served(res),
            Err(err) => ServeResult::Failed(err),
        }
    }

    fn unresolved(&self, ctx: &RequestContext<'_>) -> ServeResult {
        if self.options.fallthru {
            tracing::debug!(path = ctx.path(), root = %self.root.display(), "falling through");
            ServeResult::NotHandled
        } else {
            ServeResult::Failed(ServeError::NotFound)
        }
    }
}
