use std::fmt;
use std::sync::Arc;

use crate::RequestContext;

/// Signature of a computed `Cache-Control` policy.
///
/// Receives the request and whether the file being served is the index fallback.
pub type CacheControlFn = dyn Fn(&RequestContext<'_>, bool) -> String + Send + Sync;

/// Source of the `Cache-Control` header value.
#[derive(Clone)]
pub enum CacheControl {
    /// The same value for every response.
    Static(String),
    /// A value computed per request.
    Computed(Arc<CacheControlFn>),
}

impl CacheControl {
    /// Wrap a closure as a computed policy.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&RequestContext<'_>, bool) -> String + Send + Sync + 'static,
    {
        CacheControl::Computed(Arc::new(f))
    }

    /// Header value for this request. An empty value means no header is sent.
    pub fn resolve(&self, ctx: &RequestContext<'_>, is_index: bool) -> String {
        match *self {
            CacheControl::Static(ref value) => value.clone(),
            CacheControl::Computed(ref f) => f(ctx, is_index),
        }
    }
}

impl Default for CacheControl {
    fn default() -> Self {
        CacheControl::Static("public".to_owned())
    }
}

impl fmt::Debug for CacheControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CacheControl::Static(ref value) => f.debug_tuple("Static").field(value).finish(),
            CacheControl::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for CacheControl {
    fn from(value: &str) -> Self {
        CacheControl::Static(value.to_owned())
    }
}

impl From<String> for CacheControl {
    fn from(value: String) -> Self {
        CacheControl::Static(value)
    }
}

/// Default size limit, in bytes, for files kept in memory.
pub const DEFAULT_MAX_CACHE: u64 = 4096;

/// Settings of a `DirectoryServer`.
///
/// This struct allows direct access to its fields, but these fields are typically initialized by
/// the accessors, using the builder pattern. Options are fixed once the server is built.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    /// Source of the `Cache-Control` header. Defaults to `public`.
    pub cache_control: CacheControl,
    /// Largest file size kept in memory and hashed. `None` streams every file.
    pub max_cache: Option<u64>,
    /// URL prefix stripped before resolving against the root.
    pub stem: String,
    /// File served when nothing else matches, or for a bare stem.
    pub index_file: Option<String>,
    /// Suffixes tried, in order, for request paths without an extension.
    pub extensions: Vec<String>,
    /// Whether dotfiles and dot-directories may be served.
    pub hidden: bool,
    /// Whether an unresolved request is left to the next handler instead of failing with 404.
    pub fallthru: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        ServerOptions {
            cache_control: CacheControl::default(),
            max_cache: Some(DEFAULT_MAX_CACHE),
            stem: String::new(),
            index_file: None,
            extensions: Vec::new(),
            hidden: false,
            fallthru: false,
        }
    }
}

impl ServerOptions {
    /// Create options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send this `Cache-Control` value, or compute it per request.
    pub fn cache_control(&mut self, value: impl Into<CacheControl>) -> &mut Self {
        self.cache_control = value.into();
        self
    }

    /// Compute `Cache-Control` per request from the request and the index flag.
    pub fn cache_control_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&RequestContext<'_>, bool) -> String + Send + Sync + 'static,
    {
        self.cache_control = CacheControl::computed(f);
        self
    }

    /// Keep files up to `bytes` in memory. A negative value disables caching.
    pub fn max_cache(&mut self, bytes: i64) -> &mut Self {
        self.max_cache = u64::try_from(bytes).ok();
        self
    }

    /// Strip this URL prefix before resolving against the root.
    pub fn stem(&mut self, stem: impl Into<String>) -> &mut Self {
        self.stem = stem.into();
        self
    }

    /// Fall back to this file, relative to the root.
    pub fn index_file(&mut self, file: impl Into<String>) -> &mut Self {
        self.index_file = Some(file.into());
        self
    }

    /// Try these suffixes for paths without an extension.
    pub fn extensions<I, S>(&mut self, extensions: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Allow serving dotfiles.
    pub fn hidden(&mut self, value: bool) -> &mut Self {
        self.hidden = value;
        self
    }

    /// Leave unresolved requests to the next handler.
    pub fn fallthru(&mut self, value: bool) -> &mut Self {
        self.fallthru = value;
        self
    }

    /// Alias of `fallthru`.
    pub fn fallthrough(&mut self, value: bool) -> &mut Self {
        self.fallthru(value)
    }
}
