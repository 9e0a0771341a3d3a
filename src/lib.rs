#![crate_name = "static_serve"]
#![deny(missing_docs)]

//! Cached static file serving for [Hyper 0.14](https://github.com/hyperium/hyper).
//!
//! This library exports two servers. `DirectoryServer` serves files from a root directory, with
//! prefix stripping, extension fallbacks, an index fallback and an in-memory cache of small
//! files. `SingleFileServer` serves one file loaded at startup, such as a favicon.
//!
//! ## Basic usage
//!
//! Both servers are configured once and then asked to serve requests. The outcome is a
//! `ServeResult`: a response, a failure carrying an HTTP status, or `NotHandled` when the request
//! should go to the next handler.
//!
//! ```rust
//! use static_serve::{DirectoryServer, ServeResult, ServerOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut options = ServerOptions::new();
//!     options
//!         .stem("/static")
//!         .extensions(["html"])
//!         .fallthru(true);
//!     let server = DirectoryServer::new("my/doc/root/", options).unwrap();
//!
//!     // A dummy request, but normally obtained from Hyper.
//!     let request = http::Request::get("/static/foo/bar.txt")
//!         .body(())
//!         .unwrap();
//!
//!     match server.serve(&request).await {
//!         ServeResult::Served(response) => println!("{}", response.status()),
//!         ServeResult::NotHandled => println!("not ours"),
//!         ServeResult::Failed(err) => println!("{}: {}", err.status(), err),
//!     }
//! }
//! ```
//!
//! ## Composition
//!
//! `Cascade` chains handlers the way middleware stacks do: each handler either answers or passes
//! the request on. It implements `hyper::Service`, turning failures into plain-text or JSON error
//! responses whose verbosity depends on the `ErrorMode`.
//!
//! ```rust
//! use static_serve::{Cascade, DirectoryServer, ErrorMode, ServerOptions};
//!
//! let mut options = ServerOptions::new();
//! options
//!     .index_file("index.html")
//!     .max_cache(-1)
//!     .cache_control_fn(|_ctx, is_index| {
//!         let scope = if is_index { "private" } else { "public" };
//!         format!("{}, max-age=60", scope)
//!     });
//!
//! let mut cascade = Cascade::new();
//! cascade
//!     .error_mode(ErrorMode::Production)
//!     .handler(DirectoryServer::new("dist/", options).unwrap());
//! ```
//!
//! ## Lower-level pieces
//!
//! `FileResponseBuilder` sets the representation headers for a file and answers conditional
//! requests with 304. `FileBytesStream` wraps a `tokio::fs::File` in a stream of `Bytes`, and is
//! what large files are streamed with.

mod cache;
mod context;
mod directory;
mod entity_tag;
mod error;
mod options;
mod resolve;
mod response_builder;
mod service;
mod single_file;
mod util;

pub use crate::cache::*;
pub use crate::context::*;
pub use crate::directory::*;
pub use crate::entity_tag::*;
pub use crate::error::*;
pub use crate::options::*;
pub use crate::response_builder::*;
pub use crate::service::*;
pub use crate::single_file::*;
pub use crate::util::{
    is_fresh, FileBody, FileBytesStream, FileResponseBuilder, ServedFile, ALLOW_METHODS,
};
