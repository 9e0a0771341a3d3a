// This example serves a small site from the current directory:
//
//   favicon.ico    the icon, loaded once at startup
//   static/        assets, falling through when missing
//   dist/          a single-page app, with index.html for every other path
//
// Run `cargo run --example site_server`, then point your browser to
// http://localhost:3000/. Set `APP_MODE=production` to hide server error details,
// and `PORT` to listen elsewhere.

use std::convert::Infallible;
use std::env;
use std::net::SocketAddr;

use hyper::service::make_service_fn;
use hyper::Server;
use static_serve::{Cascade, DirectoryServer, ErrorMode, ServerOptions, SingleFileServer};

fn build_cascade(mode: ErrorMode) -> Result<Cascade, Box<dyn std::error::Error>> {
    let mut favicon = SingleFileServer::new("favicon.ico")?;
    favicon
        .route("/favicon.ico")
        .cache_control("public, max-age=86400");

    let mut assets = ServerOptions::new();
    assets
        .fallthru(true)
        .max_cache(20 * 1024)
        .cache_control_fn(|ctx, _is_index| {
            if ctx.path().starts_with("/tarot/") {
                "public, max-age=604800, immutable".to_owned()
            } else {
                "public, max-age=3600".to_owned()
            }
        });

    let mut app = ServerOptions::new();
    app.index_file("index.html")
        .max_cache(-1)
        .cache_control_fn(|_ctx, is_index| {
            if is_index {
                "private, no-cache".to_owned()
            } else {
                "public, max-age=31536000".to_owned()
            }
        });

    let mut cascade = Cascade::new();
    cascade
        .error_mode(mode)
        .handler(favicon)
        .handler(DirectoryServer::new("static", assets)?)
        .handler(DirectoryServer::new("dist", app)?);
    Ok(cascade)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mode = ErrorMode::from_name(&env::var("APP_MODE").unwrap_or_default());
    let port = match env::var("PORT") {
        Ok(value) => value.parse()?,
        Err(_) => 3000,
    };
    let cascade = build_cascade(mode)?;

    let make_service = make_service_fn(move |_| {
        let cascade = cascade.clone();
        async move { Ok::<_, Infallible>(cascade) }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let server = Server::bind(&addr).serve(make_service);
    tracing::info!(%addr, ?mode, "site server running");

    server.await?;
    Ok(())
}
