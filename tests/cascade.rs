use std::fs;

use http::{header, Request, Response, StatusCode};
use hyper::Body;
use static_serve::{Cascade, DirectoryServer, ErrorMode, ServerOptions, SingleFileServer};
use tempdir::TempDir;

/// Mirrors a typical site: a favicon, fall-through assets, and a single-page app with an index.
fn site(dir: &TempDir, mode: ErrorMode) -> Cascade {
    for (subpath, contents) in [
        ("favicon.ico", "icon"),
        ("static/tarot/card.png", "png"),
        ("dist/index.html", "<html>app</html>"),
        ("dist/main.js", "main()"),
    ] {
        let fullpath = dir.path().join(subpath);
        fs::create_dir_all(fullpath.parent().unwrap()).unwrap();
        fs::write(fullpath, contents).unwrap();
    }

    let mut favicon = SingleFileServer::new(dir.path().join("favicon.ico")).unwrap();
    favicon.route("/favicon.ico");

    let mut assets = ServerOptions::new();
    assets
        .fallthru(true)
        .max_cache(20480)
        .cache_control("public, max-age=3600");

    let mut app = ServerOptions::new();
    app.index_file("index.html")
        .max_cache(-1)
        .cache_control_fn(|_ctx, is_index| {
            let scope = if is_index { "private" } else { "public" };
            format!("{}, max-age=60", scope)
        });

    let mut cascade = Cascade::new();
    cascade
        .error_mode(mode)
        .handler(favicon)
        .handler(DirectoryServer::new(dir.path().join("static"), assets).unwrap())
        .handler(DirectoryServer::new(dir.path().join("dist"), app).unwrap());
    cascade
}

async fn get(cascade: &Cascade, path: &str) -> Response<Body> {
    cascade.serve(Request::get(path).body(()).unwrap()).await
}

async fn read_body(res: Response<Body>) -> String {
    let bytes = hyper::body::to_bytes(res.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn routes_to_first_handler_that_serves() {
    let dir = TempDir::new("static-serve-tests").unwrap();
    let cascade = site(&dir, ErrorMode::Development);

    let res = get(&cascade, "/favicon.ico").await;
    assert_eq!(read_body(res).await, "icon");

    let res = get(&cascade, "/tarot/card.png").await;
    assert_eq!(res.headers()[header::CACHE_CONTROL], "public, max-age=3600");
    assert_eq!(read_body(res).await, "png");

    let res = get(&cascade, "/main.js").await;
    assert_eq!(res.headers()[header::CACHE_CONTROL], "public, max-age=60");
    assert_eq!(read_body(res).await, "main()");

    let res = get(&cascade, "/deep/link").await;
    assert_eq!(res.headers()[header::CACHE_CONTROL], "private, max-age=60");
    assert_eq!(read_body(res).await, "<html>app</html>");
}

#[tokio::test]
async fn failures_stop_the_chain() {
    let dir = TempDir::new("static-serve-tests").unwrap();
    let cascade = site(&dir, ErrorMode::Development);

    let res = get(&cascade, "/.env").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn method_errors_depend_on_mode() {
    let dir = TempDir::new("static-serve-tests").unwrap();

    let cascade = site(&dir, ErrorMode::Development);
    let req = Request::delete("/main.js").body(()).unwrap();
    let res = cascade.serve(req).await;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()[header::ALLOW], "GET,HEAD,OPTIONS");
    assert!(read_body(res).await.contains("Not Allowed"));

    let cascade = site(&dir, ErrorMode::Production);
    let req = Request::delete("/main.js").body(()).unwrap();
    let res = cascade.serve(req).await;
    assert_eq!(read_body(res).await, "Error 405: Method Not Allowed\n");
}

#[tokio::test]
async fn exhausted_chain_is_not_found() {
    let dir = TempDir::new("static-serve-tests").unwrap();
    let mut cascade = Cascade::new();
    let mut options = ServerOptions::new();
    options.fallthru(true);
    cascade.handler(DirectoryServer::new(dir.path(), options).unwrap());

    let req = Request::get("/nothing.txt")
        .header(header::ACCEPT, "application/json")
        .body(())
        .unwrap();
    let res = cascade.serve(req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
    let json: serde_json::Value = serde_json::from_str(&read_body(res).await).unwrap();
    assert_eq!(json["status"], 404);
}
