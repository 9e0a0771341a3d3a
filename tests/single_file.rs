use std::fs;

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use http::{header, Method, Request, Response, StatusCode};
use hyper::Body;
use md5::{Digest, Md5};
use static_serve::{BuildError, ServeError, ServeResult, SingleFileServer};
use tempdir::TempDir;

const ICON: &[u8] = b"\x00\x00\x01\x00fake icon";

struct Harness {
    _dir: TempDir,
    server: SingleFileServer,
}

impl Harness {
    fn new() -> Harness {
        let dir = TempDir::new("static-serve-tests").unwrap();
        let path = dir.path().join("favicon.ico");
        fs::write(&path, ICON).expect("failed to write fixture");
        let server = SingleFileServer::new(&path).unwrap();
        Harness { _dir: dir, server }
    }

    fn request(&self, req: Request<()>) -> ServeResult {
        self.server.serve(&req)
    }

    fn get_with(&self, name: header::HeaderName, value: &str) -> ServeResult {
        let req = Request::get("/favicon.ico")
            .header(name, value)
            .body(())
            .unwrap();
        self.request(req)
    }
}

async fn read_body(res: Response<Body>) -> Vec<u8> {
    hyper::body::to_bytes(res.into_body()).await.unwrap().to_vec()
}

#[tokio::test]
async fn serves_file_with_md5_etag() {
    let harness = Harness::new();
    let req = Request::get("/favicon.ico").body(()).unwrap();
    match harness.request(req) {
        ServeResult::Served(res) => {
            let expected = format!(
                "\"{:x}-{}\"",
                ICON.len(),
                STANDARD_NO_PAD.encode(Md5::digest(ICON))
            );
            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(res.headers()[header::ETAG], expected.as_str());
            assert_eq!(res.headers()[header::CONTENT_TYPE], "image/x-icon");
            assert_eq!(res.headers()[header::CACHE_CONTROL], "public");
            assert_eq!(
                res.headers()[header::CONTENT_LENGTH],
                ICON.len().to_string().as_str()
            );
            assert_eq!(read_body(res).await, ICON);
        }
        other => panic!("expected a response, got {:?}", other),
    }
}

#[test]
fn refuses_directories_at_construction() {
    let dir = TempDir::new("static-serve-tests").unwrap();
    assert!(matches!(
        SingleFileServer::new(dir.path()),
        Err(BuildError::NotAFile(_))
    ));
    assert!(matches!(
        SingleFileServer::new(dir.path().join("missing.ico")),
        Err(BuildError::Io(_))
    ));
}

#[test]
fn accepts_browser_defaults() {
    let harness = Harness::new();
    let req = Request::get("/favicon.ico")
        .header(header::ACCEPT, "image/avif,image/webp,*/*;q=0.8")
        .header(header::ACCEPT_ENCODING, "gzip, deflate, br")
        .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
        .body(())
        .unwrap();
    assert!(harness.request(req).is_served());
}

#[test]
fn refuses_unacceptable_requests() {
    let harness = Harness::new();
    let cases = [
        (header::ACCEPT, "text/html"),
        (header::ACCEPT_ENCODING, "gzip, identity;q=0"),
        (header::ACCEPT_LANGUAGE, "fr"),
        (header::ACCEPT_CHARSET, "iso-8859-1"),
    ];
    for (name, value) in cases {
        match harness.get_with(name.clone(), value) {
            ServeResult::Failed(err) => {
                assert!(matches!(err, ServeError::NotAcceptable));
                assert_eq!(err.status(), StatusCode::NOT_ACCEPTABLE);
            }
            other => panic!("expected 406 for {}: {}, got {:?}", name, value, other),
        }
    }
}

#[tokio::test]
async fn revalidates_with_etag() {
    let harness = Harness::new();
    let etag = harness.server.etag().to_string();
    match harness.get_with(header::IF_NONE_MATCH, &etag) {
        ServeResult::Served(res) => {
            assert_eq!(res.status(), StatusCode::NOT_MODIFIED);
            assert!(read_body(res).await.is_empty());
        }
        other => panic!("expected a response, got {:?}", other),
    }
}

#[tokio::test]
async fn head_and_options() {
    let harness = Harness::new();

    let req = Request::head("/favicon.ico").body(()).unwrap();
    match harness.request(req) {
        ServeResult::Served(res) => {
            assert_eq!(res.status(), StatusCode::OK);
            assert!(read_body(res).await.is_empty());
        }
        other => panic!("expected a response, got {:?}", other),
    }

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/favicon.ico")
        .body(())
        .unwrap();
    match harness.request(req) {
        ServeResult::Served(res) => assert_eq!(res.headers()[header::ALLOW], "GET,HEAD,OPTIONS"),
        other => panic!("expected a response, got {:?}", other),
    }

    let req = Request::post("/favicon.ico").body(()).unwrap();
    assert!(matches!(
        harness.request(req),
        ServeResult::Failed(ServeError::MethodNotAllowed)
    ));
}

#[test]
fn route_limits_requests() {
    let mut harness = Harness::new();
    harness.server.route("/favicon.ico").cache_control("public, max-age=86400");

    let req = Request::get("/other.ico").body(()).unwrap();
    assert!(matches!(harness.request(req), ServeResult::NotHandled));

    let req = Request::get("/favicon.ico").body(()).unwrap();
    match harness.request(req) {
        ServeResult::Served(res) => {
            assert_eq!(res.headers()[header::CACHE_CONTROL], "public, max-age=86400")
        }
        other => panic!("expected a response, got {:?}", other),
    }
}
