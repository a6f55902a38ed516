use std::sync::Arc;

use hyper::header::{self, HeaderValue};
use hyper::service::Service;
use hyper::{Body, Method};
use portico::cookie::Cookie;
use portico::{App, Config, Request};
use portico_hyper::{buffer, set_cookie_header, PorticoService};

fn app() -> Arc<App> {
    Arc::new(App::new(Config::new().cookie_validation_key("hyper-key")))
}

#[tokio::test]
async fn buffers_requests() {
    let req = hyper::Request::builder()
        .method(Method::POST)
        .uri("/posts/1?page=2")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded; charset=UTF-8")
        .header(header::COOKIE, "theme=dark; lang=en%2DUS")
        .body(Body::from("title=Hello+World&tag=rust"))
        .unwrap();

    let raw = buffer(req, Some(([127, 0, 0, 1], 4000).into()), Some(8080))
        .await
        .unwrap();

    assert_eq!(raw.method(), &Method::POST);
    assert_eq!(raw.request_uri(), "/posts/1");
    assert_eq!(raw.query_string(), Some("page=2"));
    assert_eq!(raw.form().get("title").map(String::as_str), Some("Hello World"));
    assert_eq!(raw.form().get("tag").map(String::as_str), Some("rust"));
    assert_eq!(raw.cookies().get("theme").map(String::as_str), Some("dark"));
    assert_eq!(raw.cookies().get("lang").map(String::as_str), Some("en-US"));
    assert_eq!(raw.remote_addr(), Some("127.0.0.1"));
    assert_eq!(raw.server_port(), Some(8080));
    assert_eq!(&raw.body()[..], b"title=Hello+World&tag=rust");
}

#[tokio::test]
async fn form_fields_are_only_decoded_for_forms() {
    let req = hyper::Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"a":1}"#))
        .unwrap();

    let raw = buffer(req, None, None).await.unwrap();
    assert!(raw.form().is_empty());
    assert_eq!(raw.query_string(), None);
}

#[test]
fn renders_set_cookie_headers() {
    let app = Arc::new(App::new(Config::new().enable_cookie_validation(false)));

    let cookie = Cookie {
        path: Some(String::from("/")),
        secure: true,
        http_only: true,
        ..Cookie::new("theme", "dark mode")
    };

    let header = set_cookie_header(&app, &cookie).unwrap();
    assert_eq!(header, "theme=dark%20mode; Path=/; Secure; HttpOnly");
}

#[test]
fn signing_requires_a_key() {
    let app = Arc::new(App::new(Config::new()));
    assert!(set_cookie_header(&app, &Cookie::new("a", "b")).is_err());
}

#[tokio::test]
async fn csrf_round_trip() {
    let handler = |mut req: Request| {
        let token = req.csrf_token(false).map(str::to_owned).unwrap_or_default();
        let valid = req.validate_csrf_token(None).unwrap_or(false);
        hyper::Response::new(Body::from(format!("{} {}", token, valid)))
    };

    let mut service = PorticoService::new(app(), handler);

    let resp = service
        .call(hyper::Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_owned();
    assert!(set_cookie.starts_with("_csrf="));
    assert!(set_cookie.contains("; Path=/"));
    assert!(set_cookie.contains("; HttpOnly"));

    let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    let (token, valid) = body.split_once(' ').unwrap();
    assert_eq!(valid, "true");

    let cookie = set_cookie.split(';').next().unwrap();

    let post = hyper::Request::post("/")
        .header(header::COOKIE, HeaderValue::from_str(cookie).unwrap())
        .header("X-CSRF-Token", token)
        .body(Body::empty())
        .unwrap();

    let resp = service.call(post).await.unwrap();
    assert!(resp.headers().get(header::SET_COOKIE).is_none());

    let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    assert!(body.ends_with(b" true"));

    let forged = hyper::Request::post("/")
        .header(header::COOKIE, HeaderValue::from_str(cookie).unwrap())
        .header("X-CSRF-Token", "forged")
        .body(Body::empty())
        .unwrap();

    let resp = service.call(forged).await.unwrap();
    let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    assert!(body.ends_with(b" false"));
}
