mod common;

use common::{app, get, request, signed, trace, KEY};

use portico::cookie;
use portico::security::{HmacSecurity, Security};
use portico::Config;

#[test]
fn authenticated_cookies_load() {
    let req = request(get("/").cookie("session_id", signed("session_id", "abc123")));

    let cookies = req.cookies().unwrap();
    let cookie = cookies.get("session_id").unwrap();
    assert_eq!(cookie.name, "session_id");
    assert_eq!(cookie.value, "abc123");
    assert_eq!(cookie.expire, None);
    assert_eq!(cookies.value("session_id"), Some("abc123"));
}

#[test]
fn tampered_cookies_are_dropped() {
    trace();

    let mut value = signed("session_id", "abc123").into_bytes();
    let last = value.len() - 3;
    value[last] ^= 0x01;
    let tampered = String::from_utf8(value).unwrap();

    let req = request(
        get("/")
            .cookie("session_id", tampered)
            .cookie("theme", signed("theme", "dark")),
    );

    let cookies = req.cookies().unwrap();
    assert!(!cookies.contains("session_id"));
    assert_eq!(cookies.value("theme"), Some("dark"));
    assert_eq!(cookies.len(), 1);
}

#[test]
fn cookies_signed_for_another_name_are_dropped() {
    let req = request(get("/").cookie("admin", signed("user", "1")));
    assert!(req.cookies().unwrap().is_empty());
}

#[test]
fn cookies_signed_with_another_key_are_dropped() {
    let forged = cookie::sign_cookie(&HmacSecurity::new(), "other-key", "user", "1").unwrap();
    let req = request(get("/").cookie("user", forged));
    assert!(req.cookies().unwrap().is_empty());
}

#[test]
fn malformed_payloads_are_dropped() {
    let security = HmacSecurity::new();
    let not_a_pair = security.hash_data("\"abc\"", KEY).unwrap();
    let unsigned = "plain-value";

    let req = request(get("/").cookie("a", not_a_pair).cookie("b", unsigned));
    assert!(req.cookies().unwrap().is_empty());
}

#[test]
fn validation_disabled_keeps_raw_values() {
    let app = app(Config::new().enable_cookie_validation(false));
    let req = app.request(get("/").cookie("theme", "dark").build().unwrap());

    let cookies = req.cookies().unwrap();
    assert_eq!(cookies.value("theme"), Some("dark"));
    assert!(cookies.iter().all(|cookie| cookie.expire.is_none()));
}

#[test]
fn missing_validation_key_is_a_config_error() {
    let app = app(Config::new());
    let req = app.request(get("/").cookie("theme", "dark").build().unwrap());

    let err = req.cookies().unwrap_err();
    assert!(err.is_config());
    assert_eq!(err.status(), 500);
}

#[test]
fn cookies_are_loaded_once() {
    let req = request(get("/").cookie("a", signed("a", "1")));
    let first = req.cookies().unwrap();
    assert!(std::ptr::eq(first, req.cookies().unwrap()));
}
