#![allow(dead_code)]

use portico::cookie::{self, Cookie};
use portico::csrf::{CookieSink, SessionStore};
use portico::http::{Builder, Method, RawRequest};
use portico::security::{HmacSecurity, Security};
use portico::{App, Config, Request};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const KEY: &str = "test-validation-key";

#[derive(Default)]
pub struct MemorySession(Mutex<HashMap<String, String>>);

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.0.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.0.lock().unwrap().insert(key.to_owned(), value);
    }
}

#[derive(Default)]
pub struct CookieJar(Mutex<Vec<Cookie>>);

impl CookieJar {
    pub fn cookies(&self) -> Vec<Cookie> {
        self.0.lock().unwrap().clone()
    }
}

impl CookieSink for CookieJar {
    fn add(&self, cookie: Cookie) {
        self.0.lock().unwrap().push(cookie);
    }
}

/// Print log events of the calling test.
pub fn trace() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

pub fn config() -> Config {
    Config::new().cookie_validation_key(KEY)
}

pub fn app(config: Config) -> Arc<App> {
    Arc::new(App::new(config))
}

pub fn get(target: &str) -> Builder {
    RawRequest::builder().method(Method::GET).target(target)
}

pub fn post(target: &str) -> Builder {
    RawRequest::builder().method(Method::POST).target(target)
}

pub fn request(builder: Builder) -> Request {
    app(config()).request(builder.build().unwrap())
}

pub fn signed(name: &str, value: &str) -> String {
    cookie::sign_cookie(&HmacSecurity::new(), KEY, name, value).unwrap()
}

pub fn mask(token: &str) -> String {
    HmacSecurity::new().mask_token(token).unwrap()
}

pub fn unmask(token: &str) -> String {
    HmacSecurity::new().unmask_token(token).unwrap()
}
