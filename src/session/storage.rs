use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tower_cookies::{Cookie, Cookies, Key};

/// Durable string store the session is persisted into.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// Shared in-process storage; clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Browser cookie storage. Values are URL-encoded so JSON survives the
/// cookie value grammar, and signed so a client cannot rewrite them.
#[derive(Clone)]
pub struct CookieStorage {
    cookies: Cookies,
    key: Key,
}

impl CookieStorage {
    pub fn new(cookies: Cookies, key: Key) -> Self {
        Self { cookies, key }
    }
}

impl SessionStorage for CookieStorage {
    fn get(&self, key: &str) -> Option<String> {
        // Cookies with a missing or bad signature read as absent.
        let cookie = self.cookies.signed(&self.key).get(key)?;
        urlencoding::decode(cookie.value())
            .ok()
            .map(|value| value.into_owned())
    }

    fn set(&self, key: &str, value: String) {
        let cookie = Cookie::build((key.to_string(), urlencoding::encode(&value).into_owned()))
            .path("/")
            .http_only(true)
            .max_age(time::Duration::hours(24))
            .build();
        self.cookies.signed(&self.key).add(cookie);
    }

    fn remove(&self, key: &str) {
        self.cookies
            .signed(&self.key)
            .remove(Cookie::build((key.to_string(), "")).path("/").build());
    }
}
