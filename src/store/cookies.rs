//! Path-scoped cookie jar used for the websocket token.
//! Only the pieces the session layer needs: put/get/remove and a `Cookie`
//! header for a request path.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    /// Cookie is only sent for request paths under this prefix.
    pub path: Option<String>,
}

impl CookieOptions {
    pub fn with_path(path: impl Into<String>) -> Self {
        Self { path: Some(path.into()) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

impl Cookie {
    /// `name=value` pair as sent in a `Cookie` header.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// RFC 6265 path-match: equal, or a prefix ending at a `/` boundary.
    pub fn matches_path(&self, request_path: &str) -> bool {
        let Some(scope) = self.options.path.as_deref() else { return true; };
        if request_path == scope {
            return true;
        }
        if let Some(rest) = request_path.strip_prefix(scope) {
            return scope.ends_with('/') || rest.starts_with('/');
        }
        false
    }
}

pub trait CookieJar: Send + Sync {
    fn put(&self, name: &str, value: &str, options: CookieOptions);
    fn get(&self, name: &str) -> Option<Cookie>;
    /// Returns true if the cookie existed.
    fn remove(&self, name: &str) -> bool;

    /// `Cookie` header value for a request to `request_path`, if any cookie applies.
    fn header_for(&self, request_path: &str) -> Option<String>;
}

#[derive(Clone, Default)]
pub struct MemoryCookieJar {
    cookies: Arc<RwLock<BTreeMap<String, Cookie>>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self { Self::default() }
    pub fn len(&self) -> usize { self.cookies.read().len() }
    pub fn is_empty(&self) -> bool { self.cookies.read().is_empty() }
}

impl CookieJar for MemoryCookieJar {
    fn put(&self, name: &str, value: &str, options: CookieOptions) {
        let cookie = Cookie { name: name.to_string(), value: value.to_string(), options };
        self.cookies.write().insert(name.to_string(), cookie);
    }

    fn get(&self, name: &str) -> Option<Cookie> {
        self.cookies.read().get(name).cloned()
    }

    fn remove(&self, name: &str) -> bool {
        self.cookies.write().remove(name).is_some()
    }

    fn header_for(&self, request_path: &str) -> Option<String> {
        let pairs: Vec<String> = self
            .cookies
            .read()
            .values()
            .filter(|c| c.matches_path(request_path))
            .map(Cookie::pair)
            .collect();
        if pairs.is_empty() { None } else { Some(pairs.join("; ")) }
    }
}
