//! Request identities used as cache keys.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Method used when a caller does not supply one.
pub const DEFAULT_METHOD: &str = "GET";

/// The `(method, url)` pair a response is stored under.
///
/// URL fragments never reach the server, so they are dropped when the
/// identity is built. Absolute URLs are parsed and re-serialized; relative
/// URLs (e.g. `/page.html`) are kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct RequestIdentity {
    /// Uppercase HTTP method.
    pub method: String,
    /// Request URL without fragment.
    pub url: String,
}

impl RequestIdentity {
    pub fn new(method: &str, url: &str) -> Self {
        let method = method.trim();
        let method = if method.is_empty() { DEFAULT_METHOD.to_string() } else { method.to_ascii_uppercase() };
        Self { method, url: strip_fragment(url) }
    }

    /// Identity for a `GET` of `url`.
    pub fn get(url: &str) -> Self {
        Self::new(DEFAULT_METHOD, url)
    }

    /// The URL with its query string removed.
    pub fn normalized_url(&self) -> String {
        normalize_url(&self.url)
    }
}

impl std::fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

fn strip_fragment(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.split_once('#').map_or(url, |(head, _)| head).to_string(),
    }
}

/// Drop the query string and fragment from `url`.
pub fn normalize_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.set_query(None);
            parsed.to_string()
        }
        Err(_) => {
            let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
            without_fragment.split_once('?').map_or(without_fragment, |(head, _)| head).to_string()
        }
    }
}
