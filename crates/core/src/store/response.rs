//! Stored responses: a header set plus an opaque body.

use std::collections::{BTreeMap, BTreeSet};

use base64::{Engine, engine::general_purpose::STANDARD};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Response body, passed through the cache unmodified.
///
/// Serialized as `{"type": "text", "data": "..."}` or
/// `{"type": "binary", "data": "<base64>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Body {
    Text(String),
    Binary(
        #[serde(with = "base64_bytes")]
        #[schemars(with = "String")]
        Vec<u8>,
    ),
}

impl Body {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Text(text) => text.as_bytes(),
            Body::Binary(bytes) => bytes,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Body::Text(_) => "text",
            Body::Binary(_) => "binary",
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebuild a body from its stored kind tag and raw bytes.
    pub(crate) fn from_stored(kind: &str, bytes: Vec<u8>) -> Result<Self, Error> {
        match kind {
            "text" => String::from_utf8(bytes)
                .map(Body::Text)
                .map_err(|e| Error::CorruptEntry(format!("text body is not UTF-8: {e}"))),
            "binary" => Ok(Body::Binary(bytes)),
            other => Err(Error::CorruptEntry(format!("unknown body kind `{other}`"))),
        }
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Binary(bytes)
    }
}

pub(crate) mod base64_bytes {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}

/// Header name to value mapping attached to a stored response.
///
/// Names keep the casing they were written with; [`Headers::get`] compares
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// A header set holding only `Content-Type`.
    pub fn content_type(value: &str) -> Self {
        let mut headers = Self::new();
        headers.insert("Content-Type", value);
        headers
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject names that are not HTTP tokens, names repeated under different
    /// casing, and values with CR, LF or NUL.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen = BTreeSet::new();
        for (name, value) in &self.0 {
            if name.is_empty() || !name.bytes().all(is_token_byte) {
                return Err(Error::InvalidHeader(format!("invalid header name `{name}`")));
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(Error::InvalidHeader(format!("duplicate header `{name}`")));
            }
            if value.bytes().any(|b| matches!(b, b'\r' | b'\n' | b'\0')) {
                return Err(Error::InvalidHeader(format!("invalid value for header `{name}`")));
            }
        }
        Ok(())
    }
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

impl From<BTreeMap<String, String>> for Headers {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A response as held by a content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StoredResponse {
    pub headers: Headers,
    pub body: Body,
}

impl StoredResponse {
    /// Build a response, rejecting malformed headers.
    pub fn new(headers: Headers, body: Body) -> Result<Self, Error> {
        headers.validate()?;
        Ok(Self { headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_case_insensitive_get() {
        let headers = Headers::content_type("text/html");
        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(headers.get("etag"), None);
    }

    #[test]
    fn test_headers_reject_bad_name() {
        let headers: Headers = [("Bad Header", "x")].into_iter().collect();
        assert!(matches!(StoredResponse::new(headers, Body::from("")), Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn test_headers_reject_newline_value() {
        let headers: Headers = [("X-Test", "a\r\nSet-Cookie: b")].into_iter().collect();
        assert!(matches!(headers.validate(), Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn test_headers_reject_case_insensitive_duplicates() {
        let headers: Headers = [("content-type", "text/html"), ("Content-Type", "image/png")].into_iter().collect();
        assert_eq!(headers.len(), 2);
        assert!(matches!(headers.validate(), Err(Error::InvalidHeader(ref msg)) if msg.contains("duplicate")));
        assert!(StoredResponse::new(headers, Body::from("")).is_err());
    }

    #[test]
    fn test_empty_headers_are_valid() {
        assert!(StoredResponse::new(Headers::new(), Body::Binary(vec![1, 2])).is_ok());
    }

    #[test]
    fn test_body_json_shape() {
        let text = serde_json::to_value(Body::from("<p>hi</p>")).unwrap();
        assert_eq!(text, serde_json::json!({"type": "text", "data": "<p>hi</p>"}));

        let binary = serde_json::to_value(Body::Binary(vec![0x89, b'P', b'N', b'G'])).unwrap();
        assert_eq!(binary, serde_json::json!({"type": "binary", "data": "iVBORw=="}));

        let back: Body = serde_json::from_value(binary).unwrap();
        assert_eq!(back, Body::Binary(vec![0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_body_from_stored() {
        assert_eq!(Body::from_stored("text", b"hi".to_vec()).unwrap(), Body::from("hi"));
        assert!(matches!(Body::from_stored("text", vec![0xff, 0xfe]), Err(Error::CorruptEntry(_))));
        assert!(matches!(Body::from_stored("video", vec![]), Err(Error::CorruptEntry(_))));
    }
}
