//! Declared method table of the exported service.

use serde::Serialize;

/// Kind of a positional argument at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    /// A JSON string.
    String,
    /// A JSON object whose values are all strings.
    Object,
    /// A JSON string (text) or a tagged body object.
    Content,
    /// Base64-encoded bytes, or an array of byte values.
    Blob,
}

impl ArgKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgKind::String => "string",
            ArgKind::Object => "object",
            ArgKind::Content => "content",
            ArgKind::Blob => "blob",
        }
    }
}

/// One exported method and the kinds of its positional arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MethodSpec {
    pub name: &'static str,
    pub args: &'static [ArgKind],
}

pub const CONTRACT: &[MethodSpec] = &[
    MethodSpec { name: "listContent", args: &[] },
    MethodSpec { name: "evict", args: &[] },
    MethodSpec { name: "remove", args: &[ArgKind::String] },
    MethodSpec { name: "add", args: &[ArgKind::String, ArgKind::Object, ArgKind::Content] },
    MethodSpec { name: "addHtml", args: &[ArgKind::String, ArgKind::String] },
    MethodSpec { name: "addPng", args: &[ArgKind::String, ArgKind::Blob] },
];

pub fn method_spec(name: &str) -> Option<&'static MethodSpec> {
    CONTRACT.iter().find(|spec| spec.name == name)
}
