//! Decoding positional remote calls into typed invocations.

use base64::{Engine, engine::general_purpose::STANDARD};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::contract::{ArgKind, MethodSpec, method_spec};
use crate::Error;
use crate::store::{Body, Headers};

/// A fully decoded call to one of the exported methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    ListContent,
    Evict,
    Remove { url: String },
    Add { url: String, headers: Headers, content: Body },
    AddHtml { url: String, content: String },
    AddPng { url: String, content: Vec<u8> },
}

/// Content as accepted at the service boundary: a plain string is text,
/// anything else must be a tagged [`Body`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ContentArg {
    Text(String),
    Tagged(Body),
}

impl From<ContentArg> for Body {
    fn from(arg: ContentArg) -> Self {
        match arg {
            ContentArg::Text(text) => Body::Text(text),
            ContentArg::Tagged(body) => body,
        }
    }
}

/// A positional argument after its kind has been checked.
enum Arg {
    String(String),
    Object(Headers),
    Content(Body),
    Blob(Vec<u8>),
}

impl Invocation {
    /// Contract name of the method this invocation targets.
    pub fn method(&self) -> &'static str {
        match self {
            Invocation::ListContent => "listContent",
            Invocation::Evict => "evict",
            Invocation::Remove { .. } => "remove",
            Invocation::Add { .. } => "add",
            Invocation::AddHtml { .. } => "addHtml",
            Invocation::AddPng { .. } => "addPng",
        }
    }

    /// Decode a call given as a method name and positional JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns `Error::ContractViolation` if the method is not exported, the
    /// argument count differs from the declared arity, or an argument does
    /// not have its declared kind. Argument values are not validated further.
    pub fn from_positional(method: &str, args: Vec<Value>) -> Result<Self, Error> {
        let spec = method_spec(method).ok_or_else(|| Error::ContractViolation(format!("unknown method `{method}`")))?;

        if args.len() != spec.args.len() {
            return Err(Error::ContractViolation(format!(
                "`{}` expects {} argument(s), got {}",
                spec.name,
                spec.args.len(),
                args.len()
            )));
        }

        let mut decoded = args
            .into_iter()
            .zip(spec.args)
            .enumerate()
            .map(|(index, (value, kind))| decode_arg(spec, index, *kind, value))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter();

        let invocation = match (spec.name, decoded.next(), decoded.next(), decoded.next()) {
            ("listContent", None, None, None) => Invocation::ListContent,
            ("evict", None, None, None) => Invocation::Evict,
            ("remove", Some(Arg::String(url)), None, None) => Invocation::Remove { url },
            ("add", Some(Arg::String(url)), Some(Arg::Object(headers)), Some(Arg::Content(content))) => {
                Invocation::Add { url, headers, content }
            }
            ("addHtml", Some(Arg::String(url)), Some(Arg::String(content)), None) => {
                Invocation::AddHtml { url, content }
            }
            ("addPng", Some(Arg::String(url)), Some(Arg::Blob(content)), None) => Invocation::AddPng { url, content },
            _ => return Err(Error::ContractViolation(format!("`{}` arguments do not match its declaration", spec.name))),
        };

        Ok(invocation)
    }
}

fn decode_arg(spec: &MethodSpec, index: usize, kind: ArgKind, value: Value) -> Result<Arg, Error> {
    let mismatch = |expected: &str| {
        Error::ContractViolation(format!("argument {} of `{}` must be {expected}", index + 1, spec.name))
    };

    match (kind, value) {
        (ArgKind::String, Value::String(s)) => Ok(Arg::String(s)),
        (ArgKind::String, _) => Err(mismatch("a string")),

        (ArgKind::Object, Value::Object(map)) => map
            .into_iter()
            .map(|(name, value)| match value {
                Value::String(v) => Ok((name, v)),
                _ => Err(mismatch("an object of string values")),
            })
            .collect::<Result<Headers, _>>()
            .map(Arg::Object),
        (ArgKind::Object, _) => Err(mismatch("an object")),

        (ArgKind::Content, value @ (Value::String(_) | Value::Object(_))) => serde_json::from_value::<ContentArg>(value)
            .map(|content| Arg::Content(content.into()))
            .map_err(|_| mismatch("a string or a {\"type\", \"data\"} body")),
        (ArgKind::Content, _) => Err(mismatch("a string or a body object")),

        (ArgKind::Blob, Value::String(s)) => STANDARD
            .decode(s.as_bytes())
            .map(Arg::Blob)
            .map_err(|_| mismatch("base64-encoded bytes")),
        (ArgKind::Blob, value @ Value::Array(_)) => serde_json::from_value::<Vec<u8>>(value)
            .map(Arg::Blob)
            .map_err(|_| mismatch("an array of byte values")),
        (ArgKind::Blob, _) => Err(mismatch("a binary blob")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_no_arg_methods() {
        assert_eq!(Invocation::from_positional("listContent", vec![]).unwrap(), Invocation::ListContent);
        assert_eq!(Invocation::from_positional("evict", vec![]).unwrap(), Invocation::Evict);
    }

    #[test]
    fn test_decode_add() {
        let invocation = Invocation::from_positional(
            "add",
            vec![json!("/a.html"), json!({"Content-Type": "text/html"}), json!("<p>hi</p>")],
        )
        .unwrap();

        assert_eq!(
            invocation,
            Invocation::Add {
                url: "/a.html".into(),
                headers: Headers::content_type("text/html"),
                content: Body::from("<p>hi</p>"),
            }
        );
        assert_eq!(invocation.method(), "add");
    }

    #[test]
    fn test_decode_add_tagged_binary() {
        let invocation = Invocation::from_positional(
            "add",
            vec![json!("/img"), json!({}), json!({"type": "binary", "data": "AQID"})],
        )
        .unwrap();
        assert!(matches!(invocation, Invocation::Add { content: Body::Binary(bytes), .. } if bytes == vec![1, 2, 3]));
    }

    #[test]
    fn test_decode_add_png_base64_and_array() {
        let from_b64 = Invocation::from_positional("addPng", vec![json!("/img.png"), json!("AQID")]).unwrap();
        let from_array = Invocation::from_positional("addPng", vec![json!("/img.png"), json!([1, 2, 3])]).unwrap();
        let expected = Invocation::AddPng { url: "/img.png".into(), content: vec![1, 2, 3] };
        assert_eq!(from_b64, expected);
        assert_eq!(from_array, expected);
    }

    #[test]
    fn test_content_arg_accepts_both_forms() {
        let text: ContentArg = serde_json::from_value(json!("<p>hi</p>")).unwrap();
        assert_eq!(Body::from(text), Body::from("<p>hi</p>"));

        let tagged: ContentArg = serde_json::from_value(json!({"type": "binary", "data": "AQID"})).unwrap();
        assert_eq!(Body::from(tagged), Body::Binary(vec![1, 2, 3]));

        assert!(serde_json::from_value::<ContentArg>(json!({"type": "video", "data": "x"})).is_err());
        assert!(serde_json::from_value::<ContentArg>(json!(7)).is_err());
    }

    #[test]
    fn test_unknown_method() {
        let err = Invocation::from_positional("purge", vec![]).unwrap_err();
        assert!(matches!(err, Error::ContractViolation(msg) if msg.contains("purge")));
    }

    #[test]
    fn test_wrong_arity() {
        let err = Invocation::from_positional("remove", vec![]).unwrap_err();
        assert!(matches!(err, Error::ContractViolation(msg) if msg.contains("expects 1")));

        let err = Invocation::from_positional("evict", vec![json!("/extra")]).unwrap_err();
        assert!(matches!(err, Error::ContractViolation(_)));
    }

    #[test]
    fn test_wrong_kinds() {
        assert!(matches!(
            Invocation::from_positional("remove", vec![json!(42)]),
            Err(Error::ContractViolation(_))
        ));
        assert!(matches!(
            Invocation::from_positional("add", vec![json!("/a"), json!({"X-Count": 1}), json!("x")]),
            Err(Error::ContractViolation(_))
        ));
        assert!(matches!(
            Invocation::from_positional("addHtml", vec![json!("/a"), json!({"html": "x"})]),
            Err(Error::ContractViolation(_))
        ));
        assert!(matches!(
            Invocation::from_positional("addPng", vec![json!("/a"), json!("not base64!")]),
            Err(Error::ContractViolation(_))
        ));
        assert!(matches!(
            Invocation::from_positional("addPng", vec![json!("/a"), json!([1, 300])]),
            Err(Error::ContractViolation(_))
        ));
    }

    #[test]
    fn test_values_are_not_validated() {
        let invocation = Invocation::from_positional("remove", vec![json!("not a url at all")]).unwrap();
        assert_eq!(invocation, Invocation::Remove { url: "not a url at all".into() });
    }
}
