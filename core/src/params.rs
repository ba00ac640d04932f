//! Parameter and header normalization.
//!
//! # Design
//! Parameters are an explicit set of scalar kinds with a defined string
//! projection instead of a stringify-anything fallback. Keys are `String`,
//! so non-ASCII content is already held as UTF-8 and passes through intact;
//! percent-encoding later works on those UTF-8 bytes.
//!
//! Headers are stricter: the transport only carries ASCII header text, so
//! anything outside that range is dropped rather than escaped. Neither
//! normalization can fail.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};

/// Parameter mapping sent with a request.
pub type Params = BTreeMap<String, ParamValue>;

/// A scalar parameter value.
///
/// Serializes as the bare JSON scalar. NaN and the infinities have no JSON
/// form and fail to serialize.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Text(s) => serializer.serialize_str(s),
            ParamValue::Int(n) => serializer.serialize_i64(*n),
            ParamValue::Float(x) if x.is_finite() => serializer.serialize_f64(*x),
            ParamValue::Float(x) => Err(S::Error::custom(format!("{x} has no JSON representation"))),
            ParamValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        ParamValue::Int(n.into())
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        ParamValue::Int(n.into())
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Float(x)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

/// Project every parameter to a `(key, value)` string pair.
pub fn normalize_params(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), v.to_string()))
        .collect()
}

/// Strip non-ASCII characters from header names and values.
///
/// A header whose name is empty once stripped is omitted.
pub fn normalize_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(k, v)| {
            let name = ascii_only(k);
            if name.is_empty() {
                tracing::debug!(header = %k, "dropping header with no ASCII name");
                return None;
            }
            Some((name, ascii_only(v)))
        })
        .collect()
}

fn ascii_only(s: &str) -> String {
    s.chars().filter(char::is_ascii).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_kinds_project_to_strings() {
        let mut params = Params::new();
        params.insert("count".to_string(), 3.into());
        params.insert("ratio".to_string(), 0.5.into());
        params.insert("flag".to_string(), true.into());
        params.insert("name".to_string(), "anders".into());

        let normalized = normalize_params(&params);
        assert_eq!(
            normalized,
            vec![
                ("count".to_string(), "3".to_string()),
                ("flag".to_string(), "true".to_string()),
                ("name".to_string(), "anders".to_string()),
                ("ratio".to_string(), "0.5".to_string()),
            ]
        );
    }

    #[test]
    fn non_ascii_params_keep_their_utf8_content() {
        let mut params = Params::new();
        params.insert("foo\u{2012}".to_string(), "\u{2012}".into());

        let normalized = normalize_params(&params);
        let (k, v) = &normalized[0];
        assert_eq!(k.as_bytes(), "foo\u{2012}".as_bytes());
        assert_eq!(String::from_utf8(v.as_bytes().to_vec()).unwrap(), "\u{2012}");
    }

    #[test]
    fn headers_drop_non_ascii_characters() {
        let headers = vec![("foo\u{2012}".to_string(), "foo\u{2012}bar".to_string())];
        assert_eq!(
            normalize_headers(&headers),
            vec![("foo".to_string(), "foobar".to_string())]
        );
    }

    #[test]
    fn ascii_headers_pass_through() {
        let headers = vec![("X-Token".to_string(), "abc 123".to_string())];
        assert_eq!(normalize_headers(&headers), headers);
    }

    #[test]
    fn header_with_only_non_ascii_name_is_omitted() {
        let headers = vec![
            ("\u{2012}\u{2013}".to_string(), "value".to_string()),
            ("Accept".to_string(), "*/*".to_string()),
        ];
        assert_eq!(
            normalize_headers(&headers),
            vec![("Accept".to_string(), "*/*".to_string())]
        );
    }

    #[test]
    fn param_values_serialize_as_native_json_scalars() {
        let mut params = Params::new();
        params.insert("n".to_string(), 1.into());
        params.insert("b".to_string(), false.into());
        params.insert("s".to_string(), "x".into());
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({"n": 1, "b": false, "s": "x"}));
    }

    #[test]
    fn non_finite_floats_do_not_serialize() {
        for x in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut params = Params::new();
            params.insert("x".to_string(), x.into());
            assert!(serde_json::to_vec(&params).is_err(), "{x} serialized");
        }
    }
}
