//! Request body encoding.
//!
//! # Design
//! Exactly one strategy is picked per request, in priority order:
//! 1. any file upload forces `multipart/form-data`, whatever Content-Type
//!    the caller declared;
//! 2. POST/PUT with a declared `application/json` Content-Type get the
//!    parameters as a JSON object;
//! 3. everything else is `application/x-www-form-urlencoded`, which GET and
//!    DELETE carry in the query string instead of a body.

use url::form_urlencoded;

use crate::error::RestError;
use crate::http::{find_header, HttpMethod};
use crate::multipart::encode_multipart;
use crate::params::{normalize_params, Params};
use crate::types::FileUpload;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A content type and the bytes it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Where the encoded parameters end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Form-encoded parameters to append to the path. No body is sent.
    Query(String),
    Body(EncodedBody),
}

/// Pick an encoding strategy and apply it.
pub fn encode_body(
    method: HttpMethod,
    params: &Params,
    files: &[(String, FileUpload)],
    headers: &[(String, String)],
) -> Result<Payload, RestError> {
    if !files.is_empty() {
        return Ok(Payload::Body(encode_multipart(&normalize_params(params), files)));
    }

    let declared = find_header(headers, "Content-Type");

    if method.accepts_json_body() {
        if let Some(content_type) = declared.filter(|ct| is_json_media_type(ct)) {
            return Ok(Payload::Body(EncodedBody {
                content_type: content_type.to_string(),
                bytes: serde_json::to_vec(params)?,
            }));
        }
    }

    let form = urlencode(params);
    if method.params_in_query() {
        return Ok(Payload::Query(form));
    }

    Ok(Payload::Body(EncodedBody {
        content_type: declared.unwrap_or(FORM_URLENCODED).to_string(),
        bytes: form.into_bytes(),
    }))
}

/// `application/x-www-form-urlencoded` serialization of the parameters.
pub fn urlencode(params: &Params) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(normalize_params(params).iter())
        .finish()
}

/// True when the media type (ignoring parameters and case) is
/// `application/json`.
pub fn is_json_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/json"))
}
