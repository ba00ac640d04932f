//! Value types flowing in and out of a restclient call.

use serde_json::Value;

use crate::http::find_header;

/// A file to upload as part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub content: Vec<u8>,
    pub filename: String,
}

impl FileUpload {
    pub fn new(content: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            filename: filename.into(),
        }
    }
}

/// Username and password for HTTP basic authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Response content, decoded when it looked like JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Json(Value),
    Raw(Vec<u8>),
}

impl Content {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Content::Json(value) => Some(value),
            Content::Raw(_) => None,
        }
    }

    /// Raw content as UTF-8 text, if it is raw and valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Raw(bytes) => std::str::from_utf8(bytes).ok(),
            Content::Json(_) => None,
        }
    }
}

/// Status and headers of a response, returned when the caller asks for the
/// full response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl ResponseMeta {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// What a call hands back to its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The request was sent from a background thread. Nothing about its
    /// result is observable.
    Detached,
    Content(Content),
    Full(ResponseMeta, Content),
}

impl Outcome {
    /// The content, unless the call was detached.
    pub fn content(&self) -> Option<&Content> {
        match self {
            Outcome::Detached => None,
            Outcome::Content(content) | Outcome::Full(_, content) => Some(content),
        }
    }

    pub fn into_content(self) -> Option<Content> {
        match self {
            Outcome::Detached => None,
            Outcome::Content(content) | Outcome::Full(_, content) => Some(content),
        }
    }

    pub fn meta(&self) -> Option<&ResponseMeta> {
        match self {
            Outcome::Full(meta, _) => Some(meta),
            _ => None,
        }
    }
}
