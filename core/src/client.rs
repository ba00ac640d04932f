//! Request dispatch: the public call surface.
//!
//! # Design
//! A call is split the same way at every level: `build_request` turns a
//! `RequestDescriptor` into an `HttpRequest`, a `Transport` executes it, and
//! `parse_response` turns the `HttpResponse` into `Content`. Nothing is
//! shared between calls. Each synchronous call builds its own
//! `UreqTransport`, and a detached call does the whole sequence on a fresh
//! thread that nobody joins.

use std::thread;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use url::Url;

use crate::body::{encode_body, Payload};
use crate::error::RestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::{normalize_headers, ParamValue, Params};
use crate::transport::{Transport, TransportConfig, UreqTransport};
use crate::types::{Content, Credentials, FileUpload, Outcome, ResponseMeta};

/// Everything needed to build one request. Created per call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: HttpMethod,
    pub params: Params,
    pub files: Vec<(String, FileUpload)>,
    pub headers: Vec<(String, String)>,
    /// Acceptable response media types, most preferred first.
    pub accept: Vec<String>,
    pub credentials: Option<Credentials>,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            params: Params::new(),
            files: Vec::new(),
            headers: Vec::new(),
            accept: Vec::new(),
            credentials: None,
        }
    }
}

/// Per-call options accepted by `get`, `post`, `put`, `delete` and
/// `rest_invoke`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    params: Params,
    files: Vec<(String, FileUpload)>,
    accept: Vec<String>,
    headers: Vec<(String, String)>,
    detach: Option<bool>,
    full_response: bool,
    credentials: Option<Credentials>,
    transport: TransportConfig,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }

    /// Add a file upload. Any file turns the body into multipart/form-data.
    pub fn file(mut self, field: impl Into<String>, upload: FileUpload) -> Self {
        let field = field.into();
        self.files.retain(|(name, _)| *name != field);
        self.files.push((field, upload));
        self
    }

    pub fn accept(mut self, media_type: impl Into<String>) -> Self {
        self.accept.push(media_type.into());
        self
    }

    /// Set a header, replacing any earlier value with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name: String = name.into();
        set_header(&mut self.headers, &name, value.into());
        self
    }

    /// Send the request from a background thread and return at once.
    pub fn detach(mut self, detach: bool) -> Self {
        self.detach = Some(detach);
        self
    }

    /// Return the status and headers along with the content.
    pub fn full_response(mut self, full: bool) -> Self {
        self.full_response = full;
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    pub fn transport(mut self, config: TransportConfig) -> Self {
        self.transport = config;
        self
    }

    pub(crate) fn into_descriptor(self, url: &str, method: HttpMethod) -> (RequestDescriptor, CallSettings) {
        let descriptor = RequestDescriptor {
            url: url.to_string(),
            method,
            params: self.params,
            files: self.files,
            headers: self.headers,
            accept: self.accept,
            credentials: self.credentials,
        };
        let settings = CallSettings {
            detach: self.detach,
            full_response: self.full_response,
            transport: self.transport,
        };
        (descriptor, settings)
    }
}

pub(crate) struct CallSettings {
    detach: Option<bool>,
    full_response: bool,
    transport: TransportConfig,
}

/// GET, synchronous unless `detach(true)` is set.
pub fn get(url: &str, options: RequestOptions) -> Result<Outcome, RestError> {
    invoke(url, HttpMethod::Get, options, false)
}

/// POST. Detached unless `detach(false)` is set.
pub fn post(url: &str, options: RequestOptions) -> Result<Outcome, RestError> {
    invoke(url, HttpMethod::Post, options, true)
}

/// PUT. Detached unless `detach(false)` is set.
pub fn put(url: &str, options: RequestOptions) -> Result<Outcome, RestError> {
    invoke(url, HttpMethod::Put, options, true)
}

/// DELETE. Detached unless `detach(false)` is set.
pub fn delete(url: &str, options: RequestOptions) -> Result<Outcome, RestError> {
    invoke(url, HttpMethod::Delete, options, true)
}

/// General entry point. Synchronous unless `detach(true)` is set.
///
/// Transport failures propagate as they are; there are no retries. A
/// detached call returns `Outcome::Detached` and its failures are only
/// logged.
pub fn rest_invoke(url: &str, method: HttpMethod, options: RequestOptions) -> Result<Outcome, RestError> {
    invoke(url, method, options, false)
}

fn invoke(
    url: &str,
    method: HttpMethod,
    options: RequestOptions,
    detach_by_default: bool,
) -> Result<Outcome, RestError> {
    let (descriptor, settings) = options.into_descriptor(url, method);

    if !settings.detach.unwrap_or(detach_by_default) {
        let transport = UreqTransport::new(&settings.transport)?;
        return invoke_with(&transport, &descriptor, settings.full_response);
    }

    thread::Builder::new()
        .name("restclient-detached".to_string())
        .spawn(move || {
            let result = UreqTransport::new(&settings.transport)
                .and_then(|transport| invoke_with(&transport, &descriptor, settings.full_response));
            if let Err(err) = result {
                tracing::warn!(method = %descriptor.method, url = %descriptor.url, error = %err, "detached request failed");
            }
        })?;
    Ok(Outcome::Detached)
}

/// Build, execute and decode one request over `transport`.
pub fn invoke_with<T: Transport>(
    transport: &T,
    descriptor: &RequestDescriptor,
    full_response: bool,
) -> Result<Outcome, RestError> {
    let request = build_request(descriptor)?;
    tracing::debug!(method = %request.method, url = %request.url, "dispatching request");

    let response = transport.execute(&request)?;
    tracing::debug!(status = response.status, "response received");

    let (meta, content) = parse_response(request.method, response)?;
    Ok(if full_response {
        Outcome::Full(meta, content)
    } else {
        Outcome::Content(content)
    })
}

/// Compose the absolute URL, headers and body for a descriptor.
pub fn build_request(descriptor: &RequestDescriptor) -> Result<HttpRequest, RestError> {
    let mut path = split_url(&descriptor.url)?;

    let mut headers = descriptor.headers.clone();
    let accept = if descriptor.accept.is_empty() {
        "*/*".to_string()
    } else {
        descriptor.accept.join(",")
    };
    set_header(&mut headers, "Accept", accept);

    let payload = encode_body(descriptor.method, &descriptor.params, &descriptor.files, &headers)?;
    let body = match payload {
        Payload::Query(query) => {
            append_query(&mut path, &query);
            None
        }
        Payload::Body(encoded) => {
            set_header(&mut headers, "Content-Type", encoded.content_type);
            Some(encoded.bytes)
        }
    };

    let length = body.as_ref().map_or(0, Vec::len);
    set_header(&mut headers, "Content-Length", length.to_string());

    if let Some(credentials) = &descriptor.credentials {
        set_header(&mut headers, "Authorization", basic_auth(credentials));
    }

    Ok(HttpRequest {
        method: descriptor.method,
        url: path,
        headers: normalize_headers(&headers),
        body,
    })
}

/// Split a response into metadata and content, decoding JSON where the
/// declared type says so or, for GET, where the body looks like it.
pub fn parse_response(method: HttpMethod, response: HttpResponse) -> Result<(ResponseMeta, Content), RestError> {
    let declared_json = response
        .header("Content-Type")
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("application/json"));

    let content = if declared_json && !response.body.is_empty() {
        Content::Json(serde_json::from_slice(&response.body)?)
    } else if method == HttpMethod::Get && looks_like_json(&response.body) {
        sniff_json(response.body)
    } else {
        Content::Raw(response.body)
    };

    let meta = ResponseMeta {
        status: response.status,
        headers: response.headers,
    };
    Ok((meta, content))
}

/// `{...}` or `[...]`, ignoring surrounding whitespace.
fn looks_like_json(body: &[u8]) -> bool {
    let trimmed = body.trim_ascii();
    matches!(
        (trimmed.first(), trimmed.last()),
        (Some(b'{'), Some(b'}')) | (Some(b'['), Some(b']'))
    )
}

/// Best-effort parse. Anything that fails to parse is handed back raw.
fn sniff_json(body: Vec<u8>) -> Content {
    match serde_json::from_slice(&body) {
        Ok(value) => Content::Json(value),
        Err(err) => {
            tracing::debug!(error = %err, "bracketed body is not JSON, returning it raw");
            Content::Raw(body)
        }
    }
}

/// `scheme://host[:port]path[?query]`, dropping any fragment and userinfo.
fn split_url(url: &str) -> Result<String, RestError> {
    let parsed = Url::parse(url)?;
    let mut composed = format!("{}://{}", parsed.scheme(), parsed.host_str().unwrap_or_default());
    if let Some(port) = parsed.port() {
        composed.push_str(&format!(":{port}"));
    }
    composed.push_str(parsed.path());
    if let Some(query) = parsed.query() {
        composed.push('?');
        composed.push_str(query);
    }
    Ok(composed)
}

fn append_query(path: &mut String, query: &str) {
    if query.is_empty() {
        return;
    }
    if !path.contains('?') {
        path.push('?');
    } else if !path.ends_with('?') {
        path.push('&');
    }
    path.push_str(query);
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value));
}

fn basic_auth(credentials: &Credentials) -> String {
    let token = STANDARD.encode(format!("{}:{}", credentials.username, credentials.password));
    format!("Basic {token}")
}
