//! Echo server for exercising restclient over real HTTP.
//!
//! `/echo` reflects the request back as JSON so tests can assert on exactly
//! what went over the wire. The other routes serve fixed bodies with chosen
//! content types for response-decoding tests.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "secret";

/// What `/echo` saw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Header names are lowercase.
    pub headers: BTreeMap<String, String>,
    /// Body decoded lossily as UTF-8.
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/json", any(json_body))
        .route("/text/{kind}", get(text_body))
        .route("/protected", get(protected))
        .route("/status/{code}", any(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let echo = Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    tracing::debug!(method = %echo.method, path = %echo.path, body_len = body.len(), "echo");
    Json(echo)
}

async fn json_body() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], r#"{"a": 1}"#)
}

async fn text_body(Path(kind): Path<String>) -> Result<impl IntoResponse, StatusCode> {
    let body = match kind.as_str() {
        "plain" => "Simple response",
        "list" => "[1,2,3]",
        "object" => r#"{"a": 1}"#,
        "broken" => "{not json}",
        _ => return Err(StatusCode::NOT_FOUND),
    };
    Ok(([(header::CONTENT_TYPE, "text/plain")], body))
}

async fn protected(headers: HeaderMap) -> Result<&'static str, StatusCode> {
    let expected = format!("Basic {}", STANDARD.encode(format!("{USERNAME}:{PASSWORD}")));
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok("welcome"),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}
