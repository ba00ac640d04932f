//! Convenience REST client.
//!
//! # Overview
//! Issues GET/POST/PUT/DELETE requests with parameters, file uploads,
//! Accept and custom headers, and basic auth. JSON-looking responses come
//! back decoded. Any call can be detached onto a background thread whose
//! result nobody observes.
//!
//! ```no_run
//! use restclient::{get, post, FileUpload, RequestOptions};
//!
//! let _content = get("http://localhost:3000/echo", RequestOptions::new().param("q", "rust"))?;
//!
//! post(
//!     "http://localhost:3000/upload",
//!     RequestOptions::new()
//!         .file("image", FileUpload::new(std::fs::read("sample.jpg")?, "sample.jpg"))
//!         .detach(false),
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Design
//! - Every call is independent: it builds its own `RequestDescriptor` and
//!   its own transport. There is no shared state to lock.
//! - Request construction (`build_request`) and response decoding
//!   (`parse_response`) are pure and sit either side of the `Transport`
//!   trait, so they are tested without a network.
//! - `post`, `put` and `delete` detach by default; `get` and `rest_invoke`
//!   wait for the response.

pub mod body;
pub mod callback;
pub mod client;
pub mod error;
pub mod http;
pub mod multipart;
pub mod params;
pub mod transport;
pub mod types;

pub use body::{encode_body, EncodedBody, Payload};
pub use callback::{invoke_callback, HttpCallback};
pub use client::{
    build_request, delete, get, invoke_with, parse_response, post, put, rest_invoke, RequestDescriptor,
    RequestOptions,
};
pub use error::RestError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use multipart::{content_type_for, encode_multipart, BOUNDARY};
pub use params::{normalize_headers, normalize_params, ParamValue, Params};
pub use transport::{Transport, TransportConfig, UreqTransport};
pub use types::{Content, Credentials, FileUpload, Outcome, ResponseMeta};
