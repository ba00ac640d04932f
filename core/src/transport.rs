//! The HTTP transport seam.
//!
//! # Design
//! `Transport` executes one `HttpRequest` and returns the `HttpResponse`
//! as data. `UreqTransport` is the default: a fresh `ureq::Agent` built from
//! a `TransportConfig` for every call, so settings such as the debug level
//! belong to that one call and never leak into others. Non-2xx statuses are
//! returned as responses, not errors.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ureq::tls::{parse_pem, Certificate, PemItem, RootCerts, TlsConfig};
use ureq::{Agent, RequestBuilder};

use crate::error::RestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

const ENV_CA_CERTS: &str = "RESTCLIENT_CA_CERTS";
const ENV_TIMEOUT_SECS: &str = "RESTCLIENT_TIMEOUT_SECS";
const ENV_DEBUG_LEVEL: &str = "RESTCLIENT_DEBUG_LEVEL";

/// Executes a composed request.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, RestError>;
}

/// Per-call transport settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// PEM file with the trust roots to use instead of the defaults.
    pub ca_certs: Option<PathBuf>,
    pub disable_certificate_validation: bool,
    /// Overall deadline for the request, including the body.
    pub timeout: Option<Duration>,
    /// 0 is quiet. 1 logs the request line and headers at `info`, 2 and up
    /// adds response headers and body sizes.
    pub debug_level: u8,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ca_certs: None,
            disable_certificate_validation: false,
            timeout: None,
            debug_level: 0,
        }
    }
}

impl TransportConfig {
    /// Defaults overlaid with `RESTCLIENT_*` environment variables.
    /// Values that do not parse are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for the
    /// `RESTCLIENT_*` names. Values that do not parse are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(ENV_CA_CERTS).filter(|p| !p.is_empty()) {
            config.ca_certs = Some(PathBuf::from(path));
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|s| s.trim().parse().ok()) {
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(level) = lookup(ENV_DEBUG_LEVEL).and_then(|s| s.trim().parse().ok()) {
            config.debug_level = level;
        }
        config
    }

    pub fn with_ca_certs(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_certs = Some(path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_debug_level(mut self, level: u8) -> Self {
        self.debug_level = level;
        self
    }
}

/// `Transport` backed by a dedicated `ureq::Agent`.
pub struct UreqTransport {
    agent: Agent,
    debug_level: u8,
}

impl UreqTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, RestError> {
        let mut tls = TlsConfig::builder().disable_verification(config.disable_certificate_validation);
        if let Some(path) = &config.ca_certs {
            tls = tls.root_certs(RootCerts::new_with_certs(&load_certificates(path)?));
        }

        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .tls_config(tls.build())
            .build()
            .new_agent();

        Ok(Self {
            agent,
            debug_level: config.debug_level,
        })
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, RestError> {
        if self.debug_level > 0 {
            tracing::info!(method = %request.method, url = %request.url, headers = ?request.headers, "send");
        }

        // ureq derives Content-Length from the body it is given.
        let headers = request
            .headers
            .iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case("content-length"));

        let mut response = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, None) => with_headers(self.agent.get(&request.url), headers).call(),
            (HttpMethod::Delete, None) => with_headers(self.agent.delete(&request.url), headers).call(),
            (HttpMethod::Get, Some(body)) => {
                with_headers(self.agent.get(&request.url).force_send_body(), headers).send(body)
            }
            (HttpMethod::Delete, Some(body)) => {
                with_headers(self.agent.delete(&request.url).force_send_body(), headers).send(body)
            }
            (HttpMethod::Post, body) => {
                with_headers(self.agent.post(&request.url), headers).send(body.unwrap_or_default())
            }
            (HttpMethod::Put, body) => {
                with_headers(self.agent.put(&request.url), headers).send(body.unwrap_or_default())
            }
        }?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        // The whole body is returned, however large.
        let body = response.body_mut().with_config().limit(u64::MAX).read_to_vec()?;

        if self.debug_level > 1 {
            tracing::info!(status, headers = ?headers, body_len = body.len(), "reply");
        }

        Ok(HttpResponse { status, headers, body })
    }
}

fn with_headers<'a, B>(
    mut builder: RequestBuilder<B>,
    headers: impl Iterator<Item = &'a (String, String)>,
) -> RequestBuilder<B> {
    for (k, v) in headers {
        builder = builder.header(k.as_str(), v.as_str());
    }
    builder
}

fn load_certificates(path: &Path) -> Result<Vec<Certificate<'static>>, RestError> {
    let pem = std::fs::read(path)?;
    let mut certs = Vec::new();
    for item in parse_pem(&pem) {
        if let PemItem::Certificate(cert) = item? {
            certs.push(cert.to_owned());
        }
    }
    tracing::debug!(path = %path.display(), count = certs.len(), "loaded trust roots");
    Ok(certs)
}
