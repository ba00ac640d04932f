//! HTTP callback descriptors.
//!
//! An `HttpCallback` names a request someone else wants made on their
//! behalf: method, URL, an extra query string, parameters, headers and
//! credentials. Its values win over whatever the caller supplied in
//! `RequestOptions`.
//!
//! Redirect limits and a raw callback body are not supported. Setting them
//! only logs a warning.

use crate::client::{rest_invoke, RequestOptions};
use crate::error::RestError;
use crate::http::HttpMethod;
use crate::types::Outcome;

/// Redirect limit a callback carries unless told otherwise.
pub const DEFAULT_REDIRECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCallback {
    pub method: HttpMethod,
    pub url: String,
    /// Already-encoded query string, appended to `url`.
    pub query_string: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Sent as basic auth when either is set.
    pub username: Option<String>,
    pub password: Option<String>,
    pub redirections: u32,
    pub follow_all_redirects: bool,
    pub body: String,
}

impl HttpCallback {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query_string: String::new(),
            params: Vec::new(),
            headers: Vec::new(),
            username: None,
            password: None,
            redirections: DEFAULT_REDIRECTIONS,
            follow_all_redirects: false,
            body: String::new(),
        }
    }

    /// Names of the settings that differ from their defaults but are not
    /// honored when the callback is invoked.
    pub fn unsupported_settings(&self) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if self.redirections != DEFAULT_REDIRECTIONS {
            ignored.push("redirections");
        }
        if self.follow_all_redirects {
            ignored.push("follow_all_redirects");
        }
        if !self.body.is_empty() {
            ignored.push("body");
        }
        ignored
    }

    /// The callback URL with its query string attached.
    pub fn target_url(&self) -> String {
        if self.query_string.is_empty() {
            return self.url.clone();
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{}", self.url, self.query_string)
    }

    /// Merge the callback's params, headers and credentials over `options`.
    pub fn apply(&self, options: RequestOptions) -> RequestOptions {
        for setting in self.unsupported_settings() {
            tracing::warn!(url = %self.url, setting, "callback setting is not supported, ignoring it");
        }

        let options = self
            .params
            .iter()
            .fold(options, |options, (k, v)| options.param(k.as_str(), v.as_str()));
        let options = self
            .headers
            .iter()
            .fold(options, |options, (k, v)| options.header(k.as_str(), v.as_str()));

        if self.username.is_none() && self.password.is_none() {
            return options;
        }
        options.credentials(
            self.username.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
        )
    }
}

/// Make the request an `HttpCallback` describes.
pub fn invoke_callback(callback: &HttpCallback, options: RequestOptions) -> Result<Outcome, RestError> {
    rest_invoke(&callback.target_url(), callback.method, callback.apply(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::build_request;
    use crate::params::ParamValue;

    #[test]
    fn query_string_joins_with_question_mark() {
        let mut cb = HttpCallback::new(HttpMethod::Get, "http://example.com/hook");
        cb.query_string = "a=1".to_string();
        assert_eq!(cb.target_url(), "http://example.com/hook?a=1");
    }

    #[test]
    fn query_string_joins_existing_query_with_ampersand() {
        let mut cb = HttpCallback::new(HttpMethod::Get, "http://example.com/hook?x=0");
        cb.query_string = "a=1".to_string();
        assert_eq!(cb.target_url(), "http://example.com/hook?x=0&a=1");
    }

    #[test]
    fn empty_query_string_leaves_url_alone() {
        let cb = HttpCallback::new(HttpMethod::Post, "http://example.com/hook");
        assert_eq!(cb.target_url(), "http://example.com/hook");
    }

    #[test]
    fn callback_params_and_headers_override_options() {
        let mut cb = HttpCallback::new(HttpMethod::Get, "http://example.com/hook");
        cb.query_string = "a=1".to_string();
        cb.params = vec![("value".to_string(), "from callback".to_string())];
        cb.headers = vec![("X-Source".to_string(), "callback".to_string())];

        let options = RequestOptions::new()
            .param("value", "from caller")
            .param("extra", 5)
            .header("x-source", "caller");
        let (descriptor, _) = cb.apply(options).into_descriptor(&cb.target_url(), cb.method);

        assert_eq!(descriptor.params.get("value"), Some(&ParamValue::from("from callback")));
        assert_eq!(descriptor.params.get("extra"), Some(&ParamValue::from(5)));

        let built = build_request(&descriptor).unwrap();
        assert_eq!(built.url, "http://example.com/hook?a=1&extra=5&value=from+callback");
        assert_eq!(built.header("x-source"), Some("callback"));
    }

    #[test]
    fn new_callback_has_no_unsupported_settings() {
        let cb = HttpCallback::new(HttpMethod::Post, "http://example.com/hook");
        assert!(cb.unsupported_settings().is_empty());
    }

    #[test]
    fn redirect_and_body_settings_are_reported() {
        let mut cb = HttpCallback::new(HttpMethod::Post, "http://example.com/hook");
        cb.redirections = 0;
        cb.follow_all_redirects = true;
        cb.body = "payload".to_string();
        assert_eq!(
            cb.unsupported_settings(),
            vec!["redirections", "follow_all_redirects", "body"]
        );

        // The request is still built without them.
        let (descriptor, _) = cb.apply(RequestOptions::new()).into_descriptor(&cb.target_url(), cb.method);
        let built = build_request(&descriptor).unwrap();
        assert_eq!(built.url, "http://example.com/hook");
        assert_eq!(built.body.as_deref(), Some(&b""[..]));
    }

    #[test]
    fn callback_credentials_become_basic_auth() {
        let mut cb = HttpCallback::new(HttpMethod::Get, "http://example.com/hook");
        cb.username = Some("Aladdin".to_string());
        cb.password = Some("open sesame".to_string());

        let options = RequestOptions::new().credentials("someone", "else");
        let (descriptor, _) = cb.apply(options).into_descriptor(&cb.target_url(), cb.method);
        let built = build_request(&descriptor).unwrap();
        assert_eq!(built.header("Authorization"), Some("Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="));
    }

    #[test]
    fn callback_without_credentials_keeps_the_callers() {
        let cb = HttpCallback::new(HttpMethod::Get, "http://example.com/hook");
        let options = RequestOptions::new().credentials("Aladdin", "open sesame");
        let (descriptor, _) = cb.apply(options).into_descriptor(&cb.target_url(), cb.method);
        assert_eq!(
            descriptor.credentials.map(|c| c.username),
            Some("Aladdin".to_string())
        );
    }
}
