//! CORS policy.
//!
//! The policy is evaluated once per request from the raw `Origin` header,
//! before normalization, so every response (including normalization
//! failures) can carry the same headers.

use http::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, VARY,
};
use http::{HeaderMap, Response, StatusCode};

const WILDCARD: &str = "*";

/// Configured CORS behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    allow_methods: String,
    allow_headers: String,
    max_age_secs: u64,
    allow_credentials: bool,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_methods: "GET, POST, PUT, DELETE, OPTIONS".to_string(),
            allow_headers: "Content-Type, Authorization".to_string(),
            max_age_secs: 86_400,
            allow_credentials: true,
        }
    }
}

impl CorsPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts echoed origins. An empty list echoes any origin.
    pub fn with_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_origins = origins
            .into_iter()
            .map(Into::into)
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();
        self
    }

    pub fn with_allow_methods(mut self, methods: impl Into<String>) -> Self {
        self.allow_methods = methods.into();
        self
    }

    pub fn with_allow_headers(mut self, headers: impl Into<String>) -> Self {
        self.allow_headers = headers.into();
        self
    }

    pub fn with_max_age(mut self, secs: u64) -> Self {
        self.max_age_secs = secs;
        self
    }

    pub fn with_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    /// Value of `Access-Control-Allow-Origin` for a request origin.
    ///
    /// - no allowlist: the request origin, or `*` without one
    /// - allowlisted origin: echoed back
    /// - anything else: the first configured origin, which the browser
    ///   will refuse to match
    pub fn allow_origin(&self, origin: Option<&str>) -> String {
        let origin = origin.map(str::trim).filter(|o| !o.is_empty());

        if self.allowed_origins.is_empty() {
            return origin.unwrap_or(WILDCARD).to_string();
        }

        match origin {
            Some(origin) if self.is_allowed(origin) => origin.to_string(),
            _ => self.allowed_origins[0].clone(),
        }
    }

    fn is_allowed(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == WILDCARD || allowed.eq_ignore_ascii_case(origin))
    }

    /// Headers attached to every response for this request.
    pub fn headers_for(&self, headers: &HeaderMap) -> CorsHeaders {
        let origin = headers
            .get(http::header::ORIGIN)
            .and_then(|v| v.to_str().ok());
        let allow_origin = self.allow_origin(origin);
        let allow_credentials = self.allow_credentials && allow_origin != WILDCARD;

        CorsHeaders {
            allow_origin,
            allow_credentials,
        }
    }

    /// Complete response to a pre-flight request.
    pub fn preflight(&self, cors: &CorsHeaders) -> Response<Vec<u8>> {
        let mut response = Response::new(Vec::new());
        *response.status_mut() = StatusCode::NO_CONTENT;

        let headers = response.headers_mut();
        cors.apply(headers);
        insert(headers, ACCESS_CONTROL_ALLOW_METHODS, &self.allow_methods);
        insert(headers, ACCESS_CONTROL_ALLOW_HEADERS, &self.allow_headers);
        insert(
            headers,
            ACCESS_CONTROL_MAX_AGE,
            &self.max_age_secs.to_string(),
        );
        response
    }
}

/// CORS headers computed for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsHeaders {
    allow_origin: String,
    allow_credentials: bool,
}

impl CorsHeaders {
    pub fn allow_origin(&self) -> &str {
        &self.allow_origin
    }

    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    /// Writes the headers, replacing any set by the handler.
    pub fn apply(&self, headers: &mut HeaderMap) {
        insert(headers, ACCESS_CONTROL_ALLOW_ORIGIN, &self.allow_origin);
        if self.allow_credentials {
            insert(headers, ACCESS_CONTROL_ALLOW_CREDENTIALS, "true");
        }
        if self.allow_origin != WILDCARD {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
    }
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, "Skipping CORS header with invalid value"),
    }
}
