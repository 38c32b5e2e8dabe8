//! Normalized request value.
//!
//! A [`NormalizedRequest`] is built once per inbound request and never
//! mutated afterwards. Header access is case-insensitive, the query string
//! keeps every key/value pair in arrival order, and the JSON body follows a
//! soft-fail rule: a payload that does not parse becomes `Some(Value::Null)`
//! instead of aborting the request.

use http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HOST, ORIGIN};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use url::Url;

use super::CommandError;

/// HTTP request method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    /// Any extension method, stored upper-cased.
    Other(String),
}

impl HttpMethod {
    /// Parses a method token, ignoring ASCII case.
    pub fn parse(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            other => HttpMethod::Other(other.to_string()),
        }
    }

    /// Returns the canonical method token.
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Other(token) => token,
        }
    }

    /// True for the CORS pre-flight method.
    pub fn is_preflight(&self) -> bool {
        matches!(self, HttpMethod::Options)
    }

    /// True for methods whose JSON payload is parsed into the request body.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl From<&http::Method> for HttpMethod {
    fn from(method: &http::Method) -> Self {
        Self::parse(method.as_str())
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive view over the request headers.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders(HeaderMap);

impl RequestHeaders {
    pub fn new(map: HeaderMap) -> Self {
        Self(map)
    }

    /// Returns the first value for `name`, if present and valid UTF-8.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.0.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Declared payload length; `None` when absent or unparsable.
    pub fn content_length(&self) -> Option<u64> {
        self.0
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }

    pub fn origin(&self) -> Option<&str> {
        self.0.get(ORIGIN).and_then(|v| v.to_str().ok())
    }

    pub fn host(&self) -> Option<&str> {
        self.0.get(HOST).and_then(|v| v.to_str().ok())
    }

    pub fn authorization(&self) -> Option<&str> {
        self.0.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
    }

    /// True when the declared content type is JSON.
    pub fn is_json(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }

    /// Iterates over all headers with UTF-8 values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
    }

    pub fn as_header_map(&self) -> &HeaderMap {
        &self.0
    }
}

/// Ordered multi-map of query parameters.
///
/// Duplicate keys are kept; nothing is collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Parses an `application/x-www-form-urlencoded` query string.
    pub fn parse(query: &str) -> Self {
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    /// Splits a raw request target once on the first `?` and parses the rest.
    pub fn from_raw_target(target: &str) -> Self {
        match target.split_once('?') {
            Some((_, query)) => Self::parse(query),
            None => Self::default(),
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in arrival order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Immutable, transport-independent view of one inbound request.
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    method: HttpMethod,
    url: Url,
    path: String,
    headers: RequestHeaders,
    query: QueryParams,
    body: Option<Value>,
}

impl NormalizedRequest {
    /// Builds a request from its transport-level parts.
    ///
    /// `target` is the raw request target (origin-form such as
    /// `/thinking?x=1`, or absolute-form). `payload` is the full request
    /// payload; it is only inspected when [`Self::expects_json_body`] holds.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::MalformedRequest` if no URL can be formed.
    pub fn from_parts(
        method: HttpMethod,
        target: &str,
        headers: RequestHeaders,
        payload: &[u8],
    ) -> Result<Self, CommandError> {
        let url = Self::parse_url(target, &headers)?;
        let path = Self::raw_path(target).to_string();
        let query = QueryParams::from_raw_target(target);
        let body = Self::parse_body(&method, &headers, payload);

        Ok(Self {
            method,
            url,
            path,
            headers,
            query,
            body,
        })
    }

    /// Starts a builder for an origin-form target, e.g. `"/ping?x=1"`.
    pub fn builder(method: HttpMethod, target: impl Into<String>) -> NormalizedRequestBuilder {
        NormalizedRequestBuilder {
            method,
            target: target.into(),
            headers: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// Whether a request with this method and headers has its payload parsed.
    pub fn expects_json_body(method: &HttpMethod, headers: &RequestHeaders) -> bool {
        method.carries_body() && headers.is_json() && headers.content_length() != Some(0)
    }

    fn parse_url(target: &str, headers: &RequestHeaders) -> Result<Url, CommandError> {
        let lower = target.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Url::parse(target).map_err(|e| CommandError::MalformedRequest(e.to_string()));
        }

        if !target.starts_with('/') {
            return Err(CommandError::MalformedRequest(format!(
                "unsupported request target: {}",
                target
            )));
        }

        let host = headers.host().unwrap_or("localhost");
        Url::parse(&format!("http://{}{}", host, target))
            .map_err(|e| CommandError::MalformedRequest(e.to_string()))
    }

    /// Path component of the target exactly as sent.
    ///
    /// Dot segments and percent-escapes are kept, so `/x/../ping` is not
    /// `/ping`.
    fn raw_path(target: &str) -> &str {
        let without_query = target
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or(target);

        match without_query.find("://") {
            Some(scheme_end) if !without_query.starts_with('/') => {
                let authority_and_path = &without_query[scheme_end + 3..];
                match authority_and_path.find('/') {
                    Some(start) => &authority_and_path[start..],
                    None => "/",
                }
            }
            _ => without_query,
        }
    }

    fn parse_body(method: &HttpMethod, headers: &RequestHeaders, payload: &[u8]) -> Option<Value> {
        if !Self::expects_json_body(method, headers) || payload.is_empty() {
            return None;
        }

        match serde_json::from_slice(payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding malformed JSON request body");
                Some(Value::Null)
            }
        }
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request path without the query string, as sent by the client.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &RequestHeaders {
        &self.headers
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Parsed JSON body.
    ///
    /// `None` when no body applies; `Some(Value::Null)` when a JSON payload
    /// was present but did not parse.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns a typed 400 error when the body is absent, null, or does not
    /// match `T`.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, CommandError> {
        match &self.body {
            None | Some(Value::Null) => Err(CommandError::bad_request("Missing request body")),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| CommandError::bad_request(format!("Invalid request body: {}", e))),
        }
    }
}

/// Builder used by tests and in-process callers.
#[derive(Debug, Clone)]
pub struct NormalizedRequestBuilder {
    method: HttpMethod,
    target: String,
    headers: Vec<(String, String)>,
    payload: Vec<u8>,
}

impl NormalizedRequestBuilder {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a JSON payload and a matching content type.
    pub fn json(mut self, value: &Value) -> Self {
        self.payload = value.to_string().into_bytes();
        self.header("Content-Type", "application/json")
    }

    /// Sets a raw payload without touching the headers.
    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// # Errors
    ///
    /// Returns `CommandError::MalformedRequest` for invalid header names or
    /// values, or an unusable target.
    pub fn build(self) -> Result<NormalizedRequest, CommandError> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| CommandError::MalformedRequest(e.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| CommandError::MalformedRequest(e.to_string()))?;
            map.append(name, value);
        }

        NormalizedRequest::from_parts(
            self.method,
            &self.target,
            RequestHeaders::new(map),
            &self.payload,
        )
    }
}
