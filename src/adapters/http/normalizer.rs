//! Raw HTTP request → [`NormalizedRequest`].

use http::Request;

use crate::domain::dispatch::{CommandError, HttpMethod, NormalizedRequest, RequestHeaders};

/// Normalizes a buffered transport request.
///
/// # Errors
///
/// Returns `CommandError::MalformedRequest` when the request target cannot
/// be turned into a URL (for example the asterisk-form `*`).
pub fn normalize(request: &Request<Vec<u8>>) -> Result<NormalizedRequest, CommandError> {
    let method = HttpMethod::from(request.method());
    let target = request.uri().to_string();
    let headers = RequestHeaders::new(request.headers().clone());

    NormalizedRequest::from_parts(method, &target, headers, request.body())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(method: &str, uri: &str, content_type: Option<&str>, body: &str) -> Request<Vec<u8>> {
        let mut builder = Request::builder().method(method).uri(uri).header("Host", "gw.test");
        if let Some(content_type) = content_type {
            builder = builder
                .header("Content-Type", content_type)
                .header("Content-Length", body.len().to_string());
        }
        builder.body(body.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn normalizes_method_path_and_query() {
        let request = normalize(&raw("GET", "/ping?a=1&a=2&b=", None, "")).unwrap();
        assert_eq!(request.method(), &HttpMethod::Get);
        assert_eq!(request.path(), "/ping");
        assert_eq!(request.query().get_all("a"), vec!["1", "2"]);
        assert_eq!(request.query().get("b"), Some(""));
        assert_eq!(request.url().host_str(), Some("gw.test"));
    }

    #[test]
    fn json_body_is_parsed_for_post() {
        let request = normalize(&raw(
            "POST",
            "/thinking",
            Some("application/json"),
            r#"{"text":"hi"}"#,
        ))
        .unwrap();
        assert_eq!(request.body(), Some(&json!({"text": "hi"})));
    }

    #[test]
    fn malformed_json_degrades_to_null() {
        let request = normalize(&raw("POST", "/login", Some("application/json"), "{oops")).unwrap();
        assert_eq!(request.body(), Some(&serde_json::Value::Null));
    }

    #[test]
    fn get_body_is_ignored() {
        let request = normalize(&raw("GET", "/ping", Some("application/json"), "{}")).unwrap();
        assert_eq!(request.body(), None);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut request = raw("GET", "/ping", None, "");
        request
            .headers_mut()
            .insert("X-Custom", http::HeaderValue::from_static("yes"));
        let request = normalize(&request).unwrap();
        assert_eq!(request.headers().get("x-custom"), Some("yes"));
        assert_eq!(request.headers().get("X-CUSTOM"), Some("yes"));
    }

    #[test]
    fn asterisk_target_is_malformed() {
        let request = raw("OPTIONS", "*", None, "");
        assert!(matches!(
            normalize(&request),
            Err(CommandError::MalformedRequest(_))
        ));
    }
}
