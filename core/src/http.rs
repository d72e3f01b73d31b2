//! HTTP request and response types described as plain data.
//!
//! # Design
//! Services build `HttpRequest` values and parse `HttpResponse` values
//! without touching the network. A `Transport` (see `transport.rs`) sits
//! between the two and performs the actual round-trip, so every service can
//! be tested by handing it canned responses.
//!
//! All fields use owned types (`String`, `Vec`) so values can be recorded,
//! cloned and compared freely in tests.

/// HTTP method for a request. The vendor API only uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute and already carries the encoded query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value with the given (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decoded query pairs in the order they appear in the URL.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match self.url.split_once('?') {
            Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Decoded pairs of a form-encoded body. Empty for other bodies.
    pub fn form_pairs(&self) -> Vec<(String, String)> {
        match (&self.body, self.header("content-type")) {
            (Some(body), Some(FORM_CONTENT_TYPE)) => url::form_urlencoded::parse(body.as_bytes())
                .into_owned()
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Convenience constructor used by transports and tests.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_keep_repeated_keys_in_order() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://h/x?employeeId=1&employeeId=2&clientId=C%201".to_string(),
            headers: Vec::new(),
            body: None,
        };
        assert_eq!(
            req.query_pairs(),
            vec![
                ("employeeId".to_string(), "1".to_string()),
                ("employeeId".to_string(), "2".to_string()),
                ("clientId".to_string(), "C 1".to_string()),
            ]
        );
    }

    #[test]
    fn form_pairs_require_form_content_type() {
        let mut req = HttpRequest {
            method: HttpMethod::Post,
            url: "http://h/x".to_string(),
            headers: vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())],
            body: Some("a=1".to_string()),
        };
        assert!(req.form_pairs().is_empty());

        req.headers = vec![("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())];
        assert_eq!(req.form_pairs(), vec![("a".to_string(), "1".to_string())]);
    }

    #[test]
    fn success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }
}
