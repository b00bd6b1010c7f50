//! HTTP exchange types shared by the client, the interceptor chain and the
//! transport.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`,
//! the interceptor chain rewrites it, and the transport consumes it by value,
//! so nothing can touch a request once it has been handed over for
//! transmission. The transport reads the response body exactly once and keeps
//! it buffered in `HttpResponse::body`; every later reader (interceptors,
//! decoder) sees the same bytes.

use std::fmt;

/// HTTP method for a request. The posts API is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `ApiClient::build_*` methods and rewritten by the request leg of
/// the interceptor chain. Headers are an ordered list so that several stages
/// may append values under the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// A bodiless `GET` for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Append a header, keeping any existing value under the same name.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Builder-style variant of [`HttpRequest::add_header`].
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_header(name, value);
        self
    }

    /// First value of the header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response with its body already buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of the header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The `Content-Type` header, if the server sent one.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The declared `Content-Length`, falling back to the buffered body size
    /// when the header is missing or unparsable.
    pub fn content_length(&self) -> u64 {
        self.header("content-length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(self.body.len() as u64)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_header_keeps_existing_values() {
        let mut req = HttpRequest::get("http://localhost/posts");
        req.add_header("Accept", "application/json");
        req.add_header("accept", "text/plain");
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.header("ACCEPT"), Some("application/json"));
    }

    #[test]
    fn content_length_prefers_header() {
        let resp = HttpResponse {
            status: 200,
            headers: vec![("Content-Length".to_string(), "42".to_string())],
            body: "{}".to_string(),
        };
        assert_eq!(resp.content_length(), 42);
    }

    #[test]
    fn content_length_falls_back_to_body() {
        let resp = HttpResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: "{}".to_string(),
        };
        assert_eq!(resp.content_length(), 2);
        assert_eq!(resp.content_type(), Some("application/json"));
    }

    #[test]
    fn success_range_is_2xx() {
        let mut resp = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(resp.is_success());
        resp.status = 301;
        assert!(!resp.is_success());
        resp.status = 404;
        assert!(!resp.is_success());
    }
}
