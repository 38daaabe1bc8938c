//! Request and response snapshots exchanged between the page, the router and
//! the network.

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Get,
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Other(name) => name,
        }
    }
}

/// How the request was initiated. `Navigate` is the browser loading a
/// top-level document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequestMode {
    Navigate,
    #[default]
    Subresource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: Url,
    pub method: Method,
    pub mode: RequestMode,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: Method::Get,
            mode: RequestMode::Subresource,
        }
    }

    pub fn navigate(url: Url) -> Self {
        Self {
            url,
            method: Method::Get,
            mode: RequestMode::Navigate,
        }
    }
}

/// A full response: status line, headers and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(status: u16, status_text: &str, value: &serde_json::Value) -> Self {
        Self::new(status, status_text, value.to_string())
            .with_header("Content-Type", "application/json")
    }

    pub fn html(status: u16, status_text: &str, markup: &str) -> Self {
        Self::new(status, status_text, markup).with_header("Content-Type", "text/html")
    }

    pub fn text(status: u16, status_text: &str, text: &str) -> Self {
        Self::new(status, status_text, text).with_header("Content-Type", "text/plain")
    }

    /// 2xx, like `Response.ok` in the Fetch API.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn text_body(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ok_covers_2xx_only() {
        assert!(Response::new(200, "OK", "").is_ok());
        assert!(Response::new(204, "No Content", "").is_ok());
        assert!(!Response::new(304, "Not Modified", "").is_ok());
        assert!(!Response::new(503, "Service Unavailable", "").is_ok());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = Response::json(200, "OK", &serde_json::json!({}));
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
    }
}
