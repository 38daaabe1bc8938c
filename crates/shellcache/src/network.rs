use std::time::Duration;

use tracing::debug;

use crate::error::OfflineError;
use crate::http::{Request, Response};

/// Anything that can turn a request into a response: the real network, a
/// test double, or the [`crate::CacheRouter`] sitting in front of either.
pub trait Network: Send + Sync {
    fn fetch(&self, request: &Request) -> Result<Response, OfflineError>;
}

impl<N: Network + ?Sized> Network for &N {
    fn fetch(&self, request: &Request) -> Result<Response, OfflineError> {
        (**self).fetch(request)
    }
}

impl<N: Network + ?Sized> Network for Box<N> {
    fn fetch(&self, request: &Request) -> Result<Response, OfflineError> {
        (**self).fetch(request)
    }
}

pub struct HttpNetwork {
    client: reqwest::blocking::Client,
}

impl HttpNetwork {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

impl Network for HttpNetwork {
    fn fetch(&self, request: &Request) -> Result<Response, OfflineError> {
        let url = request.url.as_str();
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| OfflineError::new(url, e.to_string()))?;
        debug!(%url, method = request.method.as_str(), "network fetch");

        let response = self
            .client
            .request(method, request.url.clone())
            .send()
            .map_err(|e| OfflineError::new(url, e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .map_err(|e| OfflineError::new(url, e.to_string()))?;

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: body.to_vec(),
        })
    }
}

/// A network that is never reachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct Disconnected;

impl Network for Disconnected {
    fn fetch(&self, request: &Request) -> Result<Response, OfflineError> {
        Err(OfflineError::new(request.url.as_str(), "offline mode"))
    }
}
