//! Per-request choice between network, cache partitions and synthesized
//! fallbacks.

use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::config::RouterConfig;
use crate::error::{CacheError, OfflineError};
use crate::http::{Method, Request, RequestMode, Response};
use crate::lifecycle::Registration;
use crate::network::Network;
use crate::storage::CacheStorage;

const OFFLINE_PAGE: &str = "<h1>Application unavailable</h1><p>No internet connection</p>";

/// Which strategy a request gets, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Upstream data API: network first, cached copy, then a JSON offline error.
    Api,
    /// App-shell file: cache first, refilled from the network.
    Shell,
    /// Top-level document load: network first, then the cached shell document.
    Navigation,
    /// Anything else: network first against the dynamic partition.
    Other,
}

pub struct CacheRouter<S, N> {
    pub(crate) config: RouterConfig,
    pub(crate) storage: S,
    pub(crate) network: N,
    pub(crate) registration: Registration,
}

impl<S: CacheStorage, N: Network> CacheRouter<S, N> {
    pub fn new(config: RouterConfig, storage: S, network: N, registration: Registration) -> Self {
        Self {
            config,
            storage,
            network,
            registration,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub fn classify(&self, request: &Request) -> RequestClass {
        if request.url.origin() == self.config.api_origin {
            RequestClass::Api
        } else if self.config.is_shell_file(&request.url) {
            RequestClass::Shell
        } else if request.mode == RequestMode::Navigate {
            RequestClass::Navigation
        } else {
            RequestClass::Other
        }
    }

    /// Answer a request the page issued.
    ///
    /// Only `GET` is intercepted; other methods go straight to the network and
    /// may fail. Intercepted requests always produce a response.
    pub fn route(&self, request: &Request) -> Result<Response, OfflineError> {
        if request.method != Method::Get {
            return self.network.fetch(request);
        }
        let class = self.classify(request);
        debug!(url = %request.url, ?class, "routing request");
        Ok(match class {
            RequestClass::Api => self.api(request),
            RequestClass::Shell => self.shell(request),
            RequestClass::Navigation => self.navigation(request),
            RequestClass::Other => self.dynamic(request),
        })
    }

    fn store(&self, partition: &str, url: &Url, response: &Response) {
        if let Err(e) = self.storage.put(partition, url, response) {
            warn!(%url, partition, error = %e, "failed to cache response");
        }
    }

    /// Network result if it is a success, after storing a copy in `partition`.
    fn fresh(&self, partition: &str, request: &Request) -> Option<Response> {
        match self.network.fetch(request) {
            Ok(response) if response.is_ok() => {
                self.store(partition, &request.url, &response);
                Some(response)
            }
            Ok(response) => {
                debug!(url = %request.url, status = response.status, "network returned an error status");
                None
            }
            Err(e) => {
                debug!(error = %e, "network failed, falling back to cache");
                None
            }
        }
    }

    fn api(&self, request: &Request) -> Response {
        let partition = self.config.dynamic_partition();
        let attempt = || -> Result<Response, CacheError> {
            if let Some(response) = self.fresh(&partition, request) {
                return Ok(response);
            }
            Ok(self
                .storage
                .lookup(&partition, &request.url)?
                .unwrap_or_else(offline_json))
        };
        attempt().unwrap_or_else(|e| {
            warn!(url = %request.url, error = %e, "API request failed");
            Response::json(
                500,
                "Internal Server Error",
                &json!({"error": "Error", "message": "An error occurred"}),
            )
        })
    }

    fn shell(&self, request: &Request) -> Response {
        let partition = self.config.static_partition();
        let attempt = || -> Result<Response, ShellMiss> {
            if let Some(cached) = self.storage.lookup(&partition, &request.url)? {
                return Ok(cached);
            }
            let response = self.network.fetch(request)?;
            if response.is_ok() {
                self.store(&partition, &request.url, &response);
            }
            Ok(response)
        };
        attempt().unwrap_or_else(|e| {
            warn!(url = %request.url, error = %e, "shell request failed");
            self.storage
                .lookup(&partition, &request.url)
                .ok()
                .flatten()
                .unwrap_or_else(|| Response::text(404, "Not Found", "File not found"))
        })
    }

    fn navigation(&self, request: &Request) -> Response {
        match self.network.fetch(request) {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "navigation offline, serving shell document");
                let shell = self
                    .storage
                    .lookup(&self.config.static_partition(), &self.config.shell_document())
                    .unwrap_or_else(|e| {
                        warn!(error = %e, "shell document lookup failed");
                        None
                    });
                shell.unwrap_or_else(|| Response::html(503, "Service Unavailable", OFFLINE_PAGE))
            }
        }
    }

    fn dynamic(&self, request: &Request) -> Response {
        let partition = self.config.dynamic_partition();
        let attempt = || -> Result<Response, CacheError> {
            if let Some(response) = self.fresh(&partition, request) {
                return Ok(response);
            }
            Ok(self
                .storage
                .lookup(&partition, &request.url)?
                .unwrap_or_else(|| {
                    Response::text(503, "Service Unavailable", "Content not available offline")
                }))
        };
        attempt().unwrap_or_else(|e| {
            warn!(url = %request.url, error = %e, "dynamic request failed");
            Response::text(500, "Internal Server Error", "Request failed")
        })
    }
}

/// The page talks to the router exactly as it would to the network.
impl<S: CacheStorage, N: Network> Network for CacheRouter<S, N> {
    fn fetch(&self, request: &Request) -> Result<Response, OfflineError> {
        self.route(request)
    }
}

fn offline_json() -> Response {
    Response::json(
        503,
        "Service Unavailable",
        &json!({"error": "Offline", "message": "No internet connection"}),
    )
}

#[derive(Debug, thiserror::Error)]
enum ShellMiss {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Offline(#[from] OfflineError),
}
