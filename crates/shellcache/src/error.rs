use std::path::PathBuf;

use thiserror::Error;

/// The network could not produce a response for `url`.
///
/// Returned by [`crate::Network::fetch`]. The router never lets this reach the
/// page for intercepted requests; it answers from a cache or with a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("network unavailable for {url}: {reason}")]
pub struct OfflineError {
    pub url: String,
    pub reason: String,
}

impl OfflineError {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt cache entry in {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cached body for {url} is not valid base64")]
    Body { url: String },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("version {0} has not been installed")]
    NotInstalled(String),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("could not cache {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("invalid URL {0:?}")]
    InvalidUrl(String),
}
