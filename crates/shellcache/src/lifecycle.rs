//! Install / activate / message handling for one router version.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::error::{CacheError, LifecycleError};
use crate::http::Request;
use crate::network::Network;
use crate::router::CacheRouter;
use crate::storage::CacheStorage;

/// Which versions are installing, waiting and active, and whether the active
/// one controls open pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub installing: Option<String>,
    pub waiting: Option<String>,
    pub active: Option<String>,
    #[serde(default)]
    pub controlling: bool,
}

impl Registration {
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| CacheError::corrupt(path, e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|e| CacheError::corrupt(path, e))?;
        fs::write(path, text).map_err(|e| CacheError::io(path, e))
    }

    pub fn is_active(&self, version: &str) -> bool {
        self.active.as_deref() == Some(version)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cached: Vec<Url>,
    pub failed: Vec<(Url, String)>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActivateReport {
    pub deleted: Vec<String>,
}

/// Control messages a page can post to the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    SkipWaiting,
    CacheUrls { urls: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Activated(ActivateReport),
    NothingWaiting,
    Cached(Vec<Url>),
}

impl<S: CacheStorage, N: Network> CacheRouter<S, N> {
    /// Pre-populate the static partition with the shell files.
    ///
    /// Best-effort: a file that cannot be fetched or stored is reported in
    /// [`InstallReport::failed`] and the rest are still cached. Afterwards this
    /// version is waiting to activate.
    pub fn install(&mut self) -> InstallReport {
        self.install_with(|_| {})
    }

    /// [`Self::install`], calling `progress` after each shell file.
    pub fn install_with(&mut self, mut progress: impl FnMut(&Url)) -> InstallReport {
        let version = self.config.version.clone();
        info!(%version, "installing");
        self.registration.installing = Some(version.clone());

        let partition = self.config.static_partition();
        let mut report = InstallReport::default();
        if let Err(e) = self.storage.open(&partition) {
            warn!(%partition, error = %e, "could not open static cache");
        }
        for url in self.config.shell_files.clone() {
            match self.cache_one(&partition, &url) {
                Ok(()) => report.cached.push(url.clone()),
                Err(reason) => {
                    warn!(%url, %reason, "could not cache shell file");
                    report.failed.push((url.clone(), reason));
                }
            }
            progress(&url);
        }

        self.registration.installing = None;
        self.registration.waiting = Some(version);
        info!(
            cached = report.cached.len(),
            failed = report.failed.len(),
            "static files cached"
        );
        report
    }

    fn cache_one(&self, partition: &str, url: &Url) -> Result<(), String> {
        let response = self
            .network
            .fetch(&Request::get(url.clone()))
            .map_err(|e| e.reason)?;
        if !response.is_ok() {
            return Err(format!("status {}", response.status));
        }
        self.storage
            .put(partition, url, &response)
            .map_err(|e| e.to_string())
    }

    /// Purge partitions from other versions and take control of pages.
    pub fn activate(&mut self) -> Result<ActivateReport, LifecycleError> {
        let version = self.config.version.clone();
        let installed = self.registration.waiting.as_deref() == Some(version.as_str())
            || self.registration.is_active(&version);
        if !installed {
            return Err(LifecycleError::NotInstalled(version));
        }
        info!(%version, "activating");

        let current = [self.config.static_partition(), self.config.dynamic_partition()];
        let mut report = ActivateReport::default();
        for name in self.storage.keys()? {
            if current.contains(&name) {
                continue;
            }
            info!(partition = %name, "deleting old cache");
            if self.storage.delete(&name)? {
                report.deleted.push(name);
            }
        }

        self.registration.waiting = None;
        self.registration.active = Some(version);
        self.registration.controlling = true;
        info!("activated");
        Ok(report)
    }

    pub fn handle_message(&mut self, message: ControlMessage) -> Result<MessageOutcome, LifecycleError> {
        match message {
            ControlMessage::SkipWaiting => {
                if self.registration.waiting.is_none() {
                    return Ok(MessageOutcome::NothingWaiting);
                }
                self.activate().map(MessageOutcome::Activated)
            }
            ControlMessage::CacheUrls { urls } => self.add_all(&urls).map(MessageOutcome::Cached),
        }
    }

    /// Fetch every URL, then store them all in the dynamic partition. Any
    /// failure stores nothing.
    fn add_all(&self, urls: &[String]) -> Result<Vec<Url>, LifecycleError> {
        let mut fetched = Vec::with_capacity(urls.len());
        for raw in urls {
            let url = self
                .config
                .app_base
                .join(raw)
                .map_err(|_| LifecycleError::InvalidUrl(raw.clone()))?;
            let response = self
                .network
                .fetch(&Request::get(url.clone()))
                .map_err(|e| LifecycleError::Fetch {
                    url: url.to_string(),
                    reason: e.reason,
                })?;
            if !response.is_ok() {
                return Err(LifecycleError::Fetch {
                    url: url.to_string(),
                    reason: format!("status {}", response.status),
                });
            }
            fetched.push((url, response));
        }

        let partition = self.config.dynamic_partition();
        self.storage.open(&partition)?;
        for (url, response) in &fetched {
            self.storage.put(&partition, url, response)?;
        }
        Ok(fetched.into_iter().map(|(url, _)| url).collect())
    }
}
