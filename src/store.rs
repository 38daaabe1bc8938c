use std::path::{Path, PathBuf};

use shellcache::{CacheRouter, DiskStorage, Network, Registration, RouterConfig};

use crate::config::Settings;

pub(crate) type Router = CacheRouter<DiskStorage, Box<dyn Network>>;

/// On-disk layout: `caches/<partition>/`, `registration.json` and the last
/// page written by `--open`.
pub(crate) struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn caches_dir(&self) -> PathBuf {
        self.root.join("caches")
    }

    pub fn registration_path(&self) -> PathBuf {
        self.root.join("registration.json")
    }

    pub fn page_path(&self) -> PathBuf {
        self.root.join("portal.html")
    }

    /// A router for the configured version over the persisted caches.
    pub fn router(&self, settings: &Settings) -> anyhow::Result<Router> {
        self.router_for(settings, &settings.cache_version)
    }

    pub fn router_for(&self, settings: &Settings, version: &str) -> anyhow::Result<Router> {
        let config = RouterConfig::new(version, settings.app.clone(), &settings.api)?;
        let registration = Registration::load(&self.registration_path())?;
        let network = crate::http::network(settings)?;
        Ok(CacheRouter::new(
            config,
            DiskStorage::new(self.caches_dir()),
            network,
            registration,
        ))
    }

    pub fn save(&self, router: &Router) -> anyhow::Result<()> {
        router.registration().save(&self.registration_path())?;
        Ok(())
    }
}
