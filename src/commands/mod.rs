pub mod browse;
pub mod cache;
pub mod notify;
pub mod outline;
pub mod page;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use shellcache::InstallReport;

use crate::config::Settings;
use crate::store::{Router, Store};

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let sp = ProgressBar::new_spinner();
    sp.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    sp.enable_steady_tick(Duration::from_millis(80));
    sp.set_message(message.to_string());
    sp
}

/// Cache the app shell for the router's version, with a progress bar.
pub(crate) fn install(router: &mut Router) -> InstallReport {
    let pb = ProgressBar::new(router.config().shell_files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:30}] {pos}/{len}")
            .unwrap(),
    );
    pb.set_message("Caching app shell");
    let report = router.install_with(|_| pb.inc(1));
    pb.finish_and_clear();
    for (url, reason) in &report.failed {
        eprintln!("Could not cache {}: {}", url, reason);
    }
    report
}

/// Install and activate the configured version unless it is already the
/// active one, like a page registering its worker on load.
///
/// An install that caches nothing never replaces an active version: the
/// router falls back to that version and its caches stay untouched.
pub(crate) fn register(store: &Store, settings: &Settings, router: &mut Router) -> anyhow::Result<()> {
    let version = router.config().version.clone();
    if router.registration().is_active(&version) {
        return Ok(());
    }
    let report = install(router);
    if report.cached.is_empty()
        && let Some(active) = router.registration().active.clone()
    {
        eprintln!("Could not install version {version}; staying on version {active}");
        *router = store.router_for(settings, &active)?;
        return Ok(());
    }
    let activated = router.activate()?;
    store.save(router)?;
    for partition in &activated.deleted {
        eprintln!("Removed old cache {}", partition);
    }
    Ok(())
}
