use std::io::Write;

use clap::Subcommand;
use shellcache::{CacheStorage, ControlMessage, MessageOutcome, Request};
use url::Url;

use crate::config::Settings;
use crate::store::Store;

#[derive(Subcommand, Debug)]
pub(crate) enum CacheCommand {
    /// Cache the app shell for the configured version
    Install,
    /// Drop caches of other versions and make this one active
    Activate,
    /// Activate a waiting version right away
    SkipWaiting,
    /// List cache partitions and their entries
    Ls,
    /// Fetch URLs into the dynamic cache, all or nothing
    Add {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Send one request through the router and print the response body
    Fetch {
        url: Url,
        /// Treat the request as a top-level page load
        #[arg(long)]
        navigate: bool,
    },
}

pub(crate) fn cmd_cache(store: &Store, settings: &Settings, command: CacheCommand) -> anyhow::Result<()> {
    let mut router = store.router(settings)?;
    let version = router.config().version.clone();
    match command {
        CacheCommand::Install => {
            let report = super::install(&mut router);
            store.save(&router)?;
            eprintln!(
                "Cached {} of {} shell files; version {} is waiting",
                report.cached.len(),
                report.cached.len() + report.failed.len(),
                version
            );
        }
        CacheCommand::Activate => {
            let report = router.activate()?;
            store.save(&router)?;
            for partition in &report.deleted {
                eprintln!("Removed old cache {}", partition);
            }
            eprintln!("Version {} is active", version);
        }
        CacheCommand::SkipWaiting => {
            match router.handle_message(ControlMessage::SkipWaiting)? {
                MessageOutcome::Activated(report) => {
                    for partition in &report.deleted {
                        eprintln!("Removed old cache {}", partition);
                    }
                    eprintln!("Version {} is active", version);
                }
                _ => eprintln!("No version is waiting"),
            }
            store.save(&router)?;
        }
        CacheCommand::Ls => {
            let registration = router.registration();
            let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
            println!(
                "installing: {}  waiting: {}  active: {}{}",
                show(&registration.installing),
                show(&registration.waiting),
                show(&registration.active),
                if registration.controlling { " (controlling)" } else { "" }
            );
            let current = [router.config().static_partition(), router.config().dynamic_partition()];
            for partition in router.storage().keys()? {
                let entries = router.storage().entries(&partition)?;
                let marker = if current.contains(&partition) { "*" } else { " " };
                println!("{marker} {partition} ({} entries)", entries.len());
                for url in entries {
                    println!("    {url}");
                }
            }
        }
        CacheCommand::Add { urls } => {
            if let MessageOutcome::Cached(urls) = router.handle_message(ControlMessage::CacheUrls { urls })? {
                for url in urls {
                    println!("Cached {url}");
                }
            }
        }
        CacheCommand::Fetch { url, navigate } => {
            let request = if navigate {
                Request::navigate(url)
            } else {
                Request::get(url)
            };
            let class = router.classify(&request);
            let response = router.route(&request)?;
            eprintln!("{} {} ({:?})", response.status, response.status_text, class);
            let mut stdout = std::io::stdout();
            stdout.write_all(&response.body)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
