use std::path::PathBuf;

use clap::Args;
use url::Url;

pub(crate) const DEFAULT_API: &str = "https://jsonplaceholder.typicode.com";
pub(crate) const DEFAULT_APP: &str = "http://localhost:8080/";

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub(crate) struct Settings {
    /// Directory holding the response cache and the router registration
    #[arg(long, env = "NEWS_STORE", global = true)]
    store: Option<PathBuf>,
    /// Base URL of the posts/users API
    #[arg(long, env = "NEWS_API", default_value = DEFAULT_API, global = true)]
    pub api: Url,
    /// Base URL the portal is served from
    #[arg(long, env = "NEWS_APP", default_value = DEFAULT_APP, global = true)]
    pub app: Url,
    /// Router version; a change installs fresh caches and drops the old ones
    #[arg(long, env = "NEWS_CACHE_VERSION", default_value = env!("CARGO_PKG_VERSION"), global = true)]
    pub cache_version: String,
    /// Never touch the network; answer from the cache only
    #[arg(long, global = true)]
    pub offline: bool,
}

impl Settings {
    pub fn store_dir(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|dir| dir.join("newsdesk"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        settings: Settings,
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["news"]).unwrap();
        assert_eq!(cli.settings.api.as_str(), "https://jsonplaceholder.typicode.com/");
        assert_eq!(cli.settings.app.as_str(), DEFAULT_APP);
        assert_eq!(cli.settings.cache_version, env!("CARGO_PKG_VERSION"));
        assert!(!cli.settings.offline);
    }

    #[test]
    fn test_explicit_store_wins() {
        let cli = Cli::try_parse_from(["news", "--store", "/tmp/news", "--offline"]).unwrap();
        assert_eq!(cli.settings.store_dir(), PathBuf::from("/tmp/news"));
        assert!(cli.settings.offline);
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(Cli::try_parse_from(["news", "--api", "not a url"]).is_err());
    }
}
