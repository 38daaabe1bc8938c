use url::{Origin, Url};

use crate::error::LifecycleError;

/// Shell files every version caches at install time, relative to the app base.
pub const SHELL_FILES: &[&str] = &[
    "./",
    "./index.html",
    "./src/main.js",
    "./src/style.css",
    "./manifest.json",
    "./public/icon-192x192.png",
    "./public/icon-512x512.png",
];

/// The document served for navigations when the network is gone.
pub const SHELL_DOCUMENT: &str = "./index.html";

const PARTITION_PREFIX: &str = "newsportal";

/// Everything a router version is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub version: String,
    pub app_base: Url,
    pub api_origin: Origin,
    pub shell_files: Vec<Url>,
}

impl RouterConfig {
    pub fn new(version: &str, app_base: Url, api_base: &Url) -> Result<Self, LifecycleError> {
        Self::with_shell_files(version, app_base, api_base, SHELL_FILES)
    }

    pub fn with_shell_files(
        version: &str,
        app_base: Url,
        api_base: &Url,
        shell_files: &[&str],
    ) -> Result<Self, LifecycleError> {
        let shell_files = shell_files
            .iter()
            .map(|file| {
                app_base
                    .join(file)
                    .map_err(|_| LifecycleError::InvalidUrl(file.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            version: version.to_string(),
            api_origin: api_base.origin(),
            app_base,
            shell_files,
        })
    }

    pub fn static_partition(&self) -> String {
        format!("{PARTITION_PREFIX}-static-v{}", self.version)
    }

    pub fn dynamic_partition(&self) -> String {
        format!("{PARTITION_PREFIX}-dynamic-v{}", self.version)
    }

    pub fn shell_document(&self) -> Url {
        self.app_base
            .join(SHELL_DOCUMENT)
            .unwrap_or_else(|_| self.app_base.clone())
    }

    pub fn is_shell_file(&self, url: &Url) -> bool {
        self.shell_files.iter().any(|file| file == url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RouterConfig {
        RouterConfig::new(
            "1.0.0",
            Url::parse("https://portal.example/app/").unwrap(),
            &Url::parse("https://api.example/").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_partition_names_carry_version() {
        let config = config();
        assert_eq!(config.static_partition(), "newsportal-static-v1.0.0");
        assert_eq!(config.dynamic_partition(), "newsportal-dynamic-v1.0.0");
    }

    #[test]
    fn test_shell_files_resolve_against_app_base() {
        let config = config();
        assert_eq!(config.shell_files[0].as_str(), "https://portal.example/app/");
        assert_eq!(
            config.shell_document().as_str(),
            "https://portal.example/app/index.html"
        );
        assert!(config.is_shell_file(&Url::parse("https://portal.example/app/src/main.js").unwrap()));
    }

    #[test]
    fn test_shell_match_is_exact() {
        let config = config();
        for url in [
            "https://portal.example/app/src/main.js?v=2",
            "https://portal.example/app/other.js",
            "https://elsewhere.example/app/index.html",
        ] {
            assert!(!config.is_shell_file(&Url::parse(url).unwrap()), "{url}");
        }
    }
}
