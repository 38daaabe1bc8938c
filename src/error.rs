use shellcache::OfflineError;

/// Why the initial fetch of posts and users produced nothing to show.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("{0}")]
    Network(#[from] OfflineError),
    #[error("{url} answered {status} {status_text}")]
    Status {
        url: String,
        status: u16,
        status_text: String,
    },
    #[error("could not decode {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("no post with id {post_id}")]
pub struct NotFoundError {
    pub post_id: u32,
}

/// A `data-action` name (or browse command) that maps to no controller
/// operation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("unknown action {0:?}")]
    Unknown(String),
    #[error("action {0:?} needs an argument")]
    MissingArgument(String),
    #[error("invalid argument {value:?} for {action:?}: {reason}")]
    Invalid {
        action: String,
        value: String,
        reason: String,
    },
}
