//! Offline-first request routing for a single-page app.
//!
//! A [`CacheRouter`] sits between a page and the [`Network`]. Each request is
//! classified (data API, app shell, navigation, anything else) and answered
//! from the network, a versioned cache partition, or a synthesized fallback.
//! Partitions live behind [`CacheStorage`]; [`DiskStorage`] keeps them as
//! sharded JSONL files so they survive restarts.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod network;
pub mod push;
pub mod router;
pub mod storage;
pub mod table;

pub use config::{RouterConfig, SHELL_FILES};
pub use error::{CacheError, LifecycleError, OfflineError};
pub use http::{Method, Request, RequestMode, Response};
pub use lifecycle::{ActivateReport, ControlMessage, InstallReport, MessageOutcome, Registration};
pub use network::{Disconnected, HttpNetwork, Network};
pub use push::{Notification, PushPayload};
pub use router::{CacheRouter, RequestClass};
pub use storage::{CacheStorage, DiskStorage, MemoryStorage};
