//! Named cache partitions mapping request URLs to response snapshots.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CacheError;
use crate::http::Response;
use crate::table::{Table, TableRow};

/// A named-partition key-value store over request URLs and responses.
///
/// Implementations take `&self` everywhere: the router fans requests out over
/// several threads. Concurrent writes to one URL are last-write-wins.
pub trait CacheStorage: Send + Sync {
    /// Create the partition if it does not exist yet.
    fn open(&self, partition: &str) -> Result<(), CacheError>;
    fn lookup(&self, partition: &str, url: &Url) -> Result<Option<Response>, CacheError>;
    fn put(&self, partition: &str, url: &Url, response: &Response) -> Result<(), CacheError>;
    /// Names of every existing partition, sorted.
    fn keys(&self) -> Result<Vec<String>, CacheError>;
    /// Returns whether a partition was removed.
    fn delete(&self, partition: &str) -> Result<bool, CacheError>;
    /// Cached URLs of one partition, sorted.
    fn entries(&self, partition: &str) -> Result<Vec<String>, CacheError>;
}

impl<S: CacheStorage + ?Sized> CacheStorage for Box<S> {
    fn open(&self, partition: &str) -> Result<(), CacheError> {
        (**self).open(partition)
    }
    fn lookup(&self, partition: &str, url: &Url) -> Result<Option<Response>, CacheError> {
        (**self).lookup(partition, url)
    }
    fn put(&self, partition: &str, url: &Url, response: &Response) -> Result<(), CacheError> {
        (**self).put(partition, url, response)
    }
    fn keys(&self) -> Result<Vec<String>, CacheError> {
        (**self).keys()
    }
    fn delete(&self, partition: &str) -> Result<bool, CacheError> {
        (**self).delete(partition)
    }
    fn entries(&self, partition: &str) -> Result<Vec<String>, CacheError> {
        (**self).entries(partition)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedResponse {
    #[serde(default)]
    id: String,
    url: String,
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    body: String,
    stored_at: DateTime<Utc>,
}

impl TableRow for CachedResponse {
    fn key(&self) -> &str {
        &self.url
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl CachedResponse {
    fn capture(url: &Url, response: &Response) -> Self {
        Self {
            id: String::new(),
            url: url.to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            headers: response.headers.clone(),
            body: STANDARD.encode(&response.body),
            stored_at: Utc::now(),
        }
    }

    fn restore(&self) -> Result<Response, CacheError> {
        let body = STANDARD.decode(&self.body).map_err(|_| CacheError::Body {
            url: self.url.clone(),
        })?;
        Ok(Response {
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body,
        })
    }
}

const SHARD_CHARACTERS: usize = 1;
const EXPECTED_ENTRIES: usize = 100_000;

/// Partitions stored as directories of sharded JSONL files under `root`.
pub struct DiskStorage {
    root: PathBuf,
    guard: Mutex<()>,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn partition_dir(&self, partition: &str) -> PathBuf {
        self.root.join(partition)
    }

    fn table(&self, partition: &str) -> Result<Table<CachedResponse>, CacheError> {
        Table::load(&self.partition_dir(partition), SHARD_CHARACTERS, EXPECTED_ENTRIES)
    }
}

impl CacheStorage for DiskStorage {
    fn open(&self, partition: &str) -> Result<(), CacheError> {
        let dir = self.partition_dir(partition);
        fs::create_dir_all(&dir).map_err(|e| CacheError::io(&dir, e))
    }

    fn lookup(&self, partition: &str, url: &Url) -> Result<Option<Response>, CacheError> {
        let _guard = lock(&self.guard);
        let table = self.table(partition)?;
        table.get(url.as_str()).map(CachedResponse::restore).transpose()
    }

    fn put(&self, partition: &str, url: &Url, response: &Response) -> Result<(), CacheError> {
        let _guard = lock(&self.guard);
        let mut table = self.table(partition)?;
        table.upsert(CachedResponse::capture(url, response));
        table.save()
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(&self.root, e)),
        };
        let mut names: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn delete(&self, partition: &str) -> Result<bool, CacheError> {
        let _guard = lock(&self.guard);
        let dir = self.partition_dir(partition);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(&dir, e)),
        }
    }

    fn entries(&self, partition: &str) -> Result<Vec<String>, CacheError> {
        let _guard = lock(&self.guard);
        let mut urls: Vec<String> = self
            .table(partition)?
            .items()
            .into_iter()
            .map(|row| row.url)
            .collect();
        urls.sort();
        Ok(urls)
    }
}

/// Process-local partitions, used by tests and throwaway routers.
#[derive(Default)]
pub struct MemoryStorage {
    partitions: Mutex<BTreeMap<String, BTreeMap<String, Response>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryStorage {
    fn open(&self, partition: &str) -> Result<(), CacheError> {
        lock(&self.partitions).entry(partition.to_string()).or_default();
        Ok(())
    }

    fn lookup(&self, partition: &str, url: &Url) -> Result<Option<Response>, CacheError> {
        Ok(lock(&self.partitions)
            .get(partition)
            .and_then(|entries| entries.get(url.as_str()))
            .cloned())
    }

    fn put(&self, partition: &str, url: &Url, response: &Response) -> Result<(), CacheError> {
        lock(&self.partitions)
            .entry(partition.to_string())
            .or_default()
            .insert(url.to_string(), response.clone());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(lock(&self.partitions).keys().cloned().collect())
    }

    fn delete(&self, partition: &str) -> Result<bool, CacheError> {
        Ok(lock(&self.partitions).remove(partition).is_some())
    }

    fn entries(&self, partition: &str) -> Result<Vec<String>, CacheError> {
        Ok(lock(&self.partitions)
            .get(partition)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://news.example/").unwrap().join(path).unwrap()
    }

    fn response(body: &str) -> Response {
        Response::text(200, "OK", body)
    }

    enum Backend {
        Disk(DiskStorage, TempDir),
        Memory(MemoryStorage),
    }

    impl Backend {
        fn storage(&self) -> &dyn CacheStorage {
            match self {
                Backend::Disk(storage, _) => storage,
                Backend::Memory(storage) => storage,
            }
        }
    }

    fn disk() -> Backend {
        let dir = TempDir::new().unwrap();
        Backend::Disk(DiskStorage::new(dir.path().join("caches")), dir)
    }

    fn memory() -> Backend {
        Backend::Memory(MemoryStorage::new())
    }

    #[rstest]
    #[case::disk(disk())]
    #[case::memory(memory())]
    fn test_put_then_lookup_returns_snapshot(#[case] backend: Backend) {
        let storage = backend.storage();
        let original = Response::json(200, "OK", &serde_json::json!([{"id": 1}]))
            .with_header("ETag", "\"abc\"");
        storage.put("dynamic", &url("posts"), &original).unwrap();

        let cached = storage.lookup("dynamic", &url("posts")).unwrap().unwrap();
        assert_eq!(cached, original);
        assert!(storage.lookup("dynamic", &url("users")).unwrap().is_none());
        assert!(storage.lookup("static", &url("posts")).unwrap().is_none());
    }

    #[rstest]
    #[case::disk(disk())]
    #[case::memory(memory())]
    fn test_put_overwrites_previous_entry(#[case] backend: Backend) {
        let storage = backend.storage();
        storage.put("p", &url("a"), &response("old")).unwrap();
        storage.put("p", &url("a"), &response("new")).unwrap();

        let cached = storage.lookup("p", &url("a")).unwrap().unwrap();
        assert_eq!(cached.body, b"new");
        assert_eq!(storage.entries("p").unwrap(), vec![url("a").to_string()]);
    }

    #[rstest]
    #[case::disk(disk())]
    #[case::memory(memory())]
    fn test_keys_and_delete(#[case] backend: Backend) {
        let storage = backend.storage();
        assert!(storage.keys().unwrap().is_empty());

        storage.open("b-partition").unwrap();
        storage.put("a-partition", &url("x"), &response("x")).unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["a-partition", "b-partition"]);

        assert!(storage.delete("a-partition").unwrap());
        assert!(!storage.delete("a-partition").unwrap());
        assert_eq!(storage.keys().unwrap(), vec!["b-partition"]);
        assert!(storage.lookup("a-partition", &url("x")).unwrap().is_none());
    }

    #[test]
    fn test_disk_entries_survive_a_new_handle() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("caches");
        DiskStorage::new(&root)
            .put("p", &url("index.html"), &response("<html>"))
            .unwrap();

        let reopened = DiskStorage::new(&root);
        let cached = reopened.lookup("p", &url("index.html")).unwrap().unwrap();
        assert_eq!(cached.text_body(), "<html>");
    }

    #[test]
    fn test_disk_binary_bodies_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path());
        let png = Response::new(200, "OK", vec![0x89, b'P', b'N', b'G', 0, 255]);
        storage.put("static", &url("icon.png"), &png).unwrap();
        let cached = storage.lookup("static", &url("icon.png")).unwrap().unwrap();
        assert_eq!(cached.body, png.body);
    }
}
