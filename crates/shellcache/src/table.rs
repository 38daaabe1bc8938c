//! Sharded JSONL tables: one directory per table, rows spread over
//! `items_<prefix>.jsonl` files by the leading characters of their hashed id.

use std::collections::HashMap;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::error::CacheError;

pub trait TableRow: Clone + Serialize + DeserializeOwned {
    /// Natural key the row is looked up by.
    fn key(&self) -> &str;
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

pub fn hash_id(raw: &str, id_length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())[..id_length].to_string()
}

pub fn id_length_for_capacity(expected_items: usize) -> usize {
    if expected_items <= 1 {
        return 4;
    }
    let k = expected_items as f64;
    let n = (500.0 * k * k).ln() / 16_f64.ln();
    (n.ceil() as usize).clamp(4, 64)
}

fn is_shard_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|f| f.to_str())
        .is_some_and(|f| f.starts_with("items_") && f.ends_with(".jsonl"))
}

pub struct Table<T: TableRow> {
    items: HashMap<String, T>,
    dir: PathBuf,
    shard_characters: usize,
    id_length: usize,
}

impl<T: TableRow> Table<T> {
    pub fn load(dir: &Path, shard_characters: usize, expected_items: usize) -> Result<Self, CacheError> {
        let mut table = Self {
            items: HashMap::new(),
            dir: dir.to_path_buf(),
            shard_characters,
            id_length: id_length_for_capacity(expected_items),
        };
        let entries = match fs::read_dir(&table.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(table),
            Err(e) => return Err(CacheError::io(&table.dir, e)),
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_shard_file(&path) {
                continue;
            }
            let file = fs::File::open(&path).map_err(|e| CacheError::io(&path, e))?;
            for line in std::io::BufReader::new(file).lines() {
                let line = line.map_err(|e| CacheError::io(&path, e))?;
                if line.trim().is_empty() {
                    continue;
                }
                let item: T =
                    serde_json::from_str(&line).map_err(|e| CacheError::corrupt(&path, e))?;
                table.items.insert(item.id().to_string(), item);
            }
        }
        Ok(table)
    }

    pub fn upsert(&mut self, mut item: T) {
        item.set_id(hash_id(item.key(), self.id_length));
        self.items.insert(item.id().to_string(), item);
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.get(&hash_id(key, self.id_length))
    }

    fn shard_key<'a>(&self, id: &'a str) -> &'a str {
        let end = self.shard_characters.min(id.len());
        &id[..end]
    }

    pub fn save(&self) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|e| CacheError::io(&self.dir, e))?;

        // Remove all existing shard files
        let entries = fs::read_dir(&self.dir).map_err(|e| CacheError::io(&self.dir, e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if is_shard_file(&path) {
                fs::remove_file(&path).map_err(|e| CacheError::io(&path, e))?;
            }
        }

        let mut shards: HashMap<&str, Vec<&T>> = HashMap::new();
        for item in self.items.values() {
            shards.entry(self.shard_key(item.id())).or_default().push(item);
        }

        for (prefix, mut items) in shards {
            items.sort_by(|a, b| a.id().cmp(b.id()));
            let path = self.dir.join(format!("items_{prefix}.jsonl"));
            let mut out = String::new();
            for item in items {
                let line = serde_json::to_string(item).map_err(|e| CacheError::corrupt(&path, e))?;
                out.push_str(&line);
                out.push('\n');
            }
            fs::write(&path, out).map_err(|e| CacheError::io(&path, e))?;
        }
        Ok(())
    }

    pub fn items(&self) -> Vec<T> {
        self.items.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
