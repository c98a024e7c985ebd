use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

use crate::fs_util::write_atomic;
use crate::secrets::{CredentialStore, SecretKey};

/// Credentials as a flat JSON object on disk, e.g. `{"geminiApiKey": "..."}`.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> anyhow::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read settings: {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse settings: {}", self.path.display()))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(entries).context("encode settings JSON")?;
        write_atomic(&self.path, &json)
            .with_context(|| format!("failed to write settings: {}", self.path.display()))
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> anyhow::Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        let mut entries = self.read_all()?;
        f(&mut entries);
        self.write_all(&entries)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: SecretKey) -> anyhow::Result<Option<String>> {
        Ok(self.read_all()?.remove(key.storage_key()))
    }

    fn set(&self, key: SecretKey, value: &str) -> anyhow::Result<()> {
        self.update(|entries| {
            entries.insert(key.storage_key().to_string(), value.to_string());
        })
    }

    fn delete(&self, key: SecretKey) -> anyhow::Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|entries| {
            entries.remove(key.storage_key());
        })
    }
}
