// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Key-value backends for session state.

use crate::error::{AppError, Result};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Durable string key-value storage for session values.
///
/// Reads are served from memory; writes may touch disk and can fail.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Set several keys. Backends that persist should do this in one write.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Remove several keys. Backends that persist should do this in one write.
    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// In-process store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// JSON file store that survives restarts.
///
/// The whole map is rewritten on each mutation via a temp file and rename,
/// so a crash never leaves a half-written session file behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing contents if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                AppError::Storage(format!("failed to read {}: {}", path.display(), e))
            })?;
            let values: BTreeMap<String, String> = serde_json::from_str(&content)
                .map_err(|e| {
                    AppError::Storage(format!("failed to parse {}: {}", path.display(), e))
                })?;
            tracing::debug!(path = %path.display(), keys = values.len(), "Loaded session file");
            values
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| AppError::Storage("session store lock poisoned".to_string()))?;
        apply(&mut values);
        self.persist(&values)
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::Storage(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(values)
            .map_err(|e| AppError::Storage(format!("failed to serialize session: {}", e)))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, content)
            .map_err(|e| AppError::Storage(format!("failed to write {}: {}", tmp.display(), e)))?;

        // Tokens inside: owner-only on Unix, set before the file takes its final name
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600)).map_err(|e| {
                AppError::Storage(format!("failed to restrict {}: {}", tmp.display(), e))
            })?;
        }

        fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::Storage(format!("failed to replace {}: {}", self.path.display(), e))
        })
    }
}

impl TokenStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.mutate(|values| {
            values.remove(key);
        })
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.mutate(|values| {
            for (key, value) in entries {
                values.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        self.mutate(|values| {
            for key in keys {
                values.remove(*key);
            }
        })
    }
}
