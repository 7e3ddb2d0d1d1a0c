use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::app::ports::KeyValueStore;

/// One file per logical name under a directory. Writes go through a temp
/// file and a rename so a crash never leaves a half-written value.
#[derive(Clone, Debug)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(anyhow!("invalid store name: {:?}", name));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, name: &str) -> Result<Option<String>> {
        let path = self.path_for(name)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    async fn set(&self, name: &str, value: &str) -> Result<()> {
        let path = self.path_for(name)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }
}

/// Process-local store. Values do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(name: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(name.to_string(), value.to_string());
        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(name).cloned())
    }

    async fn set(&self, name: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(name.to_string(), value.to_string());
        Ok(())
    }
}
