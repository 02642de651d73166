use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value as JsonValue;

use super::ClientStore;
use crate::error::SessionResult;
use crate::tprintln;

/// JSON-file backed store so the session survives a process restart (the
/// native equivalent of a page reload). Every write rewrites the file through
/// a temp file and rename; memory only changes once the rename succeeded.
#[derive(Clone)]
pub struct FileStore {
    path: PathBuf,
    map: Arc<RwLock<BTreeMap<String, JsonValue>>>,
}

impl FileStore {
    /// Open `path`, loading any existing entries. A missing file is an empty
    /// store; an unreadable or corrupt file is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> SessionResult<Self> {
        let path = path.as_ref().to_path_buf();
        let map = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(target: "ssui::store", "opened file store {} entries={}", path.display(), map.len());
        Ok(Self { path, map: Arc::new(RwLock::new(map)) })
    }

    pub fn path(&self) -> &Path { &self.path }

    fn flush(&self, map: &BTreeMap<String, JsonValue>) -> SessionResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        fs::rename(&tmp, &self.path)?;
        tprintln!("store.flush path={} entries={}", self.path.display(), map.len());
        Ok(())
    }
}

impl ClientStore for FileStore {
    fn get(&self, key: &str) -> Option<JsonValue> {
        self.map.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: JsonValue) -> SessionResult<()> {
        let mut w = self.map.write();
        let mut next = (*w).clone();
        next.insert(key.to_string(), value);
        self.flush(&next)?;
        *w = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> SessionResult<bool> {
        let mut w = self.map.write();
        if !w.contains_key(key) {
            return Ok(false);
        }
        let mut next = (*w).clone();
        next.remove(key);
        self.flush(&next)?;
        *w = next;
        Ok(true)
    }
}
