use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use parking_lot::{Mutex, RwLock};

use crate::error::ClientError;
use crate::model::Identity;
use crate::SESSION_STORAGE_KEY;

/// String key/value store shaped like the browser's local storage.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClientError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove_item(&self, key: &str) -> Result<(), ClientError>;
}

/// Durable storage in a single JSON object file.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, ClientError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(items)?)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClientError> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let _guard = self.lock.lock();
        let mut items = self.read_all()?;
        items.insert(key.to_owned(), value.to_owned());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), ClientError> {
        let _guard = self.lock.lock();
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.items.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), ClientError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

/// Persists the current identity under one durable key.
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        SessionStore { storage }
    }

    /// A missing or unreadable entry both read as no session.
    pub fn load(&self) -> Option<Identity> {
        let raw = match self.storage.get_item(SESSION_STORAGE_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("could not read stored session: {}", e);
                return None;
            }
        };

        serde_json::from_str(&raw)
            .map_err(|e| warn!("ignoring unreadable stored session: {}", e))
            .ok()
    }

    pub fn save(&self, identity: &Identity) -> Result<(), ClientError> {
        let raw = serde_json::to_string(identity)?;
        self.storage.set_item(SESSION_STORAGE_KEY, &raw)
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        self.storage.remove_item(SESSION_STORAGE_KEY)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Presence {
    Authenticated(Identity),
    Anonymous,
}

/// Process-wide session. Built once at startup and cloned into whatever
/// needs to read it; only the auth flow and comment auth failures write.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<SessionStore>,
    current: Arc<RwLock<Option<Identity>>>,
}

impl SessionContext {
    pub fn from_store(store: SessionStore) -> Self {
        let current = store.load();
        if let Some(identity) = &current {
            info!("restored session for {}", identity.username);
        }

        SessionContext {
            store: Arc::new(store),
            current: Arc::new(RwLock::new(current)),
        }
    }

    pub fn from_storage(storage: Arc<dyn Storage>) -> Self {
        Self::from_store(SessionStore::new(storage))
    }

    pub fn current(&self) -> Option<Identity> {
        self.current.read().clone()
    }

    pub fn presence(&self) -> Presence {
        match self.current() {
            Some(identity) => Presence::Authenticated(identity),
            None => Presence::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn set(&self, identity: Identity) -> Result<(), ClientError> {
        self.store.save(&identity)?;
        info!("session started for {}", identity.username);
        *self.current.write() = Some(identity);
        Ok(())
    }

    /// Drops the in-memory identity even if the durable entry can't be
    /// removed.
    pub fn clear(&self) -> Result<(), ClientError> {
        if let Some(identity) = self.current.write().take() {
            info!("session ended for {}", identity.username);
        }
        self.store.clear()
    }
}
