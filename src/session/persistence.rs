//! Durable mirror of the session under a fixed key.
//!
//! The stored value is a checksummed envelope around the serialized
//! [`SessionState`]. A value that fails to parse, carries an unsupported
//! version or does not match its checksum is discarded and reported as
//! `CorruptPersistedState`; the caller then starts from the initial state.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::SessionError;
use super::state::SessionState;

/// Fixed key the session is stored under
pub const SESSION_KEY: &str = "formState";

/// Envelope format version
pub const ENVELOPE_VERSION: u32 = 1;

/// A string slot store keyed by name, in the manner of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for &K {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        (**self).remove(key)
    }
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
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

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value)?;
        // Rename is atomic on the same filesystem: readers see old or new, never half.
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.slots().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.slots().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.slots().remove(key);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionEnvelope {
    version: u32,
    /// SHA256 of the compact JSON of `state`
    checksum: String,
    state: SessionState,
}

/// Result of reading the persisted session
#[derive(Debug)]
pub enum LoadOutcome {
    /// Nothing stored under the key
    Empty,
    Restored(SessionState),
    /// The stored value was corrupt and has been removed
    Discarded(SessionError),
}

/// Loads and saves the session under [`SESSION_KEY`]
#[derive(Debug)]
pub struct PersistenceBridge<K: KeyValueStore> {
    store: K,
}

impl<K: KeyValueStore> PersistenceBridge<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Read the persisted session. Corruption is reported, never propagated.
    pub fn load(&self) -> Result<LoadOutcome, SessionError> {
        let Some(raw) = self.store.get(SESSION_KEY)? else {
            return Ok(LoadOutcome::Empty);
        };

        match decode(&raw) {
            Ok(state) => Ok(LoadOutcome::Restored(state)),
            Err(reason) => {
                tracing::warn!(key = SESSION_KEY, %reason, "Discarding corrupt persisted session");
                self.store.remove(SESSION_KEY)?;
                Ok(LoadOutcome::Discarded(SessionError::CorruptPersistedState(
                    reason,
                )))
            }
        }
    }

    /// Overwrite the persisted session with `state`
    pub fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        let contents = encode(state)?;
        self.store.set(SESSION_KEY, &contents)
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        self.store.remove(SESSION_KEY)
    }
}

fn checksum(state: &SessionState) -> Result<String, serde_json::Error> {
    let compact = serde_json::to_string(state)?;
    let mut hasher = Sha256::new();
    hasher.update(compact.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

fn encode(state: &SessionState) -> Result<String, SessionError> {
    let envelope = SessionEnvelope {
        version: ENVELOPE_VERSION,
        checksum: checksum(state)?,
        state: state.clone(),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

fn decode(raw: &str) -> Result<SessionState, String> {
    let envelope: SessionEnvelope =
        serde_json::from_str(raw).map_err(|e| format!("unparseable payload: {}", e))?;

    if envelope.version != ENVELOPE_VERSION {
        return Err(format!(
            "unsupported envelope version {} (expected {})",
            envelope.version, ENVELOPE_VERSION
        ));
    }

    let expected = checksum(&envelope.state).map_err(|e| e.to_string())?;
    if expected != envelope.checksum {
        return Err("checksum mismatch".to_string());
    }

    Ok(envelope.state)
}
