//! Persisted key-value store adapter.
//!
//! A [`PersistedSlot`] is the in-memory view of one named slot. It is loaded
//! once on construction and written back after every update. The in-memory
//! value is authoritative for the rest of the session: a failed write is
//! logged and counted, never rolled back and never returned to the caller.

use std::sync::Arc;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::slot_backend::SlotBackend;

pub struct PersistedSlot<T> {
    key: String,
    value: T,
    backend: Arc<dyn SlotBackend>,
    failed_writes: usize,
}

impl<T> PersistedSlot<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Reads `key` from `backend`, falling back to `default` when the slot is
    /// absent or cannot be decoded.
    pub fn load(backend: Arc<dyn SlotBackend>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let value = match backend.read(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Error decoding slot \"{key}\", using default: {e}");
                    default
                }
            },
            Ok(None) => {
                debug!("Slot \"{key}\" is empty, using default");
                default
            }
            Err(e) => {
                warn!("Error reading slot \"{key}\", using default: {e}");
                default
            }
        };

        Self {
            key,
            value,
            backend,
            failed_writes: 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Number of writes that failed since the slot was loaded.
    pub fn failed_writes(&self) -> usize {
        self.failed_writes
    }

    /// Replaces the value and persists it.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.persist();
    }

    /// Computes the next value from the previous one and persists it.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next);
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.value) {
            Ok(json) => json,
            Err(e) => {
                self.failed_writes += 1;
                warn!("Error serializing slot \"{}\": {e}", self.key);
                return;
            }
        };

        if let Err(e) = self.backend.write(&self.key, &json) {
            self.failed_writes += 1;
            warn!("Error setting slot \"{}\": {e}", self.key);
        }
    }
}
