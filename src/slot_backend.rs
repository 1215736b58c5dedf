//! Storage seam for named slots.
//!
//! A slot holds one serialized value (in practice a JSON array of records).
//! The persisted-slot adapter only talks to this trait, so the same
//! collection code runs over LMDB on device and over memory in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::app_response::AppResponse;

pub trait SlotBackend: Send + Sync {
    /// Returns the raw serialized value stored under `slot`, if any.
    fn read(&self, slot: &str) -> Result<Option<String>, AppResponse>;

    /// Replaces the value stored under `slot`.
    fn write(&self, slot: &str, value: &str) -> Result<(), AppResponse>;

    /// Removes `slot`. Returns `false` when nothing was stored.
    fn remove(&self, slot: &str) -> Result<bool, AppResponse>;
}

/// Process-local backend. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySlotBackend {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds a slot with an already serialized value.
    pub fn with_slot(self, slot: &str, value: &str) -> Self {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(slot.to_string(), value.to_string());
        }
        self
    }

    fn lock_err() -> AppResponse {
        AppResponse::DatabaseError("Memory backend lock poisoned".to_string())
    }
}

impl SlotBackend for MemorySlotBackend {
    fn read(&self, slot: &str) -> Result<Option<String>, AppResponse> {
        let slots = self.slots.lock().map_err(|_| Self::lock_err())?;
        Ok(slots.get(slot).cloned())
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), AppResponse> {
        let mut slots = self.slots.lock().map_err(|_| Self::lock_err())?;
        slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<bool, AppResponse> {
        let mut slots = self.slots.lock().map_err(|_| Self::lock_err())?;
        Ok(slots.remove(slot).is_some())
    }
}
