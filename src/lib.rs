//! # Field Notebook Core
//!
//! Local-first core of a field notebook for small farmers and livestock
//! owners: notes with photos, farms, phytosanitary product logs, animals and
//! their care records, a holiday-aware calendar and AI care suggestions.
//!
//! Records live in named slots (`notes`, `farms`, `farm_products`,
//! `livestock`, `livestock_care`), each one a JSON array, stored in an LMDB
//! environment on the device.
//!
//! ## Layers
//!
//! - [`local_db_state::LocalSlotDb`] / [`slot_backend::MemorySlotBackend`] - slot storage
//! - [`persisted_slot::PersistedSlot`] - in-memory view of one slot, written back on change
//! - [`collection::CollectionController`] - list/edit state machine over one slot
//! - [`models`] - the entities and their [`plugin::RecordPlugin`]s
//! - [`notebook::Notebook`] - validation, joins and per-parent views
//! - [`router::Router`], [`calendar`], [`suggestions`] - navigation, month grid, AI text
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use field_notebook_core::notebook::Notebook;
//! use field_notebook_core::slot_backend::MemorySlotBackend;
//!
//! let mut notebook = Notebook::open(Arc::new(MemorySlotBackend::new()));
//! notebook.new_note();
//! notebook.notes.update_draft(|note| note.set_text("Revisar riego"));
//! notebook.save_note().expect("note has text");
//! assert_eq!(notebook.notes.items().len(), 1);
//! ```
//!
//! ## FFI Functions
//!
//! Hosts that keep their own UI state can use the slot store directly:
//!
//! - [`create_db`] - open (or create) the LMDB environment
//! - [`read_slot`] / [`write_slot`] / [`remove_slot`] - one slot at a time
//! - [`clear_all_slots`] - drop every slot
//! - [`reset_database`] - delete and recreate the environment
//! - [`close_database`] - release the environment
//! - [`free_response`] - release a string returned by any of the above

pub mod app_response;
pub mod calendar;
pub mod collection;
pub mod config;
pub mod local_db_state;
pub mod lookup;
pub mod models;
pub mod notebook;
pub mod persisted_slot;
pub mod plugin;
pub mod record;
pub mod router;
pub mod slot_backend;
pub mod suggestions;
mod test;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};

use crate::app_response::AppResponse;
use crate::config::DEFAULT_MAP_SIZE;
use crate::local_db_state::LocalSlotDb;
use crate::slot_backend::SlotBackend;

/// Opens the LMDB environment at `path`, creating the directory if needed.
///
/// Returns a null pointer if the path is null, not UTF-8, or the environment
/// cannot be opened. The pointer must eventually be passed to
/// [`close_database`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_db(path: *const c_char) -> *mut LocalSlotDb {
    if path.is_null() {
        warn!("Null path pointer passed to create_db");
        return std::ptr::null_mut();
    }

    let path_str = match unsafe { CStr::from_ptr(path).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in path parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match LocalSlotDb::init(path_str, DEFAULT_MAP_SIZE) {
        Ok(db) => {
            info!("Slot store ready at {path_str}");
            Box::into_raw(Box::new(db))
        }
        Err(e) => {
            warn!("Failed to open slot store at {path_str}: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Returns the JSON stored in `slot` wrapped in `Ok`, or `NotFound`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn read_slot(state: *mut LocalSlotDb, slot: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return null_state("read_slot"),
    };
    let slot = match c_ptr_to_string(slot, "slot") {
        Ok(slot) => slot,
        Err(err) => return err,
    };

    let response = match state.read(&slot) {
        Ok(Some(json)) => AppResponse::Ok(json),
        Ok(None) => AppResponse::NotFound(format!("No value stored in slot: {slot}")),
        Err(e) => e,
    };
    response_to_c_string(&response)
}

/// Replaces the content of `slot`. The value must be valid JSON.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn write_slot(
    state: *mut LocalSlotDb,
    slot: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return null_state("write_slot"),
    };
    let slot = match c_ptr_to_string(slot, "slot") {
        Ok(slot) => slot,
        Err(err) => return err,
    };
    let json = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    if let Err(e) = serde_json::from_str::<serde_json::Value>(&json) {
        let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
        return response_to_c_string(&error);
    }

    let response = match state.write(&slot, &json) {
        Ok(()) => AppResponse::success(format!("Slot '{slot}' saved")),
        Err(e) => e,
    };
    response_to_c_string(&response)
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn remove_slot(state: *mut LocalSlotDb, slot: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return null_state("remove_slot"),
    };
    let slot = match c_ptr_to_string(slot, "slot") {
        Ok(slot) => slot,
        Err(err) => return err,
    };

    let response = match state.remove(&slot) {
        Ok(true) => AppResponse::success(format!("Slot '{slot}' removed")),
        Ok(false) => AppResponse::NotFound(format!("No value stored in slot: {slot}")),
        Err(e) => e,
    };
    response_to_c_string(&response)
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_all_slots(state: *mut LocalSlotDb) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return null_state("clear_all_slots"),
    };

    let response = match state.clear_all_slots() {
        Ok(()) => AppResponse::success("All slots cleared successfully"),
        Err(e) => e,
    };
    response_to_c_string(&response)
}

/// Deletes the environment's files and reopens it empty at the same path.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn reset_database(state: *mut LocalSlotDb) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return null_state("reset_database"),
    };

    let response = match state.reset_database() {
        Ok(()) => AppResponse::success(format!(
            "Database at '{}' was reset successfully",
            state.path().display()
        )),
        Err(e) => AppResponse::DatabaseError(format!("Error resetting database: {e}")),
    };
    response_to_c_string(&response)
}

/// Closes the environment and frees `state`. The pointer is dangling after
/// this call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_database(state: *mut LocalSlotDb) -> *const c_char {
    if state.is_null() {
        return null_state("close_database");
    }

    let mut db = unsafe { Box::from_raw(state) };
    let response = match db.close_database() {
        Ok(()) => AppResponse::success("Database connection closed successfully"),
        Err(e) => e,
    };
    response_to_c_string(&response)
}

/// Frees a string returned by this library. Null is ignored.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

fn null_state(caller: &str) -> *const c_char {
    let error = AppResponse::BadRequest(format!("Null state pointer passed to {caller}"));
    response_to_c_string(&error)
}

/// Serializes `response` to a heap C string owned by the caller.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string argument, turning null and invalid UTF-8 into a
/// `BadRequest` response.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
