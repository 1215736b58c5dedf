use std::fs;
use std::path::{Path, PathBuf};

use lmdb::{Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::app_response::AppResponse;
use crate::config::NotebookConfig;
use crate::slot_backend::SlotBackend;

const SLOTS_DB: &str = "slots";

/// LMDB environment holding every slot of one notebook.
///
/// Each slot is a single key in the `slots` database; its value is the
/// UTF-8 JSON written by the persisted-slot adapter.
pub struct LocalSlotDb {
    env: Option<Environment>,
    db: Option<Database>,
    path: PathBuf,
    map_size: usize,
}

impl LocalSlotDb {
    pub fn init(path: impl AsRef<Path>, map_size: usize) -> Result<Self, AppResponse> {
        let path = path.as_ref().to_path_buf();
        let (env, db) = Self::open_env(&path, map_size)?;
        info!("LMDB slot store opened at {}", path.display());
        Ok(Self {
            env: Some(env),
            db: Some(db),
            path,
            map_size,
        })
    }

    pub fn from_config(config: &NotebookConfig) -> Result<Self, AppResponse> {
        Self::init(&config.db_path, config.map_size)
    }

    fn open_env(path: &Path, map_size: usize) -> Result<(Environment, Database), AppResponse> {
        fs::create_dir_all(path)?;
        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(map_size)
            .open(path)?;
        let db = env.create_db(Some(SLOTS_DB), DatabaseFlags::empty())?;
        Ok((env, db))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn handles(&self) -> Result<(&Environment, Database), AppResponse> {
        match (&self.env, self.db) {
            (Some(env), Some(db)) => Ok((env, db)),
            _ => Err(AppResponse::DatabaseError(
                "Database connection is closed".to_string(),
            )),
        }
    }

    pub fn clear_all_slots(&self) -> Result<(), AppResponse> {
        let (env, db) = self.handles()?;
        let mut txn = env.begin_rw_txn()?;
        txn.clear_db(db)?;
        txn.commit()?;
        info!("All slots cleared at {}", self.path.display());
        Ok(())
    }

    /// Closes the environment, deletes its files and reopens it empty.
    pub fn reset_database(&mut self) -> Result<(), AppResponse> {
        self.close_database()?;
        if self.path.exists() {
            fs::remove_dir_all(&self.path)?;
        }
        let (env, db) = Self::open_env(&self.path, self.map_size)?;
        self.env = Some(env);
        self.db = Some(db);
        info!("Slot store reset at {}", self.path.display());
        Ok(())
    }

    pub fn close_database(&mut self) -> Result<(), AppResponse> {
        if let Some(env) = self.env.take() {
            if let Err(e) = env.sync(true) {
                warn!("Failed to sync LMDB before close: {e:?}");
            }
        }
        self.db = None;
        Ok(())
    }
}

impl SlotBackend for LocalSlotDb {
    fn read(&self, slot: &str) -> Result<Option<String>, AppResponse> {
        let (env, db) = self.handles()?;
        let txn = env.begin_ro_txn()?;
        let value = match txn.get(db, &slot) {
            Ok(bytes) => {
                let text = std::str::from_utf8(bytes).map_err(|e| {
                    AppResponse::SerializationError(format!("Slot '{slot}' is not UTF-8: {e}"))
                })?;
                Some(text.to_string())
            }
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        txn.commit()?;
        debug!("Read slot '{}' (present: {})", slot, value.is_some());
        Ok(value)
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), AppResponse> {
        let (env, db) = self.handles()?;
        let mut txn = env.begin_rw_txn()?;
        txn.put(db, &slot, &value, WriteFlags::empty())?;
        txn.commit()?;
        debug!("Wrote slot '{}' ({} bytes)", slot, value.len());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<bool, AppResponse> {
        let (env, db) = self.handles()?;
        let mut txn = env.begin_rw_txn()?;
        let removed = match txn.del(db, &slot, None) {
            Ok(()) => true,
            Err(lmdb::Error::NotFound) => false,
            Err(e) => return Err(e.into()),
        };
        txn.commit()?;
        Ok(removed)
    }
}
