use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::DashboardError;

use super::loader::load_file;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Load-once dataset cache
// ---------------------------------------------------------------------------

/// Owns the path of a population file and the dataset read from it.
///
/// The first [`load`](Self::load) reads the file; every later call hands out
/// the same `Arc` without touching the filesystem. The slot is guarded by a
/// mutex held across the read, so concurrent first callers still load once.
/// The dataset is never mutated after it is stored.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    slot: Mutex<Option<Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the memoized dataset, reading the file on first use.
    pub fn load(&self) -> Result<Arc<Dataset>, DashboardError> {
        let mut slot = self.lock();
        if let Some(dataset) = slot.as_ref() {
            return Ok(Arc::clone(dataset));
        }
        let dataset = self.read()?;
        *slot = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drop the memoized dataset and read the file again.
    ///
    /// On failure the previous dataset is kept.
    pub fn reload(&self) -> Result<Arc<Dataset>, DashboardError> {
        let mut slot = self.lock();
        let dataset = self.read()?;
        *slot = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Whether the file has been read.
    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    fn read(&self) -> Result<Arc<Dataset>, DashboardError> {
        match load_file(&self.path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} population records from {}",
                    dataset.len(),
                    self.path.display()
                );
                Ok(Arc::new(dataset))
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", self.path.display());
                Err(DashboardError::data_unavailable(&self.path, e))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<Dataset>>> {
        // The slot only ever holds a fully built dataset, so a poisoned lock
        // still guards a consistent value.
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
