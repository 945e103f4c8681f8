use crate::models::ListingRecord;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode known listings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every listing seen so far, keyed by id
///
/// Loaded once, appended to during a cycle and rewritten in full on persist.
/// Entries are never removed.
#[derive(Debug)]
pub struct KnownSetStore {
    path: PathBuf,
    records: Vec<ListingRecord>,
    ids: HashSet<String>,
}

impl KnownSetStore {
    /// Create an empty store that persists to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Load the store from `path`
    ///
    /// A missing, unreadable or corrupt file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::empty(path);

        if !store.path.exists() {
            info!("No known listings at {}. Starting fresh.", store.path.display());
            return store;
        }

        let records = match read_records(&store.path) {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to load known listings: {}. Starting fresh.", e);
                return store;
            }
        };

        for record in records {
            if !store.append(record) {
                warn!("Ignoring duplicate listing id in {}", store.path.display());
            }
        }
        info!("Loaded {} known listings", store.len());

        store
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Add a record unless its id is already known
    ///
    /// Returns `false` when the id was present; the stored record is kept.
    pub fn append(&mut self, record: ListingRecord) -> bool {
        if !self.ids.insert(record.id.clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Write all records to disk, replacing the previous file
    pub fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.records)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Io {
                path: self.path.clone(),
                source,
            });
        }

        Ok(())
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_records(path: &Path) -> Result<Vec<ListingRecord>, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
