//! Dataset storage.
//!
//! Each upload becomes an immutable [`DatasetSnapshot`] with a version one
//! higher than the one it replaces. Readers clone the `Arc` of the current
//! snapshot and parse it outside any lock, so an upload landing mid-query
//! never changes what that query sees.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One uploaded file, frozen.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSnapshot {
    pub dataset_id: String,
    pub version: u64,
    /// Client-side file name, used to pick a parser.
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub bytes: Arc<[u8]>,
}

/// Where uploads live between requests.
pub trait DatasetStore: Send + Sync {
    /// Replace the dataset under `dataset_id`, returning the new snapshot.
    fn put(&self, dataset_id: &str, filename: &str, bytes: Vec<u8>) -> Result<Arc<DatasetSnapshot>>;

    /// The current snapshot, or `None` before the first upload.
    fn get(&self, dataset_id: &str) -> Result<Option<Arc<DatasetSnapshot>>>;
}

fn next_snapshot(
    previous: Option<&Arc<DatasetSnapshot>>,
    dataset_id: &str,
    filename: &str,
    bytes: Vec<u8>,
) -> DatasetSnapshot {
    DatasetSnapshot {
        dataset_id: dataset_id.to_string(),
        version: previous.map_or(1, |s| s.version + 1),
        filename: filename.to_string(),
        uploaded_at: Utc::now(),
        bytes: bytes.into(),
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Keeps snapshots in process memory only.
#[derive(Debug, Default)]
pub struct MemoryDatasetStore {
    current: RwLock<HashMap<String, Arc<DatasetSnapshot>>>,
}

impl MemoryDatasetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DatasetStore for MemoryDatasetStore {
    fn put(&self, dataset_id: &str, filename: &str, bytes: Vec<u8>) -> Result<Arc<DatasetSnapshot>> {
        let mut current = self.current.write();
        let snapshot = Arc::new(next_snapshot(
            current.get(dataset_id),
            dataset_id,
            filename,
            bytes,
        ));
        current.insert(dataset_id.to_string(), snapshot.clone());
        Ok(snapshot)
    }

    fn get(&self, dataset_id: &str) -> Result<Option<Arc<DatasetSnapshot>>> {
        Ok(self.current.read().get(dataset_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Sidecar metadata written next to the raw upload.
#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    version: u64,
    filename: String,
    uploaded_at: DateTime<Utc>,
}

/// Persists the latest upload per dataset id under a directory:
///
/// ```text
/// <dir>/<id>.data   raw uploaded bytes
/// <dir>/<id>.json   manifest (version, filename, upload time)
/// ```
///
/// Both files are written to a temporary sibling and renamed into place.
/// Snapshots are also cached in memory, so only the first read after a
/// restart touches the disk.
#[derive(Debug)]
pub struct FileDatasetStore {
    dir: PathBuf,
    cache: RwLock<HashMap<String, Arc<DatasetSnapshot>>>,
}

impl FileDatasetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn data_path(&self, dataset_id: &str) -> PathBuf {
        self.dir.join(format!("{dataset_id}.data"))
    }

    fn manifest_path(&self, dataset_id: &str) -> PathBuf {
        self.dir.join(format!("{dataset_id}.json"))
    }

    fn read_from_disk(&self, dataset_id: &str) -> Result<Option<DatasetSnapshot>> {
        let manifest_path = self.manifest_path(dataset_id);
        if !manifest_path.exists() {
            return Ok(None);
        }
        let manifest: Manifest = serde_json::from_slice(&fs::read(&manifest_path)?)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let bytes = fs::read(self.data_path(dataset_id))?;
        log::info!(
            "restored dataset '{dataset_id}' v{} ({}) from {}",
            manifest.version,
            manifest.filename,
            self.dir.display()
        );
        Ok(Some(DatasetSnapshot {
            dataset_id: dataset_id.to_string(),
            version: manifest.version,
            filename: manifest.filename,
            uploaded_at: manifest.uploaded_at,
            bytes: bytes.into(),
        }))
    }
}

/// `<path>.tmp`, so sibling files never share a temporary.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write and sync `contents` to the temporary sibling of `path`.
fn write_tmp(path: &Path, contents: &[u8]) -> std::io::Result<PathBuf> {
    let tmp = tmp_path(path);
    let mut file = fs::File::create(&tmp)?;
    file.write_all(contents)?;
    file.sync_all()?;
    Ok(tmp)
}

/// Write `contents` to `path` via a temporary file in the same directory.
fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp = write_tmp(path, contents)?;
    fs::rename(&tmp, path)
}

impl DatasetStore for FileDatasetStore {
    fn put(&self, dataset_id: &str, filename: &str, bytes: Vec<u8>) -> Result<Arc<DatasetSnapshot>> {
        let mut cache = self.cache.write();
        let previous = match cache.get(dataset_id) {
            Some(s) => Some(s.clone()),
            None => self.read_from_disk(dataset_id)?.map(Arc::new),
        };
        let snapshot = next_snapshot(previous.as_ref(), dataset_id, filename, bytes);

        let manifest = Manifest {
            version: snapshot.version,
            filename: snapshot.filename.clone(),
            uploaded_at: snapshot.uploaded_at,
        };
        let manifest_json = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let data_path = self.data_path(dataset_id);
        let manifest_path = self.manifest_path(dataset_id);

        // Nothing live changes until both temporaries are on disk.
        let data_tmp = write_tmp(&data_path, &snapshot.bytes)?;
        let manifest_tmp = match write_tmp(&manifest_path, &manifest_json) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = fs::remove_file(&data_tmp);
                return Err(e.into());
            }
        };

        if let Err(e) = fs::rename(&data_tmp, &data_path) {
            let _ = fs::remove_file(&data_tmp);
            let _ = fs::remove_file(&manifest_tmp);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&manifest_tmp, &manifest_path) {
            let _ = fs::remove_file(&manifest_tmp);
            match &previous {
                Some(prev) => {
                    if let Err(restore) = write_atomically(&data_path, &prev.bytes) {
                        log::error!(
                            "dataset '{dataset_id}': manifest update failed and v{} data could not be restored: {restore}",
                            prev.version
                        );
                    }
                }
                None => {
                    let _ = fs::remove_file(&data_path);
                }
            }
            log::error!("dataset '{dataset_id}': manifest update failed: {e}");
            return Err(e.into());
        }

        let snapshot = Arc::new(snapshot);
        cache.insert(dataset_id.to_string(), snapshot.clone());
        Ok(snapshot)
    }

    fn get(&self, dataset_id: &str) -> Result<Option<Arc<DatasetSnapshot>>> {
        if let Some(s) = self.cache.read().get(dataset_id) {
            return Ok(Some(s.clone()));
        }
        let mut cache = self.cache.write();
        if let Some(s) = cache.get(dataset_id) {
            return Ok(Some(s.clone()));
        }
        match self.read_from_disk(dataset_id)? {
            Some(snapshot) => {
                let snapshot = Arc::new(snapshot);
                cache.insert(dataset_id.to_string(), snapshot.clone());
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }
}
