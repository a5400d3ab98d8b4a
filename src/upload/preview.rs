use super::types::SelectedFile;
use crate::api::FileSource;
use crate::error::{ClientError, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tempfile::TempPath;
use tracing::debug;
use url::Url;

/// Revocable reference to the content of a selected file.
///
/// Not `Clone`: its single owner returns it to the store that issued it.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: u64,
    url: String,
}

impl PreviewHandle {
    pub fn new(id: u64, url: impl Into<String>) -> Self {
        Self { id, url: url.into() }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

pub trait PreviewStore: Send + Sync {
    fn create(&self, file: &SelectedFile) -> Result<PreviewHandle>;

    fn revoke(&self, handle: PreviewHandle);
}

/// File a live preview resolves to.
enum PreviewTarget {
    Source(PathBuf),
    // TempPath deletes the file on drop
    Copy(TempPath),
}

impl PreviewTarget {
    fn path(&self) -> &Path {
        match self {
            PreviewTarget::Source(path) => path.as_path(),
            PreviewTarget::Copy(path) => &**path,
        }
    }
}

/// Resolves previews to files the system player can open.
///
/// Files selected from disk are previewed in place. In-memory content is
/// written to a temporary file, deleted when its handle is revoked or the
/// store is dropped.
pub struct TempFilePreviewStore {
    dir: PathBuf,
    next_id: AtomicU64,
    live: Mutex<HashMap<u64, PreviewTarget>>,
}

impl TempFilePreviewStore {
    pub fn new() -> Self {
        Self::in_dir(std::env::temp_dir())
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_id: AtomicU64::new(1),
            live: Mutex::new(HashMap::new()),
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn path_of(&self, handle: &PreviewHandle) -> Option<PathBuf> {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&handle.id)
            .map(|target| target.path().to_path_buf())
    }

    fn copy_to_temp(&self, name: &str, bytes: &[u8]) -> Result<TempPath> {
        let suffix = Path::new(name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut temp = tempfile::Builder::new()
            .prefix("fisio-preview-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        temp.write_all(bytes)?;
        temp.flush()?;
        Ok(temp.into_temp_path())
    }
}

impl Default for TempFilePreviewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewStore for TempFilePreviewStore {
    fn create(&self, file: &SelectedFile) -> Result<PreviewHandle> {
        let target = match &file.source {
            FileSource::Disk { path, .. } => PreviewTarget::Source(std::path::absolute(path)?),
            FileSource::Memory(bytes) => PreviewTarget::Copy(self.copy_to_temp(&file.name, bytes)?),
        };

        let url = Url::from_file_path(target.path())
            .map_err(|_| ClientError::Preview(format!("not an absolute path: {}", target.path().display())))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, path = %target.path().display(), "preview created");
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, target);

        Ok(PreviewHandle::new(id, url.to_string()))
    }

    fn revoke(&self, handle: PreviewHandle) {
        let removed = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle.id);
        match removed {
            Some(target) => debug!(id = handle.id, path = %target.path().display(), "preview revoked"),
            None => debug!(id = handle.id, "preview already revoked"),
        }
    }
}
