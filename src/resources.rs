//! Preview/result handles and transfer encoding.
//!
//! [`HandleStore`] is the only place handles are allocated or released. A
//! [`Handle`] is an opaque id; once released it never resolves again, so stale
//! data cannot be recycled into a later cycle.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{CutoutError, WorkflowError};
use crate::source::{Content, SourceFile};

/// Opaque reference to preview or result bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(Uuid);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:{}", self.0)
    }
}

/// What a live handle points at.
#[derive(Debug, Clone)]
pub enum Resolved {
    Memory { media_type: String, bytes: Arc<[u8]> },
    File { media_type: String, path: PathBuf },
}

impl Resolved {
    pub fn media_type(&self) -> &str {
        match self {
            Resolved::Memory { media_type, .. } | Resolved::File { media_type, .. } => media_type,
        }
    }

    pub async fn bytes(&self) -> io::Result<Arc<[u8]>> {
        match self {
            Resolved::Memory { bytes, .. } => Ok(Arc::clone(bytes)),
            Resolved::File { path, .. } => Ok(tokio::fs::read(path).await?.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct HandleStore {
    entries: Mutex<HashMap<Handle, Resolved>>,
}

impl HandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Handle, Resolved>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn allocate(&self, resolved: Resolved) -> Handle {
        let handle = Handle(Uuid::new_v4());
        debug!(%handle, media_type = resolved.media_type(), "allocated handle");
        self.entries().insert(handle, resolved);
        handle
    }

    /// Local, renderable reference to `file`. No I/O happens here; disk
    /// sources are referenced by path.
    pub fn derive_preview(&self, file: &SourceFile) -> Handle {
        let media_type = file.media_type().to_string();
        let resolved = match file.content() {
            Content::Memory(bytes) => Resolved::Memory {
                media_type,
                bytes: Arc::clone(bytes),
            },
            Content::Path(path) => Resolved::File {
                media_type,
                path: path.clone(),
            },
        };
        self.allocate(resolved)
    }

    /// Read `file` and base64-encode the raw bytes for the request body.
    ///
    /// The bytes must still match the size that was validated; a disk file
    /// that changed since selection is a read error.
    pub async fn encode_for_transfer(&self, file: &SourceFile) -> Result<String, WorkflowError> {
        let bytes = file
            .read()
            .await
            .map_err(|e| WorkflowError::ReadError(format!("{}: {e}", file.name())))?;
        if bytes.len() as u64 != file.size() {
            return Err(WorkflowError::ReadError(format!(
                "{}: file changed since it was selected ({} bytes, expected {})",
                file.name(),
                bytes.len(),
                file.size()
            )));
        }
        let encoded = STANDARD.encode(&bytes);
        debug!(
            file = file.name(),
            raw_bytes = bytes.len(),
            encoded_bytes = encoded.len(),
            "encoded payload"
        );
        Ok(encoded)
    }

    pub fn materialize_result(&self, bytes: impl Into<Arc<[u8]>>, media_type: &str) -> Handle {
        self.allocate(Resolved::Memory {
            media_type: media_type.to_string(),
            bytes: bytes.into(),
        })
    }

    pub fn resolve(&self, handle: Handle) -> Option<Resolved> {
        self.entries().get(&handle).cloned()
    }

    /// Invalidate `handle`. Releasing twice is a no-op.
    pub fn release(&self, handle: Handle) {
        if self.entries().remove(&handle).is_some() {
            debug!(%handle, "released handle");
        }
    }

    /// Number of handles not yet released.
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    /// Write the bytes behind `handle` to `dest`. A directory `dest` gets a
    /// generated `removed-bg-<millis>.png` file name.
    pub async fn export(&self, handle: Handle, dest: &Path) -> Result<PathBuf, CutoutError> {
        let resolved = self.resolve(handle).ok_or(CutoutError::NoResult)?;
        let bytes = resolved.bytes().await?;

        let is_dir = tokio::fs::metadata(dest)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        let target = if is_dir {
            dest.join(default_export_name())
        } else {
            dest.to_path_buf()
        };

        tokio::fs::write(&target, &bytes).await?;
        debug!(%handle, path = %target.display(), bytes = bytes.len(), "exported handle");
        Ok(target)
    }
}

pub fn default_export_name() -> String {
    format!("removed-bg-{}.png", Utc::now().timestamp_millis())
}

/// Split a `data:<media type>;base64,<payload>` URL into its media type and
/// payload. Returns `None` for anything that is not a base64 data URL.
pub fn split_data_url(input: &str) -> Option<(&str, &str)> {
    let rest = input.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let media_type = header.strip_suffix(";base64")?;
    Some((media_type, payload))
}

/// Drop a data-URL header if present, leaving only the base64 payload.
pub fn strip_data_url_prefix(input: &str) -> &str {
    split_data_url(input).map_or(input, |(_, payload)| payload)
}
