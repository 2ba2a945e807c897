//! The user-selected file that enters a workflow.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::WorkflowError;
use crate::resources::split_data_url;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Where the bytes of a [`SourceFile`] live.
#[derive(Debug, Clone)]
pub enum Content {
    /// On disk; read lazily when the payload is encoded.
    Path(PathBuf),
    /// Already in memory.
    Memory(Arc<[u8]>),
}

/// A candidate file: name, declared media type, byte size and content.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    media_type: String,
    size: u64,
    content: Content,
}

impl SourceFile {
    /// Describe a file on disk. The media type is declared from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a regular file", path.display()),
            ));
        }

        let media_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            media_type,
            size: metadata.len(),
            content: Content::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            content: Content::Memory(bytes),
        }
    }

    /// Build a file from a `data:<type>;base64,<payload>` URL, as produced by
    /// browser-style readers.
    pub fn from_data_url(name: impl Into<String>, data_url: &str) -> Result<Self, WorkflowError> {
        let (media_type, payload) = split_data_url(data_url)
            .ok_or_else(|| WorkflowError::ReadError("not a base64 data URL".into()))?;
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| WorkflowError::ReadError(e.to_string()))?;
        let media_type = if media_type.is_empty() {
            FALLBACK_MEDIA_TYPE
        } else {
            media_type
        };
        Ok(Self::from_bytes(name, media_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Read the full content. Memory content is shared, never copied.
    pub async fn read(&self) -> io::Result<Arc<[u8]>> {
        match &self.content {
            Content::Memory(bytes) => Ok(Arc::clone(bytes)),
            Content::Path(path) => Ok(tokio::fs::read(path).await?.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn from_path_declares_type_from_extension() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"\x89PNG fake").unwrap();

        let source = SourceFile::from_path(file.path()).await.unwrap();
        assert_eq!(source.media_type(), "image/png");
        assert_eq!(source.size(), 9);
        assert!(source.name().ends_with(".png"));
        assert!(matches!(source.content(), Content::Path(_)));
    }

    #[tokio::test]
    async fn unknown_extension_falls_back_to_octet_stream() {
        let file = tempfile::Builder::new().suffix(".zzqx").tempfile().unwrap();
        let source = SourceFile::from_path(file.path()).await.unwrap();
        assert_eq!(source.media_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn from_path_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceFile::from_path(dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn from_data_url_decodes_payload() {
        let source = SourceFile::from_data_url("pasted", "data:image/webp;base64,AQID").unwrap();
        assert_eq!(source.media_type(), "image/webp");
        assert_eq!(source.size(), 3);
        assert_eq!(&*source.read().await.unwrap(), &[1u8, 2, 3]);
    }

    #[test]
    fn from_data_url_rejects_garbage() {
        let err = SourceFile::from_data_url("x", "not a data url").unwrap_err();
        assert!(matches!(err, WorkflowError::ReadError(_)));
    }
}
