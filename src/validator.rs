//! Size and type policy applied to a file before it enters a workflow.
//!
//! Every entry point (drop target, file chooser, CLI argument) goes through
//! [`validate`], so all of them enforce the same rules.

use serde::Deserialize;
use thiserror::Error;

use crate::error::WorkflowError;
use crate::source::SourceFile;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Concrete formats accepted by [`TypePolicy::AllowList`].
pub const ALLOWED_MEDIA_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// How the declared media type is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypePolicy {
    /// Anything in the `image/` family.
    #[default]
    #[serde(alias = "image-prefix")]
    Prefix,
    /// JPEG, PNG and WEBP only.
    AllowList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub max_file_size: u64,
    pub type_policy: TypePolicy,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            type_policy: TypePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("file is {size} bytes, limit is {max}")]
    TooLarge { size: u64, max: u64 },

    #[error("'{media_type}' is not a supported image type")]
    UnsupportedType { media_type: String },
}

impl From<Rejection> for WorkflowError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::TooLarge { size, max } => WorkflowError::FileTooLarge { size, max },
            Rejection::UnsupportedType { media_type } => {
                WorkflowError::InvalidFileType { media_type }
            }
        }
    }
}

/// Check `file` against `policy`. Size is checked before type.
pub fn validate(file: &SourceFile, policy: &ValidationPolicy) -> Result<(), Rejection> {
    if file.size() > policy.max_file_size {
        return Err(Rejection::TooLarge {
            size: file.size(),
            max: policy.max_file_size,
        });
    }

    if !is_accepted_type(file.media_type(), policy.type_policy) {
        return Err(Rejection::UnsupportedType {
            media_type: file.media_type().to_string(),
        });
    }

    Ok(())
}

fn is_accepted_type(media_type: &str, policy: TypePolicy) -> bool {
    // Parameters such as `; charset=binary` are not part of the type.
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match policy {
        TypePolicy::Prefix => essence.starts_with("image/") && essence.len() > "image/".len(),
        TypePolicy::AllowList => ALLOWED_MEDIA_TYPES.contains(&essence.as_str()),
    }
}
