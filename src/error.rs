use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::service::ApiError;

#[derive(Debug, Error)]
pub enum CutoutError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("No processed image available. Run `cutout remove` first.")]
    NoResult,

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Service error: {0}")]
    Service(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Everything that can go wrong while driving a submission.
///
/// Validation and guard errors (`InvalidFileType`, `FileTooLarge`,
/// `NoFileSelected`, `AlreadyInProgress`) are reported synchronously and leave
/// the workflow as it was. Request-phase errors always land the workflow in
/// `Failed` with a [`LastError`] recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("unsupported file type '{media_type}': please upload an image file (JPG, PNG, etc.)")]
    InvalidFileType { media_type: String },

    #[error("file size must be at most {max} bytes (got {size})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("failed to read image: {0}")]
    ReadError(String),

    #[error("please select an image first")]
    NoFileSelected,

    #[error("a submission is already in progress")]
    AlreadyInProgress,

    #[error("background removal service unreachable: {0}")]
    ServiceUnreachable(String),

    #[error("API key is invalid")]
    InvalidCredential,

    #[error("invalid image format: {0}")]
    InvalidImage(String),

    #[error("API error (status {status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The caller dropped `submit` before it finished.
    #[error("submission abandoned before the service answered")]
    Abandoned,

    /// The submission was overtaken by a reset or a new file selection.
    /// Never recorded as `last_error`.
    #[error("submission superseded by a newer selection or reset")]
    Superseded,
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::InvalidFileType { .. } => ErrorKind::InvalidFileType,
            WorkflowError::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            WorkflowError::ReadError(_) => ErrorKind::ReadError,
            WorkflowError::NoFileSelected => ErrorKind::NoFileSelected,
            WorkflowError::AlreadyInProgress => ErrorKind::AlreadyInProgress,
            WorkflowError::ServiceUnreachable(_) => ErrorKind::ServiceUnreachable,
            WorkflowError::InvalidCredential => ErrorKind::InvalidCredential,
            WorkflowError::InvalidImage(_) => ErrorKind::InvalidImage,
            WorkflowError::ServiceError { status, .. } => ErrorKind::ServiceError(*status),
            WorkflowError::Timeout { .. } => ErrorKind::Timeout,
            WorkflowError::Abandoned => ErrorKind::Abandoned,
            WorkflowError::Superseded => ErrorKind::Superseded,
        }
    }

    /// Whether this error is produced after a submission started. Only these
    /// are recorded as `last_error` and move the workflow to `Failed`.
    pub fn is_request_phase(&self) -> bool {
        matches!(
            self,
            WorkflowError::ReadError(_)
                | WorkflowError::ServiceUnreachable(_)
                | WorkflowError::InvalidCredential
                | WorkflowError::InvalidImage(_)
                | WorkflowError::ServiceError { .. }
                | WorkflowError::Timeout { .. }
                | WorkflowError::Abandoned
        )
    }
}

/// Discriminant of a [`WorkflowError`], stable enough to serialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidFileType,
    FileTooLarge,
    ReadError,
    NoFileSelected,
    AlreadyInProgress,
    ServiceUnreachable,
    InvalidCredential,
    InvalidImage,
    ServiceError(u16),
    Timeout,
    Abandoned,
    Superseded,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidFileType => write!(f, "InvalidFileType"),
            ErrorKind::FileTooLarge => write!(f, "FileTooLarge"),
            ErrorKind::ReadError => write!(f, "ReadError"),
            ErrorKind::NoFileSelected => write!(f, "NoFileSelected"),
            ErrorKind::AlreadyInProgress => write!(f, "AlreadyInProgress"),
            ErrorKind::ServiceUnreachable => write!(f, "ServiceUnreachable"),
            ErrorKind::InvalidCredential => write!(f, "InvalidCredential"),
            ErrorKind::InvalidImage => write!(f, "InvalidImage"),
            ErrorKind::ServiceError(status) => write!(f, "ServiceError({status})"),
            ErrorKind::Timeout => write!(f, "Timeout"),
            ErrorKind::Abandoned => write!(f, "Abandoned"),
            ErrorKind::Superseded => write!(f, "Superseded"),
        }
    }
}

/// The error a failed submission leaves behind for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&WorkflowError> for LastError {
    fn from(err: &WorkflowError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
