use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::Status;
use crate::error::LastError;
use crate::resources::Handle;
use crate::source::SourceFile;

/// What the presentation layer needs to know about the selected file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub name: String,
    pub media_type: String,
    pub size: u64,
}

impl From<&SourceFile> for SourceSummary {
    fn from(file: &SourceFile) -> Self {
        Self {
            name: file.name().to_string(),
            media_type: file.media_type().to_string(),
            size: file.size(),
        }
    }
}

/// Read-only view of a workflow at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    pub status: Status,
    pub source: Option<SourceSummary>,
    pub preview: Option<Handle>,
    pub result: Option<Handle>,
    pub last_error: Option<LastError>,
    /// Submissions issued for the current source.
    pub attempts: u32,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowSnapshot {
    /// Wall-clock time of the most recent completed submission.
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.submitted_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}
