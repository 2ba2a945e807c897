//! Submit an image to a background-removal service and get the cut-out back.
//!
//! [`Workflow`] is the stateful core: it validates the selected file, keeps
//! preview/result [`Handle`]s alive only as long as they are current, and
//! drives at most one request at a time through a [`RemovalService`].
//!
//! ```no_run
//! # async fn run() -> Result<(), cutout::CutoutError> {
//! use cutout::{CutoutConfig, RemovalClient, SourceFile, Workflow};
//!
//! let config = CutoutConfig::load()?;
//! let workflow = Workflow::new(RemovalClient::new(&config)?, &config);
//! workflow.select_file(SourceFile::from_path("photo.jpg").await?)?;
//! workflow.submit().await?;
//! workflow.export_result(std::path::Path::new(".")).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod resources;
pub mod service;
pub mod source;
pub mod state_machine;
pub mod validator;

pub use config::CutoutConfig;
pub use error::{CutoutError, ErrorKind, LastError, WorkflowError};
pub use orchestrator::Workflow;
pub use resources::{Handle, HandleStore, Resolved};
pub use service::{ApiError, RemovalClient, RemovalService};
pub use source::SourceFile;
pub use state_machine::{Status, WorkflowSnapshot};
pub use validator::{TypePolicy, ValidationPolicy};
