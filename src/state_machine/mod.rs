mod snapshot;
mod state;

pub use snapshot::{SourceSummary, WorkflowSnapshot};
pub use state::{Event, StateMachine, Status};
