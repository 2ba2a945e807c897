use std::fmt;

use serde::{Deserialize, Serialize};

/// The observable states of a submission workflow.
///
/// A workflow flows through: IDLE → VALIDATED → SUBMITTING → {SUCCEEDED, FAILED}.
/// There is no terminal state; any state can be reset back to IDLE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Idle,
    Validated,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "IDLE"),
            Status::Validated => write!(f, "VALIDATED"),
            Status::Submitting => write!(f, "SUBMITTING"),
            Status::Succeeded => write!(f, "SUCCEEDED"),
            Status::Failed => write!(f, "FAILED"),
        }
    }
}

/// Something that happened to the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A file passed validation and became the source.
    FileAccepted,
    /// A submission was started.
    Submit,
    /// The service returned a result.
    Succeeded,
    /// The submission ended in a request-phase error.
    Failed,
    /// The result was discarded because a newer selection was attempted.
    ResultDiscarded,
    Reset,
}

/// Transition table for [`Status`].
pub struct StateMachine;

impl StateMachine {
    /// The state `event` leads to from `status`, or `None` if the event is
    /// not allowed there.
    ///
    /// - `FileAccepted` and `Reset` are valid everywhere.
    /// - `Submit` needs a source, so it is valid from `Validated`, `Succeeded`
    ///   and `Failed`, and never while already `Submitting`.
    /// - `Succeeded`/`Failed` only complete a `Submitting` workflow.
    pub fn next(status: Status, event: Event) -> Option<Status> {
        match (status, event) {
            (_, Event::Reset) => Some(Status::Idle),
            (_, Event::FileAccepted) => Some(Status::Validated),
            (Status::Validated | Status::Succeeded | Status::Failed, Event::Submit) => {
                Some(Status::Submitting)
            }
            (Status::Submitting, Event::Succeeded) => Some(Status::Succeeded),
            (Status::Submitting, Event::Failed) => Some(Status::Failed),
            (Status::Succeeded, Event::ResultDiscarded) => Some(Status::Validated),
            _ => None,
        }
    }
}
