//! Interactive brief collection.
//!
//! A session asks one question at a time, validates each answer, and hands
//! the finished brief to the [`WorkflowOrchestrator`]. Sessions live in a
//! [`SessionRegistry`] that serializes access per session and expires idle
//! ones.
//!
//! ## Lifecycle
//!
//! ```text
//! collecting -> validating -> collecting (next or re-asked field)
//!                          -> awaiting_confirmation -> complete
//!                          -> complete
//! any non-terminal state   -> abandoned (closed or idle)
//! ```
//!
//! [`WorkflowOrchestrator`]: crate::workflow::WorkflowOrchestrator

mod machine;
pub mod planner;
mod registry;

pub use machine::{Session, SessionSnapshot};
pub use planner::Next;
pub use registry::SessionRegistry;

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::brief::{BriefDocument, FieldSchema};
use crate::workflow::{ArtifactBundle, WorkflowError};

/// Unique identifier for a session.
pub type SessionId = Uuid;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Waiting for an answer to the pending field
    Collecting,
    /// An answer is being checked
    Validating,
    /// Brief is complete; waiting for the go-ahead to generate
    AwaitingConfirmation,
    /// Generation was started
    Complete,
    /// Closed or expired
    Abandoned,
}

impl SessionStatus {
    /// Check if no further input is accepted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Abandoned)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Collecting => "collecting",
            Self::Validating => "validating",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Complete => "complete",
            Self::Abandoned => "abandoned",
        })
    }
}

/// The question a session is waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextQuestion {
    /// Field key the answer must be submitted for
    pub field: &'static str,
    pub label: &'static str,
    pub question: &'static str,
    pub required: bool,
    /// Fields still to ask, this one included
    pub remaining: usize,
}

impl NextQuestion {
    pub(crate) fn new(entry: &'static FieldSchema, brief: &BriefDocument) -> Self {
        Self {
            field: entry.key,
            label: entry.label,
            question: entry.question,
            required: entry.required,
            remaining: planner::remaining(brief).len(),
        }
    }
}

/// Outcome of one session turn.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionResult {
    /// The answer was stored; ask the next question.
    Accepted { field: &'static str, low_confidence: bool, question: NextQuestion },

    /// The answer must be given again.
    Rejected { field: &'static str, reason: String, attempt: u32, question: NextQuestion },

    /// A field (or every remaining optional field) was skipped.
    Skipped { field: Option<&'static str>, question: NextQuestion },

    /// The brief is complete; call `confirm` to generate.
    AwaitingConfirmation,

    /// The brief was complete and generation succeeded.
    Complete(Box<ArtifactBundle>),
}

impl SessionResult {
    /// The question to ask next, if the session is still collecting.
    pub fn question(&self) -> Option<&NextQuestion> {
        match self {
            Self::Accepted { question, .. }
            | Self::Rejected { question, .. }
            | Self::Skipped { question, .. } => Some(question),
            Self::AwaitingConfirmation | Self::Complete(_) => None,
        }
    }
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Unknown, expired, closed or finished session.
    #[error("Invalid session: {0}")]
    InvalidSession(SessionId),

    /// The answer is for a different field than the one being asked.
    #[error("Expected an answer for '{expected}', got '{got}'")]
    FieldMismatch { expected: String, got: String },

    /// Required fields cannot be skipped.
    #[error("Field '{0}' is required and cannot be skipped")]
    RequiredField(String),

    /// `confirm` was called while the brief is still being collected.
    #[error("Session {0} is not awaiting confirmation")]
    NotAwaitingConfirmation(SessionId),

    /// The brief was complete but generation failed.
    #[error(transparent)]
    Generation(#[from] WorkflowError),
}
