//! Generation pipeline.
//!
//! Turns a complete [`BriefDocument`](crate::brief::BriefDocument) into an
//! [`ArtifactBundle`]:
//!
//! ```text
//! functional_requirements -> requirements_document -> { time_estimate -> cost_estimate } -> cursor_rules
//!                                                     { task_breakdown                }
//! ```
//!
//! The two middle branches run concurrently. Task breakdown and cursor rules
//! are optional. The first failure anywhere ends the run; no partial bundle
//! is ever returned.

mod artifacts;
mod orchestrator;
mod prompts;
mod stage;

pub use artifacts::{
    parse_structured, strip_code_fence, strip_document_wrapper, ArtifactBundle, CostEstimate,
    EstimateSection, EstimatedTask, Infrastructure, InfrastructureItem, PlannedTask,
    TaskBreakdown, TaskPhase, TimeEstimate,
};
pub use orchestrator::WorkflowOrchestrator;
pub use prompts::{DefaultPromptBuilder, PromptBuilder, NOT_SPECIFIED};
pub use stage::Stage;

use crate::ai::ProviderError;

/// Pipeline failure. Always names the stage that failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    /// The provider call for a stage failed (after retries, if transient).
    #[error("Generation failed at stage '{stage}': {cause}")]
    GenerationFailure { stage: Stage, cause: ProviderError },

    /// The provider answered, but the reply could not be parsed.
    #[error("Malformed output at stage '{stage}': {detail}")]
    MalformedOutput { stage: Stage, detail: String },
}

impl WorkflowError {
    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::GenerationFailure { stage, .. } | Self::MalformedOutput { stage, .. } => *stage,
        }
    }
}
