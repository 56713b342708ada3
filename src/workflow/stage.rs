//! Generation stages.

use std::fmt;

use serde::Serialize;

/// One step of the generation pipeline, producing one named artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Functional requirements from the brief (fast provider)
    FunctionalRequirements,
    /// Requirements document from the functional requirements
    RequirementsDocument,
    /// Time estimate from the requirements document
    TimeEstimate,
    /// Cost estimate, after the time estimate
    CostEstimate,
    /// Phased task breakdown
    TaskBreakdown,
    /// `.cursorrules` content, after everything else
    CursorRules,
}

impl Stage {
    /// All stages in dependency order.
    pub const ALL: [Stage; 6] = [
        Stage::FunctionalRequirements,
        Stage::RequirementsDocument,
        Stage::TimeEstimate,
        Stage::CostEstimate,
        Stage::TaskBreakdown,
        Stage::CursorRules,
    ];

    /// Stable stage name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FunctionalRequirements => "functional_requirements",
            Self::RequirementsDocument => "requirements_document",
            Self::TimeEstimate => "time_estimate",
            Self::CostEstimate => "cost_estimate",
            Self::TaskBreakdown => "task_breakdown",
            Self::CursorRules => "cursor_rules",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
