//! Generated artifacts.
//!
//! Text stages are kept verbatim (apart from wrapper tags). Estimates and
//! the task breakdown are parsed from the provider's JSON reply.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Stage, WorkflowError};

/// Everything one generation run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactBundle {
    /// Functional requirements (markdown)
    pub functional_requirements: String,

    /// Requirements document (markdown)
    pub requirements_document: String,

    /// Time estimate
    pub time_estimate: TimeEstimate,

    /// Cost estimate
    pub cost_estimate: CostEstimate,

    /// Phased task breakdown, absent when disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_breakdown: Option<TaskBreakdown>,

    /// `.cursorrules` file content (markdown), absent when disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_rules: Option<String>,
}

/// One estimated task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedTask {
    pub task_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

/// Tasks for one part of the stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateSection {
    pub tasks: Vec<EstimatedTask>,
    pub total_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

impl EstimateSection {
    /// Sum of the task hours.
    pub fn task_hours(&self) -> f64 {
        self.tasks.iter().map(|t| t.estimated_hours).sum()
    }
}

/// Time estimate by stack area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEstimate {
    #[serde(default)]
    pub frontend: EstimateSection,
    #[serde(default)]
    pub backend: EstimateSection,
    #[serde(default)]
    pub ai_tasks: EstimateSection,
    pub total_project_hours: f64,
    pub estimated_weeks: f64,
}

/// One recurring infrastructure cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureItem {
    pub item_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub monthly_cost: f64,
    #[serde(default)]
    pub estimated_months: f64,
    #[serde(default)]
    pub total_cost: f64,
}

/// Infrastructure costs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Infrastructure {
    pub items: Vec<InfrastructureItem>,
    pub total_cost: f64,
}

/// Cost estimate by stack area plus infrastructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    #[serde(default)]
    pub frontend: EstimateSection,
    #[serde(default)]
    pub backend: EstimateSection,
    #[serde(default)]
    pub ai_tasks: EstimateSection,
    #[serde(default)]
    pub infrastructure: Infrastructure,
    pub total_project_cost: f64,
    #[serde(default)]
    pub estimated_weeks: f64,
}

/// A task inside a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedTask {
    #[serde(alias = "task_name", alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

/// One implementation phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPhase {
    #[serde(alias = "phase_name", alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<PlannedTask>,
}

/// Implementation plan split into phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBreakdown {
    pub phases: Vec<TaskPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tasks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_total_hours: Option<f64>,
}

impl TaskBreakdown {
    /// Number of tasks across all phases.
    pub fn task_count(&self) -> usize {
        self.phases.iter().map(|p| p.tasks.len()).sum()
    }

    /// Reported total hours, or the sum of the task hours.
    pub fn total_hours(&self) -> f64 {
        self.estimated_total_hours.unwrap_or_else(|| {
            self.phases.iter().flat_map(|p| &p.tasks).map(|t| t.estimated_hours).sum()
        })
    }
}

/// Remove a `<PRD>` wrapper around a generated document.
pub fn strip_document_wrapper(text: &str) -> String {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("<PRD>") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("</PRD>") {
        text = rest;
    }
    text.trim().to_string()
}

/// Remove a markdown code fence around a JSON reply.
pub fn strip_code_fence(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // drop the info string (`json`, `JSON`, ...)
        text = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse a structured stage reply.
///
/// Tolerates code fences and stray prose around the outermost JSON object.
pub fn parse_structured<T: DeserializeOwned>(stage: Stage, text: &str) -> Result<T, WorkflowError> {
    let body = strip_code_fence(text);

    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(first) => {
            let object = body.find('{').zip(body.rfind('}')).filter(|(start, end)| start < end);
            match object {
                Some((start, end)) => serde_json::from_str(&body[start..=end]),
                None => Err(first),
            }
            .map_err(|e| WorkflowError::MalformedOutput { stage, detail: e.to_string() })
        }
    }
}
