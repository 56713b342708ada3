//! Prompt construction.
//!
//! The orchestrator only needs prompts to be deterministic for a given
//! input. [`DefaultPromptBuilder`] renders them from the brief; other
//! wording can be plugged in through [`PromptBuilder`].

use std::fmt::Write;

use crate::brief::{BriefDocument, FieldValue, FIELDS};

use super::artifacts::{TaskBreakdown, TimeEstimate};

/// Fallback text for fields the brief leaves empty.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Characters of the requirements document quoted in the cursor rules prompt.
const DOCUMENT_SUMMARY_CHARS: usize = 500;

/// Optional fields that add context to the cursor rules prompt.
const RULES_CONTEXT: [(&str, &str); 7] = [
    ("problemSolved", "Problem"),
    ("coreFeatures", "Core Features"),
    ("apiIntegrations", "API Integrations"),
    ("authentication", "Authentication"),
    ("rolesPermissions", "Roles & Permissions"),
    ("theme", "Theme"),
    ("constraints", "Constraints"),
];

/// Builds the prompt for each generation stage.
pub trait PromptBuilder: Send + Sync {
    /// Prompt for the functional requirements (fast provider).
    fn functional_requirements(&self, brief: &BriefDocument) -> String;

    /// Prompt for the requirements document.
    fn requirements_document(&self, functional_requirements: &str, brief: &BriefDocument)
        -> String;

    /// Prompt for the time estimate. The reply must be JSON.
    fn time_estimate(&self, document: &str, brief: &BriefDocument) -> String;

    /// Prompt for the cost estimate, given the finished time estimate.
    fn cost_estimate(&self, document: &str, brief: &BriefDocument, time: &TimeEstimate) -> String;

    /// Prompt for the phased task breakdown. The reply must be JSON.
    fn task_breakdown(&self, document: &str, brief: &BriefDocument) -> String;

    /// Prompt for `.cursorrules` content, given whatever the run produced.
    fn cursor_rules(
        &self,
        brief: &BriefDocument,
        document: &str,
        tasks: Option<&TaskBreakdown>,
    ) -> String;
}

/// Default prompt wording.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPromptBuilder;

impl PromptBuilder for DefaultPromptBuilder {
    fn functional_requirements(&self, brief: &BriefDocument) -> String {
        let mut prompt = String::from(
            "I would like to create concise functional requirements for the following application:\n\n",
        );

        for entry in FIELDS.iter() {
            let value = match brief.get(entry.key).filter(|v| !v.is_empty()) {
                Some(FieldValue::List(items)) => {
                    items.iter().map(|item| format!("\n- {item}")).collect::<String>()
                }
                Some(value) => format!(" {value}"),
                None => format!(" {NOT_SPECIFIED}"),
            };
            let flag = if brief.is_low_confidence(entry.key) { " (unverified)" } else { "" };
            let _ = writeln!(prompt, "**{}{}:**{}\n", entry.label, flag, value);
        }

        prompt.push_str(
            "Please research the comparable apps if provided and consider their features \
             when creating the requirements.\n\n\
             Output as markdown. Keep it as precise as possible and leave out anything \
             listed under exclusions.",
        );
        prompt
    }

    fn requirements_document(
        &self,
        functional_requirements: &str,
        _brief: &BriefDocument,
    ) -> String {
        format!(
            "You are an expert technical product manager. Write a detailed, well-structured \
             product requirements document based on these functional requirements:\n\n\
             <functional_requirements>\n{functional_requirements}\n</functional_requirements>\n\n\
             Organize it into numbered sections: Introduction, Product Overview, Goals and \
             Objectives, Target Audience, Features and Requirements, User Stories and \
             Acceptance Criteria, Technical Requirements / Stack, Design and User Interface.\n\n\
             Give every user story a unique requirement ID (e.g. ST-101) and make each one \
             testable. Include an authentication story if users must be identified and a \
             data modelling story if a database is needed.\n\n\
             Present the final document within <PRD> tags."
        )
    }

    fn time_estimate(&self, document: &str, brief: &BriefDocument) -> String {
        format!(
            "You are an expert project manager and technical lead. Based on the following \
             requirements document, produce a detailed time estimate.\n\n\
             <PRD>\n{document}\n</PRD>\n\n{}\n\n\
             Respond with JSON of this shape:\n\
             {{\"frontend\": {{\"tasks\": [{{\"task_name\": string, \"description\": string, \
             \"estimated_hours\": number, \"complexity\": \"low|medium|high\"}}], \
             \"total_hours\": number}}, \"backend\": {{...}}, \"ai_tasks\": {{...}}, \
             \"total_project_hours\": number, \"estimated_weeks\": number}}\n\n\
             Account for setup, development, testing, review and documentation.\n\
             Return ONLY valid JSON, no markdown formatting or additional text.",
            metadata(brief)
        )
    }

    fn cost_estimate(&self, document: &str, brief: &BriefDocument, time: &TimeEstimate) -> String {
        format!(
            "You are an expert project manager and technical lead. Based on the following \
             requirements document and time estimate, produce a detailed cost estimate.\n\n\
             <PRD>\n{document}\n</PRD>\n\n{}\n\n\
             <time_estimate>\nTotal hours: {}\nEstimated weeks: {}\n</time_estimate>\n\n\
             Respond with JSON of this shape:\n\
             {{\"frontend\": {{\"tasks\": [{{\"task_name\": string, \"description\": string, \
             \"estimated_hours\": number, \"hourly_rate\": number, \"total_cost\": number, \
             \"complexity\": \"low|medium|high\"}}], \"total_hours\": number, \
             \"total_cost\": number}}, \"backend\": {{...}}, \"ai_tasks\": {{...}}, \
             \"infrastructure\": {{\"items\": [{{\"item_name\": string, \"description\": string, \
             \"monthly_cost\": number, \"estimated_months\": number, \"total_cost\": number}}], \
             \"total_cost\": number}}, \"total_project_cost\": number, \
             \"estimated_weeks\": number}}\n\n\
             Use typical market hourly rates for the stack and add a 15-20% contingency.\n\
             Return ONLY valid JSON, no markdown formatting or additional text.",
            metadata(brief),
            time.total_project_hours,
            time.estimated_weeks
        )
    }

    fn task_breakdown(&self, document: &str, brief: &BriefDocument) -> String {
        format!(
            "You are an expert technical lead. Break the following requirements document \
             into implementation phases and tasks.\n\n\
             <PRD>\n{document}\n</PRD>\n\n{}\n\n\
             Respond with JSON of this shape:\n\
             {{\"phases\": [{{\"name\": string, \"description\": string, \"tasks\": \
             [{{\"title\": string, \"description\": string, \"estimated_hours\": number, \
             \"dependencies\": [string]}}]}}], \"total_tasks\": number, \
             \"estimated_total_hours\": number}}\n\n\
             Return ONLY valid JSON, no markdown formatting or additional text.",
            metadata(brief)
        )
    }

    fn cursor_rules(
        &self,
        brief: &BriefDocument,
        document: &str,
        tasks: Option<&TaskBreakdown>,
    ) -> String {
        let field = |key: &str| brief.text(key).unwrap_or_else(|| NOT_SPECIFIED.to_string());

        let mut context: Vec<String> = RULES_CONTEXT
            .iter()
            .filter_map(|(key, label)| brief.text(key).map(|value| format!("{label}: {value}")))
            .collect();

        if let Some(tasks) = tasks {
            context.push(format!(
                "\nTask Breakdown Summary: {} tasks across {} phases, estimated {} hours",
                tasks.task_count(),
                tasks.phases.len(),
                tasks.total_hours()
            ));
        }

        if !document.is_empty() {
            let mut summary: String = document.chars().take(DOCUMENT_SUMMARY_CHARS).collect();
            if summary.len() < document.len() {
                summary.push_str("...");
            }
            context.push(format!("\nRequirements Summary: {summary}"));
        }

        let context =
            if context.is_empty() { "None specified".to_string() } else { context.join("\n") };

        format!(
            "You are an expert software architect. Write the contents of a .cursorrules file \
             that guides an AI coding assistant working on this project.\n\n\
             <project>\nApp Name: {}\nFrontend Stack: {}\nBackend Stack: {}\n\
             Programming Language: {}\nDatabase: {}\nDesign Style: {}\n</project>\n\n\
             <additional_context>\n{context}\n</additional_context>\n\n\
             Cover project structure, coding conventions for the stack, naming, error \
             handling, testing expectations, security practices and UI guidelines that \
             follow the design style. Be specific to this stack rather than generic.\n\n\
             Output the file content as markdown only, with no surrounding commentary.",
            field("appName"),
            field("frontendStack"),
            field("backendStack"),
            field("programmingLanguage"),
            field("database"),
            field("designStyle"),
        )
    }
}

/// Project metadata block shared by the estimate prompts.
fn metadata(brief: &BriefDocument) -> String {
    let developers = brief
        .num_developers()
        .map(|n| n.to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());
    let stack = brief.tech_stack().unwrap_or_else(|| NOT_SPECIFIED.to_string());

    format!(
        "<project_metadata>\nNumber of Developers: {developers}\nTech Stack: {stack}\n</project_metadata>"
    )
}
