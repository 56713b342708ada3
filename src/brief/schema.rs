//! Static field schema for project briefs.
//!
//! The schema is ordered: the order is the default question sequence used by
//! the planner and the section order of the markdown template.

use serde::Serialize;

/// Maximum length of a `short_text` answer.
pub const SHORT_TEXT_MAX: usize = 200;

/// Maximum length of a `long_text` answer.
pub const LONG_TEXT_MAX: usize = 4000;

/// The shape a field value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "allowed")]
pub enum FieldKind {
    /// Single line of text
    ShortText,
    /// Free-form paragraph
    LongText,
    /// Ordered, deduplicated list of items
    StringList,
    /// Non-negative number
    Number,
    /// One of a fixed set of values
    Enum(&'static [&'static str]),
}

impl FieldKind {
    /// Get the kind name as used in logs and templates.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShortText => "short_text",
            Self::LongText => "long_text",
            Self::StringList => "string_list",
            Self::Number => "number",
            Self::Enum(_) => "enum",
        }
    }

    /// Maximum text length for text kinds.
    pub fn max_len(&self) -> Option<usize> {
        match self {
            Self::ShortText => Some(SHORT_TEXT_MAX),
            Self::LongText => Some(LONG_TEXT_MAX),
            _ => None,
        }
    }
}

/// One entry of the brief schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    /// Field key (stable identifier)
    pub key: &'static str,

    /// Human readable label, used as the template header
    pub label: &'static str,

    /// What the field describes
    pub description: &'static str,

    /// Question asked during an interactive session
    pub question: &'static str,

    /// Whether the brief is incomplete without this field
    pub required: bool,

    /// Expected value shape
    pub kind: FieldKind,
}

const PLATFORMS: &[&str] = &["web", "mobile", "desktop", "cross-platform", "api"];
const THEMES: &[&str] = &["light", "dark", "system"];

/// The brief schema, in question order.
pub static FIELDS: [FieldSchema; 17] = [
    FieldSchema {
        key: "appName",
        label: "App Name",
        description: "the name of the application",
        question: "What is your app name?",
        required: true,
        kind: FieldKind::ShortText,
    },
    FieldSchema {
        key: "problemSolved",
        label: "Problem Solved",
        description: "what problem the application solves",
        question: "What problem does it solve?",
        required: true,
        kind: FieldKind::LongText,
    },
    FieldSchema {
        key: "coreFeatures",
        label: "Core Features",
        description: "the core features and functionalities",
        question: "What are the core features?",
        required: true,
        kind: FieldKind::StringList,
    },
    FieldSchema {
        key: "num_developers",
        label: "Number of Developers",
        description: "the number of developers working on the project",
        question: "How many developers?",
        required: false,
        kind: FieldKind::Number,
    },
    FieldSchema {
        key: "targetPlatform",
        label: "Target Platform",
        description: "where the application runs (web, mobile, desktop, cross-platform, api)",
        question: "Which platform are you targeting?",
        required: false,
        kind: FieldKind::Enum(PLATFORMS),
    },
    FieldSchema {
        key: "frontendStack",
        label: "Frontend Stack",
        description: "frontend technologies and frameworks",
        question: "What frontend stack?",
        required: false,
        kind: FieldKind::ShortText,
    },
    FieldSchema {
        key: "backendStack",
        label: "Backend Stack",
        description: "backend technologies and frameworks",
        question: "What backend stack?",
        required: false,
        kind: FieldKind::ShortText,
    },
    FieldSchema {
        key: "programmingLanguage",
        label: "Programming Language",
        description: "the primary programming language",
        question: "What programming language?",
        required: false,
        kind: FieldKind::ShortText,
    },
    FieldSchema {
        key: "database",
        label: "Database",
        description: "the database system to be used",
        question: "What database?",
        required: false,
        kind: FieldKind::ShortText,
    },
    FieldSchema {
        key: "apiIntegrations",
        label: "API Integrations",
        description: "external APIs and services to integrate",
        question: "What API integrations?",
        required: false,
        kind: FieldKind::StringList,
    },
    FieldSchema {
        key: "authentication",
        label: "Authentication",
        description: "user authentication methods",
        question: "How will users authenticate?",
        required: false,
        kind: FieldKind::ShortText,
    },
    FieldSchema {
        key: "rolesPermissions",
        label: "Roles and Permissions",
        description: "user roles and permission system",
        question: "What roles and permissions?",
        required: false,
        kind: FieldKind::LongText,
    },
    FieldSchema {
        key: "designStyle",
        label: "Design Style",
        description: "the design style and aesthetic",
        question: "What design style?",
        required: false,
        kind: FieldKind::ShortText,
    },
    FieldSchema {
        key: "theme",
        label: "Theme",
        description: "theme preference (light, dark, system)",
        question: "Light, dark or system theme?",
        required: false,
        kind: FieldKind::Enum(THEMES),
    },
    FieldSchema {
        key: "exclusions",
        label: "Exclusions",
        description: "features that should NOT be included",
        question: "What should NOT be included?",
        required: false,
        kind: FieldKind::StringList,
    },
    FieldSchema {
        key: "comparableApps",
        label: "Comparable Apps",
        description: "similar existing applications for reference",
        question: "Any similar existing apps?",
        required: false,
        kind: FieldKind::StringList,
    },
    FieldSchema {
        key: "constraints",
        label: "Constraints",
        description: "constraints and requirements (budget, timeline, compliance, etc.)",
        question: "Any constraints or requirements?",
        required: false,
        kind: FieldKind::LongText,
    },
];

/// Look up a schema entry by key.
pub fn field(key: &str) -> Option<&'static FieldSchema> {
    FIELDS.iter().find(|f| f.key == key)
}

/// Iterate over the required entries, in order.
pub fn required_fields() -> impl Iterator<Item = &'static FieldSchema> {
    FIELDS.iter().filter(|f| f.required)
}

/// Iterate over the optional entries, in order.
pub fn optional_fields() -> impl Iterator<Item = &'static FieldSchema> {
    FIELDS.iter().filter(|f| !f.required)
}
