//! Markdown brief template.

use super::schema::{optional_fields, required_fields, FieldSchema};

/// Placeholder written after optional answers in the template.
pub const OPTIONAL_PLACEHOLDER: &str = "_(optional)_";

/// Render the fill-in markdown template for a project brief.
///
/// Required fields come first and carry a trailing `*` on their header.
/// [`parse_brief`](super::parse_brief) reads a filled copy back.
pub fn render_template() -> String {
    let mut md = String::from(
        "# Project Brief\n\n\
         Please fill out this template with information about your project.\n\
         Fields marked with * are **required**.\n\n\
         ## Required Information\n\n",
    );

    for entry in required_fields() {
        push_field(&mut md, entry, "");
    }

    md.push_str("## Optional Information\n\n");

    for entry in optional_fields() {
        push_field(&mut md, entry, OPTIONAL_PLACEHOLDER);
    }

    md
}

fn push_field(md: &mut String, entry: &FieldSchema, placeholder: &str) {
    let marker = if entry.required { " *" } else { "" };
    md.push_str(&format!("### {}{marker}\n", entry.label));
    md.push_str(&format!("**{}**\n\n", entry.description));
    md.push_str(&format!("**Answer:** {placeholder}\n\n"));
}
