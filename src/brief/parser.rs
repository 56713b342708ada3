//! Parser for filled-in markdown briefs.
//!
//! Turns a brief written against [`render_template`](super::render_template)
//! (or any markdown with `##`/`###` headers named after the fields) into a
//! validated [`BriefDocument`] in one pass.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use super::document::BriefDocument;
use super::schema::{FieldSchema, FIELDS};
use super::validator::{validate, RawValue, Validation};

/// Errors produced while parsing a brief document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BriefError {
    /// One or more required fields have no answer.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    /// A required field has an answer that fails validation.
    #[error("Invalid value for '{key}': {reason}")]
    InvalidField { key: String, reason: String },
}

static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{2,}\s+(.+?)\s*$").expect("valid regex"));

static ANSWER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\*\*Answer:\*\*|Answer:)\s*").expect("valid regex"));

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)_?\(optional\)_?|_your answer here[^_]*_").expect("valid regex")
});

static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__|`(.+?)`").expect("valid regex"));

/// Header spellings accepted in addition to each field's label and key.
const ALIASES: &[(&str, &str)] = &[
    ("num developers", "num_developers"),
    ("developers", "num_developers"),
    ("team size", "num_developers"),
    ("platform", "targetPlatform"),
    ("roles permissions", "rolesPermissions"),
    ("roles & permissions", "rolesPermissions"),
    ("comparable/existing apps", "comparableApps"),
    ("existing apps", "comparableApps"),
    ("tech constraints", "constraints"),
];

/// Parse a markdown brief into a validated brief document.
///
/// Optional answers that fail validation are dropped with a warning.
/// Required answers must be present and valid.
pub fn parse_brief(markdown: &str) -> Result<BriefDocument, BriefError> {
    let mut brief = BriefDocument::new();

    for (header, body) in sections(markdown) {
        let Some(entry) = match_field(&header) else {
            debug!(header = %header, "Ignoring unrecognised section");
            continue;
        };

        let answer = extract_answer(&body);
        if answer.is_empty() {
            continue;
        }

        match validate(entry, &RawValue::Text(answer)) {
            Validation::Accepted(value) => brief.insert(entry.key, value),
            Validation::Rejected(reason) if entry.required => {
                return Err(BriefError::InvalidField { key: entry.key.to_string(), reason });
            }
            Validation::Rejected(reason) => {
                warn!(field = entry.key, reason = %reason, "Dropping invalid optional answer");
            }
        }
    }

    let missing: Vec<String> =
        brief.missing_required().iter().map(|f| f.key.to_string()).collect();
    if !missing.is_empty() {
        return Err(BriefError::MissingRequired(missing));
    }

    Ok(brief)
}

/// Split markdown into `(header, body)` pairs for every `##`+ header.
fn sections(markdown: &str) -> Vec<(String, String)> {
    let mut out: Vec<(String, Vec<&str>)> = Vec::new();
    let mut in_fence = false;

    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }

        if !in_fence {
            if let Some(caps) = HEADER.captures(line) {
                out.push((caps[1].to_string(), Vec::new()));
                continue;
            }
        }

        if let Some((_, body)) = out.last_mut() {
            body.push(line);
        }
    }

    out.into_iter().map(|(h, body)| (h, body.join("\n"))).collect()
}

/// Match a section header to a schema entry.
fn match_field(header: &str) -> Option<&'static FieldSchema> {
    let header = header.trim_end_matches([' ', '*']).trim().to_lowercase();
    if header.is_empty() {
        return None;
    }

    let exact = FIELDS.iter().find(|f| {
        f.label.to_lowercase() == header || f.key.to_lowercase() == header.replace([' ', '-'], "")
    });
    if exact.is_some() {
        return exact;
    }

    if let Some((_, key)) = ALIASES.iter().find(|(alias, _)| *alias == header) {
        return FIELDS.iter().find(|f| f.key == *key);
    }

    // Loose match, e.g. "Core Features (MVP)"
    FIELDS.iter().find(|f| header.contains(&f.label.to_lowercase()))
}

/// Pull the answer text out of a section body.
fn extract_answer(body: &str) -> String {
    let body = CODE_FENCE.replace_all(body, "");
    let lines: Vec<&str> = body.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    // Prefer an explicit "Answer:" line; otherwise skip the bold description line.
    let answer_lines: Vec<String> =
        if let Some(pos) = lines.iter().position(|l| ANSWER_PREFIX.is_match(l)) {
            let mut out = vec![ANSWER_PREFIX.replace(lines[pos], "").into_owned()];
            out.extend(lines[pos + 1..].iter().map(|l| (*l).to_string()));
            out
        } else {
            let skip = usize::from(lines.first().is_some_and(|l| is_description(l)));
            lines[skip..].iter().map(|l| (*l).to_string()).collect()
        };

    answer_lines
        .iter()
        .map(|l| clean_line(l))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_description(line: &str) -> bool {
    line.starts_with("**") && line.ends_with("**") && line.len() > 4
}

fn clean_line(line: &str) -> String {
    let line = PLACEHOLDER.replace_all(line, "");
    let line = EMPHASIS.replace_all(&line, |caps: &regex::Captures<'_>| {
        caps.iter().skip(1).flatten().next().map_or(String::new(), |m| m.as_str().to_string())
    });
    line.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::document::FieldValue;
    use crate::brief::render_template;

    fn fill(template: &str, label: &str, answer: &str) -> String {
        let header = format!("### {label}");
        let start = template.find(&header).unwrap();
        let answer_at = start + template[start..].find("**Answer:**").unwrap();
        let line_end = answer_at + template[answer_at..].find('\n').unwrap();
        format!("{}**Answer:** {answer}{}", &template[..answer_at], &template[line_end..])
    }

    fn filled_template() -> String {
        let md = render_template();
        let md = fill(&md, "App Name", "Acme");
        let md = fill(&md, "Problem Solved", "tracks invoices");
        let md = fill(&md, "Core Features", "invoicing, reporting");
        let md = fill(&md, "Number of Developers", "2");
        fill(&md, "Theme", "Dark")
    }

    #[test]
    fn test_parse_filled_template() {
        let brief = parse_brief(&filled_template()).unwrap();

        assert!(brief.is_complete());
        assert_eq!(brief.get("appName"), Some(&FieldValue::Text("Acme".into())));
        assert_eq!(
            brief.get("coreFeatures"),
            Some(&FieldValue::List(vec!["invoicing".into(), "reporting".into()]))
        );
        assert_eq!(brief.num_developers(), Some(2));
        assert_eq!(brief.get("theme"), Some(&FieldValue::Choice("dark".into())));
        // Untouched optional placeholders stay empty
        assert!(!brief.has("database"));
    }

    #[test]
    fn test_empty_template_reports_all_required() {
        let err = parse_brief(&render_template()).unwrap_err();
        assert_eq!(
            err,
            BriefError::MissingRequired(vec![
                "appName".into(),
                "problemSolved".into(),
                "coreFeatures".into()
            ])
        );
    }

    #[test]
    fn test_plain_sections_without_answer_prefix() {
        let md = "\
## App Name
Acme

## Problem Solved
Small shops lose track of unpaid invoices.

## Core Features
- invoicing
- reporting

## Database
Postgres
";
        let brief = parse_brief(md).unwrap();
        assert_eq!(brief.text("problemSolved").unwrap(), "Small shops lose track of unpaid invoices.");
        assert_eq!(brief.get("coreFeatures").and_then(FieldValue::as_list).map(<[String]>::len), Some(2));
        assert_eq!(brief.text("database").as_deref(), Some("Postgres"));
    }

    #[test]
    fn test_invalid_optional_dropped() {
        let md = filled_template().replace("**Answer:** Dark", "**Answer:** neon");
        let brief = parse_brief(&md).unwrap();
        assert!(!brief.has("theme"));
    }

    #[test]
    fn test_aliases_and_loose_headers() {
        assert_eq!(match_field("Num Developers").map(|f| f.key), Some("num_developers"));
        assert_eq!(match_field("Core Features (MVP) *").map(|f| f.key), Some("coreFeatures"));
        assert_eq!(match_field("appName").map(|f| f.key), Some("appName"));
        assert!(match_field("Required Information").is_none());
    }

    #[test]
    fn test_emphasis_and_code_removed() {
        assert_eq!(clean_line("**Acme** `Pro`"), "Acme Pro");
        assert_eq!(clean_line("_(optional)_"), "");
    }
}
