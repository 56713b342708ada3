//! Response validation.
//!
//! Checks a raw answer against its schema entry and produces a typed value
//! or a short, human-readable rejection reason. Validation is pure and
//! never calls out to a provider.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::document::FieldValue;
use super::schema::{FieldKind, FieldSchema};

/// An answer as received from the asker, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Free text (lists may be delimiter-separated)
    Text(String),
    /// Already-split list
    List(Vec<String>),
}

impl RawValue {
    /// Flatten into a single string.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(", "),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Outcome of validating one answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// The answer fits the schema; carries the typed value
    Accepted(FieldValue),
    /// The answer must be re-asked; carries the reason
    Rejected(String),
}

impl Validation {
    /// Check if the answer was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Reason used for every empty answer.
pub const VALUE_REQUIRED: &str = "value required";

/// Validate a raw answer against a schema entry.
pub fn validate(entry: &FieldSchema, raw: &RawValue) -> Validation {
    match entry.kind {
        FieldKind::ShortText | FieldKind::LongText => validate_text(entry, raw),
        FieldKind::StringList => validate_list(entry, raw),
        FieldKind::Number => validate_number(raw),
        FieldKind::Enum(allowed) => validate_enum(allowed, raw),
    }
}

fn validate_text(entry: &FieldSchema, raw: &RawValue) -> Validation {
    let text = raw.to_text();
    let text = text.trim();

    if text.is_empty() {
        return Validation::Rejected(VALUE_REQUIRED.to_string());
    }

    if let Some(max) = entry.kind.max_len() {
        if text.chars().count() > max {
            return Validation::Rejected(format!("must be at most {max} characters"));
        }
    }

    Validation::Accepted(FieldValue::Text(text.to_string()))
}

fn validate_list(entry: &FieldSchema, raw: &RawValue) -> Validation {
    let items = normalize_list(raw);

    if items.is_empty() {
        let reason = if entry.required || raw.to_text().trim().is_empty() {
            VALUE_REQUIRED.to_string()
        } else {
            "at least one item required".to_string()
        };
        return Validation::Rejected(reason);
    }

    Validation::Accepted(FieldValue::List(items))
}

fn validate_number(raw: &RawValue) -> Validation {
    let text = raw.to_text();
    let text = text.trim();

    if text.is_empty() {
        return Validation::Rejected(VALUE_REQUIRED.to_string());
    }

    match text.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Validation::Accepted(FieldValue::Number(n)),
        _ => Validation::Rejected("must be a non-negative number".to_string()),
    }
}

fn validate_enum(allowed: &[&str], raw: &RawValue) -> Validation {
    let text = raw.to_text();
    let text = text.trim();

    if text.is_empty() {
        return Validation::Rejected(VALUE_REQUIRED.to_string());
    }

    allowed.iter().find(|a| a.eq_ignore_ascii_case(text)).map_or_else(
        || Validation::Rejected(format!("must be one of: {}", allowed.join(", "))),
        |canonical| Validation::Accepted(FieldValue::Choice((*canonical).to_string())),
    )
}

/// Split a raw answer into trimmed, deduplicated list items.
///
/// Strings are split on commas, semicolons and newlines. Leading bullet
/// markers are dropped. Duplicates are detected case-insensitively and the
/// first spelling wins.
pub fn normalize_list(raw: &RawValue) -> Vec<String> {
    let pieces: Vec<String> = match raw {
        RawValue::Text(s) => {
            s.split([',', ';', '\n']).map(ToString::to_string).collect()
        }
        RawValue::List(items) => items.clone(),
    };

    let mut seen = HashSet::new();
    pieces
        .iter()
        .map(|p| p.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.to_lowercase()))
        .map(ToString::to_string)
        .collect()
}

/// Best-effort value used when a field is force-accepted.
///
/// A list answer with no items left after splitting coerces to an empty
/// list, which never counts as an answer.
pub fn coerce_raw(entry: &FieldSchema, raw: &RawValue) -> FieldValue {
    match entry.kind {
        FieldKind::StringList => FieldValue::List(normalize_list(raw)),
        _ => FieldValue::Text(raw.to_text().trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::schema::field;

    fn check(key: &str, raw: impl Into<RawValue>) -> Validation {
        validate(field(key).unwrap(), &raw.into())
    }

    #[test]
    fn test_empty_short_text_rejected() {
        assert_eq!(check("appName", ""), Validation::Rejected("value required".into()));
        assert_eq!(check("appName", "   "), Validation::Rejected("value required".into()));
    }

    #[test]
    fn test_short_text_trimmed() {
        assert_eq!(check("appName", "  Acme "), Validation::Accepted(FieldValue::Text("Acme".into())));
    }

    #[test]
    fn test_short_text_too_long() {
        let long = "x".repeat(201);
        match check("appName", long) {
            Validation::Rejected(reason) => assert!(reason.contains("200")),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_long_text_allows_paragraphs() {
        let text = "tracks invoices\nand sends reminders";
        assert!(check("problemSolved", text).is_accepted());
    }

    #[test]
    fn test_list_from_delimited_string() {
        let result = check("coreFeatures", "invoicing, reporting; Invoicing\n- exports");
        assert_eq!(
            result,
            Validation::Accepted(FieldValue::List(vec![
                "invoicing".into(),
                "reporting".into(),
                "exports".into()
            ]))
        );
    }

    #[test]
    fn test_list_from_list() {
        let raw = vec!["a".to_string(), " ".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(
            check("coreFeatures", raw),
            Validation::Accepted(FieldValue::List(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_empty_required_list_rejected() {
        assert_eq!(check("coreFeatures", ", ;"), Validation::Rejected("value required".into()));
    }

    #[test]
    fn test_empty_optional_list_rejected() {
        assert_eq!(
            check("exclusions", " , "),
            Validation::Rejected("at least one item required".into())
        );
    }

    #[test]
    fn test_number_rules() {
        assert_eq!(check("num_developers", "3"), Validation::Accepted(FieldValue::Number(3.0)));
        assert_eq!(check("num_developers", " 2.5 "), Validation::Accepted(FieldValue::Number(2.5)));
        assert!(!check("num_developers", "-1").is_accepted());
        assert!(!check("num_developers", "three").is_accepted());
        assert!(!check("num_developers", "NaN").is_accepted());
        assert_eq!(check("num_developers", ""), Validation::Rejected("value required".into()));
    }

    #[test]
    fn test_enum_case_insensitive_and_canonical() {
        assert_eq!(check("theme", "DARK"), Validation::Accepted(FieldValue::Choice("dark".into())));
        assert_eq!(
            check("targetPlatform", "Cross-Platform"),
            Validation::Accepted(FieldValue::Choice("cross-platform".into()))
        );
    }

    #[test]
    fn test_enum_rejection_lists_allowed() {
        assert_eq!(
            check("theme", "neon"),
            Validation::Rejected("must be one of: light, dark, system".into())
        );
    }

    #[test]
    fn test_coerce_raw() {
        let entry = field("coreFeatures").unwrap();
        assert_eq!(
            coerce_raw(entry, &"a, b".into()),
            FieldValue::List(vec!["a".into(), "b".into()])
        );

        let entry = field("theme").unwrap();
        assert_eq!(coerce_raw(entry, &"neon".into()), FieldValue::Text("neon".into()));
    }

    #[test]
    fn test_coerce_delimiters_only_list_is_empty() {
        let entry = field("coreFeatures").unwrap();
        for raw in [", ;", "-\n*\n;", " , , "] {
            let value = coerce_raw(entry, &raw.into());
            assert_eq!(value, FieldValue::List(vec![]), "{raw:?}");
            assert!(value.is_empty());
        }
    }
}
