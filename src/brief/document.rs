//! The brief document: every collected project field, typed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::schema::{self, FieldSchema};

/// A validated field value.
///
/// Serialized as the bare value, so `Text` and `Choice` look the same on the
/// wire. Briefs are only ever written out, never read back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Short or long text
    Text(String),
    /// Item list
    List(Vec<String>),
    /// Non-negative number
    Number(f64),
    /// Canonical enum member
    Choice(String),
}

impl FieldValue {
    /// Check whether the value carries no information.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) | Self::Choice(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Number(n) => !n.is_finite(),
        }
    }

    /// Get the value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the value as a number, if it is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Choice(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join(", ")),
            Self::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as u64),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// The canonical record of a project brief.
///
/// Keys are schema keys. A brief is complete when every required field holds
/// a non-empty value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BriefDocument {
    /// Accepted values by field key
    values: BTreeMap<String, FieldValue>,

    /// Fields force-accepted after exhausting retries
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    low_confidence: BTreeSet<String>,

    /// Optional fields the user chose to skip
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    skipped: BTreeSet<String>,

    /// Set once the user asked to skip every remaining optional field
    #[serde(default)]
    optional_closed: bool,
}

impl BriefDocument {
    /// Create an empty brief.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value for a field.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    /// Get a text rendering of a field, if it holds a non-empty value.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).map(ToString::to_string)
    }

    /// Check whether a field holds a non-empty value.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    /// Store an accepted value, clearing any skip marker for the field.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        self.skipped.remove(&key);
        self.values.insert(key, value);
    }

    /// Store a value that was accepted without passing validation.
    pub fn insert_low_confidence(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        self.low_confidence.insert(key.clone());
        self.insert(key, value);
    }

    /// Check whether a field was force-accepted.
    pub fn is_low_confidence(&self, key: &str) -> bool {
        self.low_confidence.contains(key)
    }

    /// Keys of all force-accepted fields.
    pub fn low_confidence_fields(&self) -> impl Iterator<Item = &str> {
        self.low_confidence.iter().map(String::as_str)
    }

    /// Mark an optional field as skipped.
    pub fn skip(&mut self, key: impl Into<String>) {
        self.skipped.insert(key.into());
    }

    /// Check whether a field was skipped.
    pub fn is_skipped(&self, key: &str) -> bool {
        self.skipped.contains(key)
    }

    /// Stop offering optional fields.
    pub fn close_optional(&mut self) {
        self.optional_closed = true;
    }

    /// Whether optional fields are no longer offered.
    pub fn optional_closed(&self) -> bool {
        self.optional_closed
    }

    /// Number of fields holding a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field holds a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Required fields that are still missing, in schema order.
    pub fn missing_required(&self) -> Vec<&'static FieldSchema> {
        schema::required_fields().filter(|f| !self.has(f.key)).collect()
    }

    /// Whether every required field holds a value.
    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Number of developers, if given.
    pub fn num_developers(&self) -> Option<u32> {
        self.get("num_developers").and_then(FieldValue::as_number).map(|n| n.round() as u32)
    }

    /// Combined technology stack, e.g. "React, Axum, Rust, Postgres".
    pub fn tech_stack(&self) -> Option<String> {
        let parts: Vec<String> = ["frontendStack", "backendStack", "programmingLanguage", "database"]
            .iter()
            .filter_map(|key| self.text(key))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_only() -> BriefDocument {
        let mut brief = BriefDocument::new();
        brief.insert("appName", FieldValue::Text("Acme".into()));
        brief.insert("problemSolved", FieldValue::Text("tracks invoices".into()));
        brief.insert(
            "coreFeatures",
            FieldValue::List(vec!["invoicing".into(), "reporting".into()]),
        );
        brief
    }

    #[test]
    fn test_empty_brief_is_incomplete() {
        let brief = BriefDocument::new();
        assert!(!brief.is_complete());
        assert_eq!(brief.missing_required().len(), 3);
    }

    #[test]
    fn test_required_only_is_complete() {
        assert!(required_only().is_complete());
    }

    #[test]
    fn test_empty_values_do_not_count() {
        let mut brief = required_only();
        brief.insert("appName", FieldValue::Text("   ".into()));
        assert!(!brief.is_complete());
        assert_eq!(brief.missing_required()[0].key, "appName");
    }

    #[test]
    fn test_insert_clears_skip() {
        let mut brief = BriefDocument::new();
        brief.skip("theme");
        assert!(brief.is_skipped("theme"));

        brief.insert("theme", FieldValue::Choice("dark".into()));
        assert!(!brief.is_skipped("theme"));
    }

    #[test]
    fn test_low_confidence_flag() {
        let mut brief = BriefDocument::new();
        brief.insert_low_confidence("theme", FieldValue::Text("blueish".into()));
        assert!(brief.is_low_confidence("theme"));
        assert!(brief.has("theme"));
        assert_eq!(brief.low_confidence_fields().collect::<Vec<_>>(), vec!["theme"]);
    }

    #[test]
    fn test_tech_stack_and_developers() {
        let mut brief = required_only();
        assert_eq!(brief.tech_stack(), None);

        brief.insert("frontendStack", FieldValue::Text("React".into()));
        brief.insert("database", FieldValue::Text("Postgres".into()));
        brief.insert("num_developers", FieldValue::Number(3.0));

        assert_eq!(brief.tech_stack().as_deref(), Some("React, Postgres"));
        assert_eq!(brief.num_developers(), Some(3));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(FieldValue::Number(4.0).to_string(), "4");
        assert_eq!(FieldValue::Number(2.5).to_string(), "2.5");
        assert_eq!(FieldValue::List(vec!["a".into(), "b".into()]).to_string(), "a, b");
    }

    #[test]
    fn test_json_round_shape() {
        let json = serde_json::to_value(required_only()).unwrap();
        assert_eq!(json["values"]["appName"], "Acme");
        assert_eq!(json["values"]["coreFeatures"][1], "reporting");
    }

    #[test]
    fn test_json_values_are_bare() {
        let mut brief = required_only();
        brief.insert("theme", FieldValue::Choice("dark".into()));
        brief.insert("num_developers", FieldValue::Number(2.0));

        let json = serde_json::to_value(&brief).unwrap();
        assert_eq!(json["values"]["theme"], "dark");
        assert_eq!(json["values"]["num_developers"], 2.0);
        assert_eq!(json["optional_closed"], false);
    }
}
