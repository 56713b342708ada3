//! Question planning.
//!
//! Decides which field to ask about next. Planning is a pure function of
//! the brief: required fields first, then optional fields, both in schema
//! order, skipping anything already answered or explicitly skipped.

use crate::brief::{optional_fields, required_fields, BriefDocument, FieldSchema};

/// What the session should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Ask about this field
    Ask(&'static FieldSchema),
    /// Nothing left to ask
    Done,
}

impl Next {
    /// The field to ask about, if any.
    pub fn field(&self) -> Option<&'static FieldSchema> {
        match self {
            Self::Ask(entry) => Some(entry),
            Self::Done => None,
        }
    }
}

/// Pick the next field to ask about.
pub fn next(brief: &BriefDocument) -> Next {
    match eligible(brief).next() {
        Some(entry) => Next::Ask(entry),
        None => Next::Done,
    }
}

/// Keys of every field that would still be asked, in asking order.
pub fn remaining(brief: &BriefDocument) -> Vec<&'static str> {
    eligible(brief).map(|entry| entry.key).collect()
}

/// Whether the planner has nothing left to ask.
pub fn is_done(brief: &BriefDocument) -> bool {
    next(brief) == Next::Done
}

fn eligible(brief: &BriefDocument) -> impl Iterator<Item = &'static FieldSchema> + '_ {
    let required = required_fields().filter(move |entry| !brief.has(entry.key));
    let optional = optional_fields()
        .filter(move |_| !brief.optional_closed())
        .filter(move |entry| !brief.has(entry.key) && !brief.is_skipped(entry.key));

    required.chain(optional)
}
