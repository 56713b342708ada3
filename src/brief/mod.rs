//! Project brief model.
//!
//! A brief is the structured description of a project that drives every
//! generation run. It can be collected turn by turn through a
//! [`Session`](crate::session::Session) or parsed in one pass from a filled
//! markdown template.
//!
//! ## Pieces
//!
//! - [`FIELDS`] - the static, ordered field schema (3 required, 14 optional)
//! - [`BriefDocument`] - the typed record of collected values
//! - [`validate`] - per-field answer validation
//! - [`render_template`] / [`parse_brief`] - the markdown round trip

mod document;
mod parser;
mod schema;
mod template;
mod validator;

pub use document::{BriefDocument, FieldValue};
pub use parser::{parse_brief, BriefError};
pub use schema::{
    field, optional_fields, required_fields, FieldKind, FieldSchema, FIELDS, LONG_TEXT_MAX,
    SHORT_TEXT_MAX,
};
pub use template::{render_template, OPTIONAL_PLACEHOLDER};
pub use validator::{coerce_raw, normalize_list, validate, RawValue, Validation, VALUE_REQUIRED};
