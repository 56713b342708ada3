#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]

//! # Briefwright
//!
//! Turn a project brief into requirements, estimates and a task plan.
//!
//! Briefwright collects a structured description of a software project,
//! either turn by turn in an interactive session or in one pass from a
//! filled markdown template, and hands it to two LLM providers that produce
//! functional requirements, a requirements document, time and cost
//! estimates, and a phased task breakdown.
//!
//! ## Features
//!
//! - **Guided collection**: one question at a time, with validation and re-asking
//! - **Markdown briefs**: render a template, fill it in, parse it back
//! - **Resilient generation**: retries for transient provider failures, fail-fast otherwise
//! - **Concurrent estimates**: the estimate chain and task breakdown run side by side
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a template, fill it in, generate
//! briefwright template > brief.md
//! briefwright generate brief.md --output artifacts.json
//!
//! # Or answer questions interactively
//! briefwright collect
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod ai;
pub mod brief;
pub mod core;
pub mod session;
pub mod workflow;

// Re-export commonly used types
pub use ai::{GenerationProvider, ProviderError};
pub use brief::{parse_brief, render_template, BriefDocument, BriefError};
pub use core::Config;
pub use session::{SessionError, SessionRegistry, SessionResult};
pub use workflow::{ArtifactBundle, WorkflowError, WorkflowOrchestrator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "briefwright";
