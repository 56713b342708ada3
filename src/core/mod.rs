//! Core infrastructure shared by sessions and the generation pipeline.
//!
//! This module contains the configuration model and the retry policy used
//! around provider calls.

mod config;
mod retry;

pub use config::{
    AzureConfig, ClaudeConfig, Config, OrchestratorConfig, ProvidersConfig, SessionConfig,
};
pub use retry::{retry_transient, RetryConfig, RetryResult};
