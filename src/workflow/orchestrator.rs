//! Generation orchestrator.
//!
//! Runs the stage graph against the two providers. Every provider call goes
//! through the retry policy; the estimate chain and the task breakdown run
//! as two branches of one `try_join!`, so the first failure drops the other
//! branch and nothing keeps running after [`WorkflowOrchestrator::run`]
//! returns. Cursor rules, when enabled, run last since they summarize the
//! document and the task breakdown.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::artifacts::{
    parse_structured, strip_code_fence, strip_document_wrapper, ArtifactBundle, CostEstimate,
    TaskBreakdown, TimeEstimate,
};
use super::prompts::{DefaultPromptBuilder, PromptBuilder};
use super::{Stage, WorkflowError};
use crate::ai::{AzureOpenAIProvider, ClaudeProvider, GenerationProvider};
use crate::brief::BriefDocument;
use crate::core::{retry_transient, Config, RetryConfig};

/// Runs the generation pipeline for one brief.
pub struct WorkflowOrchestrator {
    /// Fast/structured provider, used for functional requirements
    fast: Arc<dyn GenerationProvider>,

    /// Deep/reasoning provider, used for everything else
    deep: Arc<dyn GenerationProvider>,

    prompts: Arc<dyn PromptBuilder>,
    retry: RetryConfig,
    task_breakdown: bool,
    cursor_rules: bool,
}

impl WorkflowOrchestrator {
    /// Create an orchestrator with default prompts and retry policy.
    pub fn new(fast: Arc<dyn GenerationProvider>, deep: Arc<dyn GenerationProvider>) -> Self {
        Self {
            fast,
            deep,
            prompts: Arc::new(DefaultPromptBuilder),
            retry: RetryConfig::default(),
            task_breakdown: true,
            cursor_rules: false,
        }
    }

    /// Build the Azure/Claude orchestrator described by the configuration.
    ///
    /// Fails when a provider's credentials are missing from the environment.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let fast = AzureOpenAIProvider::new(&config.providers.azure)?;
        let deep = ClaudeProvider::new(&config.providers.claude)?;

        Ok(Self::new(Arc::new(fast), Arc::new(deep))
            .with_retry(config.orchestrator.retry())
            .with_task_breakdown(config.orchestrator.task_breakdown)
            .with_cursor_rules(config.orchestrator.cursor_rules))
    }

    /// Use a different prompt builder.
    pub fn with_prompts(mut self, prompts: Arc<dyn PromptBuilder>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Use a different retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Enable or disable the task breakdown stage.
    pub fn with_task_breakdown(mut self, enabled: bool) -> Self {
        self.task_breakdown = enabled;
        self
    }

    /// Whether the task breakdown stage runs.
    pub fn task_breakdown_enabled(&self) -> bool {
        self.task_breakdown
    }

    /// Enable or disable the cursor rules stage.
    pub fn with_cursor_rules(mut self, enabled: bool) -> Self {
        self.cursor_rules = enabled;
        self
    }

    /// Run the full pipeline for a brief.
    pub async fn run(&self, brief: &BriefDocument) -> Result<ArtifactBundle, WorkflowError> {
        let start = Instant::now();
        info!(fields = brief.len(), "Starting generation");

        match self.pipeline(brief).await {
            Ok(bundle) => {
                info!(elapsed_ms = start.elapsed().as_millis() as u64, "Generation complete");
                Ok(bundle)
            }
            Err(e) => {
                warn!(stage = %e.stage(), error = %e, "Generation failed");
                Err(e)
            }
        }
    }

    async fn pipeline(&self, brief: &BriefDocument) -> Result<ArtifactBundle, WorkflowError> {
        let functional_requirements = self
            .call(Stage::FunctionalRequirements, &*self.fast, self.prompts.functional_requirements(brief))
            .await?;

        let document = self
            .call(
                Stage::RequirementsDocument,
                &*self.deep,
                self.prompts.requirements_document(&functional_requirements, brief),
            )
            .await?;
        let requirements_document = strip_document_wrapper(&document);

        let estimates = self.estimates(&requirements_document, brief);
        let tasks = self.tasks(&requirements_document, brief);
        let ((time_estimate, cost_estimate), task_breakdown) = tokio::try_join!(estimates, tasks)?;

        let cursor_rules =
            self.rules(brief, &requirements_document, task_breakdown.as_ref()).await?;

        Ok(ArtifactBundle {
            functional_requirements,
            requirements_document,
            time_estimate,
            cost_estimate,
            task_breakdown,
            cursor_rules,
        })
    }

    /// Time estimate, then cost estimate built on it.
    async fn estimates(
        &self,
        document: &str,
        brief: &BriefDocument,
    ) -> Result<(TimeEstimate, CostEstimate), WorkflowError> {
        let reply =
            self.call(Stage::TimeEstimate, &*self.deep, self.prompts.time_estimate(document, brief)).await?;
        let time: TimeEstimate = parse_structured(Stage::TimeEstimate, &reply)?;

        let reply = self
            .call(Stage::CostEstimate, &*self.deep, self.prompts.cost_estimate(document, brief, &time))
            .await?;
        let cost: CostEstimate = parse_structured(Stage::CostEstimate, &reply)?;

        Ok((time, cost))
    }

    async fn tasks(
        &self,
        document: &str,
        brief: &BriefDocument,
    ) -> Result<Option<TaskBreakdown>, WorkflowError> {
        if !self.task_breakdown {
            debug!("Task breakdown disabled");
            return Ok(None);
        }

        let reply =
            self.call(Stage::TaskBreakdown, &*self.deep, self.prompts.task_breakdown(document, brief)).await?;
        parse_structured(Stage::TaskBreakdown, &reply).map(Some)
    }

    async fn rules(
        &self,
        brief: &BriefDocument,
        document: &str,
        tasks: Option<&TaskBreakdown>,
    ) -> Result<Option<String>, WorkflowError> {
        if !self.cursor_rules {
            return Ok(None);
        }

        let prompt = self.prompts.cursor_rules(brief, document, tasks);
        let reply = self.call(Stage::CursorRules, &*self.deep, prompt).await?;
        Ok(Some(strip_code_fence(&reply).to_string()))
    }

    /// One provider call under the retry policy.
    async fn call(
        &self,
        stage: Stage,
        provider: &dyn GenerationProvider,
        prompt: String,
    ) -> Result<String, WorkflowError> {
        info!(stage = %stage, provider = provider.name(), "Generating");

        let prompt = prompt.as_str();
        let outcome = retry_transient(&self.retry, move || provider.generate(prompt)).await;

        debug!(
            stage = %stage,
            attempts = outcome.attempts,
            elapsed_ms = outcome.total_time.as_millis() as u64,
            "Stage finished"
        );

        outcome.into_result().map_err(|cause| WorkflowError::GenerationFailure { stage, cause })
    }
}
