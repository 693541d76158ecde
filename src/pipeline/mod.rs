//! The commit pipeline: diff capture → provider dispatch → selection → commit.

pub mod select;

pub use select::{DialoguerSelector, PrintWriter};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Settings;
use crate::error::{GitError, PipelineError};
use crate::git::StagedDiff;
use crate::provider::ProviderRegistry;

/// Collaborator that captures the staged diff. `None` means nothing staged.
#[async_trait]
pub trait DiffSource: Send + Sync {
    async fn staged_diff(&self) -> Result<Option<StagedDiff>, GitError>;
}

/// Collaborator that writes the final commit with the exact selected text.
#[async_trait]
pub trait CommitWriter: Send + Sync {
    async fn create_commit(&self, message: &str) -> Result<(), GitError>;
}

/// The user's decision at the selection step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A chosen, possibly user-edited, message.
    Message(String),
    Cancelled,
}

/// Collaborator that presents candidates and returns the user's choice.
#[async_trait]
pub trait MessageSelector: Send + Sync {
    async fn select(&self, candidates: &[String]) -> Result<Selection, PipelineError>;
}

/// Pipeline states, advanced by the completion of exactly one asynchronous
/// step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    CollectingDiff,
    ResolvingProvider,
    GeneratingMessages,
    AwaitingSelection,
    Committing,
    Done,
    Cancelled,
    Error,
}

/// Terminal outcome of a run that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Committed { message: String },
    Cancelled,
}

/// One-shot orchestrator for a single commit-message run.
///
/// Steps are strictly sequential: no step starts before its predecessor's
/// result is known, the first error aborts the run with no compensating
/// work, and cancellation is only possible at the selection step.
pub struct CommitPipeline {
    registry: Arc<ProviderRegistry>,
    settings: Settings,
    diff_source: Box<dyn DiffSource>,
    selector: Box<dyn MessageSelector>,
    writer: Box<dyn CommitWriter>,
    commitlint_rules: Option<String>,
    state: PipelineState,
}

impl CommitPipeline {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        settings: Settings,
        diff_source: Box<dyn DiffSource>,
        selector: Box<dyn MessageSelector>,
        writer: Box<dyn CommitWriter>,
        commitlint_rules: Option<String>,
    ) -> Self {
        Self {
            registry,
            settings,
            diff_source,
            selector,
            writer,
            commitlint_rules,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Drive the pipeline to a terminal state.
    pub async fn run(&mut self) -> Result<PipelineOutcome, PipelineError> {
        match self.drive().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.state = PipelineState::Error;
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> Result<PipelineOutcome, PipelineError> {
        self.state = PipelineState::CollectingDiff;
        let diff = self
            .diff_source
            .staged_diff()
            .await?
            .ok_or(GitError::NothingStaged)?;
        debug!(
            "Staged diff: {} files, {} chars, truncated={}",
            diff.files.len(),
            diff.diff_text.len(),
            diff.truncated
        );

        self.state = PipelineState::ResolvingProvider;
        let (provider, config) = self.registry.get_active_provider(&self.settings)?;
        debug!("Active provider: {}", provider.name());

        self.state = PipelineState::GeneratingMessages;
        let candidates = provider
            .generate_commit_message(&diff, &config, self.commitlint_rules.as_deref())
            .await?;
        debug!("{} candidate message(s)", candidates.len());

        self.state = PipelineState::AwaitingSelection;
        match self.selector.select(&candidates).await? {
            Selection::Cancelled => {
                self.state = PipelineState::Cancelled;
                Ok(PipelineOutcome::Cancelled)
            }
            Selection::Message(message) => {
                self.state = PipelineState::Committing;
                self.writer.create_commit(&message).await?;
                self.state = PipelineState::Done;
                Ok(PipelineOutcome::Committed { message })
            }
        }
    }
}
