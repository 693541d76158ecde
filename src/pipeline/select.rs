//! Terminal selection UI and the dry-run commit writer.

use async_trait::async_trait;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use tokio::task;

use crate::error::{GitError, PipelineError};

use super::{CommitWriter, MessageSelector, Selection};

/// Interactive selector: pick a candidate, edit it if desired, Esc aborts.
///
/// dialoguer blocks on the terminal, so the prompt runs on a blocking task.
pub struct DialoguerSelector;

#[async_trait]
impl MessageSelector for DialoguerSelector {
    async fn select(&self, candidates: &[String]) -> Result<Selection, PipelineError> {
        let items = candidates.to_vec();

        task::spawn_blocking(move || {
            let choice = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Commit message (Esc to abort)")
                .items(&items)
                .default(0)
                .interact_opt()
                .map_err(|e| PipelineError::SelectionFailed(e.to_string()))?;

            let Some(index) = choice else {
                return Ok(Selection::Cancelled);
            };

            let message: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Edit message")
                .with_initial_text(items[index].clone())
                .interact_text()
                .map_err(|e| PipelineError::SelectionFailed(e.to_string()))?;

            let message = message.trim().to_string();
            if message.is_empty() {
                return Ok(Selection::Cancelled);
            }
            Ok(Selection::Message(message))
        })
        .await
        .map_err(|e| PipelineError::SelectionFailed(e.to_string()))?
    }
}

/// Commit writer used by --dry-run: prints the message instead of
/// committing.
pub struct PrintWriter;

#[async_trait]
impl CommitWriter for PrintWriter {
    async fn create_commit(&self, message: &str) -> Result<(), GitError> {
        println!("\n--- Dry Run ---\n{message}");
        Ok(())
    }
}
