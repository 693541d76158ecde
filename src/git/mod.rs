//! Git collaborators: staged diff capture and commit creation.

pub mod commit;
pub mod diff;

pub use commit::commit_index;
pub use diff::{StagedDiff, staged_diff};

use std::path::PathBuf;

use async_trait::async_trait;
use git2::Repository;
use tracing::debug;

use crate::error::GitError;
use crate::pipeline::{CommitWriter, DiffSource};

/// Diff-source collaborator backed by a repository on disk.
pub struct GitDiffSource {
    repo_path: PathBuf,
}

impl GitDiffSource {
    pub fn new(repo_path: PathBuf) -> Self {
        Self { repo_path }
    }
}

#[async_trait]
impl DiffSource for GitDiffSource {
    async fn staged_diff(&self) -> Result<Option<StagedDiff>, GitError> {
        let repo = Repository::open(&self.repo_path).map_err(GitError::OpenRepository)?;
        diff::staged_diff(&repo)
    }
}

/// Commit-writer collaborator backed by a repository on disk.
pub struct GitCommitWriter {
    repo_path: PathBuf,
}

impl GitCommitWriter {
    pub fn new(repo_path: PathBuf) -> Self {
        Self { repo_path }
    }
}

#[async_trait]
impl CommitWriter for GitCommitWriter {
    async fn create_commit(&self, message: &str) -> Result<(), GitError> {
        let repo = Repository::open(&self.repo_path).map_err(GitError::OpenRepository)?;
        let oid = commit::commit_index(&repo, message)?;
        debug!("Created commit {oid}");
        Ok(())
    }
}
