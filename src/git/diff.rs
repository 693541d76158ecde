//! Staged diff capture from the index using git2.

use git2::{Delta, Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};
use tracing::warn;

use crate::error::GitError;

/// Maximum characters for the unified diff text before truncation.
const MAX_DIFF_LENGTH: usize = 30_000;

/// Lock files carry no signal for a commit message and bloat the prompt.
const LOCK_FILE_NAMES: [&str; 2] = ["package-lock.json", "pnpm-lock.yaml"];

/// A captured staged diff, immutable for the duration of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDiff {
    /// Changed file paths in first-seen diff order, deduplicated.
    pub files: Vec<String>,
    /// Unified diff text.
    pub diff_text: String,
    pub truncated: bool,
}

fn is_lock_file(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    LOCK_FILE_NAMES.contains(&name) || name.ends_with(".lock")
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// `Ok(Some(tree))` for repos with a valid HEAD, or `Err(GitError::DiffFailed)`
/// for real errors (corrupt HEAD, permission issues, missing objects).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Capture the staged diff (HEAD tree vs index).
///
/// Returns `Ok(None)` when nothing relevant is staged. Lock files are
/// excluded from both the file list and the diff text, and the minimal diff
/// algorithm keeps hunks tight.
pub fn staged_diff(repo: &Repository) -> Result<Option<StagedDiff>, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let mut opts = DiffOptions::new();
    opts.minimal(true);
    let diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut opts))
        .map_err(GitError::DiffFailed)?;

    let files = collect_files(&diff);
    if files.is_empty() {
        return Ok(None);
    }

    let (diff_text, truncated) = collect_text(&diff);
    Ok(Some(StagedDiff {
        files,
        diff_text,
        truncated,
    }))
}

/// Collect changed file paths in first-seen delta order, deduplicated.
fn collect_files(diff: &Diff<'_>) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();

    for delta in diff.deltas() {
        let path = match delta.status() {
            Delta::Deleted => delta.old_file().path(),
            _ => delta.new_file().path().or_else(|| delta.old_file().path()),
        };
        let Some(path) = path.map(|p| p.to_string_lossy().to_string()) else {
            continue;
        };

        if is_lock_file(&path) {
            continue;
        }
        if !files.contains(&path) {
            files.push(path);
        }
    }

    files
}

/// Assemble the unified diff text, skipping lock files and respecting the
/// max length.
fn collect_text(diff: &Diff<'_>) -> (String, bool) {
    let mut text = String::new();
    let mut truncated = false;

    if let Err(e) = diff.print(DiffFormat::Patch, |delta, _hunk, line| {
        if truncated {
            return true;
        }

        let path = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        if is_lock_file(&path) {
            return true;
        }

        let content = std::str::from_utf8(line.content()).unwrap_or("");

        if text.len() + content.len() + 2 > MAX_DIFF_LENGTH {
            truncated = true;
            return true;
        }

        // Include the origin character for context
        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(content);

        true
    }) {
        warn!("Failed to collect diff text: {e}");
        truncated = true;
    }

    (text, truncated)
}
