//! Commit creation from the index using git2.

use git2::{ErrorCode, Oid, Repository};

use crate::error::GitError;

/// Commit the index as-is on HEAD.
///
/// The staged tree is exactly what the diff described, so nothing is
/// re-staged here. Supports the initial commit on an unborn branch.
pub fn commit_index(repo: &Repository, message: &str) -> Result<Oid, GitError> {
    let mut index = repo.index().map_err(GitError::CommitFailed)?;
    let tree_id = index.write_tree().map_err(GitError::CommitFailed)?;
    let tree = repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

    let sig = repo.signature().map_err(GitError::ConfigError)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(GitError::CommitFailed)?),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(GitError::CommitFailed(e)),
    };
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(GitError::CommitFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    fn init_repo(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@test.com").unwrap();
        }
        repo
    }

    fn stage(repo: &Repository, dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
    }

    #[test]
    fn test_commit_staged_changes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());

        stage(&repo, dir.path(), "a.txt", "initial\n");
        commit_index(&repo, "chore: init").unwrap();

        stage(&repo, dir.path(), "b.txt", "second file\n");
        let oid = commit_index(&repo, "feat: add b").unwrap();

        let commit = repo.find_commit(oid).unwrap();
        assert_eq!(commit.message().unwrap(), "feat: add b");
        assert_eq!(commit.parent_count(), 1);
    }

    #[test]
    fn test_initial_commit_on_unborn_branch() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());

        stage(&repo, dir.path(), "first.txt", "first\n");
        let oid = commit_index(&repo, "chore: initial commit").unwrap();

        let commit = repo.find_commit(oid).unwrap();
        assert_eq!(commit.parent_count(), 0);
        assert_eq!(commit.message().unwrap(), "chore: initial commit");
    }

    #[test]
    fn test_commit_preserves_exact_message() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());

        stage(&repo, dir.path(), "a.txt", "content\n");
        let message = "fix(parser): handle empty input";
        let oid = commit_index(&repo, message).unwrap();

        assert_eq!(repo.find_commit(oid).unwrap().message().unwrap(), message);
    }
}
