use super::{credentials::CredentialHandler, GitError};
use git2::{Commit, ErrorCode, Oid, PushOptions, RemoteCallbacks, Repository, Signature};
use log::debug;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Shorten a commit id to the usual 7 characters.
pub fn shorthash(sha: &str) -> String {
    sha.chars().take(7).collect()
}

pub struct GitRepository {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepository {
    pub fn open(directory: &Path) -> Result<Self, GitError> {
        let not_a_repository =
            |reason: String| GitError::NotAGitRepository(directory.to_path_buf(), reason);

        let repo = Repository::open(directory)
            .map_err(|err| not_a_repository(err.message().to_string()))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| not_a_repository(String::from("repository is bare")))?;
        let workdir =
            fs::canonicalize(workdir).map_err(|err| not_a_repository(err.to_string()))?;

        Ok(GitRepository { repo, workdir })
    }

    fn relative_path(&self, path: &Path) -> Result<PathBuf, GitError> {
        let absolute = fs::canonicalize(path)
            .map_err(|err| GitError::StagingFailed(path.to_path_buf(), err.to_string()))?;

        absolute
            .strip_prefix(&self.workdir)
            .map(Path::to_path_buf)
            .map_err(|_| GitError::OutsideRepository(path.to_path_buf()))
    }

    /// Add exactly these paths to the index, nothing else in the working tree.
    pub fn stage(&self, paths: &[PathBuf]) -> Result<(), GitError> {
        let mut index = self
            .repo
            .index()
            .map_err(|err| GitError::CommitFailed(err.message().to_string()))?;

        for path in paths {
            let relative = self.relative_path(path)?;
            index
                .add_path(&relative)
                .map_err(|err| GitError::StagingFailed(path.clone(), err.message().to_string()))?;
            debug!("Staged {}.", relative.display());
        }

        index
            .write()
            .map_err(|err| GitError::CommitFailed(err.message().to_string()))?;

        Ok(())
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>, GitError> {
        match self.repo.head() {
            Ok(head) => head.peel_to_commit().map(Some).map_err(|_| GitError::NoHead),
            Err(err) if err.code() == ErrorCode::UnbornBranch || err.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(_) => Err(GitError::NoHead),
        }
    }

    /// Commit the index on top of HEAD, using the same identity as author and committer.
    pub fn commit(
        &self,
        author_name: &str,
        author_email: &str,
        message: &str,
    ) -> Result<Oid, GitError> {
        let signature = Signature::now(author_name, author_email)
            .map_err(|err| GitError::InvalidIdentity(err.message().to_string()))?;

        let mut index = self
            .repo
            .index()
            .map_err(|err| GitError::CommitFailed(err.message().to_string()))?;
        let tree_id = index
            .write_tree()
            .map_err(|err| GitError::CommitFailed(err.message().to_string()))?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|err| GitError::CommitFailed(err.message().to_string()))?;

        let parent = self.head_commit()?;
        if let Some(parent) = &parent {
            if parent.tree_id() == tree_id {
                return Err(GitError::NothingToCommit);
            }
        }
        let parents: Vec<&Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(|err| GitError::CommitFailed(err.message().to_string()))
    }

    /// Find the remote with this name, in the order the remotes are configured.
    pub fn find_remote(&self, name: &str) -> Result<Option<String>, GitError> {
        let remotes = self
            .repo
            .remotes()
            .map_err(|err| GitError::NotAGitRepository(self.workdir.clone(), err.message().to_string()))?;

        Ok(remotes
            .iter()
            .flatten()
            .find(|remote| *remote == name)
            .map(String::from))
    }

    /// The short name of the checked out branch, `None` on a detached or unborn HEAD.
    pub fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        if !head.is_branch() {
            return None;
        }

        head.shorthand().map(String::from)
    }

    /// Push the branch to the same branch on the remote. Rejected updates are failures.
    pub fn push(&self, remote_name: &str, branch_name: &str) -> Result<(), GitError> {
        let push_failed = |cause: String| GitError::PushFailed {
            remote: String::from(remote_name),
            cause,
        };

        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|err| push_failed(err.message().to_string()))?;
        let config = self
            .repo
            .config()
            .map_err(|_| GitError::ConfigLoadingFailed)?;

        let mut handler = CredentialHandler::new(config);
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed| {
            handler.try_next_credential(url, username, allowed)
        });
        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "{refname} was rejected: {message}"
            ))),
            None => Ok(()),
        });

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{branch_name}:refs/heads/{branch_name}");
        remote
            .push(&[refspec.as_str()], Some(&mut options))
            .map_err(|err| push_failed(err.message().to_string()))?;

        Ok(())
    }
}
