use self::repository::{shorthash, GitRepository};
use super::{Action, ActionError};
use crate::{config::WatchConfig, context::Context};
use log::{debug, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod credentials;
mod repository;

/// Only a remote with this exact name is pushed to.
const REMOTE_NAME: &str = "origin";

/// A custom error describing the error cases for the GitAction.
#[derive(Debug, Error)]
pub enum GitError {
    /// The directory is not a valid git repository.
    #[error("{} is not a valid git repository ({})", .0.display(), .1)]
    NotAGitRepository(PathBuf, String),
    /// Cannot parse HEAD, probably some deleted reference.
    #[error("HEAD is invalid, probably points to invalid commit")]
    NoHead,
    /// The path to stage is not inside the working directory of the repository.
    #[error("{} is outside of the repository", .0.display())]
    OutsideRepository(PathBuf),
    /// The path cannot be added to the index.
    #[error("cannot stage {} ({})", .0.display(), .1)]
    StagingFailed(PathBuf, String),
    /// The author name or email cannot be used for a commit.
    #[error("invalid author ({0})")]
    InvalidIdentity(String),
    /// The staged files are the same as in HEAD.
    #[error("there are no changes to commit")]
    NothingToCommit,
    /// Writing the commit failed.
    #[error("cannot commit ({0})")]
    CommitFailed(String),
    /// The repository is not on a branch, so there is nothing to push to the remote.
    #[error("repository is not on a branch, cannot push to {remote}")]
    NotOnABranch { remote: String },
    /// Cannot load the git config
    #[error("cannot load git config")]
    ConfigLoadingFailed,
    /// Cannot push to the remote. This can be a network failure, authentication error
    /// or a rejected push, because the remote history diverged.
    #[error("cannot push to {remote} ({cause})")]
    PushFailed { remote: String, cause: String },
}

impl From<GitError> for ActionError {
    fn from(value: GitError) -> Self {
        match value {
            GitError::NothingToCommit => ActionError::Skipped(value.to_string()),
            GitError::NotAGitRepository(_, _)
            | GitError::NoHead
            | GitError::OutsideRepository(_)
            | GitError::StagingFailed(_, _)
            | GitError::InvalidIdentity(_)
            | GitError::CommitFailed(_)
            | GitError::NotOnABranch { .. }
            | GitError::ConfigLoadingFailed
            | GitError::PushFailed { .. } => ActionError::FailedAction(value.to_string()),
        }
    }
}

/// The outcome of publishing the changed files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitResult {
    pub commit_id: String,
    /// Whether the commit was pushed to the remote.
    pub pushed: bool,
}

impl CommitResult {
    pub fn short_id(&self) -> String {
        shorthash(&self.commit_id)
    }
}

/// Stage the changed paths, commit them and push the current branch to `origin`.
///
/// Only the given paths are staged, other changes in the working tree are left alone.
/// If there is no remote called `origin`, the push is skipped without an error.
/// A failed push leaves the commit in the local history.
pub fn publish(
    directory: &Path,
    changed_paths: &[PathBuf],
    author_name: &str,
    author_email: &str,
    message: &str,
) -> Result<CommitResult, GitError> {
    info!("Getting index...");
    let repo = GitRepository::open(directory)?;

    info!("Adding files...");
    repo.stage(changed_paths)?;

    info!("Committing...");
    let commit_id = repo.commit(author_name, author_email, message)?;
    debug!("Created commit {commit_id}.");

    let pushed = match repo.find_remote(REMOTE_NAME)? {
        Some(remote) => {
            let branch = repo
                .current_branch()
                .ok_or_else(|| GitError::NotOnABranch {
                    remote: remote.clone(),
                })?;
            info!("Pushing {branch} to {remote}...");
            repo.push(&remote, &branch)?;
            true
        }
        None => {
            info!("There is no remote called {REMOTE_NAME}, not pushing.");
            false
        }
    };

    Ok(CommitResult {
        commit_id: commit_id.to_string(),
        pushed,
    })
}

/// An action to commit the copied files and push them to the remote.
pub struct GitAction {
    directory: PathBuf,
    author_name: String,
    author_email: String,
    message: String,
}

impl GitAction {
    pub fn new(
        directory: PathBuf,
        author_name: String,
        author_email: String,
        message: String,
    ) -> Self {
        GitAction {
            directory,
            author_name,
            author_email,
            message,
        }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        GitAction::new(
            config.git_directory.clone(),
            config.author_name.clone(),
            config.author_email.clone(),
            config.commit_message.clone(),
        )
    }
}

impl Action for GitAction {
    /// Publish the paths written by the previous actions in one commit.
    fn run(&self, context: &mut Context) -> Result<(), ActionError> {
        let result = publish(
            &self.directory,
            &context.changed_paths,
            &self.author_name,
            &self.author_email,
            &self.message,
        )?;
        info!(
            "Committed {}{}.",
            result.short_id(),
            if result.pushed { " and pushed" } else { "" }
        );
        context.commit = Some(result);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FileEvent, FileEventKind};
    use duct::cmd;
    use rand::distributions::{Alphanumeric, DistString};
    use std::{error::Error, fs};

    const AUTHOR_NAME: &str = "Jane Doe";
    const AUTHOR_EMAIL: &str = "jane@example.com";

    fn get_random_id() -> String {
        Alphanumeric.sample_string(&mut rand::thread_rng(), 16)
    }

    fn commit_all(path: &str, message: &str) -> Result<(), Box<dyn Error>> {
        cmd!("git", "add", "-A").dir(path).read()?;
        cmd!(
            "git",
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "commit",
            "-m",
            message
        )
        .dir(path)
        .read()?;

        Ok(())
    }

    fn create_repository_with_remote(local: &str) -> Result<(), Box<dyn Error>> {
        let remote = format!("{local}-remote");

        // Create directory and repository in it
        fs::create_dir_all(&remote)?;
        cmd!("git", "init", "--bare").dir(&remote).read()?;
        cmd!("git", "clone", &remote, &local).read()?;
        fs::write(format!("{local}/1"), "1")?;
        commit_all(local, "1")?;
        cmd!("git", "push", "origin", "HEAD").dir(local).read()?;

        Ok(())
    }

    fn create_repository_without_remote(local: &str) -> Result<(), Box<dyn Error>> {
        fs::create_dir_all(local)?;
        cmd!("git", "init").dir(local).read()?;

        Ok(())
    }

    fn push_from_other_repository(local: &str) -> Result<(), Box<dyn Error>> {
        let remote = format!("{local}-remote");
        let other = format!("{local}-other");

        cmd!("git", "clone", &remote, &other).read()?;
        fs::write(format!("{other}/2"), "2")?;
        commit_all(&other, "2")?;
        cmd!("git", "push", "origin", "HEAD").dir(other).read()?;

        Ok(())
    }

    fn get_last_commit(path: &str) -> Result<String, Box<dyn Error>> {
        let commit_sha = cmd!("git", "rev-parse", "HEAD").dir(path).read()?;

        Ok(commit_sha)
    }

    fn get_remote_commit(local: &str) -> Result<String, Box<dyn Error>> {
        let remote = format!("{local}-remote");
        let branch = cmd!("git", "rev-parse", "--abbrev-ref", "HEAD")
            .dir(local)
            .read()?;
        let commit_sha = cmd!("git", "rev-parse", format!("refs/heads/{branch}"))
            .dir(remote)
            .read()?;

        Ok(commit_sha)
    }

    fn cleanup_repository(local: &str) -> Result<(), Box<dyn Error>> {
        let remote = format!("{local}-remote");
        let other = format!("{local}-other");

        fs::remove_dir_all(local)?;
        if Path::new(&remote).exists() {
            fs::remove_dir_all(remote)?;
        }
        if Path::new(&other).exists() {
            fs::remove_dir_all(other)?;
        }

        Ok(())
    }

    fn publish_test(local: &str, changed_paths: &[PathBuf]) -> Result<CommitResult, GitError> {
        publish(
            Path::new(local),
            changed_paths,
            AUTHOR_NAME,
            AUTHOR_EMAIL,
            "Update document",
        )
    }

    #[test]
    fn it_should_fail_if_path_is_invalid() {
        let error = publish_test("/path/to/nowhere", &[]).err().unwrap();

        assert!(
            matches!(error, GitError::NotAGitRepository(_, _)),
            "{error:?} should be NotAGitRepository"
        );
    }

    #[test]
    fn it_should_commit_and_push_to_origin() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");

        create_repository_with_remote(&local)?;

        fs::write(format!("{local}/doc.pdf"), "X")?;
        let result = publish_test(&local, &[PathBuf::from(format!("{local}/doc.pdf"))])?;

        assert!(result.pushed);
        assert_eq!(get_last_commit(&local)?, result.commit_id);
        assert_eq!(get_remote_commit(&local)?, result.commit_id);

        let author = cmd!("git", "log", "-1", "--format=%an <%ae>|%cn <%ce>|%s")
            .dir(&local)
            .read()?;
        assert_eq!(
            "Jane Doe <jane@example.com>|Jane Doe <jane@example.com>|Update document",
            author
        );

        cleanup_repository(&local)?;

        Ok(())
    }

    #[test]
    fn it_should_create_one_commit_for_all_destinations() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");

        create_repository_with_remote(&local)?;

        fs::write(format!("{local}/a.pdf"), "X")?;
        fs::write(format!("{local}/b.pdf"), "X")?;
        let changed_paths = vec![
            PathBuf::from(format!("{local}/a.pdf")),
            PathBuf::from(format!("{local}/b.pdf")),
        ];
        publish_test(&local, &changed_paths)?;

        let count = cmd!("git", "rev-list", "--count", "HEAD")
            .dir(&local)
            .read()?;
        assert_eq!("2", count);

        let files = cmd!("git", "show", "--name-only", "--format=", "HEAD")
            .dir(&local)
            .read()?;
        let files: Vec<&str> = files.lines().collect();
        assert_eq!(vec!["a.pdf", "b.pdf"], files);

        cleanup_repository(&local)?;

        Ok(())
    }

    #[test]
    fn it_should_commit_on_an_empty_repository() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");

        create_repository_without_remote(&local)?;

        fs::write(format!("{local}/doc.pdf"), "X")?;
        let result = publish_test(&local, &[PathBuf::from(format!("{local}/doc.pdf"))])?;

        assert_eq!(get_last_commit(&local)?, result.commit_id);

        cleanup_repository(&local)?;

        Ok(())
    }

    #[test]
    fn it_should_not_push_without_origin() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");

        create_repository_without_remote(&local)?;

        fs::write(format!("{local}/doc.pdf"), "X")?;
        let result = publish_test(&local, &[PathBuf::from(format!("{local}/doc.pdf"))])?;

        assert!(!result.pushed);

        cleanup_repository(&local)?;

        Ok(())
    }

    #[test]
    fn it_should_not_push_to_other_remotes() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");
        let remote = format!("{local}-remote");

        create_repository_without_remote(&local)?;
        fs::create_dir_all(&remote)?;
        cmd!("git", "init", "--bare").dir(&remote).read()?;
        let remote_path = fs::canonicalize(&remote)?;
        cmd!("git", "remote", "add", "upstream", remote_path)
            .dir(&local)
            .read()?;

        fs::write(format!("{local}/doc.pdf"), "X")?;
        let result = publish_test(&local, &[PathBuf::from(format!("{local}/doc.pdf"))])?;

        assert!(!result.pushed);
        let remote_refs = cmd!("git", "for-each-ref").dir(&remote).read()?;
        assert_eq!("", remote_refs);

        cleanup_repository(&local)?;

        Ok(())
    }

    #[test]
    fn it_should_fail_if_nothing_changed() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");

        create_repository_with_remote(&local)?;

        fs::write(format!("{local}/doc.pdf"), "X")?;
        let changed_paths = vec![PathBuf::from(format!("{local}/doc.pdf"))];
        let first = publish_test(&local, &changed_paths)?;

        // Copying the same content again does not change anything
        fs::write(format!("{local}/doc.pdf"), "X")?;
        let error = publish_test(&local, &changed_paths).err().unwrap();

        assert!(
            matches!(error, GitError::NothingToCommit),
            "{error:?} should be NothingToCommit"
        );
        assert_eq!(first.commit_id, get_last_commit(&local)?);
        assert!(matches!(
            ActionError::from(error),
            ActionError::Skipped(_)
        ));

        cleanup_repository(&local)?;

        Ok(())
    }

    #[test]
    fn it_should_only_stage_the_changed_paths() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");

        create_repository_with_remote(&local)?;

        fs::write(format!("{local}/unrelated.txt"), "not for the commit")?;
        fs::write(format!("{local}/doc.pdf"), "X")?;
        publish_test(&local, &[PathBuf::from(format!("{local}/doc.pdf"))])?;

        let status = cmd!("git", "status", "--porcelain").dir(&local).read()?;
        assert_eq!("?? unrelated.txt", status);

        cleanup_repository(&local)?;

        Ok(())
    }

    #[test]
    fn it_should_fail_if_the_path_is_outside_of_the_repository() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");

        create_repository_without_remote(&local)?;

        let outside = format!("test_directories/{id}.pdf");
        fs::write(&outside, "X")?;
        let error = publish_test(&local, &[PathBuf::from(&outside)])
            .err()
            .unwrap();

        assert!(
            matches!(error, GitError::OutsideRepository(_)),
            "{error:?} should be OutsideRepository"
        );

        fs::remove_file(&outside)?;
        cleanup_repository(&local)?;

        Ok(())
    }

    #[test]
    fn it_should_fail_if_the_push_is_rejected() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");

        create_repository_with_remote(&local)?;

        // Diverge the remote history from the local one
        push_from_other_repository(&local)?;
        let remote_commit = get_remote_commit(&local)?;

        fs::write(format!("{local}/doc.pdf"), "X")?;
        let error = publish_test(&local, &[PathBuf::from(format!("{local}/doc.pdf"))])
            .err()
            .unwrap();

        assert!(
            matches!(error, GitError::PushFailed { ref remote, .. } if remote == "origin"),
            "{error:?} should be PushFailed"
        );

        // The commit stays in the local history
        let message = cmd!("git", "log", "-1", "--format=%s").dir(&local).read()?;
        assert_eq!("Update document", message);
        assert_eq!(remote_commit, get_remote_commit(&local)?);

        cleanup_repository(&local)?;

        Ok(())
    }

    #[test]
    fn it_should_fail_to_push_on_a_detached_head() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");

        create_repository_with_remote(&local)?;
        cmd!("git", "checkout", "--detach").dir(&local).read()?;

        fs::write(format!("{local}/doc.pdf"), "X")?;
        let error = publish_test(&local, &[PathBuf::from(format!("{local}/doc.pdf"))])
            .err()
            .unwrap();

        assert!(
            matches!(error, GitError::NotOnABranch { ref remote } if remote == "origin"),
            "{error:?} should be NotOnABranch"
        );
        assert_eq!(
            "repository is not on a branch, cannot push to origin",
            error.to_string()
        );

        // The commit stays in the local history
        let message = cmd!("git", "log", "-1", "--format=%s").dir(&local).read()?;
        assert_eq!("Update document", message);

        cleanup_repository(&local)?;

        Ok(())
    }

    #[test]
    fn it_should_save_the_commit_to_the_context() -> Result<(), Box<dyn Error>> {
        let id = get_random_id();
        let local = format!("test_directories/{id}");

        create_repository_without_remote(&local)?;

        fs::write(format!("{local}/doc.pdf"), "X")?;
        let action = GitAction::new(
            PathBuf::from(&local),
            String::from(AUTHOR_NAME),
            String::from(AUTHOR_EMAIL),
            String::from("Update document"),
        );
        let mut context = Context::new(FileEvent::new(
            PathBuf::from("/watch/report.pdf"),
            FileEventKind::Created,
        ));
        context.changed_paths = vec![PathBuf::from(format!("{local}/doc.pdf"))];
        action.run(&mut context)?;

        let commit = context.commit.unwrap();
        assert_eq!(get_last_commit(&local)?, commit.commit_id);
        assert!(!commit.pushed);

        cleanup_repository(&local)?;

        Ok(())
    }
}
