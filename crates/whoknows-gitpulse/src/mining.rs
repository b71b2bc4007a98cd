//! Git history extraction via git2.
//!
//! Reads the most recent commits from a repository, keeping only the
//! author identity and the commit message.

use std::path::{Path, PathBuf};

use git2::{Repository, Sort};
use whoknows_core::{Result, WkaError};

/// A commit as seen by the knowledge index.
///
/// Every field is optional so other sources can omit them. Commits read
/// from git always carry all three; bytes that are not valid UTF-8 (legacy
/// histories with an `encoding` header) are decoded lossily.
///
/// # Examples
///
/// ```
/// use whoknows_gitpulse::mining::Commit;
///
/// let commit = Commit::new("alice@example.com", "Alice", "fix: auth bug");
/// assert_eq!(commit.author_email.as_deref(), Some("alice@example.com"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    /// Author email.
    pub author_email: Option<String>,
    /// Author display name.
    pub author_name: Option<String>,
    /// Full commit message.
    pub message: Option<String>,
}

impl Commit {
    /// Build a commit with every field present.
    pub fn new(
        author_email: impl Into<String>,
        author_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            author_email: Some(author_email.into()),
            author_name: Some(author_name.into()),
            message: Some(message.into()),
        }
    }
}

/// Anything that can hand out recent commit history, newest first.
pub trait CommitSource {
    /// Return up to `max_entries` of the most recent commits.
    ///
    /// # Errors
    ///
    /// Returns [`WkaError`] if the history cannot be read.
    fn log(&self, max_entries: usize) -> Result<Vec<Commit>>;
}

impl CommitSource for Vec<Commit> {
    fn log(&self, max_entries: usize) -> Result<Vec<Commit>> {
        Ok(self.iter().take(max_entries).cloned().collect())
    }
}

/// A git repository located on disk.
///
/// Holds only the path so it can be moved onto a blocking worker; the
/// repository is opened again for each [`CommitSource::log`] call.
#[derive(Debug, Clone)]
pub struct GitRepository {
    path: PathBuf,
    branch: Option<String>,
}

impl GitRepository {
    /// Find the repository containing `path`, searching parent directories.
    ///
    /// Returns `None` when `path` is not inside a git repository.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use whoknows_gitpulse::mining::GitRepository;
    ///
    /// if let Some(repo) = GitRepository::discover(Path::new(".")) {
    ///     println!("found {}", repo.path().display());
    /// }
    /// ```
    pub fn discover(path: &Path) -> Option<Self> {
        match Repository::discover(path) {
            Ok(repo) => Some(Self {
                path: repo.path().to_path_buf(),
                branch: None,
            }),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no git repository found");
                None
            }
        }
    }

    /// Read history from `branch` instead of HEAD.
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    /// Path to the repository's git directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CommitSource for GitRepository {
    fn log(&self, max_entries: usize) -> Result<Vec<Commit>> {
        let repo = Repository::open(&self.path)
            .map_err(|e| WkaError::Git(format!("failed to open repository: {e}")))?;

        // A freshly initialised repository has an unborn HEAD and no history.
        if repo
            .is_empty()
            .map_err(|e| WkaError::Git(format!("failed to inspect repository: {e}")))?
        {
            return Ok(Vec::new());
        }

        let mut revwalk = repo
            .revwalk()
            .map_err(|e| WkaError::Git(format!("failed to create revwalk: {e}")))?;

        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME).ok();

        if let Some(ref branch) = self.branch {
            let reference = repo
                .resolve_reference_from_short_name(branch)
                .map_err(|e| WkaError::Git(format!("failed to resolve branch '{branch}': {e}")))?;
            let oid = reference
                .target()
                .ok_or_else(|| WkaError::Git("branch has no target".into()))?;
            revwalk
                .push(oid)
                .map_err(|e| WkaError::Git(format!("failed to push oid: {e}")))?;
        } else {
            revwalk
                .push_head()
                .map_err(|e| WkaError::Git(format!("failed to push HEAD: {e}")))?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk.take(max_entries) {
            let oid = oid_result.map_err(|e| WkaError::Git(format!("revwalk error: {e}")))?;
            let commit = repo
                .find_commit(oid)
                .map_err(|e| WkaError::Git(format!("failed to find commit: {e}")))?;

            let author = commit.author();
            commits.push(Commit {
                author_email: Some(String::from_utf8_lossy(author.email_bytes()).into_owned()),
                author_name: Some(String::from_utf8_lossy(author.name_bytes()).into_owned()),
                message: Some(String::from_utf8_lossy(commit.message_bytes()).into_owned()),
            });
        }

        tracing::debug!(
            path = %self.path.display(),
            commits = commits.len(),
            "read commit history"
        );
        Ok(commits)
    }
}
