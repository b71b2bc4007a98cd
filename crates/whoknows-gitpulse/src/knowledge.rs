//! Per-author knowledge index built from commit messages.
//!
//! Each author email maps to a corpus: every message they wrote,
//! whitespace-normalized and joined with single spaces in the order the
//! history was read. A separate directory remembers the first display name
//! seen for each email.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::mining::{Commit, CommitSource};

/// Aggregated commit text for one author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorCorpus {
    text: String,
    commits: usize,
}

impl AuthorCorpus {
    /// The joined, normalized commit messages.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of commits that contributed to the corpus.
    pub fn commits(&self) -> usize {
        self.commits
    }

    fn append(&mut self, message: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(message);
        self.commits += 1;
    }
}

/// One row of [`KnowledgeIndex::authors`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    /// Author email.
    pub email: String,
    /// First display name seen, if any.
    pub name: Option<String>,
    /// Commits that contributed text.
    pub commits: usize,
}

/// Searchable corpus of commit text keyed by author email.
///
/// Iteration follows the order in which each author first contributed,
/// which the ranker relies on to order ties.
///
/// # Examples
///
/// ```
/// use whoknows_gitpulse::knowledge::KnowledgeIndex;
/// use whoknows_gitpulse::mining::Commit;
///
/// let index = KnowledgeIndex::from_commits(vec![
///     Commit::new("a@x.com", "Ann", "fix  login\nbug"),
///     Commit::new("a@x.com", "Annie", "add cache"),
/// ]);
/// assert_eq!(index.corpus("a@x.com"), Some("fix login bug add cache"));
/// assert_eq!(index.display_name("a@x.com"), Some("Ann"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct KnowledgeIndex {
    corpora: IndexMap<String, AuthorCorpus>,
    directory: HashMap<String, String>,
}

impl KnowledgeIndex {
    /// Build an index from commits, processed in the order given.
    ///
    /// Commits without both a non-empty author email and a non-empty
    /// message are ignored entirely.
    pub fn from_commits<I>(commits: I) -> Self
    where
        I: IntoIterator<Item = Commit>,
    {
        let mut index = Self::default();
        for commit in commits {
            index.record(&commit);
        }
        index
    }

    fn record(&mut self, commit: &Commit) {
        let Some(email) = commit.author_email.as_deref().filter(|e| !e.is_empty()) else {
            return;
        };
        let Some(message) = commit.message.as_deref() else {
            return;
        };
        let normalized = normalize_message(message);
        if normalized.is_empty() {
            return;
        }

        self.corpora
            .entry(email.to_string())
            .or_default()
            .append(&normalized);

        if let Some(name) = commit.author_name.as_deref().filter(|n| !n.is_empty()) {
            self.directory
                .entry(email.to_string())
                .or_insert_with(|| name.to_string());
        }
    }

    /// The corpus for `email`, if that author contributed anything.
    pub fn corpus(&self, email: &str) -> Option<&str> {
        self.corpora.get(email).map(AuthorCorpus::text)
    }

    /// The first display name recorded for `email`.
    pub fn display_name(&self, email: &str) -> Option<&str> {
        self.directory.get(email).map(String::as_str)
    }

    /// `(email, corpus)` pairs in first-contribution order.
    pub fn corpora(&self) -> impl Iterator<Item = (&str, &str)> {
        self.corpora
            .iter()
            .map(|(email, corpus)| (email.as_str(), corpus.text()))
    }

    /// Every indexed author in first-contribution order.
    pub fn authors(&self) -> Vec<AuthorSummary> {
        self.corpora
            .iter()
            .map(|(email, corpus)| AuthorSummary {
                email: email.clone(),
                name: self.display_name(email).map(str::to_owned),
                commits: corpus.commits(),
            })
            .collect()
    }

    /// Number of authors with a corpus.
    pub fn len(&self) -> usize {
        self.corpora.len()
    }

    /// `true` when no commit contributed.
    pub fn is_empty(&self) -> bool {
        self.corpora.is_empty()
    }
}

/// Trim a message and collapse every internal whitespace run to one space.
///
/// # Examples
///
/// ```
/// use whoknows_gitpulse::knowledge::normalize_message;
///
/// assert_eq!(normalize_message("  fix:\tlogin\n\nbug  "), "fix: login bug");
/// ```
pub fn normalize_message(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read up to `max_commits` from `source` and index them.
///
/// A missing source or a history read failure leaves the index empty;
/// neither is treated as an error.
pub fn build_index<S>(source: Option<&S>, max_commits: usize) -> KnowledgeIndex
where
    S: CommitSource + ?Sized,
{
    let Some(source) = source else {
        tracing::info!("no repository available, knowledge index is empty");
        return KnowledgeIndex::default();
    };

    match source.log(max_commits) {
        Ok(commits) => {
            let fetched = commits.len();
            let index = KnowledgeIndex::from_commits(commits);
            tracing::debug!(fetched, authors = index.len(), "built knowledge index");
            index
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not read commit history, knowledge index is empty");
            KnowledgeIndex::default()
        }
    }
}
