//! Owner of the knowledge index and its readiness state.
//!
//! The index is built off to the side and swapped in whole, so queries see
//! either the previous index or the finished one. Until the first build
//! completes, queries report [`QueryOutcome::NotReady`].

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use whoknows_core::MatchMode;

use crate::knowledge::{build_index, KnowledgeIndex};
use crate::mining::CommitSource;
use crate::ranking::{rank, RankedCandidate};

/// Result of asking the service a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The first index build has not finished yet.
    NotReady,
    /// Ranked candidates, possibly empty.
    Ranked(Vec<RankedCandidate>),
}

/// Holds the current knowledge index and signals when it is built.
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use whoknows_core::MatchMode;
/// use whoknows_gitpulse::mining::Commit;
/// use whoknows_gitpulse::service::{KnowledgeService, QueryOutcome};
///
/// let service = KnowledgeService::new();
/// assert_eq!(service.query("bug", MatchMode::Literal, 10), QueryOutcome::NotReady);
///
/// let commits = vec![Commit::new("a@x.com", "Ann", "fix login bug")];
/// service.build(Some(commits), 1000).await;
///
/// let QueryOutcome::Ranked(ranked) = service.query("bug", MatchMode::Literal, 10) else {
///     panic!("index should be ready");
/// };
/// assert_eq!(ranked[0].to_string(), "Ann <a@x.com> (100%)");
/// # }
/// ```
#[derive(Debug)]
pub struct KnowledgeService {
    index: RwLock<Arc<KnowledgeIndex>>,
    ready: watch::Sender<bool>,
}

impl Default for KnowledgeService {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeService {
    /// Create a service with an empty, not-yet-ready index.
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            index: RwLock::new(Arc::new(KnowledgeIndex::default())),
            ready,
        }
    }

    /// `true` once a build has completed.
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Wait until a build has completed.
    pub async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// The current index, or `None` before the first build completes.
    pub fn snapshot(&self) -> Option<Arc<KnowledgeIndex>> {
        if !self.is_ready() {
            return None;
        }
        let guard = self.index.read().unwrap_or_else(PoisonError::into_inner);
        Some(Arc::clone(&*guard))
    }

    /// Replace the index and mark the service ready.
    pub fn install(&self, index: KnowledgeIndex) {
        {
            let mut guard = self.index.write().unwrap_or_else(PoisonError::into_inner);
            *guard = Arc::new(index);
        }
        self.ready.send_replace(true);
    }

    /// Read history from `source` on a blocking worker and install the
    /// resulting index.
    ///
    /// A missing source, an unreadable history, or a failed worker all
    /// install an empty index.
    pub async fn build<S>(&self, source: Option<S>, max_commits: usize) -> Arc<KnowledgeIndex>
    where
        S: CommitSource + Send + 'static,
    {
        let built = tokio::task::spawn_blocking(move || build_index(source.as_ref(), max_commits))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "index build worker failed, knowledge index is empty");
                KnowledgeIndex::default()
            });

        tracing::info!(authors = built.len(), "knowledge index ready");
        self.install(built);
        self.snapshot().unwrap_or_default()
    }

    /// Start [`KnowledgeService::build`] in the background.
    pub fn spawn_build<S>(self: &Arc<Self>, source: Option<S>, max_commits: usize) -> JoinHandle<()>
    where
        S: CommitSource + Send + 'static,
    {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.build(source, max_commits).await;
        })
    }

    /// Rank authors for `query` against the current index.
    pub fn query(&self, query: &str, mode: MatchMode, top_n: usize) -> QueryOutcome {
        match self.snapshot() {
            Some(index) => QueryOutcome::Ranked(rank(query, mode, &index, top_n)),
            None => QueryOutcome::NotReady,
        }
    }
}
