//! Integration test: git history → knowledge index → ranked candidates.

use std::path::Path;

use git2::{Repository, Signature};
use whoknows_core::MatchMode;
use whoknows_gitpulse::mining::GitRepository;
use whoknows_gitpulse::service::{KnowledgeService, QueryOutcome};

fn commit(repo: &Repository, name: &str, email: &str, message: &str) {
    let sig = Signature::now(name, email).unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap();
}

fn ranked(service: &KnowledgeService, query: &str) -> Vec<String> {
    match service.query(query, MatchMode::Literal, 10) {
        QueryOutcome::Ranked(candidates) => candidates.iter().map(ToString::to_string).collect(),
        QueryOutcome::NotReady => panic!("index should be ready"),
    }
}

async fn build_from(path: &Path, max_commits: usize) -> KnowledgeService {
    let service = KnowledgeService::new();
    service
        .build(GitRepository::discover(path), max_commits)
        .await;
    service
}

#[tokio::test]
async fn ranks_authors_from_real_history() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit(&repo, "Ann", "a@x.com", "fix login bug\n\nThe session cookie expired early.");
    commit(&repo, "Bob", "b@x.com", "add cache layer");
    commit(&repo, "Bob", "b@x.com", "Fix cache eviction bug");
    commit(&repo, "Bob", "b@x.com", "cache: another BUG in eviction");

    let service = build_from(dir.path(), 1000).await;

    // Newest first: Bob's commits are read before Ann's.
    assert_eq!(
        ranked(&service, "bug"),
        vec!["Bob <b@x.com> (66%)", "Ann <a@x.com> (33%)"]
    );
    assert_eq!(ranked(&service, "session"), vec!["Ann <a@x.com> (100%)"]);
    assert!(ranked(&service, "database").is_empty());

    let index = service.snapshot().unwrap();
    assert_eq!(
        index.corpus("a@x.com"),
        Some("fix login bug The session cookie expired early.")
    );
    assert_eq!(
        index.corpus("b@x.com"),
        Some("cache: another BUG in eviction Fix cache eviction bug add cache layer")
    );
}

#[tokio::test]
async fn commit_window_limits_history() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit(&repo, "Ann", "a@x.com", "old parser work");
    commit(&repo, "Bob", "b@x.com", "new parser work");

    let service = build_from(dir.path(), 1).await;
    assert_eq!(ranked(&service, "parser"), vec!["Bob <b@x.com> (100%)"]);
}

#[tokio::test]
async fn discovery_from_subdirectory() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit(&repo, "Ann", "a@x.com", "refactor cache refactor cache");
    let nested = dir.path().join("src").join("deep");
    std::fs::create_dir_all(&nested).unwrap();

    let service = build_from(&nested, 1000).await;
    assert_eq!(ranked(&service, "refactor"), vec!["Ann <a@x.com> (100%)"]);
}

#[tokio::test]
async fn no_repository_means_empty_results() {
    let dir = tempfile::tempdir().unwrap();

    let service = build_from(dir.path(), 1000).await;
    assert!(service.is_ready());
    assert!(ranked(&service, "fix").is_empty());
}

#[tokio::test]
async fn empty_repository_means_empty_results() {
    let dir = tempfile::tempdir().unwrap();
    Repository::init(dir.path()).unwrap();

    let service = build_from(dir.path(), 1000).await;
    assert!(ranked(&service, "fix").is_empty());
}
