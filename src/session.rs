//! Interactive "ask, then pick" session.
//!
//! The terminal side is behind [`Prompter`] so the flow can be driven by a
//! script in tests: prompt for a query, rank, offer the labels, report the
//! pick.

use std::io::IsTerminal;

use dialoguer::{Input, Select};
use whoknows_core::{MatchMode, Result, WkaError};
use whoknows_gitpulse::service::{KnowledgeService, QueryOutcome};

/// Terminal interactions needed by a session.
pub trait Prompter {
    /// Ask for a query. `None` means the user backed out.
    fn ask_query(&mut self) -> Result<Option<String>>;

    /// Offer `labels` and return the index picked, or `None` on cancel.
    fn choose(&mut self, query: &str, labels: &[String]) -> Result<Option<usize>>;

    /// Show a status line that needs no answer.
    fn notify(&mut self, message: &str);
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// No query was entered.
    NoQuery,
    /// Nobody matched; nothing was shown.
    NoCandidates,
    /// Candidates were shown and the user dismissed the list.
    Dismissed,
    /// The user picked a candidate.
    Chosen {
        /// The trimmed query.
        query: String,
        /// Label of the picked candidate.
        label: String,
    },
}

impl SessionOutcome {
    /// Confirmation line for a pick.
    pub fn confirmation(&self) -> Option<String> {
        match self {
            SessionOutcome::Chosen { query, label } => {
                Some(format!("Asked about \"{query}\": {label}"))
            }
            _ => None,
        }
    }
}

/// Run one query against `service`, waiting for the index if needed.
pub async fn run_session<P: Prompter>(
    service: &KnowledgeService,
    prompter: &mut P,
    mode: MatchMode,
    top_n: usize,
) -> Result<SessionOutcome> {
    let Some(raw) = prompter.ask_query()? else {
        return Ok(SessionOutcome::NoQuery);
    };
    let query = raw.trim().to_string();
    if query.is_empty() {
        return Ok(SessionOutcome::NoQuery);
    }

    let candidates = match service.query(&query, mode, top_n) {
        QueryOutcome::Ranked(candidates) => candidates,
        QueryOutcome::NotReady => {
            prompter.notify("Still reading commit history...");
            service.wait_ready().await;
            match service.query(&query, mode, top_n) {
                QueryOutcome::Ranked(candidates) => candidates,
                QueryOutcome::NotReady => Vec::new(),
            }
        }
    };

    if candidates.is_empty() {
        return Ok(SessionOutcome::NoCandidates);
    }

    let labels: Vec<String> = candidates.iter().map(ToString::to_string).collect();
    match prompter.choose(&query, &labels)? {
        Some(i) if i < labels.len() => Ok(SessionOutcome::Chosen {
            query,
            label: labels[i].clone(),
        }),
        _ => Ok(SessionOutcome::Dismissed),
    }
}

/// [`Prompter`] backed by dialoguer on the controlling terminal.
pub struct TerminalPrompter;

impl TerminalPrompter {
    /// `true` if stdin and stderr are both terminals.
    pub fn available() -> bool {
        std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
    }
}

impl Prompter for TerminalPrompter {
    fn ask_query(&mut self) -> Result<Option<String>> {
        let input: String = tokio::task::block_in_place(|| {
            Input::<String>::new()
                .with_prompt("Who knows about")
                .allow_empty(true)
                .interact_text()
        })
        .map_err(|e| WkaError::Prompt(e.to_string()))?;
        Ok(Some(input))
    }

    fn choose(&mut self, query: &str, labels: &[String]) -> Result<Option<usize>> {
        tokio::task::block_in_place(|| {
            Select::new()
                .with_prompt(format!("People who know about \"{query}\""))
                .items(labels)
                .default(0)
                .interact_opt()
        })
        .map_err(|e| WkaError::Prompt(e.to_string()))
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whoknows_gitpulse::mining::Commit;

    #[derive(Default)]
    struct ScriptedPrompter {
        query: Option<String>,
        pick: Option<usize>,
        offered: Vec<String>,
        notices: Vec<String>,
    }

    impl Prompter for ScriptedPrompter {
        fn ask_query(&mut self) -> Result<Option<String>> {
            Ok(self.query.clone())
        }

        fn choose(&mut self, _query: &str, labels: &[String]) -> Result<Option<usize>> {
            self.offered = labels.to_vec();
            Ok(self.pick)
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    async fn ready_service() -> KnowledgeService {
        let service = KnowledgeService::new();
        service
            .build(
                Some(vec![
                    Commit::new("a@x.com", "Ann", "fix login bug"),
                    Commit::new("b@x.com", "Bob", "fix login bug again"),
                ]),
                1000,
            )
            .await;
        service
    }

    #[tokio::test]
    async fn pick_is_confirmed_with_query_and_label() {
        let service = ready_service().await;
        let mut prompter = ScriptedPrompter {
            query: Some("  bug ".into()),
            pick: Some(1),
            ..ScriptedPrompter::default()
        };

        let outcome = run_session(&service, &mut prompter, MatchMode::Literal, 10)
            .await
            .unwrap();

        assert_eq!(
            prompter.offered,
            vec!["Ann <a@x.com> (50%)", "Bob <b@x.com> (50%)"]
        );
        assert_eq!(
            outcome.confirmation().as_deref(),
            Some("Asked about \"bug\": Bob <b@x.com> (50%)")
        );
    }

    #[tokio::test]
    async fn blank_query_shows_nothing() {
        let service = ready_service().await;
        let mut prompter = ScriptedPrompter {
            query: Some("   ".into()),
            ..ScriptedPrompter::default()
        };

        let outcome = run_session(&service, &mut prompter, MatchMode::Literal, 10)
            .await
            .unwrap();
        assert_eq!(outcome, SessionOutcome::NoQuery);
        assert!(prompter.offered.is_empty());
    }

    #[tokio::test]
    async fn unmatched_query_shows_nothing() {
        let service = ready_service().await;
        let mut prompter = ScriptedPrompter {
            query: Some("database".into()),
            pick: Some(0),
            ..ScriptedPrompter::default()
        };

        let outcome = run_session(&service, &mut prompter, MatchMode::Literal, 10)
            .await
            .unwrap();
        assert_eq!(outcome, SessionOutcome::NoCandidates);
        assert!(prompter.offered.is_empty());
        assert!(outcome.confirmation().is_none());
    }

    #[tokio::test]
    async fn dismissing_the_list_is_not_a_pick() {
        let service = ready_service().await;
        let mut prompter = ScriptedPrompter {
            query: Some("login".into()),
            pick: None,
            ..ScriptedPrompter::default()
        };

        let outcome = run_session(&service, &mut prompter, MatchMode::Literal, 10)
            .await
            .unwrap();
        assert_eq!(outcome, SessionOutcome::Dismissed);
    }

    #[tokio::test]
    async fn query_waits_for_a_pending_build() {
        let service = std::sync::Arc::new(KnowledgeService::new());
        let mut prompter = ScriptedPrompter {
            query: Some("cache".into()),
            pick: Some(0),
            ..ScriptedPrompter::default()
        };

        let builder = std::sync::Arc::clone(&service);
        let session = async {
            run_session(&service, &mut prompter, MatchMode::Literal, 10).await
        };
        let build = async move {
            builder
                .build(Some(vec![Commit::new("a@x.com", "Ann", "cache")]), 1000)
                .await;
        };
        let (outcome, ()) = tokio::join!(session, build);

        assert_eq!(
            outcome.unwrap().confirmation().as_deref(),
            Some("Asked about \"cache\": Ann <a@x.com> (100%)")
        );
        assert_eq!(prompter.notices, vec!["Still reading commit history..."]);
    }
}
