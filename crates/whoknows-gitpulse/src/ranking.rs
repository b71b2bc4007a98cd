//! Query ranking over the knowledge index.
//!
//! Scores each author by how many times the query occurs in their corpus,
//! keeps the top scorers, and expresses each score as a share of the
//! matches among them.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use whoknows_core::{MatchMode, Result, WkaError};

use crate::knowledge::KnowledgeIndex;

/// An author proposed as knowing about a query.
///
/// Displays as `"<name> <<email>> (<percentage>%)"`.
///
/// # Examples
///
/// ```
/// use whoknows_gitpulse::ranking::RankedCandidate;
///
/// let candidate = RankedCandidate {
///     email: "a@x.com".into(),
///     name: "Ann".into(),
///     count: 2,
///     percentage: 100,
/// };
/// assert_eq!(candidate.to_string(), "Ann <a@x.com> (100%)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    /// Author email.
    pub email: String,
    /// Author display name.
    pub name: String,
    /// Occurrences of the query in the author's corpus.
    pub count: usize,
    /// `floor(100 * count / total)` over the ranked set.
    pub percentage: u32,
}

impl fmt::Display for RankedCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> ({}%)", self.name, self.email, self.percentage)
    }
}

/// Compile `query` into a case-insensitive pattern.
///
/// In [`MatchMode::Literal`] every metacharacter is escaped, so `fix(`
/// matches the text `fix(`.
///
/// # Errors
///
/// Returns [`WkaError::Pattern`] if a [`MatchMode::Regex`] query is not a
/// valid regular expression.
///
/// # Examples
///
/// ```
/// use whoknows_core::MatchMode;
/// use whoknows_gitpulse::ranking::compile_query;
///
/// let pattern = compile_query("fix(", MatchMode::Literal).unwrap();
/// assert!(pattern.is_match("FIX(parser)"));
/// assert!(compile_query("fix(", MatchMode::Regex).is_err());
/// ```
pub fn compile_query(query: &str, mode: MatchMode) -> Result<Regex> {
    let pattern = match mode {
        MatchMode::Literal => regex::escape(query),
        MatchMode::Regex => query.to_string(),
    };
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| WkaError::Pattern(e.to_string()))
}

/// Rank authors by occurrences of `query`, keeping at most `top_n`.
///
/// Leading and trailing whitespace is ignored; an empty query or one that
/// fails to compile yields no candidates.
///
/// # Examples
///
/// ```
/// use whoknows_core::MatchMode;
/// use whoknows_gitpulse::knowledge::KnowledgeIndex;
/// use whoknows_gitpulse::mining::Commit;
/// use whoknows_gitpulse::ranking::rank;
///
/// let index = KnowledgeIndex::from_commits(vec![
///     Commit::new("a@x.com", "Ann", "refactor cache refactor cache"),
/// ]);
/// let ranked = rank("refactor", MatchMode::Literal, &index, 10);
/// assert_eq!(ranked[0].count, 2);
/// assert_eq!(ranked[0].to_string(), "Ann <a@x.com> (100%)");
/// ```
pub fn rank(
    query: &str,
    mode: MatchMode,
    index: &KnowledgeIndex,
    top_n: usize,
) -> Vec<RankedCandidate> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    match compile_query(query, mode) {
        Ok(pattern) => rank_pattern(&pattern, index, top_n),
        Err(e) => {
            tracing::warn!(query, error = %e, "query is not a valid pattern, no candidates");
            Vec::new()
        }
    }
}

/// Rank authors by non-overlapping matches of `pattern`.
///
/// Ties keep the index's first-contribution order. Percentages are computed
/// over the truncated set before authors without a known display name are
/// dropped, so they may sum to less than 100.
pub fn rank_pattern(pattern: &Regex, index: &KnowledgeIndex, top_n: usize) -> Vec<RankedCandidate> {
    let mut scored: Vec<(&str, usize)> = index
        .corpora()
        .map(|(email, corpus)| (email, pattern.find_iter(corpus).count()))
        .filter(|(_, count)| *count > 0)
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(top_n);

    let total: usize = scored.iter().map(|(_, count)| count).sum();

    scored
        .into_iter()
        .filter_map(|(email, count)| {
            let name = index.display_name(email)?;
            Some(RankedCandidate {
                email: email.to_string(),
                name: name.to_string(),
                count,
                percentage: (count * 100 / total) as u32,
            })
        })
        .collect()
}
