//! Git history knowledge: who has written about what.
//!
//! Reads recent commit history using git2, aggregates each author's commit
//! messages into a searchable corpus, and ranks authors by how often a
//! query term appears in what they wrote.

pub mod knowledge;
pub mod mining;
pub mod ranking;
pub mod service;
