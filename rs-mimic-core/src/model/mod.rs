//! Top-level module for the corpus-mimicking generation system.
//!
//! This module provides the modeling and generation pipeline, including:
//! - Token interning (`TokenIndex`)
//! - The corpus as interned sentences (`CorpusModel`)
//! - Derived continuation maps (`SuccessorIndex`)
//! - Randomized fragment recombination and the statement retry policy
//! - Relevance filtering for topical responses

/// Bidirectional token ↔ dense id mapping.
///
/// Ids are assigned in first-seen order and stay stable for the lifetime
/// of the owning model.
pub mod token_index;

/// The corpus model: sentence table, token index, ranked keywords.
///
/// Supports building from raw statements (chunked across worker threads)
/// and loading from/storing to a binary next to the corpus file.
pub mod corpus_model;

/// Derived unigram/bigram continuation maps over a sentence set.
///
/// Rebuilt fresh for every generation episode; never persisted.
pub mod successor_index;

/// The recombination search: splices sentence fragments at shared token
/// contexts into novel sequences.
///
/// This module only extends `SuccessorIndex` and is not exposed publicly.
mod recombiner;

/// Statement synthesis: validity constraints and the bigram/unigram retry
/// policy on top of recombination.
///
/// Extends `CorpusModel`; not exposed publicly.
mod synthesizer;

/// Relevance-restricted responses: token-overlap filtering and donor-set
/// selection thresholds.
///
/// Extends `CorpusModel`; not exposed publicly.
mod relevance;
