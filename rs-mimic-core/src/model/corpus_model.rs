use std::path::Path;
use std::sync::mpsc;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::io::get_filename;
use crate::{ingest, nlp, store};

use super::token_index::{TokenId, TokenIndex};

/// Maximum number of ranked keywords kept on a model.
const KEYWORD_LIMIT: usize = 200;

/// A corpus of short statements, modeled as interned token sequences.
///
/// This is the ground truth every derived structure is rebuilt from. It
/// manages:
/// - `index`: the token ↔ id mapping (owned exclusively, never shared)
/// - `sentences`: the corpus as ordered id sequences; a sentence's
///   position is its identity
/// - `keywords`: up to 200 corpus keywords, most important first
/// - `name`: the persistence key (see `store`)
///
/// # Invariants
/// - Every id appearing in a sentence resolves in `index`
/// - Sentences are never empty
/// - The model is effectively read-only once built; generation never
///   mutates it
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CorpusModel {
	name: String,
	index: TokenIndex,
	sentences: Vec<Vec<TokenId>>,
	keywords: Vec<String>,
}

impl CorpusModel {
	/// Creates an empty model with the given persistence name.
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_owned(),
			index: TokenIndex::new(),
			sentences: Vec::new(),
			keywords: Vec::new(),
		}
	}

	/// Builds a model from raw statement strings.
	///
	/// # Behavior
	/// - Normalizes every statement, then splits and tokenizes them in
	///   fixed chunks across worker threads
	/// - Interns tokens serially afterwards, so id assignment stays in
	///   first-seen order no matter how threads are scheduled
	/// - Drops statements that tokenize to nothing
	/// - Ranks corpus keywords and keeps the top 200
	pub fn consume<I>(name: &str, statements: I) -> Self
	where
		I: IntoIterator<Item = String>,
	{
		let statements: Vec<String> = statements.into_iter().collect();
		let tokenized = Self::tokenize_statements(&statements);

		let mut model = Self::new(name);
		for sentence in &tokenized {
			let ids: Vec<TokenId> = sentence.iter().map(|token| model.index.intern(token)).collect();
			if !ids.is_empty() {
				model.sentences.push(ids);
			}
		}

		let mut keywords = nlp::rank_keywords(tokenized.iter().flatten().map(String::as_str));
		keywords.truncate(KEYWORD_LIMIT);
		model.keywords = keywords;

		model
	}

	/// Normalizes, sentence-splits and tokenizes statements in parallel.
	///
	/// Chunks are index-tagged and reassembled in order before returning,
	/// so the output (and with it token id assignment) is deterministic.
	fn tokenize_statements(statements: &[String]) -> Vec<Vec<String>> {
		if statements.is_empty() {
			return Vec::new();
		}

		let chunks = num_cpus::get() * 8;
		let chunk_size = (statements.len() + chunks - 1) / chunks;

		let (tx, rx) = mpsc::channel();
		for (chunk_index, chunk) in statements.chunks(chunk_size).enumerate() {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();

			thread::spawn(move || {
				let mut tokenized: Vec<Vec<String>> = Vec::new();
				for statement in &chunk {
					for sentence in nlp::sentences(&nlp::normalize(statement)) {
						tokenized.push(nlp::tokenize(&sentence));
					}
				}
				tx.send((chunk_index, tokenized)).expect("Failed to send from thread");
			});
		}
		drop(tx);

		let mut parts: Vec<(usize, Vec<Vec<String>>)> = rx.iter().collect();
		parts.sort_by_key(|(chunk_index, _)| *chunk_index);

		parts.into_iter().flat_map(|(_, tokenized)| tokenized).collect()
	}

	/// Loads a model from a corpus file if a binary exists, otherwise
	/// ingests the file, builds the model and serializes it for future
	/// fast loading.
	///
	/// The model name is the file stem (`data/alice.txt` → `"alice"`); the
	/// binary lands next to the corpus file.
	///
	/// # Errors
	/// Returns an error if the file cannot be read or parsed, or if the
	/// binary cannot be written. A failed call never corrupts a previously
	/// stored model.
	pub fn from_corpus_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
		let name = get_filename(&path)?;
		let dir = path.as_ref().parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

		if store::model_path(&dir, &name).exists() {
			return store::load(&dir, &name);
		}

		let statements = ingest::load_statements(&path)?;
		let model = Self::consume(&name, statements);
		store::save(&model, &dir)?;
		Ok(model)
	}

	/// The model's persistence name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The token ↔ id mapping.
	pub fn token_index(&self) -> &TokenIndex {
		&self.index
	}

	/// The corpus as id sequences, in ingestion order.
	pub fn sentences(&self) -> &[Vec<TokenId>] {
		&self.sentences
	}

	/// Ranked keywords, most important first (at most 200).
	pub fn keywords(&self) -> &[String] {
		&self.keywords
	}

	/// Number of ingested sentences.
	pub fn sentence_count(&self) -> usize {
		self.sentences.len()
	}

	/// Number of distinct tokens.
	pub fn token_count(&self) -> usize {
		self.index.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn consume_interns_in_first_seen_order() {
		let statements = vec!["b a".to_owned(), "a c".to_owned()];
		let model = CorpusModel::consume("test", statements);

		assert_eq!(model.sentences(), &[vec![0, 1], vec![1, 2]]);
		assert_eq!(model.token_index().token(0), Some("b"));
		assert_eq!(model.token_index().token(1), Some("a"));
		assert_eq!(model.token_index().token(2), Some("c"));
	}

	#[test]
	fn consume_splits_statements_into_sentences() {
		let statements = vec!["First here. Second there!".to_owned()];
		let model = CorpusModel::consume("test", statements);

		assert_eq!(model.sentence_count(), 2);
		// Trailing punctuation is its own token
		assert_eq!(
			model.sentences()[0].len(),
			3,
			"expected [First, here, .]"
		);
	}

	#[test]
	fn consume_drops_empty_statements() {
		let statements = vec!["   ".to_owned(), "one word".to_owned(), "".to_owned()];
		let model = CorpusModel::consume("test", statements);
		assert_eq!(model.sentence_count(), 1);
	}

	#[test]
	fn consume_is_deterministic_across_runs() {
		let statements: Vec<String> = (0..500)
			.map(|i| format!("word{} filler{} tail{}", i % 7, i % 13, i))
			.collect();
		let first = CorpusModel::consume("test", statements.clone());
		let second = CorpusModel::consume("test", statements);

		assert_eq!(first.sentences(), second.sentences());
		assert_eq!(first.keywords(), second.keywords());
	}

	#[test]
	fn keywords_are_capped_and_ranked() {
		let statements: Vec<String> = (0..250).map(|i| format!("kw{i:03}")).collect();
		let model = CorpusModel::consume("test", statements);

		assert_eq!(model.keywords().len(), 200);
		// All frequencies tie, so order is lexicographic
		assert_eq!(model.keywords()[0], "kw000");
		assert_eq!(model.keywords()[199], "kw199");
	}

	#[test]
	fn model_round_trips_through_postcard() {
		let statements = vec!["the cat sat on the mat.".to_owned(), "the dog slept".to_owned()];
		let model = CorpusModel::consume("roundtrip", statements);

		let bytes = postcard::to_stdvec(&model).unwrap();
		let restored: CorpusModel = postcard::from_bytes(&bytes).unwrap();

		assert_eq!(restored.name(), model.name());
		assert_eq!(restored.sentences(), model.sentences());
		assert_eq!(restored.keywords(), model.keywords());
		assert_eq!(restored.token_count(), model.token_count());
		for id in 0..model.token_count() {
			assert_eq!(restored.token_index().token(id), model.token_index().token(id));
		}
	}
}
