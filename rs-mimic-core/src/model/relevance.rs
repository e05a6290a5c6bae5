use rand::Rng;

use crate::nlp;

use super::corpus_model::CorpusModel;
use super::synthesizer::RETRY_LIMIT;
use super::token_index::TokenId;

/// Donor-set policy: a relevance-restricted response needs at least this
/// many strongly relevant sentences...
const RELEVANT_THRESHOLD: usize = 3;
/// ...or, failing that, at least this many slightly relevant ones.
const SLIGHTLY_RELEVANT_THRESHOLD: usize = 5;

impl CorpusModel {
	/// Splits `sentences` by topical overlap with `input`.
	///
	/// For every sentence and every lower-cased input token: a sentence
	/// containing a case-insensitive match is appended to
	/// `slightly_relevant`, and also to `relevant` when the matched token
	/// is not a stopword.
	///
	/// # Notes
	/// A sentence matching several input tokens is appended once per
	/// match. The duplication is deliberate weighting: generation seeds
	/// uniformly over the donor list, so sentences with more overlap are
	/// proportionally more likely to seed a response.
	pub fn find_relevant(
		&self,
		sentences: &[Vec<TokenId>],
		input: &str,
	) -> (Vec<Vec<TokenId>>, Vec<Vec<TokenId>>) {
		let tokens: Vec<String> = nlp::tokenize(input)
			.iter()
			.map(|token| token.to_lowercase())
			.collect();

		let mut relevant = Vec::new();
		let mut slightly_relevant = Vec::new();

		for sentence in sentences {
			for token in &tokens {
				let matched = sentence.iter().any(|&id| {
					self.token_index()
						.token(id)
						.is_some_and(|t| t.to_lowercase() == *token)
				});
				if matched {
					if !nlp::is_stopword(token) {
						relevant.push(sentence.clone());
					}
					slightly_relevant.push(sentence.clone());
				}
			}
		}

		(relevant, slightly_relevant)
	}

	/// Donor set for responding to `input`, or `None` when the corpus does
	/// not cover the input well enough and generation should fall back to
	/// the whole corpus.
	pub fn select_donors(
		&self,
		sentences: &[Vec<TokenId>],
		input: &str,
	) -> Option<Vec<Vec<TokenId>>> {
		let (relevant, slightly_relevant) = self.find_relevant(sentences, input);
		if relevant.len() >= RELEVANT_THRESHOLD {
			Some(relevant)
		} else if slightly_relevant.len() >= SLIGHTLY_RELEVANT_THRESHOLD {
			Some(slightly_relevant)
		} else {
			None
		}
	}

	/// Generates a statement relevant to `input`, at most
	/// `character_limit` characters.
	pub fn make_response(&self, input: &str, character_limit: usize) -> Result<String, String> {
		self.make_response_with(&mut rand::rng(), input, character_limit)
	}

	/// Same as `make_response` with a caller-supplied randomness source.
	pub fn make_response_with<R: Rng>(
		&self,
		rng: &mut R,
		input: &str,
		character_limit: usize,
	) -> Result<String, String> {
		self.make_response_from(rng, input, character_limit, self.sentences())
	}

	/// Responds drawing only from `sentences` (relevance-filtered), or
	/// from the whole corpus when the filter comes up short.
	pub fn make_response_from<R: Rng>(
		&self,
		rng: &mut R,
		input: &str,
		character_limit: usize,
		sentences: &[Vec<TokenId>],
	) -> Result<String, String> {
		match self.select_donors(sentences, input) {
			Some(donors) => {
				self.make_statement_from(rng, character_limit, Some(&donors), RETRY_LIMIT)
			}
			None => self.make_statement_from(rng, character_limit, None, RETRY_LIMIT),
		}
	}
}
