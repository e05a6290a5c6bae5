use std::collections::HashMap;

use super::token_index::TokenId;

/// Position of a sentence in the sentence set it belongs to.
pub type SentenceId = usize;

/// Where a donor sentence goes after a matched token context.
///
/// Replaces the usual sentinel-integer trick: "this occurrence ends the
/// sentence" is a variant, not a magic position, so the "can this context
/// continue" check is a match instead of an equality test.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Continuation {
	/// The donor sentence continues at this token position.
	At(usize),
	/// The context is sentence-final; there is nothing to splice.
	End,
}

/// One continuation entry: which sentence, and where it picks up.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Splice {
	pub sentence: SentenceId,
	pub next: Continuation,
}

/// Token-context width used when looking up continuations.
///
/// Bigram contexts are conservative and closer to the source text; unigram
/// contexts are looser and produce more novel (and more broken) splices.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Granularity {
	Unigram,
	Bigram,
}

/// Derived continuation maps over a fixed sentence set.
///
/// # Responsibilities
/// - Record, for every token occurrence, where each sentence can be
///   resumed after that token (or that the sentence ends there)
/// - Serve those entries by unigram or bigram context during recombination
///
/// # Invariants
/// - Every token occurrence lands in exactly one unigram bucket, and in
///   exactly one bigram bucket (under the start context when the token
///   opens its sentence)
/// - Bucket contents are determined by the sentence set alone; entry order
///   within a bucket carries no meaning (consumers shuffle before use)
///
/// The index borrows its sentence set and is rebuilt fresh for every
/// generation episode; the owning model is the only ground truth.
pub struct SuccessorIndex<'a> {
	sentences: &'a [Vec<TokenId>],
	unigram: HashMap<TokenId, Vec<Splice>>,
	bigram: HashMap<(Option<TokenId>, TokenId), Vec<Splice>>,
}

impl<'a> SuccessorIndex<'a> {
	/// Builds the unigram and bigram maps in one sweep over `sentences`.
	///
	/// For the token at position `j` of sentence `i`, seen after the
	/// context `prev` (`None` at the start of a sentence), both its unigram
	/// bucket and its `(prev, token)` bigram bucket gain `At(j + 1)` — or
	/// `End` when the token closes the sentence.
	pub fn build(sentences: &'a [Vec<TokenId>]) -> Self {
		let mut unigram: HashMap<TokenId, Vec<Splice>> = HashMap::new();
		let mut bigram: HashMap<(Option<TokenId>, TokenId), Vec<Splice>> = HashMap::new();

		for (i, sentence) in sentences.iter().enumerate() {
			let mut prev: Option<TokenId> = None;
			for (j, &token) in sentence.iter().enumerate() {
				let next = if j == sentence.len() - 1 {
					Continuation::End
				} else {
					Continuation::At(j + 1)
				};
				let splice = Splice { sentence: i, next };

				unigram.entry(token).or_default().push(splice);
				bigram.entry((prev, token)).or_default().push(splice);

				prev = Some(token);
			}
		}

		Self {
			sentences,
			unigram,
			bigram,
		}
	}

	/// The sentence set this index was built over.
	pub fn sentences(&self) -> &[Vec<TokenId>] {
		self.sentences
	}

	/// Continuation entries for `current` seen after `prev`, in the
	/// context width selected by `granularity`.
	pub(crate) fn alternatives(
		&self,
		granularity: Granularity,
		prev: TokenId,
		current: TokenId,
	) -> &[Splice] {
		let bucket = match granularity {
			Granularity::Unigram => self.unigram.get(&current),
			Granularity::Bigram => self.bigram.get(&(Some(prev), current)),
		};
		bucket.map(Vec::as_slice).unwrap_or(&[])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn splice(sentence: SentenceId, next: Continuation) -> Splice {
		Splice { sentence, next }
	}

	#[test]
	fn every_adjacent_pair_is_indexed() {
		let sentences = vec![vec![0, 1, 2], vec![1, 2]];
		let index = SuccessorIndex::build(&sentences);

		for (i, sentence) in sentences.iter().enumerate() {
			let mut prev = None;
			for (j, &token) in sentence.iter().enumerate() {
				let expected = if j == sentence.len() - 1 {
					splice(i, Continuation::End)
				} else {
					splice(i, Continuation::At(j + 1))
				};
				assert!(index.unigram[&token].contains(&expected));
				assert!(index.bigram[&(prev, token)].contains(&expected));
				prev = Some(token);
			}
		}
	}

	#[test]
	fn shared_contexts_collect_all_donors() {
		let sentences = vec![vec![0, 1, 2], vec![1, 2]];
		let index = SuccessorIndex::build(&sentences);

		// Token 2 closes both sentences under the same (1, 2) context
		assert_eq!(
			index.bigram[&(Some(1), 2)],
			vec![splice(0, Continuation::End), splice(1, Continuation::End)]
		);
		assert_eq!(
			index.unigram[&1],
			vec![splice(0, Continuation::At(2)), splice(1, Continuation::At(1))]
		);
	}

	#[test]
	fn granularity_selects_the_context_width() {
		// Token 1 follows 0 only in the first sentence, but occurs in both
		let sentences = vec![vec![0, 1], vec![2, 1, 3]];
		let index = SuccessorIndex::build(&sentences);

		assert_eq!(index.alternatives(Granularity::Bigram, 0, 1).len(), 1);
		assert_eq!(index.alternatives(Granularity::Unigram, 0, 1).len(), 2);
	}

	#[test]
	fn sentence_initial_tokens_use_the_start_context() {
		let sentences = vec![vec![0, 1]];
		let index = SuccessorIndex::build(&sentences);

		assert_eq!(index.bigram[&(None, 0)], vec![splice(0, Continuation::At(1))]);
		assert!(!index.bigram.contains_key(&(Some(1), 0)));
	}
}
