use rand::Rng;
use rand::seq::SliceRandom;

use crate::nlp;

use super::successor_index::{Continuation, Granularity, SentenceId, Splice, SuccessorIndex};
use super::token_index::TokenId;

/// Per-call bookkeeping for one recombination episode.
///
/// Tracks the candidate sequence, the donor sentences already spliced in
/// (`used`, so no donor contributes twice), and every full sequence the
/// candidate has been compared against (`verbatim`, for the containment
/// check). Discarded when `generate` returns.
struct Draft {
	candidate: Vec<TokenId>,
	used: Vec<SentenceId>,
	verbatim: Vec<Vec<TokenId>>,
}

impl Draft {
	fn seeded(seed: SentenceId, sentence: &[TokenId]) -> Self {
		Self {
			candidate: sentence.to_vec(),
			used: vec![seed],
			verbatim: vec![sentence.to_vec()],
		}
	}
}

impl SuccessorIndex<'_> {
	/// Synthesizes a new token sequence by splicing fragments of the
	/// indexed sentences together.
	///
	/// # Behavior
	/// - Seeds the candidate with a uniformly random sentence
	/// - Runs up to `passes` improvement passes; each pass tries to replace
	///   the candidate's tail with the tail of another sentence sharing a
	///   token context, visiting splice sites and their alternatives in
	///   random order
	/// - A splice is rejected when the result would contain, or be
	///   contained in, any sequence already seen this episode — that would
	///   just rebuild a fragment of the source text
	/// - Stops early as soon as a pass finds nothing acceptable: the
	///   candidate is unchanged, so further passes cannot make progress
	///
	/// # Errors
	/// Returns an error if the index was built over an empty sentence set.
	///
	/// # Notes
	/// - Donor sentences never contribute twice to one candidate
	/// - `granularity` trades novelty against fidelity, see `Granularity`
	pub fn generate<R: Rng>(
		&self,
		rng: &mut R,
		passes: usize,
		granularity: Granularity,
	) -> Result<Vec<TokenId>, String> {
		if self.sentences().is_empty() {
			return Err("No sentences available for generation".to_owned());
		}

		let seed = rng.random_range(0..self.sentences().len());
		let mut draft = Draft::seeded(seed, &self.sentences()[seed]);

		for _ in 0..passes {
			if !self.improve(rng, granularity, &mut draft) {
				break;
			}
		}

		Ok(draft.candidate)
	}

	/// One improvement pass. Returns `false` when no acceptable splice
	/// exists, leaving the draft untouched.
	fn improve<R: Rng>(&self, rng: &mut R, granularity: Granularity, draft: &mut Draft) -> bool {
		// Collect, per adjacent pair of the candidate, the alternatives
		// that survive filtering: sentence ends are not splice points, and
		// used donors are out
		let mut sites: Vec<(usize, Vec<Splice>)> = Vec::new();
		for k in 0..draft.candidate.len().saturating_sub(1) {
			let (prev, current) = (draft.candidate[k], draft.candidate[k + 1]);
			let alternatives: Vec<Splice> = self
				.alternatives(granularity, prev, current)
				.iter()
				.filter(|splice| {
					matches!(splice.next, Continuation::At(_))
						&& !draft.used.contains(&splice.sentence)
				})
				.copied()
				.collect();
			if !alternatives.is_empty() {
				sites.push((k, alternatives));
			}
		}
		if sites.is_empty() {
			return false;
		}

		sites.shuffle(rng);
		for (site, mut alternatives) in sites {
			alternatives.shuffle(rng);
			for splice in alternatives {
				let Continuation::At(position) = splice.next else {
					continue;
				};
				let donor = &self.sentences()[splice.sentence];

				// Keep the candidate up to and including the matched pair,
				// then continue with the donor's tail
				let mut potential = draft.candidate[..=site + 1].to_vec();
				potential.extend_from_slice(&donor[position..]);

				let rebuilds_source = draft.verbatim.iter().any(|seen| {
					nlp::contains_run(seen, &potential) || nlp::contains_run(&potential, seen)
				});
				if !rebuilds_source {
					draft.used.push(splice.sentence);
					draft.verbatim.push(donor.clone());
					draft.candidate = potential;
					return true;
				}
			}
		}

		false
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;

	// the=0 cat=1 sat=2 on=3 mat=4 dog=5 log=6 bird=7 hat=8
	fn corpus() -> Vec<Vec<TokenId>> {
		vec![
			vec![0, 1, 2, 3, 0, 4],
			vec![0, 5, 2, 3, 0, 6],
			vec![0, 7, 2, 3, 0, 8],
		]
	}

	#[test]
	fn empty_sentence_set_is_an_error() {
		let sentences: Vec<Vec<TokenId>> = Vec::new();
		let index = SuccessorIndex::build(&sentences);
		let mut rng = StdRng::seed_from_u64(1);
		assert!(index.generate(&mut rng, 3, Granularity::Bigram).is_err());
	}

	#[test]
	fn single_sentence_cannot_improve() {
		let sentences = vec![vec![0, 1, 2, 3, 0, 4]];
		let index = SuccessorIndex::build(&sentences);

		// Every continuation points back at the seed sentence, so the very
		// first pass finds no donors and later passes are no-ops
		let mut one = StdRng::seed_from_u64(99);
		let mut ten = StdRng::seed_from_u64(99);
		let short = index.generate(&mut one, 1, Granularity::Bigram).unwrap();
		let long = index.generate(&mut ten, 10, Granularity::Bigram).unwrap();

		assert_eq!(short, sentences[0]);
		assert_eq!(short, long);
	}

	#[test]
	fn exhausted_drafts_stay_unchanged() {
		let sentences = corpus();
		let index = SuccessorIndex::build(&sentences);
		let mut rng = StdRng::seed_from_u64(5);

		let mut draft = Draft::seeded(0, &sentences[0]);
		while index.improve(&mut rng, Granularity::Bigram, &mut draft) {}

		let settled = draft.candidate.clone();
		for _ in 0..10 {
			assert!(!index.improve(&mut rng, Granularity::Bigram, &mut draft));
		}
		assert_eq!(draft.candidate, settled);
	}

	#[test]
	fn donors_are_never_reused() {
		let sentences = corpus();
		let index = SuccessorIndex::build(&sentences);

		for seed in 0..50u64 {
			let mut rng = StdRng::seed_from_u64(seed);
			let start = rng.random_range(0..sentences.len());
			let mut draft = Draft::seeded(start, &sentences[start]);
			while index.improve(&mut rng, Granularity::Bigram, &mut draft) {}

			let mut donors = draft.used.clone();
			donors.sort_unstable();
			donors.dedup();
			assert_eq!(donors.len(), draft.used.len());
		}
	}

	#[test]
	fn splices_cross_sentences_without_copying_one() {
		let sentences = corpus();
		let index = SuccessorIndex::build(&sentences);

		for seed in 0..20u64 {
			let mut rng = StdRng::seed_from_u64(seed);
			let result = index.generate(&mut rng, 3, Granularity::Bigram).unwrap();

			// Shared "sat on the" contexts guarantee at least one splice,
			// and the containment check forbids reproducing any source
			assert!(!sentences.contains(&result));
			assert!(result.len() >= 2);
		}
	}
}
