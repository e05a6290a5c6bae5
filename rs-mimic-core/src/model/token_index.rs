use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Dense id assigned to a unique token string, in first-seen order from 0.
pub type TokenId = usize;

/// Bidirectional mapping between token strings and dense ids.
///
/// # Responsibilities
/// - Assign the next sequential id to each token the first time it is seen
/// - Resolve ids back to token strings during reconstruction
///
/// # Invariants
/// - Id assignment is stable for the lifetime of the owning model; no id
///   is ever reused
/// - Every token string maps to exactly one id and vice versa
/// - Ids densely cover `0..len()`
///
/// Lookups are case-sensitive and exact; any normalization happens before
/// tokens reach the index.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TokenIndex {
	/// Id → token string
	tokens: Vec<String>,
	/// Token string → id
	ids: HashMap<String, TokenId>,
}

impl TokenIndex {
	/// Creates an empty index.
	pub fn new() -> Self {
		Self {
			tokens: Vec::new(),
			ids: HashMap::new(),
		}
	}

	/// Returns the id of `token`, assigning the next sequential id if the
	/// token has not been seen before. Always succeeds; index growth is the
	/// only side effect.
	pub fn intern(&mut self, token: &str) -> TokenId {
		if let Some(&id) = self.ids.get(token) {
			return id;
		}
		let id = self.tokens.len();
		self.tokens.push(token.to_owned());
		self.ids.insert(token.to_owned(), id);
		id
	}

	/// Returns the token string for `id`, or `None` if out of range.
	pub fn token(&self, id: TokenId) -> Option<&str> {
		self.tokens.get(id).map(String::as_str)
	}

	/// Returns the id for `token` without interning, or `None` if unseen.
	pub fn get(&self, token: &str) -> Option<TokenId> {
		self.ids.get(token).copied()
	}

	/// Number of distinct tokens seen.
	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	/// Returns `true` if no token has been interned yet.
	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}
