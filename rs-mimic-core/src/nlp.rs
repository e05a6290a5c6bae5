use std::collections::HashMap;

use crate::model::token_index::{TokenId, TokenIndex};

/// Sentence-level punctuation. A token made only of these characters is
/// glued to the preceding token on reconstruction.
pub(crate) const PUNCTUATION: &str = ".?!,";

/// Encloser pairs checked for balance before a statement is accepted.
const ENCLOSER_PAIRS: &[(char, char)] = &[
	('*', '*'),
	('"', '"'),
	('(', ')'),
	('[', ']'),
	('`', '`'),
	('\'', '\''),
];

/// Alphabetically sorted English stopword list, binary-searched by
/// `is_stopword` after lower-casing.
static STOPWORDS: &[&str] = &[
	"a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
	"as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
	"by", "can", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
	"further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
	"himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
	"more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
	"or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should",
	"so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
	"there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
	"very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
	"will", "with", "you", "your", "yours", "yourself", "yourselves",
];

/// Cleans up one raw statement before sentence splitting.
///
/// - Decodes HTML entities
/// - Straightens typographic quotes and dashes
/// - Drops carriage returns and non-breaking spaces
pub fn normalize(line: &str) -> String {
	decode_entities(line)
		.chars()
		.filter(|c| *c != '\r')
		.map(|c| match c {
			'\u{201c}' | '\u{201d}' => '"',
			'\u{2018}' | '\u{2019}' => '\'',
			'\u{2013}' | '\u{2014}' => '-',
			'\u{00a0}' => ' ',
			other => other,
		})
		.collect()
}

/// Splits text into sentences.
///
/// A sentence ends at a newline, or at whitespace directly following
/// sentence-ending punctuation (`.`, `?`, `!`). Sentences are trimmed and
/// empty ones dropped.
pub fn sentences(text: &str) -> Vec<String> {
	let mut out = Vec::new();
	let mut current = String::new();
	let mut prev = '\0';

	for c in text.chars() {
		if c == '\n' || (c.is_whitespace() && matches!(prev, '.' | '?' | '!')) {
			push_sentence(&mut out, &mut current);
			prev = '\0';
		} else {
			current.push(c);
			prev = c;
		}
	}
	push_sentence(&mut out, &mut current);

	out
}

fn push_sentence(out: &mut Vec<String>, current: &mut String) {
	let trimmed = current.trim();
	if !trimmed.is_empty() {
		out.push(trimmed.to_owned());
	}
	current.clear();
}

/// Splits a sentence into tokens.
///
/// Tokens are whitespace-separated words; a trailing run of sentence
/// punctuation is split off as its own token so `reconstruct` can restore
/// the original spacing. Interior punctuation (contractions, URLs) is left
/// intact.
pub fn tokenize(text: &str) -> Vec<String> {
	let mut tokens = Vec::new();

	for word in text.split_whitespace() {
		let trailing = word
			.chars()
			.rev()
			.take_while(|c| PUNCTUATION.contains(*c))
			.count();
		let head_chars = word.chars().count() - trailing;

		if trailing == 0 || head_chars == 0 {
			tokens.push(word.to_owned());
		} else {
			// Byte offset of the first trailing punctuation character
			let split = word
				.char_indices()
				.nth(head_chars)
				.map(|(i, _)| i)
				.unwrap_or(word.len());
			tokens.push(word[..split].to_owned());
			tokens.push(word[split..].to_owned());
		}
	}

	tokens
}

/// Case-insensitive stopword lookup.
pub fn is_stopword(token: &str) -> bool {
	let lower = token.to_lowercase();
	STOPWORDS.binary_search(&lower.as_str()).is_ok()
}

/// Ranks corpus words by importance, most important first.
///
/// Importance is plain frequency over lower-cased words, skipping
/// stopwords, words shorter than three characters, and words with no
/// alphabetic character. Ties break lexicographically so the ranking is
/// deterministic for a given corpus.
pub fn rank_keywords<'a, I>(tokens: I) -> Vec<String>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut counts: HashMap<String, usize> = HashMap::new();
	for token in tokens {
		let lower = token.to_lowercase();
		let word = lower.trim_matches(|c: char| !c.is_alphanumeric());
		if word.chars().count() < 3
			|| !word.chars().any(|c| c.is_alphabetic())
			|| is_stopword(word)
		{
			continue;
		}
		*counts.entry(word.to_owned()).or_insert(0) += 1;
	}

	let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
	ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

	ranked.into_iter().map(|(word, _)| word).collect()
}

/// Inverse of `tokenize`: joins tokens with a space, except that
/// punctuation-only tokens attach directly to the preceding token.
///
/// An id with no entry in the index is a build-pipeline defect; it is
/// skipped at runtime and trips an assertion in debug builds.
pub fn reconstruct(ids: &[TokenId], index: &TokenIndex) -> String {
	let mut text = String::new();

	for &id in ids {
		let token = match index.token(id) {
			Some(t) => t,
			None => {
				debug_assert!(false, "token id {id} missing from index");
				continue;
			}
		};
		// No space before a punctuation token; space everywhere else
		if !text.is_empty() && !is_punctuation(token) {
			text.push(' ');
		}
		text.push_str(token);
	}

	text
}

fn is_punctuation(token: &str) -> bool {
	!token.is_empty() && token.chars().all(|c| PUNCTUATION.contains(c))
}

/// True when any encloser pair has a different number of word-adjacent
/// openers and closers.
///
/// An opener is an encloser at a word boundary attached to the text on its
/// right (`"go`), a closer the mirror image (`go"`). Apostrophes inside
/// words (`don't`) match neither pattern.
pub fn unmatched_enclosers(text: &str) -> bool {
	let chars: Vec<char> = text.chars().collect();

	for &(open, close) in ENCLOSER_PAIRS {
		let mut opened: isize = 0;
		for i in 0..chars.len() {
			if chars[i] == open && boundary_before(&chars, i) && attached_after(&chars, i) {
				opened += 1;
			}
			if chars[i] == close && attached_before(&chars, i) && boundary_after(&chars, i) {
				opened -= 1;
			}
		}
		if opened != 0 {
			return true;
		}
	}

	false
}

fn boundary_before(chars: &[char], i: usize) -> bool {
	i == 0 || !(chars[i - 1].is_alphanumeric() || chars[i - 1] == '_')
}

fn attached_after(chars: &[char], i: usize) -> bool {
	i + 1 < chars.len() && !chars[i + 1].is_whitespace()
}

fn attached_before(chars: &[char], i: usize) -> bool {
	i > 0 && !chars[i - 1].is_whitespace()
}

fn boundary_after(chars: &[char], i: usize) -> bool {
	i + 1 >= chars.len() || !(chars[i + 1].is_alphanumeric() || chars[i + 1] == '_')
}

/// Decodes named (`&amp;`) and numeric (`&#39;`, `&#x27;`) HTML entities.
/// Unknown entities are left untouched.
pub fn decode_entities(text: &str) -> String {
	let chars: Vec<char> = text.chars().collect();
	let mut out = String::with_capacity(text.len());
	let mut i = 0;

	while i < chars.len() {
		if chars[i] == '&' {
			// Entities are short; cap the lookahead
			let end = chars[i + 1..].iter().take(10).position(|&c| c == ';');
			if let Some(end) = end {
				let name: String = chars[i + 1..i + 1 + end].iter().collect();
				if let Some(decoded) = decode_entity(&name) {
					out.push(decoded);
					i += end + 2;
					continue;
				}
			}
		}
		out.push(chars[i]);
		i += 1;
	}

	out
}

fn decode_entity(name: &str) -> Option<char> {
	match name {
		"amp" => Some('&'),
		"lt" => Some('<'),
		"gt" => Some('>'),
		"quot" => Some('"'),
		"apos" => Some('\''),
		"nbsp" => Some(' '),
		_ => {
			if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
				u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
			} else if let Some(dec) = name.strip_prefix('#') {
				dec.parse::<u32>().ok().and_then(char::from_u32)
			} else {
				None
			}
		}
	}
}

/// Final encoding pass applied to generated output.
pub fn fix(text: &str) -> String {
	decode_entities(text)
}

/// True when `needle` occurs as a contiguous run inside `haystack`.
pub fn contains_run(haystack: &[TokenId], needle: &[TokenId]) -> bool {
	if needle.is_empty() {
		return true;
	}
	if needle.len() > haystack.len() {
		return false;
	}
	haystack.windows(needle.len()).any(|window| window == needle)
}
