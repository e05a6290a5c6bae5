use std::error::Error;
use std::path::Path;

use serde_json::Value;

use crate::io::read_file;
use crate::nlp;

/// Loads raw statement strings from a corpus file.
///
/// Dispatches on the file extension: `csv` and `json` get format-specific
/// parsers, anything else is treated as plain text. Whatever the source
/// format, the result is a flat ordered list of statements ready for
/// `CorpusModel::consume`.
///
/// # Errors
/// Returns an error for unreadable files or unparseable structured
/// content. Such failures are fatal to this call only; they never touch a
/// previously built model.
pub fn load_statements<P: AsRef<Path>>(path: P) -> Result<Vec<String>, Box<dyn Error>> {
	let content = read_file(&path)?;
	match path.as_ref().extension().and_then(|e| e.to_str()) {
		Some("json") => parse_json(&content),
		Some("csv") => parse_csv(&content),
		_ => Ok(parse_text(&content)),
	}
}

/// One statement per line; blank lines and `#` comment lines are skipped.
fn parse_text(content: &str) -> Vec<String> {
	content
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty() && !line.starts_with('#'))
		.map(str::to_owned)
		.collect()
}

/// Rows of the `text` column.
///
/// Minimal quoted-CSV reader: fields may be wrapped in double quotes with
/// `""` as the escape; fields do not span lines.
fn parse_csv(content: &str) -> Result<Vec<String>, Box<dyn Error>> {
	let mut rows = content.lines();
	let header = rows.next().ok_or("CSV corpus is empty")?;
	let text_column = split_csv_row(header)
		.iter()
		.position(|column| column.trim().eq_ignore_ascii_case("text"))
		.ok_or("CSV corpus has no 'text' column")?;

	let mut statements = Vec::new();
	for row in rows {
		if row.trim().is_empty() {
			continue;
		}
		if let Some(text) = split_csv_row(row).into_iter().nth(text_column) {
			if !text.is_empty() {
				statements.push(text);
			}
		}
	}
	Ok(statements)
}

fn split_csv_row(row: &str) -> Vec<String> {
	let mut fields = Vec::new();
	let mut field = String::new();
	let mut quoted = false;
	let mut chars = row.chars().peekable();

	while let Some(c) = chars.next() {
		match c {
			'"' if quoted => {
				if chars.peek() == Some(&'"') {
					chars.next();
					field.push('"');
				} else {
					quoted = false;
				}
			}
			'"' if field.is_empty() => quoted = true,
			',' if !quoted => fields.push(std::mem::take(&mut field)),
			_ => field.push(c),
		}
	}
	fields.push(field);

	fields
}

/// Statements from a JSON post archive.
///
/// Two shapes are recognized per entry of the top-level array:
/// - a `text` string field, taken as-is;
/// - an HTML `content` field (reblogs/reposts excluded), with markup
///   stripped, entities decoded and `@mentions` removed.
fn parse_json(content: &str) -> Result<Vec<String>, Box<dyn Error>> {
	let value: Value = serde_json::from_str(content)?;
	let entries = value.as_array().ok_or("JSON corpus must be a top-level array")?;

	let mut statements = Vec::new();
	for entry in entries {
		if let Some(text) = entry.get("text").and_then(Value::as_str) {
			statements.push(text.to_owned());
			continue;
		}
		if is_reblog(entry) {
			continue;
		}
		if let Some(html) = entry.get("content").and_then(Value::as_str) {
			let text = remove_mentions(&nlp::decode_entities(&strip_markup(html)));
			if !text.trim().is_empty() {
				statements.push(text);
			}
		}
	}
	Ok(statements)
}

/// A non-null `reblog` or a true `repost` marks a repeated post.
fn is_reblog(entry: &Value) -> bool {
	match entry.get("reblog") {
		Some(Value::Null) | None => entry
			.get("repost")
			.and_then(Value::as_bool)
			.unwrap_or(false),
		Some(_) => true,
	}
}

/// Drops tags. Paragraph and line-break tags become newlines so separate
/// paragraphs stay separate sentences downstream.
fn strip_markup(html: &str) -> String {
	let mut text = String::with_capacity(html.len());
	let mut tag = String::new();
	let mut in_tag = false;

	for c in html.chars() {
		if in_tag {
			if c == '>' {
				in_tag = false;
				if breaks_line(&tag) {
					text.push('\n');
				}
				tag.clear();
			} else {
				tag.push(c);
			}
		} else if c == '<' {
			in_tag = true;
		} else {
			text.push(c);
		}
	}

	text
}

fn breaks_line(tag: &str) -> bool {
	let closing = tag.starts_with('/');
	let name = tag
		.trim_start_matches('/')
		.split(|c: char| c.is_whitespace() || c == '/')
		.next()
		.unwrap_or("")
		.to_lowercase();
	name == "br" || (closing && matches!(name.as_str(), "p" | "div" | "li"))
}

/// Removes `@mention` words (including `@user@host` forms), preserving
/// line structure.
fn remove_mentions(text: &str) -> String {
	text.lines()
		.map(|line| {
			line.split_whitespace()
				.filter(|word| !word.starts_with('@'))
				.collect::<Vec<_>>()
				.join(" ")
		})
		.collect::<Vec<_>>()
		.join("\n")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn text_skips_comments_and_blanks() {
		let content = "# corpus header\nfirst statement\n\n  \nsecond statement\n";
		assert_eq!(parse_text(content), vec!["first statement", "second statement"]);
	}

	#[test]
	fn csv_extracts_the_text_column() {
		let content = "id,text,author\n1,\"hello, world\",ann\n2,plain words,bob\n";
		let statements = parse_csv(content).unwrap();
		assert_eq!(statements, vec!["hello, world", "plain words"]);
	}

	#[test]
	fn csv_unescapes_doubled_quotes() {
		let content = "text\n\"she said \"\"hi\"\"\"\n";
		assert_eq!(parse_csv(content).unwrap(), vec!["she said \"hi\""]);
	}

	#[test]
	fn csv_without_text_column_is_an_error() {
		assert!(parse_csv("id,author\n1,ann\n").is_err());
	}

	#[test]
	fn json_flat_text_records() {
		let content = r#"[{"text": "first post"}, {"text": "second post"}]"#;
		let statements = parse_json(content).unwrap();
		assert_eq!(statements, vec!["first post", "second post"]);
	}

	#[test]
	fn json_content_posts_are_cleaned() {
		let content = r#"[
			{"content": "<p>@friend hello &amp; welcome</p><p>second line</p>"},
			{"content": "<p>boosted thing</p>", "reblog": {"id": 1}},
			{"content": "<p>reposted</p>", "repost": true}
		]"#;
		let statements = parse_json(content).unwrap();
		assert_eq!(statements, vec!["hello & welcome\nsecond line"]);
	}

	#[test]
	fn json_non_array_is_an_error() {
		assert!(parse_json(r#"{"text": "nope"}"#).is_err());
	}

	#[test]
	fn markup_stripping_keeps_paragraph_breaks() {
		assert_eq!(strip_markup("<p>one</p><p>two<br>three</p>"), "one\ntwo\nthree\n");
		assert_eq!(strip_markup("a <b>bold</b> word"), "a bold word");
	}

	#[test]
	fn mentions_are_removed() {
		assert_eq!(remove_mentions("@ann hi there @bob@example.org !"), "hi there !");
	}
}
