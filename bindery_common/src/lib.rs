#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! A set of utilities used across the bindery crates:
//!
//! - escaping text for xhtml and LaTeX output
//! - lettering the sub-documents a chapter is split into (`a`, `b`, `c`...)
//! - validating isbns
//! - guessing the mimetype of resources which end up in an epub manifest

use aho_corasick::AhoCorasick;
use lazy_static::lazy_static;
use std::borrow::Cow;
mod isbn;
mod mimetypes;
pub use isbn::{validate_isbn, IsbnError};
pub use mimetypes::{GuessMimeType, MimeType};

lazy_static! {
	static ref HTML_FINDER: AhoCorasick = AhoCorasick::new(HTML_TARGET_CHARS)
		.expect("static html patterns are valid");
	static ref LATEX_FINDER: AhoCorasick = AhoCorasick::new(LATEX_TARGET_CHARS)
		.expect("static latex patterns are valid");
}

static HTML_TARGET_CHARS: [&str; 3] = [
	"<",
	">",
	"&",
];

static HTML_REPLACEMENTS: [&str; 3] = [
	"&lt;",
	"&gt;",
	"&amp;",
];

/// escape `input` for xhtml output;
/// the input is only copied if something actually needs escaping
pub fn escape_to_html<'a, S: Into<Cow<'a, str>>>(input: S) -> Cow<'a, str> {
	let input = input.into();
	if HTML_FINDER.is_match(&*input) {
		Cow::Owned(HTML_FINDER.replace_all(&input, &HTML_REPLACEMENTS[..]))
	} else {
		input
	}
}

static LATEX_TARGET_CHARS: [&str; 16] = [
	"…",
	"–",
	"—",
	"\u{a0}",
	"&",
	"%",
	"$",
	"#",
	"_",
	"{",
	"}",
	"[",
	"]",
	"~",
	"^",
	"\\",
];

static LATEX_REPLACEMENTS: [&str; 16] = [
	"\\ldots{}",
	"--",
	"---",
	"~",
	"\\&",
	r"\%",
	r"\$",
	r"\#",
	r"\_",
	r"\{",
	r"\}",
	r"{[}",
	r"{]}",
	r"\textasciitilde{}",
	r"\textasciicircum{}",
	r"\textbackslash{}"
];

/// escape `input` for LaTeX output
pub fn escape_to_latex<'a, S: Into<Cow<'a, str>>>(input: S) -> Cow<'a, str> {
	let input = input.into();
	if LATEX_FINDER.is_match(&*input) {
		Cow::Owned(LATEX_FINDER.replace_all(&input, &LATEX_REPLACEMENTS[..]))
	} else {
		input
	}
}

/// given the zero-based index of a chapter section, return the letter
/// used to name its document, e.g. 0 -> a, 1 -> b, 2 -> c.
/// Returns `None` if the index is greater than 25.
/// ```
/// # use bindery_common::section_letter;
/// assert_eq!(section_letter(1), Some('b'));
/// assert_eq!(section_letter(26), None);
/// ```
pub const fn section_letter(n: usize) -> Option<char> {
	if n > 25 {
		None
	} else {
		let codepoint = b'a' + n as u8;
		Some(codepoint as char)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_section_letters() {
		assert_eq!(section_letter(0), Some('a'));
		assert_eq!(section_letter(25), Some('z'));
		assert_eq!(section_letter(27), None);
	}

	#[test]
	fn test_latex_escapes() {
		let escapes = [
			("&", "\\&"),
			("%", "\\%"),
			("$", "\\$"),
			("#", "\\#"),
			("_", "\\_"),
			("{Hello}", "\\{Hello\\}"),
			("[Hello]", "{[}Hello{]}"),
			("~", "\\textasciitilde{}"),
			("^", "\\textasciicircum{}"),
			("\\", "\\textbackslash{}"),
			("a–b", "a--b"),
			("wait—what", "wait---what"),
		];
		for (input, expected) in escapes.iter() {
			let out = escape_to_latex(*input);
			assert_eq!(out, *expected);
		}
	}

	#[test]
	fn test_html_escapes() {
		assert_eq!(escape_to_html("Fish & Chips"), "Fish &amp; Chips");
		assert_eq!(escape_to_html("<b>"), "&lt;b&gt;");
		assert!(matches!(escape_to_html("plain"), Cow::Borrowed("plain")));
	}
}
