//! Converting manuscript text into the body of a part's `.tex` file.
use bindery_common::escape_to_latex;
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use tracing::warn;

/// A paragraph consisting only of this is an ornamental scene break
pub const ORNAMENT_RULE: &str = "* * *";
/// The command an ornamental scene break becomes
pub const ICON: &str = "\\icon";

const ELLIPSIS: &str = "{\\Ellipsis}";
const ELLIPSIS_SPLITTABLE: &str = "{\\EllipsisSplittable}";
const CENTERED_PAGE_OPEN: &str = "\\begin{SpanEnv}\\renewcommand{\\SpanEnvClose}{ \\vfill\\hspace{0pt}\\newpage}\\newpage\\hspace{0pt}\\vfill ";

lazy_static! {
	static ref INLINE: Regex = Regex::new(concat!(
		r"\.\.\.|…",
		r#"|<span class="v-centered-page">"#,
		r#"|<span class="page-break" ?/>"#,
		r"|</span>",
		r"|</?(?:i|em|u|code|b|strong)>",
		r"|<br(?: ?/)?>",
	))
	.expect("inline markup regex is valid");
	static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\r?\n\s*\n").expect("paragraph break regex is valid");
	static ref LEFTOVER_TAG: Regex = Regex::new(r"<[^\r\n<>]+>").expect("leftover tag regex is valid");
	static ref TRAILING_TAGS: Regex = Regex::new(r"(?:<[^<>]+>)*$").expect("trailing tags regex is valid");
	static ref LEADING_TAGS: Regex = Regex::new(r"^(?:<[^<>]+>)*").expect("leading tags regex is valid");
}

fn is_word(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}

/// whether `before` ends with a word character, ignoring any tags in between
fn word_before(before: &str) -> bool {
	let end = TRAILING_TAGS.find(before).map_or(before.len(), |m| m.start());
	before[..end].chars().next_back().is_some_and(is_word)
}

/// whether `after` starts with a word character, ignoring any tags in between
fn word_after(after: &str) -> bool {
	let start = LEADING_TAGS.find(after).map_or(0, |m| m.end());
	after[start..].chars().next().is_some_and(is_word)
}

fn replacement<'a>(token: &'a str, before: &str, after: &str) -> &'a str {
	match token {
		"..." | "…" => {
			if word_before(before) && word_after(after) {
				ELLIPSIS_SPLITTABLE
			} else {
				ELLIPSIS
			}
		},
		"<span class=\"v-centered-page\">" => CENTERED_PAGE_OPEN,
		"<span class=\"page-break\"/>" | "<span class=\"page-break\" />" => "\\newpage",
		"</span>" => "\\end{SpanEnv}",
		"<i>" | "<em>" => "\\textit{",
		"<u>" => "\\ul{",
		"<code>" => "\\texttt{",
		"<b>" | "<strong>" => "\\textbf{",
		"</i>" | "</em>" | "</u>" | "</code>" | "</b>" | "</strong>" => "}",
		"<br>" | "<br/>" | "<br />" => "\\\\",
		other => other,
	}
}

/// Replace inline markup with LaTeX commands and escape everything else
fn convert_inline(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut last = 0;
	for token in INLINE.find_iter(text) {
		out.push_str(&escape_to_latex(&text[last..token.start()]));
		out.push_str(replacement(token.as_str(), &text[..token.start()], &text[token.end()..]));
		last = token.end();
	}
	out.push_str(&escape_to_latex(&text[last..]));
	out
}

/// Convert the manuscript text of a part to LaTeX.
///
/// Paragraphs are separated by blank lines. A paragraph which is just `* * *`
/// becomes `\icon`, and the paragraph after an icon is not indented unless it is
/// another icon. A paragraph consisting of a forced line break is joined to the
/// one before it.
///
/// Any tag which has no LaTeX equivalent is left in place and logged.
pub fn format_text(text: &str) -> String {
	let converted = convert_inline(text);

	let mut after_icon = false;
	let paragraphs = PARAGRAPH_BREAK
		.split(&converted)
		.map(str::trim)
		.filter(|p| !p.is_empty())
		.map(|p| {
			let is_icon = p == ORNAMENT_RULE;
			let paragraph = if is_icon {
				Cow::Borrowed(ICON)
			} else if after_icon {
				Cow::Owned(format!("\\noindent\n{}", p))
			} else {
				Cow::Borrowed(p)
			};
			after_icon = is_icon;
			paragraph
		})
		.collect::<Vec<_>>();

	let text = paragraphs.join("\n\n").replace("\n\n\\\\", "\n\\\\");

	if let Some(tag) = LEFTOVER_TAG.find(&text) {
		warn!(
			"possibly unprocessed html tag `{}`; it has been passed through to the LaTeX source unchanged",
			tag.as_str()
		);
	}
	text
}
