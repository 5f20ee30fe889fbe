//! Placeholder templates.
//!
//! A template is text containing placeholders in braces, such as
//! `chapter{CHAPTER_NUMBER:03}.xhtml`. Literal braces are written doubled (`{{` and `}}`).
//! The only format spec is zero padding of integers: `{NAME:0N}`.
//!
//! Built in placeholders:
//!
//! - `BOOK_VOLUME` and `ISBN`, from the book;
//! - `COUNTER`, a running number which starts at a given value and increases once per item;
//! - `CHAPTER_NUMBER`, `CHAPTER_TITLE` and `CHAPTER_SUBTITLE`, taken from the chapter
//!   whose number is the current counter value. These are only looked up when the
//!   template uses them, and a counter with no matching chapter is an error.
//!
//! Anything else must be supplied as an extra replacement.
use crate::book::{Book, Chapter};
use crate::error::TemplateError;
use std::fmt::Write;

/// A value substituted for a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    /// an integer, which can be zero padded
    Int(i64),
    /// text
    Text(String),
}

macro_rules! int_conv {
    ($($from:ty),*) => {
        $(
            impl From<$from> for TemplateValue {
                fn from(src: $from) -> Self {
                    TemplateValue::Int(src as i64)
                }
            }
        )*
    };
}

int_conv!(i64, i32, u32, usize);

impl From<&str> for TemplateValue {
    fn from(src: &str) -> Self {
        TemplateValue::Text(src.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(src: String) -> Self {
        TemplateValue::Text(src)
    }
}

impl From<char> for TemplateValue {
    fn from(src: char) -> Self {
        TemplateValue::Text(src.to_string())
    }
}

/// How the counter advances when some items are filtered out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Numbering {
    /// only rendered items advance the counter, so rendered output is numbered without gaps
    #[default]
    Contiguous,
    /// every item advances the counter, so numbers follow positions in the sequence
    Positional,
}

const BUILT_INS: [&str; 6] = [
    "BOOK_VOLUME",
    "ISBN",
    "COUNTER",
    "CHAPTER_NUMBER",
    "CHAPTER_TITLE",
    "CHAPTER_SUBTITLE",
];

/// The book-level values templates are expanded against
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    chapters: &'a [Chapter],
    volume: u32,
    isbn: &'a str,
}

impl<'a> TemplateContext<'a> {
    /// A context with the given chapters, volume number and isbn
    pub fn new(chapters: &'a [Chapter], volume: u32, isbn: &'a str) -> Self {
        TemplateContext {
            chapters,
            volume,
            isbn,
        }
    }

    /// Start expanding `text`; the counter starts at 1 unless changed
    pub fn template<'t>(&self, text: &'t str) -> Template<'t, 'a> {
        Template {
            context: *self,
            text,
            start: 1,
            extras: Vec::new(),
            numbering: Numbering::default(),
        }
    }
}

impl Book {
    /// The context for expanding templates about this book
    pub fn template_context(&self) -> TemplateContext<'_> {
        TemplateContext::new(&self.chapters, self.volume, &self.isbn)
    }
}

/// A template being prepared for expansion
#[derive(Debug, Clone)]
pub struct Template<'t, 'a> {
    context: TemplateContext<'a>,
    text: &'t str,
    start: usize,
    extras: Vec<(String, TemplateValue)>,
    numbering: Numbering,
}

enum Piece<'t> {
    Literal(&'t str),
    Brace(char),
    Placeholder { name: &'t str, width: Option<usize> },
}

fn malformed(position: usize, reason: &'static str) -> TemplateError {
    TemplateError::Malformed { position, reason }
}

fn parse(text: &str) -> Result<Vec<Piece<'_>>, TemplateError> {
    let mut pieces = Vec::new();
    let mut literal_start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '{' && c != '}' {
            continue;
        }
        if literal_start < i {
            pieces.push(Piece::Literal(&text[literal_start..i]));
        }
        if chars.peek().map(|&(_, next)| next) == Some(c) {
            chars.next();
            pieces.push(Piece::Brace(c));
            literal_start = i + 2;
            continue;
        }
        if c == '}' {
            return Err(malformed(i, "unmatched `}`"));
        }
        let close = text[i..]
            .find('}')
            .map(|offset| i + offset)
            .ok_or_else(|| malformed(i, "unterminated placeholder"))?;
        let inner = &text[i + 1..close];
        let (name, spec) = match inner.split_once(':') {
            Some((name, spec)) => (name, Some(spec)),
            None => (inner, None),
        };
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(malformed(i, "placeholder names are letters, digits and underscores"));
        }
        let width = match spec {
            None => None,
            Some(spec) => {
                let width = spec
                    .strip_prefix('0')
                    .filter(|w| !w.is_empty())
                    .and_then(|w| w.parse::<usize>().ok())
                    .ok_or_else(|| TemplateError::BadFormatSpec {
                        placeholder: name.to_string(),
                        spec: spec.to_string(),
                    })?;
                Some(width)
            }
        };
        pieces.push(Piece::Placeholder { name, width });
        while chars.peek().is_some_and(|&(j, _)| j <= close) {
            chars.next();
        }
        literal_start = close + 1;
    }
    if literal_start < text.len() {
        pieces.push(Piece::Literal(&text[literal_start..]));
    }
    Ok(pieces)
}

impl<'t, 'a> Template<'t, 'a> {
    /// The counter value for the first item (or for a single expansion)
    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Supply an extra placeholder
    pub fn extra<K: Into<String>, V: Into<TemplateValue>>(mut self, key: K, value: V) -> Self {
        self.extras.push((key.into(), value.into()));
        self
    }

    /// How filtered items affect the counter
    pub fn numbering(mut self, numbering: Numbering) -> Self {
        self.numbering = numbering;
        self
    }

    fn resolve(&self, name: &str, counter: usize) -> Result<TemplateValue, TemplateError> {
        let chapter = || {
            counter
                .checked_sub(1)
                .and_then(|idx| self.context.chapters.get(idx))
                .ok_or_else(|| TemplateError::CounterOutOfRange {
                    placeholder: name.to_string(),
                    counter,
                    chapters: self.context.chapters.len(),
                })
        };
        let value: TemplateValue = match name {
            "BOOK_VOLUME" => self.context.volume.into(),
            "ISBN" => self.context.isbn.into(),
            "COUNTER" => counter.into(),
            "CHAPTER_NUMBER" => chapter()?.number.into(),
            "CHAPTER_TITLE" => chapter()?.title.as_str().into(),
            "CHAPTER_SUBTITLE" => chapter()?.subtitle.as_str().into(),
            _ => self
                .extras
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?,
        };
        Ok(value)
    }

    fn expand_into(&self, pieces: &[Piece<'_>], counter: usize, out: &mut String) -> Result<(), TemplateError> {
        for piece in pieces {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Brace(c) => out.push(*c),
                Piece::Placeholder { name, width } => {
                    match (self.resolve(name, counter)?, width) {
                        (TemplateValue::Int(i), Some(width)) => {
                            let _ = write!(out, "{:0width$}", i, width = *width);
                        }
                        (TemplateValue::Int(i), None) => {
                            let _ = write!(out, "{}", i);
                        }
                        (TemplateValue::Text(s), None) => out.push_str(&s),
                        (TemplateValue::Text(_), Some(width)) => {
                            return Err(TemplateError::BadFormatSpec {
                                placeholder: name.to_string(),
                                spec: format!("0{}", width),
                            })
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn prepare(&self) -> Result<Vec<Piece<'t>>, TemplateError> {
        if let Some((key, _)) = self
            .extras
            .iter()
            .find(|(key, _)| BUILT_INS.contains(&key.as_str()))
        {
            return Err(TemplateError::ShadowedPlaceholder(key.clone()));
        }
        parse(self.text)
    }

    /// Expand the template once, with the counter at its start value
    pub fn render(&self) -> Result<String, TemplateError> {
        let pieces = self.prepare()?;
        let mut out = String::with_capacity(self.text.len());
        self.expand_into(&pieces, self.start, &mut out)?;
        Ok(out)
    }

    /// Expand the template once per item, concatenating the results
    pub fn render_each<I: IntoIterator>(&self, items: I) -> Result<String, TemplateError> {
        self.render_filtered(items, |_| true)
    }

    /// Expand the template once per item for which `keep` is true, concatenating the results;
    /// how skipped items affect the counter is set by [`Template::numbering`]
    pub fn render_filtered<I, F>(&self, items: I, mut keep: F) -> Result<String, TemplateError>
    where
        I: IntoIterator,
        F: FnMut(&I::Item) -> bool,
    {
        let pieces = self.prepare()?;
        let mut out = String::new();
        let mut counter = self.start;
        for item in items {
            if keep(&item) {
                self.expand_into(&pieces, counter, &mut out)?;
                counter += 1;
            } else if self.numbering == Numbering::Positional {
                counter += 1;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapters() -> Vec<Chapter> {
        vec![
            Chapter::new(1, "First", "One", vec![None]),
            Chapter::new(2, "Second", "Two", vec![None]),
        ]
    }

    #[test]
    fn expands_book_values() {
        let chapters = chapters();
        let context = TemplateContext::new(&chapters, 4, "9780306406157");
        let out = context
            .template("Vol. {BOOK_VOLUME} ({ISBN}) Ref_{BOOK_VOLUME:02}{COUNTER:02}")
            .start(7)
            .render()
            .unwrap();
        assert_eq!(out, "Vol. 4 (9780306406157) Ref_0407");
    }

    #[test]
    fn expands_chapters_in_turn() {
        let chapters = chapters();
        let context = TemplateContext::new(&chapters, 1, "x");
        let out = context
            .template("<li>chapter{CHAPTER_NUMBER:03}: {CHAPTER_TITLE} -{CHAPTER_SUBTITLE}-</li>\n")
            .render_each(chapters.iter())
            .unwrap();
        assert_eq!(
            out,
            "<li>chapter001: First -One-</li>\n<li>chapter002: Second -Two-</li>\n"
        );
    }

    #[test]
    fn chapter_values_out_of_range_fail() {
        let chapters = chapters();
        let context = TemplateContext::new(&chapters, 1, "x");
        assert_eq!(
            context.template("{CHAPTER_TITLE}").start(3).render(),
            Err(TemplateError::CounterOutOfRange {
                placeholder: "CHAPTER_TITLE".to_string(),
                counter: 3,
                chapters: 2
            })
        );
        assert!(context.template("{CHAPTER_NUMBER}").start(0).render().is_err());
        // unreferenced chapter values are never looked up
        assert_eq!(
            context.template("{COUNTER}").start(3).render().unwrap(),
            "3"
        );
    }

    #[test]
    fn extras_and_escapes() {
        let chapters = chapters();
        let context = TemplateContext::new(&chapters, 1, "x");
        let out = context
            .template("{{chapter{COUNTER:03}{LETTER}}} {INSERT_NUMBER:03}")
            .extra("LETTER", 'b')
            .extra("INSERT_NUMBER", 12usize)
            .render()
            .unwrap();
        assert_eq!(out, "{chapter001b} 012");
    }

    #[test]
    fn numbering_of_filtered_items() {
        let chapters = chapters();
        let context = TemplateContext::new(&chapters, 1, "x");
        let items = ["a", "filler", "b", "c"];
        let template = context.template("[{COUNTER}]");
        assert_eq!(
            template
                .render_filtered(items.iter(), |i| **i != "filler")
                .unwrap(),
            "[1][2][3]"
        );
        assert_eq!(
            template
                .clone()
                .numbering(Numbering::Positional)
                .render_filtered(items.iter(), |i| **i != "filler")
                .unwrap(),
            "[1][3][4]"
        );
    }

    #[test]
    fn errors() {
        let chapters = chapters();
        let context = TemplateContext::new(&chapters, 1, "x");
        assert_eq!(
            context.template("{NOPE}").render(),
            Err(TemplateError::UnknownPlaceholder("NOPE".to_string()))
        );
        assert!(matches!(
            context.template("{ISBN:03}").render(),
            Err(TemplateError::BadFormatSpec { .. })
        ));
        assert!(matches!(
            context.template("{COUNTER:>3}").render(),
            Err(TemplateError::BadFormatSpec { .. })
        ));
        assert!(matches!(
            context.template("a } b").render(),
            Err(TemplateError::Malformed { position: 2, .. })
        ));
        assert!(matches!(
            context.template("a {COUNTER").render(),
            Err(TemplateError::Malformed { .. })
        ));
        assert_eq!(
            context.template("{COUNTER}").extra("COUNTER", 3usize).render(),
            Err(TemplateError::ShadowedPlaceholder("COUNTER".to_string()))
        );
    }

    #[test]
    fn book_context() {
        let book = Book::from_yaml(
            "volume_number: 2\nisbn: \"9780306406157\"\npublication_year: 2000\nchapters:\n  - {title: A, subtitle: B, parts: [{title: null}]}\n",
            ".",
        )
        .unwrap();
        assert_eq!(
            book.template_context()
                .template("{BOOK_VOLUME:02}/{CHAPTER_TITLE}")
                .render()
                .unwrap(),
            "02/A"
        );
    }
}
