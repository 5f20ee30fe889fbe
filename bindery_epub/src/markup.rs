//! Line-by-line conversion of manuscript text into xhtml fragments.
//!
//! Each stripped, non-blank line of a part is turned into at most one [`Fragment`].
//! How an ordinary paragraph is styled depends on what came before it, which is
//! carried from line to line as a [`MarkupState`]; `process_line` never keeps state
//! of its own, so the caller threads the returned state into the next call.
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

/// A line consisting only of this marks an ornamental scene break
pub const ORNAMENT_MARKER: &str = "* * *";
/// A line consisting only of this marks extra vertical space before the next paragraph
pub const LINE_BREAK_MARKER: &str = "<br/>";
/// Where the ornament image lives within the epub
pub const ORNAMENT_IMAGE: &str = "images/ornament.svg";

lazy_static! {
    static ref CENTERED_PAGE: Regex =
        Regex::new(r#"^<span class="v-centered-page">(.+?)</span>$"#).expect("centered page regex is valid");
}

/// What the previous lines were, as far as styling the next paragraph is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkupState {
    /// the previous line was an explicit line break
    pub after_break: bool,
    /// a part header has just been emitted
    pub after_subpart: bool,
    /// the next line is the first of a chapter
    pub first_of_chapter: bool,
    /// the previous line was a centered page, which starts a new document
    pub after_split: bool,
}

/// The css class of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParagraphClass {
    /// after an explicit line break
    SpaceBreak,
    /// directly after a part header
    Continuation,
    /// the first paragraph of a chapter
    ChapterOpening,
    /// any other paragraph
    Body,
    /// an ordinary paragraph which opens a document
    BodyOpening,
    /// the text of a centered page, which stands in a document of its own
    AfterSplit,
}

impl ParagraphClass {
    /// The class attribute used in the stylesheet
    pub const fn css_class(self) -> &'static str {
        match self {
            ParagraphClass::SpaceBreak => "space-break",
            ParagraphClass::Continuation => "tx1",
            ParagraphClass::ChapterOpening => "cotx1a",
            ParagraphClass::Body => "tx",
            ParagraphClass::BodyOpening => "tx1",
            ParagraphClass::AfterSplit => "tx10",
        }
    }
}

/// One piece of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// the ornamental scene break
    Ornament,
    /// the unwrapped text of a centered page
    CenteredPage(String),
    /// a paragraph of manuscript text, which may contain inline markup
    Paragraph {
        /// its class
        class: ParagraphClass,
        /// its contents
        text: String,
    },
    /// the numbered header of a titled part
    SubpartHeader {
        /// the part number
        number: usize,
        /// the part title, already escaped
        title: String,
    },
}

impl Fragment {
    /// This fragment as the first of a document: an ordinary paragraph is restyled
    pub fn opening(self) -> Self {
        match self {
            Fragment::Paragraph {
                class: ParagraphClass::Body,
                text,
            } => Fragment::Paragraph {
                class: ParagraphClass::BodyOpening,
                text,
            },
            other => other,
        }
    }

    /// This fragment as a paragraph in a document of its own
    pub fn split_off(self) -> Self {
        match self {
            Fragment::CenteredPage(text) => Fragment::Paragraph {
                class: ParagraphClass::AfterSplit,
                text,
            },
            other => other,
        }
    }

    /// Render as xhtml
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Fragment::Ornament => Cow::Owned(format!(
                concat!(
                    "<div class=\"ornament\">\n",
                    "<div class=\"ornament-image\"><img class=\"ornament1\" alt=\"\" src=\"{}\"/></div>\n",
                    "</div>"
                ),
                ORNAMENT_IMAGE
            )),
            Fragment::CenteredPage(text) => Cow::Borrowed(text),
            Fragment::Paragraph { class, text } => {
                Cow::Owned(format!("<p class=\"{}\">{}</p>", class.css_class(), text))
            }
            Fragment::SubpartHeader { number, title } => Cow::Owned(format!(
                "<p class=\"h1_co{}\">{}. {}</p>",
                if *number == 1 { "" } else { "1" },
                number,
                title
            )),
        }
    }
}

/// Convert one stripped, non-blank line, returning what it renders as (if anything)
/// and the state for the next line.
///
/// `first_of_chapter` is passed through untouched; the caller clears it once a line
/// has been processed.
pub fn process_line(line: &str, state: MarkupState) -> (Option<Fragment>, MarkupState) {
    let next = |after_break, after_subpart, after_split| MarkupState {
        after_break,
        after_subpart,
        first_of_chapter: state.first_of_chapter,
        after_split,
    };

    if line == ORNAMENT_MARKER {
        (Some(Fragment::Ornament), next(false, false, false))
    } else if line == LINE_BREAK_MARKER {
        (None, next(true, false, false))
    } else if let Some(captures) = CENTERED_PAGE.captures(line) {
        (
            Some(Fragment::CenteredPage(captures[1].to_string())),
            next(false, false, true),
        )
    } else {
        let class = if state.after_break {
            ParagraphClass::SpaceBreak
        } else if state.after_subpart {
            ParagraphClass::Continuation
        } else if state.first_of_chapter {
            ParagraphClass::ChapterOpening
        } else {
            ParagraphClass::Body
        };
        let fragment = Fragment::Paragraph {
            class,
            text: line.to_string(),
        };
        (Some(fragment), next(false, false, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_of(fragment: Option<Fragment>) -> ParagraphClass {
        match fragment {
            Some(Fragment::Paragraph { class, .. }) => class,
            other => panic!("expected a paragraph, got {:?}", other),
        }
    }

    #[test]
    fn paragraph_class_priority() {
        let all = MarkupState {
            after_break: true,
            after_subpart: true,
            first_of_chapter: true,
            after_split: false,
        };
        assert_eq!(class_of(process_line("a", all).0), ParagraphClass::SpaceBreak);
        let no_break = MarkupState {
            after_break: false,
            ..all
        };
        assert_eq!(class_of(process_line("a", no_break).0), ParagraphClass::Continuation);
        let first_only = MarkupState {
            after_subpart: false,
            ..no_break
        };
        assert_eq!(class_of(process_line("a", first_only).0), ParagraphClass::ChapterOpening);
        assert_eq!(
            class_of(process_line("a", MarkupState::default()).0),
            ParagraphClass::Body
        );
    }

    #[test]
    fn paragraphs_clear_state_except_first() {
        let state = MarkupState {
            after_break: true,
            after_subpart: true,
            first_of_chapter: true,
            after_split: true,
        };
        let (_, next) = process_line("Hello", state);
        assert_eq!(
            next,
            MarkupState {
                first_of_chapter: true,
                ..MarkupState::default()
            }
        );
    }

    #[test]
    fn line_breaks_emit_nothing() {
        let (fragment, state) = process_line(LINE_BREAK_MARKER, MarkupState::default());
        assert_eq!(fragment, None);
        assert!(state.after_break);
        assert_eq!(
            class_of(process_line("after", state).0),
            ParagraphClass::SpaceBreak
        );
    }

    #[test]
    fn repeated_ornaments_are_identical_and_never_space_break() {
        let state = MarkupState {
            after_break: true,
            after_subpart: true,
            ..MarkupState::default()
        };
        let (first, state) = process_line(ORNAMENT_MARKER, state);
        let (second, state) = process_line(ORNAMENT_MARKER, state);
        assert_eq!(first, Some(Fragment::Ornament));
        assert_eq!(first, second);
        assert_eq!(
            first.unwrap().render(),
            second.unwrap().render()
        );
        assert_eq!(class_of(process_line("text", state).0), ParagraphClass::Body);
    }

    #[test]
    fn centered_pages_unwrap_and_split() {
        let (fragment, state) = process_line(
            "<span class=\"v-centered-page\">Interlude</span>",
            MarkupState::default(),
        );
        assert_eq!(fragment, Some(Fragment::CenteredPage("Interlude".to_string())));
        assert!(state.after_split);
        assert_eq!(
            fragment.unwrap().split_off().render(),
            "<p class=\"tx10\">Interlude</p>"
        );
    }

    #[test]
    fn spans_which_do_not_wrap_the_line_are_text() {
        let line = "<span class=\"v-centered-page\">a</span> and more";
        assert_eq!(class_of(process_line(line, MarkupState::default()).0), ParagraphClass::Body);
    }

    #[test]
    fn rendering() {
        let p = Fragment::Paragraph {
            class: ParagraphClass::Body,
            text: "She <em>ran</em>.".to_string(),
        };
        assert_eq!(p.render(), "<p class=\"tx\">She <em>ran</em>.</p>");
        assert_eq!(p.opening().render(), "<p class=\"tx1\">She <em>ran</em>.</p>");
        let opening = Fragment::Paragraph {
            class: ParagraphClass::ChapterOpening,
            text: "x".to_string(),
        };
        assert_eq!(opening.clone().opening(), opening);
        assert_eq!(
            Fragment::SubpartHeader {
                number: 1,
                title: "Arrival".to_string()
            }
            .render(),
            "<p class=\"h1_co\">1. Arrival</p>"
        );
        assert_eq!(
            Fragment::SubpartHeader {
                number: 2,
                title: "Departure".to_string()
            }
            .render(),
            "<p class=\"h1_co1\">2. Departure</p>"
        );
        assert!(Fragment::Ornament.render().contains(ORNAMENT_IMAGE));
    }
}
