use crate::TextError;
use lazy_static::lazy_static;
use regex::Regex;

/// What a horizontal rule is normalised to
pub const RULE: &str = "* * *";

lazy_static! {
    // rules are tried first, so `***` is a rule rather than bold followed by italic
    static ref MARKER: Regex =
        Regex::new(r"[*_] ?[*_] ?[*_]|\*\*|\*").expect("emphasis marker regex is valid");
}

/// An inline tag which is opened and closed by the same marker
#[derive(Debug, Clone, Copy)]
struct Toggle {
    open: &'static str,
    close: &'static str,
    is_open: bool,
}

impl Toggle {
    const fn new(open: &'static str, close: &'static str) -> Self {
        Toggle {
            open,
            close,
            is_open: false,
        }
    }

    fn flip(&mut self) -> &'static str {
        self.is_open = !self.is_open;
        if self.is_open {
            self.open
        } else {
            self.close
        }
    }
}

/// Replace markdown emphasis markers with html tags.
///
/// `*` becomes `<em>` and `**` becomes `<strong>`, each alternating between opening
/// and closing tags. Underscores are left alone except in a rule: a rule such as
/// `***`, `* * *` or `_ _ _` becomes `* * *`. Every paragraph must close what it opens.
pub fn emphasis_to_tags(text: &str) -> Result<String, TextError> {
    let mut paragraphs = Vec::new();
    for (index, paragraph) in text.split("\n\n").enumerate() {
        let mut em = Toggle::new("<em>", "</em>");
        let mut strong = Toggle::new("<strong>", "</strong>");
        let mut out = String::with_capacity(paragraph.len());
        let mut last = 0;
        for marker in MARKER.find_iter(paragraph) {
            out.push_str(&paragraph[last..marker.start()]);
            let replacement = match marker.as_str() {
                "**" => strong.flip(),
                "*" => em.flip(),
                _ => RULE,
            };
            out.push_str(replacement);
            last = marker.end();
        }
        out.push_str(&paragraph[last..]);

        for toggle in [em, strong] {
            if toggle.is_open {
                return Err(TextError::UnbalancedEmphasis {
                    paragraph: index + 1,
                    tag: toggle.open,
                });
            }
        }
        paragraphs.push(out);
    }
    Ok(paragraphs.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn italics_and_bold() {
        assert_eq!(
            emphasis_to_tags("She *ran*, **fast**, and far.").unwrap(),
            "She <em>ran</em>, <strong>fast</strong>, and far."
        );
    }

    #[test]
    fn underscores_outside_rules_are_text() {
        let text = "See snake_case and _this_ at https://example.com/a_b.";
        assert_eq!(emphasis_to_tags(text).unwrap(), text);
        assert_eq!(emphasis_to_tags("one_ *two*").unwrap(), "one_ <em>two</em>");
    }

    #[test]
    fn rules_are_normalised() {
        for rule in ["***", "* * *", "_ _ _", "*_*", "___"] {
            assert_eq!(emphasis_to_tags(rule).unwrap(), RULE, "{}", rule);
        }
        assert_eq!(
            emphasis_to_tags("Before.\n\n* * *\n\n*After.*").unwrap(),
            "Before.\n\n* * *\n\n<em>After.</em>"
        );
    }

    #[test]
    fn emphasis_may_span_lines_but_not_paragraphs() {
        assert_eq!(
            emphasis_to_tags("*one\ntwo*").unwrap(),
            "<em>one\ntwo</em>"
        );
        let err = emphasis_to_tags("fine\n\n*one\n\ntwo*").unwrap_err();
        assert!(matches!(
            err,
            TextError::UnbalancedEmphasis {
                paragraph: 2,
                tag: "<em>"
            }
        ));
    }

    #[test]
    fn unbalanced_bold() {
        assert!(matches!(
            emphasis_to_tags("**bold"),
            Err(TextError::UnbalancedEmphasis {
                paragraph: 1,
                tag: "<strong>"
            })
        ));
    }

    #[test]
    fn text_without_markers_is_unchanged() {
        let text = "Nothing to see.\n\nMove along.";
        assert_eq!(emphasis_to_tags(text).unwrap(), text);
    }
}
