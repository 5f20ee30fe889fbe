//! Turning the parts of a chapter into a sequence of documents.
use crate::markup::{process_line, Fragment, MarkupState};
use bindery_common::escape_to_html;
use bindery_model::{Chapter, Part};
use std::mem;

/// The fragments of one xhtml document
pub type Section = Vec<Fragment>;

/// Read every part of `chapter` with `read_part` and split the result into sections.
///
/// A chapter normally makes a single section. Each centered page closes the section
/// before it, even an empty one, and stands in a section of its own; the text after it
/// opens a fresh one. A chapter which opens with a centered page therefore leaves its
/// first section empty, so that the chapter title stands alone.
pub fn assemble_chapter<F, E>(chapter: &Chapter, mut read_part: F) -> Result<Vec<Section>, E>
where
    F: FnMut(&Part) -> Result<String, E>,
{
    let mut sections = Vec::new();
    let mut current: Section = Vec::new();
    let mut state = MarkupState::default();

    for part in chapter.parts.iter() {
        match part.title {
            None => state.first_of_chapter = true,
            Some(ref title) => {
                current.push(Fragment::SubpartHeader {
                    number: part.number,
                    title: escape_to_html(title).into_owned(),
                });
                state.after_subpart = true;
            }
        }

        let text = read_part(part)?;
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (fragment, next) = process_line(line, state);
            state = next;
            state.first_of_chapter = false;

            if state.after_split {
                sections.push(mem::take(&mut current));
                if let Some(fragment) = fragment {
                    sections.push(vec![fragment.split_off()]);
                }
                state.after_split = false;
            } else if let Some(fragment) = fragment {
                if current.is_empty() {
                    current.push(fragment.opening());
                } else {
                    current.push(fragment);
                }
            }
        }
    }

    if !current.is_empty() {
        sections.push(current);
    }
    Ok(sections)
}
