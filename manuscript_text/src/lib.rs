//! Tools for getting manuscripts into the shape the bindery expects:
//!
//! - converting markdown emphasis markers to the inline tags manuscripts use
//! - splitting a single-file manuscript into part files, and combining them again
//! - recovering manuscript text from a generated chapter section
#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

mod emphasis;
mod unified;
mod xhtml;

pub use emphasis::{emphasis_to_tags, RULE};
pub use unified::{combine_directory, combine_parts, split_file, split_unified};
pub use xhtml::{blocks_to_markdown, parse_section, xhtml_to_markdown, Block};

/// Errors arising while preparing manuscripts
#[derive(Debug, Error)]
pub enum TextError {
    /// a paragraph opened an emphasis tag it did not close
    #[error("paragraph {paragraph} leaves a {tag} tag open")]
    UnbalancedEmphasis {
        /// the 1-based paragraph number
        paragraph: usize,
        /// the tag left open
        tag: &'static str,
    },
    /// a line of xhtml was not recognised
    #[error("unaccounted for markup: `{0}`")]
    UnknownTag(String),
    /// a single-file manuscript had text before its first part header
    #[error("text before the first part header: `{0}`")]
    TextBeforeFirstHeader(String),
    /// a file or directory could not be read
    #[error("could not read {path}: {source}")]
    Read {
        /// the file or directory
        path: PathBuf,
        /// the underlying error
        source: std::io::Error,
    },
    /// a file could not be written
    #[error("could not write {path}: {source}")]
    Write {
        /// the file
        path: PathBuf,
        /// the underlying error
        source: std::io::Error,
    },
}

pub(crate) fn read_file(path: &Path) -> Result<String, TextError> {
    fs::read_to_string(path).map_err(|source| TextError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_file<C: AsRef<[u8]>>(path: &Path, contents: C) -> Result<(), TextError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| TextError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    debug!("writing {}", path.display());
    fs::write(path, contents).map_err(|source| TextError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert the emphasis markers of the markdown file `input`, writing the result to `output`
pub fn convert_emphasis_file(input: &Path, output: &Path) -> Result<(), TextError> {
    let text = read_file(input)?;
    write_file(output, emphasis_to_tags(&text)?)
}

/// Convert the section document `input` back to manuscript text, written next to it
/// with an `.md` extension; returns the path written
pub fn xhtml_file_to_markdown(input: &Path) -> Result<PathBuf, TextError> {
    let markdown = xhtml_to_markdown(&read_file(input)?)?;
    let output = input.with_extension("md");
    write_file(&output, markdown)?;
    Ok(output)
}
