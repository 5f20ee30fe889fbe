#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! Bindery produces a print-ready pdf and an epub of one volume of an illustrated
//! serial novel, from a single input directory.
//!
//! # The input directory
//!
//! ```text
//! input/
//! ├── config.yaml
//! ├── Text/
//! │   ├── 1.md
//! │   ├── 2.1.md
//! │   └── 2.2.md
//! └── Images/
//!     ├── config.yaml
//!     ├── Cover/
//!     ├── Insert/
//!     ├── Contents/
//!     └── Chapter/
//! ```
//!
//! `config.yaml` describes the volume:
//!
//! ```yaml
//! volume_number: 3
//! isbn: "9780306406157"
//! publication_year: 2021
//! title: Tales of the Sea
//! short_title: Tales
//! chapters:
//!   - title: The Beginning
//!     subtitle: In which things start
//!     parts:
//!       - title: null
//!   - title: The Middle
//!     subtitle: In which things continue
//!     parts:
//!       - title: Arrival
//!       - title: Departure
//! ```
//!
//! A chapter with a single part reads its text from `Text/{chapter}.md`; a chapter
//! with several reads `Text/{chapter}.{part}.md` for each. Manuscript text is
//! markdown-ish: paragraphs separated by blank lines, a few inline tags such as `<em>`,
//! `* * *` for a scene break and `<br/>` for extra space.
//!
//! `Images/config.yaml` lists the images of each group in the order they appear:
//!
//! ```yaml
//! cover:
//!   front.jpg: {image_type: front_cover}
//!   back.jpg: {image_type: back_cover}
//! insert:
//!   map.png: {image_type: double, overlap: "0.2in"}
//!   crew.png: {image_type: single, offset: ["0in", "-40px"]}
//! contents:
//!   toc.png: {image_type: toc}
//! chapter:
//!   1.png: {image_type: single}
//!   2.png: {image_type: single, height: "8.5in"}
//! ```
//!
//! Every chapter needs an image named after its number.
//!
//! # Output
//!
//! [`build_epub`] writes `{short_title}_v{volume}.epub` and [`build_pdf`] writes
//! `{short_title}_v{volume}.pdf` to the output directory; intermediate files are kept
//! under its `WorkDir` subdirectory so later runs can reuse them.
//!
//! The pdf is typeset with xelatex, which must be installed, from a main `.tex` file
//! supplied with [`LatexOptions::main_tex`].

use bindery_epub::{write_work_tree, EpubBook, RenderingError};
use bindery_latex::render_pdf;
use bindery_model::{load_project, ConfigError};
use canvas_geometry::{resolve, InvalidLengthError, LengthUnit};
use epub_bundler::{write_epub, EpubBundlingError};
use manuscript_text::TextError;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub use bindery_epub::Options as EpubOptions;
pub use bindery_latex::{LatexError, LatexOptions};

/// The subdirectory of the output directory holding intermediate files
pub const WORK_DIRECTORY: &str = "WorkDir";

/// Errors arising while producing a book
#[derive(Debug, Error)]
pub enum BinderyError {
	/// the book or its images were not configured correctly
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// the epub work tree could not be produced
	#[error(transparent)]
	Epub(#[from] RenderingError),
	/// the epub work tree could not be zipped
	#[error(transparent)]
	Bundling(#[from] EpubBundlingError),
	/// the pdf could not be produced
	#[error(transparent)]
	Latex(#[from] LatexError),
	/// a manuscript could not be prepared
	#[error(transparent)]
	Text(#[from] TextError),
	/// a length given as an option was invalid
	#[error(transparent)]
	Length(#[from] InvalidLengthError),
	/// the current directory could not be determined
	#[error("could not determine the current directory: {0}")]
	CurrentDirectory(#[source] std::io::Error),
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, BinderyError>;

/// Parse a length such as `0.125in` or `0.3cm` as a number of inches.
///
/// Pixel lengths are rejected, since there is no resolution to measure them against.
pub fn parse_inches(literal: &str) -> std::result::Result<f64, InvalidLengthError> {
	resolve(literal, LengthUnit::Inches, 0.0)
}

fn absolute(path: &Path) -> Result<PathBuf> {
	if path.is_absolute() {
		Ok(path.to_path_buf())
	} else {
		env::current_dir()
			.map(|cwd| cwd.join(path))
			.map_err(BinderyError::CurrentDirectory)
	}
}

/// The directory intermediate files for `target` are written to
pub fn work_directory(output_dir: &Path, target: &str) -> PathBuf {
	output_dir.join(WORK_DIRECTORY).join(target)
}

/// Produce an epub of the book in `input_dir`, returning the path of the file written
pub fn build_epub<I: AsRef<Path>, O: AsRef<Path>>(input_dir: I, output_dir: O, options: &EpubOptions) -> Result<PathBuf> {
	let (book, images) = load_project(input_dir)?;
	let epub = EpubBook::read(&book, &images)?;
	let output_dir = output_dir.as_ref();
	let work_dir = work_directory(output_dir, "EPUB");
	info!("writing epub work tree to {}", work_dir.display());
	write_work_tree(&epub, &work_dir, options)?;
	let output = output_dir.join(format!("{}.epub", book.output_stem()));
	write_epub(&work_dir, &output)?;
	Ok(output)
}

/// Produce a pdf of the book in `input_dir`.
///
/// Returns the path of the pdf, or `None` if xelatex ran but did not produce one.
pub fn build_pdf<I: AsRef<Path>, O: AsRef<Path>>(
	input_dir: I,
	output_dir: O,
	options: &LatexOptions,
) -> Result<Option<PathBuf>> {
	let (book, images) = load_project(input_dir)?;
	let output_dir = absolute(output_dir.as_ref())?;
	let work_dir = work_directory(&output_dir, "TeX");
	Ok(render_pdf(&book, &images, &output_dir, &work_dir, options)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lengths_are_read_as_inches() {
		assert_eq!(parse_inches("0.125in"), Ok(0.125));
		assert_eq!(parse_inches("2.54cm"), Ok(1.0));
		assert_eq!(parse_inches("0.0in"), Ok(0.0));
		assert!(parse_inches("10px").is_err());
		assert!(parse_inches("0.125").is_err());
	}

	#[test]
	fn work_directories_are_nested() {
		assert_eq!(
			work_directory(Path::new("out"), "TeX"),
			Path::new("out").join("WorkDir").join("TeX")
		);
	}

	#[test]
	fn relative_paths_are_made_absolute() {
		assert!(absolute(Path::new("out")).unwrap().is_absolute());
		let root = env::temp_dir();
		assert_eq!(absolute(&root).unwrap(), root);
	}

	#[test]
	fn configuration_errors_are_passed_on() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(
			build_epub(dir.path(), dir.path().join("out"), &EpubOptions::default()),
			Err(BinderyError::Config(_))
		));
	}
}
