#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

//! Typeset a book as a print-ready pdf.
//!
//! Manuscript text is converted to LaTeX one part at a time, and `content.tex` lists
//! the parts and images in reading order; a main `.tex` file, supplied by the user,
//! pulls these in along with `config.tex`. xelatex then runs twice: once with a
//! directory of no-image stand-ins ahead on `TEXINPUTS`, and again, after the print
//! images have been generated, to place the real images.

use bindery_images::{prepare_print_images, print_placements, CompositorError};
use bindery_model::{Book, ConfigError, ImageManifest, TemplateError};
use std::env::{self, JoinPathsError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

mod content;
mod driver;
mod text;

pub use content::{image_path, part_tex_filename, LatexBook, CONFIG_FILE, CONTENT_FILE};
pub use driver::{
	command_line_for_version, detect_command_line, prepend_tex_inputs, InteractionMode, Invocation,
	MIKTEX_COMMAND_LINE, TEXLIVE_COMMAND_LINE,
};
pub use text::{format_text, ICON, ORNAMENT_RULE};

/// The subdirectory of the work directory xelatex writes into
pub const COMPILATION_DIRECTORY: &str = "CompilationDir";

/// Options for producing a pdf
#[derive(Debug, Clone, Default)]
pub struct LatexOptions {
	/// bleed around each page, in inches
	pub bleed_in: f64,
	/// extra inner margin for binding, in inches
	pub gutter_in: f64,
	/// leave the covers out
	pub no_cover: bool,
	/// reuse print images generated by an earlier run
	pub skip_images: bool,
	/// lay out the book without placing images, skipping the second pass
	pub dont_print_images: bool,
	/// a command line used in place of the detected one
	pub command_line: Option<String>,
	/// the main `.tex` file
	pub main_tex: Option<PathBuf>,
	/// a directory of stand-ins used by the first pass in place of images
	pub no_images_dir: Option<PathBuf>,
}

impl LatexOptions {
	/// Set the bleed, in inches
	pub fn bleed(&mut self, inches: f64) -> &mut Self {
		self.bleed_in = inches;
		self
	}

	/// Set the gutter, in inches
	pub fn gutter(&mut self, inches: f64) -> &mut Self {
		self.gutter_in = inches;
		self
	}

	/// Leave the covers out of the pdf
	pub fn no_cover(&mut self) -> &mut Self {
		self.no_cover = true;
		self
	}

	/// Use print images left by an earlier run
	pub fn skip_images(&mut self) -> &mut Self {
		self.skip_images = true;
		self
	}

	/// Do not place images in the pdf
	pub fn dont_print_images(&mut self) -> &mut Self {
		self.dont_print_images = true;
		self
	}

	/// Settings for a printer: 0.125in of bleed, a 0.15in gutter and no covers
	pub fn print_mode(&mut self) -> &mut Self {
		self.bleed(0.125).gutter(0.15).no_cover()
	}

	/// Call xelatex with this command line, which may use the placeholders
	/// `MODE`, `OUTPUT_DIRECTORY`, `JOB_NAME` and `TEX_FILE`
	pub fn command_line<S: Into<String>>(&mut self, command_line: S) -> &mut Self {
		self.command_line = Some(command_line.into());
		self
	}

	/// Set the main `.tex` file
	pub fn main_tex<P: Into<PathBuf>>(&mut self, main_tex: P) -> &mut Self {
		self.main_tex = Some(main_tex.into());
		self
	}

	/// Set the directory of stand-ins used while images are not placed
	pub fn no_images_dir<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
		self.no_images_dir = Some(dir.into());
		self
	}
}

/// Errors arising while producing a pdf
#[derive(Debug, Error)]
pub enum LatexError {
	/// the book or its images were not configured correctly
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// a template could not be expanded
	#[error(transparent)]
	Template(#[from] TemplateError),
	/// a print image could not be generated
	#[error(transparent)]
	Image(#[from] CompositorError),
	/// a manuscript file could not be read
	#[error("could not read manuscript {path}: {source}")]
	ReadText {
		/// the manuscript file
		path: PathBuf,
		/// the underlying error
		source: std::io::Error,
	},
	/// a generated file could not be written
	#[error("could not write {path}: {source}")]
	Write {
		/// the file or directory
		path: PathBuf,
		/// the underlying error
		source: std::io::Error,
	},
	/// `xelatex --version` could not be run
	#[error("could not run `xelatex --version` to detect the TeX distribution: {0}")]
	Detect(#[source] std::io::Error),
	/// xelatex could not be started
	#[error("could not run {program}: {source}")]
	Spawn {
		/// the program
		program: String,
		/// the underlying error
		source: std::io::Error,
	},
	/// the command line had nothing in it
	#[error("the xelatex command line is empty")]
	EmptyCommandLine,
	/// the command line has an unclosed quote or a trailing escape
	#[error("cannot split the xelatex command line `{0}`")]
	MalformedCommandLine(String),
	/// no main `.tex` file was given
	#[error("no main .tex file was given")]
	MissingMainTex,
	/// a directory could not be added to `TEXINPUTS`
	#[error("could not build TEXINPUTS: {0}")]
	TexInputs(#[from] JoinPathsError),
	/// the finished pdf could not be moved to the output directory
	#[error("could not move the pdf to {path}: {source}")]
	MovePdf {
		/// the destination
		path: PathBuf,
		/// the underlying error
		source: std::io::Error,
	},
}

pub(crate) fn write_file<C: AsRef<[u8]>>(path: &Path, contents: C) -> Result<(), LatexError> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).map_err(|source| LatexError::Write {
			path: parent.to_path_buf(),
			source,
		})?;
	}
	debug!("writing {}", path.display());
	fs::write(path, contents).map_err(|source| LatexError::Write {
		path: path.to_path_buf(),
		source,
	})
}

/// Typeset `book` into `output_dir`, using `work_dir` for generated sources and images.
///
/// Returns the path of the pdf, or `None` if xelatex did not produce one;
/// xelatex's own log in the compilation directory will say why.
pub fn render_pdf(
	book: &Book,
	images: &ImageManifest,
	output_dir: &Path,
	work_dir: &Path,
	options: &LatexOptions,
) -> Result<Option<PathBuf>, LatexError> {
	let main_tex = options.main_tex.as_deref().ok_or(LatexError::MissingMainTex)?;
	if !options.skip_images {
		print_placements(images, options.bleed_in)?;
	}
	LatexBook::new(book, images).write_sources(work_dir, options)?;

	let compilation_dir = work_dir.join(COMPILATION_DIRECTORY);
	fs::create_dir_all(&compilation_dir).map_err(|source| LatexError::Write {
		path: compilation_dir.clone(),
		source,
	})?;
	let job_name = book.output_stem();

	let command_line = match options.command_line {
		Some(ref command_line) => command_line.as_str(),
		None => detect_command_line()?,
	};
	let args = Invocation {
		command_line,
		mode: InteractionMode::from_log_level(),
		output_directory: &compilation_dir,
		job_name: &job_name,
		tex_file: main_tex,
	}
	.args()?;

	let existing = env::var_os("TEXINPUTS");
	let tex_inputs = prepend_tex_inputs(existing.as_deref(), &[work_dir, Path::new(".")])?;
	let first_pass_inputs = match options.no_images_dir {
		Some(ref dir) => prepend_tex_inputs(Some(tex_inputs.as_os_str()), &[dir.as_path()])?,
		None => tex_inputs.clone(),
	};
	let working_dir = main_tex
		.parent()
		.filter(|parent| !parent.as_os_str().is_empty())
		.unwrap_or_else(|| Path::new("."));

	info!("starting xelatex (first pass)");
	driver::run_pass(&args, &first_pass_inputs, working_dir)?;

	if !options.skip_images {
		prepare_print_images(images, work_dir, options.bleed_in)?;
	}

	if !options.dont_print_images {
		info!("starting xelatex (second pass)");
		driver::run_pass(&args, &tex_inputs, working_dir)?;
	}
	info!("finished xelatex");

	let pdf_name = format!("{}.pdf", job_name);
	let produced = compilation_dir.join(&pdf_name);
	if !produced.exists() {
		error!("no pdf was generated; see the log in {}", compilation_dir.display());
		return Ok(None);
	}
	fs::create_dir_all(output_dir).map_err(|source| LatexError::Write {
		path: output_dir.to_path_buf(),
		source,
	})?;
	let destination = output_dir.join(pdf_name);
	fs::rename(&produced, &destination).map_err(|source| LatexError::MovePdf {
		path: destination.clone(),
		source,
	})?;
	info!("wrote {}", destination.display());
	Ok(Some(destination))
}

#[cfg(test)]
mod tests {
	use super::*;
	use image::{Rgba, RgbaImage};

	fn write_book(dir: &Path) {
		fs::write(
			dir.join("config.yaml"),
			"volume_number: 2\nisbn: \"9780306406157\"\npublication_year: 2020\nshort_title: Tale\nchapters:\n  - {title: Start, subtitle: Here, parts: [{title: null}]}\n",
		)
		.unwrap();
		fs::create_dir_all(dir.join("Text")).unwrap();
		fs::write(dir.join("Text").join("1.md"), "Once...upon\n\n* * *\n\nA time.\n").unwrap();
		let images = dir.join("Images");
		fs::create_dir_all(images.join("Chapter")).unwrap();
		fs::write(images.join("config.yaml"), "chapter:\n  1.png: {image_type: single}\n").unwrap();
		RgbaImage::from_pixel(22, 33, Rgba([10, 20, 30, 255]))
			.save(images.join("Chapter").join("1.png"))
			.unwrap();
	}

	#[test]
	fn sources_are_written() {
		let input = tempfile::tempdir().unwrap();
		write_book(input.path());
		let (book, images) = bindery_model::load_project(input.path()).unwrap();
		let work = tempfile::tempdir().unwrap();
		LatexBook::new(&book, &images)
			.write_sources(work.path(), &LatexOptions::default())
			.unwrap();

		assert_eq!(
			fs::read_to_string(work.path().join("1.tex")).unwrap(),
			"Once{\\EllipsisSplittable}upon\n\n\\icon\n\n\\noindent\nA time."
		);
		assert_eq!(
			fs::read_to_string(work.path().join(CONTENT_FILE)).unwrap(),
			"\\insertSingleImage{Chapter/1.png}\n\n\\beginChapter{Start}{Here}\n\n\\insertPartText{1.tex}"
		);
		assert!(fs::read_to_string(work.path().join(CONFIG_FILE))
			.unwrap()
			.starts_with("\\newcommand{\\volumeNumberHeaderText}{Vol.2}"));
	}

	#[test]
	fn image_geometry_is_checked_before_anything_is_written() {
		let input = tempfile::tempdir().unwrap();
		write_book(input.path());
		RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255]))
			.save(input.path().join("Images").join("Chapter").join("1.png"))
			.unwrap();
		let (book, images) = bindery_model::load_project(input.path()).unwrap();
		let main_tex = input.path().join("Main.tex");
		fs::write(&main_tex, "").unwrap();

		let out = tempfile::tempdir().unwrap();
		let work_dir = out.path().join("work");
		let mut options = LatexOptions::default();
		options.main_tex(&main_tex).command_line("true");
		assert!(matches!(
			render_pdf(&book, &images, out.path(), &work_dir, &options),
			Err(LatexError::Image(CompositorError::Geometry { .. }))
		));
		assert!(!work_dir.exists());
	}

	#[test]
	fn a_main_tex_file_is_required() {
		let input = tempfile::tempdir().unwrap();
		write_book(input.path());
		let (book, images) = bindery_model::load_project(input.path()).unwrap();
		let out = tempfile::tempdir().unwrap();
		assert!(matches!(
			render_pdf(&book, &images, out.path(), &out.path().join("work"), &LatexOptions::default()),
			Err(LatexError::MissingMainTex)
		));
	}

	#[cfg(unix)]
	#[test]
	fn the_produced_pdf_is_moved_to_the_output_directory() {
		let input = tempfile::tempdir().unwrap();
		write_book(input.path());
		let (book, images) = bindery_model::load_project(input.path()).unwrap();
		let main_tex = input.path().join("Main.tex");
		fs::write(&main_tex, "\\input{config}\n\\input{content}\n").unwrap();

		let out = tempfile::tempdir().unwrap();
		let work_dir = out.path().join("WorkDir").join("TeX");
		let mut options = LatexOptions::default();
		// stands in for xelatex: "typesets" the main file by copying it
		options
			.main_tex(&main_tex)
			.command_line("cp {TEX_FILE} {OUTPUT_DIRECTORY}/{JOB_NAME}.pdf");

		let pdf = render_pdf(&book, &images, out.path(), &work_dir, &options)
			.unwrap()
			.unwrap();
		assert_eq!(pdf, out.path().join("Tale_v02.pdf"));
		assert_eq!(fs::read_to_string(&pdf).unwrap(), "\\input{config}\n\\input{content}\n");
		assert!(work_dir.join("Chapter").join("1.png").is_file());
		assert!(!work_dir.join(COMPILATION_DIRECTORY).join("Tale_v02.pdf").exists());
	}

	#[cfg(unix)]
	#[test]
	fn a_missing_pdf_is_not_an_error() {
		let input = tempfile::tempdir().unwrap();
		write_book(input.path());
		let (book, images) = bindery_model::load_project(input.path()).unwrap();
		let main_tex = input.path().join("Main.tex");
		fs::write(&main_tex, "").unwrap();

		let out = tempfile::tempdir().unwrap();
		let mut options = LatexOptions::default();
		options
			.main_tex(&main_tex)
			.command_line("true {TEX_FILE}")
			.skip_images()
			.dont_print_images();
		let result = render_pdf(&book, &images, out.path(), &out.path().join("work"), &options).unwrap();
		assert_eq!(result, None);
	}
}
