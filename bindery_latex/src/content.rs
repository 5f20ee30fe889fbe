//! The generated `.tex` files a book is typeset from: one per part, `content.tex`
//! listing them in reading order, and `config.tex` holding per-run settings.
use crate::text::format_text;
use crate::{write_file, LatexError, LatexOptions};
use bindery_common::escape_to_latex;
use bindery_model::{Book, Chapter, ConfigError, ImageInfo, ImageManifest, Part, Template, TemplateContext, TemplateError};
use std::fs;
use std::path::Path;
use tracing::info;

/// The file listing the book's content in reading order
pub const CONTENT_FILE: &str = "content.tex";
/// The file holding settings for this run
pub const CONFIG_FILE: &str = "config.tex";

/// extras: `PART_HEADING`, which is either empty or `[{number}. {title}]`
const CHAPTER_OPENING: &str = "\\beginChapter{PART_HEADING}{{{CHAPTER_TITLE}}}{{{CHAPTER_SUBTITLE}}}";
/// extras: `PART_NUMBER`, `PART_TITLE`
const PART_OPENING: &str = "\\beginPart{{{PART_NUMBER}. {PART_TITLE}}}";
/// extras: `FILE`
const PART_TEXT: &str = "\\insertPartText{{{FILE}}}";
/// extras: `PATH`
const SINGLE_IMAGE: &str = "\\insertSingleImage{{{PATH}}}";
/// extras: `PATH`
const DOUBLE_IMAGE: &str = "\\insertDoubleImage{{{PATH}}}";
/// extras: `PATH`
const COVER_IMAGE: &str = concat!(
	"\\insertSingleImage{{{PATH}}}\n\n",
	"\\newpage\\vspace*{{\\fill}}\\thispagestyle{{empty}}\\vspace*{{\\fill}}\\newpage",
);
/// extras: `BLEED`, `GUTTER`
const CONFIG: &str = concat!(
	"\\newcommand{{\\volumeNumberHeaderText}}{{Vol.{BOOK_VOLUME}}}\n",
	"\\newcommand{{\\bleedSize}}{{{BLEED}in}}\n",
	"\\newcommand{{\\gutterSize}}{{{GUTTER}in}}",
);
const DONT_PRINT_IMAGES: &str = "\\providecommand{\\dontPrintImages}{}";

/// The name of the `.tex` file generated for a part
pub fn part_tex_filename(part: &Part) -> String {
	format!("{}.tex", part.base_filename())
}

/// The path, relative to the work directory, an image's print version is written to;
/// always `/`-separated, as LaTeX expects
pub fn image_path(image: &ImageInfo) -> String {
	format!(
		"{}/{}",
		image.group.subdirectory(),
		Path::new(&image.filename).with_extension("png").to_string_lossy()
	)
}

/// A book, ready to be written out as LaTeX
#[derive(Debug)]
pub struct LatexBook<'a> {
	book: &'a Book,
	images: &'a ImageManifest,
	/// the book's chapters, with titles escaped for LaTeX
	chapters: Vec<Chapter>,
}

impl<'a> LatexBook<'a> {
	/// Prepare `book`, illustrated by `images`
	pub fn new(book: &'a Book, images: &'a ImageManifest) -> Self {
		let chapters = book
			.chapters
			.iter()
			.map(|chapter| Chapter {
				number: chapter.number,
				title: escape_to_latex(chapter.title.as_str()).into_owned(),
				subtitle: escape_to_latex(chapter.subtitle.as_str()).into_owned(),
				parts: chapter
					.parts
					.iter()
					.map(|part| {
						let mut part = part.clone();
						part.title = part.title.map(|title| escape_to_latex(title).into_owned());
						part
					})
					.collect(),
			})
			.collect();
		LatexBook {
			book,
			images,
			chapters,
		}
	}

	fn template<'t>(&self, text: &'t str) -> Template<'t, '_> {
		TemplateContext::new(&self.chapters, self.book.volume, &self.book.isbn).template(text)
	}

	/// The command which places `image`; covers are followed by a blank page,
	/// or left out entirely when `no_cover` is set
	pub fn image_command(&self, image: &ImageInfo, no_cover: bool) -> Result<String, TemplateError> {
		let template = if image.role.is_cover() {
			if no_cover {
				return Ok(String::new());
			}
			COVER_IMAGE
		} else if image.is_double() {
			DOUBLE_IMAGE
		} else {
			SINGLE_IMAGE
		};
		self.template(template).extra("PATH", image_path(image)).render()
	}

	fn part_text(&self, part: &Part) -> Result<String, TemplateError> {
		self.template(PART_TEXT).extra("FILE", part_tex_filename(part)).render()
	}

	/// The commands opening a chapter and inserting each of its parts
	fn chapter_commands(&self, chapter: &Chapter) -> Result<Vec<String>, TemplateError> {
		let mut commands = Vec::with_capacity(chapter.parts.len() * 2);
		let mut parts = chapter.parts.iter();
		if let Some(first) = parts.next() {
			let heading = match first.title {
				Some(ref title) => format!("[{}. {}]", first.number, title),
				None => String::new(),
			};
			commands.push(
				self.template(CHAPTER_OPENING)
					.start(chapter.number)
					.extra("PART_HEADING", heading)
					.render()?,
			);
			commands.push(self.part_text(first)?);
		}
		for part in parts {
			commands.push(
				self.template(PART_OPENING)
					.extra("PART_NUMBER", part.number)
					.extra("PART_TITLE", part.title.clone().unwrap_or_default())
					.render()?,
			);
			commands.push(self.part_text(part)?);
		}
		Ok(commands)
	}

	/// The contents of `content.tex`: every insert, then each chapter's image and text
	pub fn content_tex(&self, no_cover: bool) -> Result<String, LatexError> {
		let mut commands = Vec::new();
		for image in self.images.inserts.iter() {
			commands.push(self.image_command(image, no_cover)?);
		}
		for chapter in self.chapters.iter() {
			let image = self
				.images
				.chapter_image(chapter.number)
				.ok_or(ConfigError::MissingChapterImage(chapter.number))?;
			commands.push(self.image_command(image, no_cover)?);
			commands.extend(self.chapter_commands(chapter)?);
		}
		Ok(commands.join("\n\n"))
	}

	/// The contents of `config.tex`
	pub fn config_tex(&self, options: &LatexOptions) -> Result<String, TemplateError> {
		let mut config = self
			.template(CONFIG)
			.extra("BLEED", format!("{:?}", options.bleed_in))
			.extra("GUTTER", format!("{:?}", options.gutter_in))
			.render()?;
		if options.dont_print_images {
			config.push('\n');
			config.push_str(DONT_PRINT_IMAGES);
		}
		Ok(config)
	}

	/// Convert every part's manuscript and write it, `content.tex` and `config.tex` to `work_dir`
	pub fn write_sources(&self, work_dir: &Path, options: &LatexOptions) -> Result<(), LatexError> {
		info!("writing LaTeX sources to {}", work_dir.display());
		for part in self.book.chapters.iter().flat_map(|chapter| chapter.parts.iter()) {
			let path = self.book.part_path(part);
			let text = fs::read_to_string(&path).map_err(|source| LatexError::ReadText { path, source })?;
			write_file(&work_dir.join(part_tex_filename(part)), format_text(&text))?;
		}
		write_file(&work_dir.join(CONTENT_FILE), self.content_tex(options.no_cover)?)?;
		write_file(&work_dir.join(CONFIG_FILE), self.config_tex(options)?)?;
		Ok(())
	}
}
