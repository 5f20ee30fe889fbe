use bindery::{build_epub, build_pdf, BinderyError, EpubOptions, LatexOptions};
use image::{Rgba, RgbaImage};
use std::fs::{self, File};
use std::path::Path;
use zip::CompressionMethod;

const BOOK: &str = "volume_number: 4
isbn: \"9780306406157\"
publication_year: 2022
title: Tales of the Sea
short_title: Tales
chapters:
  - title: The Beginning
    subtitle: In which things start
    parts:
      - title: null
  - title: Salt & Pepper
    subtitle: In which things continue
    parts:
      - title: Arrival
      - title: Departure
";

fn write_image(path: &Path, width: u32, height: u32) {
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	RgbaImage::from_pixel(width, height, Rgba([120, 80, 40, 255]))
		.save(path)
		.unwrap();
}

/// A two chapter book; `illustrated` adds a cover and inserts
fn write_book(dir: &Path, illustrated: bool) {
	fs::write(dir.join("config.yaml"), BOOK).unwrap();
	let text = dir.join("Text");
	fs::create_dir_all(&text).unwrap();
	fs::write(text.join("1.md"), "It began <em>quietly</em>...\n\n* * *\n\nThen loudly.\n").unwrap();
	fs::write(text.join("2.1.md"), "They came.\n\nAgain.\n").unwrap();
	fs::write(text.join("2.2.md"), "They left.\n").unwrap();

	let images = dir.join("Images");
	let mut manifest = String::new();
	if illustrated {
		manifest.push_str("cover:\n  front.png: {image_type: front_cover}\n");
		manifest.push_str("insert:\n  map.png: {image_type: double}\n  blank.png: {image_type: filler}\n");
		write_image(&images.join("Cover").join("front.png"), 22, 33);
		write_image(&images.join("Insert").join("map.png"), 44, 33);
		write_image(&images.join("Insert").join("blank.png"), 22, 33);
	}
	manifest.push_str("chapter:\n  1.png: {image_type: single}\n  2.png: {image_type: single}\n");
	write_image(&images.join("Chapter").join("1.png"), 22, 33);
	write_image(&images.join("Chapter").join("2.png"), 22, 33);
	fs::write(images.join("config.yaml"), manifest).unwrap();
}

#[test]
fn epub() {
	let input = tempfile::tempdir().unwrap();
	write_book(input.path(), true);
	let output = tempfile::tempdir().unwrap();

	let epub = build_epub(input.path(), output.path(), &EpubOptions::default()).unwrap();
	assert_eq!(epub, output.path().join("Tales_v04.epub"));

	let content = output.path().join("WorkDir").join("EPUB").join("OEBPS");
	for file in [
		"cover.xhtml",
		"insert001.xhtml",
		"toc.xhtml",
		"chapter001.xhtml",
		"chapter001a.xhtml",
		"chapter002.xhtml",
		"chapter002a.xhtml",
		"images/9780306406157.jpg",
		"images/insert001.jpg",
		"images/chapter002.jpg",
	] {
		assert!(content.join(file).is_file(), "{} is missing", file);
	}
	// filler inserts are print-only
	assert!(!content.join("insert002.xhtml").exists());

	let opening = fs::read_to_string(content.join("chapter002a.xhtml")).unwrap();
	assert!(opening.contains("Salt &amp; Pepper"));
	assert!(opening.contains("<p class=\"h1_co\">1. Arrival</p>"));
	assert!(opening.contains("<p class=\"h1_co1\">2. Departure</p>"));

	let mut archive = zip::ZipArchive::new(File::open(&epub).unwrap()).unwrap();
	let mimetype = archive.by_index(0).unwrap();
	assert_eq!(mimetype.name(), "mimetype");
	assert_eq!(mimetype.compression(), CompressionMethod::Stored);
	drop(mimetype);
	assert!(archive.by_name("OEBPS/package.opf").is_ok());
	assert!(archive.by_name("META-INF/container.xml").is_ok());
}

#[test]
fn generated_sections_convert_back_to_manuscript_text() {
	let input = tempfile::tempdir().unwrap();
	write_book(input.path(), false);
	let output = tempfile::tempdir().unwrap();
	build_epub(input.path(), output.path(), &EpubOptions::default()).unwrap();

	let section = output
		.path()
		.join("WorkDir")
		.join("EPUB")
		.join("OEBPS")
		.join("chapter002a.xhtml");
	let markdown = manuscript_text::xhtml_file_to_markdown(&section).unwrap();
	assert_eq!(
		fs::read_to_string(markdown).unwrap(),
		"# 1\n\nThey came.\n\nAgain.\n\n# 2\n\nThey left."
	);
}

#[test]
fn chapters_need_images() {
	let input = tempfile::tempdir().unwrap();
	write_book(input.path(), false);
	fs::write(
		input.path().join("Images").join("config.yaml"),
		"chapter:\n  1.png: {image_type: single}\n",
	)
	.unwrap();
	let output = tempfile::tempdir().unwrap();
	assert!(matches!(
		build_epub(input.path(), output.path(), &EpubOptions::default()),
		Err(BinderyError::Config(_))
	));
	assert!(!output.path().join("WorkDir").exists());
}

#[cfg(unix)]
#[test]
fn pdf() {
	let input = tempfile::tempdir().unwrap();
	write_book(input.path(), false);
	let main_tex = input.path().join("Main.tex");
	fs::write(&main_tex, "\\input{config}\n\\input{content}\n").unwrap();
	let output = tempfile::tempdir().unwrap();

	let mut options = LatexOptions::default();
	options
		.main_tex(&main_tex)
		.print_mode()
		.command_line("cp {TEX_FILE} {OUTPUT_DIRECTORY}/{JOB_NAME}.pdf");
	let pdf = build_pdf(input.path(), output.path(), &options).unwrap();
	assert_eq!(pdf, Some(output.path().join("Tales_v04.pdf")));

	let work = output.path().join("WorkDir").join("TeX");
	assert_eq!(
		fs::read_to_string(work.join("content.tex")).unwrap(),
		[
			"\\insertSingleImage{Chapter/1.png}",
			"\\beginChapter{The Beginning}{In which things start}",
			"\\insertPartText{1.tex}",
			"\\insertSingleImage{Chapter/2.png}",
			"\\beginChapter[1. Arrival]{Salt \\& Pepper}{In which things continue}",
			"\\insertPartText{2.1.tex}",
			"\\beginPart{2. Departure}",
			"\\insertPartText{2.2.tex}",
		]
		.join("\n\n")
	);
	assert_eq!(
		fs::read_to_string(work.join("config.tex")).unwrap(),
		"\\newcommand{\\volumeNumberHeaderText}{Vol.4}\n\\newcommand{\\bleedSize}{0.125in}\n\\newcommand{\\gutterSize}{0.15in}"
	);
	assert_eq!(
		fs::read_to_string(work.join("1.tex")).unwrap(),
		"It began \\textit{quietly}{\\Ellipsis}\n\n\\icon\n\n\\noindent\nThen loudly."
	);
	assert!(work.join("Chapter").join("2.png").is_file());
}
