//! This crate turns a book's manuscript and image manifest into an epub 3 work tree:
//! a directory holding `mimetype`, `META-INF/container.xml` and an `OEBPS` directory with
//! every document, image and stylesheet, ready to be zipped by `epub_bundler`.
//!
//! Manuscript lines are converted one at a time by [`process_line`], whose state is
//! threaded explicitly from line to line; [`assemble_chapter`] collects the results into
//! sections, each of which becomes a lettered document (`chapter003a.xhtml`,
//! `chapter003b.xhtml`...). Everything else is expanded from templates by [`EpubBook`].
#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

use bindery_images::{prepare_epub_image, CompositorError};
use bindery_model::{ConfigError, TemplateError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

mod assembly;
mod markup;
mod pages;
mod templates;

pub use assembly::{assemble_chapter, Section};
pub use markup::{
    process_line, Fragment, MarkupState, ParagraphClass, LINE_BREAK_MARKER, ORNAMENT_IMAGE,
    ORNAMENT_MARKER,
};
pub use pages::{
    Document, EpubBook, EpubImage, FrontMatterEntry, ManifestItem, NAV_HREF, NCX_HREF,
    PACKAGE_HREF, STYLESHEET_HREF, TOC_HREF,
};

static DEFAULT_CSS: &str = include_str!("default_css.css");
static DEFAULT_ORNAMENT: &str = include_str!("ornament.svg");

/// The directory, within a work tree, holding the epub's content
pub const CONTENT_DIRECTORY: &str = "OEBPS";
/// The contents of the `mimetype` file
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// Options for writing an epub work tree
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Custom css, used in place of the default stylesheet
    pub css: Option<PathBuf>,
    /// A directory whose contents are copied into the epub's content directory
    pub assets: Option<PathBuf>,
}

impl Options {
    /// Set custom css to use
    pub fn css<P: Into<PathBuf>>(&mut self, css: P) -> &mut Self {
        self.css = Some(css.into());
        self
    }

    /// Set a directory of fonts, stylesheets and other files to include
    pub fn assets<P: Into<PathBuf>>(&mut self, assets: P) -> &mut Self {
        self.assets = Some(assets.into());
        self
    }
}

/// Errors arising while producing an epub
#[derive(Debug, Error)]
pub enum RenderingError {
    /// the book or its images were not configured correctly
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// a manuscript file could not be read
    #[error("could not read manuscript {path}: {source}")]
    ReadText {
        /// the manuscript file
        path: PathBuf,
        /// the underlying error
        source: std::io::Error,
    },
    /// a file in the work tree could not be written
    #[error("could not write {path}: {source}")]
    Write {
        /// the file or directory
        path: PathBuf,
        /// the underlying error
        source: std::io::Error,
    },
    /// an asset could not be copied
    #[error("could not copy asset {path}: {source}")]
    Asset {
        /// the asset
        path: PathBuf,
        /// the underlying error
        source: std::io::Error,
    },
    /// a page template could not be expanded
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// an image could not be converted
    #[error(transparent)]
    Image(#[from] CompositorError),
    /// a chapter was split into more documents than can be lettered
    #[error("chapter {chapter} is split into {sections} documents; at most 26 are supported")]
    TooManySections {
        /// the chapter number
        chapter: usize,
        /// how many sections it has
        sections: usize,
    },
    /// the modification time could not be formatted
    #[error("could not format the modification time: {0}")]
    Timestamp(#[from] time::error::Format),
}

fn write_file<C: AsRef<[u8]>>(path: &Path, contents: C) -> Result<(), RenderingError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| RenderingError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    debug!("writing {}", path.display());
    fs::write(path, contents).map_err(|source| RenderingError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy the contents of `source` into `dest`, collecting the paths copied relative to
/// the top of the copy, `/`-separated and in name order
fn copy_assets(source: &Path, dest: &Path, prefix: &str, copied: &mut Vec<String>) -> Result<(), RenderingError> {
    let asset_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| RenderingError::Asset { path, source }
    };
    let mut entries = fs::read_dir(source)
        .and_then(|entries| entries.collect::<Result<Vec<_>, _>>())
        .map_err(asset_error(source))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let href = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", prefix, name)
        };
        let path = entry.path();
        let target = dest.join(&name);
        if path.is_dir() {
            copy_assets(&path, &target, &href, copied)?;
        } else {
            fs::create_dir_all(dest).map_err(|source| RenderingError::Write {
                path: dest.to_path_buf(),
                source,
            })?;
            fs::copy(&path, &target).map_err(asset_error(&path))?;
            debug!("copied asset {}", href);
            copied.push(href);
        }
    }
    Ok(())
}

/// Write `epub` as a work tree at `work_dir`, replacing anything already there
pub fn write_work_tree(epub: &EpubBook<'_>, work_dir: &Path, options: &Options) -> Result<(), RenderingError> {
    if work_dir.exists() {
        fs::remove_dir_all(work_dir).map_err(|source| RenderingError::Write {
            path: work_dir.to_path_buf(),
            source,
        })?;
    }
    let content = work_dir.join(CONTENT_DIRECTORY);
    write_file(&work_dir.join("mimetype"), EPUB_MIMETYPE)?;
    write_file(
        &work_dir.join("META-INF").join("container.xml"),
        templates::CONTAINER_XML,
    )?;

    let mut assets = Vec::new();
    if let Some(ref dir) = options.assets {
        info!("copying assets from {}", dir.display());
        copy_assets(dir, &content, "", &mut assets)?;
    }
    let stylesheet = content.join(STYLESHEET_HREF);
    if let Some(ref css) = options.css {
        if let Some(parent) = stylesheet.parent() {
            fs::create_dir_all(parent).map_err(|source| RenderingError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::copy(css, &stylesheet).map_err(|source| RenderingError::Asset {
            path: css.clone(),
            source,
        })?;
    } else if !assets.iter().any(|a| a == STYLESHEET_HREF) {
        write_file(&stylesheet, DEFAULT_CSS)?;
    }
    if !assets.iter().any(|a| a == ORNAMENT_IMAGE) {
        write_file(&content.join(ORNAMENT_IMAGE), DEFAULT_ORNAMENT)?;
    }

    info!("resizing images");
    for image in epub.images()? {
        prepare_epub_image(
            &epub.image_source(&image),
            &content.join(&image.href),
            image.source.is_double(),
        )?;
    }

    for document in epub.documents()? {
        write_file(&content.join(&document.href), document.contents)?;
    }
    write_file(&content.join(NAV_HREF), epub.nav()?)?;
    write_file(&content.join(NCX_HREF), epub.toc_ncx()?)?;
    write_file(&content.join(PACKAGE_HREF), epub.package_opf(&assets)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_model::{Book, ImageManifest};
    use image::{Rgba, RgbaImage};

    fn write_book(dir: &Path) {
        fs::write(
            dir.join("config.yaml"),
            "volume_number: 1\nisbn: \"9780306406157\"\npublication_year: 2020\nchapters:\n  - {title: Start, subtitle: Here, parts: [{title: null}]}\n",
        )
        .unwrap();
        fs::create_dir_all(dir.join("Text")).unwrap();
        fs::write(dir.join("Text").join("1.md"), "Once.\n\n* * *\n\nTwice.\n").unwrap();
        let images = dir.join("Images");
        fs::create_dir_all(images.join("Chapter")).unwrap();
        fs::write(images.join("config.yaml"), "chapter:\n  1.png: {image_type: single}\n").unwrap();
        RgbaImage::from_pixel(4, 6, Rgba([200, 100, 50, 255]))
            .save(images.join("Chapter").join("1.png"))
            .unwrap();
    }

    #[test]
    fn writes_a_complete_tree() {
        let input = tempfile::tempdir().unwrap();
        write_book(input.path());
        let book = Book::load(input.path()).unwrap();
        let images = ImageManifest::load(input.path().join("Images")).unwrap();
        let epub = EpubBook::read(&book, &images).unwrap();

        let assets = tempfile::tempdir().unwrap();
        fs::create_dir_all(assets.path().join("fonts")).unwrap();
        fs::write(assets.path().join("fonts").join("body.otf"), b"font").unwrap();

        let work = tempfile::tempdir().unwrap();
        let work_dir = work.path().join("epub");
        let mut options = Options::default();
        options.assets(assets.path());
        write_work_tree(&epub, &work_dir, &options).unwrap();

        assert_eq!(fs::read_to_string(work_dir.join("mimetype")).unwrap(), EPUB_MIMETYPE);
        assert!(work_dir.join("META-INF").join("container.xml").is_file());
        let content = work_dir.join(CONTENT_DIRECTORY);
        for file in [
            "css/stylesheet.css",
            "images/ornament.svg",
            "images/chapter001.jpg",
            "fonts/body.otf",
            "toc.xhtml",
            "chapter001.xhtml",
            "chapter001a.xhtml",
            "nav.xhtml",
            "toc.ncx",
            "package.opf",
        ] {
            assert!(content.join(file).is_file(), "{} is missing", file);
        }
        let chapter = fs::read_to_string(content.join("chapter001a.xhtml")).unwrap();
        assert!(chapter.contains("<p class=\"cotx1a\">Once.</p>"));
        assert!(chapter.contains("src=\"images/ornament.svg\""));
        assert!(chapter.contains("<p class=\"tx\">Twice.</p>"));
        let package = fs::read_to_string(content.join("package.opf")).unwrap();
        assert!(package.contains("href=\"fonts/body.otf\" media-type=\"application/vnd.ms-opentype\""));
    }

    #[test]
    fn replaces_existing_trees_and_custom_css() {
        let input = tempfile::tempdir().unwrap();
        write_book(input.path());
        let book = Book::load(input.path()).unwrap();
        let images = ImageManifest::load(input.path().join("Images")).unwrap();
        let epub = EpubBook::read(&book, &images).unwrap();

        let work = tempfile::tempdir().unwrap();
        fs::write(work.path().join("stale.txt"), "old").unwrap();
        let css = input.path().join("custom.css");
        fs::write(&css, "p { color: red; }").unwrap();
        let mut options = Options::default();
        options.css(&css);
        write_work_tree(&epub, work.path(), &options).unwrap();

        assert!(!work.path().join("stale.txt").exists());
        assert_eq!(
            fs::read_to_string(work.path().join(CONTENT_DIRECTORY).join(STYLESHEET_HREF)).unwrap(),
            "p { color: red; }"
        );
    }

    #[test]
    fn missing_manuscripts_are_reported() {
        let input = tempfile::tempdir().unwrap();
        write_book(input.path());
        fs::remove_file(input.path().join("Text").join("1.md")).unwrap();
        let book = Book::load(input.path()).unwrap();
        let images = ImageManifest::load(input.path().join("Images")).unwrap();
        assert!(matches!(
            EpubBook::read(&book, &images),
            Err(RenderingError::ReadText { .. })
        ));
    }
}
