//! The model of a book as the bindery sees it.
//!
//! An input directory looks like this:
//!
//! ```text
//! config.yaml          volume, isbn, chapters and their parts
//! Text/1.md            manuscript of a single-part chapter 1
//! Text/2.1.md          manuscript of part 1 of chapter 2
//! Images/config.yaml   the image manifest
//! Images/Cover/...
//! Images/Insert/...
//! Images/Contents/...
//! Images/Chapter/1.png one image per chapter, named by chapter number
//! ```
//!
//! Both configuration files are read once, up front; every image in the manifest is
//! measured while it is loaded, so a missing or unreadable image is reported before
//! anything is written.
//!
//! The [`template`] module expands the placeholder templates pages are generated from.
#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

mod book;
mod error;
mod images;
pub mod template;

pub use book::{Book, BookMetadata, Chapter, Part, BOOK_CONFIG_FILE, TEXT_DIRECTORY};
pub use error::{ConfigError, TemplateError};
pub use images::{
    load_project, ImageGroup, ImageInfo, ImageManifest, ImageRole, IMAGES_DIRECTORY,
    IMAGE_MANIFEST_FILE,
};
pub use template::{Numbering, Template, TemplateContext, TemplateValue};
