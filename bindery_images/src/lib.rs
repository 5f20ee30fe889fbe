//! Raster work for the bindery.
//!
//! Print output needs every manifest image brought to the canvas its geometry calls for:
//! margins are filled by extending the image's edge pixels outward, and negative
//! padding crops that side instead. Epub output needs the images a reader sees
//! converted to jpeg and scaled down to a sensible size.
#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

use canvas_geometry::GeometryError;
use std::path::PathBuf;
use thiserror::Error;

mod epub;
mod print;

pub use epub::{epub_dimensions, prepare_epub_image, EPUB_MAX_DIMENSION};
pub use print::{compose_print_image, extend_to_canvas, prepare_print_images, print_image_path, print_placements};

/// Errors arising while preparing images
#[derive(Debug, Error)]
pub enum CompositorError {
    /// an image could not be opened or decoded
    #[error("could not open image {path}: {source}")]
    Open {
        /// the image
        path: PathBuf,
        /// the underlying error
        source: image::ImageError,
    },
    /// an image could not be encoded or written
    #[error("could not write image {path}: {source}")]
    Save {
        /// the destination
        path: PathBuf,
        /// the underlying error
        source: image::ImageError,
    },
    /// a directory could not be created, or a file written
    #[error("could not write {path}: {source}")]
    Io {
        /// the path being written
        path: PathBuf,
        /// the underlying error
        source: std::io::Error,
    },
    /// an image's resolution cannot satisfy the page geometry
    #[error("cannot lay out {path}: {source}")]
    Geometry {
        /// the image
        path: PathBuf,
        /// the underlying error
        source: GeometryError,
    },
}

/// Results of image preparation
pub type Result<T> = std::result::Result<T, CompositorError>;
