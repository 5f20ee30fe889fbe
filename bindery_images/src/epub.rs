use crate::{CompositorError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// The largest governing dimension of an image in an epub
pub const EPUB_MAX_DIMENSION: u32 = 1800;

/// The size an image of `width` by `height` pixels is scaled to for an epub.
///
/// A spread is governed by its width, anything else by its height;
/// images already within bounds keep their size.
pub fn epub_dimensions(width: u32, height: u32, double: bool) -> (u32, u32) {
    let (governing, other) = if double { (width, height) } else { (height, width) };
    if governing <= EPUB_MAX_DIMENSION {
        return (width, height);
    }
    let scaled = (f64::from(other) * f64::from(EPUB_MAX_DIMENSION) / f64::from(governing))
        .round()
        .max(1.0) as u32;
    if double {
        (EPUB_MAX_DIMENSION, scaled)
    } else {
        (scaled, EPUB_MAX_DIMENSION)
    }
}

/// Convert `source` to a jpeg at `dest`, scaled down if need be
pub fn prepare_epub_image(source: &Path, dest: &Path, double: bool) -> Result<()> {
    let image = image::open(source).map_err(|e| CompositorError::Open {
        path: source.to_path_buf(),
        source: e,
    })?;
    let (width, height) = epub_dimensions(image.width(), image.height(), double);
    let image = if (width, height) == (image.width(), image.height()) {
        image
    } else {
        debug!(
            "scaling {} from {}x{} to {}x{}",
            source.display(),
            image.width(),
            image.height(),
            width,
            height
        );
        image.resize_exact(width, height, FilterType::Lanczos3)
    };

    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut output = Cursor::new(Vec::new());
    rgb.write_to(&mut output, ImageOutputFormat::Jpeg(100))
        .map_err(|e| CompositorError::Save {
            path: dest.to_path_buf(),
            source: e,
        })?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| CompositorError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(dest, output.into_inner()).map_err(|e| CompositorError::Io {
        path: dest.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn singles_are_governed_by_height() {
        assert_eq!(epub_dimensions(1650, 2475, false), (1200, 1800));
        assert_eq!(epub_dimensions(1000, 1800, false), (1000, 1800));
        assert_eq!(epub_dimensions(3000, 1500, false), (3000, 1500));
    }

    #[test]
    fn spreads_are_governed_by_width() {
        assert_eq!(epub_dimensions(3600, 2475, true), (1800, 1238));
        assert_eq!(epub_dimensions(1700, 2475, true), (1700, 2475));
    }

    #[test]
    fn writes_scaled_jpegs() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tall.png");
        RgbaImage::from_pixel(20, 3600, Rgba([10, 20, 30, 255]))
            .save(&source)
            .unwrap();
        let dest = dir.path().join("OEBPS").join("images").join("tall.jpg");
        prepare_epub_image(&source, &dest, false).unwrap();
        assert_eq!(image::image_dimensions(&dest).unwrap(), (10, 1800));
        assert_eq!(
            image::ImageFormat::from_path(&dest).unwrap(),
            image::ImageFormat::Jpeg
        );
    }
}
