use crate::{CompositorError, Result};
use bindery_model::{ImageInfo, ImageManifest};
use canvas_geometry::Placement;
use image::{ImageFormat, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bring `image` to the canvas of `placement`.
///
/// Each output pixel takes the value of the nearest source pixel, so positive padding
/// repeats the edges of the image outward and negative padding drops that many
/// pixels from its side.
pub fn extend_to_canvas(image: &RgbaImage, placement: &Placement) -> RgbaImage {
    let width = placement.canvas.width.max(1) as u32;
    let height = placement.canvas.height.max(1) as u32;
    let max_x = i64::from(image.width()) - 1;
    let max_y = i64::from(image.height()) - 1;
    let left = placement.padding.left;
    let top = placement.padding.top;

    RgbaImage::from_fn(width, height, |x, y| {
        let sx = (i64::from(x) - left).clamp(0, max_x);
        let sy = (i64::from(y) - top).clamp(0, max_y);
        *image.get_pixel(sx as u32, sy as u32)
    })
}

/// Open `source`, bring it to the canvas of `placement` and save it to `dest` as png
pub fn compose_print_image(source: &Path, dest: &Path, placement: &Placement) -> Result<()> {
    let image = image::open(source)
        .map_err(|e| CompositorError::Open {
            path: source.to_path_buf(),
            source: e,
        })?
        .to_rgba8();
    let composed = extend_to_canvas(&image, placement);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| CompositorError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    composed
        .save_with_format(dest, ImageFormat::Png)
        .map_err(|e| CompositorError::Save {
            path: dest.to_path_buf(),
            source: e,
        })
}

/// Where the print version of `image` is written within `work_dir`:
/// its manifest path, with a png extension
pub fn print_image_path(work_dir: &Path, image: &ImageInfo) -> PathBuf {
    work_dir.join(image.relative_path()).with_extension("png")
}

/// Lay out every manifest image for print with `bleed_in` inches of bleed, failing on
/// the first image whose geometry cannot be satisfied
pub fn print_placements(manifest: &ImageManifest, bleed_in: f64) -> Result<Vec<(&ImageInfo, Placement)>> {
    manifest
        .all_images()
        .map(|image| {
            image
                .placement(bleed_in)
                .map(|placement| (image, placement))
                .map_err(|e| CompositorError::Geometry {
                    path: manifest.path_of(image),
                    source: e,
                })
        })
        .collect()
}

/// Compose every manifest image for print with `bleed_in` inches of bleed,
/// returning the paths written
pub fn prepare_print_images(
    manifest: &ImageManifest,
    work_dir: &Path,
    bleed_in: f64,
) -> Result<Vec<PathBuf>> {
    info!("generating print images");
    let mut written = Vec::new();
    for (image, placement) in print_placements(manifest, bleed_in)? {
        let padding = placement.padding;
        debug!(
            "{}: canvas {}x{}px, padding left {} right {} top {} bottom {}",
            image.relative_path().display(),
            placement.canvas.width,
            placement.canvas.height,
            padding.left,
            padding.right,
            padding.top,
            padding.bottom
        );
        let dest = print_image_path(work_dir, image);
        compose_print_image(&manifest.path_of(image), &dest, &placement)?;
        written.push(dest);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_geometry::{Canvas, Padding};
    use image::Rgba;

    fn two_tone() -> RgbaImage {
        // left column red, right column blue
        RgbaImage::from_fn(2, 2, |x, _| {
            if x == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    fn placement(width: i64, height: i64, padding: Padding) -> Placement {
        Placement {
            canvas: Canvas { width, height },
            padding,
        }
    }

    #[test]
    fn padding_repeats_edges() {
        let out = extend_to_canvas(
            &two_tone(),
            &placement(
                6,
                4,
                Padding {
                    left: 2,
                    right: 2,
                    top: 1,
                    bottom: 1,
                },
            ),
        );
        assert_eq!(out.dimensions(), (6, 4));
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(2, 1), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(3, 2), &Rgba([0, 0, 255, 255]));
        assert_eq!(out.get_pixel(5, 3), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn negative_padding_crops() {
        let out = extend_to_canvas(
            &two_tone(),
            &placement(
                1,
                2,
                Padding {
                    left: -1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                },
            ),
        );
        assert_eq!(out.dimensions(), (1, 2));
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn composes_from_and_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.png");
        two_tone().save(&source).unwrap();
        let dest = dir.path().join("out").join("Insert").join("in.png");
        compose_print_image(
            &source,
            &dest,
            &placement(
                4,
                2,
                Padding {
                    left: 1,
                    right: 1,
                    top: 0,
                    bottom: 0,
                },
            ),
        )
        .unwrap();
        assert_eq!(image::image_dimensions(&dest).unwrap(), (4, 2));
    }

    #[test]
    fn placements_are_checked_for_every_image() {
        let yaml = "chapter:\n  1.png: {image_type: single}\n  2.png: {image_type: single}\n";
        let manifest = ImageManifest::from_yaml_with(yaml, "/book/Images", |path: &Path| {
            if path.ends_with("2.png") {
                Ok((1, 1))
            } else {
                Ok((1650, 2475))
            }
        })
        .unwrap();
        let err = print_placements(&manifest, 0.0).unwrap_err();
        assert!(matches!(
            err,
            CompositorError::Geometry { ref path, .. } if path.ends_with("Chapter/2.png")
        ));

        let fine = ImageManifest::from_yaml_with(yaml, "/book/Images", |_: &Path| Ok((1650, 2475))).unwrap();
        let placements = print_placements(&fine, 0.0).unwrap();
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].1.padding, Padding::default());
    }

    #[test]
    fn missing_sources_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = compose_print_image(
            &dir.path().join("absent.png"),
            &dir.path().join("out.png"),
            &placement(1, 1, Padding::default()),
        )
        .unwrap_err();
        assert!(matches!(err, CompositorError::Open { .. }));
    }
}
