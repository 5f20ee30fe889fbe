use thiserror::Error;

/// Width of the trimmed portrait page, in inches
pub const TRIM_WIDTH_IN: f64 = 5.5;
/// Height of the trimmed portrait page, in inches
pub const TRIM_HEIGHT_IN: f64 = 8.25;
/// The most times the height of a single-page canvas will be reduced
/// while bringing its aspect ratio up to that of the trim
pub const ASPECT_CORRECTION_LIMIT: usize = 8;

/// Whether an image occupies one page or a spread of two facing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageSpan {
    /// a single page
    #[default]
    Single,
    /// two facing pages, whose combined width is reduced by `overlap_px`
    Double {
        /// pixels removed from the combined width of the spread
        overlap_px: i64,
    },
}

/// The measured size of a raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelSize {
    /// width in pixels
    pub width: u32,
    /// height in pixels
    pub height: u32,
}

impl PixelSize {
    /// a size of `width` by `height` pixels
    pub const fn new(width: u32, height: u32) -> Self {
        PixelSize { width, height }
    }
}

impl From<(u32, u32)> for PixelSize {
    fn from((width, height): (u32, u32)) -> Self {
        PixelSize::new(width, height)
    }
}

/// A displacement of the image from the centre of its canvas, in pixels.
/// Positive `x` moves the image right; positive `y` moves it down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Offset {
    /// horizontal displacement
    pub x: i64,
    /// vertical displacement
    pub y: i64,
}

/// The size of the canvas an image is to be composited onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Canvas {
    /// width in pixels
    pub width: i64,
    /// height in pixels
    pub height: i64,
}

/// Pixels to add on each side of an image to bring it to its canvas size.
/// A negative value means that side is cropped instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Padding {
    /// added to the left edge
    pub left: i64,
    /// added to the right edge
    pub right: i64,
    /// added to the top edge
    pub top: i64,
    /// added to the bottom edge
    pub bottom: i64,
}

/// A canvas and the padding which places an image on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    /// the canvas
    pub canvas: Canvas,
    /// the padding
    pub padding: Padding,
}

/// Ways in which an image's resolution cannot satisfy the page geometry
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// pixels per inch was zero, negative or not a number
    #[error("cannot lay out an image at {0} pixels per inch")]
    NonPositiveResolution(f64),
    /// bleed was negative or not a number
    #[error("bleed must be a non-negative number of inches, not {0}")]
    InvalidBleed(f64),
    /// the computed canvas has no area
    #[error("computed canvas of {width}x{height}px is empty")]
    EmptyCanvas {
        /// computed width
        width: i64,
        /// computed height
        height: i64,
    },
    /// canvas and image differ by an odd number of pixels and cannot be centred evenly
    #[error("canvas of {canvas}px cannot evenly surround an image of {image}px")]
    Parity {
        /// the canvas dimension
        canvas: i64,
        /// the image dimension
        image: i64,
    },
    /// the single page canvas could not be brought to the trim aspect ratio
    #[error(
        "canvas of {width}x{height}px is still narrower than the trim after {} corrections",
        ASPECT_CORRECTION_LIMIT
    )]
    AspectNonConvergent {
        /// width at the point of giving up
        width: i64,
        /// height at the point of giving up
        height: i64,
    },
}

/// Everything needed to lay out one image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRequest {
    /// single page or spread
    pub span: PageSpan,
    /// the measured size of the image
    pub image: PixelSize,
    /// the resolution of the image as it is to be printed
    pub px_per_in: f64,
    /// bleed added to every side of the trim, in inches
    pub bleed_in: f64,
}

/// Subtract one from `canvas` if it differs from `image` by an odd number
fn correct_parity(canvas: i64, image: i64) -> i64 {
    if (canvas - image) % 2 != 0 {
        canvas - 1
    } else {
        canvas
    }
}

fn narrower_than_trim(width: i64, height: i64) -> bool {
    (width as f64 / height as f64) < (TRIM_WIDTH_IN / TRIM_HEIGHT_IN)
}

/// Reduce `height` two pixels at a time until `width / height` is no less than the
/// trim ratio, giving up after `limit` reductions
fn fit_aspect(width: i64, mut height: i64, limit: usize) -> Result<i64, GeometryError> {
    let mut steps = 0;
    while narrower_than_trim(width, height) {
        if steps == limit || height <= 2 {
            return Err(GeometryError::AspectNonConvergent { width, height });
        }
        height -= 2;
        steps += 1;
    }
    Ok(height)
}

impl CanvasRequest {
    fn check_inputs(&self) -> Result<(), GeometryError> {
        if !(self.px_per_in.is_finite() && self.px_per_in > 0.0) {
            return Err(GeometryError::NonPositiveResolution(self.px_per_in));
        }
        if !(self.bleed_in.is_finite() && self.bleed_in >= 0.0) {
            return Err(GeometryError::InvalidBleed(self.bleed_in));
        }
        Ok(())
    }

    /// Compute the canvas this image must be composited onto.
    ///
    /// The canvas is the trim (doubled in width for a spread) plus bleed on every
    /// side, converted to whole pixels; each dimension then differs from the image's
    /// by an even number of pixels, and a single page canvas is never proportionally
    /// narrower than the trim.
    pub fn canvas(&self) -> Result<Canvas, GeometryError> {
        self.check_inputs()?;
        let image_w = i64::from(self.image.width);
        let image_h = i64::from(self.image.height);

        let base_w = match self.span {
            PageSpan::Single => TRIM_WIDTH_IN,
            PageSpan::Double { .. } => TRIM_WIDTH_IN * 2.0,
        };
        let full_w = (base_w + 2.0 * self.bleed_in) * self.px_per_in;
        let full_h = (TRIM_HEIGHT_IN + 2.0 * self.bleed_in) * self.px_per_in;
        let full_w = match self.span {
            PageSpan::Single => full_w,
            PageSpan::Double { overlap_px } => full_w - overlap_px as f64,
        };

        let width = correct_parity(full_w.floor() as i64, image_w);
        let mut height = correct_parity(full_h.floor() as i64, image_h);
        if width <= 0 || height <= 0 {
            return Err(GeometryError::EmptyCanvas { width, height });
        }

        if self.span == PageSpan::Single {
            height = fit_aspect(width, height, ASPECT_CORRECTION_LIMIT)?;
        }

        if (width - image_w) % 2 != 0 {
            return Err(GeometryError::Parity {
                canvas: width,
                image: image_w,
            });
        }
        if (height - image_h) % 2 != 0 {
            return Err(GeometryError::Parity {
                canvas: height,
                image: image_h,
            });
        }
        Ok(Canvas { width, height })
    }

    /// Compute the canvas and the padding which centres the image on it,
    /// displaced by `offset`
    pub fn place(&self, offset: Offset) -> Result<Placement, GeometryError> {
        let canvas = self.canvas()?;
        let base_w = (canvas.width - i64::from(self.image.width)) / 2;
        let base_h = (canvas.height - i64::from(self.image.height)) / 2;
        let padding = Padding {
            left: base_w + offset.x,
            right: base_w - offset.x,
            top: base_h + offset.y,
            bottom: base_h - offset.y,
        };
        Ok(Placement { canvas, padding })
    }
}
