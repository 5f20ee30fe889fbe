//! Physical-to-pixel geometry for printed book images.
//!
//! Two pieces live here:
//!
//! - a length resolver, which reads literals such as `0.125in`, `3cm` or `12px`
//!   and converts them to inches or to whole pixels at a given resolution;
//! - the canvas engine, which works out the exact integer canvas an image must be
//!   composited onto for a page of the fixed trim size (plus bleed), and the
//!   padding which centres the image on that canvas.
//!
//! ```
//! use canvas_geometry::{CanvasRequest, Offset, PageSpan, PixelSize};
//!
//! let request = CanvasRequest {
//!     span: PageSpan::Single,
//!     image: PixelSize::new(1650, 2475),
//!     px_per_in: 300.0,
//!     bleed_in: 0.0,
//! };
//! let placement = request.place(Offset::default()).unwrap();
//! assert_eq!((placement.canvas.width, placement.canvas.height), (1650, 2475));
//! assert_eq!(placement.padding.left, 0);
//! ```
//!
//! Nothing here approximates silently: a request which cannot be satisfied is an error,
//! since an approximated canvas ships as a visibly misaligned page.
#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

mod canvas;
mod length;
pub use canvas::{
    Canvas, CanvasRequest, GeometryError, Offset, PageSpan, Padding, PixelSize, Placement,
    ASPECT_CORRECTION_LIMIT, TRIM_HEIGHT_IN, TRIM_WIDTH_IN,
};
pub use length::{resolve, InvalidLengthError, Length, LengthUnit};
