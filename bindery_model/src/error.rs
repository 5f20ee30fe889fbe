use bindery_common::IsbnError;
use canvas_geometry::InvalidLengthError;
use std::path::PathBuf;
use thiserror::Error;

/// Problems with a book's configuration; all of these are raised before any output is written
#[derive(Debug, Error)]
pub enum ConfigError {
    /// a required file or directory does not exist
    #[error("{} does not exist", .0.display())]
    MissingFile(PathBuf),
    /// a file exists but could not be read
    #[error("could not read {}: {source}", path.display())]
    Read {
        /// the file
        path: PathBuf,
        /// the underlying error
        #[source]
        source: std::io::Error,
    },
    /// a configuration file is not valid yaml, or is missing required keys
    #[error("could not parse {}: {source}", path.display())]
    Yaml {
        /// the file
        path: PathBuf,
        /// the underlying error
        #[source]
        source: serde_yaml::Error,
    },
    /// the book's isbn is not a valid ISBN-13
    #[error("invalid isbn: {0}")]
    Isbn(#[from] IsbnError),
    /// a chapter was declared without any parts
    #[error("chapter {0} has no parts")]
    EmptyChapter(usize),
    /// a key in the image manifest is not a string filename
    #[error("image manifest keys must be filenames, found `{0}`")]
    ImageKey(String),
    /// an image was declared with an `image_type` outside the known vocabulary
    #[error("unexpected image type `{tag}` for {image}")]
    UnknownImageType {
        /// the image filename
        image: String,
        /// the unrecognised tag
        tag: String,
    },
    /// a length field was given as something other than a string, such as a bare number
    #[error("{field} of {image} must be a string with a unit, such as \"0.5in\"; found `{found}`")]
    LengthNotString {
        /// the image filename
        image: String,
        /// the field
        field: &'static str,
        /// what was found instead
        found: String,
    },
    /// a length field could not be resolved
    #[error("{field} of {image}: {source}")]
    InvalidLength {
        /// the image filename
        image: String,
        /// the field
        field: &'static str,
        /// the underlying error
        #[source]
        source: InvalidLengthError,
    },
    /// an image height was expressed in pixels or resolved to a non-positive length
    #[error("height of {image} must be a positive physical length, not `{height}`")]
    InvalidHeight {
        /// the image filename
        image: String,
        /// the offending literal
        height: String,
    },
    /// an offset which was not a list of exactly two lengths
    #[error("offset of {image} must be a list of two lengths; found {found} entries")]
    OffsetArity {
        /// the image filename
        image: String,
        /// the number of entries found
        found: usize,
    },
    /// the raster dimensions of an image could not be read
    #[error("could not measure {}: {source}", path.display())]
    Measure {
        /// the image
        path: PathBuf,
        /// the underlying error
        #[source]
        source: image::ImageError,
    },
    /// no image was declared for a chapter
    #[error("no image declared for chapter {0}")]
    MissingChapterImage(usize),
}

/// Problems expanding a template
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// a placeholder which is neither built in nor supplied as an extra
    #[error("unknown placeholder `{{{0}}}`")]
    UnknownPlaceholder(String),
    /// a chapter placeholder was resolved against a counter with no matching chapter
    #[error("`{{{placeholder}}}` refers to chapter {counter}, but there are {chapters} chapters")]
    CounterOutOfRange {
        /// the placeholder name
        placeholder: String,
        /// the counter value it was resolved against
        counter: usize,
        /// how many chapters there are
        chapters: usize,
    },
    /// a brace which does not open or close a placeholder
    #[error("malformed template at byte {position}: {reason}")]
    Malformed {
        /// byte offset into the template
        position: usize,
        /// what went wrong
        reason: &'static str,
    },
    /// a format spec which is not zero padding, or zero padding applied to text
    #[error("cannot format `{placeholder}` with `:{spec}`")]
    BadFormatSpec {
        /// the placeholder name
        placeholder: String,
        /// the format spec
        spec: String,
    },
    /// an extra replacement which would hide a built in placeholder
    #[error("`{0}` is a built in placeholder and cannot be supplied as an extra")]
    ShadowedPlaceholder(String),
}
