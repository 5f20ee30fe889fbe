use crate::book::Book;
use crate::error::ConfigError;
use canvas_geometry::{
    CanvasRequest, GeometryError, Length, LengthUnit, Offset, PageSpan, PixelSize, Placement,
    TRIM_HEIGHT_IN,
};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The directory, within an input directory, holding images and their manifest
pub const IMAGES_DIRECTORY: &str = "Images";
/// The name of the image manifest file within the images directory
pub const IMAGE_MANIFEST_FILE: &str = "config.yaml";

/// The section of the manifest an image was declared in; each has its own subdirectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageGroup {
    /// covers
    Cover,
    /// front matter inserts
    Insert,
    /// title page, table of contents and filler
    Contents,
    /// one image per chapter
    Chapter,
}

impl ImageGroup {
    /// The subdirectory of the images directory holding this group's files
    pub const fn subdirectory(self) -> &'static str {
        match self {
            ImageGroup::Cover => "Cover",
            ImageGroup::Insert => "Insert",
            ImageGroup::Contents => "Contents",
            ImageGroup::Chapter => "Chapter",
        }
    }

    const fn manifest_key(self) -> &'static str {
        match self {
            ImageGroup::Cover => "cover",
            ImageGroup::Insert => "insert",
            ImageGroup::Contents => "contents",
            ImageGroup::Chapter => "chapter",
        }
    }
}

/// What an image is for within the book. This is independent of its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageRole {
    /// the front cover
    FrontCover,
    /// the back cover
    BackCover,
    /// the title page
    TitlePage,
    /// the table of contents
    Toc,
    /// a reusable placeholder
    Filler,
    /// an ordinary front matter insert
    Insert,
    /// a chapter's opening image
    Chapter,
}

impl ImageRole {
    /// whether this is one of the covers
    pub fn is_cover(self) -> bool {
        matches!(self, ImageRole::FrontCover | ImageRole::BackCover)
    }
}

/// Read an `image_type` tag into the geometry kind it implies (ignoring overlap)
/// and the role it labels
fn classify(tag: &str, group: ImageGroup) -> Option<(bool, ImageRole)> {
    let ordinary = if group == ImageGroup::Chapter {
        ImageRole::Chapter
    } else {
        ImageRole::Insert
    };
    let classified = match tag {
        "single" => (false, ordinary),
        "double" => (true, ordinary),
        "front_cover" => (false, ImageRole::FrontCover),
        "back_cover" => (false, ImageRole::BackCover),
        "filler" => (false, ImageRole::Filler),
        "titlepage" => (false, ImageRole::TitlePage),
        "toc" => (true, ImageRole::Toc),
        _ => return None,
    };
    Some(classified)
}

/// One declared image, measured
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    /// the filename, relative to the group's subdirectory
    pub filename: String,
    /// the manifest section it was declared in
    pub group: ImageGroup,
    /// what the image is for
    pub role: ImageRole,
    /// single page or spread, with any overlap
    pub span: PageSpan,
    /// the height the image is printed at, in inches
    pub height_in: f64,
    /// displacement from the centre of its canvas, in pixels
    pub offset: Offset,
    /// the measured raster size
    pub size: PixelSize,
}

impl ImageInfo {
    /// The filename without its extension; for chapter images, the chapter number
    pub fn title(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }

    /// The path relative to the images directory, e.g. `Chapter/3.png`
    pub fn relative_path(&self) -> PathBuf {
        Path::new(self.group.subdirectory()).join(&self.filename)
    }

    /// Whether this is a reusable placeholder
    pub fn is_filler(&self) -> bool {
        self.role == ImageRole::Filler
    }

    /// Whether this image spans two pages
    pub fn is_double(&self) -> bool {
        matches!(self.span, PageSpan::Double { .. })
    }

    /// Pixels per inch at the printed height
    pub fn px_per_in(&self) -> f64 {
        f64::from(self.size.height) / self.height_in
    }

    /// The geometry request for printing this image with `bleed_in` inches of bleed
    pub fn canvas_request(&self, bleed_in: f64) -> CanvasRequest {
        CanvasRequest {
            span: self.span,
            image: self.size,
            px_per_in: self.px_per_in(),
            bleed_in,
        }
    }

    /// The canvas and padding for printing this image with `bleed_in` inches of bleed
    pub fn placement(&self, bleed_in: f64) -> Result<Placement, GeometryError> {
        self.canvas_request(bleed_in).place(self.offset)
    }
}

/// Every image declared for a book, in declaration order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageManifest {
    /// the directory the manifest was loaded from
    pub directory: PathBuf,
    /// the front cover
    pub front_cover: Option<ImageInfo>,
    /// the back cover
    pub back_cover: Option<ImageInfo>,
    /// the title page
    pub titlepage: Option<ImageInfo>,
    /// the table of contents
    pub toc: Option<ImageInfo>,
    /// a filler declared among the contents images
    pub filler: Option<ImageInfo>,
    /// front matter inserts, which may themselves include filler
    pub inserts: Vec<ImageInfo>,
    /// chapter images, whose titles are chapter numbers
    pub chapters: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    cover: Mapping,
    #[serde(default)]
    insert: Mapping,
    #[serde(default)]
    contents: Mapping,
    #[serde(default)]
    chapter: Mapping,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    image_type: String,
    #[serde(default)]
    height: Option<Value>,
    #[serde(default)]
    offset: Option<Vec<Value>>,
    #[serde(default)]
    overlap: Option<Value>,
}

fn describe(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| format!("{:?}", value))
}

fn length_field<'a>(value: &'a Value, image: &str, field: &'static str) -> Result<&'a str, ConfigError> {
    value.as_str().ok_or_else(|| ConfigError::LengthNotString {
        image: image.to_string(),
        field,
        found: describe(value),
    })
}

fn pixels(value: &Value, image: &str, field: &'static str, px_per_in: f64) -> Result<i64, ConfigError> {
    let literal = length_field(value, image, field)?;
    literal
        .parse::<Length>()
        .and_then(|l| l.to_pixels(px_per_in))
        .map_err(|source| ConfigError::InvalidLength {
            image: image.to_string(),
            field,
            source,
        })
}

fn parse_image<F>(
    filename: String,
    raw: RawImage,
    group: ImageGroup,
    directory: &Path,
    probe: &mut F,
) -> Result<ImageInfo, ConfigError>
where
    F: FnMut(&Path) -> image::ImageResult<(u32, u32)>,
{
    let (double, role) = classify(&raw.image_type, group).ok_or_else(|| ConfigError::UnknownImageType {
        image: filename.clone(),
        tag: raw.image_type.clone(),
    })?;

    let height_in = match raw.height {
        None => TRIM_HEIGHT_IN,
        Some(ref value) => {
            let literal = length_field(value, &filename, "height")?;
            let length = literal
                .parse::<Length>()
                .map_err(|source| ConfigError::InvalidLength {
                    image: filename.clone(),
                    field: "height",
                    source,
                })?;
            let invalid = || ConfigError::InvalidHeight {
                image: filename.clone(),
                height: literal.to_string(),
            };
            if length.unit == LengthUnit::Pixels {
                return Err(invalid());
            }
            let inches = length.to_inches(1.0).map_err(|_| invalid())?;
            if inches <= 0.0 {
                return Err(invalid());
            }
            inches
        }
    };

    let path = directory.join(group.subdirectory()).join(&filename);
    let size: PixelSize = probe(&path)
        .map_err(|source| ConfigError::Measure {
            path: path.clone(),
            source,
        })?
        .into();
    let px_per_in = f64::from(size.height) / height_in;

    let offset = match raw.offset {
        None => Offset::default(),
        Some(ref values) if values.len() == 2 => Offset {
            x: pixels(&values[0], &filename, "offset", px_per_in)?,
            y: pixels(&values[1], &filename, "offset", px_per_in)?,
        },
        Some(ref values) => {
            return Err(ConfigError::OffsetArity {
                image: filename,
                found: values.len(),
            })
        }
    };

    let span = if double {
        let overlap_px = match raw.overlap {
            Some(ref value) => pixels(value, &filename, "overlap", px_per_in)?,
            None => 0,
        };
        PageSpan::Double { overlap_px }
    } else {
        PageSpan::Single
    };

    debug!(
        "{}: {}x{}px at {:.2}px/in",
        path.display(),
        size.width,
        size.height,
        px_per_in
    );

    Ok(ImageInfo {
        filename,
        group,
        role,
        span,
        height_in,
        offset,
        size,
    })
}

impl ImageManifest {
    /// Load `config.yaml` from `images_dir`, measuring every declared image
    pub fn load<P: AsRef<Path>>(images_dir: P) -> Result<Self, ConfigError> {
        Self::load_with(images_dir, |p: &Path| image::image_dimensions(p))
    }

    /// Load `config.yaml` from `images_dir`, measuring every declared image with `probe`
    pub fn load_with<P, F>(images_dir: P, probe: F) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        F: FnMut(&Path) -> image::ImageResult<(u32, u32)>,
    {
        let images_dir = images_dir.as_ref();
        let config_path = images_dir.join(IMAGE_MANIFEST_FILE);
        if !config_path.is_file() {
            return Err(ConfigError::MissingFile(config_path));
        }
        let src = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        Self::from_yaml_with(&src, images_dir, probe).map_err(|e| match e {
            ConfigError::Yaml { source, .. } => ConfigError::Yaml {
                path: config_path.clone(),
                source,
            },
            other => other,
        })
    }

    /// Parse a manifest; image paths are resolved against `directory`
    pub fn from_yaml_with<P, F>(src: &str, directory: P, mut probe: F) -> Result<Self, ConfigError>
    where
        P: Into<PathBuf>,
        F: FnMut(&Path) -> image::ImageResult<(u32, u32)>,
    {
        let directory = directory.into();
        let yaml_error = |source| ConfigError::Yaml {
            path: directory.join(IMAGE_MANIFEST_FILE),
            source,
        };
        let raw: RawManifest = serde_yaml::from_str(src).map_err(yaml_error)?;

        let mut manifest = ImageManifest {
            directory: directory.clone(),
            ..Default::default()
        };

        let groups = [
            (ImageGroup::Cover, raw.cover),
            (ImageGroup::Insert, raw.insert),
            (ImageGroup::Contents, raw.contents),
            (ImageGroup::Chapter, raw.chapter),
        ];
        for (group, entries) in groups {
            for (key, value) in entries {
                let filename = match key {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    other => return Err(ConfigError::ImageKey(describe(&other))),
                };
                let raw_image: RawImage = serde_yaml::from_value(value).map_err(yaml_error)?;
                let image = parse_image(filename, raw_image, group, &directory, &mut probe)?;
                manifest.place(image);
            }
        }
        Ok(manifest)
    }

    fn place(&mut self, image: ImageInfo) {
        match (image.group, image.role) {
            (ImageGroup::Insert, _) => self.inserts.push(image),
            (ImageGroup::Chapter, _) => self.chapters.push(image),
            (_, ImageRole::FrontCover) => self.front_cover = Some(image),
            (_, ImageRole::BackCover) => self.back_cover = Some(image),
            (_, ImageRole::TitlePage) => self.titlepage = Some(image),
            (_, ImageRole::Toc) => self.toc = Some(image),
            (_, ImageRole::Filler) => self.filler = Some(image),
            (group, role) => warn!(
                "ignoring {} declared as {:?} in the {} section",
                image.filename,
                role,
                group.manifest_key()
            ),
        }
    }

    /// The image for the chapter numbered `number`
    pub fn chapter_image(&self, number: usize) -> Option<&ImageInfo> {
        let title = number.to_string();
        self.chapters.iter().find(|image| image.title() == title)
    }

    /// Inserts which are not filler, in declaration order; these are the ones given their own pages
    pub fn non_filler_inserts(&self) -> impl Iterator<Item = &ImageInfo> {
        self.inserts.iter().filter(|i| i.role == ImageRole::Insert)
    }

    /// Every image which is printed, in the order they are generated
    pub fn all_images(&self) -> impl Iterator<Item = &ImageInfo> {
        self.inserts
            .iter()
            .chain(self.chapters.iter())
            .chain(self.front_cover.iter())
            .chain(self.back_cover.iter())
            .chain(self.titlepage.iter())
            .chain(self.toc.iter())
            .chain(self.filler.iter())
    }

    /// Absolute path of a declared image
    pub fn path_of(&self, image: &ImageInfo) -> PathBuf {
        self.directory.join(image.relative_path())
    }

    /// Check every chapter of `book` has an image
    pub fn check_chapters(&self, book: &Book) -> Result<(), ConfigError> {
        for chapter in book.chapters.iter() {
            if self.chapter_image(chapter.number).is_none() {
                return Err(ConfigError::MissingChapterImage(chapter.number));
            }
        }
        Ok(())
    }
}

/// Load a book and its image manifest from `input_dir`, checking they agree
pub fn load_project<P: AsRef<Path>>(input_dir: P) -> Result<(Book, ImageManifest), ConfigError> {
    let book = Book::load(input_dir)?;
    let manifest = ImageManifest::load(book.directory.join(IMAGES_DIRECTORY))?;
    manifest.check_chapters(&book)?;
    Ok((book, manifest))
}
