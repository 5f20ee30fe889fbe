use crate::assembly::{assemble_chapter, Section};
use crate::markup::ORNAMENT_IMAGE;
use crate::templates::*;
use crate::RenderingError;
use bindery_common::{escape_to_html, section_letter, GuessMimeType, MimeType};
use bindery_model::{Book, Chapter, ConfigError, ImageInfo, ImageManifest, Template, TemplateContext};
use std::fs;
use std::path::PathBuf;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, warn};
use uuid::Uuid;

/// Where the stylesheet lives within the epub
pub const STYLESHEET_HREF: &str = "css/stylesheet.css";
/// The navigation document
pub const NAV_HREF: &str = "nav.xhtml";
/// The ncx table of contents, for older readers
pub const NCX_HREF: &str = "toc.ncx";
/// The table of contents page
pub const TOC_HREF: &str = "toc.xhtml";
/// The package document
pub const PACKAGE_HREF: &str = "package.opf";

const COVER_PAGE_HREF: &str = "cover.xhtml";
const TITLE_PAGE_HREF: &str = "titlepage.xhtml";
const COVER_IMAGE_ID: &str = "cover-image";

/// A document listed before the chapters in tables of contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatterEntry {
    /// how it is labelled
    pub label: &'static str,
    /// the document
    pub href: String,
    /// its `epub:type` among the landmarks, if it is one
    pub landmark: Option<&'static str>,
}

/// A generated xhtml document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// its manifest id
    pub id: String,
    /// its path within the epub
    pub href: String,
    /// the xhtml
    pub contents: String,
}

/// A manifest image which appears in the epub
#[derive(Debug, Clone, PartialEq)]
pub struct EpubImage<'a> {
    /// the declared image
    pub source: &'a ImageInfo,
    /// its manifest id
    pub id: String,
    /// its path within the epub
    pub href: String,
}

/// An entry in the package manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    /// its id
    pub id: String,
    /// its path within the epub
    pub href: String,
    /// its media type
    pub media_type: &'static str,
    /// its properties, if any
    pub properties: Option<&'static str>,
}

/// A book with its text assembled into sections, ready to be written as an epub.
///
/// Every list this produces (documents, images, table of contents entries, manifest
/// items) is derived from the same chapters, sections and images, so they always agree.
#[derive(Debug)]
pub struct EpubBook<'a> {
    book: &'a Book,
    images: &'a ImageManifest,
    chapters: Vec<Chapter>,
    sections: Vec<Vec<Section>>,
    title: String,
    identifier: Uuid,
    modified: OffsetDateTime,
}

impl<'a> EpubBook<'a> {
    /// Wrap already assembled sections, one list per chapter in order
    pub fn new(book: &'a Book, images: &'a ImageManifest, sections: Vec<Vec<Section>>) -> Self {
        let chapters = book
            .chapters
            .iter()
            .map(|chapter| Chapter {
                title: escape_to_html(chapter.title.as_str()).into_owned(),
                subtitle: escape_to_html(chapter.subtitle.as_str()).into_owned(),
                ..chapter.clone()
            })
            .collect();
        EpubBook {
            book,
            images,
            chapters,
            sections,
            title: escape_to_html(book.display_title()).into_owned(),
            identifier: Uuid::new_v4(),
            modified: OffsetDateTime::now_utc(),
        }
    }

    /// Read and assemble the manuscript of every chapter
    pub fn read(book: &'a Book, images: &'a ImageManifest) -> Result<Self, RenderingError> {
        let sections = book
            .chapters
            .iter()
            .map(|chapter| {
                assemble_chapter(chapter, |part| {
                    let path = book.part_path(part);
                    debug!("reading {}", path.display());
                    fs::read_to_string(&path).map_err(|source| RenderingError::ReadText { path, source })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(book, images, sections))
    }

    /// Use a particular identifier rather than a random one
    pub fn with_identifier(mut self, identifier: Uuid) -> Self {
        self.identifier = identifier;
        self
    }

    /// Use a particular modification time rather than now
    pub fn with_modified(mut self, modified: OffsetDateTime) -> Self {
        self.modified = modified;
        self
    }

    /// The unique identifier of this epub
    pub fn identifier(&self) -> Uuid {
        self.identifier
    }

    /// Where the source of `image` is found
    pub fn image_source(&self, image: &EpubImage<'_>) -> PathBuf {
        self.images.path_of(image.source)
    }

    /// The sections of each chapter, in order
    pub fn sections(&self) -> &[Vec<Section>] {
        &self.sections
    }

    fn template<'t>(&self, text: &'t str) -> Template<'t, '_> {
        TemplateContext::new(&self.chapters, self.book.volume, &self.book.isbn)
            .template(text)
            .extra("BOOK_TITLE", self.title.as_str())
            .extra("LANGUAGE", self.book.metadata.language.as_str())
    }

    /// Documents listed before the chapters, in reading order
    pub fn front_matter(&self) -> Result<Vec<FrontMatterEntry>, RenderingError> {
        let mut entries = Vec::new();
        if self.images.front_cover.is_some() {
            entries.push(FrontMatterEntry {
                label: "Cover",
                href: COVER_PAGE_HREF.to_string(),
                landmark: Some("cover"),
            });
        }
        if self.images.non_filler_inserts().next().is_some() {
            entries.push(FrontMatterEntry {
                label: "Inserts",
                href: self.template(INSERT_PAGE_HREF).render()?,
                landmark: None,
            });
        }
        if self.images.titlepage.is_some() {
            entries.push(FrontMatterEntry {
                label: "Title Page",
                href: TITLE_PAGE_HREF.to_string(),
                landmark: Some("titlepage"),
            });
        }
        entries.push(FrontMatterEntry {
            label: "Contents",
            href: TOC_HREF.to_string(),
            landmark: Some("toc"),
        });
        Ok(entries)
    }

    /// Every image the epub shows: cover, title page, inserts which are not filler
    /// (numbered without gaps) and one per chapter
    pub fn images(&self) -> Result<Vec<EpubImage<'a>>, RenderingError> {
        let manifest: &'a ImageManifest = self.images;
        let mut images = Vec::new();
        if let Some(cover) = manifest.front_cover.as_ref() {
            images.push(EpubImage {
                source: cover,
                id: COVER_IMAGE_ID.to_string(),
                href: self.template(COVER_IMAGE_HREF).render()?,
            });
        }
        if let Some(titlepage) = manifest.titlepage.as_ref() {
            images.push(EpubImage {
                source: titlepage,
                id: "titlepage-image".to_string(),
                href: TITLEPAGE_IMAGE_HREF.to_string(),
            });
        }
        for (i, insert) in manifest.non_filler_inserts().enumerate() {
            let number = i + 1;
            images.push(EpubImage {
                source: insert,
                id: format!("insert{:03}-image", number),
                href: self.template(INSERT_IMAGE_HREF).start(number).render()?,
            });
        }
        for chapter in self.chapters.iter() {
            let image = manifest
                .chapter_image(chapter.number)
                .ok_or(ConfigError::MissingChapterImage(chapter.number))?;
            images.push(EpubImage {
                source: image,
                id: format!("chapter{:03}-image", chapter.number),
                href: self.template(CHAPTER_IMAGE_HREF).start(chapter.number).render()?,
            });
        }
        Ok(images)
    }

    fn section_page(
        &self,
        chapter: usize,
        letter: char,
        first: bool,
        section: &Section,
    ) -> Result<String, RenderingError> {
        let mut page = self
            .template(SECTION_OPEN)
            .start(chapter)
            .extra("LETTER", letter)
            .render()?;
        if first {
            page.push_str(&self.template(CHAPTER_HEADER).start(chapter).render()?);
        }
        for fragment in section.iter() {
            page.push_str(&fragment.render());
            page.push('\n');
        }
        page.push_str(&self.template(SECTION_CLOSE).render()?);
        Ok(page)
    }

    /// Every xhtml document in reading order, which is also the order of the spine
    pub fn documents(&self) -> Result<Vec<Document>, RenderingError> {
        let mut documents = Vec::new();

        if self.images.front_cover.is_some() {
            let image = self.template(COVER_IMAGE_HREF).render()?;
            documents.push(Document {
                id: "cover".to_string(),
                href: COVER_PAGE_HREF.to_string(),
                contents: self.template(COVER_PAGE).extra("HREF", image).render()?,
            });
        }

        let inserts = self.images.non_filler_inserts().count();
        for number in 1..=inserts {
            let image = self.template(INSERT_IMAGE_HREF).start(number).render()?;
            documents.push(Document {
                id: format!("insert{:03}", number),
                href: self.template(INSERT_PAGE_HREF).start(number).render()?,
                contents: self
                    .template(INSERT_PAGE)
                    .start(number)
                    .extra("HREF", image)
                    .render()?,
            });
        }

        if self.images.titlepage.is_some() {
            documents.push(Document {
                id: "titlepage".to_string(),
                href: TITLE_PAGE_HREF.to_string(),
                contents: self
                    .template(TITLE_PAGE)
                    .extra("HREF", TITLEPAGE_IMAGE_HREF)
                    .render()?,
            });
        }

        documents.push(Document {
            id: "toc".to_string(),
            href: TOC_HREF.to_string(),
            contents: self.toc_page()?,
        });

        for (chapter, sections) in self.chapters.iter().zip(self.sections.iter()) {
            let number = chapter.number;
            let image = self.template(CHAPTER_IMAGE_HREF).start(number).render()?;
            documents.push(Document {
                id: format!("chapter{:03}", number),
                href: self.template(CHAPTER_PAGE_HREF).start(number).render()?,
                contents: self
                    .template(CHAPTER_IMAGE_PAGE)
                    .start(number)
                    .extra("HREF", image)
                    .render()?,
            });
            for (i, section) in sections.iter().enumerate() {
                let letter = section_letter(i).ok_or(RenderingError::TooManySections {
                    chapter: number,
                    sections: sections.len(),
                })?;
                documents.push(Document {
                    id: format!("chapter{:03}{}", number, letter),
                    href: self
                        .template(SECTION_PAGE_HREF)
                        .start(number)
                        .extra("LETTER", letter)
                        .render()?,
                    contents: self.section_page(number, letter, i == 0, section)?,
                });
            }
        }
        Ok(documents)
    }

    fn toc_page(&self) -> Result<String, RenderingError> {
        let mut entries = String::new();
        for entry in self.front_matter()?.iter().filter(|e| e.href != TOC_HREF) {
            entries.push_str(
                &self
                    .template(TOC_FRONT_ENTRY)
                    .extra("HREF", entry.href.as_str())
                    .extra("LABEL", entry.label)
                    .render()?,
            );
        }
        entries.push_str(&self.template(TOC_CHAPTER_ENTRY).render_each(self.chapters.iter())?);
        Ok(self.template(TOC_PAGE).extra("ENTRIES", entries).render()?)
    }

    /// The navigation document, with its table of contents and landmarks
    pub fn nav(&self) -> Result<String, RenderingError> {
        let mut entries = String::new();
        let mut landmarks = String::new();
        for entry in self.front_matter()?.iter() {
            entries.push_str(
                &self
                    .template(NAV_ENTRY)
                    .extra("HREF", entry.href.as_str())
                    .extra("LABEL", entry.label)
                    .render()?,
            );
            if let Some(kind) = entry.landmark {
                landmarks.push_str(
                    &self
                        .template(NAV_LANDMARK)
                        .extra("TYPE", kind)
                        .extra("HREF", entry.href.as_str())
                        .extra("LABEL", entry.label)
                        .render()?,
                );
            }
        }
        entries.push_str(&self.template(NAV_CHAPTER_ENTRY).render_each(self.chapters.iter())?);
        if !self.chapters.is_empty() {
            let first_chapter = self.template(CHAPTER_PAGE_HREF).render()?;
            landmarks.push_str(
                &self
                    .template(NAV_LANDMARK)
                    .extra("TYPE", "bodymatter")
                    .extra("HREF", first_chapter)
                    .extra("LABEL", "Begin Reading")
                    .render()?,
            );
        }
        Ok(self
            .template(NAV_PAGE)
            .extra("ENTRIES", entries)
            .extra("LANDMARKS", landmarks)
            .render()?)
    }

    /// The ncx table of contents; play order runs through the front matter, then the chapters
    pub fn toc_ncx(&self) -> Result<String, RenderingError> {
        let front = self.front_matter()?;
        let mut points = String::new();
        for (i, entry) in front.iter().enumerate() {
            points.push_str(
                &self
                    .template(NCX_FRONT_POINT)
                    .start(i + 1)
                    .extra("HREF", entry.href.as_str())
                    .extra("LABEL", entry.label)
                    .render()?,
            );
        }
        for chapter in self.chapters.iter() {
            points.push_str(
                &self
                    .template(NCX_CHAPTER_POINT)
                    .start(chapter.number)
                    .extra("PLAY_ORDER", front.len() + chapter.number)
                    .render()?,
            );
        }
        Ok(self
            .template(TOC_NCX)
            .extra("IDENTIFIER", self.identifier.to_string())
            .extra("NAV_POINTS", points)
            .render()?)
    }

    /// Every file in the package manifest: navigation, stylesheet, ornament, documents,
    /// images and then `assets` (paths relative to the content directory) which are not
    /// already listed. Assets whose media type cannot be guessed are left out.
    pub fn manifest_items(&self, assets: &[String]) -> Result<Vec<ManifestItem>, RenderingError> {
        let mut items = vec![
            ManifestItem {
                id: "nav".to_string(),
                href: NAV_HREF.to_string(),
                media_type: MimeType::Xhtml.media_type(),
                properties: Some("nav"),
            },
            ManifestItem {
                id: "ncx".to_string(),
                href: NCX_HREF.to_string(),
                media_type: MimeType::Ncx.media_type(),
                properties: None,
            },
            ManifestItem {
                id: "stylesheet".to_string(),
                href: STYLESHEET_HREF.to_string(),
                media_type: MimeType::Css.media_type(),
                properties: None,
            },
            ManifestItem {
                id: "ornament".to_string(),
                href: ORNAMENT_IMAGE.to_string(),
                media_type: MimeType::Svg.media_type(),
                properties: None,
            },
        ];
        for document in self.documents()? {
            items.push(ManifestItem {
                id: document.id,
                href: document.href,
                media_type: MimeType::Xhtml.media_type(),
                properties: None,
            });
        }
        for image in self.images()? {
            let properties = if image.id == COVER_IMAGE_ID {
                Some("cover-image")
            } else {
                None
            };
            items.push(ManifestItem {
                id: image.id,
                href: image.href,
                media_type: MimeType::Jpeg.media_type(),
                properties,
            });
        }
        let mut asset_number = 0;
        for asset in assets.iter() {
            if items.iter().any(|item| &item.href == asset) {
                continue;
            }
            match asset.guess_mime() {
                Some(mime) => {
                    asset_number += 1;
                    items.push(ManifestItem {
                        id: format!("asset{:03}", asset_number),
                        href: asset.clone(),
                        media_type: mime.media_type(),
                        properties: None,
                    });
                }
                None => warn!("leaving {} out of the package manifest: unknown media type", asset),
            }
        }
        Ok(items)
    }

    /// The package document
    pub fn package_opf(&self, assets: &[String]) -> Result<String, RenderingError> {
        let metadata = &self.book.metadata;
        let mut optional = String::new();
        for (i, creator) in metadata.creators.iter().enumerate() {
            optional.push_str(
                &self
                    .template(OPF_CREATOR)
                    .start(i + 1)
                    .extra("NAME", escape_to_html(creator.as_str()).into_owned())
                    .render()?,
            );
        }
        if let Some(ref publisher) = metadata.publisher {
            optional.push_str(
                &self
                    .template(OPF_PUBLISHER)
                    .extra("NAME", escape_to_html(publisher.as_str()).into_owned())
                    .render()?,
            );
        }
        if self.images.front_cover.is_some() {
            optional.push_str(&self.template(OPF_COVER_META).extra("ID", COVER_IMAGE_ID).render()?);
        }

        let mut items = String::new();
        for item in self.manifest_items(assets)? {
            let properties = item
                .properties
                .map(|p| format!(" properties=\"{}\"", p))
                .unwrap_or_default();
            items.push_str(
                &self
                    .template(OPF_ITEM)
                    .extra("ID", item.id)
                    .extra("HREF", item.href)
                    .extra("MEDIA_TYPE", item.media_type)
                    .extra("PROPERTIES", properties)
                    .render()?,
            );
        }

        let mut itemrefs = String::new();
        for document in self.documents()? {
            itemrefs.push_str(&self.template(OPF_ITEMREF).extra("ID", document.id).render()?);
        }

        let modified = self
            .modified
            .to_offset(UtcOffset::UTC)
            .format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z"))?;

        Ok(self
            .template(PACKAGE_OPF)
            .extra("IDENTIFIER", self.identifier.to_string())
            .extra("PUBLICATION_YEAR", self.book.publication_year)
            .extra("MODIFIED", modified)
            .extra("OPTIONAL_METADATA", optional)
            .extra("ITEMS", items)
            .extra("ITEMREFS", itemrefs)
            .render()?)
    }
}
