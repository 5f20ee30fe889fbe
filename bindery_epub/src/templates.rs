//! The templates every epub document is expanded from.
//!
//! Besides the built in placeholders, pages use `BOOK_TITLE` and `LANGUAGE`;
//! anything else is listed beside the template that needs it.

macro_rules! xhtml_head {
    () => {
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<!DOCTYPE html>\n",
            "<html xmlns=\"http://www.w3.org/1999/xhtml\" xmlns:epub=\"http://www.idpf.org/2007/ops\" xml:lang=\"{LANGUAGE}\" lang=\"{LANGUAGE}\">\n",
            "<head>\n",
            "<title>{BOOK_TITLE}</title>\n",
            "<link href=\"css/stylesheet.css\" rel=\"stylesheet\" type=\"text/css\"/>\n",
            "</head>\n",
        )
    };
}

macro_rules! xhtml_tail {
    () => {
        "</body>\n</html>\n"
    };
}

pub(crate) const CONTAINER_XML: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<container version=\"1.0\" xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\n",
    "<rootfiles>\n",
    "<rootfile full-path=\"OEBPS/package.opf\" media-type=\"application/oebps-package+xml\"/>\n",
    "</rootfiles>\n",
    "</container>\n",
);

// file names
pub(crate) const COVER_IMAGE_HREF: &str = "images/{ISBN}.jpg";
pub(crate) const TITLEPAGE_IMAGE_HREF: &str = "images/titlepage.jpg";
pub(crate) const INSERT_IMAGE_HREF: &str = "images/insert{COUNTER:03}.jpg";
pub(crate) const CHAPTER_IMAGE_HREF: &str = "images/chapter{CHAPTER_NUMBER:03}.jpg";
pub(crate) const INSERT_PAGE_HREF: &str = "insert{COUNTER:03}.xhtml";
pub(crate) const CHAPTER_PAGE_HREF: &str = "chapter{CHAPTER_NUMBER:03}.xhtml";
/// extras: `LETTER`
pub(crate) const SECTION_PAGE_HREF: &str = "chapter{CHAPTER_NUMBER:03}{LETTER}.xhtml";

/// extras: `HREF`
pub(crate) const COVER_PAGE: &str = concat!(
    xhtml_head!(),
    "<body class=\"cover\">\n",
    "<section epub:type=\"cover\">\n",
    "<div class=\"cover-image\"><img src=\"{HREF}\" alt=\"{BOOK_TITLE}\"/></div>\n",
    "</section>\n",
    xhtml_tail!(),
);

/// extras: `HREF`
pub(crate) const TITLE_PAGE: &str = concat!(
    xhtml_head!(),
    "<body>\n",
    "<section id=\"titlepage\" epub:type=\"frontmatter titlepage\">\n",
    "<div class=\"full-page-image\"><img src=\"{HREF}\" alt=\"{BOOK_TITLE}\"/></div>\n",
    "</section>\n",
    xhtml_tail!(),
);

/// extras: `HREF`
pub(crate) const INSERT_PAGE: &str = concat!(
    xhtml_head!(),
    "<body>\n",
    "<section id=\"insert{COUNTER:03}\" epub:type=\"frontmatter\">\n",
    "<div class=\"full-page-image\"><img src=\"{HREF}\" alt=\"Insert {COUNTER}\"/></div>\n",
    "</section>\n",
    xhtml_tail!(),
);

/// extras: `HREF`
pub(crate) const CHAPTER_IMAGE_PAGE: &str = concat!(
    xhtml_head!(),
    "<body>\n",
    "<section id=\"chapter{CHAPTER_NUMBER:03}\" epub:type=\"bodymatter chapter\">\n",
    "<div class=\"full-page-image\"><img src=\"{HREF}\" alt=\"{CHAPTER_TITLE}\"/></div>\n",
    "</section>\n",
    xhtml_tail!(),
);

/// extras: `LETTER`
pub(crate) const SECTION_OPEN: &str = concat!(
    xhtml_head!(),
    "<body>\n",
    "<section id=\"chapter{CHAPTER_NUMBER:03}{LETTER}\" class=\"chapter\" epub:type=\"bodymatter chapter\">\n",
);

pub(crate) const CHAPTER_HEADER: &str = concat!(
    "<h1 class=\"chapter-title\"><a id=\"ref{BOOK_VOLUME:02}{CHAPTER_NUMBER:02}\" href=\"toc.xhtml#ref{BOOK_VOLUME:02}{CHAPTER_NUMBER:02}a\">{CHAPTER_TITLE}</a></h1>\n",
    "<h2 class=\"chapter-subtitle\"><a href=\"toc.xhtml#ref{BOOK_VOLUME:02}{CHAPTER_NUMBER:02}a1\">-{CHAPTER_SUBTITLE}-</a></h2>\n",
);

pub(crate) const SECTION_CLOSE: &str = concat!("</section>\n", xhtml_tail!());

/// extras: `ENTRIES`, `LANDMARKS`
pub(crate) const NAV_PAGE: &str = concat!(
    xhtml_head!(),
    "<body>\n",
    "<nav epub:type=\"toc\" id=\"toc\">\n",
    "<h1>{BOOK_TITLE}</h1>\n",
    "<ol>\n",
    "{ENTRIES}",
    "</ol>\n",
    "</nav>\n",
    "<nav epub:type=\"landmarks\" id=\"landmarks\" hidden=\"\">\n",
    "<h2>Guide</h2>\n",
    "<ol>\n",
    "{LANDMARKS}",
    "</ol>\n",
    "</nav>\n",
    xhtml_tail!(),
);

/// extras: `HREF`, `LABEL`
pub(crate) const NAV_ENTRY: &str = "<li><a href=\"{HREF}\">{LABEL}</a></li>\n";

pub(crate) const NAV_CHAPTER_ENTRY: &str =
    "<li><a href=\"chapter{CHAPTER_NUMBER:03}.xhtml\">{CHAPTER_TITLE}</a></li>\n";

/// extras: `TYPE`, `HREF`, `LABEL`
pub(crate) const NAV_LANDMARK: &str =
    "<li><a epub:type=\"{TYPE}\" href=\"{HREF}\">{LABEL}</a></li>\n";

/// extras: `ENTRIES`
pub(crate) const TOC_PAGE: &str = concat!(
    xhtml_head!(),
    "<body>\n",
    "<section id=\"contents\" epub:type=\"frontmatter toc\">\n",
    "<h1 class=\"toc-title\">Contents</h1>\n",
    "{ENTRIES}",
    "</section>\n",
    xhtml_tail!(),
);

/// extras: `HREF`, `LABEL`
pub(crate) const TOC_FRONT_ENTRY: &str = "<p class=\"toc-front\"><a href=\"{HREF}\">{LABEL}</a></p>\n";

pub(crate) const TOC_CHAPTER_ENTRY: &str = concat!(
    "<p class=\"toc-chapter\"><a id=\"ref{BOOK_VOLUME:02}{CHAPTER_NUMBER:02}a\" href=\"chapter{CHAPTER_NUMBER:03}.xhtml\">{CHAPTER_NUMBER}. {CHAPTER_TITLE}</a></p>\n",
    "<p class=\"toc-subtitle\"><a id=\"ref{BOOK_VOLUME:02}{CHAPTER_NUMBER:02}a1\" href=\"chapter{CHAPTER_NUMBER:03}a.xhtml#ref{BOOK_VOLUME:02}{CHAPTER_NUMBER:02}\">{CHAPTER_SUBTITLE}</a></p>\n",
);

/// extras: `IDENTIFIER`, `NAV_POINTS`
pub(crate) const TOC_NCX: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<ncx xmlns=\"http://www.daisy.org/z3986/2005/ncx/\" version=\"2005-1\" xml:lang=\"{LANGUAGE}\">\n",
    "<head>\n",
    "<meta name=\"dtb:uid\" content=\"urn:uuid:{IDENTIFIER}\"/>\n",
    "<meta name=\"dtb:depth\" content=\"1\"/>\n",
    "<meta name=\"dtb:totalPageCount\" content=\"0\"/>\n",
    "<meta name=\"dtb:maxPageNumber\" content=\"0\"/>\n",
    "</head>\n",
    "<docTitle><text>{BOOK_TITLE}</text></docTitle>\n",
    "<navMap>\n",
    "{NAV_POINTS}",
    "</navMap>\n",
    "</ncx>\n",
);

/// extras: `HREF`, `LABEL`; the counter is the play order
pub(crate) const NCX_FRONT_POINT: &str = "<navPoint id=\"navpoint{COUNTER}\" playOrder=\"{COUNTER}\"><navLabel><text>{LABEL}</text></navLabel><content src=\"{HREF}\"/></navPoint>\n";

/// extras: `PLAY_ORDER`
pub(crate) const NCX_CHAPTER_POINT: &str = "<navPoint id=\"navpoint{PLAY_ORDER}\" playOrder=\"{PLAY_ORDER}\"><navLabel><text>{CHAPTER_TITLE}</text></navLabel><content src=\"chapter{CHAPTER_NUMBER:03}.xhtml\"/></navPoint>\n";

/// extras: `IDENTIFIER`, `PUBLICATION_YEAR`, `MODIFIED`, `OPTIONAL_METADATA`, `ITEMS`, `ITEMREFS`
pub(crate) const PACKAGE_OPF: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<package xmlns=\"http://www.idpf.org/2007/opf\" version=\"3.0\" unique-identifier=\"uid\" xml:lang=\"{LANGUAGE}\">\n",
    "<metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n",
    "<dc:identifier id=\"uid\">urn:uuid:{IDENTIFIER}</dc:identifier>\n",
    "<dc:identifier id=\"isbn\">urn:isbn:{ISBN}</dc:identifier>\n",
    "<dc:title>{BOOK_TITLE}</dc:title>\n",
    "<dc:language>{LANGUAGE}</dc:language>\n",
    "<dc:date>{PUBLICATION_YEAR}</dc:date>\n",
    "<meta property=\"dcterms:modified\">{MODIFIED}</meta>\n",
    "{OPTIONAL_METADATA}",
    "</metadata>\n",
    "<manifest>\n",
    "{ITEMS}",
    "</manifest>\n",
    "<spine toc=\"ncx\">\n",
    "{ITEMREFS}",
    "</spine>\n",
    "</package>\n",
);

/// extras: `NAME`; the counter numbers creators
pub(crate) const OPF_CREATOR: &str = "<dc:creator id=\"creator{COUNTER}\">{NAME}</dc:creator>\n";

/// extras: `NAME`
pub(crate) const OPF_PUBLISHER: &str = "<dc:publisher>{NAME}</dc:publisher>\n";

/// extras: `ID`
pub(crate) const OPF_COVER_META: &str = "<meta name=\"cover\" content=\"{ID}\"/>\n";

/// extras: `ID`, `HREF`, `MEDIA_TYPE`, `PROPERTIES`
pub(crate) const OPF_ITEM: &str =
    "<item id=\"{ID}\" href=\"{HREF}\" media-type=\"{MEDIA_TYPE}\"{PROPERTIES}/>\n";

/// extras: `ID`
pub(crate) const OPF_ITEMREF: &str = "<itemref idref=\"{ID}\"/>\n";
