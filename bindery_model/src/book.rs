use crate::error::ConfigError;
use bindery_common::validate_isbn;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The name of the book configuration file within an input directory
pub const BOOK_CONFIG_FILE: &str = "config.yaml";
/// The directory, within an input directory, holding manuscript text
pub const TEXT_DIRECTORY: &str = "Text";

/// A book: some metadata and an ordered list of chapters
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    /// the volume number of this book within its series
    pub volume: u32,
    /// the book's ISBN-13, as written in its configuration
    pub isbn: String,
    /// the year of publication
    pub publication_year: i32,
    /// the chapters, numbered from 1 in declaration order
    pub chapters: Vec<Chapter>,
    /// publication metadata which is not needed to lay out the book
    pub metadata: BookMetadata,
    /// the directory the configuration was loaded from
    pub directory: PathBuf,
}

/// Publication metadata used on generated pages and in the epub package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    /// the series title
    pub title: String,
    /// a short title, used to name output files
    pub short_title: String,
    /// authors and illustrators
    pub creators: Vec<String>,
    /// the publisher, if any
    pub publisher: Option<String>,
    /// a BCP 47 language tag
    pub language: String,
}

impl Default for BookMetadata {
    fn default() -> Self {
        BookMetadata {
            title: default_title(),
            short_title: default_short_title(),
            creators: Vec::new(),
            publisher: None,
            language: default_language(),
        }
    }
}

/// A chapter: a title, subtitle and at least one part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// 1-based position in the book
    pub number: usize,
    /// the chapter title
    pub title: String,
    /// the chapter subtitle
    pub subtitle: String,
    /// the parts of the chapter, numbered from 1
    pub parts: Vec<Part>,
}

/// A part of a chapter, backed by a single manuscript file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// 1-based position within the chapter
    pub number: usize,
    /// the part title; `None` marks the lead-in of a chapter, which gets no header
    pub title: Option<String>,
    chapter_number: usize,
    single_part: bool,
}

impl Part {
    /// The stem of the manuscript file for this part:
    /// the chapter number for a single-part chapter, otherwise `{chapter}.{part}`
    pub fn base_filename(&self) -> String {
        if self.single_part {
            self.chapter_number.to_string()
        } else {
            format!("{}.{}", self.chapter_number, self.number)
        }
    }

    /// The number of the chapter this part belongs to
    pub fn chapter_number(&self) -> usize {
        self.chapter_number
    }
}

impl Chapter {
    /// Build a chapter, numbering its parts from 1
    pub fn new<T, S>(number: usize, title: T, subtitle: S, part_titles: Vec<Option<String>>) -> Self
    where
        T: Into<String>,
        S: Into<String>,
    {
        let single_part = part_titles.len() == 1;
        let parts = part_titles
            .into_iter()
            .enumerate()
            .map(|(i, title)| Part {
                number: i + 1,
                title,
                chapter_number: number,
                single_part,
            })
            .collect();
        Chapter {
            number,
            title: title.into(),
            subtitle: subtitle.into(),
            parts,
        }
    }

    /// Whether this chapter has exactly one part
    pub fn is_single_part(&self) -> bool {
        self.parts.len() == 1
    }
}

fn default_title() -> String {
    "Untitled".to_string()
}

fn default_short_title() -> String {
    "Book".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

/// Accept an isbn written either as a string or, unquoted, as a yaml number
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde::de::Error;
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or number, found {:?}",
            other
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct RawPart {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    title: String,
    #[serde(default)]
    subtitle: String,
    parts: Vec<RawPart>,
}

#[derive(Debug, Deserialize)]
struct RawBook {
    volume_number: u32,
    #[serde(deserialize_with = "string_or_number")]
    isbn: String,
    publication_year: i32,
    chapters: Vec<RawChapter>,
    #[serde(default = "default_title")]
    title: String,
    #[serde(default = "default_short_title")]
    short_title: String,
    #[serde(default)]
    creators: Vec<String>,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default = "default_language")]
    language: String,
}

impl Book {
    /// Load `config.yaml` from `input_dir`
    pub fn load<P: AsRef<Path>>(input_dir: P) -> Result<Self, ConfigError> {
        let input_dir = input_dir.as_ref();
        if !input_dir.is_dir() {
            return Err(ConfigError::MissingFile(input_dir.to_path_buf()));
        }
        let config_path = input_dir.join(BOOK_CONFIG_FILE);
        if !config_path.is_file() {
            return Err(ConfigError::MissingFile(config_path));
        }
        let src = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let book = Book::from_yaml(&src, input_dir).map_err(|e| match e {
            ConfigError::Yaml { source, .. } => ConfigError::Yaml {
                path: config_path.clone(),
                source,
            },
            other => other,
        })?;
        debug!(
            "loaded volume {} with {} chapters from {}",
            book.volume,
            book.chapters.len(),
            config_path.display()
        );
        Ok(book)
    }

    /// Parse a book configuration; `directory` is where manuscript text is looked for
    pub fn from_yaml<P: Into<PathBuf>>(src: &str, directory: P) -> Result<Self, ConfigError> {
        let directory = directory.into();
        let raw: RawBook = serde_yaml::from_str(src).map_err(|source| ConfigError::Yaml {
            path: directory.join(BOOK_CONFIG_FILE),
            source,
        })?;
        validate_isbn(&raw.isbn)?;

        let mut chapters = Vec::with_capacity(raw.chapters.len());
        for (i, chapter) in raw.chapters.into_iter().enumerate() {
            let number = i + 1;
            if chapter.parts.is_empty() {
                return Err(ConfigError::EmptyChapter(number));
            }
            let part_titles = chapter.parts.into_iter().map(|p| p.title).collect();
            chapters.push(Chapter::new(number, chapter.title, chapter.subtitle, part_titles));
        }

        Ok(Book {
            volume: raw.volume_number,
            isbn: raw.isbn,
            publication_year: raw.publication_year,
            chapters,
            metadata: BookMetadata {
                title: raw.title,
                short_title: raw.short_title,
                creators: raw.creators,
                publisher: raw.publisher,
                language: raw.language,
            },
            directory,
        })
    }

    /// The directory holding manuscript text
    pub fn text_directory(&self) -> PathBuf {
        self.directory.join(TEXT_DIRECTORY)
    }

    /// The manuscript file for `part`
    pub fn part_path(&self, part: &Part) -> PathBuf {
        self.text_directory()
            .join(format!("{}.md", part.base_filename()))
    }

    /// The stem used for output files, e.g. `Book_v03`
    pub fn output_stem(&self) -> String {
        format!("{}_v{:02}", self.metadata.short_title, self.volume)
    }

    /// The chapter with the given 1-based number
    pub fn chapter(&self, number: usize) -> Option<&Chapter> {
        number
            .checked_sub(1)
            .and_then(|idx| self.chapters.get(idx))
    }

    /// The title shown on generated pages: the series title and volume number
    pub fn display_title(&self) -> String {
        format!("{}, Vol. {}", self.metadata.title, self.volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static BOOK_YAML: &str = "
volume_number: 3
isbn: \"9780306406157\"
publication_year: 2021
short_title: Tales
chapters:
  - title: Beginnings
    subtitle: In which things start
    parts:
      - title: null
  - title: Middles
    subtitle: In which things continue
    parts:
      - title: null
      - title: Arrival
      - title: Departure
";

    #[test]
    fn parses_chapters_and_parts() {
        let book = Book::from_yaml(BOOK_YAML, "/books/tales").unwrap();
        assert_eq!(book.volume, 3);
        assert_eq!(book.publication_year, 2021);
        assert_eq!(book.chapters.len(), 2);
        let second = &book.chapters[1];
        assert_eq!(second.number, 2);
        assert_eq!(second.parts.len(), 3);
        assert_eq!(second.parts[1].title.as_deref(), Some("Arrival"));
        assert!(second.parts[0].title.is_none());
        assert_eq!(book.metadata.title, "Untitled");
        assert_eq!(book.metadata.language, "en");
    }

    #[test]
    fn base_filenames() {
        let book = Book::from_yaml(BOOK_YAML, "/books/tales").unwrap();
        assert_eq!(book.chapters[0].parts[0].base_filename(), "1");
        assert_eq!(book.chapters[1].parts[0].base_filename(), "2.1");
        assert_eq!(book.chapters[1].parts[2].base_filename(), "2.3");
        assert_eq!(
            book.part_path(&book.chapters[1].parts[2]),
            PathBuf::from("/books/tales/Text/2.3.md")
        );
        assert_eq!(book.output_stem(), "Tales_v03");
    }

    #[test]
    fn numeric_isbns_are_accepted() {
        let src = BOOK_YAML.replace("\"9780306406157\"", "9780306406157");
        let book = Book::from_yaml(&src, ".").unwrap();
        assert_eq!(book.isbn, "9780306406157");
    }

    #[test]
    fn bad_isbns_are_rejected() {
        let src = BOOK_YAML.replace("9780306406157", "9780306406158");
        assert!(matches!(
            Book::from_yaml(&src, "."),
            Err(ConfigError::Isbn(_))
        ));
    }

    #[test]
    fn chapters_need_parts() {
        let src = "
volume_number: 1
isbn: \"9780306406157\"
publication_year: 2020
chapters:
  - title: Empty
    subtitle: Nothing here
    parts: []
";
        assert!(matches!(
            Book::from_yaml(src, "."),
            Err(ConfigError::EmptyChapter(1))
        ));
    }

    #[test]
    fn missing_keys_are_yaml_errors() {
        let src = "volume_number: 1\nchapters: []\n";
        assert!(matches!(
            Book::from_yaml(src, "."),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn loading_needs_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nowhere");
        assert!(matches!(
            Book::load(&missing),
            Err(ConfigError::MissingFile(p)) if p == missing
        ));
        assert!(matches!(
            Book::load(dir.path()),
            Err(ConfigError::MissingFile(p)) if p == dir.path().join(BOOK_CONFIG_FILE)
        ));
        fs::write(dir.path().join(BOOK_CONFIG_FILE), BOOK_YAML).unwrap();
        let book = Book::load(dir.path()).unwrap();
        assert_eq!(book.directory, dir.path());
    }
}
