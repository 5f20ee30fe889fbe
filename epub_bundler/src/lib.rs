//! Package an epub work tree into an epub file.
//!
//! A work tree is a directory holding `mimetype`, `META-INF/` and the content directory
//! (usually `OEBPS/`). Reading systems recognise an epub by its first zip entry, so
//! `mimetype` is always written first and uncompressed; `META-INF/` follows, then
//! everything else in name order.
#![deny(dead_code)]
#![deny(unreachable_patterns)]
#![deny(unused_extern_crates)]
#![deny(unused_imports)]
#![deny(unused_qualifications)]
#![deny(clippy::all)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

use std::fs::{self, File};
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

static MIMETYPE_FILE: &str = "mimetype";
static META_INF: &str = "META-INF";

/// Errors arising while bundling an epub
#[derive(Debug, Error)]
pub enum EpubBundlingError {
    /// the zip container could not be written
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// a file could not be read or written
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// the work tree has no `mimetype` file
    #[error("{0} has no mimetype file")]
    MissingMimetype(PathBuf),
    /// a path in the work tree cannot be named in a zip
    #[error("cannot store non-unicode path {0}")]
    NonUnicodeFilePath(PathBuf),
}

/// Every file under `dir`, relative to `root`, directories before their contents
/// and siblings in name order
fn collect(root: &Path, dir: &Path, entries: &mut Vec<(PathBuf, bool)>) -> Result<(), EpubBundlingError> {
    let mut children = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    children.sort_by_key(|child| child.file_name());
    for child in children {
        let path = child.path();
        let relative = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone());
        if path.is_dir() {
            entries.push((relative, true));
            collect(root, &path, entries)?;
        } else {
            entries.push((relative, false));
        }
    }
    Ok(())
}

fn zip_name(relative: &Path) -> Result<String, EpubBundlingError> {
    let mut parts = Vec::new();
    for component in relative.components() {
        let part = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| EpubBundlingError::NonUnicodeFilePath(relative.to_path_buf()))?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}

/// Zip the work tree at `work_dir` into `writer`
pub fn bundle_into<W: Write + Seek>(work_dir: &Path, writer: W) -> Result<W, EpubBundlingError> {
    let mimetype_path = work_dir.join(MIMETYPE_FILE);
    if !mimetype_path.is_file() {
        return Err(EpubBundlingError::MissingMimetype(work_dir.to_path_buf()));
    }

    let mut entries = Vec::new();
    collect(work_dir, work_dir, &mut entries)?;
    entries.retain(|(path, _)| path != Path::new(MIMETYPE_FILE));
    // stable: META-INF first, everything else keeps its name order
    entries.sort_by_key(|(path, _)| !path.starts_with(META_INF));

    let mut zipper = ZipWriter::new(writer);
    let uncompressed = FileOptions::default().compression_method(CompressionMethod::Stored);
    let compressed = FileOptions::default().compression_method(CompressionMethod::Deflated);

    // first add an uncompressed mimetype file so this can be recognised
    zipper.start_file(MIMETYPE_FILE, uncompressed)?;
    zipper.write_all(&fs::read(&mimetype_path)?)?;

    for (relative, is_dir) in entries {
        let name = zip_name(&relative)?;
        if is_dir {
            zipper.add_directory(name, compressed)?;
        } else {
            debug!("adding {}", name);
            zipper.start_file(name, compressed)?;
            zipper.write_all(&fs::read(work_dir.join(&relative))?)?;
        }
    }

    Ok(zipper.finish()?)
}

/// Zip the work tree at `work_dir`, returning the epub's bytes
pub fn bundle_directory(work_dir: &Path) -> Result<Vec<u8>, EpubBundlingError> {
    bundle_into(work_dir, Cursor::new(Vec::new())).map(Cursor::into_inner)
}

/// Zip the work tree at `work_dir` into an epub file at `output`
pub fn write_epub(work_dir: &Path, output: &Path) -> Result<(), EpubBundlingError> {
    info!("zipping work directory {}", work_dir.display());
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(output)?;
    bundle_into(work_dir, file)?.flush()?;
    info!("wrote {}", output.display());
    Ok(())
}
