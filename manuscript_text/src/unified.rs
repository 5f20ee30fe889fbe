//! Single-file manuscripts.
//!
//! It is sometimes easier to edit a whole chapter in one file. Such a file holds each
//! part's text under a header naming its manuscript file: `# 3` for a single-part
//! chapter, `# 3.2` for the second part of chapter 3.
use crate::{read_file, write_file, TextError};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

lazy_static! {
    static ref HEADER: Regex = Regex::new(r"\s*# (\d+(?:\.\d+)?)\n\s*").expect("part header regex is valid");
}

/// Split a single-file manuscript into `(name, text)` pairs, in file order.
///
/// Only whitespace may come before the first header.
pub fn split_unified(text: &str) -> Result<Vec<(String, String)>, TextError> {
    let headers: Vec<_> = HEADER.captures_iter(text).collect();
    let leading_end = headers
        .first()
        .and_then(|captures| captures.get(0))
        .map_or(text.len(), |m| m.start());
    let leading = &text[..leading_end];
    if !leading.trim().is_empty() {
        return Err(TextError::TextBeforeFirstHeader(leading.to_string()));
    }

    let mut parts = Vec::with_capacity(headers.len());
    for (index, captures) in headers.iter().enumerate() {
        let (whole, name) = match (captures.get(0), captures.get(1)) {
            (Some(whole), Some(name)) => (whole, name),
            _ => continue,
        };
        let end = headers
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        parts.push((name.as_str().to_string(), text[whole.end()..end].to_string()));
    }
    Ok(parts)
}

/// Join part files back into a single-file manuscript
pub fn combine_parts<S: AsRef<str>, T: AsRef<str>>(parts: &[(S, T)]) -> String {
    parts
        .iter()
        .flat_map(|(name, text)| [format!("# {}", name.as_ref()), text.as_ref().trim().to_string()])
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Order part names numerically, so that `10` follows `9` and `2.10` follows `2.9`
fn part_order(name: &str) -> Vec<Option<u64>> {
    name.split('.').map(|n| n.parse().ok()).collect()
}

/// Split the single-file manuscript `input` into `{name}.md` files in `output_dir`
pub fn split_file(input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, TextError> {
    let text = read_file(input)?;
    let mut written = Vec::new();
    for (name, part) in split_unified(&text)? {
        let path = output_dir.join(format!("{}.md", name));
        write_file(&path, part)?;
        written.push(path);
    }
    info!("split {} into {} files", input.display(), written.len());
    Ok(written)
}

/// Combine every `.md` file in `input_dir` into the single-file manuscript `output`
pub fn combine_directory(input_dir: &Path, output: &Path) -> Result<(), TextError> {
    let read_error = |source| TextError::Read {
        path: input_dir.to_path_buf(),
        source,
    };
    let mut parts = Vec::new();
    for entry in fs::read_dir(input_dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            if let Some(name) = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()) {
                debug!("combining {}", path.display());
                let text = read_file(&path)?;
                parts.push((name, text));
            }
        }
    }
    parts.sort_by(|(a, _), (b, _)| part_order(a).cmp(&part_order(b)).then_with(|| a.cmp(b)));
    write_file(output, combine_parts(&parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_headers() {
        let text = "\n# 1\nOnce.\n\nTwice.\n\n# 2.1\n\nThrice.\n";
        assert_eq!(
            split_unified(text).unwrap(),
            vec![
                ("1".to_string(), "Once.\n\nTwice.".to_string()),
                ("2.1".to_string(), "Thrice.\n".to_string()),
            ]
        );
    }

    #[test]
    fn text_before_the_first_header_is_an_error() {
        assert!(matches!(
            split_unified("Stray\n# 1\nText"),
            Err(TextError::TextBeforeFirstHeader(ref s)) if s == "Stray"
        ));
        assert!(matches!(
            split_unified("No headers at all"),
            Err(TextError::TextBeforeFirstHeader(_))
        ));
        assert_eq!(split_unified("  \n").unwrap(), vec![]);
    }

    #[test]
    fn headers_must_be_numbers() {
        let parts = split_unified("# 1\nSee # 2a\nend").unwrap();
        assert_eq!(parts, vec![("1".to_string(), "See # 2a\nend".to_string())]);
    }

    #[test]
    fn combining() {
        let parts = [("1", "Once.\n\n"), ("2", "\nTwice.")];
        assert_eq!(combine_parts(&parts), "# 1\n\nOnce.\n\n# 2\n\nTwice.");
    }

    #[test]
    fn numeric_order() {
        let mut names = vec!["10", "2.10", "2.9", "9", "1"];
        names.sort_by_key(|n| part_order(n));
        assert_eq!(names, vec!["1", "2.9", "2.10", "9", "10"]);
    }

    #[test]
    fn split_and_combine_files() {
        let dir = tempfile::tempdir().unwrap();
        let unified = dir.path().join("chapter.md");
        fs::write(&unified, "# 3.1\nOne.\n\n# 3.2\nTwo.\n\n# 3.10\nTen.\n").unwrap();
        let parts_dir = dir.path().join("parts");
        let written = split_file(&unified, &parts_dir).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(fs::read_to_string(parts_dir.join("3.2.md")).unwrap(), "Two.");

        fs::write(parts_dir.join("notes.txt"), "ignored").unwrap();
        let combined = dir.path().join("combined.md");
        combine_directory(&parts_dir, &combined).unwrap();
        assert_eq!(
            fs::read_to_string(&combined).unwrap(),
            "# 3.1\n\nOne.\n\n# 3.2\n\nTwo.\n\n# 3.10\n\nTen."
        );
    }
}
