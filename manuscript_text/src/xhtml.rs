//! Recovering manuscript text from chapter section documents.
//!
//! Every line of a section document is either part of the page skeleton, which is
//! dropped, or one of the blocks below. Anything else is an error, since silently
//! losing text is worse than stopping.
use crate::TextError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PARAGRAPH: Regex =
        Regex::new(r#"^<p class="([A-Za-z0-9_-]+)">(.*)</p>$"#).expect("paragraph regex is valid");
}

/// Lines which only make up the page around the text
const SKELETON: [&str; 14] = [
    "<?xml",
    "<!DOCTYPE",
    "<html",
    "</html>",
    "<head>",
    "</head>",
    "<title>",
    "<link",
    "<body",
    "</body>",
    "<section",
    "</section>",
    "<h1 class=\"chapter-title\">",
    "<h2 class=\"chapter-subtitle\">",
];

/// One block of a section document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// a numbered part header
    Subpart,
    /// an ordinary paragraph
    Body(String),
    /// a paragraph preceded by extra space
    BreakBody(String),
    /// a page of centered text
    CenteredPage(String),
    /// an ornamental scene break
    Ornament,
}

fn parse_line(line: &str) -> Result<Option<Block>, TextError> {
    if SKELETON.iter().any(|prefix| line.starts_with(prefix)) {
        return Ok(None);
    }
    if line == "<div class=\"ornament\">" {
        return Ok(Some(Block::Ornament));
    }
    if line == "</div>" || line.starts_with("<div class=\"ornament-image\">") {
        return Ok(None);
    }
    if let Some(captures) = PARAGRAPH.captures(line) {
        let text = captures[2].to_string();
        let block = match &captures[1] {
            "h1_co" | "h1_co1" => Block::Subpart,
            "tx" | "tx1" | "cotx1a" => Block::Body(text),
            "space-break" => Block::BreakBody(text),
            "tx10" => Block::CenteredPage(text),
            _ => return Err(TextError::UnknownTag(line.to_string())),
        };
        return Ok(Some(block));
    }
    Err(TextError::UnknownTag(line.to_string()))
}

/// Read the blocks of a section document, in order
pub fn parse_section(xhtml: &str) -> Result<Vec<Block>, TextError> {
    let mut blocks = Vec::new();
    for line in xhtml.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(block) = parse_line(line)? {
            blocks.push(block);
        }
    }
    Ok(blocks)
}

/// Write blocks out as manuscript text. Part headers are renumbered from 1.
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    blocks
        .iter()
        .scan(0, |subparts, block| {
            let text = match block {
                Block::Subpart => {
                    *subparts += 1;
                    format!("# {}", subparts)
                }
                Block::Body(text) => text.clone(),
                Block::BreakBody(text) => format!("<br/>\n\n{}", text),
                Block::CenteredPage(text) => format!("<span class=\"v-centered-page\">{}</span>", text),
                Block::Ornament => "* * *".to_string(),
            };
            Some(text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Convert a section document back into manuscript text
pub fn xhtml_to_markdown(xhtml: &str) -> Result<String, TextError> {
    parse_section(xhtml).map(|blocks| blocks_to_markdown(&blocks))
}
