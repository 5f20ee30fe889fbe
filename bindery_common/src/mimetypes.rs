use std::path::Path;

/// A mimetype which can appear in an epub manifest
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum MimeType {
	/// A jpeg file
	Jpeg,
	/// A png file
	Png,
	/// A gif file
	Gif,
	/// A svg file
	Svg,
	/// A css file
	Css,
	/// An xhtml file
	Xhtml,
	/// An ncx navigation file
	Ncx,
	/// A woff font file
	Woff,
	/// An opentype font file
	OpenType,
	/// A truetype font file
	TrueType,
}

impl MimeType {

	/// Guess a mimetype from an extension
	pub fn from_extension(ext: &str) -> Option<Self> {
		use MimeType::*;
		match ext.to_ascii_lowercase().as_str() {
			"jpg" | "jpeg" => Some(Jpeg),
			"png" => Some(Png),
			"gif" => Some(Gif),
			"svg" => Some(Svg),
			"css" => Some(Css),
			"xhtml" => Some(Xhtml),
			"ncx" => Some(Ncx),
			"woff" => Some(Woff),
			"otf" => Some(OpenType),
			"ttf" => Some(TrueType),
			_ => None
		}
	}

	/// The media type written into a package manifest
	pub const fn media_type(self) -> &'static str {
		use MimeType::*;
		match self {
			Jpeg => "image/jpeg",
			Png => "image/png",
			Gif => "image/gif",
			Svg => "image/svg+xml",
			Css => "text/css",
			Xhtml => "application/xhtml+xml",
			Ncx => "application/x-dtbncx+xml",
			Woff => "application/font-woff",
			OpenType => "application/vnd.ms-opentype",
			TrueType => "application/x-font-truetype",
		}
	}
}

/// Helper to guess the mimetype of paths
pub trait GuessMimeType {
	/// guess the mimetype of this object
	fn guess_mime(&self) -> Option<MimeType>;
}

impl <T> GuessMimeType for T where T: AsRef<Path> {
	fn guess_mime(&self) -> Option<MimeType> {
		self.as_ref()
			.extension()
			.and_then(|ext| ext.to_str())
			.and_then(MimeType::from_extension)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_guess_mime() {
		assert_eq!("images/cover.JPG".guess_mime(), Some(MimeType::Jpeg));
		assert_eq!(Path::new("css/stylesheet.css").guess_mime(), Some(MimeType::Css));
		assert_eq!("fonts/body.otf".guess_mime().map(|m| m.media_type()), Some("application/vnd.ms-opentype"));
		assert_eq!("notes.txt".guess_mime(), None);
		assert_eq!("README".guess_mime(), None);
	}
}
