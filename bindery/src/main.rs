use bindery::{build_epub, build_pdf, parse_inches, EpubOptions, LatexOptions};
use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bindery", version, about = "Produce print-ready pdfs and epubs of illustrated novels")]
struct Cli {
	/// Log debugging output
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Produce an epub
	Epub {
		/// The book's input directory
		input: PathBuf,
		/// Where to write the epub
		output: PathBuf,
		/// A stylesheet used in place of the default one
		#[arg(long)]
		css: Option<PathBuf>,
		/// A directory of fonts and other files to include
		#[arg(long)]
		assets: Option<PathBuf>,
	},
	/// Produce a pdf
	Pdf(PdfArgs),
	/// Convert markdown emphasis markers to tags
	Tags {
		/// The markdown file to convert
		input: PathBuf,
		/// Where to write the converted text
		output: PathBuf,
	},
	/// Split a single-file manuscript into part files
	Split {
		/// The single-file manuscript
		input: PathBuf,
		/// The directory to write part files to
		output: PathBuf,
	},
	/// Combine part files into a single-file manuscript
	Combine {
		/// The directory of part files
		input: PathBuf,
		/// Where to write the single-file manuscript
		output: PathBuf,
	},
	/// Recover manuscript text from a generated chapter section
	HtmlToMarkdown {
		/// The section document
		input: PathBuf,
	},
}

#[derive(Args)]
struct PdfArgs {
	/// The book's input directory
	input: PathBuf,
	/// Where to write the pdf
	output: PathBuf,
	/// Bleed around each page, such as `0.125in`
	#[arg(short, long, value_parser = parse_inches)]
	bleed_size: Option<f64>,
	/// Extra inner margin for binding, such as `0.15in`
	#[arg(short, long, value_parser = parse_inches)]
	gutter_size: Option<f64>,
	/// Leave the covers out
	#[arg(short, long)]
	no_cover: bool,
	/// Reuse the print images of an earlier run
	#[arg(short, long)]
	skip_images: bool,
	/// Lay the book out without placing images
	#[arg(short, long)]
	dont_print_images: bool,
	/// Call xelatex with this command line; may use `{MODE}`, `{OUTPUT_DIRECTORY}`,
	/// `{JOB_NAME}` and `{TEX_FILE}`
	#[arg(short = 'x', long)]
	xelatex_command_line: Option<String>,
	/// Shorthand for `-b 0.125in -g 0.15in -n`; an explicit `-b` or `-g` still applies
	#[arg(short, long)]
	print_mode: bool,
	/// The main `.tex` file
	#[arg(long)]
	tex_main: PathBuf,
	/// A directory of stand-ins used while images are not placed
	#[arg(long)]
	tex_no_images: Option<PathBuf>,
}

impl PdfArgs {
	/// Everything but the paths, which are resolved when the pdf is built
	fn options(&self) -> LatexOptions {
		let mut options = LatexOptions::default();
		if self.print_mode {
			options.print_mode();
		}
		if let Some(bleed) = self.bleed_size {
			options.bleed(bleed);
		}
		if let Some(gutter) = self.gutter_size {
			options.gutter(gutter);
		}
		if self.no_cover {
			options.no_cover();
		}
		if self.skip_images {
			options.skip_images();
		}
		if self.dont_print_images {
			options.dont_print_images();
		}
		if let Some(ref command_line) = self.xelatex_command_line {
			options.command_line(command_line.as_str());
		}
		options
	}
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
	match command {
		Command::Epub {
			input,
			output,
			css,
			assets,
		} => {
			let mut options = EpubOptions::default();
			if let Some(css) = css {
				options.css(css);
			}
			if let Some(assets) = assets {
				options.assets(assets);
			}
			let epub = build_epub(&input, &output, &options)?;
			info!("epub written to {}", epub.display());
		}
		Command::Pdf(args) => {
			let mut options = args.options();
			options.main_tex(fs::canonicalize(&args.tex_main)?);
			if let Some(ref dir) = args.tex_no_images {
				options.no_images_dir(fs::canonicalize(dir)?);
			}
			if let Some(pdf) = build_pdf(&args.input, &args.output, &options)? {
				info!("pdf written to {}", pdf.display());
			}
		}
		Command::Tags { input, output } => {
			manuscript_text::convert_emphasis_file(&input, &output)?;
			info!("tagged text written to {}", output.display());
		}
		Command::Split { input, output } => {
			manuscript_text::split_file(&input, &output)?;
		}
		Command::Combine { input, output } => {
			manuscript_text::combine_directory(&input, &output)?;
			info!("combined manuscript written to {}", output.display());
		}
		Command::HtmlToMarkdown { input } => {
			let output = manuscript_text::xhtml_file_to_markdown(&input)?;
			info!("manuscript text written to {}", output.display());
		}
	}
	Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();
	let default_level = if cli.verbose { "debug" } else { "info" };
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
		.init();

	run(cli.command).map_err(|e| {
		error!("{}", e);
		e
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pdf_options(args: &[&str]) -> LatexOptions {
		let cli = Cli::try_parse_from(["bindery", "pdf", "in", "out", "--tex-main", "Main.tex"].iter().chain(args)).unwrap();
		match cli.command {
			Command::Pdf(args) => args.options(),
			_ => unreachable!(),
		}
	}

	#[test]
	fn explicit_sizes_refine_print_mode() {
		let options = pdf_options(&["-p"]);
		assert_eq!((options.bleed_in, options.gutter_in, options.no_cover), (0.125, 0.15, true));

		let options = pdf_options(&["-b", "0.25in", "-p"]);
		assert_eq!((options.bleed_in, options.gutter_in), (0.25, 0.15));

		let options = pdf_options(&["-p", "-g", "0.5in"]);
		assert_eq!((options.bleed_in, options.gutter_in), (0.125, 0.5));
	}

	#[test]
	fn sizes_default_to_nothing() {
		let options = pdf_options(&["-x", "xelatex \"{TEX_FILE}\""]);
		assert_eq!((options.bleed_in, options.gutter_in, options.no_cover), (0.0, 0.0, false));
		assert_eq!(options.command_line.as_deref(), Some("xelatex \"{TEX_FILE}\""));
	}

	#[test]
	fn pixel_sizes_are_refused() {
		assert!(Cli::try_parse_from(["bindery", "pdf", "in", "out", "--tex-main", "m.tex", "-b", "3px"]).is_err());
	}
}
