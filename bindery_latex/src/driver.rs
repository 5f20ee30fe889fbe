//! Running xelatex.
use crate::LatexError;
use bindery_model::TemplateContext;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// The xelatex command line used with MiKTeX
pub const MIKTEX_COMMAND_LINE: &str =
	"xelatex -interaction={MODE} -enable-installer -output-directory={OUTPUT_DIRECTORY} -job-name={JOB_NAME} {TEX_FILE}";
/// The xelatex command line used with TeX Live and any other distribution
pub const TEXLIVE_COMMAND_LINE: &str =
	"xelatex -interaction={MODE} -output-directory={OUTPUT_DIRECTORY} -jobname={JOB_NAME} {TEX_FILE}";

/// How chatty xelatex is allowed to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
	/// report errors but never stop for input
	NonStop,
	/// print nothing to the terminal
	Batch,
}

impl InteractionMode {
	/// `nonstopmode` when debug logging is on, otherwise `batchmode`
	pub fn from_log_level() -> Self {
		if tracing::enabled!(tracing::Level::DEBUG) {
			InteractionMode::NonStop
		} else {
			InteractionMode::Batch
		}
	}

	/// The value passed to `-interaction`
	pub const fn as_str(self) -> &'static str {
		match self {
			InteractionMode::NonStop => "nonstopmode",
			InteractionMode::Batch => "batchmode",
		}
	}
}

/// Pick a command line from the output of `xelatex --version`
pub fn command_line_for_version(version: &str) -> &'static str {
	if version.contains("MiKTeX") {
		debug!("MiKTeX xelatex detected");
		MIKTEX_COMMAND_LINE
	} else if version.contains("TeX Live") {
		debug!("TeX Live xelatex detected");
		TEXLIVE_COMMAND_LINE
	} else {
		debug!("unknown TeX distribution; defaulting to the TeX Live command line");
		TEXLIVE_COMMAND_LINE
	}
}

/// Ask the installed xelatex which distribution it belongs to
pub fn detect_command_line() -> Result<&'static str, LatexError> {
	let output = Command::new("xelatex")
		.arg("--version")
		.output()
		.map_err(LatexError::Detect)?;
	let mut version = String::from_utf8_lossy(&output.stdout).into_owned();
	version.push_str(&String::from_utf8_lossy(&output.stderr));
	Ok(command_line_for_version(&version))
}

/// One xelatex invocation, before any arguments are expanded
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
	/// the command line, with placeholders
	pub command_line: &'a str,
	/// the interaction mode
	pub mode: InteractionMode,
	/// where xelatex writes its output
	pub output_directory: &'a Path,
	/// the name of the output files, without extension
	pub job_name: &'a str,
	/// the main `.tex` file
	pub tex_file: &'a Path,
}

impl Invocation<'_> {
	/// Split the command line as a shell would and expand the placeholders of each argument
	pub fn args(&self) -> Result<Vec<String>, LatexError> {
		let context = TemplateContext::new(&[], 0, "");
		let output_directory = self.output_directory.to_string_lossy().into_owned();
		let tex_file = self.tex_file.to_string_lossy().into_owned();
		let words = shlex::split(self.command_line)
			.ok_or_else(|| LatexError::MalformedCommandLine(self.command_line.to_string()))?;
		let args = words
			.iter()
			.map(|arg| {
				context
					.template(arg)
					.extra("MODE", self.mode.as_str())
					.extra("OUTPUT_DIRECTORY", output_directory.as_str())
					.extra("JOB_NAME", self.job_name)
					.extra("TEX_FILE", tex_file.as_str())
					.render()
			})
			.collect::<Result<Vec<_>, _>>()?;
		if args.is_empty() {
			Err(LatexError::EmptyCommandLine)
		} else {
			Ok(args)
		}
	}
}

/// Prepend `dirs` to a `TEXINPUTS` value.
///
/// An unset or blank value leaves a trailing separator, so that the default
/// search path still follows.
pub fn prepend_tex_inputs(existing: Option<&OsStr>, dirs: &[&Path]) -> Result<OsString, LatexError> {
	let mut paths: Vec<PathBuf> = dirs.iter().map(|dir| dir.to_path_buf()).collect();
	match existing {
		Some(existing) if !existing.to_string_lossy().trim().is_empty() => {
			paths.extend(env::split_paths(existing));
		},
		_ => paths.push(PathBuf::new()),
	}
	Ok(env::join_paths(paths)?)
}

/// Run xelatex once with the given `TEXINPUTS`, from `working_dir`
pub(crate) fn run_pass(args: &[String], tex_inputs: &OsStr, working_dir: &Path) -> Result<(), LatexError> {
	debug!("{}", args.join(" "));
	let (program, rest) = args.split_first().ok_or(LatexError::EmptyCommandLine)?;
	let status = Command::new(program)
		.args(rest)
		.env("TEXINPUTS", tex_inputs)
		.current_dir(working_dir)
		.status()
		.map_err(|source| LatexError::Spawn {
			program: program.clone(),
			source,
		})?;
	if !status.success() {
		warn!("{} exited with {}", program, status);
	}
	Ok(())
}
