use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Compile xiv component templates into static HTML pages.",
	long_about = "xiv compiles `.xiv` templates into a single HTML document.\n\nTemplates are \
	              plain HTML extended with reusable fragments (`<x-temp x-name=\"card\">`), \
	              loops (`x-for`), conditionals (`x-if`), slots (`<x-slot/>`) and \
	              placeholders (`{{ name | default }}`).\n\nQuick start:\n  xiv init          \
	              Create a sample project\n  xiv compile main.xiv  Build index.html"
)]
pub struct XivCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize xiv in a project by creating sample templates.
	///
	/// Creates `main.xiv`, `templates/card.xiv` and `xiv.toml` in the project
	/// root. Files that already exist are left untouched.
	Init,
	/// Compile a main template into an HTML document.
	///
	/// Expands every fragment, loop, conditional, slot and placeholder, then
	/// writes the document with the runtime script appended. Nothing is
	/// written when compilation fails.
	Compile {
		/// The main template. Relative paths are resolved against the
		/// project root.
		input: PathBuf,

		/// Directory containing the fragment templates. Defaults to
		/// `templates.path` from `xiv.toml`, or `templates`.
		#[arg(long, short)]
		templates: Option<PathBuf>,

		/// Output file. Defaults to `output.path` from `xiv.toml`, or
		/// `index.html`.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Script appended to the document. Defaults to `output.runtime`
		/// from `xiv.toml`.
		#[arg(long)]
		runtime: Option<PathBuf>,

		/// Print the document to stdout instead of writing a file.
		#[arg(long, default_value_t = false)]
		stdout: bool,

		/// Watch the project for changes and recompile automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
}
