use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use xiv_cli::Commands;
use xiv_cli::XivCli;
use xiv_core::CompileOptions;
use xiv_core::Compiler;
use xiv_core::XivConfig;
use xiv_core::read_runtime_script;
use xiv_core::render_document;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

const SAMPLE_MAIN: &str = r#"<xiv type="main">
  <h1>{{ title | Hello from xiv }}</h1>
  <x-temp x-name="card" t-title="Getting started">
    <p>Edit <code>main.xiv</code> and run <code>xiv compile main.xiv</code>.</p>
  </x-temp>
</xiv>
"#;

const SAMPLE_CARD: &str = r#"<xiv type="template">
  <article>
    <h2>{{ title }}</h2>
    <x-slot/>
  </article>
</xiv>
"#;

const SAMPLE_CONFIG: &str = "# xiv configuration\n\n[templates]\n# Directory containing fragment \
                             templates, relative to this file.\npath = \"templates\"\n# Maximum \
                             nesting of fragment inclusions.\n# max_depth = 32\n\n[output]\npath \
                             = \"index.html\"\n# Script appended to every compiled document.\n# \
                             runtime = \"runtime/xiv.js\"\n";

fn main() {
	let args = XivCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Compile {
			input,
			templates,
			output,
			runtime,
			stdout,
			watch,
		}) => {
			let flags = CompileFlags {
				input,
				templates: templates.as_deref(),
				output: output.as_deref(),
				runtime: runtime.as_deref(),
			};
			run_compile(&args, &flags, *stdout, *watch)
		}
		None => {
			eprintln!("No subcommand specified. Run `xiv --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<xiv_core::XivError>() {
			Ok(xiv_err) => {
				let report: miette::Report = (*xiv_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
	let default_directive = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.without_time()
		.init();
}

fn resolve_root(args: &XivCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}

fn run_init(args: &XivCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let files = [
		(root.join("main.xiv"), SAMPLE_MAIN),
		(root.join("templates").join("card.xiv"), SAMPLE_CARD),
		(root.join("xiv.toml"), SAMPLE_CONFIG),
	];

	let mut created = 0;
	for (path, content) in &files {
		if path.exists() {
			println!("Already exists: {}", make_relative(path, &root));
			continue;
		}

		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, content)?;
		println!("Created {}", make_relative(path, &root));
		created += 1;
	}

	if created > 0 {
		println!();
		println!("Next steps:");
		println!("  1. Edit main.xiv and the fragments in templates/");
		println!("  2. Run `xiv compile main.xiv` to build index.html");
	}

	Ok(())
}

/// Paths given on the command line for `xiv compile`.
struct CompileFlags<'a> {
	input: &'a Path,
	templates: Option<&'a Path>,
	output: Option<&'a Path>,
	runtime: Option<&'a Path>,
}

/// Absolute paths and options for one `xiv compile` run, after merging the
/// command line with `xiv.toml`.
#[derive(Debug)]
struct CompileSettings {
	root: PathBuf,
	input: PathBuf,
	templates: PathBuf,
	output: PathBuf,
	runtime: Option<PathBuf>,
	options: CompileOptions,
}

fn resolve_settings(
	args: &XivCli,
	flags: &CompileFlags<'_>,
) -> Result<CompileSettings, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = XivConfig::load(&root)?.unwrap_or_default();

	if args.verbose {
		if let Some(config_path) = XivConfig::resolve_path(&root) {
			eprintln!("Using config: {}", make_relative(&config_path, &root));
		}
	}

	let templates = flags.templates.unwrap_or(&config.templates.path);
	let output = flags.output.unwrap_or(&config.output.path);
	let runtime = flags.runtime.or(config.output.runtime.as_deref());

	let settings = CompileSettings {
		input: root.join(flags.input),
		templates: root.join(templates),
		output: root.join(output),
		runtime: runtime.map(|path| root.join(path)),
		options: config.compile_options(),
		root,
	};
	debug!(
		input = %settings.input.display(),
		templates = %settings.templates.display(),
		output = %settings.output.display(),
		max_depth = ?settings.options.max_depth,
		"resolved compile settings"
	);

	Ok(settings)
}

fn run_compile(
	args: &XivCli,
	flags: &CompileFlags<'_>,
	stdout: bool,
	watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let settings = resolve_settings(args, flags)?;

	// Run the initial compilation.
	compile_once(&settings, stdout)?;

	if !watch {
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let (tx, rx) = mpsc::channel();
	let output = settings.output.clone();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				let relevant = matches!(
					event.kind,
					notify::EventKind::Modify(_)
						| notify::EventKind::Create(_)
						| notify::EventKind::Remove(_)
				);
				// Writing the document must not trigger another build.
				let only_output = event.paths.iter().all(|path| path.ends_with(&output));
				if relevant && !only_output {
					debug!(paths = ?event.paths, "file change");
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&settings.root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, recompiling...");
		if let Err(e) = compile_once(&settings, stdout) {
			match e.downcast::<xiv_core::XivError>() {
				Ok(xiv_err) => eprintln!("{:?}", miette::Report::from(*xiv_err)),
				Err(e) => eprintln!("{} {e}", colored!("error:", red)),
			}
		}
	}
}

fn compile_once(settings: &CompileSettings, stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
	let compiler = Compiler::with_options(&settings.templates, settings.options.clone())?;
	let nodes = compiler.compile_file(&settings.input)?;
	let runtime = read_runtime_script(settings.runtime.as_deref());
	let html = render_document(nodes, runtime.as_deref());

	if stdout {
		print!("{html}");
		return Ok(());
	}

	if let Some(parent) = settings.output.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(&settings.output, html)?;

	println!(
		"{} {} {} {}",
		colored!("Compiled", green),
		make_relative(&settings.input, &settings.root),
		colored!("->", bold),
		make_relative(&settings.output, &settings.root)
	);

	Ok(())
}
