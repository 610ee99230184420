use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::CompileOptions;
use crate::XivError;
use crate::XivResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["xiv.toml", ".xiv.toml", ".config/xiv.toml"];

/// Default template directory, relative to the project root.
pub const DEFAULT_TEMPLATES_PATH: &str = "templates";

/// Default output file, relative to the project root.
pub const DEFAULT_OUTPUT_PATH: &str = "index.html";

/// Configuration loaded from an `xiv.toml` file.
///
/// ```toml
/// [templates]
/// path = "templates"
/// max_depth = 32
///
/// [output]
/// path = "index.html"
/// runtime = "runtime/xiv.js"
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct XivConfig {
	#[serde(default)]
	pub templates: TemplatesConfig,
	#[serde(default)]
	pub output: OutputConfig,
}

/// Where fragments live and how deeply they may nest.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TemplatesConfig {
	/// The template root, relative to the project root.
	#[serde(default = "default_templates_path")]
	pub path: PathBuf,
	/// Maximum number of nested fragment inclusions.
	#[serde(default)]
	pub max_depth: Option<usize>,
}

impl Default for TemplatesConfig {
	fn default() -> Self {
		Self {
			path: default_templates_path(),
			max_depth: None,
		}
	}
}

/// Where the compiled document is written.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
	#[serde(default = "default_output_path")]
	pub path: PathBuf,
	/// Script appended to the compiled document.
	#[serde(default)]
	pub runtime: Option<PathBuf>,
}

impl Default for OutputConfig {
	fn default() -> Self {
		Self {
			path: default_output_path(),
			runtime: None,
		}
	}
}

fn default_templates_path() -> PathBuf {
	PathBuf::from(DEFAULT_TEMPLATES_PATH)
}

fn default_output_path() -> PathBuf {
	PathBuf::from(DEFAULT_OUTPUT_PATH)
}

impl XivConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is none.
	pub fn load(root: &Path) -> XivResult<Option<XivConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: XivConfig =
			toml::from_str(&content).map_err(|e| XivError::ConfigParse(e.to_string()))?;

		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// The compile options described by this config.
	pub fn compile_options(&self) -> CompileOptions {
		CompileOptions {
			max_depth: self.templates.max_depth,
		}
	}
}
