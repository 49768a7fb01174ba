//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Program invoked when nothing else is configured
pub const DEFAULT_TOOL: &str = "gh";

/// Environment variable overriding the issue tool program
pub const TOOL_ENV: &str = "ISSUE_IMPORTER_TOOL";

/// Environment variable overriding the field delimiter
pub const DELIMITER_ENV: &str = "ISSUE_IMPORTER_DELIMITER";

/// Errors raised by the explicit config file or the environment layer
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Cannot read config file {}", path.display())]
    #[diagnostic(code(issue_importer::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {message}", path.display())]
    #[diagnostic(code(issue_importer::config::parse))]
    Parse { path: PathBuf, message: String },

    #[error("Invalid delimiter {value:?}")]
    #[diagnostic(
        code(issue_importer::config::delimiter),
        help("The delimiter must be a single ASCII character, e.g. ',' ';' or '\\t'")
    )]
    Delimiter { value: String },
}

/// Values taken from `ISSUE_IMPORTER_*` environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub tool: Option<String>,
    pub delimiter: Option<String>,
}

impl EnvOverrides {
    /// Read the overrides from the process environment; empty values count as unset
    pub fn from_env() -> Self {
        Self {
            tool: std::env::var(TOOL_ENV).ok().filter(|s| !s.is_empty()),
            delimiter: std::env::var(DELIMITER_ENV).ok().filter(|s| !s.is_empty()),
        }
    }
}

/// One configuration layer as read from YAML; unset fields leave lower layers alone
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    tool: Option<String>,
    tool_args: Option<Vec<String>>,
    delimiter: Option<String>,
}

/// Resolved importer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Issue tool program
    pub tool: String,

    /// Subcommand arguments placed before `--title`/`--body`
    pub tool_args: Vec<String>,

    /// Field delimiter override; `None` means pick by file extension
    pub delimiter: Option<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            tool_args: vec!["issue".to_string(), "create".to_string()],
            delimiter: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// Layers: built-in defaults, the global user config, `explicit` (if
    /// given), then environment variables. Command-line flags are applied by
    /// the caller on top of the result.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let global = Self::global_config_path();
        Self::layered(global.as_deref(), explicit, EnvOverrides::from_env())
    }

    /// Merge the layers from the given sources
    ///
    /// A global file that cannot be read or holds invalid values is logged
    /// and skipped as a whole; an explicit file must be valid.
    pub fn layered(
        global: Option<&Path>,
        explicit: Option<&Path>,
        env: EnvOverrides,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Global user config (~/.config/issue-importer/config.yaml)
        if let Some(global_path) = global.filter(|p| p.exists()) {
            if let Err(e) = Self::read_layer(global_path).and_then(|layer| config.merge(layer)) {
                tracing::warn!("ignoring global config: {}", e);
            }
        }

        if let Some(path) = explicit {
            let layer = Self::read_layer(path)?;
            config.merge(layer)?;
        }

        config.merge(ConfigFile {
            tool: env.tool,
            tool_args: None,
            delimiter: env.delimiter,
        })?;

        Ok(config)
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "issue-importer")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn read_layer(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_layer(&contents, path)
    }

    fn parse_layer(contents: &str, path: &Path) -> Result<ConfigFile, ConfigError> {
        // An empty file deserializes as null
        if contents.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        serde_yml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Merge another layer into this one (other takes precedence)
    ///
    /// The layer is validated before anything is applied, so a rejected
    /// layer leaves `self` untouched.
    fn merge(&mut self, other: ConfigFile) -> Result<(), ConfigError> {
        let delimiter = other
            .delimiter
            .as_deref()
            .map(parse_delimiter)
            .transpose()?;
        if let Some(tool) = other.tool {
            self.tool = tool;
        }
        if let Some(tool_args) = other.tool_args {
            self.tool_args = tool_args;
        }
        if delimiter.is_some() {
            self.delimiter = delimiter;
        }
        Ok(())
    }

    /// Delimiter for the given input path
    ///
    /// An explicit setting always wins; otherwise `.tsv` files are
    /// tab-separated and everything else is comma-separated.
    pub fn delimiter_for(&self, path: &Path) -> u8 {
        if let Some(delimiter) = self.delimiter {
            return delimiter;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        }
    }
}

/// Parse a delimiter given as a single ASCII character or the escape `\t`
pub fn parse_delimiter(value: &str) -> Result<u8, ConfigError> {
    let err = || ConfigError::Delimiter {
        value: value.to_string(),
    };
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(err()),
            }
        }
    }
}
