//! Configuration management for the SSI engine.
//!
//! Parses `ssi.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Values in the `[locals]` table support environment variable
//! expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use ssi_loader::Encoding;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the base directory for source files.
    pub base_dir: Option<PathBuf>,
    /// Override the declared text encoding label.
    pub encoding: Option<String>,
    /// Additional locals, applied over the `[locals]` table.
    pub locals: Vec<(String, String)>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "ssi.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directive delimiter configuration.
    pub template: TemplateConfig,
    /// Source file configuration (paths are relative strings from TOML).
    source: SourceConfigRaw,
    /// Default local values handed to every render.
    pub locals: HashMap<String, String>,

    /// Resolved source configuration (set after loading).
    #[serde(skip)]
    pub source_resolved: SourceConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Directive delimiter configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Opening directive marker.
    pub open_delimiter: String,
    /// Closing directive marker.
    pub close_delimiter: String,
    /// Maximum depth for recursively expanded includes.
    pub max_include_depth: usize,
    /// Whether a command without a registered tag fails the render.
    pub strict_commands: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            open_delimiter: "<!--#".to_owned(),
            close_delimiter: "-->".to_owned(),
            max_include_depth: 10,
            strict_commands: true,
        }
    }
}

/// Raw source configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceConfigRaw {
    base_dir: Option<String>,
    encoding: Option<String>,
}

/// Resolved source configuration with absolute paths.
#[derive(Debug)]
pub struct SourceConfig {
    /// Base directory for resolving source and include paths.
    pub base_dir: PathBuf,
    /// Declared text encoding of source files.
    pub encoding: Encoding,
    /// The raw encoding label, kept for validation messages.
    encoding_label: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            encoding: Encoding::Utf8,
            encoding_label: Encoding::Utf8.label().to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`locals.title`").
        field: String,
        /// Error message (e.g., "${`SITE_TITLE`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `ssi.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings)?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) -> Result<(), ConfigError> {
        if let Some(base_dir) = &settings.base_dir {
            self.source_resolved.base_dir.clone_from(base_dir);
        }
        if let Some(label) = &settings.encoding {
            self.source_resolved.encoding = Encoding::parse_label(label).ok_or_else(|| {
                ConfigError::Validation(format!("unsupported encoding {label:?}"))
            })?;
            self.source_resolved.encoding_label.clone_from(label);
        }
        for (key, value) in &settings.locals {
            self.locals.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            template: TemplateConfig::default(),
            source: SourceConfigRaw::default(),
            locals: HashMap::new(),
            source_resolved: SourceConfig {
                base_dir: base.to_path_buf(),
                ..SourceConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before validation
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.template.open_delimiter, "template.open_delimiter")?;
        require_non_empty(&self.template.close_delimiter, "template.close_delimiter")?;

        if self.template.open_delimiter == self.template.close_delimiter {
            return Err(ConfigError::Validation(
                "template.open_delimiter and template.close_delimiter must differ".to_owned(),
            ));
        }

        if self.template.max_include_depth == 0 {
            return Err(ConfigError::Validation(
                "template.max_include_depth must be greater than 0".to_owned(),
            ));
        }

        let label = &self.source_resolved.encoding_label;
        if Encoding::parse_label(label).is_none() {
            return Err(ConfigError::Validation(format!(
                "source.encoding: unsupported encoding {label:?}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in the `[locals]` table.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        for (key, value) in &mut self.locals {
            let expanded = expand::expand_env(value, &format!("locals.{key}"))?;
            *value = expanded;
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let base_dir = config_dir.join(self.source.base_dir.as_deref().unwrap_or("."));
        let label = self
            .source
            .encoding
            .clone()
            .unwrap_or_else(|| Encoding::Utf8.label().to_owned());
        let encoding = Encoding::parse_label(&label).unwrap_or_default();

        self.source_resolved = SourceConfig {
            base_dir,
            encoding,
            encoding_label: label,
        };

        Ok(())
    }
}
