//! The `render` command.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use ssi_config::{CliSettings, Config};
use ssi_engine::{Engine, EngineOptions};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the `render` command.
#[derive(Args)]
pub struct RenderArgs {
    /// Source file, resolved relative to the base directory.
    file: PathBuf,

    /// Write output to this file instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Local value for the render, as KEY=VALUE (repeatable).
    #[arg(short, long = "local", value_name = "KEY=VALUE")]
    locals: Vec<String>,

    /// Base directory for resolving source and include paths.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Path to the configuration file (default: discover ssi.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RenderArgs {
    /// Render the source file and write the result.
    pub fn execute(self, output: &Output) -> Result<(), CliError> {
        let settings = CliSettings {
            base_dir: self.base_dir,
            encoding: None,
            locals: parse_locals(&self.locals)?,
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        tracing::debug!(config_path = ?config.config_path, "loaded configuration");
        let engine = Engine::new(EngineOptions::from_config(&config));

        let rendered = engine.render_file(&self.file, HashMap::new())?;

        match &self.out {
            Some(path) => {
                std::fs::write(path, &rendered)?;
                output.success(&format!(
                    "Rendered {} -> {}",
                    self.file.display(),
                    path.display()
                ));
            }
            None => {
                io::stdout().write_all(rendered.as_bytes())?;
            }
        }

        Ok(())
    }
}

/// Parse repeated `KEY=VALUE` arguments.
fn parse_locals(raw: &[String]) -> Result<Vec<(String, String)>, CliError> {
    raw.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .ok_or_else(|| {
                    CliError::Validation(format!("invalid --local {arg:?}, expected KEY=VALUE"))
                })
        })
        .collect()
}
