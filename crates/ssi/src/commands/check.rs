//! The `check` command.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use ssi_config::{CliSettings, Config};
use ssi_engine::{Engine, EngineOptions};
use ssi_template::Node;

use crate::error::CliError;

/// Arguments for the `check` command.
#[derive(Args)]
pub struct CheckArgs {
    /// Source file, resolved relative to the base directory.
    file: PathBuf,

    /// Emit the parsed node stream as JSON.
    #[arg(long)]
    json: bool,

    /// Base directory for resolving source paths.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Path to the configuration file (default: discover ssi.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl CheckArgs {
    /// Parse the source file and report its structure.
    pub fn execute(self) -> Result<(), CliError> {
        let settings = CliSettings {
            base_dir: self.base_dir,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        let engine = Engine::new(EngineOptions::from_config(&config));

        let nodes = engine.parse_file(&self.file)?;
        let mut stdout = io::stdout().lock();

        if self.json {
            serde_json::to_writer_pretty(&mut stdout, &nodes)?;
            writeln!(stdout)?;
            return Ok(());
        }

        let mut literal_bytes = 0;
        let mut command_count = 0;
        for node in &nodes {
            match node {
                Node::Literal { text } => literal_bytes += text.len(),
                Node::Command { .. } => command_count += 1,
            }
        }
        writeln!(
            stdout,
            "{}: {} nodes ({command_count} commands, {literal_bytes} literal bytes)",
            self.file.display(),
            nodes.len()
        )?;

        for node in &nodes {
            let Node::Command {
                name,
                parameters,
                span,
            } = node
            else {
                continue;
            };
            let params: Vec<String> = parameters
                .iter()
                .map(|(key, value)| format!("{key}={value:?}"))
                .collect();
            writeln!(stdout, "  byte {}: {name} {}", span.start, params.join(" "))?;
        }

        Ok(())
    }
}
