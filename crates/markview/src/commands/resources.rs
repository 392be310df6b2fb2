//! `markview resources` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use markview_config::{CliSettings, Config};
use markview_renderer::ResourceSet;

use super::build_parser;
use crate::error::CliError;
use crate::source::Source;

/// Arguments for the resources command.
#[derive(Args)]
pub(crate) struct ResourcesArgs {
    /// Markdown file, `-` for stdin, or an http(s):// URL.
    source: String,

    /// Path to configuration file (default: auto-discover markview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plain CommonMark: disable every extension.
    #[arg(long)]
    basics_only: bool,

    /// Timeout in seconds for fetching a URL source (overrides config).
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl ResourcesArgs {
    /// Execute the resources command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the source cannot be read.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            basics_only: self.basics_only.then_some(true),
            timeout_secs: self.timeout,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let parser = build_parser(&config)?;

        let source = Source::parse(&self.source);
        let markdown = source.read(config.source.timeout()).await?;
        let resources = parser.required_resources(&markdown);
        tracing::info!(
            %source,
            style_sheets = resources.style_sheets().len(),
            scripts = resources.scripts().len(),
            "Collected resources"
        );

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(to_json(&resources)?.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

fn to_json(resources: &ResourceSet) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(resources)?)
}
