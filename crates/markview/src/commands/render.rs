//! `markview render` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use markview_config::{CliSettings, Config};

use super::build_parser;
use crate::error::CliError;
use crate::output::Output;
use crate::source::Source;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file, `-` for stdin, or an http(s):// URL.
    source: String,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover markview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plain CommonMark: disable every extension.
    #[arg(long)]
    basics_only: bool,

    /// Pass raw HTML through instead of escaping it.
    #[arg(long)]
    no_escape_html: bool,

    /// Base URI of emoji images (overrides config).
    #[arg(long)]
    emoji_root: Option<String>,

    /// Emit only the rendered body, without the document shell.
    #[arg(long)]
    fragment: bool,

    /// Timeout in seconds for fetching a URL source (overrides config).
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the source cannot be read, or
    /// the output cannot be written.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let parser = build_parser(&config)?;

        let source = Source::parse(&self.source);
        let markdown = source.read(config.source.timeout()).await?;

        let html = if self.fragment {
            parser.render_markdown(&markdown).html
        } else {
            parser.build_html(&markdown)
        };

        match &self.output {
            Some(path) => {
                std::fs::write(path, &html)?;
                Output::new().success(&format!("Rendered {source} to {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            escape_html: self.no_escape_html.then_some(false),
            basics_only: self.basics_only.then_some(true),
            emoji_root_path: self.emoji_root.clone(),
            timeout_secs: self.timeout,
        }
    }
}
