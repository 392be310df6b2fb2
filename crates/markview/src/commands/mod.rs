//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod resources;

pub(crate) use render::RenderArgs;
pub(crate) use resources::ResourcesArgs;

use markview_config::{Config, ResourceSource};
use markview_renderer::{MarkdownParser, RenderOptions, Script, StyleSheet};

use crate::error::CliError;

/// Build a converter from loaded configuration.
///
/// Basics-only mode is applied before the configured resources are added, so
/// host stylesheets and scripts survive it.
pub(crate) fn build_parser(config: &Config) -> Result<MarkdownParser, CliError> {
    let options = RenderOptions {
        escape_html: config.render.escape_html,
        footnote_ref_prefix: config.render.footnote_ref_prefix.clone(),
        footnote_ref_suffix: config.render.footnote_ref_suffix.clone(),
        code_language_class_prefix: config.render.code_language_class_prefix.clone(),
        no_language_class: config.render.no_language_class.clone(),
        emoji_root_path: config.emoji.root_path.clone(),
        emoji_image_extension: config.emoji.image_extension.clone(),
    };
    let mut parser = MarkdownParser::new().with_options(options);

    if config.render.basics_only {
        parser.basics_only();
    }

    for entry in &config.style_sheets {
        let style_sheet = match entry.source()? {
            ResourceSource::External(href) => StyleSheet::external(href)?,
            ResourceSource::Inline(css) => StyleSheet::inline(css)?,
        };
        parser.add_style_sheet(style_sheet);
    }

    for entry in &config.scripts {
        let script = match entry.source()? {
            ResourceSource::External(src) => Script::external(src)?
                .with_defer(entry.defer)
                .with_async(entry.is_async),
            ResourceSource::Inline(code) => Script::inline(code)?,
        };
        parser.add_javascript(script);
    }

    if !config.localization.is_empty() {
        parser.set_localizer(config.localization.clone());
    }

    Ok(parser)
}
