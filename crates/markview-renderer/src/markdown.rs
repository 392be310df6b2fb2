//! High-level markdown to HTML document conversion.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::ast::Document;
use crate::document::assemble_document;
use crate::extension::ExtensionSet;
use crate::html::{RenderResult, render_html};
use crate::inline::Localizer;
use crate::options::RenderOptions;
use crate::parser::parse_document;
use crate::resource::{ResourceSet, Script, StyleSheet};

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Markdown to HTML document converter.
///
/// Holds the render options, the active extensions, host-supplied scripts and
/// stylesheets, and an optional localizer. Configuration goes through
/// `&mut self`; conversions take `&self` and build fresh per-render state, so
/// one converter can serve many documents, including from several threads.
///
/// # Example
///
/// ```
/// use markview_renderer::{MarkdownParser, StyleSheet};
///
/// let mut parser = MarkdownParser::new();
/// parser
///     .set_escape_html(false)
///     .add_style_sheet(StyleSheet::external("file:///android_asset/css/theme.css")?);
///
/// let html = parser.build_html("# Title\n\n```js\nlet x = 1;\n```\n");
/// assert!(html.contains("theme.css"));
/// assert!(html.contains("highlight.js"));
/// # Ok::<(), markview_renderer::ResourceError>(())
/// ```
#[derive(Clone, Default)]
pub struct MarkdownParser {
    options: RenderOptions,
    extensions: ExtensionSet,
    resources: ResourceSet,
    localizer: Option<Arc<dyn Localizer>>,
}

impl fmt::Debug for MarkdownParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkdownParser")
            .field("options", &self.options)
            .field("extensions", &self.extensions)
            .field("resources", &self.resources)
            .field("localizer", &self.localizer.is_some())
            .finish()
    }
}

impl MarkdownParser {
    /// Create a converter with every extension and default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the render options.
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the active extensions.
    #[must_use]
    pub fn with_extensions(mut self, extensions: ExtensionSet) -> Self {
        self.extensions = extensions;
        self
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    #[must_use]
    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    /// Host-supplied resources, in insertion order.
    #[must_use]
    pub fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    /// Escape raw HTML in the source (the default) or pass it through.
    pub fn set_escape_html(&mut self, escape: bool) -> &mut Self {
        self.options.escape_html = escape;
        self
    }

    pub fn set_emoji_root_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.options.emoji_root_path = path.into();
        self
    }

    pub fn set_emoji_image_extension(&mut self, extension: impl Into<String>) -> &mut Self {
        self.options.emoji_image_extension = extension.into();
        self
    }

    /// Add a stylesheet to every document. Adding it again is a no-op.
    pub fn add_style_sheet(&mut self, style_sheet: StyleSheet) -> &mut Self {
        self.resources.add_style_sheet(style_sheet);
        self
    }

    /// Replace `old` with `new` at the same position, or remove it when
    /// `new` is `None`.
    pub fn replace_style_sheet(&mut self, old: &StyleSheet, new: Option<StyleSheet>) -> &mut Self {
        self.resources.replace_style_sheet(old, new);
        self
    }

    pub fn remove_style_sheet(&mut self, style_sheet: &StyleSheet) -> &mut Self {
        self.resources.remove_style_sheet(style_sheet);
        self
    }

    /// Add a script to every document. Adding it again is a no-op.
    pub fn add_javascript(&mut self, script: Script) -> &mut Self {
        self.resources.add_script(script);
        self
    }

    pub fn remove_javascript(&mut self, script: &Script) -> &mut Self {
        self.resources.remove_script(script);
        self
    }

    /// Resolve `@{key}` references through `localizer`.
    pub fn set_localizer(&mut self, localizer: impl Localizer + 'static) -> &mut Self {
        let localizer: Arc<dyn Localizer> = Arc::new(localizer);
        self.localizer = Some(localizer);
        self
    }

    pub fn clear_localizer(&mut self) -> &mut Self {
        self.localizer = None;
        self
    }

    /// Switch to plain `CommonMark`: no extensions and no pending resources.
    pub fn basics_only(&mut self) -> &mut Self {
        self.extensions = ExtensionSet::none();
        self.resources.clear();
        self
    }

    /// Parse markdown into a document tree.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Document {
        parse_document(markdown, &self.extensions, self.localizer.as_deref())
    }

    /// Render a parsed document to a fragment.
    #[must_use]
    pub fn render(&self, document: &Document) -> RenderResult {
        render_html(document, &self.options)
    }

    /// Parse and render markdown to a fragment.
    #[must_use]
    pub fn render_markdown(&self, markdown: &str) -> RenderResult {
        self.render(&self.parse(markdown))
    }

    /// Every resource a document needs: host-supplied ones first, then those
    /// registered while rendering.
    #[must_use]
    pub fn required_resources(&self, markdown: &str) -> ResourceSet {
        self.merged_resources(&self.render_markdown(markdown))
    }

    fn merged_resources(&self, result: &RenderResult) -> ResourceSet {
        let mut resources = self.resources.clone();
        resources.extend_from(&result.resources);
        resources
    }

    /// Convert markdown to a complete HTML document.
    #[must_use]
    pub fn build_html(&self, markdown: &str) -> String {
        let start = Instant::now();
        let result = self.render_markdown(markdown);
        let resources = self.merged_resources(&result);
        let html = assemble_document(&result.html, &resources);
        tracing::debug!(
            input_bytes = markdown.len(),
            output_bytes = html.len(),
            style_sheets = resources.style_sheets().len(),
            scripts = resources.scripts().len(),
            elapsed_ms = elapsed_ms(start),
            "Markdown rendered"
        );
        html
    }
}

#[cfg(test)]
mod tests {
    static_assertions::assert_impl_all!(super::MarkdownParser: Send, Sync);

    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::resource::ResourceKey;

    fn head(html: &str) -> &str {
        let start = html.find("<head>\n").unwrap() + "<head>\n".len();
        let end = html.find("</head>").unwrap();
        &html[start..end]
    }

    #[test]
    fn test_build_html_shell() {
        let html = MarkdownParser::new().build_html("hi");
        assert_eq!(
            html,
            "<html>\n<head>\n</head>\n<body>\n<div class=\"container\">\n<p>hi</p>\n</div>\n</body>\n</html>"
        );
    }

    #[test]
    fn test_heading_trigger_in_document() {
        let html = MarkdownParser::new().build_html("# Hello\n");
        assert!(html.contains(
            "<h1 onclick=\"javascript:android.onHeadingTap(1, 'Hello');\">Hello</h1>"
        ));
    }

    #[test]
    fn test_user_resources_precede_render_resources() {
        let mut parser = MarkdownParser::new();
        parser
            .add_javascript(Script::external("file:///android_asset/js/jquery-3.1.1.min.js").unwrap())
            .add_style_sheet(StyleSheet::external("theme.css").unwrap());
        let html = parser.build_html("```js\nx\n```\n\n*[A]: b\n\nA");
        assert_eq!(
            head(&html),
            "<link rel=\"stylesheet\" type=\"text/css\" href=\"theme.css\" />\n\
             <link rel=\"stylesheet\" type=\"text/css\" href=\"file:///android_asset/css/tooltipster.bundle.min.css\" />\n\
             <script src=\"file:///android_asset/js/jquery-3.1.1.min.js\"></script>\n\
             <script src=\"file:///android_asset/js/highlight.js\" defer></script>\n\
             <script src=\"file:///android_asset/js/highlight-init.js\" defer></script>\n\
             <script src=\"file:///android_asset/js/tooltipster.bundle.min.js\" defer></script>\n\
             <script src=\"file:///android_asset/js/tooltipster-init.js\" defer></script>\n"
        );
    }

    #[test]
    fn test_user_resource_not_duplicated_by_render() {
        let mut parser = MarkdownParser::new();
        if let crate::resource::Resource::Script(script) = ResourceKey::HighlightJs.resource() {
            parser.add_javascript(script);
        }
        let resources = parser.required_resources("```js\nx\n```\n");
        assert_eq!(resources.scripts().len(), 2);
        assert!(resources.scripts()[0].source().ends_with("highlight.js"));
    }

    #[test]
    fn test_renders_do_not_bleed() {
        let parser = MarkdownParser::new();
        let with_code = parser.required_resources("```js\nx\n```\n");
        assert_eq!(with_code.scripts().len(), 2);
        let plain = parser.required_resources("plain");
        assert!(plain.is_empty());
    }

    #[test]
    fn test_add_same_style_sheet_twice() {
        let mut parser = MarkdownParser::new();
        let css = StyleSheet::external("a.css").unwrap();
        parser.add_style_sheet(css.clone()).add_style_sheet(css.clone());
        assert_eq!(parser.resources().style_sheets(), &[css]);
    }

    #[test]
    fn test_remove_never_added_is_noop() {
        let mut parser = MarkdownParser::new();
        parser.remove_javascript(&Script::external("x.js").unwrap());
        parser.remove_style_sheet(&StyleSheet::external("x.css").unwrap());
        assert!(parser.resources().is_empty());
    }

    #[test]
    fn test_basics_only() {
        let mut parser = MarkdownParser::new();
        parser
            .add_style_sheet(StyleSheet::external("a.css").unwrap())
            .basics_only();
        let html = parser.build_html("| a |\n|---|\n| b |\n\n- [ ] task :smile: ==m==\n");
        assert!(head(&html).is_empty());
        assert!(!html.contains("<table>"));
        assert!(!html.contains("checkbox"));
        assert!(!html.contains("emoji"));
        assert!(!html.contains("<mark"));
        assert!(html.contains(":smile:"));
    }

    #[test]
    fn test_escape_html_toggle() {
        let mut parser = MarkdownParser::new();
        assert!(parser.build_html("<b>x</b>").contains("&lt;b&gt;"));
        parser.set_escape_html(false);
        assert!(parser.build_html("<b>x</b>").contains("<b>x</b>"));
    }

    #[test]
    fn test_emoji_settings() {
        let mut parser = MarkdownParser::new();
        parser
            .set_emoji_root_path("https://cdn.example.com/emoji")
            .set_emoji_image_extension("svg");
        let html = parser.render_markdown(":rocket:").html;
        assert!(html.contains(r#"src="https://cdn.example.com/emoji/rocket.svg""#));
    }

    #[test]
    fn test_localizer() {
        let mut strings = HashMap::new();
        strings.insert("greeting".to_owned(), "Olá".to_owned());
        let mut parser = MarkdownParser::new();
        parser.set_localizer(strings);
        assert_eq!(parser.render_markdown("@{greeting}!").html, "<p>Olá!</p>\n");
        assert_eq!(
            parser.render_markdown("@{unknown}").html,
            "<p>@{unknown}</p>\n"
        );
        parser.clear_localizer();
        assert_eq!(
            parser.render_markdown("@{greeting}").html,
            "<p>@{greeting}</p>\n"
        );
    }

    #[test]
    fn test_replace_style_sheet() {
        let a = StyleSheet::external("a.css").unwrap();
        let b = StyleSheet::external("b.css").unwrap();
        let c = StyleSheet::external("c.css").unwrap();
        let mut parser = MarkdownParser::new();
        parser
            .add_style_sheet(a.clone())
            .add_style_sheet(b.clone())
            .replace_style_sheet(&a, Some(c.clone()));
        assert_eq!(parser.resources().style_sheets(), &[c.clone(), b.clone()]);
        parser.replace_style_sheet(&c, None);
        assert_eq!(parser.resources().style_sheets(), &[b]);
    }

    #[test]
    fn test_parse_then_render() {
        let parser = MarkdownParser::new();
        let doc = parser.parse("$$x$$");
        let result = parser.render(&doc);
        assert!(result.html.contains(r"\[x\]"));
        assert_eq!(result.resources.scripts().len(), 2);
    }

    #[test]
    fn test_arbitrary_input_does_not_panic() {
        let parser = MarkdownParser::new();
        for input in [
            "",
            "\n\n\n",
            "@",
            "@[",
            "@[youtube](",
            "{{|}}",
            "----",
            "-- --",
            ":::",
            "*[",
            "*[]:",
            "$$",
            "[^",
            "| |\n|-|",
            "==\u{1F600}==",
            "é@@ü@@",
            "```\n*[A]: b",
        ] {
            let html = parser.build_html(input);
            assert!(html.starts_with("<html>\n"));
            assert!(html.ends_with("</html>"));
        }
    }

    #[test]
    fn test_deeply_nested_block_quotes_render() {
        let markdown = ">".repeat(100_000) + " x\n";
        let html = MarkdownParser::new().render_markdown(&markdown).html;
        assert!(html.contains("<p>x</p>"));
        assert!(html.matches("<blockquote>").count() < 100);
    }

    #[test]
    fn test_deeply_nested_emphasis_renders() {
        let stars = "*".repeat(20_000);
        let html = MarkdownParser::new()
            .render_markdown(&format!("{stars}x{stars}"))
            .html;
        assert!(html.starts_with("<p>"));
        assert!(html.contains('x'));
    }

    #[test]
    fn test_escaped_extension_syntax_is_literal() {
        let parser = MarkdownParser::new();
        let result = parser.render_markdown("\\:smile\\: and \\=\\=x\\=\\= or &#58;tada&#58;\n");
        assert_eq!(result.html, "<p>:smile: and ==x== or :tada:</p>\n");
        assert!(result.resources.is_empty());

        let html = parser.render_markdown("\\@[youtube](dQw4w9WgXcQ)").html;
        assert!(html.starts_with("<p>@<a href=\"dQw4w9WgXcQ\""));
        assert!(!html.contains("iframe"));
    }

    #[test]
    fn test_escape_applies_to_one_character() {
        let html = MarkdownParser::new().render_markdown("\\==x== \\\\==y==").html;
        assert_eq!(
            html,
            "<p>==x== \\<mark onclick=\"javascript:android.onMarkTap(this.textContent);\">y</mark></p>\n"
        );
    }

    #[test]
    fn test_unclosed_openers_render_quickly() {
        let parser = MarkdownParser::new();
        for markdown in ["{{".repeat(40_000), "@@ ".repeat(30_000), ":a ".repeat(30_000)] {
            let started = std::time::Instant::now();
            let html = parser.render_markdown(&markdown).html;
            assert!(started.elapsed() < std::time::Duration::from_secs(3));
            assert!(html.starts_with("<p>"));
        }
    }
}
