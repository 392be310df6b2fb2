//! HTML serialization of a document tree.
//!
//! Walks the tree depth-first, asking the decorator for each element's
//! attributes. Resources registered on the way are collected into the
//! render's own [`ResourceSet`].

use std::collections::HashMap;
use std::fmt::Write;

use crate::ast::{Alignment, Document, Node, TableCell};
use crate::decorator::{AttributablePart, Attributes, decorate};
use crate::options::RenderOptions;
use crate::resource::ResourceSet;
use crate::util::escape_html;

/// Result of rendering a document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// HTML fragment.
    pub html: String,
    /// Resources registered while rendering, in first-use order.
    pub resources: ResourceSet,
}

/// Render a document to an HTML fragment.
///
/// # Example
///
/// ```
/// use markview_renderer::{ExtensionSet, RenderOptions, parse_document, render_html};
///
/// let doc = parse_document("==hi==", &ExtensionSet::all(), None);
/// let result = render_html(&doc, &RenderOptions::default());
/// assert_eq!(
///     result.html,
///     "<p><mark onclick=\"javascript:android.onMarkTap(this.textContent);\">hi</mark></p>\n"
/// );
/// ```
#[must_use]
pub fn render_html(document: &Document, options: &RenderOptions) -> RenderResult {
    let mut writer = HtmlWriter::new(document, options);
    writer.nodes(&document.children);
    writer.footnotes();
    RenderResult {
        html: writer.out,
        resources: writer.resources,
    }
}

struct HtmlWriter<'d> {
    options: &'d RenderOptions,
    out: String,
    resources: ResourceSet,
    /// Footnote definitions by label.
    definitions: HashMap<&'d str, &'d [Node]>,
    /// Referenced footnote labels, in order of first reference.
    referenced: Vec<&'d str>,
}

impl<'d> HtmlWriter<'d> {
    fn new(document: &'d Document, options: &'d RenderOptions) -> Self {
        let mut definitions = HashMap::new();
        document.walk(&mut |node| {
            if let Node::FootnoteDefinition { label, children } = node {
                definitions.entry(label.as_str()).or_insert(children.as_slice());
            }
        });
        Self {
            options,
            out: String::with_capacity(4096),
            resources: ResourceSet::new(),
            definitions,
            referenced: Vec::new(),
        }
    }

    fn attrs(&mut self, node: &Node) -> Attributes {
        decorate(node, AttributablePart::Node, &mut self.resources)
    }

    fn open(&mut self, tag: &str, attributes: &Attributes) {
        write!(self.out, "<{tag}{}>", attributes.to_html()).unwrap();
    }

    fn text(&mut self, text: &str) {
        self.out.push_str(&escape_html(text));
    }

    fn raw_html(&mut self, html: &str) {
        if self.options.escape_html {
            self.text(html);
        } else {
            self.out.push_str(html);
        }
    }

    fn nodes(&mut self, nodes: &'d [Node]) {
        for node in nodes {
            self.node(node);
        }
    }

    /// Element with decorator attributes around rendered children.
    fn wrap(&mut self, tag: &str, node: &'d Node, children: &'d [Node]) {
        let attributes = self.attrs(node);
        self.open(tag, &attributes);
        self.nodes(children);
        write!(self.out, "</{tag}>").unwrap();
    }

    /// Element with decorator attributes around escaped text.
    fn wrap_text(&mut self, tag: &str, mut attributes: Attributes, node: &Node, text: &str) {
        attributes.merge(self.attrs(node));
        self.open(tag, &attributes);
        self.text(text);
        write!(self.out, "</{tag}>").unwrap();
    }

    #[allow(clippy::too_many_lines)]
    fn node(&mut self, node: &'d Node) {
        match node {
            Node::Heading {
                level, children, ..
            } => {
                self.wrap(&format!("h{level}"), node, children);
                self.out.push('\n');
            }
            Node::Paragraph(children) => {
                match children.as_slice() {
                    [only] if is_block_embed(only) => self.embed(only, true),
                    _ => self.wrap("p", node, children),
                }
                self.out.push('\n');
            }
            Node::BlockQuote(children) => {
                self.out.push_str("<blockquote>\n");
                self.nodes(children);
                self.out.push_str("</blockquote>\n");
            }
            Node::CodeBlock(content) => {
                self.out.push_str("<pre><code>");
                self.text(content);
                self.out.push_str("</code></pre>\n");
            }
            Node::FencedCodeBlock {
                language, content, ..
            } => self.fenced_code(node, language, content),
            Node::HtmlBlock(html) => {
                self.raw_html(html);
                if !html.ends_with('\n') {
                    self.out.push('\n');
                }
            }
            Node::List { start, items } => {
                let tag = match start {
                    Some(1) => "<ol>".to_owned(),
                    Some(n) => format!(r#"<ol start="{n}">"#),
                    None => "<ul>".to_owned(),
                };
                self.out.push_str(&tag);
                self.out.push('\n');
                self.nodes(items);
                self.out
                    .push_str(if start.is_some() { "</ol>\n" } else { "</ul>\n" });
            }
            Node::ListItem(children) => {
                self.out.push_str("<li>");
                self.nodes(children);
                self.out.push_str("</li>\n");
            }
            Node::TaskListItem { checked, children } => {
                self.out.push_str(r#"<li class="task-list-item"><input type="checkbox" class="task-list-item-checkbox" disabled="disabled""#);
                if *checked {
                    self.out.push_str(r#" checked="checked""#);
                }
                self.out.push_str(" />");
                self.nodes(children);
                self.out.push_str("</li>\n");
            }
            Node::Table {
                alignments,
                head,
                rows,
            } => self.table(alignments, head, rows),
            Node::ThematicBreak => self.out.push_str("<hr />\n"),
            // Rendered in the trailing footnote section
            Node::FootnoteDefinition { .. } => {}
            Node::Math { .. } | Node::VideoLink { .. } | Node::Tweet(_) => self.embed(node, false),

            Node::Text(text) | Node::LocalizedText { text, .. } => self.text(text),
            Node::Code(code) => {
                self.out.push_str("<code>");
                self.text(code);
                self.out.push_str("</code>");
            }
            Node::InlineHtml(html) => self.raw_html(html),
            Node::SoftBreak => self.out.push('\n'),
            Node::HardBreak => self.out.push_str("<br />\n"),
            Node::Emphasis(children) => self.wrap("em", node, children),
            Node::Strong(children) => self.wrap("strong", node, children),
            Node::Strikethrough(children) => self.wrap("del", node, children),
            Node::Subscript(children) => self.wrap("sub", node, children),
            Node::Superscript(children) => self.wrap("sup", node, children),
            Node::Mark(text) => self.wrap_text("mark", Attributes::new(), node, text),
            Node::Keystroke(text) => self.wrap_text("kbd", Attributes::new(), node, text),
            Node::Link {
                url,
                title,
                children,
            } => {
                let mut attributes = Attributes::new();
                attributes.set("href", url.as_str());
                if !title.is_empty() {
                    attributes.set("title", title.as_str());
                }
                attributes.merge(self.attrs(node));
                self.open("a", &attributes);
                self.nodes(children);
                self.out.push_str("</a>");
            }
            Node::AutoLink { url, text } => {
                let mut attributes = Attributes::new();
                attributes.set("href", url.as_str());
                self.wrap_text("a", attributes, node, text);
            }
            Node::Image { src, title, alt } => {
                let mut attributes = Attributes::new();
                attributes.set("src", src.as_str());
                attributes.set("alt", alt.as_str());
                if !title.is_empty() {
                    attributes.set("title", title.as_str());
                }
                attributes.merge(self.attrs(node));
                write!(self.out, "<img{} />", attributes.to_html()).unwrap();
            }
            Node::Abbreviation { abbr, expansion } => {
                let mut attributes = Attributes::new();
                attributes.set("title", expansion.as_str());
                self.wrap_text("abbr", attributes, node, abbr);
            }
            Node::FootnoteReference(label) => self.footnote_reference(label),
            Node::Emoji(name) => {
                let mut attributes = Attributes::new();
                attributes.set("class", "emoji");
                attributes.set("src", self.options.emoji_src(name));
                attributes.set("alt", format!(":{name}:"));
                attributes.merge(self.attrs(node));
                write!(self.out, "<img{} />", attributes.to_html()).unwrap();
            }
            Node::Label { kind, text } => {
                let mut attributes = Attributes::new();
                attributes.add_value("class", "label");
                attributes.add_value("class", &format!("label-{}", kind.as_str()));
                self.wrap_text("span", attributes, node, text);
            }
            Node::Button { text, .. } => {
                let mut attributes = Attributes::new();
                attributes.set("type", "button");
                attributes.add_value("class", "btn");
                attributes.add_value("class", "btn-default");
                self.wrap_text("button", attributes, node, text);
            }
        }
    }

    /// Math and embeds. A paragraph holding nothing else renders them as
    /// blocks; inside running text the containers are spans.
    fn embed(&mut self, node: &Node, block: bool) {
        let container = if block { "div" } else { "span" };
        match node {
            Node::Math { tex, display } => {
                let mut attributes = Attributes::new();
                attributes.add_value("class", "math");
                attributes.merge(self.attrs(node));
                let tex = escape_html(tex);
                if *display {
                    write!(
                        self.out,
                        r"<{container}{}>\[{tex}\]</{container}>",
                        attributes.to_html()
                    )
                    .unwrap();
                } else {
                    write!(self.out, r"<span{}>\({tex}\)</span>", attributes.to_html()).unwrap();
                }
            }
            Node::VideoLink { provider, id } => {
                let mut attributes = Attributes::new();
                attributes.set("src", provider.embed_url(id));
                attributes.set("frameborder", "0");
                attributes.set("allowfullscreen", "allowfullscreen");
                attributes.merge(self.attrs(node));
                write!(
                    self.out,
                    "<{container} class=\"video-container\"><iframe{}></iframe></{container}>",
                    attributes.to_html()
                )
                .unwrap();
            }
            Node::Tweet(url) => {
                let tag = if block { "blockquote" } else { "span" };
                let mut attributes = Attributes::new();
                attributes.set("href", url.as_str());
                attributes.merge(self.attrs(node));
                write!(
                    self.out,
                    "<{tag} class=\"twitter-tweet\"><a{}></a></{tag}>",
                    attributes.to_html()
                )
                .unwrap();
            }
            _ => {}
        }
    }

    fn fenced_code(&mut self, node: &Node, language: &str, content: &str) {
        let pre = self.attrs(node);

        let mut code = Attributes::new();
        let class = if language.is_empty() {
            self.options.no_language_class.clone()
        } else {
            format!("{}{language}", self.options.code_language_class_prefix)
        };
        if !class.is_empty() {
            code.add_value("class", &class);
        }
        code.merge(decorate(node, AttributablePart::Content, &mut self.resources));

        self.open("pre", &pre);
        self.open("code", &code);
        self.text(content);
        self.out.push_str("</code></pre>\n");
    }

    fn table(&mut self, alignments: &[Alignment], head: &'d [TableCell], rows: &'d [Vec<TableCell>]) {
        self.out.push_str("<table>\n<thead>\n");
        self.table_row("th", alignments, head);
        self.out.push_str("</thead>\n");
        if !rows.is_empty() {
            self.out.push_str("<tbody>\n");
            for row in rows {
                self.table_row("td", alignments, row);
            }
            self.out.push_str("</tbody>\n");
        }
        self.out.push_str("</table>\n");
    }

    fn table_row(&mut self, tag: &str, alignments: &[Alignment], cells: &'d [TableCell]) {
        self.out.push_str("<tr>");
        for (index, cell) in cells.iter().enumerate() {
            let align = match alignments.get(index).copied().unwrap_or_default() {
                Alignment::None => "",
                Alignment::Left => r#" align="left""#,
                Alignment::Center => r#" align="center""#,
                Alignment::Right => r#" align="right""#,
            };
            write!(self.out, "<{tag}{align}>").unwrap();
            self.nodes(cell);
            write!(self.out, "</{tag}>").unwrap();
        }
        self.out.push_str("</tr>\n");
    }

    fn footnote_reference(&mut self, label: &'d str) {
        if !self.definitions.contains_key(label) {
            write!(self.out, "[^{}]", escape_html(label)).unwrap();
            return;
        }
        let number = match self.referenced.iter().position(|l| *l == label) {
            Some(index) => index + 1,
            None => {
                self.referenced.push(label);
                self.referenced.len()
            }
        };
        write!(
            self.out,
            r##"<sup id="fnref-{number}" class="footnote-ref"><a href="#fn-{number}">{}{number}{}</a></sup>"##,
            escape_html(&self.options.footnote_ref_prefix),
            escape_html(&self.options.footnote_ref_suffix),
        )
        .unwrap();
    }

    /// Trailing list of referenced footnotes, numbered by first reference.
    fn footnotes(&mut self) {
        if self.referenced.is_empty() {
            return;
        }
        self.out
            .push_str("<div class=\"footnotes\">\n<hr />\n<ol>\n");
        // Definitions may reference footnotes not yet seen
        let mut index = 0;
        while let Some(&label) = self.referenced.get(index) {
            index += 1;
            writeln!(self.out, "<li id=\"fn-{index}\">").unwrap();
            if let Some(children) = self.definitions.get(label).copied() {
                self.nodes(children);
            }
            writeln!(
                self.out,
                "<a href=\"#fnref-{index}\" class=\"footnote-backref\">&#8617;</a>\n</li>"
            )
            .unwrap();
        }
        self.out.push_str("</ol>\n</div>\n");
    }
}

fn is_block_embed(node: &Node) -> bool {
    matches!(
        node,
        Node::Math { display: true, .. } | Node::VideoLink { .. } | Node::Tweet(_)
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::extension::ExtensionSet;
    use crate::parser::parse_document;
    use crate::resource::Script;

    fn render(markdown: &str) -> RenderResult {
        let doc = parse_document(markdown, &ExtensionSet::all(), None);
        render_html(&doc, &RenderOptions::default())
    }

    fn render_with(markdown: &str, options: &RenderOptions) -> RenderResult {
        let doc = parse_document(markdown, &ExtensionSet::all(), None);
        render_html(&doc, options)
    }

    fn script_sources(result: &RenderResult) -> Vec<&str> {
        result.resources.scripts().iter().map(Script::source).collect()
    }

    #[test]
    fn test_heading() {
        assert_eq!(
            render("# Hello\n").html,
            "<h1 onclick=\"javascript:android.onHeadingTap(1, 'Hello');\">Hello</h1>\n"
        );
    }

    #[test]
    fn test_heading_with_quote() {
        let result = render("## It's here\n");
        assert!(result.html.contains(r"onHeadingTap(2, 'It\'s here');"));
    }

    #[test]
    fn test_fenced_code_js() {
        let result = render("```js\ncode\n```");
        assert_eq!(
            result.html,
            "<pre language=\"js\" onclick=\"javascript:android.onCodeTap('js', this.textContent);\"><code class=\"js\">code\n</code></pre>\n"
        );
        assert_eq!(
            script_sources(&result),
            vec![
                "file:///android_asset/js/highlight.js",
                "file:///android_asset/js/highlight-init.js",
            ]
        );
    }

    #[test]
    fn test_fenced_code_nohighlight() {
        let result = render("```nohighlight\ncode\n```");
        assert_eq!(
            result.html,
            "<pre><code class=\"nohighlight\">code\n</code></pre>\n"
        );
        assert!(result.resources.is_empty());
    }

    #[test]
    fn test_fenced_code_without_language() {
        let result = render("```\n<b>\n```");
        assert_eq!(
            result.html,
            "<pre><code class=\"nohighlight\">&lt;b&gt;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_code_language_prefix() {
        let options = RenderOptions {
            code_language_class_prefix: "language-".to_owned(),
            ..RenderOptions::default()
        };
        let result = render_with("```rust\nfn main() {}\n```", &options);
        assert!(result.html.contains(r#"<code class="language-rust">"#));
    }

    #[test]
    fn test_two_images_one_trigger_each() {
        let result = render("![a](x.png) ![a](x.png)");
        assert_eq!(result.html.matches("onImageTap").count(), 2);
        assert!(result.resources.is_empty());
    }

    #[test]
    fn test_image_attributes() {
        assert_eq!(
            render("![alt](x.png \"T\")").html,
            "<p><img src=\"x.png\" alt=\"alt\" title=\"T\" onclick=\"javascript:android.onImageTap(this.src, this.clientWidth, this.clientHeight);\" /></p>\n"
        );
    }

    #[test]
    fn test_link() {
        assert_eq!(
            render("[a](https://x.org)").html,
            "<p><a href=\"https://x.org\" onclick=\"javascript:android.onLinkTap(this.href, this.textContent);\">a</a></p>\n"
        );
    }

    #[test]
    fn test_autolink() {
        let html = render("see www.rust-lang.org").html;
        assert!(html.contains(
            "<a href=\"http://www.rust-lang.org\" onclick=\"javascript:android.onLinkTap(this.href, this.textContent);\">www.rust-lang.org</a>"
        ));
    }

    #[test]
    fn test_keystroke_and_mark() {
        let html = render("@@Ctrl@@ ==hi==").html;
        assert!(html.contains(
            "<kbd onclick=\"javascript:android.onKeystrokeTap(this.textContent);\">Ctrl</kbd>"
        ));
        assert!(html.contains(
            "<mark onclick=\"javascript:android.onMarkTap(this.textContent);\">hi</mark>"
        ));
    }

    #[test]
    fn test_label_and_button() {
        let html = render("----careful---- {{ok|OK}}").html;
        assert!(html.contains(r#"<span class="label label-warning">careful</span>"#));
        assert!(html.contains(
            "<button type=\"button\" class=\"btn btn-default\" onclick=\"javascript:android.onButtonTap('ok');\">OK</button>"
        ));
    }

    #[test]
    fn test_emoji() {
        let options = RenderOptions {
            emoji_root_path: "https://e.org/img".to_owned(),
            ..RenderOptions::default()
        };
        assert_eq!(
            render_with(":smile:", &options).html,
            "<p><img class=\"emoji\" src=\"https://e.org/img/smile.png\" alt=\":smile:\" /></p>\n"
        );
    }

    #[test]
    fn test_abbreviation() {
        let result = render("HTML rocks\n\n*[HTML]: Hyper Text Markup Language\n");
        assert_eq!(
            result.html,
            "<p><abbr title=\"Hyper Text Markup Language\" class=\"tooltip\">HTML</abbr> rocks</p>\n"
        );
        assert_eq!(result.resources.style_sheets().len(), 1);
        assert_eq!(result.resources.scripts().len(), 2);
    }

    #[test]
    fn test_math() {
        let result = render("$a$\n\n$$b$$\n");
        assert!(result.html.contains(r#"<p><span class="math">\(a\)</span></p>"#));
        assert!(result.html.contains("<div class=\"math\">\\[b\\]</div>\n"));
        assert!(!result.html.contains("<p><div"));
        assert_eq!(result.resources.scripts().len(), 2);
    }

    #[test]
    fn test_display_math_in_running_text() {
        let html = render("see $$b$$ here").html;
        assert_eq!(html, "<p>see <span class=\"math\">\\[b\\]</span> here</p>\n");
    }

    #[test]
    fn test_resources_follow_node_order() {
        let result = render("$x$\n\n```js\ny\n```\n");
        let sources = script_sources(&result);
        assert!(sources[0].contains("MathJax"));
        assert!(sources[2].ends_with("highlight.js"));
    }

    #[test]
    fn test_raw_html_escaped_by_default() {
        let result = render("<div>hi</div>\n\nA <b>b</b>");
        assert!(result.html.contains("&lt;div&gt;hi&lt;/div&gt;"));
        assert!(result.html.contains("A &lt;b&gt;b&lt;/b&gt;"));
    }

    #[test]
    fn test_raw_html_passthrough() {
        let options = RenderOptions {
            escape_html: false,
            ..RenderOptions::default()
        };
        let result = render_with("<div>hi</div>\n\nA <b>b</b>", &options);
        assert!(result.html.contains("<div>hi</div>\n"));
        assert!(result.html.contains("A <b>b</b>"));
    }

    #[test]
    fn test_task_list() {
        let html = render("- [x] done\n- [ ] todo\n").html;
        assert_eq!(
            html,
            "<ul>\n\
             <li class=\"task-list-item\"><input type=\"checkbox\" class=\"task-list-item-checkbox\" disabled=\"disabled\" checked=\"checked\" />done</li>\n\
             <li class=\"task-list-item\"><input type=\"checkbox\" class=\"task-list-item-checkbox\" disabled=\"disabled\" />todo</li>\n\
             </ul>\n"
        );
    }

    #[test]
    fn test_table() {
        let html = render("| a | b |\n|:-:|---|\n| 1 | 2 |\n").html;
        assert_eq!(
            html,
            "<table>\n<thead>\n<tr><th align=\"center\">a</th><th>b</th></tr>\n</thead>\n\
             <tbody>\n<tr><td align=\"center\">1</td><td>2</td></tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_footnotes_numbered_by_first_reference() {
        let html = render("A[^b] B[^a] C[^b]\n\n[^a]: Alpha\n\n[^b]: Beta\n").html;
        assert!(html.contains(
            r##"A<sup id="fnref-1" class="footnote-ref"><a href="#fn-1">[1]</a></sup>"##
        ));
        assert!(html.contains(r##"B<sup id="fnref-2" class="footnote-ref"><a href="#fn-2">[2]</a></sup>"##));
        let section = &html[html.find("<div class=\"footnotes\">").unwrap()..];
        let beta = section.find("Beta").unwrap();
        let alpha = section.find("Alpha").unwrap();
        assert!(beta < alpha);
        assert!(section.contains(r##"<a href="#fnref-1" class="footnote-backref">&#8617;</a>"##));
    }

    #[test]
    fn test_footnote_custom_brackets() {
        let options = RenderOptions {
            footnote_ref_prefix: String::new(),
            footnote_ref_suffix: String::new(),
            ..RenderOptions::default()
        };
        let html = render_with("x[^1]\n\n[^1]: y\n", &options).html;
        assert!(html.contains(r##"href="#fn-1">1</a>"##));
    }

    #[test]
    fn test_unreferenced_footnote_hidden() {
        let html = render("text\n\n[^1]: unused\n").html;
        assert!(!html.contains("footnotes"));
        assert!(!html.contains("unused"));
    }

    #[test]
    fn test_video_and_tweet() {
        let result = render("@[youtube](abc123)\n\n@[twitter](https://twitter.com/a/status/1)");
        assert_eq!(
            result.html,
            "<div class=\"video-container\"><iframe src=\"https://www.youtube.com/embed/abc123\" frameborder=\"0\" allowfullscreen=\"allowfullscreen\"></iframe></div>\n\
             <blockquote class=\"twitter-tweet\"><a href=\"https://twitter.com/a/status/1\"></a></blockquote>\n"
        );
        assert_eq!(
            script_sources(&result),
            vec!["https://platform.twitter.com/widgets.js"]
        );
    }

    #[test]
    fn test_embeds_in_running_text_use_spans() {
        let result = render(
            "Watch @[vimeo](42) and @[twitter](https://twitter.com/a/status/1) and \
             @[twitter](https://twitter.com/b/status/2)",
        );
        assert!(!result.html.contains("<p><div"));
        assert!(!result.html.contains("<blockquote"));
        assert!(!result.html.contains("<script"));
        assert!(result.html.starts_with(
            "<p>Watch <span class=\"video-container\"><iframe src=\"https://player.vimeo.com/video/42\""
        ));
        assert!(result.html.contains(
            r#"<span class="twitter-tweet"><a href="https://twitter.com/a/status/1"></a></span>"#
        ));
        assert_eq!(result.resources.scripts().len(), 1);
    }

    #[test]
    fn test_basics_only_literal() {
        let doc = parse_document("- [ ] a :smile: | x |", &ExtensionSet::none(), None);
        let result = render_html(&doc, &RenderOptions::default());
        assert_eq!(result.html, "<ul>\n<li>[ ] a :smile: | x |</li>\n</ul>\n");
        assert!(result.resources.is_empty());
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render("").html, "");
    }
}
