//! Markdown to document tree.
//!
//! Block structure and the `CommonMark` inline grammar come from
//! `pulldown-cmark`. Its event stream is folded into a [`Document`] with a
//! frame stack; when a frame closes, its literal text children are handed to
//! the text-scanning extensions. Text produced by a backslash escape or a
//! character reference is never scanned.

use std::borrow::Cow;
use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Parser, Tag, TagEnd};

use crate::ast::{Alignment, Document, Node, TableCell, plain_text};
use crate::extension::{Extension, ExtensionSet};
use crate::inline::{self, Abbreviations, Localizer, ParseContext};
use crate::util::heading_level_to_num;

/// Open frames beyond which nesting constructs are flattened into their
/// parent. Keeps the tree shallow enough for recursive rendering.
const MAX_NESTING: usize = 64;

/// Parse markdown with the given extensions into a document tree.
///
/// Parsing is total: malformed extension syntax is kept as literal text.
///
/// # Example
///
/// ```
/// use markview_renderer::{ExtensionSet, Node, parse_document};
///
/// let doc = parse_document("==hi==", &ExtensionSet::all(), None);
/// assert_eq!(doc.children, vec![Node::Paragraph(vec![Node::Mark("hi".to_owned())])]);
/// ```
#[must_use]
pub fn parse_document(
    markdown: &str,
    extensions: &ExtensionSet,
    localizer: Option<&dyn Localizer>,
) -> Document {
    let (source, abbreviations) = if extensions.contains(Extension::Abbreviation) {
        let (body, abbreviations) = inline::extract_definitions(markdown);
        (Cow::Owned(body), abbreviations)
    } else {
        (Cow::Borrowed(markdown), Abbreviations::default())
    };

    let mut builder = TreeBuilder::new(&source, extensions, &abbreviations, localizer);
    for (event, range) in Parser::new_ext(&source, extensions.parser_options()).into_offset_iter() {
        builder.event(event, range);
    }
    builder.finish()
}

/// Open element awaiting its end event.
#[derive(Debug)]
enum Frame {
    Root,
    Paragraph,
    Heading(u8),
    BlockQuote,
    CodeBlock { info: Option<String> },
    HtmlBlock,
    List(Option<u64>),
    Item { task: Option<bool> },
    FootnoteDefinition(String),
    Table {
        alignments: Vec<Alignment>,
        head: Vec<TableCell>,
        rows: Vec<Vec<TableCell>>,
    },
    TableRow { head: bool, cells: Vec<TableCell> },
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Subscript,
    Superscript,
    Link {
        link_type: LinkType,
        url: String,
        title: String,
    },
    Image { src: String, title: String },
    /// Constructs without a node of their own; children move to the parent.
    Transparent,
}

impl Frame {
    /// Whether the frame can contain another frame of its own kind.
    fn nests(&self) -> bool {
        matches!(
            self,
            Self::BlockQuote
                | Self::List(_)
                | Self::Item { .. }
                | Self::FootnoteDefinition(_)
                | Self::Emphasis
                | Self::Strong
                | Self::Strikethrough
                | Self::Subscript
                | Self::Superscript
                | Self::Link { .. }
        )
    }
}

/// Child collected by an open frame.
#[derive(Debug)]
enum Piece {
    Node(Node),
    /// Text the scanning extensions may rewrite.
    Text(String),
    /// Escaped, entity or already scanned text.
    Literal(String),
}

struct TreeBuilder<'a> {
    source: &'a str,
    extensions: &'a ExtensionSet,
    abbreviations: &'a Abbreviations,
    localizer: Option<&'a dyn Localizer>,
    stack: Vec<(Frame, Vec<Piece>)>,
    link_depth: usize,
}

impl<'a> TreeBuilder<'a> {
    fn new(
        source: &'a str,
        extensions: &'a ExtensionSet,
        abbreviations: &'a Abbreviations,
        localizer: Option<&'a dyn Localizer>,
    ) -> Self {
        Self {
            source,
            extensions,
            abbreviations,
            localizer,
            stack: vec![(Frame::Root, Vec::new())],
            link_depth: 0,
        }
    }

    fn ctx(&self) -> ParseContext<'a> {
        ParseContext {
            extensions: self.extensions,
            abbreviations: self.abbreviations,
            localizer: self.localizer,
            in_link: self.link_depth > 0,
        }
    }

    fn pieces(&mut self) -> &mut Vec<Piece> {
        let last = self.stack.len() - 1;
        &mut self.stack[last].1
    }

    /// Append to the innermost frame, merging adjacent text of the same kind.
    fn push_piece(&mut self, piece: Piece) {
        let pieces = self.pieces();
        if let Some(last) = pieces.last_mut() {
            if let (Piece::Text(prev), Piece::Text(text))
            | (Piece::Literal(prev), Piece::Literal(text)) = (last, &piece)
            {
                prev.push_str(text);
                return;
            }
        }
        pieces.push(piece);
    }

    fn push(&mut self, node: Node) {
        match node {
            Node::Text(text) => self.push_piece(Piece::Literal(text)),
            node => self.push_piece(Piece::Node(node)),
        }
    }

    /// Push inline text, keeping escaped characters and entities literal.
    ///
    /// `pulldown-cmark` starts a new text event at the character following
    /// an escaping backslash, and gives a character reference its own event
    /// spanning the `&...;` source.
    fn text(&mut self, text: String, range: Range<usize>) {
        let source = self.source;
        let raw = source.get(range.clone()).unwrap_or_default();
        if raw.starts_with('&') && raw != text {
            self.push_piece(Piece::Literal(text));
            return;
        }

        let escaped = range
            .start
            .checked_sub(1)
            .is_some_and(|prev| source.as_bytes().get(prev) == Some(&b'\\'));
        match text.chars().next() {
            Some(first) if escaped && raw.starts_with(first) => {
                let (head, tail) = text.split_at(first.len_utf8());
                self.push_piece(Piece::Literal(head.to_owned()));
                if !tail.is_empty() {
                    self.push_piece(Piece::Text(tail.to_owned()));
                }
            }
            _ => self.push_piece(Piece::Text(text)),
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Html(text)
                if matches!(
                    self.stack.last(),
                    Some((Frame::CodeBlock { .. } | Frame::HtmlBlock, _))
                ) =>
            {
                self.push(Node::Text(text.into_string()));
            }
            Event::Text(text) => self.text(text.into_string(), range),
            Event::Code(code) => self.push(Node::Code(code.into_string())),
            Event::Html(html) => self.push(Node::HtmlBlock(html.into_string())),
            Event::InlineHtml(html) => self.push(Node::InlineHtml(html.into_string())),
            Event::InlineMath(tex) => self.push(Node::Math {
                tex: tex.into_string(),
                display: false,
            }),
            Event::DisplayMath(tex) => self.push(Node::Math {
                tex: tex.into_string(),
                display: true,
            }),
            Event::FootnoteReference(label) => {
                self.push(Node::FootnoteReference(label.into_string()));
            }
            Event::SoftBreak => self.push(Node::SoftBreak),
            Event::HardBreak => self.push(Node::HardBreak),
            Event::Rule => self.push(Node::ThematicBreak),
            Event::TaskListMarker(checked) => {
                if let Some((Frame::Item { task }, _)) = self
                    .stack
                    .iter_mut()
                    .rev()
                    .find(|(frame, _)| matches!(frame, Frame::Item { .. }))
                {
                    *task = Some(checked);
                }
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph,
            Tag::Heading { level, .. } => Frame::Heading(heading_level_to_num(level)),
            Tag::BlockQuote(_) => Frame::BlockQuote,
            Tag::CodeBlock(kind) => Frame::CodeBlock {
                info: match kind {
                    CodeBlockKind::Fenced(info) => Some(info.into_string()),
                    CodeBlockKind::Indented => None,
                },
            },
            Tag::HtmlBlock => Frame::HtmlBlock,
            Tag::List(start) => Frame::List(start),
            Tag::Item => Frame::Item { task: None },
            Tag::FootnoteDefinition(label) => Frame::FootnoteDefinition(label.into_string()),
            Tag::Table(alignments) => Frame::Table {
                alignments: alignments.into_iter().map(Alignment::from).collect(),
                head: Vec::new(),
                rows: Vec::new(),
            },
            Tag::TableHead => Frame::TableRow {
                head: true,
                cells: Vec::new(),
            },
            Tag::TableRow => Frame::TableRow {
                head: false,
                cells: Vec::new(),
            },
            Tag::TableCell => Frame::TableCell,
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Strikethrough => Frame::Strikethrough,
            Tag::Subscript => Frame::Subscript,
            Tag::Superscript => Frame::Superscript,
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => Frame::Link {
                link_type,
                url: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                src: dest_url.into_string(),
                title: title.into_string(),
            },
            _ => Frame::Transparent,
        };

        let frame = if self.stack.len() >= MAX_NESTING && frame.nests() {
            Frame::Transparent
        } else {
            frame
        };
        if matches!(frame, Frame::Link { .. }) {
            self.link_depth += 1;
        }
        self.stack.push((frame, Vec::new()));
    }

    fn end(&mut self, _tag: TagEnd) {
        // The root frame is never closed by an end event
        if self.stack.len() <= 1 {
            return;
        }
        let Some((frame, pieces)) = self.stack.pop() else {
            return;
        };

        match frame {
            Frame::Transparent => {
                for piece in pieces {
                    self.push_piece(piece);
                }
            }
            Frame::CodeBlock { info } => {
                let content = collect_text(pieces);
                let node = match info {
                    Some(info) => Node::FencedCodeBlock {
                        language: info.split_whitespace().next().unwrap_or_default().to_owned(),
                        info,
                        content,
                    },
                    None => Node::CodeBlock(content),
                };
                self.push(node);
            }
            Frame::HtmlBlock => {
                let html = collect_text(pieces);
                self.push(Node::HtmlBlock(html));
            }
            Frame::Image { src, title } => {
                let alt = plain_text(&fold(pieces, None));
                self.push(Node::Image { src, title, alt });
            }
            Frame::Link {
                link_type,
                url,
                title,
            } => {
                let children = fold(pieces, Some(&self.ctx()));
                self.link_depth -= 1;
                self.close_link(link_type, url, title, children);
            }
            frame => {
                let children = fold(pieces, Some(&self.ctx()));
                self.close(frame, children);
            }
        }
    }

    fn close(&mut self, frame: Frame, children: Vec<Node>) {
        let node = match frame {
            Frame::Paragraph => Node::Paragraph(children),
            Frame::Heading(level) => Node::Heading {
                level,
                text: plain_text(&children),
                children,
            },
            Frame::BlockQuote => Node::BlockQuote(children),
            Frame::List(start) => Node::List {
                start,
                items: children,
            },
            Frame::Item { task: Some(checked) } => Node::TaskListItem { checked, children },
            Frame::Item { task: None } => Node::ListItem(children),
            Frame::FootnoteDefinition(label) => Node::FootnoteDefinition { label, children },
            Frame::Table {
                alignments,
                head,
                rows,
            } => Node::Table {
                alignments,
                head,
                rows,
            },
            Frame::TableRow { head, cells } => {
                if let Some((Frame::Table { head: table_head, rows, .. }, _)) =
                    self.stack.last_mut()
                {
                    if head {
                        *table_head = cells;
                    } else {
                        rows.push(cells);
                    }
                }
                return;
            }
            Frame::TableCell => {
                if let Some((Frame::TableRow { cells, .. }, _)) = self.stack.last_mut() {
                    cells.push(children);
                }
                return;
            }
            Frame::Emphasis => Node::Emphasis(children),
            Frame::Strong => Node::Strong(children),
            Frame::Strikethrough => Node::Strikethrough(children),
            Frame::Subscript => Node::Subscript(children),
            Frame::Superscript => Node::Superscript(children),
            Frame::Transparent
            | Frame::Root
            | Frame::CodeBlock { .. }
            | Frame::HtmlBlock
            | Frame::Link { .. }
            | Frame::Image { .. } => {
                for child in children {
                    self.push(child);
                }
                return;
            }
        };
        self.push(node);
    }

    /// Close a link, turning `@[provider](target)` into an embed.
    ///
    /// The `@` must be scannable text: an escaped `\@` keeps the link.
    fn close_link(&mut self, link_type: LinkType, url: String, title: String, children: Vec<Node>) {
        let label = plain_text(&children);

        let after_at = matches!(
            self.pieces().last(),
            Some(Piece::Text(prev)) if prev.ends_with('@') && !prev.ends_with("@@")
        );
        if after_at {
            if let Some(embed) = inline::embed_for_link(&label, &url, &self.ctx()) {
                let pieces = self.pieces();
                if let Some(Piece::Text(prev)) = pieces.last_mut() {
                    prev.pop();
                    if prev.is_empty() {
                        pieces.pop();
                    }
                }
                self.push(embed);
                return;
            }
        }

        let node = match link_type {
            LinkType::Autolink => Node::AutoLink { url, text: label },
            LinkType::Email => Node::AutoLink {
                url: format!("mailto:{url}"),
                text: label,
            },
            _ => Node::Link {
                url,
                title,
                children,
            },
        };
        self.push(node);
    }

    fn finish(mut self) -> Document {
        // Unbalanced streams cannot come out of pulldown-cmark, but fold any
        // leftover frames into their parents rather than dropping content.
        while self.stack.len() > 1 {
            if let Some((frame, pieces)) = self.stack.pop() {
                let children = fold(pieces, Some(&self.ctx()));
                self.close(frame, children);
            }
        }
        let children = self
            .stack
            .pop()
            .map(|(_, pieces)| fold(pieces, None))
            .unwrap_or_default();
        Document { children }
    }
}

/// Turn a closed frame's pieces into nodes, scanning text when `ctx` is
/// given and merging adjacent text nodes.
fn fold(pieces: Vec<Piece>, ctx: Option<&ParseContext<'_>>) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(pieces.len());
    for piece in pieces {
        let scanned = match (piece, ctx) {
            (Piece::Text(text), Some(ctx)) => inline::scan(&text, ctx),
            (Piece::Text(text) | Piece::Literal(text), _) => vec![Node::Text(text)],
            (Piece::Node(node), _) => vec![node],
        };
        for node in scanned {
            push_merged(&mut nodes, node);
        }
    }
    nodes
}

fn push_merged(nodes: &mut Vec<Node>, node: Node) {
    if let Node::Text(text) = &node {
        if let Some(Node::Text(prev)) = nodes.last_mut() {
            prev.push_str(text);
            return;
        }
    }
    nodes.push(node);
}

fn collect_text(pieces: Vec<Piece>) -> String {
    pieces
        .into_iter()
        .map(|piece| match piece {
            Piece::Text(text)
            | Piece::Literal(text)
            | Piece::Node(Node::Text(text) | Node::HtmlBlock(text)) => text,
            Piece::Node(other) => other.plain_text(),
        })
        .collect()
}
