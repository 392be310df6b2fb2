//! Document tree produced by the parser.
//!
//! The tree is a tagged union over block and inline kinds. Every variant maps
//! to a fieldless [`NodeKind`], which is what the decorator dispatches on.

/// Root of a parsed markdown document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level block nodes in source order.
    pub children: Vec<Node>,
}

impl Document {
    /// Whether the document has no content at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Visit every node depth-first in source order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Column alignment of a table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl From<pulldown_cmark::Alignment> for Alignment {
    fn from(value: pulldown_cmark::Alignment) -> Self {
        match value {
            pulldown_cmark::Alignment::None => Self::None,
            pulldown_cmark::Alignment::Left => Self::Left,
            pulldown_cmark::Alignment::Center => Self::Center,
            pulldown_cmark::Alignment::Right => Self::Right,
        }
    }
}

/// Bootstrap-style label flavour, chosen by the number of dashes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelKind {
    /// `--text--`
    Default,
    /// `---text---`
    Success,
    /// `----text----`
    Warning,
    /// `-----text-----`
    Danger,
}

impl LabelKind {
    /// Label kind for a delimiter made of `dashes` dashes.
    #[must_use]
    pub fn from_dashes(dashes: usize) -> Option<Self> {
        match dashes {
            2 => Some(Self::Default),
            3 => Some(Self::Success),
            4 => Some(Self::Warning),
            5 => Some(Self::Danger),
            _ => None,
        }
    }

    /// CSS class suffix.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// Video hosting service of an embedded video link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoProvider {
    YouTube,
    Vimeo,
}

impl VideoProvider {
    /// Provider named by the link text of `@[name](...)`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("youtube") {
            Some(Self::YouTube)
        } else if name.eq_ignore_ascii_case("vimeo") {
            Some(Self::Vimeo)
        } else {
            None
        }
    }

    /// Player URL for a video id.
    #[must_use]
    pub fn embed_url(self, id: &str) -> String {
        match self {
            Self::YouTube => format!("https://www.youtube.com/embed/{id}"),
            Self::Vimeo => format!("https://player.vimeo.com/video/{id}"),
        }
    }
}

/// A table cell's inline content.
pub type TableCell = Vec<Node>;

/// A node of the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    // Block nodes
    Heading {
        level: u8,
        /// Plain text of the heading content.
        text: String,
        children: Vec<Node>,
    },
    Paragraph(Vec<Node>),
    BlockQuote(Vec<Node>),
    /// Indented code block.
    CodeBlock(String),
    FencedCodeBlock {
        /// Full info string after the opening fence.
        info: String,
        /// First word of the info string.
        language: String,
        content: String,
    },
    HtmlBlock(String),
    List {
        /// Start number for ordered lists.
        start: Option<u64>,
        items: Vec<Node>,
    },
    ListItem(Vec<Node>),
    TaskListItem {
        checked: bool,
        children: Vec<Node>,
    },
    Table {
        alignments: Vec<Alignment>,
        head: Vec<TableCell>,
        rows: Vec<Vec<TableCell>>,
    },
    ThematicBreak,
    FootnoteDefinition {
        label: String,
        children: Vec<Node>,
    },
    /// TeX math, either `$inline$` or `$$display$$`.
    Math {
        tex: String,
        display: bool,
    },

    // Inline nodes
    Text(String),
    Code(String),
    InlineHtml(String),
    SoftBreak,
    HardBreak,
    Emphasis(Vec<Node>),
    Strong(Vec<Node>),
    Strikethrough(Vec<Node>),
    Subscript(Vec<Node>),
    Superscript(Vec<Node>),
    Mark(String),
    Keystroke(String),
    Link {
        url: String,
        title: String,
        children: Vec<Node>,
    },
    AutoLink {
        url: String,
        text: String,
    },
    Image {
        src: String,
        title: String,
        alt: String,
    },
    Abbreviation {
        abbr: String,
        expansion: String,
    },
    FootnoteReference(String),
    Emoji(String),
    VideoLink {
        provider: VideoProvider,
        id: String,
    },
    Tweet(String),
    Label {
        kind: LabelKind,
        text: String,
    },
    Button {
        id: String,
        text: String,
    },
    LocalizedText {
        key: String,
        text: String,
    },
}

/// Fieldless discriminant of [`Node`], used as a dispatch key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Heading,
    Paragraph,
    BlockQuote,
    CodeBlock,
    FencedCodeBlock,
    HtmlBlock,
    List,
    ListItem,
    TaskListItem,
    Table,
    ThematicBreak,
    FootnoteDefinition,
    Math,
    Text,
    Code,
    InlineHtml,
    SoftBreak,
    HardBreak,
    Emphasis,
    Strong,
    Strikethrough,
    Subscript,
    Superscript,
    Mark,
    Keystroke,
    Link,
    AutoLink,
    Image,
    Abbreviation,
    FootnoteReference,
    Emoji,
    VideoLink,
    Tweet,
    Label,
    Button,
    LocalizedText,
}

impl Node {
    /// Dispatch key of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Heading { .. } => NodeKind::Heading,
            Self::Paragraph(_) => NodeKind::Paragraph,
            Self::BlockQuote(_) => NodeKind::BlockQuote,
            Self::CodeBlock(_) => NodeKind::CodeBlock,
            Self::FencedCodeBlock { .. } => NodeKind::FencedCodeBlock,
            Self::HtmlBlock(_) => NodeKind::HtmlBlock,
            Self::List { .. } => NodeKind::List,
            Self::ListItem(_) => NodeKind::ListItem,
            Self::TaskListItem { .. } => NodeKind::TaskListItem,
            Self::Table { .. } => NodeKind::Table,
            Self::ThematicBreak => NodeKind::ThematicBreak,
            Self::FootnoteDefinition { .. } => NodeKind::FootnoteDefinition,
            Self::Math { .. } => NodeKind::Math,
            Self::Text(_) => NodeKind::Text,
            Self::Code(_) => NodeKind::Code,
            Self::InlineHtml(_) => NodeKind::InlineHtml,
            Self::SoftBreak => NodeKind::SoftBreak,
            Self::HardBreak => NodeKind::HardBreak,
            Self::Emphasis(_) => NodeKind::Emphasis,
            Self::Strong(_) => NodeKind::Strong,
            Self::Strikethrough(_) => NodeKind::Strikethrough,
            Self::Subscript(_) => NodeKind::Subscript,
            Self::Superscript(_) => NodeKind::Superscript,
            Self::Mark(_) => NodeKind::Mark,
            Self::Keystroke(_) => NodeKind::Keystroke,
            Self::Link { .. } => NodeKind::Link,
            Self::AutoLink { .. } => NodeKind::AutoLink,
            Self::Image { .. } => NodeKind::Image,
            Self::Abbreviation { .. } => NodeKind::Abbreviation,
            Self::FootnoteReference(_) => NodeKind::FootnoteReference,
            Self::Emoji(_) => NodeKind::Emoji,
            Self::VideoLink { .. } => NodeKind::VideoLink,
            Self::Tweet(_) => NodeKind::Tweet,
            Self::Label { .. } => NodeKind::Label,
            Self::Button { .. } => NodeKind::Button,
            Self::LocalizedText { .. } => NodeKind::LocalizedText,
        }
    }

    /// Direct children of container nodes (empty for leaves and tables).
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Heading { children, .. }
            | Self::TaskListItem { children, .. }
            | Self::FootnoteDefinition { children, .. }
            | Self::Link { children, .. }
            | Self::List {
                items: children, ..
            }
            | Self::Paragraph(children)
            | Self::BlockQuote(children)
            | Self::ListItem(children)
            | Self::Emphasis(children)
            | Self::Strong(children)
            | Self::Strikethrough(children)
            | Self::Subscript(children)
            | Self::Superscript(children) => children,
            _ => &[],
        }
    }

    /// Visit this node and its descendants depth-first in source order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        if let Self::Table { head, rows, .. } = self {
            for cell in head.iter().chain(rows.iter().flatten()) {
                for node in cell {
                    node.walk(visit);
                }
            }
        } else {
            for child in self.children() {
                child.walk(visit);
            }
        }
    }

    /// Concatenated plain text of this node's content.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            Self::Text(text)
            | Self::Code(text)
            | Self::Mark(text)
            | Self::Keystroke(text)
            | Self::Label { text, .. }
            | Self::Button { text, .. }
            | Self::LocalizedText { text, .. }
            | Self::AutoLink { text, .. } => out.push_str(text),
            Self::Abbreviation { abbr, .. } => out.push_str(abbr),
            Self::Image { alt, .. } => out.push_str(alt),
            Self::Emoji(name) => {
                out.push(':');
                out.push_str(name);
                out.push(':');
            }
            Self::Math { tex, .. } => out.push_str(tex),
            Self::SoftBreak | Self::HardBreak => out.push(' '),
            _ => {
                for child in self.children() {
                    child.push_plain_text(out);
                }
            }
        }
    }
}

/// Concatenated plain text of a sequence of nodes.
#[must_use]
pub fn plain_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.push_plain_text(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_heading() {
        let node = Node::Heading {
            level: 1,
            text: "Hi".to_owned(),
            children: vec![Node::Text("Hi".to_owned())],
        };
        assert_eq!(node.kind(), NodeKind::Heading);
    }

    #[test]
    fn test_plain_text_nested() {
        let nodes = vec![
            Node::Text("a ".to_owned()),
            Node::Strong(vec![Node::Text("bold".to_owned())]),
            Node::Code(" x".to_owned()),
        ];
        assert_eq!(plain_text(&nodes), "a bold x");
    }

    #[test]
    fn test_walk_visits_table_cells() {
        let doc = Document {
            children: vec![Node::Table {
                alignments: vec![Alignment::None],
                head: vec![vec![Node::Mark("h".to_owned())]],
                rows: vec![vec![vec![Node::Keystroke("k".to_owned())]]],
            }],
        };
        let mut kinds = Vec::new();
        doc.walk(&mut |node| kinds.push(node.kind()));
        assert_eq!(
            kinds,
            vec![NodeKind::Table, NodeKind::Mark, NodeKind::Keystroke]
        );
    }

    #[test]
    fn test_label_kind_from_dashes() {
        assert_eq!(LabelKind::from_dashes(2), Some(LabelKind::Default));
        assert_eq!(LabelKind::from_dashes(5), Some(LabelKind::Danger));
        assert_eq!(LabelKind::from_dashes(1), None);
        assert_eq!(LabelKind::from_dashes(6), None);
    }

    #[test]
    fn test_video_provider_from_name() {
        assert_eq!(
            VideoProvider::from_name("YouTube"),
            Some(VideoProvider::YouTube)
        );
        assert_eq!(VideoProvider::from_name("vimeo"), Some(VideoProvider::Vimeo));
        assert_eq!(VideoProvider::from_name("dailymotion"), None);
    }
}
