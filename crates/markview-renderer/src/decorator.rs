//! Per-node HTML attributes and resource registration.
//!
//! While a node is rendered, the decorator contributes attributes (classes,
//! tap handlers) to its elements and records the scripts and stylesheets the
//! node needs. Dispatch goes through a fixed table keyed by [`NodeKind`].

use std::fmt;

use crate::ast::{Node, NodeKind};
use crate::resource::{ResourceKey, ResourceSet};
use crate::util::{escape_attr, js_string};

/// Name of the host object receiving tap events.
pub const BRIDGE_OBJECT: &str = "android";

/// Fenced code language that opts out of highlighting.
const NO_HIGHLIGHT: &str = "nohighlight";

/// Element of a node being attributed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributablePart {
    /// The outermost element of the node.
    Node,
    /// The inner element wrapping the content (`<code>` inside `<pre>`).
    Content,
}

/// Ordered HTML attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_owned(), value)),
        }
    }

    /// Append a space-separated value to `name` (as for `class`).
    pub fn add_value(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) if existing.split(' ').any(|v| v == value) => {}
            Some((_, existing)) if !existing.is_empty() => {
                existing.push(' ');
                existing.push_str(value);
            }
            Some((_, existing)) => value.clone_into(existing),
            None => self.entries.push((name.to_owned(), value.to_owned())),
        }
    }

    /// Merge `other` into `self`. Classes accumulate, other names are
    /// overwritten.
    pub fn merge(&mut self, other: Attributes) {
        for (name, value) in other.entries {
            if name == "class" {
                self.add_value(&name, &value);
            } else {
                self.set(&name, value);
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Attribute list as HTML, each entry preceded by a space.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for (name, value) in self.iter() {
            html.push(' ');
            html.push_str(name);
            html.push_str("=\"");
            html.push_str(&escape_attr(value));
            html.push('"');
        }
        html
    }
}

/// Tap handler installed on an element.
///
/// Displays as the `javascript:` URI placed in its `onclick` attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventTrigger {
    ButtonTap { id: String },
    CodeTap { language: String },
    HeadingTap { level: u8, text: String },
    ImageTap,
    LinkTap,
    KeystrokeTap,
    MarkTap,
}

impl fmt::Display for EventTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "javascript:{BRIDGE_OBJECT}.")?;
        match self {
            Self::ButtonTap { id } => write!(f, "onButtonTap({})", js_string(id))?,
            Self::CodeTap { language } => {
                write!(f, "onCodeTap({}, this.textContent)", js_string(language))?;
            }
            Self::HeadingTap { level, text } => {
                write!(f, "onHeadingTap({level}, {})", js_string(text))?;
            }
            Self::ImageTap => {
                f.write_str("onImageTap(this.src, this.clientWidth, this.clientHeight)")?;
            }
            Self::LinkTap => f.write_str("onLinkTap(this.href, this.textContent)")?,
            Self::KeystrokeTap => f.write_str("onKeystrokeTap(this.textContent)")?,
            Self::MarkTap => f.write_str("onMarkTap(this.textContent)")?,
        }
        f.write_str(";")
    }
}

/// Mutable state a decoration rule works on.
pub(crate) struct Decoration<'r> {
    pub(crate) attributes: &'r mut Attributes,
    pub(crate) resources: &'r mut ResourceSet,
}

type DecorationRule = fn(&Node, AttributablePart, &mut Decoration<'_>);

/// Decoration rules by node kind.
const RULES: &[(NodeKind, DecorationRule)] = &[
    (NodeKind::FencedCodeBlock, decorate_fenced_code),
    (NodeKind::Math, decorate_math),
    (NodeKind::Abbreviation, decorate_abbreviation),
    (NodeKind::Heading, decorate_heading),
    (NodeKind::Image, decorate_image),
    (NodeKind::Mark, decorate_mark),
    (NodeKind::Keystroke, decorate_keystroke),
    (NodeKind::Link, decorate_link),
    (NodeKind::AutoLink, decorate_link),
    (NodeKind::Button, decorate_button),
    (NodeKind::Tweet, decorate_tweet),
];

/// Attributes for `part` of `node`, registering the resources it needs.
pub(crate) fn decorate(
    node: &Node,
    part: AttributablePart,
    resources: &mut ResourceSet,
) -> Attributes {
    let mut attributes = Attributes::new();
    let kind = node.kind();
    if let Some((_, rule)) = RULES.iter().find(|(k, _)| *k == kind) {
        rule(
            node,
            part,
            &mut Decoration {
                attributes: &mut attributes,
                resources,
            },
        );
    }
    attributes
}

fn on_tap(part: AttributablePart, d: &mut Decoration<'_>, trigger: &EventTrigger) {
    if part == AttributablePart::Node {
        d.attributes.set("onclick", trigger.to_string());
    }
}

fn decorate_image(_node: &Node, part: AttributablePart, d: &mut Decoration<'_>) {
    on_tap(part, d, &EventTrigger::ImageTap);
}

fn decorate_mark(_node: &Node, part: AttributablePart, d: &mut Decoration<'_>) {
    on_tap(part, d, &EventTrigger::MarkTap);
}

fn decorate_keystroke(_node: &Node, part: AttributablePart, d: &mut Decoration<'_>) {
    on_tap(part, d, &EventTrigger::KeystrokeTap);
}

fn decorate_link(_node: &Node, part: AttributablePart, d: &mut Decoration<'_>) {
    on_tap(part, d, &EventTrigger::LinkTap);
}

fn decorate_fenced_code(node: &Node, part: AttributablePart, d: &mut Decoration<'_>) {
    let Node::FencedCodeBlock { language, .. } = node else {
        return;
    };
    if part != AttributablePart::Node || language.is_empty() || language == NO_HIGHLIGHT {
        return;
    }
    d.attributes.set("language", language.as_str());
    on_tap(
        part,
        d,
        &EventTrigger::CodeTap {
            language: language.clone(),
        },
    );
    d.resources.register(ResourceKey::HighlightJs);
    d.resources.register(ResourceKey::HighlightInit);
}

fn decorate_math(_node: &Node, part: AttributablePart, d: &mut Decoration<'_>) {
    if part == AttributablePart::Node {
        d.resources.register(ResourceKey::MathJax);
        d.resources.register(ResourceKey::MathJaxConfig);
    }
}

fn decorate_tweet(_node: &Node, part: AttributablePart, d: &mut Decoration<'_>) {
    if part == AttributablePart::Node {
        d.resources.register(ResourceKey::TwitterWidgets);
    }
}

fn decorate_abbreviation(_node: &Node, part: AttributablePart, d: &mut Decoration<'_>) {
    if part != AttributablePart::Node {
        return;
    }
    d.attributes.add_value("class", "tooltip");
    d.resources.register(ResourceKey::TooltipsterJs);
    d.resources.register(ResourceKey::TooltipsterCss);
    d.resources.register(ResourceKey::TooltipsterInit);
}

fn decorate_heading(node: &Node, part: AttributablePart, d: &mut Decoration<'_>) {
    if let Node::Heading { level, text, .. } = node {
        let trigger = EventTrigger::HeadingTap {
            level: *level,
            text: text.clone(),
        };
        on_tap(part, d, &trigger);
    }
}

fn decorate_button(node: &Node, part: AttributablePart, d: &mut Decoration<'_>) {
    if let Node::Button { id, .. } = node {
        on_tap(part, d, &EventTrigger::ButtonTap { id: id.clone() });
    }
}
