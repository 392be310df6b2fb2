//! Text-scanning inline extensions.
//!
//! `pulldown-cmark` handles the `CommonMark` inline grammar and the extensions
//! it implements natively. The remaining extensions recognise their syntax in
//! the literal text runs it leaves behind. Each one is an [`InlineRule`]; at
//! every position of a text run the active rules are tried in registration
//! order and the first match wins. Matched spans are never rescanned.

mod abbreviation;
mod autolink;
mod context;
mod delimited;
mod embed;
mod fence;
mod shortcode;

pub(crate) use abbreviation::extract_definitions;
pub(crate) use context::{Abbreviations, ParseContext};
pub use context::Localizer;
pub(crate) use embed::embed_for_link;

use crate::ast::Node;
use crate::extension::Extension;

/// A successful rule match.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Match {
    /// Node built from the matched span.
    pub(crate) node: Node,
    /// Length of the matched span in bytes. Always non-zero.
    pub(crate) len: usize,
}

impl Match {
    pub(crate) fn new(node: Node, len: usize) -> Self {
        debug_assert!(len > 0, "inline rule matched an empty span");
        Self { node, len }
    }
}

/// Recogniser for one text-scanning extension.
pub(crate) trait InlineRule: Sync {
    /// The extension this rule implements.
    fn extension(&self) -> Extension;

    /// Try to match at byte offset `at` of `text`.
    fn try_match(&self, text: &str, at: usize, ctx: &ParseContext<'_>) -> Option<Match>;
}

/// Rule implementing `extension`, if it is a text-scanning one.
fn rule_for(extension: Extension) -> Option<&'static dyn InlineRule> {
    match extension {
        Extension::Abbreviation => Some(&abbreviation::AbbreviationRule),
        Extension::Autolink => Some(&autolink::AutolinkRule),
        Extension::Mark => Some(&delimited::MarkRule),
        Extension::Keystroke => Some(&delimited::KeystrokeRule),
        Extension::Emoji => Some(&shortcode::EmojiRule),
        Extension::Label => Some(&delimited::LabelRule),
        Extension::Button => Some(&shortcode::ButtonRule),
        Extension::Localization => Some(&shortcode::LocalizationRule),
        Extension::Tables
        | Extension::TaskList
        | Extension::StrikethroughSubscript
        | Extension::Superscript
        | Extension::MathJax
        | Extension::Footnote
        | Extension::VideoLink
        | Extension::Twitter => None,
    }
}

/// Split a literal text run into text and extension nodes.
pub(crate) fn scan(text: &str, ctx: &ParseContext<'_>) -> Vec<Node> {
    let rules: Vec<&dyn InlineRule> = ctx
        .extensions
        .iter()
        .filter_map(rule_for)
        .filter(|rule| !(ctx.in_link && rule.extension() == Extension::Autolink))
        .collect();

    if rules.is_empty() || text.is_empty() {
        return vec![Node::Text(text.to_owned())];
    }

    let mut nodes = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        if let Some(found) = rules.iter().find_map(|rule| rule.try_match(text, pos, ctx)) {
            if plain_start < pos {
                nodes.push(Node::Text(text[plain_start..pos].to_owned()));
            }
            nodes.push(found.node);
            pos += found.len;
            plain_start = pos;
        } else {
            pos += text[pos..].chars().next().map_or(1, char::len_utf8);
        }
    }

    if plain_start < text.len() {
        nodes.push(Node::Text(text[plain_start..].to_owned()));
    }
    nodes
}
