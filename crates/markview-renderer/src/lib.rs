//! Extensible markdown to HTML pipeline for embedded web views.
//!
//! Markdown is parsed into a [`Document`] tree with a configurable
//! [`ExtensionSet`] on top of `CommonMark`: tables, task lists, abbreviations,
//! autolinks, marked text, keystrokes, math, footnotes, emoji, embedded video
//! and tweets, labels, buttons and localized text.
//!
//! Rendering walks the tree and attaches tap handlers that call back into the
//! host through a JavaScript bridge object, and records the scripts and
//! stylesheets each construct needs (syntax highlighting, math typesetting,
//! tooltips). [`assemble_document`] wraps the fragment into a complete page.
//!
//! # Example
//!
//! ```
//! use markview_renderer::MarkdownParser;
//!
//! let parser = MarkdownParser::new();
//! let html = parser.build_html("# Hello\n\nPress @@Ctrl+C@@ to copy.");
//!
//! assert!(html.contains("javascript:android.onHeadingTap(1, 'Hello');"));
//! assert!(html.contains("<kbd"));
//! ```

mod ast;
mod decorator;
mod document;
mod extension;
mod html;
mod inline;
mod markdown;
mod options;
mod parser;
mod resource;
mod util;

pub use ast::{Alignment, Document, LabelKind, Node, NodeKind, TableCell, VideoProvider, plain_text};
pub use decorator::{AttributablePart, Attributes, BRIDGE_OBJECT, EventTrigger};
pub use document::assemble_document;
pub use extension::{Extension, ExtensionSet, RegistryError};
pub use html::{RenderResult, render_html};
pub use inline::Localizer;
pub use markdown::MarkdownParser;
pub use options::RenderOptions;
pub use parser::parse_document;
pub use resource::{Resource, ResourceError, ResourceKey, ResourceSet, Script, StyleSheet};
pub use util::escape_html;
