//! Inline scanning context.
//!
//! Carries the document-level state text-scanning rules need: the active
//! extension set, abbreviation definitions collected from the document, and
//! the optional localization lookup.

use std::collections::HashMap;
use std::fmt;

use crate::extension::ExtensionSet;

/// Resolves localization keys used by `@{key}` references.
///
/// Implementations must be thread-safe since one parser may be shared.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use markview_renderer::Localizer;
///
/// let mut strings = HashMap::new();
/// strings.insert("app_name".to_owned(), "Markview".to_owned());
/// assert_eq!(strings.localize("app_name").as_deref(), Some("Markview"));
/// assert_eq!(strings.localize("missing"), None);
/// ```
pub trait Localizer: Send + Sync {
    /// Localized text for `key`, or `None` when the key is unknown.
    fn localize(&self, key: &str) -> Option<String>;
}

impl Localizer for HashMap<String, String> {
    fn localize(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<F> Localizer for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn localize(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// Abbreviation definitions of one document, longest term first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Abbreviations {
    entries: Vec<(String, String)>,
}

impl Abbreviations {
    /// Add a definition. A later definition of the same term replaces the
    /// earlier one.
    pub(crate) fn define(&mut self, abbr: &str, expansion: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(a, _)| a == abbr) {
            expansion.clone_into(&mut entry.1);
        } else {
            self.entries.push((abbr.to_owned(), expansion.to_owned()));
            self.entries
                .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(a, e)| (a.as_str(), e.as_str()))
    }
}

/// State shared by inline rules while scanning one document.
pub(crate) struct ParseContext<'a> {
    pub(crate) extensions: &'a ExtensionSet,
    pub(crate) abbreviations: &'a Abbreviations,
    pub(crate) localizer: Option<&'a dyn Localizer>,
    /// Whether the text being scanned sits inside link text.
    pub(crate) in_link: bool,
}

impl fmt::Debug for ParseContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseContext")
            .field("extensions", &self.extensions)
            .field("abbreviations", &self.abbreviations)
            .field("localizer", &self.localizer.is_some())
            .field("in_link", &self.in_link)
            .finish()
    }
}
