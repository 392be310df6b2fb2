//! Extension registry.
//!
//! The set of installed extensions is fixed and ordered. Order matters: when
//! several text-scanning extensions could match at the same position, the one
//! registered first wins.

use pulldown_cmark::Options;

/// A grammar and render extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Extension {
    Tables,
    TaskList,
    Abbreviation,
    Autolink,
    Mark,
    StrikethroughSubscript,
    Superscript,
    Keystroke,
    MathJax,
    Footnote,
    Emoji,
    VideoLink,
    Twitter,
    Label,
    Button,
    Localization,
}

impl Extension {
    /// Every extension in registration order.
    pub const ALL: [Self; 16] = [
        Self::Tables,
        Self::TaskList,
        Self::Abbreviation,
        Self::Autolink,
        Self::Mark,
        Self::StrikethroughSubscript,
        Self::Superscript,
        Self::Keystroke,
        Self::MathJax,
        Self::Footnote,
        Self::Emoji,
        Self::VideoLink,
        Self::Twitter,
        Self::Label,
        Self::Button,
        Self::Localization,
    ];

    /// Literal syntax triggers claimed by this extension.
    ///
    /// Abbreviations have no fixed trigger: their terms come from the
    /// document's own definitions.
    #[must_use]
    pub fn triggers(self) -> &'static [&'static str] {
        match self {
            Self::Tables => &["|"],
            Self::TaskList => &["[ ]", "[x]"],
            Self::Abbreviation => &[],
            Self::Autolink => &["http://", "https://", "www."],
            Self::Mark => &["=="],
            Self::StrikethroughSubscript => &["~"],
            Self::Superscript => &["^"],
            Self::Keystroke => &["@@"],
            Self::MathJax => &["$"],
            Self::Footnote => &["[^"],
            Self::Emoji => &[":"],
            Self::VideoLink => &["@[youtube]", "@[vimeo]"],
            Self::Twitter => &["@[twitter]"],
            Self::Label => &["--"],
            Self::Button => &["{{"],
            Self::Localization => &["@{"],
        }
    }

    /// `pulldown-cmark` options backing this extension, if it is one the
    /// base parser implements.
    #[must_use]
    pub fn parser_options(self) -> Options {
        match self {
            Self::Tables => Options::ENABLE_TABLES,
            Self::TaskList => Options::ENABLE_TASKLISTS,
            Self::StrikethroughSubscript => {
                Options::ENABLE_STRIKETHROUGH | Options::ENABLE_SUBSCRIPT
            }
            Self::Superscript => Options::ENABLE_SUPERSCRIPT,
            Self::MathJax => Options::ENABLE_MATH,
            Self::Footnote => Options::ENABLE_FOOTNOTES,
            _ => Options::empty(),
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Tables => "tables",
            Self::TaskList => "task-list",
            Self::Abbreviation => "abbreviation",
            Self::Autolink => "autolink",
            Self::Mark => "mark",
            Self::StrikethroughSubscript => "strikethrough-subscript",
            Self::Superscript => "superscript",
            Self::Keystroke => "keystroke",
            Self::MathJax => "mathjax",
            Self::Footnote => "footnote",
            Self::Emoji => "emoji",
            Self::VideoLink => "video-link",
            Self::Twitter => "twitter",
            Self::Label => "label",
            Self::Button => "button",
            Self::Localization => "localization",
        }
    }
}

/// Error returned when an extension set breaks the registry invariants.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two extensions claim the same syntax.
    #[error("trigger `{trigger}` of `{second}` is already claimed by `{first}`")]
    DuplicateTrigger {
        trigger: &'static str,
        first: &'static str,
        second: &'static str,
    },
    /// The same extension was listed twice.
    #[error("extension `{0}` is registered twice")]
    DuplicateExtension(&'static str),
}

/// Ordered set of active extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: Vec<Extension>,
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::all()
    }
}

impl ExtensionSet {
    /// All extensions in registration order.
    #[must_use]
    pub fn all() -> Self {
        Self {
            extensions: Extension::ALL.to_vec(),
        }
    }

    /// No extensions: plain `CommonMark`.
    #[must_use]
    pub fn none() -> Self {
        Self {
            extensions: Vec::new(),
        }
    }

    /// Build a set from an explicit ordered list.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if an extension appears twice or two
    /// extensions claim the same trigger.
    pub fn from_ordered(extensions: Vec<Extension>) -> Result<Self, RegistryError> {
        let mut claimed: Vec<(&'static str, Extension)> = Vec::new();
        for (idx, ext) in extensions.iter().enumerate() {
            if extensions[..idx].contains(ext) {
                return Err(RegistryError::DuplicateExtension(ext.name()));
            }
            for &trigger in ext.triggers() {
                if let Some((_, owner)) = claimed.iter().find(|(t, _)| *t == trigger) {
                    return Err(RegistryError::DuplicateTrigger {
                        trigger,
                        first: owner.name(),
                        second: ext.name(),
                    });
                }
                claimed.push((trigger, *ext));
            }
        }
        Ok(Self { extensions })
    }

    /// Whether an extension is active.
    #[must_use]
    pub fn contains(&self, extension: Extension) -> bool {
        self.extensions.contains(&extension)
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Active extensions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = Extension> + '_ {
        self.extensions.iter().copied()
    }

    /// Combined `pulldown-cmark` options for the active extensions.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        self.iter()
            .fold(Options::empty(), |acc, ext| acc | ext.parser_options())
    }
}
