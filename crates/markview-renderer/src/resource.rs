//! Scripts and stylesheets required by a rendered document.
//!
//! A resource is identified by its source plus loading flags; two resources
//! with the same identity are equal. [`ResourceSet`] keeps first-insertion
//! order and ignores repeated insertions.

use crate::util::escape_attr;

/// Error returned for an invalid resource.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResourceError {
    /// The resource URI or inline body is empty.
    #[error("{kind} source must not be empty")]
    EmptySource { kind: &'static str },
}

fn non_empty(kind: &'static str, source: String) -> Result<String, ResourceError> {
    if source.trim().is_empty() {
        Err(ResourceError::EmptySource { kind })
    } else {
        Ok(source)
    }
}

/// A `<script>` element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Script {
    /// URI for external scripts, code for inline ones.
    source: String,
    external: bool,
    defer: bool,
    #[cfg_attr(feature = "serde", serde(rename = "async"))]
    is_async: bool,
}

impl Script {
    /// External script loaded from `src`, neither deferred nor async.
    pub fn external(src: impl Into<String>) -> Result<Self, ResourceError> {
        Ok(Self {
            source: non_empty("script", src.into())?,
            external: true,
            defer: false,
            is_async: false,
        })
    }

    /// Inline script with the given code.
    pub fn inline(code: impl Into<String>) -> Result<Self, ResourceError> {
        Ok(Self {
            source: non_empty("script", code.into())?,
            external: false,
            defer: false,
            is_async: false,
        })
    }

    /// External script from the bundled assets, or from `url` when it is
    /// absolute.
    fn builtin(url: &str, defer: bool) -> Self {
        let source = if url.contains("://") {
            url.to_owned()
        } else {
            format!("{ASSET_ROOT}/{url}")
        };
        Self {
            source,
            external: true,
            defer,
            is_async: false,
        }
    }

    /// Set the `defer` flag. Ignored for inline scripts.
    #[must_use]
    pub fn with_defer(mut self, defer: bool) -> Self {
        self.defer = defer && self.external;
        self
    }

    /// Set the `async` flag. Ignored for inline scripts.
    #[must_use]
    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async && self.external;
        self
    }

    /// URI or inline code.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_external(&self) -> bool {
        self.external
    }

    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.defer
    }

    #[must_use]
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// HTML element text, newline-terminated.
    #[must_use]
    pub fn to_html(&self) -> String {
        if !self.external {
            return format!("<script>{}</script>\n", self.source);
        }
        let mut html = format!(r#"<script src="{}""#, escape_attr(&self.source));
        if self.is_async {
            html.push_str(" async");
        }
        if self.defer {
            html.push_str(" defer");
        }
        html.push_str("></script>\n");
        html
    }
}

/// A stylesheet, linked or inline.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StyleSheet {
    /// URI for external stylesheets, CSS for inline ones.
    source: String,
    external: bool,
}

impl StyleSheet {
    /// Stylesheet linked from `href`.
    pub fn external(href: impl Into<String>) -> Result<Self, ResourceError> {
        Ok(Self {
            source: non_empty("stylesheet", href.into())?,
            external: true,
        })
    }

    /// Inline `<style>` block.
    pub fn inline(css: impl Into<String>) -> Result<Self, ResourceError> {
        Ok(Self {
            source: non_empty("stylesheet", css.into())?,
            external: false,
        })
    }

    /// URI or inline CSS.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_external(&self) -> bool {
        self.external
    }

    /// HTML element text, newline-terminated.
    #[must_use]
    pub fn to_html(&self) -> String {
        if self.external {
            format!(
                "<link rel=\"stylesheet\" type=\"text/css\" href=\"{}\" />\n",
                escape_attr(&self.source)
            )
        } else {
            format!("<style>{}</style>\n", self.source)
        }
    }
}

/// A script or a stylesheet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Script(Script),
    StyleSheet(StyleSheet),
}

/// Built-in resources, referenced by key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    /// jQuery, offered for hosts that want it; never registered by rendering.
    JQuery,
    HighlightJs,
    HighlightInit,
    MathJax,
    MathJaxConfig,
    TooltipsterJs,
    TooltipsterCss,
    TooltipsterInit,
    /// Twitter's widget loader, which turns tweet blockquotes into cards.
    TwitterWidgets,
}

const ASSET_ROOT: &str = "file:///android_asset";
const MATHJAX_URL: &str = "https://cdn.jsdelivr.net/npm/mathjax@2/MathJax.js?config=TeX-AMS_CHTML";
const TWITTER_WIDGETS_URL: &str = "https://platform.twitter.com/widgets.js";

impl ResourceKey {
    /// The resource this key stands for.
    #[must_use]
    pub fn resource(self) -> Resource {
        let script = match self {
            Self::JQuery => Script::builtin("js/jquery-3.1.1.min.js", false),
            Self::HighlightJs => Script::builtin("js/highlight.js", true),
            Self::HighlightInit => Script::builtin("js/highlight-init.js", true),
            Self::MathJax => Script::builtin(MATHJAX_URL, true),
            Self::MathJaxConfig => Script::builtin("js/mathjax-config.js", true),
            Self::TooltipsterJs => Script::builtin("js/tooltipster.bundle.min.js", true),
            Self::TooltipsterInit => Script::builtin("js/tooltipster-init.js", true),
            Self::TwitterWidgets => Script::builtin(TWITTER_WIDGETS_URL, false).with_async(true),
            Self::TooltipsterCss => {
                return Resource::StyleSheet(StyleSheet {
                    source: format!("{ASSET_ROOT}/css/tooltipster.bundle.min.css"),
                    external: true,
                });
            }
        };
        Resource::Script(script)
    }
}

/// Ordered, duplicate-free scripts and stylesheets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResourceSet {
    style_sheets: Vec<StyleSheet>,
    scripts: Vec<Script>,
}

impl ResourceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stylesheet. Returns `false` if it was already present.
    pub fn add_style_sheet(&mut self, style_sheet: StyleSheet) -> bool {
        if self.style_sheets.contains(&style_sheet) {
            return false;
        }
        self.style_sheets.push(style_sheet);
        true
    }

    /// Replace `old` in place with `new`, or remove `old` when `new` is
    /// `None`. Appends `new` if `old` is absent.
    pub fn replace_style_sheet(&mut self, old: &StyleSheet, new: Option<StyleSheet>) {
        let Some(new) = new else {
            self.remove_style_sheet(old);
            return;
        };
        if *old == new {
            return;
        }
        if self.style_sheets.contains(&new) {
            self.remove_style_sheet(old);
            return;
        }
        match self.style_sheets.iter().position(|s| s == old) {
            Some(index) => self.style_sheets[index] = new,
            None => self.style_sheets.push(new),
        }
    }

    /// Remove a stylesheet. Returns `false` if it was not present.
    pub fn remove_style_sheet(&mut self, style_sheet: &StyleSheet) -> bool {
        let before = self.style_sheets.len();
        self.style_sheets.retain(|s| s != style_sheet);
        self.style_sheets.len() != before
    }

    /// Add a script. Returns `false` if it was already present.
    pub fn add_script(&mut self, script: Script) -> bool {
        if self.scripts.contains(&script) {
            return false;
        }
        self.scripts.push(script);
        true
    }

    /// Remove a script. Returns `false` if it was not present.
    pub fn remove_script(&mut self, script: &Script) -> bool {
        let before = self.scripts.len();
        self.scripts.retain(|s| s != script);
        self.scripts.len() != before
    }

    /// Add any resource.
    pub fn add(&mut self, resource: Resource) -> bool {
        match resource {
            Resource::Script(script) => self.add_script(script),
            Resource::StyleSheet(style_sheet) => self.add_style_sheet(style_sheet),
        }
    }

    /// Add a built-in resource.
    pub fn register(&mut self, key: ResourceKey) -> bool {
        self.add(key.resource())
    }

    /// Append every resource of `other` not already present, keeping order.
    pub fn extend_from(&mut self, other: &ResourceSet) {
        for style_sheet in &other.style_sheets {
            self.add_style_sheet(style_sheet.clone());
        }
        for script in &other.scripts {
            self.add_script(script.clone());
        }
    }

    pub fn clear(&mut self) {
        self.style_sheets.clear();
        self.scripts.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.style_sheets.is_empty() && self.scripts.is_empty()
    }

    #[must_use]
    pub fn style_sheets(&self) -> &[StyleSheet] {
        &self.style_sheets
    }

    #[must_use]
    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    /// `<head>` content: stylesheets first, then scripts.
    #[must_use]
    pub fn head_html(&self) -> String {
        let mut html = String::new();
        for style_sheet in &self.style_sheets {
            html.push_str(&style_sheet.to_html());
        }
        for script in &self.scripts {
            html.push_str(&script.to_html());
        }
        html
    }
}
