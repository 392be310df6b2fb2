//! Global rendering options.

/// Options read by the renderer and decorator during a render pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Escape raw HTML found in the source instead of passing it through.
    pub escape_html: bool,
    /// Text placed before a footnote reference number.
    pub footnote_ref_prefix: String,
    /// Text placed after a footnote reference number.
    pub footnote_ref_suffix: String,
    /// Prefix of the `class` attribute of fenced code with a language.
    pub code_language_class_prefix: String,
    /// Class of fenced code without a language.
    pub no_language_class: String,
    /// Base URI of emoji images.
    pub emoji_root_path: String,
    /// File extension of emoji images, without the dot.
    pub emoji_image_extension: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escape_html: true,
            footnote_ref_prefix: "[".to_owned(),
            footnote_ref_suffix: "]".to_owned(),
            code_language_class_prefix: String::new(),
            no_language_class: "nohighlight".to_owned(),
            emoji_root_path: "file:///android_asset/emoji/".to_owned(),
            emoji_image_extension: "png".to_owned(),
        }
    }
}

impl RenderOptions {
    /// Image URI of the emoji `name`.
    #[must_use]
    pub fn emoji_src(&self, name: &str) -> String {
        let root = &self.emoji_root_path;
        let sep = if root.is_empty() || root.ends_with('/') {
            ""
        } else {
            "/"
        };
        format!("{root}{sep}{name}.{}", self.emoji_image_extension)
    }
}
