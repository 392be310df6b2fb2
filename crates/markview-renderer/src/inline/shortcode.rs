//! Bracketed shortcodes: `:emoji:`, `{{id|Text}}` and `@{key}`.

use super::{InlineRule, Match, ParseContext};
use crate::ast::Node;
use crate::extension::Extension;
use crate::util::is_word_boundary_before;

/// `open`, a run of characters accepted by `allowed`, then `close`, starting
/// at `at`. Returns the run and the span length.
///
/// The run stops at the first character `allowed` rejects, so a failed match
/// never looks past the next delimiter.
fn bracketed<'t>(
    text: &'t str,
    at: usize,
    open: &str,
    allowed: impl Fn(char) -> bool,
    close: &str,
) -> Option<(&'t str, usize)> {
    let rest = text[at..].strip_prefix(open)?;
    let end = rest.find(|c: char| !allowed(c)).unwrap_or(rest.len());
    rest[end..]
        .starts_with(close)
        .then(|| (&rest[..end], open.len() + end + close.len()))
}

fn is_emoji_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '+' | '-')
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

fn is_emoji_name(name: &str) -> bool {
    if name == "+1" || name == "-1" {
        return true;
    }
    name.bytes().any(|b| b.is_ascii_lowercase()) && name.chars().all(is_emoji_char)
}

/// `:shortcut:` emoji.
pub(super) struct EmojiRule;

impl InlineRule for EmojiRule {
    fn extension(&self) -> Extension {
        Extension::Emoji
    }

    fn try_match(&self, text: &str, at: usize, _ctx: &ParseContext<'_>) -> Option<Match> {
        if !is_word_boundary_before(text, at) {
            return None;
        }
        let (name, len) = bracketed(text, at, ":", is_emoji_char, ":")?;
        if !is_emoji_name(name) {
            return None;
        }
        Some(Match::new(Node::Emoji(name.to_owned()), len))
    }
}

/// `{{id|Text}}` button, or `{{Text}}` where the id is the text.
pub(super) struct ButtonRule;

impl InlineRule for ButtonRule {
    fn extension(&self) -> Extension {
        Extension::Button
    }

    fn try_match(&self, text: &str, at: usize, _ctx: &ParseContext<'_>) -> Option<Match> {
        let (inner, len) = bracketed(text, at, "{{", |c| !matches!(c, '{' | '}'), "}}")?;
        let (id, label) = match inner.split_once('|') {
            Some((id, label)) => (id.trim(), label.trim()),
            None => (inner.trim(), inner.trim()),
        };
        if id.is_empty() || label.is_empty() {
            return None;
        }
        Some(Match::new(
            Node::Button {
                id: id.to_owned(),
                text: label.to_owned(),
            },
            len,
        ))
    }
}

/// `@{key}` replaced by the localized string for `key`.
///
/// Without a localizer, or for unknown keys, the reference stays literal.
pub(super) struct LocalizationRule;

impl InlineRule for LocalizationRule {
    fn extension(&self) -> Extension {
        Extension::Localization
    }

    fn try_match(&self, text: &str, at: usize, ctx: &ParseContext<'_>) -> Option<Match> {
        let localizer = ctx.localizer?;
        let (key, len) = bracketed(text, at, "@{", is_key_char, "}")?;
        if key.is_empty() {
            return None;
        }
        let Some(localized) = localizer.localize(key) else {
            tracing::debug!(key, "No localization for key");
            return None;
        };
        Some(Match::new(
            Node::LocalizedText {
                key: key.to_owned(),
                text: localized,
            },
            len,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::extension::ExtensionSet;
    use crate::inline::{Abbreviations, Localizer};

    fn try_rule(rule: &dyn InlineRule, text: &str, at: usize) -> Option<Match> {
        try_rule_with(rule, text, at, None)
    }

    fn try_rule_with(
        rule: &dyn InlineRule,
        text: &str,
        at: usize,
        localizer: Option<&dyn Localizer>,
    ) -> Option<Match> {
        let extensions = ExtensionSet::all();
        let abbreviations = Abbreviations::default();
        let ctx = ParseContext {
            extensions: &extensions,
            abbreviations: &abbreviations,
            localizer,
            in_link: false,
        };
        rule.try_match(text, at, &ctx)
    }

    #[test]
    fn test_emoji() {
        let found = try_rule(&EmojiRule, ":smile: hi", 0).unwrap();
        assert_eq!(found.node, Node::Emoji("smile".to_owned()));
        assert_eq!(found.len, 7);
    }

    #[test]
    fn test_emoji_thumbs() {
        assert_eq!(
            try_rule(&EmojiRule, ":+1:", 0).unwrap().node,
            Node::Emoji("+1".to_owned())
        );
        assert_eq!(
            try_rule(&EmojiRule, ":-1:", 0).unwrap().node,
            Node::Emoji("-1".to_owned())
        );
    }

    #[test]
    fn test_emoji_rejects_times_and_words() {
        assert!(try_rule(&EmojiRule, "10:30:45", 2).is_none());
        assert!(try_rule(&EmojiRule, "a:b:", 1).is_none());
        assert!(try_rule(&EmojiRule, ":Smile:", 0).is_none());
        assert!(try_rule(&EmojiRule, "::", 0).is_none());
        assert!(try_rule(&EmojiRule, ":two words:", 0).is_none());
    }

    #[test]
    fn test_button_with_id() {
        let found = try_rule(&ButtonRule, "{{buy|Buy now}}", 0).unwrap();
        assert_eq!(
            found.node,
            Node::Button {
                id: "buy".to_owned(),
                text: "Buy now".to_owned()
            }
        );
        assert_eq!(found.len, 15);
    }

    #[test]
    fn test_button_text_only() {
        let found = try_rule(&ButtonRule, "{{OK}}", 0).unwrap();
        assert_eq!(
            found.node,
            Node::Button {
                id: "OK".to_owned(),
                text: "OK".to_owned()
            }
        );
    }

    #[test]
    fn test_button_malformed() {
        assert!(try_rule(&ButtonRule, "{{}}", 0).is_none());
        assert!(try_rule(&ButtonRule, "{{|x}}", 0).is_none());
        assert!(try_rule(&ButtonRule, "{{open", 0).is_none());
        assert!(try_rule(&ButtonRule, "{{{a}}}", 0).is_none());
    }

    #[test]
    fn test_unclosed_runs_scan_in_linear_time() {
        let inputs = [
            "{{".repeat(40_000),
            "{{a ".repeat(20_000),
            ":a ".repeat(30_000),
            "@{".repeat(40_000),
        ];
        let strings: HashMap<String, String> = HashMap::new();
        for input in inputs {
            let started = std::time::Instant::now();
            for at in 0..input.len() {
                assert!(try_rule(&ButtonRule, &input, at).is_none());
                assert!(try_rule(&EmojiRule, &input, at).is_none());
                assert!(try_rule_with(&LocalizationRule, &input, at, Some(&strings)).is_none());
            }
            assert!(started.elapsed() < std::time::Duration::from_secs(2));
        }
    }

    #[test]
    fn test_localization_resolved() {
        let mut strings = HashMap::new();
        strings.insert("app_name".to_owned(), "Markview".to_owned());
        let found = try_rule_with(&LocalizationRule, "@{app_name}!", 0, Some(&strings)).unwrap();
        assert_eq!(
            found.node,
            Node::LocalizedText {
                key: "app_name".to_owned(),
                text: "Markview".to_owned()
            }
        );
        assert_eq!(found.len, 11);
    }

    #[test]
    fn test_localization_unresolved_stays_literal() {
        let strings: HashMap<String, String> = HashMap::new();
        assert!(try_rule_with(&LocalizationRule, "@{missing}", 0, Some(&strings)).is_none());
        assert!(try_rule(&LocalizationRule, "@{app_name}", 0).is_none());
    }
}
