//! Symmetric delimiter spans: `==mark==`, `@@kbd@@` and `--label--`.

use super::{InlineRule, Match, ParseContext};
use crate::ast::{LabelKind, Node};
use crate::extension::Extension;

/// Find `delim content delim` starting at `at`.
///
/// Content must be non-empty and must not start or end with whitespace.
/// Returns the content and the total span length. Only the nearest closing
/// delimiter is considered, so scanning a run costs time linear in its length.
fn enclosed<'t>(text: &'t str, at: usize, delim: &str) -> Option<(&'t str, usize)> {
    let rest = text[at..].strip_prefix(delim)?;
    let close = rest.find(delim)?;
    let content = &rest[..close];
    if !is_tight(content) {
        return None;
    }
    Some((content, delim.len() * 2 + close))
}

fn is_tight(content: &str) -> bool {
    !content.is_empty()
        && !content.starts_with(char::is_whitespace)
        && !content.ends_with(char::is_whitespace)
}

/// `==text==` rendered as highlighted text.
pub(super) struct MarkRule;

impl InlineRule for MarkRule {
    fn extension(&self) -> Extension {
        Extension::Mark
    }

    fn try_match(&self, text: &str, at: usize, _ctx: &ParseContext<'_>) -> Option<Match> {
        let (content, len) = enclosed(text, at, "==")?;
        // `===` is not a mark opener
        if content.starts_with('=') {
            return None;
        }
        Some(Match::new(Node::Mark(content.to_owned()), len))
    }
}

/// `@@keys@@` rendered as a keyboard key.
pub(super) struct KeystrokeRule;

impl InlineRule for KeystrokeRule {
    fn extension(&self) -> Extension {
        Extension::Keystroke
    }

    fn try_match(&self, text: &str, at: usize, _ctx: &ParseContext<'_>) -> Option<Match> {
        let (content, len) = enclosed(text, at, "@@")?;
        if content.starts_with('@') {
            return None;
        }
        Some(Match::new(Node::Keystroke(content.to_owned()), len))
    }
}

/// Dash-delimited label; the dash count selects the flavour.
pub(super) struct LabelRule;

fn dash_run(text: &str, at: usize) -> usize {
    text[at..].bytes().take_while(|&b| b == b'-').count()
}

impl InlineRule for LabelRule {
    fn extension(&self) -> Extension {
        Extension::Label
    }

    fn try_match(&self, text: &str, at: usize, _ctx: &ParseContext<'_>) -> Option<Match> {
        if text[..at].ends_with('-') {
            return None;
        }
        let dashes = dash_run(text, at);
        let kind = LabelKind::from_dashes(dashes)?;

        let start = at + dashes;
        let mut search = start;
        while let Some(offset) = text[search..].find('-') {
            let close = search + offset;
            let run = dash_run(text, close);
            if run == dashes {
                let content = &text[start..close];
                if !is_tight(content) {
                    return None;
                }
                return Some(Match::new(
                    Node::Label {
                        kind,
                        text: content.to_owned(),
                    },
                    close + run - at,
                ));
            }
            search = close + run;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ExtensionSet;
    use crate::inline::Abbreviations;

    fn try_rule(rule: &dyn InlineRule, text: &str, at: usize) -> Option<Match> {
        let extensions = ExtensionSet::all();
        let abbreviations = Abbreviations::default();
        let ctx = ParseContext {
            extensions: &extensions,
            abbreviations: &abbreviations,
            localizer: None,
            in_link: false,
        };
        rule.try_match(text, at, &ctx)
    }

    #[test]
    fn test_mark() {
        let found = try_rule(&MarkRule, "a ==b c== d", 2).unwrap();
        assert_eq!(found.node, Node::Mark("b c".to_owned()));
        assert_eq!(found.len, 7);
    }

    #[test]
    fn test_mark_unclosed() {
        assert!(try_rule(&MarkRule, "==open", 0).is_none());
    }

    #[test]
    fn test_mark_rejects_padding_and_empty() {
        assert!(try_rule(&MarkRule, "== x ==", 0).is_none());
        assert!(try_rule(&MarkRule, "====", 0).is_none());
        assert!(try_rule(&MarkRule, "===x===", 0).is_none());
    }

    #[test]
    fn test_keystroke() {
        let found = try_rule(&KeystrokeRule, "@@ctrl+alt+del@@", 0).unwrap();
        assert_eq!(found.node, Node::Keystroke("ctrl+alt+del".to_owned()));
        assert_eq!(found.len, 16);
    }

    #[test]
    fn test_label_kinds() {
        let cases = [
            ("--a--", LabelKind::Default),
            ("---a---", LabelKind::Success),
            ("----a----", LabelKind::Warning),
            ("-----a-----", LabelKind::Danger),
        ];
        for (text, kind) in cases {
            let found = try_rule(&LabelRule, text, 0).unwrap();
            assert_eq!(
                found.node,
                Node::Label {
                    kind,
                    text: "a".to_owned()
                }
            );
            assert_eq!(found.len, text.len());
        }
    }

    #[test]
    fn test_label_with_inner_hyphen() {
        let found = try_rule(&LabelRule, "--well-known--", 0).unwrap();
        assert_eq!(
            found.node,
            Node::Label {
                kind: LabelKind::Default,
                text: "well-known".to_owned()
            }
        );
    }

    #[test]
    fn test_label_mismatched_close() {
        assert!(try_rule(&LabelRule, "--a---", 0).is_none());
        assert!(try_rule(&LabelRule, "------a------", 0).is_none());
    }

    #[test]
    fn test_label_not_inside_dash_run() {
        assert!(try_rule(&LabelRule, "---a--", 1).is_none());
    }

    #[test]
    fn test_unmatched_delimiters_scan_in_linear_time() {
        let inputs = [
            "== a ".repeat(20_000),
            "@@ a ".repeat(20_000),
            "--a ---b ----c -----d ".repeat(4_000),
            format!("--{}", "a ".repeat(40_000)),
        ];
        for input in inputs {
            let started = std::time::Instant::now();
            for at in 0..input.len() {
                assert!(try_rule(&MarkRule, &input, at).is_none());
                assert!(try_rule(&KeystrokeRule, &input, at).is_none());
            }
            let _ = (0..input.len()).filter_map(|at| try_rule(&LabelRule, &input, at)).count();
            assert!(started.elapsed() < std::time::Duration::from_secs(2));
        }
    }
}
