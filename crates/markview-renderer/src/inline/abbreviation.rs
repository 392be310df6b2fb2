//! Abbreviations: `*[TERM]: expansion` definitions and their occurrences.

use super::fence::FenceTracker;
use super::{Abbreviations, InlineRule, Match, ParseContext};
use crate::ast::Node;
use crate::extension::Extension;
use crate::util::{is_word_boundary_after, is_word_boundary_before};

/// Parse a definition line into `(term, expansion)`.
fn parse_definition(line: &str) -> Option<(&str, &str)> {
    let indent = line.bytes().take_while(|&b| b == b' ').count();
    if indent > 3 {
        return None;
    }
    let rest = line[indent..].strip_prefix("*[")?;
    let (term, rest) = rest.split_once("]:")?;
    let term = term.trim();
    if term.is_empty() || term.contains(['[', ']']) {
        return None;
    }
    Some((term, rest.trim()))
}

/// Remove abbreviation definition lines from `input` and collect them.
///
/// Lines inside fenced code blocks are kept as they are.
pub(crate) fn extract_definitions(input: &str) -> (String, Abbreviations) {
    let mut abbreviations = Abbreviations::default();
    let mut output = String::with_capacity(input.len());
    let mut fence = FenceTracker::default();

    for line in input.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let is_marker = fence.update(content);
        if !is_marker && !fence.in_fence() {
            if let Some((term, expansion)) = parse_definition(content) {
                abbreviations.define(term, expansion);
                continue;
            }
        }
        output.push_str(line);
    }

    if !abbreviations.is_empty() {
        tracing::debug!(
            count = abbreviations.iter().count(),
            "Collected abbreviation definitions"
        );
    }
    (output, abbreviations)
}

/// Whole-word occurrences of a defined term.
pub(super) struct AbbreviationRule;

impl InlineRule for AbbreviationRule {
    fn extension(&self) -> Extension {
        Extension::Abbreviation
    }

    fn try_match(&self, text: &str, at: usize, ctx: &ParseContext<'_>) -> Option<Match> {
        if ctx.abbreviations.is_empty() || !is_word_boundary_before(text, at) {
            return None;
        }
        let rest = &text[at..];
        ctx.abbreviations
            .iter()
            .find(|(abbr, _)| rest.starts_with(abbr) && is_word_boundary_after(text, at + abbr.len()))
            .map(|(abbr, expansion)| {
                Match::new(
                    Node::Abbreviation {
                        abbr: abbr.to_owned(),
                        expansion: expansion.to_owned(),
                    },
                    abbr.len(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::extension::ExtensionSet;

    #[test]
    fn test_extract_definitions() {
        let input = "The HTML spec.\n\n*[HTML]: Hyper Text Markup Language\n";
        let (body, abbrs) = extract_definitions(input);
        assert_eq!(body, "The HTML spec.\n\n");
        let entries: Vec<_> = abbrs.iter().collect();
        assert_eq!(entries, vec![("HTML", "Hyper Text Markup Language")]);
    }

    #[test]
    fn test_definitions_in_fence_kept() {
        let input = "```\n*[HTML]: not a definition\n```\n";
        let (body, abbrs) = extract_definitions(input);
        assert_eq!(body, input);
        assert!(abbrs.is_empty());
    }

    #[test]
    fn test_malformed_definitions_kept() {
        let input = "*[]: empty\n*[X] missing colon\n    *[Y]: indented code\n";
        let (body, abbrs) = extract_definitions(input);
        assert_eq!(body, input);
        assert!(abbrs.is_empty());
    }

    #[test]
    fn test_crlf_definition() {
        let (body, abbrs) = extract_definitions("*[W3C]: World Wide Web Consortium\r\nText\r\n");
        assert_eq!(body, "Text\r\n");
        assert!(!abbrs.is_empty());
    }

    #[test]
    fn test_rule_whole_words_only() {
        let extensions = ExtensionSet::all();
        let mut abbreviations = Abbreviations::default();
        abbreviations.define("HTML", "Hyper Text Markup Language");
        let ctx = ParseContext {
            extensions: &extensions,
            abbreviations: &abbreviations,
            localizer: None,
            in_link: false,
        };

        let found = AbbreviationRule.try_match("an HTML page", 3, &ctx).unwrap();
        assert_eq!(
            found.node,
            Node::Abbreviation {
                abbr: "HTML".to_owned(),
                expansion: "Hyper Text Markup Language".to_owned()
            }
        );
        assert_eq!(found.len, 4);

        assert!(AbbreviationRule.try_match("XHTML5", 1, &ctx).is_none());
        assert!(AbbreviationRule.try_match("HTMLs", 0, &ctx).is_none());
    }

    #[test]
    fn test_rule_prefers_longest_term() {
        let extensions = ExtensionSet::all();
        let mut abbreviations = Abbreviations::default();
        abbreviations.define("W3", "World Wide Web");
        abbreviations.define("W3 C", "World Wide Web Consortium");
        let ctx = ParseContext {
            extensions: &extensions,
            abbreviations: &abbreviations,
            localizer: None,
            in_link: false,
        };
        let found = AbbreviationRule.try_match("W3 C rules", 0, &ctx).unwrap();
        assert_eq!(found.len, 4);
    }
}
