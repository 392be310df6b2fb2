//! Bare URL detection (`https://...`, `www....`).

use super::{InlineRule, Match, ParseContext};
use crate::ast::Node;
use crate::extension::Extension;
use crate::util::is_word_boundary_before;

const SCHEMES: [&str; 2] = ["https://", "http://"];
const WWW: &str = "www.";

/// Links bare URLs found in text.
pub(super) struct AutolinkRule;

/// Length of the URL starting at the beginning of `rest`, after trimming
/// trailing punctuation and unbalanced closing parentheses.
fn url_len(rest: &str) -> usize {
    let mut end = rest
        .find(|c: char| c.is_whitespace() || c == '<')
        .unwrap_or(rest.len());
    let candidate = &rest[..end];
    let mut unbalanced = candidate
        .matches(')')
        .count()
        .saturating_sub(candidate.matches('(').count());

    while let Some(last) = rest[..end].chars().next_back() {
        let trim = match last {
            '.' | ',' | ':' | ';' | '!' | '?' | '"' | '\'' | '*' | '_' | '~' => true,
            ')' if unbalanced > 0 => {
                unbalanced -= 1;
                true
            }
            _ => false,
        };
        if !trim {
            break;
        }
        end -= last.len_utf8();
    }
    end
}

impl InlineRule for AutolinkRule {
    fn extension(&self) -> Extension {
        Extension::Autolink
    }

    fn try_match(&self, text: &str, at: usize, _ctx: &ParseContext<'_>) -> Option<Match> {
        if !is_word_boundary_before(text, at) {
            return None;
        }
        let rest = &text[at..];
        let prefix = SCHEMES
            .iter()
            .chain(std::iter::once(&WWW))
            .find(|prefix| {
                rest.get(..prefix.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
            })?;

        if !rest[prefix.len()..].starts_with(|c: char| c.is_alphanumeric()) {
            return None;
        }
        let len = url_len(rest);
        if len <= prefix.len() {
            return None;
        }

        let matched = &rest[..len];
        let url = if *prefix == WWW {
            format!("http://{matched}")
        } else {
            matched.to_owned()
        };
        Some(Match::new(
            Node::AutoLink {
                url,
                text: matched.to_owned(),
            },
            len,
        ))
    }
}
