//! Embedded media written as `@[provider](target)`.
//!
//! The bracketed part is an ordinary link to the base parser. The tree
//! builder asks [`embed_for_link`] whether a link preceded by `@` names a
//! media provider.

use super::ParseContext;
use crate::ast::{Node, VideoProvider};
use crate::extension::Extension;

/// Embed node for a link labelled `label` pointing at `target`, if the label
/// names a provider whose extension is active.
pub(crate) fn embed_for_link(label: &str, target: &str, ctx: &ParseContext<'_>) -> Option<Node> {
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    if label.eq_ignore_ascii_case("twitter") {
        return ctx
            .extensions
            .contains(Extension::Twitter)
            .then(|| Node::Tweet(target.to_owned()));
    }
    let provider = VideoProvider::from_name(label)?;
    if !ctx.extensions.contains(Extension::VideoLink) {
        return None;
    }
    let id = video_id(provider, target)?;
    Some(Node::VideoLink {
        provider,
        id: id.to_owned(),
    })
}

/// Video id from a bare id or a provider URL.
fn video_id(provider: VideoProvider, target: &str) -> Option<&str> {
    let Some((_, after_scheme)) = target.split_once("://") else {
        return is_id(target).then_some(target);
    };
    let (host, path) = after_scheme.split_once('/').unwrap_or((after_scheme, ""));
    let host = host.trim_start_matches("www.").trim_start_matches("m.");
    let (path, query) = path.split_once('?').unwrap_or((path, ""));

    let id = match (provider, host) {
        (VideoProvider::YouTube, "youtu.be") => path.split('/').next(),
        (VideoProvider::YouTube, "youtube.com" | "youtube-nocookie.com") => {
            if path == "watch" {
                query
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("v="))
            } else {
                path.strip_prefix("embed/")
                    .or_else(|| path.strip_prefix("shorts/"))
                    .or_else(|| path.strip_prefix("v/"))
            }
        }
        (VideoProvider::Vimeo, "vimeo.com" | "player.vimeo.com") => {
            path.rsplit('/').find(|segment| !segment.is_empty())
        }
        _ => None,
    }?;
    is_id(id).then_some(id)
}

fn is_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
