//! Fenced code detection for line-based preprocessing.
//!
//! Lines inside a fenced code block are literal and must not be treated as
//! abbreviation definitions.

/// An open fence: its character and run length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Fence {
    marker: u8,
    len: usize,
}

/// Tracks whether the current line sits inside a fenced code block.
///
/// Fences use three or more backticks or tildes, indented by at most three
/// spaces. A closing fence repeats the opening character at least as many
/// times and carries nothing else.
#[derive(Debug, Default)]
pub(super) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub(super) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed the next line. Returns `true` if it opened or closed a fence.
    pub(super) fn update(&mut self, line: &str) -> bool {
        let Some(body) = strip_indent(line) else {
            return false;
        };
        match self.open {
            Some(fence) => {
                let run = marker_run(body, fence.marker);
                if run >= fence.len && body[run..].trim().is_empty() {
                    self.open = None;
                    true
                } else {
                    false
                }
            }
            None => match opening_fence(body) {
                Some(fence) => {
                    self.open = Some(fence);
                    true
                }
                None => false,
            },
        }
    }
}

/// The line without up to three leading spaces, or `None` if it is indented
/// further (an indented code line).
fn strip_indent(line: &str) -> Option<&str> {
    let indent = line.bytes().take_while(|&b| b == b' ').count();
    (indent <= 3).then(|| &line[indent..])
}

fn marker_run(body: &str, marker: u8) -> usize {
    body.bytes().take_while(|&b| b == marker).count()
}

fn opening_fence(body: &str) -> Option<Fence> {
    let marker = *body.as_bytes().first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let len = marker_run(body, marker);
    // Backtick info strings may not contain backticks
    if len < 3 || (marker == b'`' && body[len..].contains('`')) {
        return None;
    }
    Some(Fence { marker, len })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtick_fence() {
        let mut tracker = FenceTracker::default();
        assert!(tracker.update("```rust"));
        assert!(tracker.in_fence());
        assert!(!tracker.update("*[HTML]: inside"));
        assert!(tracker.in_fence());
        assert!(tracker.update("```"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_tilde_needs_tilde_close() {
        let mut tracker = FenceTracker::default();
        assert!(tracker.update("~~~"));
        assert!(!tracker.update("```"));
        assert!(tracker.in_fence());
        assert!(tracker.update("~~~~"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_short_close_ignored() {
        let mut tracker = FenceTracker::default();
        assert!(tracker.update("````"));
        assert!(!tracker.update("```"));
        assert!(tracker.in_fence());
    }

    #[test]
    fn test_close_with_info_is_content() {
        let mut tracker = FenceTracker::default();
        assert!(tracker.update("```"));
        assert!(!tracker.update("``` js"));
        assert!(tracker.in_fence());
    }

    #[test]
    fn test_deep_indent_not_fence() {
        let mut tracker = FenceTracker::default();
        assert!(!tracker.update("    ```"));
        assert!(!tracker.in_fence());
        assert!(tracker.update("   ```"));
        assert!(tracker.in_fence());
    }

    #[test]
    fn test_inline_code_not_fence() {
        let mut tracker = FenceTracker::default();
        assert!(!tracker.update("```inline``` code"));
        assert!(!tracker.update("``two``"));
        assert!(!tracker.in_fence());
    }
}
