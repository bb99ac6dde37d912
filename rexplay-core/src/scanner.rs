//! Pattern-source scanner for locating capturing-group boundaries
//!
//! This module scans a raw pattern string and yields the source spans of
//! its parenthesized groups, in the same left-to-right, outer-to-inner
//! order the matching engine assigns capture numbers. The scanner works
//! directly on the pattern text, independent of the engine's internal
//! numbering, so engine-reported group indices can be mapped back to
//! human-readable fragments of the original pattern.
//!
//! The scanner is deliberately tolerant: unbalanced parentheses produce
//! no descriptor rather than an error. The engine, not the scanner, is
//! the authority on pattern validity.

use crate::error::Span;

/// A source-mapped descriptor for one parenthesized group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescriptor {
    /// Byte range of the group in the pattern, including both parens
    pub span: Span,
    /// The pattern text at that span
    pub label: String,
    /// False for constructs whose content begins with `?`
    /// (non-capturing groups, lookaround, named groups)
    pub capturing: bool,
}

impl GroupDescriptor {
    /// Synthesize a descriptor wrapping an entire pattern in an implicit
    /// capturing group, used to report whole-match occurrences.
    pub fn whole_pattern(pattern: &str) -> Self {
        let label = format!("({})", pattern);
        GroupDescriptor {
            span: Span::new(0, label.len()),
            label,
            capturing: true,
        }
    }
}

/// Scan a pattern and return descriptors for every balanced group,
/// ordered by the position of the opening parenthesis (outer before
/// inner, matching standard engine numbering).
///
/// A parenthesis preceded by an odd run of backslashes is a literal and
/// opens no group; parentheses inside a character class are literals as
/// well. An unterminated group yields no descriptor.
pub fn scan_groups(pattern: &str) -> Vec<GroupDescriptor> {
    // Slots are allocated in opening order and filled when the matching
    // close paren is found, so nested groups come out outer-first.
    let mut slots: Vec<Option<GroupDescriptor>> = Vec::new();
    let mut open_stack: Vec<(usize, usize)> = Vec::new();
    let mut backslashes = 0usize;
    let mut in_class = false;

    for (i, c) in pattern.char_indices() {
        if c == '\\' {
            backslashes += 1;
            continue;
        }
        let escaped = backslashes % 2 == 1;
        backslashes = 0;
        if escaped {
            continue;
        }

        match c {
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => {
                open_stack.push((i, slots.len()));
                slots.push(None);
            }
            ')' if !in_class => {
                if let Some((open, slot)) = open_stack.pop() {
                    let label = pattern[open..i + 1].to_string();
                    let capturing = !label[1..].starts_with('?');
                    slots[slot] = Some(GroupDescriptor {
                        span: Span::new(open, i + 1),
                        label,
                        capturing,
                    });
                }
            }
            _ => {}
        }
    }

    slots.into_iter().flatten().collect()
}

/// Scan a pattern and keep only the descriptors accepted by `filter`.
///
/// For the filtered sequence to align with the engine's capture
/// numbering, the filter must reject exactly the constructs the engine
/// assigns no number to.
pub fn capture_fragments_with<F>(pattern: &str, filter: F) -> Vec<GroupDescriptor>
where
    F: Fn(&GroupDescriptor) -> bool,
{
    scan_groups(pattern).into_iter().filter(|g| filter(g)).collect()
}

/// Scan a pattern with the default filter, which rejects any group whose
/// content begins with `?`.
pub fn capture_fragments(pattern: &str) -> Vec<GroupDescriptor> {
    capture_fragments_with(pattern, |g| g.capturing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn labels(groups: &[GroupDescriptor]) -> Vec<&str> {
        groups.iter().map(|g| g.label.as_str()).collect()
    }

    #[test]
    fn test_simple_groups() {
        let groups = capture_fragments(r"(a)(b)");
        assert_eq!(labels(&groups), vec!["(a)", "(b)"]);
        assert_eq!(groups[0].span, Span::new(0, 3));
        assert_eq!(groups[1].span, Span::new(3, 6));
    }

    #[test]
    fn test_non_capturing_excluded() {
        let groups = capture_fragments(r"(a)(?:b)(c)");
        assert_eq!(labels(&groups), vec!["(a)", "(c)"]);
    }

    #[test]
    fn test_lookahead_scanned_but_not_capturing() {
        let groups = scan_groups(r"(?=x)(y)");
        assert_eq!(labels(&groups), vec!["(?=x)", "(y)"]);
        assert!(!groups[0].capturing);
        assert!(groups[1].capturing);
        assert_eq!(labels(&capture_fragments(r"(?=x)(y)")), vec!["(y)"]);
    }

    #[test]
    fn test_nested_outer_before_inner() {
        let groups = capture_fragments(r"((a)b)");
        assert_eq!(labels(&groups), vec!["((a)b)", "(a)"]);
    }

    #[test]
    fn test_escaped_parens_are_literals() {
        assert!(capture_fragments(r"\(a\)").is_empty());
    }

    #[test]
    fn test_double_backslash_does_not_escape() {
        let groups = capture_fragments(r"\\(a)");
        assert_eq!(labels(&groups), vec!["(a)"]);
    }

    #[test]
    fn test_parens_inside_character_class() {
        assert!(capture_fragments(r"[(]a[)]").is_empty());
        let groups = capture_fragments(r"[()]+(b)");
        assert_eq!(labels(&groups), vec!["(b)"]);
    }

    #[test]
    fn test_unbalanced_tolerated() {
        assert!(scan_groups(r"(a").is_empty());
        assert!(scan_groups(r")").is_empty());
        assert_eq!(labels(&scan_groups(r"(a)(b")), vec!["(a)"]);
    }

    #[test]
    fn test_empty_group() {
        let groups = capture_fragments(r"()");
        assert_eq!(labels(&groups), vec!["()"]);
        assert!(groups[0].capturing);
    }

    #[test]
    fn test_custom_filter() {
        let groups = capture_fragments_with(r"(a)(bb)", |g| g.label.len() > 3);
        assert_eq!(labels(&groups), vec!["(bb)"]);
    }

    #[test]
    fn test_whole_pattern_descriptor() {
        let g = GroupDescriptor::whole_pattern(r"\d+");
        assert_eq!(g.label, r"(\d+)");
        assert_eq!(g.span, Span::new(0, 5));
        assert!(g.capturing);
    }

    proptest! {
        #[test]
        fn prop_scanner_never_panics(pattern in ".*") {
            let _ = scan_groups(&pattern);
        }

        #[test]
        fn prop_labels_match_source_spans(pattern in r"[a-z()\\\[\]?:=]{0,40}") {
            for g in scan_groups(&pattern) {
                prop_assert!(g.span.end <= pattern.len());
                prop_assert_eq!(&pattern[g.span.start..g.span.end], g.label.as_str());
                prop_assert!(g.label.starts_with('('));
                prop_assert!(g.label.ends_with(')'));
            }
        }
    }
}
