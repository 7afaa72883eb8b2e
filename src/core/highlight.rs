//! # Text Highlighter
//!
//! Keeps filter and search highlights consistent across the scrollback.
//!
//! When the search term changes, every retained line is rescanned: spans for
//! the previous term are removed first, then spans for the new term are
//! added where they aren't already present. Because highlights are spans
//! over unchanged content, the operation is lossless and idempotent:
//!
//! ```text
//! content: "foo wrapped"      spans: [Search 0..3]   (search = "foo")
//! rehighlight(search = "bar", previous = "foo")
//! content: "foo wrapped"      spans: []              (no "bar" present)
//! ```
//!
//! Banner lines are skipped. Only `Search` spans whose text is exactly the
//! previous term are removed; filter spans and bare occurrences are left alone.

use crate::core::line::{DecoratedLine, Highlight, HighlightKind};

/// A run of content sharing one highlight style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub kind: Option<HighlightKind>,
}

fn sort_spans(line: &mut DecoratedLine) {
    line.spans.sort_by_key(|s| (s.offset, s.len, s.kind == HighlightKind::Search));
}

fn mark(line: &mut DecoratedLine, term: &str, kind: HighlightKind) -> bool {
    if term.is_empty() || !line.is_entry() {
        return false;
    }

    let found: Vec<Highlight> = line
        .content
        .match_indices(term)
        .map(|(offset, m)| Highlight {
            offset,
            len: m.len(),
            kind,
        })
        .filter(|h| !line.spans.contains(h))
        .collect();

    if found.is_empty() {
        return false;
    }
    line.spans.extend(found);
    sort_spans(line);
    true
}

/// Highlight every occurrence of the active filter in an entry line.
pub fn mark_filter(line: &mut DecoratedLine, filter: &str) -> bool {
    mark(line, filter, HighlightKind::Filter)
}

/// Highlight every occurrence of `search` not already highlighted.
pub fn mark_search(line: &mut DecoratedLine, search: &str) -> bool {
    mark(line, search, HighlightKind::Search)
}

/// Remove search highlights that wrap exactly `previous`.
pub fn unmark_search(line: &mut DecoratedLine, previous: &str) -> bool {
    if previous.is_empty() || !line.is_entry() {
        return false;
    }

    let before = line.spans.len();
    let content = &line.content;
    line.spans.retain(|span| {
        span.kind != HighlightKind::Search
            || content.get(span.offset..span.end()) != Some(previous)
    });
    line.spans.len() != before
}

/// Rescan lines after a search change: strip `previous`, then apply `search`.
///
/// Returns how many lines changed.
pub fn rehighlight<'a, I>(lines: I, search: &str, previous: &str) -> usize
where
    I: IntoIterator<Item = &'a mut DecoratedLine>,
{
    let mut changed = 0;
    for line in lines {
        if !line.is_entry() {
            continue;
        }
        let before = line.spans.clone();
        unmark_search(line, previous);
        mark_search(line, search);
        if line.spans != before {
            changed += 1;
        }
    }
    changed
}

/// Split a line's content into styled runs for rendering.
///
/// Search styling wins over filter styling where the two overlap.
pub fn segments(line: &DecoratedLine) -> Vec<Segment<'_>> {
    let content = line.content.as_str();
    if line.spans.is_empty() {
        return vec![Segment {
            text: content,
            kind: None,
        }];
    }

    let mut bounds: Vec<usize> = vec![0, content.len()];
    for span in &line.spans {
        bounds.push(span.offset.min(content.len()));
        bounds.push(span.end().min(content.len()));
    }
    bounds.retain(|&b| content.is_char_boundary(b));
    bounds.sort_unstable();
    bounds.dedup();

    // (start, end, kind) runs, merged when adjacent runs share a style.
    let mut runs: Vec<(usize, usize, Option<HighlightKind>)> = Vec::new();
    for pair in bounds.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let covers = |kind: HighlightKind| {
            line.spans
                .iter()
                .any(|s| s.kind == kind && s.offset <= start && s.end() >= end)
        };
        let kind = if covers(HighlightKind::Search) {
            Some(HighlightKind::Search)
        } else if covers(HighlightKind::Filter) {
            Some(HighlightKind::Filter)
        } else {
            None
        };

        match runs.last_mut() {
            Some(last) if last.2 == kind => last.1 = end,
            _ => runs.push((start, end, kind)),
        }
    }

    runs.into_iter()
        .map(|(start, end, kind)| Segment {
            text: &content[start..end],
            kind,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use proptest::prelude::*;

    fn entry(content: &str) -> DecoratedLine {
        DecoratedLine::entry(1, Local::now(), content)
    }

    fn styled(line: &DecoratedLine) -> Vec<(&str, Option<HighlightKind>)> {
        segments(line).into_iter().map(|s| (s.text, s.kind)).collect()
    }

    #[test]
    fn test_mark_filter_wraps_every_occurrence() {
        let mut line = entry("a: ERR 2 ERR");
        assert!(mark_filter(&mut line, "ERR"));
        assert_eq!(line.spans.len(), 2);
        assert_eq!(
            styled(&line),
            vec![
                ("a: ", None),
                ("ERR", Some(HighlightKind::Filter)),
                (" 2 ", None),
                ("ERR", Some(HighlightKind::Filter)),
            ]
        );
    }

    #[test]
    fn test_empty_terms_are_noops() {
        let mut line = entry("a: line 1");
        assert!(!mark_filter(&mut line, ""));
        assert!(!mark_search(&mut line, ""));
        assert!(!unmark_search(&mut line, ""));
        assert!(line.spans.is_empty());
    }

    #[test]
    fn test_search_then_replace_unwraps_previous() {
        let mut lines = vec![entry("foo wrapped"), entry("bar and foo")];
        rehighlight(lines.iter_mut(), "foo", "");
        assert_eq!(lines[0].spans.len(), 1);
        assert_eq!(lines[1].spans.len(), 1);

        rehighlight(lines.iter_mut(), "bar", "foo");
        assert!(lines[0].spans.is_empty());
        assert_eq!(
            styled(&lines[1]),
            vec![("bar", Some(HighlightKind::Search)), (" and foo", None)]
        );
    }

    #[test]
    fn test_rehighlight_is_idempotent() {
        let mut once = vec![entry("x foo y foo"), entry("nothing here")];
        rehighlight(once.iter_mut(), "foo", "bar");
        let mut twice = once.clone();
        let changed = rehighlight(twice.iter_mut(), "foo", "bar");
        assert_eq!(changed, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_wrap_then_unwrap_round_trips() {
        let original = entry("a: needle in the haystack");
        let mut line = original.clone();
        rehighlight(std::iter::once(&mut line), "needle", "");
        assert_ne!(line, original);
        rehighlight(std::iter::once(&mut line), "", "needle");
        assert_eq!(line, original);
    }

    #[test]
    fn test_same_term_as_previous_keeps_highlight() {
        let mut line = entry("a: foo");
        rehighlight(std::iter::once(&mut line), "foo", "");
        let before = line.clone();
        rehighlight(std::iter::once(&mut line), "foo", "foo");
        assert_eq!(line, before);
    }

    #[test]
    fn test_unmark_only_touches_exact_search_spans() {
        let mut line = entry("a: foo foo");
        mark_filter(&mut line, "foo");
        let before = line.clone();
        // Filter spans and bare occurrences are left untouched.
        assert!(!unmark_search(&mut line, "foo"));
        assert_eq!(line, before);

        mark_search(&mut line, "fo");
        assert!(!unmark_search(&mut line, "foo"));
        assert!(unmark_search(&mut line, "fo"));
        assert_eq!(line, before);
    }

    #[test]
    fn test_banner_lines_pass_through() {
        let mut banner = DecoratedLine::banner("PAUSED @ 12:00:00");
        let before = banner.clone();
        assert_eq!(rehighlight(std::iter::once(&mut banner), "PAUSED", "x"), 0);
        assert!(!mark_filter(&mut banner, "PAUSED"));
        assert_eq!(banner, before);
    }

    #[test]
    fn test_prefix_fields_never_match() {
        // Ordinal 12 and the timestamp digits live outside the content.
        let mut line = DecoratedLine::entry(12, Local::now(), "a: line");
        let kind = line.kind.clone();
        assert!(!mark_search(&mut line, "12"));
        assert_eq!(line.kind, kind);
        assert!(line.spans.is_empty());
    }

    #[test]
    fn test_search_wins_over_filter_when_overlapping() {
        let mut line = entry("a: ERROR");
        mark_filter(&mut line, "ERROR");
        mark_search(&mut line, "ROR");
        assert_eq!(
            styled(&line),
            vec![
                ("a: ", None),
                ("ER", Some(HighlightKind::Filter)),
                ("ROR", Some(HighlightKind::Search)),
            ]
        );
    }

    #[test]
    fn test_segments_plain_line() {
        let line = entry("plain");
        assert_eq!(styled(&line), vec![("plain", None)]);
    }

    // ===== Properties =====

    /// Small alphabet so generated terms actually occur in the content.
    fn arb_content() -> impl Strategy<Value = String> {
        "[ab: é]{0,24}"
    }

    fn arb_term() -> impl Strategy<Value = String> {
        "[abé]{0,3}"
    }

    proptest! {
        #[test]
        fn prop_filter_marks_iff_contained(content in arb_content(), filter in "[abé]{1,3}") {
            let mut line = entry(&content);
            let marked = mark_filter(&mut line, &filter);
            prop_assert_eq!(marked, content.contains(filter.as_str()));
            for span in &line.spans {
                prop_assert_eq!(line.span_text(span), Some(filter.as_str()));
            }
            prop_assert_eq!(&line.content, &content);
        }

        #[test]
        fn prop_rehighlight_is_idempotent(
            content in arb_content(),
            filter in arb_term(),
            earlier in arb_term(),
            previous in arb_term(),
            search in arb_term(),
        ) {
            let mut line = entry(&content);
            mark_filter(&mut line, &filter);
            mark_search(&mut line, &earlier);

            let mut once = line.clone();
            rehighlight(std::iter::once(&mut once), &search, &previous);
            let mut twice = once.clone();
            let changed = rehighlight(std::iter::once(&mut twice), &search, &previous);
            prop_assert_eq!(changed, 0);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_highlight_then_strip_round_trips(
            content in arb_content(),
            filter in arb_term(),
            term in arb_term(),
        ) {
            let mut original = entry(&content);
            mark_filter(&mut original, &filter);

            let mut line = original.clone();
            rehighlight(std::iter::once(&mut line), &term, "");
            rehighlight(std::iter::once(&mut line), "", &term);
            prop_assert_eq!(line, original);
        }

        #[test]
        fn prop_unmark_leaves_filter_spans(
            content in arb_content(),
            term in arb_term(),
        ) {
            let mut line = entry(&content);
            mark_filter(&mut line, &term);
            let before = line.clone();
            prop_assert!(!unmark_search(&mut line, &term));
            prop_assert_eq!(line, before);
        }

        #[test]
        fn prop_banners_never_change(text in arb_content(), search in arb_term(), previous in arb_term()) {
            let mut banner = DecoratedLine::banner(text);
            let before = banner.clone();
            prop_assert_eq!(rehighlight(std::iter::once(&mut banner), &search, &previous), 0);
            prop_assert_eq!(banner, before);
        }
    }
}
