use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Where a note, rest or bracket sits in the notation, as byte offsets
///
/// Modifiers extend their node's span, so `C@2!` covers all four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Zero-width span at `offset`, used for end-of-input positions
    pub fn point(offset: usize) -> Self {
        Span::new(offset, offset)
    }

    pub fn merge(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The notation covered by this span; empty when it falls outside `source`
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }

    /// The source line holding `start`, with `^` under the spanned part
    ///
    /// Used by the CLI to point at a bad token. A point span gets one caret.
    pub fn underline(&self, source: &str) -> String {
        let start = self.start.min(source.len());
        let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[start..].find('\n').map_or(source.len(), |i| start + i);
        let line = &source[line_start..line_end];

        let column = source[line_start..start].chars().count();
        let width = source
            .get(start..self.end.min(line_end))
            .map_or(0, |text| text.chars().count())
            .max(1);
        format!("{}\n{}{}", line, " ".repeat(column), "^".repeat(width))
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::parser::parse;

    #[test]
    fn test_spans_cover_modifiers() {
        let source = "C@2! (D E)/2";
        let seq = parse(source).unwrap();
        let texts: Vec<&str> = seq.elements.iter().map(|n| n.span().text(source)).collect();
        assert_eq!(texts, vec!["C@2!", "(D E)/2"]);
    }

    #[test]
    fn test_group_span_merges_its_children() {
        let source = "[0 2, 4]";
        let seq = parse(source).unwrap();
        match &seq.elements[0] {
            Node::Parallel(parallel) => {
                let voices = parallel.voices[0].span.merge(parallel.voices[1].span);
                assert_eq!(voices, Span::new(1, 7));
                assert_eq!(voices.text(source), "0 2, 4");
            }
            other => panic!("Expected Parallel, got {:?}", other),
        }
    }

    #[test]
    fn test_underline_points_at_the_token() {
        let source = "0 1\n(2 $ 3)";
        assert_eq!(Span::new(7, 8).underline(source), "(2 $ 3)\n   ^");
        assert_eq!(Span::new(0, 3).underline(source), "0 1\n^^^");
    }

    #[test]
    fn test_end_of_input_gets_one_caret() {
        let source = "(0 1";
        let span = Span::point(source.len());
        assert_eq!(span.text(source), "");
        assert_eq!(span.underline(source), "(0 1\n    ^");
        assert_eq!(Span::new(40, 41).text(source), "");
    }
}
