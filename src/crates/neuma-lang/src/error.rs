use crate::span::Span;

pub type Result<T> = std::result::Result<T, Error>;

/// An unrecognized character in the notation source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized character '{found}' at byte {offset}")]
pub struct LexError {
    pub offset: usize,
    pub found: char,
}

impl LexError {
    pub fn new(offset: usize, found: char) -> Self {
        LexError { offset, found }
    }
}

/// A grammar violation; carries where it happened and what was expected there
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of input at byte {offset}, expected {expected}")]
    UnexpectedEof { expected: String, offset: usize },

    #[error("Unclosed delimiter '{delimiter}' opened at {open_span}")]
    UnclosedDelimiter { delimiter: char, open_span: Span },

    #[error("Invalid number '{value}' at {span}: {reason}")]
    InvalidNumber {
        value: String,
        reason: String,
        span: Span,
    },

    #[error("Modifier '{modifier}' is not allowed on {target} at {span}")]
    InvalidModifier {
        modifier: String,
        target: String,
        span: Span,
    },
}

impl ParseError {
    pub fn unexpected_token(
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>, offset: usize) -> Self {
        ParseError::UnexpectedEof {
            expected: expected.into(),
            offset,
        }
    }

    pub fn unclosed_delimiter(delimiter: char, open_span: Span) -> Self {
        ParseError::UnclosedDelimiter { delimiter, open_span }
    }

    pub fn invalid_number(
        value: impl Into<String>,
        reason: impl Into<String>,
        span: Span,
    ) -> Self {
        ParseError::InvalidNumber {
            value: value.into(),
            reason: reason.into(),
            span,
        }
    }

    pub fn invalid_modifier(
        modifier: impl Into<String>,
        target: impl Into<String>,
        span: Span,
    ) -> Self {
        ParseError::InvalidModifier {
            modifier: modifier.into(),
            target: target.into(),
            span,
        }
    }

    /// Source position of the offending token
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { offset, .. } => Span::point(*offset),
            ParseError::UnclosedDelimiter { open_span, .. } => *open_span,
            ParseError::InvalidNumber { span, .. } => *span,
            ParseError::InvalidModifier { span, .. } => *span,
        }
    }
}

/// A tree that parses but cannot be placed in time or pitch
///
/// Arithmetic is exact, so very large durations, deep nesting of groups
/// with coprime lengths, or far-off degrees can leave the `i64` range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Time offset overflows at {span}")]
    TimeOverflow { span: Span },

    #[error("Pitch '{pitch}' is out of range at {span}")]
    PitchOverflow { pitch: String, span: Span },
}

impl DecodeError {
    pub fn span(&self) -> Span {
        match self {
            DecodeError::TimeOverflow { span } => *span,
            DecodeError::PitchOverflow { span, .. } => *span,
        }
    }
}

/// Anything that can go wrong turning text into events
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl Error {
    /// Byte offset where the failure starts
    pub fn offset(&self) -> usize {
        match self {
            Error::Lex(e) => e.offset,
            Error::Parse(e) => e.span().start,
            Error::Decode(e) => e.span().start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ParseError::unexpected_token("note, rest, '(' or '['", ")", Span::new(3, 4));
        assert_eq!(err.to_string(), "Expected note, rest, '(' or '[', found ) at 3..4");

        let err: Error = LexError::new(5, '$').into();
        assert_eq!(err.to_string(), "Unrecognized character '$' at byte 5");
        assert_eq!(err.offset(), 5);
    }

    #[test]
    fn test_eof_span_is_a_point() {
        let err = ParseError::unexpected_eof("']'", 9);
        assert_eq!(err.span(), Span::point(9));
    }

    #[test]
    fn test_decode_error_offset() {
        let err: Error = DecodeError::PitchOverflow {
            pitch: "9000000000000000000".to_string(),
            span: Span::new(4, 23),
        }
        .into();
        assert_eq!(err.offset(), 4);
        assert_eq!(err.to_string(), "Pitch '9000000000000000000' is out of range at 4..23");
    }
}
