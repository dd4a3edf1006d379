use crate::error::LexError;
use crate::span::Span;
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n]+")] // Skip whitespace
pub enum Token {
    // Degrees, duration amounts and divisors
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    // Letter names with accidentals and an optional octave: C, F#3, Bb-1
    #[regex(r"[A-G][#b]*(-?[0-9]+)?")]
    NoteName,

    #[token("~")]
    Rest,

    // Duration marks
    #[token("@")]
    At,
    #[token("/")]
    Slash,
    #[token(".")]
    Dot,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Modifiers
    #[token("^")]
    Caret,
    #[token("_")]
    Underscore,
    #[token("!")]
    Bang,
    #[token("'")]
    Quote,
    #[token("=")]
    Equals,

    // Separates the voices of a parallel block
    #[token(",")]
    Comma,

    #[regex(r"//[^\n]*")]
    Comment,
}

/// Coarse classification of tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    NoteName,
    Rest,
    DurationMark,
    Delimiter,
    Modifier,
    Separator,
    Comment,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Number => TokenKind::Number,
            Token::NoteName => TokenKind::NoteName,
            Token::Rest => TokenKind::Rest,
            Token::At | Token::Slash | Token::Dot => TokenKind::DurationMark,
            Token::LParen | Token::RParen | Token::LBracket | Token::RBracket => {
                TokenKind::Delimiter
            }
            Token::Caret | Token::Underscore | Token::Bang | Token::Quote | Token::Equals => {
                TokenKind::Modifier
            }
            Token::Comma => TokenKind::Separator,
            Token::Comment => TokenKind::Comment,
        }
    }

    /// Whether this token can begin an element
    pub fn starts_element(&self) -> bool {
        matches!(
            self,
            Token::Number | Token::NoteName | Token::Rest | Token::LParen | Token::LBracket
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number => write!(f, "number"),
            Token::NoteName => write!(f, "note name"),
            Token::Rest => write!(f, "~"),
            Token::At => write!(f, "@"),
            Token::Slash => write!(f, "/"),
            Token::Dot => write!(f, "."),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Caret => write!(f, "^"),
            Token::Underscore => write!(f, "_"),
            Token::Bang => write!(f, "!"),
            Token::Quote => write!(f, "'"),
            Token::Equals => write!(f, "="),
            Token::Comma => write!(f, ","),
            Token::Comment => write!(f, "comment"),
        }
    }
}

/// Lexer wrapper with position tracking and one token of lookahead
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    peeked: Option<Option<Result<(Token, Span), LexError>>>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Lexer {
            inner: Token::lexer(source),
            peeked: None,
        }
    }

    pub fn next_token(&mut self) -> Option<Result<(Token, Span), LexError>> {
        if let Some(peeked) = self.peeked.take() {
            return peeked;
        }

        loop {
            let token = self.inner.next()?;
            let span = Span::from(self.inner.span());

            match token {
                Ok(Token::Comment) => continue,
                Ok(token) => return Some(Ok((token, span))),
                Err(()) => {
                    let found = self.source()[span.start..].chars().next().unwrap_or('\0');
                    return Some(Err(LexError::new(span.start, found)));
                }
            }
        }
    }

    pub fn peek_token(&mut self) -> Option<Result<(Token, Span), LexError>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_token());
        }
        self.peeked.as_ref().and_then(|x| x.clone())
    }

    pub fn source(&self) -> &'source str {
        self.inner.source()
    }

    pub fn slice(&self, span: Span) -> &'source str {
        span.text(self.source())
    }
}

/// Turn notation text into its full token stream
///
/// Stops at the first unrecognized character.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(next) = lexer.next_token() {
        tokens.push(next?);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    #[test]
    fn test_lex_note_names() {
        assert_eq!(
            lex("C D# Bb3 F#-1"),
            vec![Token::NoteName, Token::NoteName, Token::NoteName, Token::NoteName]
        );
    }

    #[test]
    fn test_adjacent_names_split() {
        let tokens = tokenize("CDE").unwrap();
        let spans: Vec<Span> = tokens.iter().map(|(_, span)| *span).collect();
        assert_eq!(spans, vec![Span::new(0, 1), Span::new(1, 2), Span::new(2, 3)]);
    }

    #[test]
    fn test_lex_numbers() {
        assert_eq!(
            lex("0 -3 2.5"),
            vec![Token::Number, Token::Number, Token::Number]
        );
    }

    #[test]
    fn test_lex_durations_and_modifiers() {
        assert_eq!(
            lex("C@3/2 D/2. 4^!'"),
            vec![
                Token::NoteName,
                Token::At,
                Token::Number,
                Token::Slash,
                Token::Number,
                Token::NoteName,
                Token::Slash,
                Token::Number,
                Token::Dot,
                Token::Number,
                Token::Caret,
                Token::Bang,
                Token::Quote,
            ]
        );
    }

    #[test]
    fn test_lex_structure() {
        assert_eq!(
            lex("(C ~) [E, G]"),
            vec![
                Token::LParen,
                Token::NoteName,
                Token::Rest,
                Token::RParen,
                Token::LBracket,
                Token::NoteName,
                Token::Comma,
                Token::NoteName,
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_lex_skip_comments() {
        assert_eq!(lex("C // the tonic\nD"), vec![Token::NoteName, Token::NoteName]);
    }

    #[test]
    fn test_unknown_character_reports_offset() {
        let err = tokenize("C D $ E").unwrap_err();
        assert_eq!(err.offset, 4);
        assert_eq!(err.found, '$');
    }

    #[test]
    fn test_token_kinds() {
        assert_eq!(Token::At.kind(), TokenKind::DurationMark);
        assert_eq!(Token::RBracket.kind(), TokenKind::Delimiter);
        assert_eq!(Token::Underscore.kind(), TokenKind::Modifier);
        assert_eq!(Token::Comma.kind(), TokenKind::Separator);
    }

    #[test]
    fn test_lexer_peek() {
        let mut lexer = Lexer::new("C ~");

        let (token, _) = lexer.peek_token().unwrap().unwrap();
        assert_eq!(token, Token::NoteName);
        let (token, span) = lexer.next_token().unwrap().unwrap();
        assert_eq!(token, Token::NoteName);
        assert_eq!(lexer.slice(span), "C");

        let (token, _) = lexer.next_token().unwrap().unwrap();
        assert_eq!(token, Token::Rest);
        assert!(lexer.next_token().is_none());
    }
}
