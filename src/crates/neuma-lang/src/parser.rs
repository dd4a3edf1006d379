use crate::ast::*;
use crate::error::{Error, ParseError, Result};
use crate::lexer::{Lexer, Token};
use crate::span::Span;
use neuma_core::{Articulation, Fraction, NoteName};
use tracing::trace;

const ELEMENT: &str = "note, rest, '(' or '['";

/// Recursive-descent parser for neumalang
pub struct Parser<'source> {
    lexer: Lexer<'source>,
}

impl<'source> Parser<'source> {
    /// Create a new parser from source code
    pub fn new(source: &'source str) -> Self {
        Parser {
            lexer: Lexer::new(source),
        }
    }

    /// Parse the whole input as one root sequence
    pub fn parse_sequence(&mut self) -> Result<Sequence> {
        let elements = self.parse_elements()?;

        if let Some((token, span)) = self.next()? {
            return Err(ParseError::unexpected_token(ELEMENT, token.to_string(), span).into());
        }

        let span = Span::new(0, self.lexer.source().len());
        trace!(elements = elements.len(), "parsed root sequence");
        Ok(Sequence::new(elements, span))
    }

    /// Parse elements until something that cannot start one
    fn parse_elements(&mut self) -> Result<Vec<Node>> {
        let mut elements = Vec::new();
        while let Some((token, _)) = self.peek()? {
            if !token.starts_element() {
                break;
            }
            elements.push(self.parse_element()?);
        }
        Ok(elements)
    }

    /// Parse one element with its trailing modifiers (e.g. `F#3@2!`)
    fn parse_element(&mut self) -> Result<Node> {
        let mut node = match self.next()? {
            Some((Token::Number, span)) => {
                let degree = self.parse_degree(span)?;
                Node::Note(Note::new(PitchToken::Degree(degree), span))
            }
            Some((Token::NoteName, span)) => {
                let text = self.lexer.slice(span);
                let name = NoteName::parse(text)
                    .ok_or_else(|| ParseError::invalid_number(text, "octave out of range", span))?;
                Node::Note(Note::new(PitchToken::Name(name), span))
            }
            Some((Token::Rest, span)) => Node::Rest(Rest::new(span)),
            Some((Token::LParen, span)) => self.parse_group(span)?,
            Some((Token::LBracket, span)) => self.parse_parallel(span)?,
            Some((token, span)) => {
                return Err(ParseError::unexpected_token(ELEMENT, token.to_string(), span).into());
            }
            None => return Err(self.eof(ELEMENT)),
        };

        self.parse_modifiers(&mut node)?;
        Ok(node)
    }

    /// Parse a group body after its `(`
    fn parse_group(&mut self, open: Span) -> Result<Node> {
        let elements = self.parse_elements()?;
        let close = self.expect_close(Token::RParen, '(', open, "')'")?;

        if elements.is_empty() {
            return Err(ParseError::unexpected_token(ELEMENT, ")", close).into());
        }
        Ok(Node::Group(Group::new(elements, open.merge(close))))
    }

    /// Parse comma-separated voices after a `[`
    fn parse_parallel(&mut self, open: Span) -> Result<Node> {
        let mut voices = Vec::new();

        loop {
            let elements = self.parse_elements()?;
            let voice_span = match (elements.first(), elements.last()) {
                (Some(first), Some(last)) => first.span().merge(last.span()),
                _ => {
                    // Empty voice: report whatever sits where it should start
                    let err = match self.next()? {
                        Some((token, span)) => {
                            ParseError::unexpected_token(ELEMENT, token.to_string(), span)
                        }
                        None => ParseError::unclosed_delimiter('[', open),
                    };
                    return Err(err.into());
                }
            };
            voices.push(Sequence::new(elements, voice_span));

            match self.next()? {
                Some((Token::Comma, _)) => continue,
                Some((Token::RBracket, close)) => {
                    return Ok(Node::Parallel(Parallel::new(voices, open.merge(close))));
                }
                Some((token, span)) => {
                    let err = ParseError::unexpected_token("',' or ']'", token.to_string(), span);
                    return Err(err.into());
                }
                None => return Err(ParseError::unclosed_delimiter('[', open).into()),
            }
        }
    }

    /// Parse duration marks and note modifiers following an element
    fn parse_modifiers(&mut self, node: &mut Node) -> Result<()> {
        let mut scale = Fraction::ONE;
        let mut dots = 0u32;
        let mut end = node.span();

        while let Some((token, span)) = self.peek()? {
            match token {
                Token::At => {
                    self.next()?;
                    let (amount, amount_span) = self.expect_amount("duration after '@'")?;
                    if amount.is_negative() {
                        return Err(self.bad_amount("durations cannot be negative", amount_span));
                    }
                    scale = scale
                        .checked_mul(amount)
                        .ok_or_else(|| self.bad_amount("duration out of range", amount_span))?;
                    end = amount_span;
                }
                Token::Slash => {
                    self.next()?;
                    let (amount, amount_span) = self.expect_amount("divisor after '/'")?;
                    if amount.is_zero() || amount.is_negative() {
                        return Err(self.bad_amount("divisor must be positive", amount_span));
                    }
                    scale = scale
                        .checked_div(amount)
                        .ok_or_else(|| self.bad_amount("duration out of range", amount_span))?;
                    end = amount_span;
                }
                Token::Dot => {
                    self.next()?;
                    dots += 1;
                    end = span;
                }
                Token::Caret | Token::Underscore | Token::Bang | Token::Quote | Token::Equals => {
                    self.next()?;
                    let note = match &mut *node {
                        Node::Note(note) => note,
                        other => {
                            return Err(ParseError::invalid_modifier(
                                token.to_string(),
                                describe(other),
                                span,
                            )
                            .into());
                        }
                    };
                    match token {
                        Token::Caret => note.octave_shift = note.octave_shift.saturating_add(1),
                        Token::Underscore => {
                            note.octave_shift = note.octave_shift.saturating_sub(1)
                        }
                        Token::Bang => note.articulations.push(Articulation::Accent),
                        Token::Quote => note.articulations.push(Articulation::Staccato),
                        _ => note.articulations.push(Articulation::Tenuto),
                    }
                    end = span;
                }
                _ => break,
            }
        }

        if dots > 0 {
            // Each dot adds half of the previous addition: 3/2, 7/4, 15/8 ...
            let denominator = 1i64 << dots.min(30);
            scale = scale
                .checked_mul(Fraction::new(2 * denominator - 1, denominator))
                .ok_or_else(|| self.bad_amount("duration out of range", end))?;
        }

        let span = node.span().merge(end);
        match node {
            Node::Note(note) => {
                note.duration = note.duration * scale;
                note.span = span;
            }
            Node::Rest(rest) => {
                rest.duration = rest.duration * scale;
                rest.span = span;
            }
            Node::Group(group) => {
                group.factor = group.factor * scale;
                group.span = span;
            }
            Node::Parallel(parallel) => {
                parallel.factor = parallel.factor * scale;
                parallel.span = span;
            }
            Node::Sequence(sequence) => sequence.span = span,
        }
        Ok(())
    }

    fn parse_degree(&self, span: Span) -> Result<i64> {
        let text = self.lexer.slice(span);
        if text.contains('.') {
            return Err(self.bad_amount("scale degrees are whole numbers", span));
        }
        text.parse().map_err(|_| self.bad_amount("degree out of range", span))
    }

    fn bad_amount(&self, reason: &str, span: Span) -> Error {
        ParseError::invalid_number(self.lexer.slice(span), reason, span).into()
    }

    fn expect_amount(&mut self, expected: &str) -> Result<(Fraction, Span)> {
        match self.next()? {
            Some((Token::Number, span)) => {
                let text = self.lexer.slice(span);
                let amount = Fraction::from_decimal_str(text)
                    .ok_or_else(|| ParseError::invalid_number(text, "amount out of range", span))?;
                Ok((amount, span))
            }
            Some((token, span)) => {
                Err(ParseError::unexpected_token(expected, token.to_string(), span).into())
            }
            None => Err(self.eof(expected)),
        }
    }

    fn expect_close(
        &mut self,
        close: Token,
        delimiter: char,
        open: Span,
        expected: &str,
    ) -> Result<Span> {
        match self.next()? {
            Some((token, span)) if token == close => Ok(span),
            Some((token, span)) => {
                Err(ParseError::unexpected_token(expected, token.to_string(), span).into())
            }
            None => Err(ParseError::unclosed_delimiter(delimiter, open).into()),
        }
    }

    // Helper methods

    fn peek(&mut self) -> Result<Option<(Token, Span)>> {
        self.lexer.peek_token().transpose().map_err(Error::from)
    }

    fn next(&mut self) -> Result<Option<(Token, Span)>> {
        self.lexer.next_token().transpose().map_err(Error::from)
    }

    fn eof(&self, expected: &str) -> Error {
        ParseError::unexpected_eof(expected, self.lexer.source().len()).into()
    }
}

fn describe(node: &Node) -> &'static str {
    match node {
        Node::Sequence(_) => "a sequence",
        Node::Group(_) => "a group",
        Node::Parallel(_) => "a parallel block",
        Node::Note(_) => "a note",
        Node::Rest(_) => "a rest",
    }
}

/// Convenience function to parse neumalang text
pub fn parse(source: &str) -> Result<Sequence> {
    let mut parser = Parser::new(source);
    parser.parse_sequence()
}
