//! Neumalang: notation, parser and decoder
//!
//! This crate tokenizes and parses the neumalang notation into an AST, formats
//! it back to text, and decodes it against a [`Scale`](neuma_core::Scale) into
//! concrete pitch events.
//!
//! # Examples
//!
//! ```
//! use neuma_core::{Fraction, Scale};
//! use neuma_lang::{decode, parse};
//!
//! let ast = parse("C D (E F G)@2 ~ [C, E, G]").unwrap();
//! let scale = Scale::named(60, "major").unwrap();
//! let events = decode(&ast, &scale, Fraction::ZERO).unwrap();
//! assert_eq!(events[2].duration, Fraction::new(2, 3));
//! ```
//!
//! # Notation
//!
//! - Notes: scale degrees `0 2 -1` or letter names `C F#3 Bb`
//! - Rest: `~`
//! - Durations: `@2`, `@0.5`, `/3`, dots `C.` (all relative to the inherited beat)
//! - Octaves: `^` up, `_` down
//! - Articulation: `!` accent, `'` staccato, `=` tenuto
//! - Groups: `(C D E)@2` splits two beats by the children's own lengths
//! - Parallel voices: `[C E G, C3@3]`
//! - Comments: `// to end of line`

pub mod ast;
pub mod decoder;
pub mod error;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod span;


pub use ast::{Group, Node, Note, Parallel, PitchToken, Rest, Sequence};
pub use decoder::{decode, DecodeConfig, Decoder};
pub use error::{DecodeError, Error, LexError, ParseError, Result};
pub use formatter::{format, format_node};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use parser::{parse, Parser};
pub use span::Span;
