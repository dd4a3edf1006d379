//! Neuma: a compact notation for pitch sequences, decoded against a scale and
//! played back on a tick-driven clock
//!
//! The work is split across three crates, re-exported here:
//! - `neuma-core`: exact time, pitches, scales, events
//! - `neuma-lang`: tokenizer, parser, formatter, decoder
//! - `neuma-clock`: the logical clock and event binding
//!
//! # Examples
//!
//! ```
//! use neuma::{decode, parse, Clock, Fraction, RecordingSink, Scale, Sequencer};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let ast = parse("0 2 4").unwrap();
//! let scale = Scale::named(60, "major").unwrap();
//! let events = decode(&ast, &scale, Fraction::ZERO).unwrap();
//!
//! let sink = Rc::new(RefCell::new(RecordingSink::new()));
//! let mut clock = Clock::new();
//! Sequencer::default().bind(&mut clock, &events, &sink).unwrap();
//! clock.run(None);
//! for _ in 0..=72 {
//!     clock.tick().unwrap();
//! }
//! assert_eq!(sink.borrow().messages.len(), 6);
//! ```

pub mod config;

pub use config::{Config, ScaleConfig};

pub use neuma_clock::{
    Action, Clock, ClockConfig, ClockError, ClockState, DispatchError, EventSink, RecordingSink,
    Sequencer, SinkMessage,
};
pub use neuma_core::{
    name_to_pitch, pitch_name, Articulation, ConfigError, Fraction, NoteName, Pitch, PitchEvent,
    Scale,
};
pub use neuma_lang::{
    decode, format, parse, DecodeConfig, DecodeError, Decoder, Error, Node, Sequence, Span,
};
