//! Core types for neumalang
//!
//! This crate holds the pieces shared by the parser, the decoder and the
//! clock: exact rational time, pitch names, scales and the events the decoder
//! produces.
//!
//! # Examples
//!
//! ```
//! use neuma_core::{Fraction, Scale};
//!
//! let scale = Scale::new(60, vec![2, 2, 1, 2, 2, 2, 1], "major").unwrap();
//! assert_eq!(scale.resolve(2, 4), 64);
//! assert_eq!(scale.resolve(7, 4), 72);
//!
//! let third = Fraction::new(1, 3);
//! assert_eq!(third + third + third, Fraction::ONE);
//! ```
//!
//! # Main Components
//!
//! - **Fraction**: exact rational durations and offsets
//! - **Scale**: degree → pitch resolution with octave wrap
//! - **PitchEvent**: a decoded note
//! - **ConfigError**: misuse reported at construction or scheduling time

pub mod error;
pub mod event;
pub mod fraction;
pub mod pitch;
pub mod scale;

pub use error::ConfigError;
pub use event::{Articulation, PitchEvent};
pub use fraction::{Fraction, ParseFractionError};
pub use pitch::{name_to_pitch, pitch_name, NoteName, Pitch};
pub use scale::Scale;
