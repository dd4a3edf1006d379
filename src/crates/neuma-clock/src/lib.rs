//! Tick-driven logical clock for neumalang events
//!
//! This crate provides a single-threaded scheduler that never looks at a
//! wall clock. A host (an audio callback, a MIDI pulse, a test) calls
//! [`Clock::tick`] and everything due at that logical instant runs inside
//! the call:
//! - A `Stopped → Running → Terminated` lifecycle, with `Terminated` final
//! - Stable FIFO dispatch of callbacks due on the same tick
//! - Fail-fast propagation of callback failures out of `tick()`
//! - Binding of decoded [`PitchEvent`]s onto the clock through an [`EventSink`]

pub mod clock;
pub mod sequencer;
pub mod sink;

pub use clock::{Action, Clock, ClockState, ScheduledCallback};
pub use sequencer::{ClockConfig, Sequencer};
pub use sink::{EventSink, RecordingSink, SinkMessage};

/// Re-export common types from neuma-core
pub use neuma_core::{ConfigError, Fraction, PitchEvent};

/// A scheduled callback's own failure, observed during `tick()`
#[derive(Debug, thiserror::Error)]
#[error("Callback {index} failed at tick {tick}: {source}")]
pub struct DispatchError {
    pub tick: u64,
    /// Insertion index of the failing callback
    pub index: u64,
    #[source]
    pub source: anyhow::Error,
}

/// Clock errors
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

pub type Result<T> = std::result::Result<T, ClockError>;
