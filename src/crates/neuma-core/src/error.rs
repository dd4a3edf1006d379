use crate::Fraction;

/// Misuse detected while building a scale or scheduling work
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Scale needs at least one interval")]
    EmptyIntervals,

    #[error("Scale interval {index} is zero, steps must be positive")]
    ZeroInterval { index: usize },

    #[error("Unknown scale mode: {0}")]
    UnknownMode(String),

    #[error("Invalid scale root: {0}")]
    InvalidRoot(String),

    #[error("Cannot schedule at negative offset {0}")]
    NegativeOffset(i64),

    #[error("Cannot bind an event starting at negative time {0}")]
    NegativeStart(Fraction),

    #[error("Ticks per beat must be positive")]
    ZeroResolution,

    #[error("Beat offset {0} does not fit in a tick count")]
    TickOverflow(Fraction),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
