use crate::pitch::{pitch_name, Pitch};
use crate::Fraction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a note is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Articulation {
    #[default]
    Normal,
    /// `!`
    Accent,
    /// `'`
    Staccato,
    /// `=`
    Tenuto,
}

impl Articulation {
    /// Modifier character used in the notation, if any
    pub fn symbol(&self) -> Option<char> {
        match self {
            Articulation::Normal => None,
            Articulation::Accent => Some('!'),
            Articulation::Staccato => Some('\''),
            Articulation::Tenuto => Some('='),
        }
    }
}

/// A concrete note: absolute pitch, start offset and duration in beats
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PitchEvent {
    pub pitch: Pitch,
    pub start: Fraction,
    pub duration: Fraction,
    pub velocity: u8,
    pub articulation: Articulation,
}

impl PitchEvent {
    pub fn new(pitch: Pitch, start: Fraction, duration: Fraction) -> Self {
        PitchEvent {
            pitch,
            start,
            duration,
            velocity: 96,
            articulation: Articulation::Normal,
        }
    }

    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_articulation(mut self, articulation: Articulation) -> Self {
        self.articulation = articulation;
        self
    }

    /// Offset at which the note ends
    /// Panics if the end leaves the `Fraction` range; decoded events never do
    pub fn end(&self) -> Fraction {
        self.start + self.duration
    }
}

impl fmt::Display for PitchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} for {} (vel {}",
            pitch_name(self.pitch),
            self.start,
            self.duration,
            self.velocity
        )?;
        if let Some(symbol) = self.articulation.symbol() {
            write!(f, " {}", symbol)?;
        }
        write!(f, ")")
    }
}
