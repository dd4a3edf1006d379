//! Note names and MIDI-style pitch numbers
//!
//! Pitches are plain integers on the MIDI grid: middle C (`C4`) is 60 and each
//! octave spans 12 semitones.

use serde::{Deserialize, Serialize};

/// An absolute pitch (MIDI note number, unbounded)
pub type Pitch = i64;

/// Note names in chromatic order
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A parsed note name such as `F#3` or `Bb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteName {
    /// Upper-case letter `A`..=`G`
    pub letter: char,
    /// Net accidental in semitones (`#` = +1, `b` = -1)
    pub accidental: i32,
    pub octave: Option<i32>,
}

impl NoteName {
    /// Parse the textual form `[A-G](#|b)*(-?[0-9]+)?`
    pub fn parse(s: &str) -> Option<NoteName> {
        let mut chars = s.char_indices();
        let (_, letter) = chars.next()?;
        letter_class(letter)?;

        let mut accidental = 0;
        let mut rest = "";
        for (i, c) in chars {
            match c {
                '#' => accidental += 1,
                'b' => accidental -= 1,
                _ => {
                    rest = &s[i..];
                    break;
                }
            }
        }

        let octave = if rest.is_empty() {
            None
        } else {
            Some(rest.parse().ok()?)
        };

        Some(NoteName {
            letter,
            accidental,
            octave,
        })
    }

    /// Pitch class in `0..12`, accidentals applied
    pub fn pitch_class(&self) -> i32 {
        (letter_class(self.letter).unwrap_or(0) + self.accidental).rem_euclid(12)
    }

    /// Absolute pitch, using `default_octave` when the name carries none
    pub fn to_pitch(&self, default_octave: i32) -> Pitch {
        let octave = self.octave.unwrap_or(default_octave);
        // Accidentals may cross the octave boundary (Cb4 == B3)
        let natural = letter_class(self.letter).unwrap_or(0) as Pitch;
        natural + self.accidental as Pitch + (octave as Pitch + 1) * 12
    }
}

impl std::fmt::Display for NoteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter)?;
        let mark = if self.accidental >= 0 { "#" } else { "b" };
        for _ in 0..self.accidental.abs() {
            write!(f, "{}", mark)?;
        }
        if let Some(octave) = self.octave {
            write!(f, "{}", octave)?;
        }
        Ok(())
    }
}

/// Semitone offset of a natural letter from C
fn letter_class(letter: char) -> Option<i32> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Octave number of a pitch (60 is in octave 4)
pub fn octave_of(pitch: Pitch) -> i32 {
    (pitch.div_euclid(12) - 1) as i32
}

/// Render a pitch with sharps, e.g. `61` -> `C#4`
pub fn pitch_name(pitch: Pitch) -> String {
    let index = pitch.rem_euclid(12) as usize;
    format!("{}{}", NOTE_NAMES[index], octave_of(pitch))
}

/// Parse a note name straight to a pitch, defaulting to octave 4
pub fn name_to_pitch(name: &str) -> Option<Pitch> {
    NoteName::parse(name).map(|n| n.to_pitch(4))
}
