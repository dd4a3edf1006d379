//! Decoding: AST + scale + start offset → ordered pitch events
//!
//! Decoding is a pure function of its inputs. Every duration in the AST is a
//! multiple of the beat its parent hands down; the root receives
//! [`DecodeConfig::default_beat`]. All arithmetic is exact, so a group's
//! children always fill the group to the last fraction of a beat.

use crate::ast::*;
use crate::error::DecodeError;
use crate::span::Span;
use neuma_core::{Articulation, Fraction, PitchEvent, Scale};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings the decoder applies where the notation is silent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Length of an unmodified note at the root, in beats
    pub default_beat: Fraction,
    /// Octave for letter names written without one
    pub default_octave: i32,
    pub velocity: u8,
    pub accent_velocity: u8,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        DecodeConfig {
            default_beat: Fraction::ONE,
            default_octave: 4,
            velocity: 96,
            accent_velocity: 120,
        }
    }
}

/// Turns parsed notation into concrete events against a scale
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecodeConfig,
}

impl Decoder {
    pub fn new(config: DecodeConfig) -> Self {
        Decoder { config }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode a root sequence starting at `start`
    ///
    /// Events come back stably sorted by start offset; voices of a parallel
    /// block keep their source order at equal offsets. Fails when a time or a
    /// pitch leaves the `i64` range.
    pub fn decode(
        &self,
        ast: &Sequence,
        scale: &Scale,
        start: Fraction,
    ) -> Result<Vec<PitchEvent>, DecodeError> {
        let mut events = Vec::new();
        let consumed = self.sequence(ast, scale, start, self.config.default_beat, &mut events)?;
        events.sort_by(|a, b| a.start.cmp(&b.start));
        debug!(events = events.len(), %start, %consumed, "decoded sequence");
        Ok(events)
    }

    /// Decode any node, returning its events and the time it consumes
    pub fn decode_node(
        &self,
        node: &Node,
        scale: &Scale,
        start: Fraction,
    ) -> Result<(Vec<PitchEvent>, Fraction), DecodeError> {
        let mut events = Vec::new();
        let consumed = self.node(node, scale, start, self.config.default_beat, &mut events)?;
        events.sort_by(|a, b| a.start.cmp(&b.start));
        Ok((events, consumed))
    }

    /// Emit the events of `node` into `out`; returns the duration consumed
    fn node(
        &self,
        node: &Node,
        scale: &Scale,
        start: Fraction,
        beat: Fraction,
        out: &mut Vec<PitchEvent>,
    ) -> Result<Fraction, DecodeError> {
        match node {
            Node::Sequence(seq) => self.sequence(seq, scale, start, beat, out),
            Node::Group(group) => self.group(group, scale, start, beat, out),
            Node::Parallel(parallel) => self.parallel(parallel, scale, start, beat, out),
            Node::Note(note) => {
                let duration = in_time(note.duration.checked_mul(beat), note.span)?;
                in_time(start.checked_add(duration), note.span)?;
                out.push(self.note(note, scale, start, duration)?);
                Ok(duration)
            }
            Node::Rest(rest) => in_time(rest.duration.checked_mul(beat), rest.span),
        }
    }

    fn sequence(
        &self,
        seq: &Sequence,
        scale: &Scale,
        start: Fraction,
        beat: Fraction,
        out: &mut Vec<PitchEvent>,
    ) -> Result<Fraction, DecodeError> {
        let mut cursor = start;
        for element in &seq.elements {
            let consumed = self.node(element, scale, cursor, beat, out)?;
            cursor = in_time(cursor.checked_add(consumed), element.span())?;
        }
        in_time(cursor.checked_sub(start), seq.span)
    }

    fn group(
        &self,
        group: &Group,
        scale: &Scale,
        start: Fraction,
        beat: Fraction,
        out: &mut Vec<PitchEvent>,
    ) -> Result<Fraction, DecodeError> {
        let total = in_time(group.factor.checked_mul(beat), group.span)?;
        let weight = in_time(group.total_weight(), group.span)?;
        let count = group.elements.len() as i64;
        if count == 0 {
            return Ok(total);
        }

        // Nothing claims any weight: split evenly
        let even = weight.is_zero();
        let child_beat = if even {
            total.checked_div(Fraction::from_int(count))
        } else {
            total.checked_div(weight)
        };
        let child_beat = in_time(child_beat, group.span)?;

        let mut cursor = start;
        for element in &group.elements {
            let slot = if even {
                child_beat
            } else {
                let length = in_time(element.length(), element.span())?;
                in_time(length.checked_mul(child_beat), element.span())?
            };

            let consumed = self.node(element, scale, cursor, child_beat, out)?;
            debug_assert!(even || consumed == slot);
            cursor = in_time(cursor.checked_add(slot), element.span())?;
        }
        Ok(total)
    }

    fn parallel(
        &self,
        parallel: &Parallel,
        scale: &Scale,
        start: Fraction,
        beat: Fraction,
        out: &mut Vec<PitchEvent>,
    ) -> Result<Fraction, DecodeError> {
        let voice_beat = in_time(parallel.factor.checked_mul(beat), parallel.span)?;
        let mut longest = Fraction::ZERO;
        for voice in &parallel.voices {
            longest = longest.max(self.sequence(voice, scale, start, voice_beat, out)?);
        }
        Ok(longest)
    }

    fn note(
        &self,
        note: &Note,
        scale: &Scale,
        start: Fraction,
        duration: Fraction,
    ) -> Result<PitchEvent, DecodeError> {
        let pitch = match note.pitch {
            PitchToken::Degree(degree) => scale
                .root_octave()
                .checked_add(note.octave_shift)
                .and_then(|octave| scale.checked_resolve(degree, octave)),
            PitchToken::Name(name) => name
                .to_pitch(self.config.default_octave)
                .checked_add(12 * i64::from(note.octave_shift))
                .and_then(|target| {
                    let (degree, remainder) = scale.locate(target);
                    scale
                        .checked_resolve(degree, scale.root_octave())?
                        .checked_add(remainder)
                }),
        };
        let pitch = pitch.ok_or_else(|| DecodeError::PitchOverflow {
            pitch: note.pitch.to_string(),
            span: note.span,
        })?;

        let velocity = if note.is_accented() {
            self.config.accent_velocity
        } else {
            self.config.velocity
        };

        let articulation = note
            .articulations
            .iter()
            .rev()
            .find(|a| **a != Articulation::Accent)
            .copied()
            .unwrap_or(if note.is_accented() {
                Articulation::Accent
            } else {
                Articulation::Normal
            });

        Ok(PitchEvent::new(pitch, start, duration)
            .with_velocity(velocity)
            .with_articulation(articulation))
    }
}

fn in_time(value: Option<Fraction>, span: Span) -> Result<Fraction, DecodeError> {
    value.ok_or(DecodeError::TimeOverflow { span })
}

/// Decode with the default configuration
pub fn decode(
    ast: &Sequence,
    scale: &Scale,
    start: Fraction,
) -> Result<Vec<PitchEvent>, DecodeError> {
    Decoder::default().decode(ast, scale, start)
}
