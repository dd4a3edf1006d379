// Event sinks: where bound note callbacks deliver their messages

use neuma_core::{Pitch, PitchEvent};
use serde::{Deserialize, Serialize};

/// Receiver for note boundaries produced by a [`Sequencer`](crate::Sequencer)
///
/// Both methods run inside [`Clock::tick`](crate::Clock::tick); an `Err`
/// aborts that tick's dispatch and comes back out of `tick()`.
pub trait EventSink {
    fn note_on(&mut self, tick: u64, event: &PitchEvent) -> anyhow::Result<()>;

    fn note_off(&mut self, tick: u64, event: &PitchEvent) -> anyhow::Result<()>;
}

/// A single message seen by a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkMessage {
    NoteOn { tick: u64, pitch: Pitch, velocity: u8 },
    NoteOff { tick: u64, pitch: Pitch },
}

impl SinkMessage {
    pub fn tick(&self) -> u64 {
        match self {
            SinkMessage::NoteOn { tick, .. } | SinkMessage::NoteOff { tick, .. } => *tick,
        }
    }

    pub fn pitch(&self) -> Pitch {
        match self {
            SinkMessage::NoteOn { pitch, .. } | SinkMessage::NoteOff { pitch, .. } => *pitch,
        }
    }
}

/// Sink that keeps every message in arrival order
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub messages: Vec<SinkMessage>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pitches whose note-on has no matching note-off yet
    pub fn sounding(&self) -> Vec<Pitch> {
        let mut sounding = Vec::new();
        for message in &self.messages {
            match *message {
                SinkMessage::NoteOn { pitch, .. } => sounding.push(pitch),
                SinkMessage::NoteOff { pitch, .. } => {
                    if let Some(pos) = sounding.iter().position(|&p| p == pitch) {
                        sounding.remove(pos);
                    }
                }
            }
        }
        sounding
    }
}

impl EventSink for RecordingSink {
    fn note_on(&mut self, tick: u64, event: &PitchEvent) -> anyhow::Result<()> {
        self.messages.push(SinkMessage::NoteOn {
            tick,
            pitch: event.pitch,
            velocity: event.velocity,
        });
        Ok(())
    }

    fn note_off(&mut self, tick: u64, event: &PitchEvent) -> anyhow::Result<()> {
        self.messages.push(SinkMessage::NoteOff {
            tick,
            pitch: event.pitch,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuma_core::Fraction;

    #[test]
    fn test_recording_sink_keeps_order() {
        let event = PitchEvent::new(64, Fraction::ZERO, Fraction::ONE).with_velocity(100);
        let mut sink = RecordingSink::new();
        sink.note_on(0, &event).unwrap();
        sink.note_off(24, &event).unwrap();

        assert_eq!(
            sink.messages,
            vec![
                SinkMessage::NoteOn { tick: 0, pitch: 64, velocity: 100 },
                SinkMessage::NoteOff { tick: 24, pitch: 64 },
            ]
        );
        assert_eq!(sink.messages[1].tick(), 24);
        assert!(sink.sounding().is_empty());
    }

    #[test]
    fn test_sounding_tracks_unmatched_note_ons() {
        let c = PitchEvent::new(60, Fraction::ZERO, Fraction::ONE);
        let e = PitchEvent::new(64, Fraction::ZERO, Fraction::ONE);
        let mut sink = RecordingSink::new();
        sink.note_on(0, &c).unwrap();
        sink.note_on(0, &e).unwrap();
        sink.note_off(12, &c).unwrap();
        assert_eq!(sink.sounding(), vec![64]);
    }

    #[test]
    fn test_message_serializes_with_type_tag() {
        let json = serde_json::to_string(&SinkMessage::NoteOff { tick: 3, pitch: 60 }).unwrap();
        assert_eq!(json, r#"{"type":"note_off","tick":3,"pitch":60}"#);
    }
}
