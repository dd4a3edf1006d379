// Sequencer: binds decoded pitch events onto a clock as note callbacks

use crate::{Clock, ClockState, EventSink, Result};
use neuma_core::{ConfigError, Fraction, PitchEvent};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};

/// Clock resolution settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Ticks in one beat (24 matches MIDI clock)
    pub ticks_per_beat: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig { ticks_per_beat: 24 }
    }
}

/// Turns beat offsets into tick offsets and schedules note boundaries
#[derive(Debug, Clone)]
pub struct Sequencer {
    config: ClockConfig,
}

impl Sequencer {
    pub fn new(config: ClockConfig) -> std::result::Result<Self, ConfigError> {
        if config.ticks_per_beat == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        Ok(Sequencer { config })
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Tick offset of a beat offset, rounded down
    pub fn to_ticks(&self, beats: Fraction) -> std::result::Result<i64, ConfigError> {
        beats
            .checked_mul(Fraction::from_int(i64::from(self.config.ticks_per_beat)))
            .map(Fraction::floor)
            .ok_or(ConfigError::TickOverflow(beats))
    }

    /// Schedule a note-on and a note-off for every event
    ///
    /// Ticks are relative to the clock's current tick. Callbacks are queued
    /// event by event, so a note ending on the same tick another one starts
    /// is released first when `events` is sorted by start. Nothing is queued
    /// if any event starts before zero or lands beyond the tick range.
    ///
    /// Returns the number of callbacks scheduled, which is zero on a
    /// terminated clock.
    pub fn bind<S>(
        &self,
        clock: &mut Clock,
        events: &[PitchEvent],
        sink: &Rc<RefCell<S>>,
    ) -> Result<usize>
    where
        S: EventSink + 'static,
    {
        let resolution = Fraction::from_int(i64::from(self.config.ticks_per_beat));
        let mut ticks = Vec::with_capacity(events.len());
        for event in events {
            if event.start.is_negative() {
                return Err(ConfigError::NegativeStart(event.start).into());
            }
            let end = event
                .start
                .checked_add(event.duration)
                .ok_or(ConfigError::TickOverflow(event.start))?;
            let scaled = event
                .start
                .checked_mul(resolution)
                .ok_or(ConfigError::TickOverflow(event.start))?;
            let on = scaled.floor();
            if !scaled.is_integer() {
                trace!(start = %event.start, tick = on, "quantized note start");
            }
            let off = self.to_ticks(end)?.max(on);
            ticks.push((on, off));
        }

        if clock.state() == ClockState::Terminated {
            debug!(events = events.len(), "clock terminated, nothing bound");
            return Ok(0);
        }

        let mut scheduled = 0;
        for (event, (on, off)) in events.iter().zip(ticks) {
            let note = event.clone();
            let target = Rc::clone(sink);
            clock.schedule(on, move |clock| {
                let mut sink = target.borrow_mut();
                sink.note_on(clock.now(), &note)
            })?;

            let note = event.clone();
            let target = Rc::clone(sink);
            clock.schedule(off, move |clock| {
                let mut sink = target.borrow_mut();
                sink.note_off(clock.now(), &note)
            })?;

            scheduled += 2;
        }

        debug!(events = events.len(), callbacks = scheduled, "bound events to clock");
        Ok(scheduled)
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Sequencer {
            config: ClockConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClockError, RecordingSink, SinkMessage};

    fn run_to_end(clock: &mut Clock, ticks: u64) {
        clock.run(None);
        for _ in 0..ticks {
            clock.tick().unwrap();
        }
    }

    #[test]
    fn test_zero_resolution_is_refused() {
        assert_eq!(
            Sequencer::new(ClockConfig { ticks_per_beat: 0 }).unwrap_err(),
            ConfigError::ZeroResolution
        );
    }

    #[test]
    fn test_clock_config_defaults_from_empty_json() {
        let config: ClockConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.ticks_per_beat, 24);
    }

    #[test]
    fn test_to_ticks_rounds_down() {
        let sequencer = Sequencer::new(ClockConfig { ticks_per_beat: 4 }).unwrap();
        assert_eq!(sequencer.to_ticks(Fraction::new(3, 2)), Ok(6));
        assert_eq!(sequencer.to_ticks(Fraction::new(1, 3)), Ok(1));
        assert_eq!(sequencer.to_ticks(Fraction::ZERO), Ok(0));
    }

    #[test]
    fn test_far_events_are_refused_before_queueing() {
        let sequencer = Sequencer::default();
        let far = Fraction::from_int(i64::MAX / 2);
        assert_eq!(sequencer.to_ticks(far), Err(ConfigError::TickOverflow(far)));

        let events = vec![
            PitchEvent::new(60, Fraction::ZERO, Fraction::ONE),
            PitchEvent::new(62, far, Fraction::ONE),
        ];
        let sink = Rc::new(RefCell::new(RecordingSink::new()));
        let mut clock = Clock::new();
        match sequencer.bind(&mut clock, &events, &sink) {
            Err(ClockError::Config(ConfigError::TickOverflow(start))) => assert_eq!(start, far),
            other => panic!("Expected TickOverflow, got {:?}", other),
        }
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_bind_on_terminated_clock_reports_nothing_queued() {
        let sequencer = Sequencer::default();
        let events = [
            PitchEvent::new(60, Fraction::ZERO, Fraction::ONE),
            PitchEvent::new(64, Fraction::ONE, Fraction::ONE),
        ];
        let sink = Rc::new(RefCell::new(RecordingSink::new()));
        let mut clock = Clock::new();
        clock.terminate();

        assert_eq!(sequencer.bind(&mut clock, &events, &sink).unwrap(), 0);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_bind_delivers_on_and_off() {
        let sequencer = Sequencer::new(ClockConfig { ticks_per_beat: 2 }).unwrap();
        let events = vec![
            PitchEvent::new(60, Fraction::ZERO, Fraction::ONE),
            PitchEvent::new(62, Fraction::ONE, Fraction::new(1, 2)),
        ];
        let sink = Rc::new(RefCell::new(RecordingSink::new()));
        let mut clock = Clock::new();

        assert_eq!(sequencer.bind(&mut clock, &events, &sink).unwrap(), 4);
        run_to_end(&mut clock, 4);

        assert_eq!(
            sink.borrow().messages,
            vec![
                SinkMessage::NoteOn { tick: 0, pitch: 60, velocity: 96 },
                SinkMessage::NoteOff { tick: 2, pitch: 60 },
                SinkMessage::NoteOn { tick: 2, pitch: 62, velocity: 96 },
                SinkMessage::NoteOff { tick: 3, pitch: 62 },
            ]
        );
    }

    #[test]
    fn test_bind_is_relative_to_now() {
        let sequencer = Sequencer::new(ClockConfig { ticks_per_beat: 1 }).unwrap();
        let sink = Rc::new(RefCell::new(RecordingSink::new()));
        let mut clock = Clock::new();
        run_to_end(&mut clock, 5);

        let events = [PitchEvent::new(67, Fraction::ONE, Fraction::ONE)];
        sequencer.bind(&mut clock, &events, &sink).unwrap();
        for _ in 0..3 {
            clock.tick().unwrap();
        }

        let ticks: Vec<u64> = sink.borrow().messages.iter().map(|m| m.tick()).collect();
        assert_eq!(ticks, vec![6, 7]);
    }

    #[test]
    fn test_negative_start_binds_nothing() {
        let sequencer = Sequencer::default();
        let events = vec![
            PitchEvent::new(60, Fraction::ZERO, Fraction::ONE),
            PitchEvent::new(62, Fraction::new(-1, 2), Fraction::ONE),
        ];
        let sink = Rc::new(RefCell::new(RecordingSink::new()));
        let mut clock = Clock::new();

        match sequencer.bind(&mut clock, &events, &sink) {
            Err(ClockError::Config(ConfigError::NegativeStart(start))) => {
                assert_eq!(start, Fraction::new(-1, 2));
            }
            other => panic!("Expected NegativeStart, got {:?}", other),
        }
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_zero_length_event_still_releases() {
        let sequencer = Sequencer::default();
        let events = [PitchEvent::new(60, Fraction::ONE, Fraction::ZERO)];
        let sink = Rc::new(RefCell::new(RecordingSink::new()));
        let mut clock = Clock::new();
        sequencer.bind(&mut clock, &events, &sink).unwrap();
        run_to_end(&mut clock, 25);

        assert_eq!(
            sink.borrow().messages,
            vec![
                SinkMessage::NoteOn { tick: 24, pitch: 60, velocity: 96 },
                SinkMessage::NoteOff { tick: 24, pitch: 60 },
            ]
        );
    }

    #[test]
    fn test_failing_sink_surfaces_from_tick() {
        struct Unplugged;

        impl EventSink for Unplugged {
            fn note_on(&mut self, _tick: u64, _event: &PitchEvent) -> anyhow::Result<()> {
                anyhow::bail!("device unplugged")
            }

            fn note_off(&mut self, _tick: u64, _event: &PitchEvent) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let sequencer = Sequencer::default();
        let events = [PitchEvent::new(60, Fraction::ZERO, Fraction::ONE)];
        let sink = Rc::new(RefCell::new(Unplugged));
        let mut clock = Clock::new();
        sequencer.bind(&mut clock, &events, &sink).unwrap();
        clock.run(None);

        let err = clock.tick().unwrap_err();
        assert!(matches!(err, ClockError::Dispatch(_)));
        assert!(err.to_string().contains("device unplugged"));
        assert_eq!(clock.pending(), 1);
    }
}
