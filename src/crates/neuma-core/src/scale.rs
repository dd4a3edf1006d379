//! Scales: an interval structure that maps scale degrees to absolute pitches

use crate::error::{ConfigError, Result};
use crate::pitch::{octave_of, Pitch};
use serde::Serialize;
use tracing::debug;

/// An immutable scale built from a root pitch and ordered interval steps
///
/// Degrees are zero-based and wrap: on an `n`-step scale degree `n` is the
/// root one span higher, degree `-1` is the last step one span lower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scale {
    root: Pitch,
    intervals: Vec<u32>,
    mode: String,
    /// Offset of each degree from the root within one span
    #[serde(skip)]
    offsets: Vec<Pitch>,
    #[serde(skip)]
    span: Pitch,
}

impl Scale {
    /// Build a scale from its root, its steps in semitones and a mode label
    pub fn new(root: Pitch, intervals: Vec<u32>, mode: impl Into<String>) -> Result<Self> {
        if intervals.is_empty() {
            return Err(ConfigError::EmptyIntervals);
        }
        if let Some(index) = intervals.iter().position(|&step| step == 0) {
            return Err(ConfigError::ZeroInterval { index });
        }

        let mut offsets = Vec::with_capacity(intervals.len());
        let mut acc: Pitch = 0;
        for &step in &intervals {
            offsets.push(acc);
            acc += Pitch::from(step);
        }

        let mode = mode.into();
        debug!(root, ?intervals, %mode, span = acc, "built scale");

        Ok(Scale {
            root,
            intervals,
            mode,
            offsets,
            span: acc,
        })
    }

    /// Build one of the common modes by name, e.g. `Scale::named(60, "dorian")`
    pub fn named(root: Pitch, mode: &str) -> Result<Self> {
        let label = mode.to_lowercase();
        let degrees =
            mode_degrees(&label).ok_or_else(|| ConfigError::UnknownMode(mode.to_string()))?;

        let mut steps: Vec<u32> = degrees.windows(2).map(|w| w[1] - w[0]).collect();
        steps.push(12 - degrees[degrees.len() - 1]);
        Scale::new(root, steps, label)
    }

    pub fn root(&self) -> Pitch {
        self.root
    }

    pub fn intervals(&self) -> &[u32] {
        &self.intervals
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Number of steps before the scale repeats
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Always false: a scale has at least one step
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Sum of all steps, the distance one wrap adds
    pub fn span(&self) -> Pitch {
        self.span
    }

    /// Octave the root sits in (root 60 is octave 4)
    pub fn root_octave(&self) -> i32 {
        octave_of(self.root)
    }

    /// Resolve a degree in a given octave to an absolute pitch
    ///
    /// Total for every integer degree: the degree is wrapped modulo the step
    /// count and the quotient is applied as whole spans. Results beyond the
    /// `Pitch` range saturate; [`Scale::checked_resolve`] reports them instead.
    pub fn resolve(&self, degree: i64, octave: i32) -> Pitch {
        let wide = self.wide_resolve(degree, octave);
        wide.clamp(i128::from(Pitch::MIN), i128::from(Pitch::MAX)) as Pitch
    }

    /// Like [`Scale::resolve`], but `None` when the pitch leaves the `Pitch` range
    pub fn checked_resolve(&self, degree: i64, octave: i32) -> Option<Pitch> {
        Pitch::try_from(self.wide_resolve(degree, octave)).ok()
    }

    // Span and shift are both below 2^64, so the product fits in i128
    fn wide_resolve(&self, degree: i64, octave: i32) -> i128 {
        let (wraps, offset) = self.split(degree);
        let shift = i128::from(octave) - i128::from(self.root_octave()) + i128::from(wraps);
        i128::from(self.root) + i128::from(self.span) * shift + i128::from(offset)
    }

    /// Whole wraps and in-span offset of a degree
    fn split(&self, degree: i64) -> (i64, Pitch) {
        let n = self.offsets.len() as i64;
        let index = degree.rem_euclid(n) as usize;
        (degree.div_euclid(n), self.offsets[index])
    }

    /// Place an absolute pitch on the scale
    ///
    /// Returns the degree (relative to the root octave) at or below the pitch
    /// and the chromatic remainder above it, so that
    /// `resolve(degree, root_octave()) + remainder == pitch`.
    pub fn locate(&self, pitch: Pitch) -> (i64, Pitch) {
        let rel = pitch.saturating_sub(self.root);
        let wraps = rel.div_euclid(self.span);
        let within = rel.rem_euclid(self.span);

        let index = self
            .offsets
            .iter()
            .rposition(|&offset| offset <= within)
            .unwrap_or(0);

        let degree = wraps * self.offsets.len() as i64 + index as i64;
        (degree, within - self.offsets[index])
    }
}

/// Scale definitions as semitone offsets from the root
fn mode_degrees(mode: &str) -> Option<&'static [u32]> {
    match mode {
        "major" | "ionian" => Some(&[0, 2, 4, 5, 7, 9, 11]),
        "minor" | "aeolian" => Some(&[0, 2, 3, 5, 7, 8, 10]),
        "dorian" => Some(&[0, 2, 3, 5, 7, 9, 10]),
        "phrygian" => Some(&[0, 1, 3, 5, 7, 8, 10]),
        "lydian" => Some(&[0, 2, 4, 6, 7, 9, 11]),
        "mixolydian" => Some(&[0, 2, 4, 5, 7, 9, 10]),
        "locrian" => Some(&[0, 1, 3, 5, 6, 8, 10]),
        "pentatonic" | "pentatonic_major" => Some(&[0, 2, 4, 7, 9]),
        "pentatonic_minor" => Some(&[0, 3, 5, 7, 10]),
        "blues" => Some(&[0, 3, 5, 6, 7, 10]),
        "chromatic" => Some(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
        "wholetone" => Some(&[0, 2, 4, 6, 8, 10]),
        "harmonic_minor" => Some(&[0, 2, 3, 5, 7, 8, 11]),
        "melodic_minor" => Some(&[0, 2, 3, 5, 7, 9, 11]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c_major() -> Scale {
        Scale::new(60, vec![2, 2, 1, 2, 2, 2, 1], "major").unwrap()
    }

    #[test]
    fn test_empty_intervals_rejected() {
        assert_eq!(Scale::new(60, vec![], "none"), Err(ConfigError::EmptyIntervals));
    }

    #[test]
    fn test_zero_step_rejected() {
        assert_eq!(
            Scale::new(60, vec![2, 0, 3], "odd"),
            Err(ConfigError::ZeroInterval { index: 1 })
        );
    }

    #[test]
    fn test_resolve_major() {
        let scale = c_major();
        let pitches: Vec<Pitch> = (0..8).map(|d| scale.resolve(d, 4)).collect();
        assert_eq!(pitches, vec![60, 62, 64, 65, 67, 69, 71, 72]);
        assert_eq!(scale.resolve(-1, 4), 59);
        assert_eq!(scale.resolve(0, 5), 72);
        assert_eq!(scale.resolve(2, 3), 52);
    }

    #[test]
    fn test_degree_past_the_end_wraps_up_an_octave() {
        let scale = c_major();
        assert_eq!(scale.resolve(8, 4), scale.resolve(1, 5));
    }

    #[test]
    fn test_named_matches_explicit_steps() {
        assert_eq!(Scale::named(60, "Major").unwrap(), c_major());
        let blues = Scale::named(57, "blues").unwrap();
        assert_eq!(blues.intervals(), &[3, 2, 1, 1, 3, 2]);
        assert_eq!(blues.span(), 12);
    }

    #[test]
    fn test_unknown_mode() {
        assert_eq!(
            Scale::named(60, "klingon"),
            Err(ConfigError::UnknownMode("klingon".into()))
        );
    }

    #[test]
    fn test_non_octave_span() {
        // Bohlen-Pierce style steps: the span is 13, not 12
        let scale = Scale::new(60, vec![2, 1, 2, 1, 2, 1, 2, 1, 1], "bp").unwrap();
        assert_eq!(scale.span(), 13);
        assert_eq!(scale.resolve(9, 4), 73);
    }

    #[test]
    fn test_locate_in_and_out_of_scale() {
        let scale = c_major();
        assert_eq!(scale.locate(64), (2, 0));
        assert_eq!(scale.locate(66), (3, 1)); // F# sits a semitone above F
        assert_eq!(scale.locate(59), (-1, 0));
        assert_eq!(scale.locate(48), (-7, 0));
    }

    #[test]
    fn test_extreme_degrees_do_not_panic() {
        let scale = c_major();
        assert_eq!(scale.checked_resolve(9_000_000_000_000_000_000, 4), None);
        assert_eq!(scale.checked_resolve(i64::MIN, 4), None);
        assert_eq!(scale.resolve(9_000_000_000_000_000_000, 4), Pitch::MAX);
        assert_eq!(scale.resolve(i64::MIN, i32::MIN), Pitch::MIN);
        assert_eq!(scale.checked_resolve(9, 4), Some(scale.resolve(9, 4)));
    }

    proptest! {
        #[test]
        fn prop_octave_wrap(
            steps in prop::collection::vec(1u32..13, 1..12),
            root in 0i64..128,
            degree in -200i64..200,
            octave in -4i32..10,
        ) {
            let scale = Scale::new(root, steps, "any").unwrap();
            let n = scale.len() as i64;
            prop_assert_eq!(
                scale.resolve(degree + n, octave) - scale.resolve(degree, octave),
                scale.span()
            );
        }

        #[test]
        fn prop_locate_inverts_resolve(
            steps in prop::collection::vec(1u32..13, 1..12),
            root in 0i64..128,
            pitch in -100i64..300,
        ) {
            let scale = Scale::new(root, steps, "any").unwrap();
            let (degree, remainder) = scale.locate(pitch);
            prop_assert!(remainder >= 0);
            prop_assert_eq!(scale.resolve(degree, scale.root_octave()) + remainder, pitch);
        }
    }
}
