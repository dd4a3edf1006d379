use crate::span::Span;
use neuma_core::{Articulation, Fraction, NoteName};
use serde::{Deserialize, Serialize};

/// Abstract Syntax Tree for neumalang
///
/// Every duration stored here is a multiple of the beat the node inherits
/// from its parent, never an absolute time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Sequence(Sequence),
    Group(Group),
    Parallel(Parallel),
    Note(Note),
    Rest(Rest),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Sequence(node) => node.span,
            Node::Group(node) => node.span,
            Node::Parallel(node) => node.span,
            Node::Note(node) => node.span,
            Node::Rest(node) => node.span,
        }
    }

    /// Nominal length in beats when decoded with a beat of one
    ///
    /// Inside a group this is the weight a child claims. `None` when the sum
    /// does not fit a [`Fraction`].
    pub fn length(&self) -> Option<Fraction> {
        match self {
            Node::Sequence(node) => node.length(),
            Node::Group(node) => Some(node.factor),
            Node::Parallel(node) => node.length(),
            Node::Note(node) => Some(node.duration),
            Node::Rest(node) => Some(node.duration),
        }
    }
}

/// Elements played one after another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub elements: Vec<Node>,
    pub span: Span,
}

impl Sequence {
    pub fn new(elements: Vec<Node>, span: Span) -> Self {
        Sequence { elements, span }
    }

    pub fn length(&self) -> Option<Fraction> {
        sum_lengths(&self.elements)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// `( ... )`: children share `factor` beats, split by their own lengths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub elements: Vec<Node>,
    pub factor: Fraction,
    pub span: Span,
}

impl Group {
    pub fn new(elements: Vec<Node>, span: Span) -> Self {
        Group {
            elements,
            factor: Fraction::ONE,
            span,
        }
    }

    /// Sum of the children's weights
    pub fn total_weight(&self) -> Option<Fraction> {
        sum_lengths(&self.elements)
    }
}

fn sum_lengths(nodes: &[Node]) -> Option<Fraction> {
    nodes
        .iter()
        .try_fold(Fraction::ZERO, |acc, node| acc.checked_add(node.length()?))
}

/// `[a, b]`: voices that all start together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parallel {
    pub voices: Vec<Sequence>,
    /// Scales the beat every voice inherits
    pub factor: Fraction,
    pub span: Span,
}

impl Parallel {
    pub fn new(voices: Vec<Sequence>, span: Span) -> Self {
        Parallel {
            voices,
            factor: Fraction::ONE,
            span,
        }
    }

    pub fn length(&self) -> Option<Fraction> {
        let mut longest = Fraction::ZERO;
        for voice in &self.voices {
            longest = longest.max(voice.length()?);
        }
        self.factor.checked_mul(longest)
    }
}

/// What a note names: a scale degree or a letter name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PitchToken {
    /// Zero-based scale degree; negative degrees count down from the root
    Degree(i64),
    Name(NoteName),
}

impl std::fmt::Display for PitchToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PitchToken::Degree(d) => write!(f, "{}", d),
            PitchToken::Name(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: PitchToken,
    pub duration: Fraction,
    /// Net `^`/`_` count
    pub octave_shift: i32,
    pub articulations: Vec<Articulation>,
    pub span: Span,
}

impl Note {
    pub fn new(pitch: PitchToken, span: Span) -> Self {
        Note {
            pitch,
            duration: Fraction::ONE,
            octave_shift: 0,
            articulations: Vec::new(),
            span,
        }
    }

    pub fn with_duration(mut self, duration: Fraction) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_accented(&self) -> bool {
        self.articulations.contains(&Articulation::Accent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rest {
    pub duration: Fraction,
    pub span: Span,
}

impl Rest {
    pub fn new(span: Span) -> Self {
        Rest {
            duration: Fraction::ONE,
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(degree: i64, duration: Fraction) -> Node {
        Node::Note(Note::new(PitchToken::Degree(degree), Span::default()).with_duration(duration))
    }

    #[test]
    fn test_sequence_length() {
        let seq = Sequence::new(
            vec![note(0, Fraction::ONE), note(1, Fraction::new(1, 2))],
            Span::default(),
        );
        assert_eq!(seq.length(), Some(Fraction::new(3, 2)));
    }

    #[test]
    fn test_group_length_is_its_factor() {
        let mut group = Group::new(
            vec![note(0, Fraction::ONE), note(1, Fraction::ONE)],
            Span::default(),
        );
        group.factor = Fraction::from_int(3);
        assert_eq!(group.total_weight(), Some(Fraction::from_int(2)));
        assert_eq!(Node::Group(group).length(), Some(Fraction::from_int(3)));
    }

    #[test]
    fn test_parallel_length_is_longest_voice() {
        let short = Sequence::new(vec![note(0, Fraction::ONE)], Span::default());
        let long = Sequence::new(
            vec![note(0, Fraction::ONE), note(2, Fraction::ONE)],
            Span::default(),
        );
        let mut parallel = Parallel::new(vec![short, long], Span::default());
        assert_eq!(parallel.length(), Some(Fraction::from_int(2)));
        parallel.factor = Fraction::new(1, 2);
        assert_eq!(parallel.length(), Some(Fraction::ONE));
    }

    #[test]
    fn test_length_reports_overflow() {
        let huge = Fraction::from_int(i64::MAX);
        let seq = Sequence::new(vec![note(0, huge), note(1, huge)], Span::default());
        assert_eq!(seq.length(), None);

        let group = Group::new(vec![note(0, huge), note(1, Fraction::ONE)], Span::default());
        assert_eq!(group.total_weight(), None);
    }

    #[test]
    fn test_tree_survives_json() {
        let seq = crate::parser::parse("(0 F#3@2^!) [1, ~/2]").unwrap();
        let json = serde_json::to_string(&seq).unwrap();
        let back: Sequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seq);
    }
}
