// Formatter: Convert AST back to neumalang
use crate::ast::*;
use neuma_core::Fraction;

/// Format a root sequence as canonical neumalang
pub fn format(seq: &Sequence) -> String {
    format_elements(&seq.elements)
}

/// Format a single node
pub fn format_node(node: &Node) -> String {
    match node {
        Node::Sequence(seq) => format_elements(&seq.elements),
        Node::Group(group) => {
            format!("({}){}", format_elements(&group.elements), format_duration(group.factor))
        }
        Node::Parallel(parallel) => {
            let voices: Vec<String> = parallel
                .voices
                .iter()
                .map(|voice| format_elements(&voice.elements))
                .collect();
            format!("[{}]{}", voices.join(", "), format_duration(parallel.factor))
        }
        Node::Note(note) => format_note(note),
        Node::Rest(rest) => format!("~{}", format_duration(rest.duration)),
    }
}

fn format_elements(elements: &[Node]) -> String {
    let parts: Vec<String> = elements.iter().map(format_node).collect();
    parts.join(" ")
}

fn format_note(note: &Note) -> String {
    let mut result = note.pitch.to_string();
    result.push_str(&format_duration(note.duration));

    let shift = if note.octave_shift >= 0 { '^' } else { '_' };
    for _ in 0..note.octave_shift.unsigned_abs() {
        result.push(shift);
    }

    for articulation in &note.articulations {
        if let Some(symbol) = articulation.symbol() {
            result.push(symbol);
        }
    }
    result
}

/// Shortest duration mark for a multiplier; unit durations need none
fn format_duration(duration: Fraction) -> String {
    if duration == Fraction::ONE {
        String::new()
    } else if duration.numerator == 1 {
        format!("/{}", duration.denominator)
    } else if duration.is_integer() {
        format!("@{}", duration.numerator)
    } else {
        format!("@{}/{}", duration.numerator, duration.denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;
    use crate::parser::parse;
    use neuma_core::Scale;

    fn reformat(source: &str) -> String {
        format(&parse(source).unwrap())
    }

    #[test]
    fn test_format_normalizes_spacing() {
        assert_eq!(reformat("  C   D\nE "), "C D E");
    }

    #[test]
    fn test_format_durations() {
        assert_eq!(reformat("C@2 D/2 E@0.75 F. ~@1"), "C@2 D/2 E@3/4 F@3/2 ~");
    }

    #[test]
    fn test_format_modifiers() {
        assert_eq!(reformat("F#3^^!' 2__="), "F#3^^!' 2__=");
    }

    #[test]
    fn test_format_structure() {
        assert_eq!(reformat("(C D)@3 [E,G ,  B/2]/2"), "(C D)@3 [E, G, B/2]/2");
    }

    #[test]
    fn test_formatted_text_decodes_identically() {
        let scale = Scale::named(60, "minor").unwrap();
        let source = "(0 2@2 [4, 6.]) ~/3 Eb_!  (1 (2 3)/2)@5/4";
        let original = parse(source).unwrap();
        let reparsed = parse(&format(&original)).unwrap();
        assert_eq!(
            decode(&original, &scale, Fraction::ZERO).unwrap(),
            decode(&reparsed, &scale, Fraction::ZERO).unwrap()
        );
    }
}
