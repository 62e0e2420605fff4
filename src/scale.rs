//! Scale and mode helpers for fretboard display.
//!
//! These answer the questions a fretboard view asks per cell: which note sounds
//! here, is it in the active scale, and which degree is it.

use crate::definitions::DefinitionTable;
use crate::pitch::{Note, PitchClass, PitchClassSet};

/// Notes of a chord or scale built on `root`; empty when the id is unknown.
pub fn scale_notes(table: &DefinitionTable, id: &str, root: &Note) -> Vec<Note> {
    match table.lookup_scale(id).or_else(|| table.lookup_chord(id)) {
        Some(definition) => definition.notes(root),
        None => {
            log::warn!("unknown scale or chord '{}'", id);
            Vec::new()
        }
    }
}

/// 1-based degree of `note` within `collection`, matching by pitch class.
pub fn scale_degree(note: &Note, collection: &[Note]) -> Option<usize> {
    let target = note.pitch_class();
    collection
        .iter()
        .position(|n| n.pitch_class() == target)
        .map(|index| index + 1)
}

pub fn is_in_scale(note: &Note, collection: &[Note]) -> bool {
    scale_degree(note, collection).is_some()
}

pub fn pitch_classes(collection: &[Note]) -> PitchClassSet {
    collection.iter().map(Note::pitch_class).collect()
}

/// Scale notes followed by the chord tones whose pitch class the scale lacks.
pub fn joined_notes(scale: &[Note], chord: &[Note]) -> Vec<Note> {
    let mut joined = scale.to_vec();
    let mut seen: Vec<PitchClass> = scale.iter().map(Note::pitch_class).collect();
    for note in chord {
        let pc = note.pitch_class();
        if !seen.contains(&pc) {
            seen.push(pc);
            joined.push(*note);
        }
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::note_at;

    fn notes(names: &[&str]) -> Vec<Note> {
        names.iter().map(|n| n.parse().unwrap()).collect()
    }

    #[test]
    fn test_scale_notes() {
        let table = DefinitionTable::builtin();
        let d_dorian = scale_notes(table, "dorian", &"D".parse().unwrap());
        let names: Vec<String> = d_dorian.iter().map(Note::to_string).collect();
        assert_eq!(names, vec!["D", "E", "F", "G", "A", "B", "C"]);

        assert!(scale_notes(table, "no-such-scale", &"C".parse().unwrap()).is_empty());
    }

    #[test]
    fn test_degree_ignores_octave_and_spelling() {
        let c_major = notes(&["C", "D", "E", "F", "G", "A", "B"]);
        assert_eq!(scale_degree(&"E4".parse().unwrap(), &c_major), Some(3));
        assert_eq!(scale_degree(&"B#2".parse().unwrap(), &c_major), Some(1));
        assert_eq!(scale_degree(&"F#".parse().unwrap(), &c_major), None);
        assert!(!is_in_scale(&"Eb".parse().unwrap(), &c_major));
    }

    #[test]
    fn test_fretboard_lookup() {
        let c_major = notes(&["C", "D", "E", "F", "G", "A", "B"]);
        let low_e: Note = "E2".parse().unwrap();
        // fret 1 on the low E string is F
        assert_eq!(scale_degree(&note_at(&low_e, 1), &c_major), Some(4));
        assert!(!is_in_scale(&note_at(&low_e, 2), &c_major));
        assert_eq!(pitch_classes(&c_major).len(), 7);
    }

    #[test]
    fn test_joined_notes() {
        let scale = notes(&["C", "D", "E", "G", "A"]);
        let chord = notes(&["F", "A", "C", "Eb"]);
        let joined: Vec<String> = joined_notes(&scale, &chord).iter().map(Note::to_string).collect();
        assert_eq!(joined, vec!["C", "D", "E", "G", "A", "F", "Eb"]);
    }
}
