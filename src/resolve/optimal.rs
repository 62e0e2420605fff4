//! Optimal-position resolution: nearest chord tone per string.

use super::{to_frets, Fret, StringResolution};
use crate::definitions::DefinitionTable;
use crate::error::Unplayed;
use crate::pitch::{Note, PitchClass, PitchClassSet};
use crate::tuning::Tuning;

/// Highest fret searched when none is given.
pub const DEFAULT_MAX_FRET: u8 = 15;

/// Frets per nominal neck position: position `p` sits around fret `p * 4`.
const FRETS_PER_POSITION: i32 = 4;

/// Resolve each string to its lowest fret that sounds a chord tone.
///
/// Open strings that already belong to the chord stay open. For `position > 1`
/// the shape is moved into the neck zone around fret `position * 4` when its mean
/// fret is more than 3 frets away from it.
///
/// # Example
/// ```rust
/// use fretwise::{resolve_optimal_positions, DefinitionTable, Tuning, DEFAULT_MAX_FRET};
///
/// let table = DefinitionTable::builtin();
/// let c: fretwise::Note = "C".parse().unwrap();
/// let frets = resolve_optimal_positions(table, "major", &c, &Tuning::standard(), 1, DEFAULT_MAX_FRET);
/// assert_eq!(frets, vec![Some(0), Some(3), Some(2), Some(0), Some(1), Some(0)]);
/// ```
pub fn resolve_optimal_positions(
    table: &DefinitionTable,
    id: &str,
    root: &Note,
    tuning: &Tuning,
    position: u8,
    max_fret: u8,
) -> Vec<Fret> {
    to_frets(&resolve_optimal_positions_detailed(
        table, id, root, tuning, position, max_fret,
    ))
}

/// Like [`resolve_optimal_positions`], reporting why each unplayed string is unplayed.
pub fn resolve_optimal_positions_detailed(
    table: &DefinitionTable,
    id: &str,
    root: &Note,
    tuning: &Tuning,
    position: u8,
    max_fret: u8,
) -> Vec<StringResolution> {
    let Some(definition) = table.lookup(id) else {
        log::warn!("optimal positions: unknown chord or scale '{}'", id);
        return vec![Err(Unplayed::UnknownDefinition(id.to_string())); tuning.len()];
    };

    let targets = definition.pitch_class_set(root);
    let frets: Vec<StringResolution> = tuning
        .strings()
        .iter()
        .map(|open| nearest_chord_tone(open, &targets, max_fret))
        .collect();

    if position <= 1 {
        return frets;
    }
    shift_to_position(tuning, frets, position)
}

fn nearest_chord_tone(open: &Note, targets: &PitchClassSet, max_fret: u8) -> StringResolution {
    let open_pc = open.pitch_class().value() as i32;
    (0..=max_fret)
        .find(|fret| targets.contains(PitchClass::from_semitones(open_pc + *fret as i32)))
        .ok_or(Unplayed::OutOfRange { max_fret })
}

/// Move fretted strings into the window `[position*4 - 2, position*4 + 6]`,
/// keeping each string's pitch class. Open and unplayed strings drop out.
fn shift_to_position(
    tuning: &Tuning,
    frets: Vec<StringResolution>,
    position: u8,
) -> Vec<StringResolution> {
    let fretted: Vec<i32> = frets
        .iter()
        .filter_map(|r| r.as_ref().ok().copied())
        .filter(|f| *f > 0)
        .map(i32::from)
        .collect();
    if fretted.is_empty() {
        return frets;
    }

    let mean = fretted.iter().sum::<i32>() as f64 / fretted.len() as f64;
    let target = position as i32 * FRETS_PER_POSITION;
    if (mean - target as f64).abs() <= 3.0 {
        return frets;
    }

    let low = (target - 2).max(0);
    let high = target + 6;
    log::debug!(
        "optimal positions: mean fret {:.1} too far from position {}, searching frets {}..={}",
        mean,
        position,
        low,
        high
    );

    tuning
        .strings()
        .iter()
        .zip(frets)
        .map(|(open, resolution)| match resolution {
            Ok(fret) if fret > 0 => {
                let open_pc = open.pitch_class().value() as i32;
                let wanted = PitchClass::from_semitones(open_pc + fret as i32);
                let moved = (low..=high)
                    .find(|f| PitchClass::from_semitones(open_pc + f) == wanted)
                    .and_then(|f| u8::try_from(f).ok())
                    .unwrap_or(fret);
                Ok(moved)
            }
            Ok(_) => Err(Unplayed::OpenString { position }),
            Err(reason) => Err(reason),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note(s: &str) -> Note {
        s.parse().unwrap()
    }

    fn optimal(id: &str, root: &str, position: u8) -> Vec<StringResolution> {
        resolve_optimal_positions_detailed(
            DefinitionTable::builtin(),
            id,
            &note(root),
            &Tuning::standard(),
            position,
            DEFAULT_MAX_FRET,
        )
    }

    #[test]
    fn test_c_major_first_position() {
        // E2 -> E (0), A2 -> C (3), D3 -> E (2), G3 -> G (0), B3 -> C (1), E4 -> E (0)
        assert_eq!(
            optimal("major", "C", 1),
            vec![Ok(0), Ok(3), Ok(2), Ok(0), Ok(1), Ok(0)]
        );
    }

    #[test]
    fn test_open_strings_short_circuit() {
        let table = DefinitionTable::builtin();
        let tuning = Tuning::standard();
        for chord in table.chords() {
            let root = note("G");
            let targets = chord.pitch_class_set(&root);
            let frets = resolve_optimal_positions(table, &chord.id, &root, &tuning, 1, 15);
            for (open, fret) in tuning.strings().iter().zip(&frets) {
                if targets.contains(open.pitch_class()) {
                    assert_eq!(*fret, Some(0), "{} on {}", chord.id, open);
                } else {
                    assert_ne!(*fret, Some(0), "{} on {}", chord.id, open);
                }
            }
        }
    }

    #[test]
    fn test_lowest_fret_wins() {
        // F# minor: F# A C#; the low E string first reaches F# at fret 2
        assert_eq!(optimal("minor", "F#", 1)[0], Ok(2));
    }

    #[test]
    fn test_out_of_range() {
        let resolutions = resolve_optimal_positions_detailed(
            DefinitionTable::builtin(),
            "major",
            &note("F"),
            &Tuning::standard(),
            1,
            0,
        );
        // only open strings sounding F, A or C survive with max_fret 0
        assert_eq!(resolutions[1], Ok(0));
        assert_eq!(resolutions[0], Err(Unplayed::OutOfRange { max_fret: 0 }));
    }

    #[test]
    fn test_unknown_definition() {
        let resolutions = optimal("blorp", "C", 1);
        assert!(resolutions
            .iter()
            .all(|r| *r == Err(Unplayed::UnknownDefinition("blorp".to_string()))));
    }

    #[test]
    fn test_scales_resolve_without_templates() {
        let resolutions = optimal("dorian", "D", 1);
        // every string of standard tuning is a D dorian tone when open
        assert_eq!(resolutions, vec![Ok(0); 6]);
    }

    #[test]
    fn test_position_shift_moves_up_the_neck() {
        // position 2 targets fret 8: C major frets 3, 2, 1 have mean 2.
        // The window is 6..=14, where the A string has no C and keeps fret 3.
        let resolutions = optimal("major", "C", 2);
        assert_eq!(
            resolutions,
            vec![
                Err(Unplayed::OpenString { position: 2 }),
                Ok(3),
                Ok(14),
                Err(Unplayed::OpenString { position: 2 }),
                Ok(13),
                Err(Unplayed::OpenString { position: 2 }),
            ]
        );
    }

    #[test]
    fn test_position_shift_keeps_pitch_classes() {
        let table = DefinitionTable::builtin();
        let tuning = Tuning::standard();
        let root = note("A");
        let base = resolve_optimal_positions(table, "7", &root, &tuning, 1, 15);
        let moved = resolve_optimal_positions(table, "7", &root, &tuning, 3, 15);
        for ((open, before), after) in tuning.strings().iter().zip(&base).zip(&moved) {
            if let (Some(b), Some(a)) = (before, after) {
                assert_eq!(
                    PitchClass::from_semitones(open.midi_or_default() + *b as i32),
                    PitchClass::from_semitones(open.midi_or_default() + *a as i32)
                );
            }
        }
    }

    #[test]
    fn test_position_close_enough_is_unchanged() {
        // C# -> G at fret 6; position 2 targets fret 8, within 3 frets
        let table = DefinitionTable::builtin();
        let tuning = Tuning::parse("C#3").unwrap();
        let frets = resolve_optimal_positions(table, "5", &note("C"), &tuning, 2, 15);
        assert_eq!(frets, vec![Some(6)]);
    }

    #[test]
    fn test_position_past_the_fret_range_keeps_frets() {
        // position 70 targets fret 280, which no string can reach
        let open: StringResolution = Err(Unplayed::OpenString { position: 70 });
        assert_eq!(
            optimal("major", "C", 70),
            vec![open.clone(), Ok(3), Ok(2), open.clone(), Ok(1), open]
        );
    }

    #[test]
    fn test_never_negative() {
        let table = DefinitionTable::builtin();
        for position in 1..=5 {
            for chord in table.chords() {
                let resolutions = resolve_optimal_positions_detailed(
                    table,
                    &chord.id,
                    &note("Bb"),
                    &Tuning::standard(),
                    position,
                    15,
                );
                assert_eq!(resolutions.len(), 6);
            }
        }
    }
}
