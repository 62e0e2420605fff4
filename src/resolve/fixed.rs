//! Fixed-position resolution: transpose a stored hand shape.

use super::{to_frets, Fret, StringResolution};
use crate::definitions::DefinitionTable;
use crate::error::Unplayed;
use crate::pitch::Note;
use crate::tuning::Tuning;

/// Root every stored hand shape is authored for.
pub const REFERENCE_ROOT: &str = "C";

/// Transpose the template for `position` (or the first template) from
/// `reference_root` to `root`.
///
/// The shift is the pitch-class distance `root - reference_root` in `-11..=11`,
/// so enharmonic roots (`C`, `B#`) give identical shapes. Frets that would land
/// below the nut become unplayed.
///
/// # Example
/// ```rust
/// use fretwise::{resolve_fixed_positions, DefinitionTable, Tuning};
///
/// let table = DefinitionTable::builtin();
/// let c: fretwise::Note = "C".parse().unwrap();
/// let d: fretwise::Note = "D".parse().unwrap();
/// let frets = resolve_fixed_positions(table, "major", &d, &Tuning::standard(), 2, &c);
/// assert_eq!(frets, vec![Some(5), Some(7), Some(7), Some(7), Some(5), Some(5)]);
/// ```
pub fn resolve_fixed_positions(
    table: &DefinitionTable,
    id: &str,
    root: &Note,
    tuning: &Tuning,
    position: u8,
    reference_root: &Note,
) -> Vec<Fret> {
    to_frets(&resolve_fixed_positions_detailed(
        table,
        id,
        root,
        tuning,
        position,
        reference_root,
    ))
}

/// Like [`resolve_fixed_positions`], reporting why each unplayed string is unplayed.
pub fn resolve_fixed_positions_detailed(
    table: &DefinitionTable,
    id: &str,
    root: &Note,
    tuning: &Tuning,
    position: u8,
    reference_root: &Note,
) -> Vec<StringResolution> {
    let Some(definition) = table.lookup_chord(id) else {
        log::warn!("fixed positions: unknown chord '{}'", id);
        return vec![Err(Unplayed::UnknownDefinition(id.to_string())); tuning.len()];
    };

    let Some(template) = definition.template_for_position(position) else {
        log::debug!("fixed positions: chord '{}' has no hand shapes", definition.id);
        return vec![Err(Unplayed::NoTemplates); tuning.len()];
    };

    let shift = root.pitch_class().value() as i32 - reference_root.pitch_class().value() as i32;
    log::debug!(
        "fixed positions: '{}' position {} shifted {} semitones for root {}",
        definition.id,
        template.position,
        shift,
        root
    );

    (0..tuning.len())
        .map(|string| match template.frets.get(string).copied().flatten() {
            None => Err(Unplayed::Muted),
            Some(fret) => {
                let shifted = fret as i32 + shift;
                if shifted < 0 {
                    Err(Unplayed::BelowNut { fret: shifted })
                } else {
                    Ok(shifted as u8)
                }
            }
        })
        .collect()
}
