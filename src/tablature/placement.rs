//! Placing notes and progressions on the grid.

use serde::Serialize;

use super::state::TablatureState;
use super::types::{Cell, ProgressionItem};
use crate::pitch::Note;
use crate::tuning::Tuning;

/// Frets that count as open position when placing a note.
const OPEN_POSITION_MAX_FRET: u8 = 5;

/// A string and fret on which a note can be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FretPosition {
    pub string: usize,
    pub fret: u8,
}

/// Find where to play `note` on `tuning`, skipping the strings in `taken`.
///
/// Every string is scanned upward from the nut, stopping at its first match in
/// open position (frets 0 to 5). Across all strings the match closest in pitch
/// to the note wins, the lower fret breaking ties. A note without an octave is
/// taken to be in octave 4. Unparseable notes give `None`.
///
/// # Example
/// ```rust
/// use fretwise::{find_best_position, FretPosition, Tuning};
///
/// let tuning = Tuning::standard();
/// assert_eq!(
///     find_best_position("E4", &tuning, &[], 24),
///     Some(FretPosition { string: 5, fret: 0 })
/// );
/// // C4 sounds at fret 1 of the B string
/// assert_eq!(
///     find_best_position("C4", &tuning, &[], 24),
///     Some(FretPosition { string: 4, fret: 1 })
/// );
/// assert_eq!(find_best_position("H4", &tuning, &[], 24), None);
/// ```
pub fn find_best_position(
    note: &str,
    tuning: &Tuning,
    taken: &[usize],
    max_fret: u8,
) -> Option<FretPosition> {
    let target = match note.trim().parse::<Note>() {
        Ok(n) => n.midi_or_default(),
        Err(e) => {
            log::warn!("cannot place note: {}", e);
            return None;
        }
    };
    let target_pc = target.rem_euclid(12);

    let mut best: Option<(i32, FretPosition)> = None;
    for (string, open) in tuning.strings().iter().enumerate() {
        if taken.contains(&string) {
            continue;
        }
        let open_midi = open.midi_or_default();
        for fret in 0..=max_fret {
            let midi = open_midi + fret as i32;
            if midi.rem_euclid(12) != target_pc {
                continue;
            }
            let distance = (midi - target).abs();
            let closer = best.map_or(true, |(d, p)| (distance, fret) < (d, p.fret));
            if closer {
                best = Some((distance, FretPosition { string, fret }));
            }
            if fret <= OPEN_POSITION_MAX_FRET {
                break;
            }
        }
    }
    best.map(|(_, position)| position)
}

impl TablatureState {
    /// [`find_best_position`] over every string of this grid's tuning.
    pub fn find_best_position(&self, note: &str) -> Option<FretPosition> {
        find_best_position(note, &self.tuning, &[], self.search_max_fret)
    }

    /// Write `notes` into `column` of the current measure, one note per string.
    ///
    /// Notes beyond the string count are dropped, as are notes that find no free
    /// string.
    pub fn place_notes_in_column<S: AsRef<str>>(&mut self, notes: &[S], column: usize) {
        if column >= self.columns {
            return;
        }
        let mut taken = Vec::with_capacity(self.tuning.len());
        for note in notes.iter().take(self.tuning.len()) {
            let note = note.as_ref();
            match find_best_position(note, &self.tuning, &taken, self.search_max_fret) {
                Some(position) => {
                    taken.push(position.string);
                    self.update_cell_value(position.string, column, Cell::Fret(position.fret));
                }
                None => log::debug!("no free string for {} in column {}", note, column),
            }
        }
    }

    /// Drop a progression onto the current measure, one item per column from
    /// `start_column`. Items past the end of the bar are skipped.
    ///
    /// When any item is a chord the whole progression is treated as chords: each
    /// chord's mode (if any) overrides its own column and its notes are stacked in
    /// that column. Otherwise each item is a single note. The selection is left as
    /// it was.
    pub fn drop_progression_at(&mut self, items: &[ProgressionItem], start_column: usize) {
        if items.is_empty() {
            log::warn!("empty progression dropped at column {}", start_column);
            return;
        }
        let chords = items.iter().any(ProgressionItem::is_chord);

        for (offset, item) in items.iter().enumerate() {
            let column = start_column + offset;
            if column >= self.columns {
                break;
            }
            if chords {
                if let Some(mode) = item.mode() {
                    self.override_columns(&[column], mode);
                }
                self.place_notes_in_column(item.chord_notes(), column);
            } else if let Some(name) = item.note_name() {
                self.place_notes_in_column(&[name], column);
            }
        }
    }
}
