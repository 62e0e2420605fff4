pub mod config;
pub mod definitions;
pub mod error;
pub mod pitch;
pub mod resolve;
pub mod scale;
pub mod tablature;
pub mod tuning;
pub mod voicing;

pub use config::Settings;
pub use definitions::{Definition, DefinitionKind, DefinitionTable, HandShapeTemplate};
pub use error::*;
pub use pitch::{midi_to_frequency, note_at, Interval, Note, NoteName, PitchClass, PitchClassSet};
pub use resolve::{
    format_frets, resolve_fixed_positions, resolve_fixed_positions_detailed,
    resolve_optimal_positions, resolve_optimal_positions_detailed, Fret, StringResolution,
    DEFAULT_MAX_FRET, REFERENCE_ROOT,
};
pub use tablature::{
    find_best_position, Cell, ColumnOverride, FretPosition, NoteEvent, ProgressionItem,
    TabMeasure, TablatureState,
};
pub use tuning::Tuning;
pub use voicing::{search_voicings, ResolvedVoicing};

/// Resolve a chord's stored hand shape for `root` with the built-in catalog.
/// This is the main entry point for chord charts.
pub fn chord_frets(
    id: &str,
    root: &str,
    position: u8,
    settings: &Settings,
) -> Result<Vec<Fret>, FretError> {
    let root: Note = root.parse()?;
    Ok(resolve_fixed_positions(
        DefinitionTable::builtin(),
        id,
        &root,
        &settings.tuning,
        position,
        &settings.reference_root,
    ))
}

/// Nearest chord tones per string, moved toward `position` up the neck.
pub fn optimal_frets(
    id: &str,
    root: &str,
    position: u8,
    settings: &Settings,
) -> Result<Vec<Fret>, FretError> {
    let root: Note = root.parse()?;
    Ok(resolve_optimal_positions(
        DefinitionTable::builtin(),
        id,
        &root,
        &settings.tuning,
        position,
        settings.max_fret,
    ))
}

/// Ranked voicings for a chord name and root (e.g., "min7", "A")
pub fn voicings(id: &str, root: &str, settings: &Settings) -> Result<Vec<ResolvedVoicing>, FretError> {
    let root: Note = root.parse()?;
    Ok(search_voicings(
        DefinitionTable::builtin(),
        id,
        &root,
        &settings.tuning,
    ))
}
