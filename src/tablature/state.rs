//! Grid state: measures, selection, mode overrides, playback cursor and settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::{Cell, CellRef, ColumnOverride, FretOption, NoteEvent, TabMeasure};
use crate::config::Settings;
use crate::error::FretError;
use crate::pitch::{midi_to_frequency, PitchClass, PitchClassSet};
use crate::tuning::Tuning;

/// Grid columns played per beat.
pub const COLUMNS_PER_BEAT: u32 = 4;

/// Highest fret listed by [`TablatureState::available_frets`].
const PICKER_MAX_FRET: u8 = 24;
/// Highest fret offered with hammer-on, pull-off and slide variants.
const PICKER_MAX_TECHNIQUE_FRET: u8 = 12;

/// Selected columns of the current measure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
    pub columns: Vec<usize>,
}

/// The tablature editor's state.
///
/// Always holds at least one measure and a valid current measure. Mutators that
/// receive an out-of-range index leave the state untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablatureState {
    pub(super) measures: Vec<TabMeasure>,
    pub(super) current_measure: usize,
    pub(super) columns: usize,
    pub(super) tuning: Tuning,
    pub(super) search_max_fret: u8,
    pub(super) selection: Selection,
    editing_cell: Option<CellRef>,
    playing_column: Option<usize>,
    playing: bool,
    tempo: u32,
    metronome_enabled: bool,
    filter_by_scale_enabled: bool,
}

impl Default for TablatureState {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl TablatureState {
    /// A grid with one empty measure.
    ///
    /// # Example
    /// ```rust
    /// use fretwise::{Settings, TablatureState};
    ///
    /// let tab = TablatureState::new(&Settings::default());
    /// assert_eq!(tab.measures().len(), 1);
    /// assert_eq!(tab.columns(), 32);
    /// assert_eq!(tab.current_measure_data().rows.len(), 6);
    /// ```
    pub fn new(settings: &Settings) -> Self {
        TablatureState {
            measures: vec![TabMeasure::empty(
                settings.tuning.len(),
                settings.columns_per_measure,
            )],
            current_measure: 0,
            columns: settings.columns_per_measure,
            tuning: settings.tuning.clone(),
            search_max_fret: settings.search_max_fret,
            selection: Selection::default(),
            editing_cell: None,
            playing_column: None,
            playing: false,
            tempo: settings.tempo,
            metronome_enabled: false,
            filter_by_scale_enabled: true,
        }
    }

    pub fn measures(&self) -> &[TabMeasure] {
        &self.measures
    }

    pub fn current_measure(&self) -> usize {
        self.current_measure
    }

    pub fn current_measure_data(&self) -> &TabMeasure {
        &self.measures[self.current_measure]
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn editing_cell(&self) -> Option<CellRef> {
        self.editing_cell
    }

    pub fn playing_column(&self) -> Option<usize> {
        self.playing_column
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn metronome_enabled(&self) -> bool {
        self.metronome_enabled
    }

    pub fn filter_by_scale_enabled(&self) -> bool {
        self.filter_by_scale_enabled
    }

    fn current_mut(&mut self) -> &mut TabMeasure {
        &mut self.measures[self.current_measure]
    }

    // Measures

    pub fn set_current_measure(&mut self, index: usize) {
        if index < self.measures.len() {
            self.current_measure = index;
        }
    }

    /// Append an empty measure and make it current.
    pub fn add_measure(&mut self) {
        self.measures
            .push(TabMeasure::empty(self.tuning.len(), self.columns));
        self.current_measure = self.measures.len() - 1;
    }

    /// Delete the current measure. The last remaining measure is never deleted.
    pub fn delete_measure(&mut self) {
        if self.measures.len() <= 1 {
            return;
        }
        let removed = self.current_measure;
        self.measures.remove(removed);
        for measure in self.measures.iter_mut().skip(removed) {
            for o in &mut measure.overrides {
                o.measure_index = o.measure_index.saturating_sub(1);
            }
        }
        if self.current_measure >= self.measures.len() {
            self.current_measure = self.measures.len() - 1;
        }
    }

    pub fn previous_measure(&mut self) {
        if self.current_measure > 0 {
            self.current_measure -= 1;
        }
        self.clear_selection();
    }

    /// Move to the next measure, appending one when already on the last.
    pub fn next_measure(&mut self) {
        if self.current_measure + 1 < self.measures.len() {
            self.current_measure += 1;
        } else {
            self.add_measure();
        }
        self.clear_selection();
    }

    // Cells

    /// Overwrite a cell of the current measure; out-of-range indices are ignored.
    pub fn update_cell_value(&mut self, string: usize, column: usize, value: impl Into<Cell>) {
        if let Some(cell) = self
            .current_mut()
            .rows
            .get_mut(string)
            .and_then(|row| row.get_mut(column))
        {
            *cell = value.into();
        }
    }

    pub fn set_editing_cell(&mut self, string: usize, column: usize) {
        self.editing_cell = Some(CellRef { string, column });
    }

    pub fn clear_editing_cell(&mut self) {
        self.editing_cell = None;
    }

    // Columns

    /// Insert an empty column at `index` in the current measure.
    ///
    /// The bar keeps its length, so the last column falls off. Overrides at or after
    /// `index` move right with their column; one pushed past the bar is dropped.
    /// `index == columns()` inserts past the bar, so only the selection changes.
    pub fn insert_column_at(&mut self, index: usize) {
        if index > self.columns {
            return;
        }
        let columns = self.columns;
        let measure = self.current_mut();
        for row in &mut measure.rows {
            row.insert(index, Cell::Empty);
            row.truncate(columns);
        }
        for o in &mut measure.overrides {
            if o.column_index >= index {
                o.column_index += 1;
            }
        }
        measure.overrides.retain(|o| o.column_index < columns);
        self.clear_selection();
    }

    /// Insert before the first selected column.
    pub fn insert_column_left(&mut self) {
        if let Some(&first) = self.selection.columns.iter().min() {
            self.insert_column_at(first);
        }
    }

    /// Insert after the last selected column.
    pub fn insert_column_right(&mut self) {
        if let Some(&last) = self.selection.columns.iter().max() {
            self.insert_column_at(last + 1);
        }
    }

    // Selection

    /// Select `start..=end`, swapped if reversed and clamped to the bar.
    pub fn update_selection(&mut self, start: usize, end: usize) {
        let last = self.columns - 1;
        let (start, end) = (start.min(end).min(last), start.max(end).min(last));
        self.selection = Selection {
            start,
            end,
            columns: (start..=end).collect(),
        };
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
    }

    pub fn is_column_selected(&self, column: usize) -> bool {
        self.selection.columns.contains(&column)
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.columns.is_empty()
    }

    /// Number of selected columns.
    pub fn selection_width(&self) -> usize {
        self.selection.columns.len()
    }

    // Mode overrides

    /// Give every selected column of the current measure `mode`, replacing earlier
    /// overrides on those columns. Applying the same mode twice changes nothing.
    pub fn apply_mode_override(&mut self, mode: &str) {
        let columns = self.selection.columns.clone();
        self.override_columns(&columns, mode);
    }

    pub(super) fn override_columns(&mut self, columns: &[usize], mode: &str) {
        if mode.is_empty() || columns.is_empty() {
            return;
        }
        let measure_index = self.current_measure;
        let measure = self.current_mut();
        measure
            .overrides
            .retain(|o| !columns.contains(&o.column_index));
        measure
            .overrides
            .extend(columns.iter().map(|&column_index| ColumnOverride {
                measure_index,
                column_index,
                mode: mode.to_string(),
            }));
    }

    /// Mode override of `column` in the current measure.
    pub fn column_mode(&self, column: usize) -> Option<&str> {
        self.current_measure_data().column_mode(column)
    }

    // Playback

    /// Start or pause. Starting without a cursor starts at column 0.
    pub fn toggle_playback(&mut self) {
        self.playing = !self.playing;
        if self.playing && self.playing_column.is_none() {
            self.playing_column = Some(0);
        }
    }

    pub fn stop_playback(&mut self) {
        self.playing = false;
        self.playing_column = None;
    }

    pub fn set_current_playing_column(&mut self, column: usize) {
        if column < self.columns {
            self.playing_column = Some(column);
        }
    }

    /// Advance the cursor one column. Past the bar it moves to column 0 of the next
    /// measure, or back to the first measure after the last one.
    pub fn increment_playing_column(&mut self) {
        let next = self.playing_column.map_or(0, |c| c + 1);
        if next >= self.columns {
            self.playing_column = Some(0);
            self.current_measure = if self.current_measure + 1 < self.measures.len() {
                self.current_measure + 1
            } else {
                0
            };
        } else {
            self.playing_column = Some(next);
        }
    }

    /// Notes under the playback cursor, lowest string first.
    pub fn playing_column_events(&self) -> Vec<NoteEvent> {
        let Some(column) = self.playing_column else {
            return Vec::new();
        };
        let measure = self.current_measure_data();
        self.tuning
            .strings()
            .iter()
            .enumerate()
            .filter_map(|(string, open)| {
                let fret = measure.cell(string, column)?.sounding_fret()?;
                let midi = open.midi_or_default() + fret as i32;
                Some(NoteEvent {
                    string,
                    fret,
                    midi,
                    frequency: midi_to_frequency(midi),
                })
            })
            .collect()
    }

    /// Time the cursor spends on one column at the current tempo.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.tempo as f64 / COLUMNS_PER_BEAT as f64)
    }

    // Settings

    /// Set beats per minute; 0 is ignored.
    pub fn set_tempo(&mut self, tempo: u32) {
        if tempo > 0 {
            self.tempo = tempo;
        }
    }

    /// Change the tuning. Existing measures gain empty rows or lose their highest
    /// rows to match the new string count.
    pub fn set_tuning(&mut self, tuning: Tuning) {
        let strings = tuning.len();
        let columns = self.columns;
        for measure in &mut self.measures {
            measure.rows.resize_with(strings, || vec![Cell::Empty; columns]);
        }
        if let Some(cell) = self.editing_cell {
            if cell.string >= strings {
                self.editing_cell = None;
            }
        }
        log::debug!("tuning changed to {}", tuning);
        self.tuning = tuning;
    }

    pub fn toggle_metronome(&mut self) {
        self.metronome_enabled = !self.metronome_enabled;
    }

    pub fn toggle_filter_by_scale(&mut self) {
        self.filter_by_scale_enabled = !self.filter_by_scale_enabled;
    }

    /// Tuning for display, e.g. `"E2 - A2 - D3 - G3 - B3 - E4"`.
    pub fn tuning_display(&self) -> String {
        self.tuning.display()
    }

    /// Fret picker entries: frets 1 to 24, each flagged when it sounds a scale tone
    /// on any string, then hammer-on, pull-off and slide variants for frets 1 to 12.
    pub fn available_frets(&self, scale: &PitchClassSet) -> Vec<FretOption> {
        let mut options: Vec<FretOption> = (1..=PICKER_MAX_FRET)
            .map(|fret| {
                let in_scale = self.tuning.strings().iter().any(|open| {
                    scale.contains(PitchClass::from_semitones(
                        open.midi_or_default() + fret as i32,
                    ))
                });
                FretOption {
                    value: fret.to_string(),
                    label: fret.to_string(),
                    in_scale,
                }
            })
            .collect();

        for fret in 1..=PICKER_MAX_TECHNIQUE_FRET {
            for value in [
                format!("{}h", fret),
                format!("{}p", fret),
                format!("{}/{}", fret, fret + 1),
            ] {
                options.push(FretOption {
                    label: value.clone(),
                    value,
                    in_scale: true,
                });
            }
        }
        options
    }

    // Persistence

    pub fn to_json(&self) -> Result<String, FretError> {
        serde_json::to_string_pretty(self).map_err(|e| FretError::SerializationError(e.to_string()))
    }

    /// Load a saved grid, rejecting one whose shape breaks the grid's invariants.
    pub fn from_json(json: &str) -> Result<Self, FretError> {
        let state: TablatureState = serde_json::from_str(json)
            .map_err(|e| FretError::SerializationError(e.to_string()))?;
        state.validate()?;
        Ok(state)
    }

    fn validate(&self) -> Result<(), FretError> {
        let invalid = |message: String| Err(FretError::SerializationError(message));
        if self.measures.is_empty() {
            return invalid("tablature has no measures".to_string());
        }
        if self.current_measure >= self.measures.len() {
            return invalid(format!(
                "current measure {} out of range",
                self.current_measure
            ));
        }
        if self.columns == 0 {
            return invalid("columns must be at least 1".to_string());
        }
        if self.tempo == 0 {
            return invalid("tempo must be at least 1".to_string());
        }
        let selection = &self.selection;
        if !selection.columns.is_empty()
            && (selection.start > selection.end
                || selection.end >= self.columns
                || !selection.columns.iter().copied().eq(selection.start..=selection.end))
        {
            return invalid(format!(
                "selection {}..={} does not fit {} columns",
                selection.start, selection.end, self.columns
            ));
        }
        if let Some(column) = self.playing_column.filter(|c| *c >= self.columns) {
            return invalid(format!("playing column {} out of range", column));
        }
        if let Some(cell) = self
            .editing_cell
            .filter(|c| c.string >= self.tuning.len() || c.column >= self.columns)
        {
            return invalid(format!(
                "editing cell ({}, {}) out of range",
                cell.string, cell.column
            ));
        }
        for (index, measure) in self.measures.iter().enumerate() {
            if let Some(o) = measure
                .overrides
                .iter()
                .find(|o| o.measure_index != index || o.column_index >= self.columns)
            {
                return invalid(format!(
                    "measure {} has an override for measure {} column {}",
                    index, o.measure_index, o.column_index
                ));
            }
            if measure.rows.len() != self.tuning.len() {
                return invalid(format!(
                    "measure {} has {} strings, tuning has {}",
                    index,
                    measure.rows.len(),
                    self.tuning.len()
                ));
            }
            if measure.rows.iter().any(|row| row.len() != self.columns) {
                return invalid(format!(
                    "measure {} does not have {} columns",
                    index, self.columns
                ));
            }
        }
        Ok(())
    }
}
