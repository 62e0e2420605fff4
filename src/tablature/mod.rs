//! # Tablature Module
//!
//! An editable tablature grid with playback cursor and progression drop.
//!
//! ## Purpose
//! The grid is a list of fixed-length measures. Each measure has one row of
//! [`Cell`]s per string (lowest string first) and a list of per-column mode
//! overrides. On top of that sit
//! 1. **Editing** - cell values, column insertion, a column selection
//! 2. **Mode overrides** - a scale assigned to selected columns
//! 3. **Placement** - notes and chord progressions dropped onto columns
//! 4. **Playback** - a column cursor advanced by an external clock
//!
//! ## Sub-modules
//! - `types` - Cell, TabMeasure, ColumnOverride, NoteEvent, ProgressionItem
//! - `state` - TablatureState and its mutators
//! - `placement` - best-position search and progression drop
//!
//! ## Example
//! ```rust
//! use fretwise::{Cell, ProgressionItem, Settings, TablatureState};
//!
//! let mut tab = TablatureState::new(&Settings::default());
//! tab.drop_progression_at(&[ProgressionItem::chord(&["C3", "E3", "G3"], Some("ionian"))], 4);
//!
//! assert_eq!(tab.column_mode(4), Some("ionian"));
//! assert_eq!(tab.current_measure_data().cell(1, 4), Some(&Cell::Fret(3)));
//! ```
//!
//! ## Failure Semantics
//! Nothing here returns an error except JSON loading. Out-of-range indices are
//! ignored, the last measure cannot be deleted, and notes that cannot be placed
//! are skipped.
//!
//! ## Playback
//! The grid holds no timer. A driver calls
//! [`TablatureState::increment_playing_column`] every
//! [`TablatureState::tick_interval`] and sounds
//! [`TablatureState::playing_column_events`].

mod placement;
mod state;
mod types;


pub use placement::{find_best_position, FretPosition};
pub use state::{Selection, TablatureState, COLUMNS_PER_BEAT};
pub use types::{
    Cell, CellRef, ColumnOverride, FretOption, NoteEvent, ProgressionEntry, ProgressionItem,
    TabMeasure, EMPTY_CELL,
};
