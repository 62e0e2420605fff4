//! Tablature data type definitions
//!
//! Cells, measures and the small records the grid hands to its callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker written in an empty cell.
pub const EMPTY_CELL: &str = "-";

/// One grid cell.
///
/// Serialized as its string form so stored tablature reads like tab:
/// `"-"`, `"5"`, `"7h"`, `"3/4"`, `"x"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Fret(u8),
    /// Anything else a player may type: techniques, dead notes.
    Annotation(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Fret that sounds when the cell is played.
    ///
    /// Annotations sound their leading fret number (`"7h"` -> 7, `"3/4"` -> 3).
    ///
    /// # Example
    /// ```
    /// use fretwise::Cell;
    ///
    /// assert_eq!(Cell::from("12").sounding_fret(), Some(12));
    /// assert_eq!(Cell::from("7p").sounding_fret(), Some(7));
    /// assert_eq!(Cell::from("x").sounding_fret(), None);
    /// assert_eq!(Cell::Empty.sounding_fret(), None);
    /// ```
    pub fn sounding_fret(&self) -> Option<u8> {
        match self {
            Cell::Empty => None,
            Cell::Fret(fret) => Some(*fret),
            Cell::Annotation(text) => {
                let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().ok()
            }
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s == EMPTY_CELL {
            Cell::Empty
        } else if let Ok(fret) = s.parse::<u8>() {
            Cell::Fret(fret)
        } else {
            Cell::Annotation(s.to_string())
        }
    }
}

impl From<u8> for Cell {
    fn from(fret: u8) -> Self {
        Cell::Fret(fret)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => f.write_str(EMPTY_CELL),
            Cell::Fret(fret) => write!(f, "{}", fret),
            Cell::Annotation(text) => f.write_str(text),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Cell::from(s.as_str()))
    }
}

/// A mode (scale) assigned to a single column, overriding the global one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOverride {
    pub measure_index: usize,
    pub column_index: usize,
    pub mode: String,
}

/// One bar of tablature: a row of cells per string, lowest string first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabMeasure {
    pub rows: Vec<Vec<Cell>>,
    #[serde(default)]
    pub overrides: Vec<ColumnOverride>,
}

impl TabMeasure {
    pub fn empty(strings: usize, columns: usize) -> Self {
        TabMeasure {
            rows: vec![vec![Cell::Empty; columns]; strings],
            overrides: Vec::new(),
        }
    }

    pub fn cell(&self, string: usize, column: usize) -> Option<&Cell> {
        self.rows.get(string).and_then(|row| row.get(column))
    }

    /// Mode override for `column`, if any.
    pub fn column_mode(&self, column: usize) -> Option<&str> {
        self.overrides
            .iter()
            .find(|o| o.column_index == column)
            .map(|o| o.mode.as_str())
    }

    /// Render as plain ASCII tab, highest string on top. Columns are padded to
    /// their widest cell so multi-digit frets stay aligned.
    pub fn to_ascii(&self, labels: &[String]) -> String {
        let label_width = labels.iter().map(String::len).max().unwrap_or(0);
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|column| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(column))
                    .map(|cell| cell.to_string().len())
                    .max()
                    .unwrap_or(1)
            })
            .collect();

        let mut lines = Vec::with_capacity(self.rows.len());
        for (string, row) in self.rows.iter().enumerate().rev() {
            let label = labels.get(string).map(String::as_str).unwrap_or("");
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:-<width$}", cell.to_string(), width = width))
                .collect();
            lines.push(format!(
                "{:>label_width$}|{}|",
                label,
                cells.join("-"),
                label_width = label_width
            ));
        }
        lines.join("\n")
    }
}

/// Address of a grid cell in the current measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub string: usize,
    pub column: usize,
}

/// A note to sound when the playback cursor reaches a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteEvent {
    pub string: usize,
    pub fret: u8,
    pub midi: i32,
    /// Hertz, A4 = 440.
    pub frequency: f64,
}

/// One entry of the fret picker offered while editing a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FretOption {
    pub value: String,
    pub label: String,
    pub in_scale: bool,
}

/// An item dropped onto the grid: a bare note name, a `{ "name": .. }` note, or a
/// `{ "type": "chord", "notes": [..], "mode": .. }` chord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressionItem {
    Name(String),
    Entry(ProgressionEntry),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressionEntry {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl ProgressionItem {
    /// A chord item with the given notes and optional column mode.
    pub fn chord(notes: &[&str], mode: Option<&str>) -> Self {
        ProgressionItem::Entry(ProgressionEntry {
            kind: Some("chord".to_string()),
            name: None,
            notes: notes.iter().map(|n| n.to_string()).collect(),
            mode: mode.map(str::to_string),
        })
    }

    pub fn is_chord(&self) -> bool {
        matches!(self, ProgressionItem::Entry(e) if e.kind.as_deref() == Some("chord"))
    }

    pub fn mode(&self) -> Option<&str> {
        match self {
            ProgressionItem::Entry(e) => e.mode.as_deref().filter(|m| !m.is_empty()),
            ProgressionItem::Name(_) => None,
        }
    }

    /// Notes placed when the item is part of a chord progression.
    pub fn chord_notes(&self) -> &[String] {
        match self {
            ProgressionItem::Entry(e) => &e.notes,
            ProgressionItem::Name(_) => &[],
        }
    }

    /// Note placed when the item is part of a single-note progression.
    pub fn note_name(&self) -> Option<&str> {
        match self {
            ProgressionItem::Name(name) => Some(name),
            ProgressionItem::Entry(e) => e.name.as_deref(),
        }
    }
}
