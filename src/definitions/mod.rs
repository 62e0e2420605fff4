//! # Chord and Scale Definitions
//!
//! The immutable reference table the resolvers look chords and scales up in.
//!
//! ## Catalog Format
//! The built-in catalog (`catalog.yaml`, embedded at compile time) has three sections:
//! ```yaml
//! chords:
//!   - id: "major"
//!     category: "Basic triads"
//!     intervals: [1P, 3M, 5P]
//!     positions:
//!       - position: 1
//!         frets: [0, 3, 2, 0, 1, 0]      # lowest string first, ~ = muted
//!         fingers: [~, 3, 2, ~, 1, ~]
//!         barres: []
//! chord-aliases:
//!   "m7": "min7"
//! scales:
//!   - id: "dorian"
//!     intervals: [1P, 2M, 3m, 4P, 5P, 6M, 7m]
//!     aliases: ["dor"]
//! ```
//!
//! Hand shapes are authored for reference root C in standard tuning and are
//! transposed by the fixed-position resolver.
//!
//! ## Lookup
//! Identifiers are normalized through the alias maps *before* indexing, so `"m7"`,
//! `"min7"` and `"M7"`/`"maj7"` resolve to canonical entries. Chords are searched
//! before scales by [`DefinitionTable::lookup`].

use crate::error::FretError;
use crate::pitch::{Interval, Note, PitchClass, PitchClassSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

const BUILTIN_CATALOG: &str = include_str!("catalog.yaml");

/// Whether a definition is a chord (has hand shapes) or a scale/mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Chord,
    Scale,
}

/// A stored hand shape, relative to the reference root and tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandShapeTemplate {
    /// Nominal neck position label (1, 2, ...), not a fret number
    pub position: u8,
    /// Per string, lowest first; `None` = not played
    pub frets: Vec<Option<u8>>,
    /// Per string, lowest first; `None` = open or not played
    pub fingers: Vec<Option<u8>>,
    #[serde(default)]
    pub barres: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub id: String,
    pub kind: DefinitionKind,
    pub intervals: Vec<Interval>,
    pub templates: Vec<HandShapeTemplate>,
    pub category: Option<String>,
}

impl Definition {
    /// Notes of this chord/scale built on `root`, in definition order.
    pub fn notes(&self, root: &Note) -> Vec<Note> {
        self.intervals.iter().map(|i| root.transpose(i)).collect()
    }

    /// Pitch classes in definition order, root first, repeated classes removed
    /// (a 9th and a 2nd collapse onto one entry).
    pub fn ordered_pitch_classes(&self, root: &Note) -> Vec<PitchClass> {
        let mut ordered = Vec::with_capacity(self.intervals.len());
        for note in self.notes(root) {
            let pc = note.pitch_class();
            if !ordered.contains(&pc) {
                ordered.push(pc);
            }
        }
        ordered
    }

    pub fn pitch_class_set(&self, root: &Note) -> PitchClassSet {
        self.notes(root).iter().map(Note::pitch_class).collect()
    }

    /// Template whose position label matches, else the first one.
    pub fn template_for_position(&self, position: u8) -> Option<&HandShapeTemplate> {
        self.templates
            .iter()
            .find(|t| t.position == position)
            .or_else(|| self.templates.first())
    }
}

/// Raw catalog for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
struct RawCatalog {
    #[serde(default)]
    chords: Vec<RawChord>,
    #[serde(default)]
    chord_aliases: HashMap<String, String>,
    #[serde(default)]
    scales: Vec<RawScale>,
}

#[derive(Deserialize, Debug)]
struct RawChord {
    id: String,
    category: Option<String>,
    intervals: Vec<Interval>,
    #[serde(default)]
    positions: Vec<HandShapeTemplate>,
}

#[derive(Deserialize, Debug)]
struct RawScale {
    id: String,
    category: Option<String>,
    intervals: Vec<Interval>,
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DefinitionTable {
    chords: HashMap<String, Definition>,
    chord_order: Vec<String>,
    chord_aliases: HashMap<String, String>,
    scales: HashMap<String, Definition>,
    scale_order: Vec<String>,
    scale_aliases: HashMap<String, String>,
}

impl DefinitionTable {
    /// The embedded catalog, parsed once per process.
    pub fn builtin() -> &'static DefinitionTable {
        static TABLE: OnceLock<DefinitionTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            DefinitionTable::from_yaml(BUILTIN_CATALOG).unwrap_or_else(|e| {
                log::error!("built-in chord catalog is invalid: {}", e);
                DefinitionTable::default()
            })
        })
    }

    /// Load a catalog in the `catalog.yaml` format.
    pub fn from_yaml(content: &str) -> Result<Self, FretError> {
        let raw: RawCatalog = serde_yaml::from_str(content).map_err(|e| {
            FretError::DefinitionError {
                id: "<catalog>".to_string(),
                message: e.to_string(),
            }
        })?;

        let mut table = DefinitionTable::default();

        for chord in raw.chords {
            validate_templates(&chord.id, &chord.intervals, &chord.positions)?;
            if table.chords.contains_key(&chord.id) {
                return Err(duplicate(&chord.id));
            }
            table.chord_order.push(chord.id.clone());
            table.chords.insert(
                chord.id.clone(),
                Definition {
                    id: chord.id,
                    kind: DefinitionKind::Chord,
                    intervals: chord.intervals,
                    templates: chord.positions,
                    category: chord.category,
                },
            );
        }

        for (alias, target) in raw.chord_aliases {
            if !table.chords.contains_key(&target) {
                return Err(FretError::DefinitionError {
                    id: alias,
                    message: format!("alias points at unknown chord '{}'", target),
                });
            }
            table.chord_aliases.insert(alias, target);
        }

        for scale in raw.scales {
            if scale.intervals.is_empty() {
                return Err(FretError::DefinitionError {
                    id: scale.id,
                    message: "scale has no intervals".to_string(),
                });
            }
            if table.scales.contains_key(&scale.id) {
                return Err(duplicate(&scale.id));
            }
            for alias in scale.aliases {
                if table.scale_aliases.contains_key(&alias) {
                    return Err(FretError::DefinitionError {
                        id: alias,
                        message: "scale alias defined twice".to_string(),
                    });
                }
                table.scale_aliases.insert(alias, scale.id.clone());
            }
            table.scale_order.push(scale.id.clone());
            table.scales.insert(
                scale.id.clone(),
                Definition {
                    id: scale.id,
                    kind: DefinitionKind::Scale,
                    intervals: scale.intervals,
                    templates: Vec::new(),
                    category: scale.category,
                },
            );
        }

        log::debug!(
            "loaded {} chords, {} scales, {} chord aliases",
            table.chords.len(),
            table.scales.len(),
            table.chord_aliases.len()
        );
        Ok(table)
    }

    /// Canonical chord id for `id` (aliases resolved, unknown ids passed through).
    pub fn canonical_chord_id<'a>(&'a self, id: &'a str) -> &'a str {
        let id = id.trim();
        self.chord_aliases.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Canonical scale id for `id` (aliases resolved, unknown ids passed through).
    pub fn canonical_scale_id<'a>(&'a self, id: &'a str) -> &'a str {
        let id = id.trim();
        self.scale_aliases.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn lookup_chord(&self, id: &str) -> Option<&Definition> {
        self.chords.get(self.canonical_chord_id(id))
    }

    pub fn lookup_scale(&self, id: &str) -> Option<&Definition> {
        self.scales.get(self.canonical_scale_id(id))
    }

    /// Chord first, then scale.
    pub fn lookup(&self, id: &str) -> Option<&Definition> {
        self.lookup_chord(id).or_else(|| self.lookup_scale(id))
    }

    /// Chords in catalog order.
    pub fn chords(&self) -> impl Iterator<Item = &Definition> {
        self.chord_order.iter().filter_map(|id| self.chords.get(id))
    }

    /// Scales in catalog order.
    pub fn scales(&self) -> impl Iterator<Item = &Definition> {
        self.scale_order.iter().filter_map(|id| self.scales.get(id))
    }
}

fn duplicate(id: &str) -> FretError {
    FretError::DefinitionError {
        id: id.to_string(),
        message: "defined twice".to_string(),
    }
}

fn validate_templates(
    id: &str,
    intervals: &[Interval],
    templates: &[HandShapeTemplate],
) -> Result<(), FretError> {
    if intervals.is_empty() {
        return Err(FretError::DefinitionError {
            id: id.to_string(),
            message: "chord has no intervals".to_string(),
        });
    }
    for template in templates {
        if template.frets.len() != template.fingers.len() {
            return Err(FretError::DefinitionError {
                id: id.to_string(),
                message: format!(
                    "position {} has {} frets but {} fingers",
                    template.position,
                    template.frets.len(),
                    template.fingers.len()
                ),
            });
        }
    }
    Ok(())
}
