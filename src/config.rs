//! # Settings
//!
//! Runtime settings for the resolvers and the tablature grid, read from YAML.
//!
//! Every key is optional; missing keys fall back to the defaults below.
//!
//! ```yaml
//! tuning: E2,A2,D3,G3,B3,E4
//! columns-per-measure: 32
//! tempo: 120
//! max-fret: 15
//! search-max-fret: 24
//! reference-root: C
//! ```
//!
//! ## Example
//! ```rust
//! use fretwise::Settings;
//!
//! let settings = Settings::from_yaml("tuning: D2,A2,D3,G3,A3,D4\ntempo: 90\n").unwrap();
//! assert_eq!(settings.tempo, 90);
//! assert_eq!(settings.columns_per_measure, 32);
//! assert_eq!(settings.tuning.display(), "D2 - A2 - D3 - G3 - A3 - D4");
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::FretError;
use crate::pitch::{Note, NoteName};
use crate::resolve::DEFAULT_MAX_FRET;
use crate::tuning::Tuning;

pub const DEFAULT_COLUMNS_PER_MEASURE: usize = 32;
pub const DEFAULT_TEMPO: u32 = 120;
/// Highest fret considered when placing single notes on the grid.
pub const DEFAULT_SEARCH_MAX_FRET: u8 = 24;

/// Raw settings for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawSettings {
    tuning: Option<String>,
    columns_per_measure: Option<usize>,
    tempo: Option<u32>,
    max_fret: Option<u8>,
    search_max_fret: Option<u8>,
    reference_root: Option<String>,
}

/// Validated settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub tuning: Tuning,
    /// Fixed bar length of every tablature measure.
    pub columns_per_measure: usize,
    /// Beats per minute.
    pub tempo: u32,
    /// Search bound of the optimal-position resolver.
    pub max_fret: u8,
    /// Search bound of single-note placement on the grid.
    pub search_max_fret: u8,
    /// Root the stored hand shapes are authored for.
    pub reference_root: Note,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tuning: Tuning::standard(),
            columns_per_measure: DEFAULT_COLUMNS_PER_MEASURE,
            tempo: DEFAULT_TEMPO,
            max_fret: DEFAULT_MAX_FRET,
            search_max_fret: DEFAULT_SEARCH_MAX_FRET,
            reference_root: Note::new(NoteName::C, 0, None),
        }
    }
}

impl Settings {
    pub fn from_yaml(content: &str) -> Result<Self, FretError> {
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        let raw: RawSettings =
            serde_yaml::from_str(content).map_err(|e| FretError::SettingsError(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FretError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        log::debug!("loading settings from {}", path.display());
        Self::from_yaml(&content)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, FretError> {
        let defaults = Settings::default();

        let tuning = match &raw.tuning {
            Some(t) => Tuning::parse(t)?,
            None => defaults.tuning,
        };

        let columns_per_measure = raw
            .columns_per_measure
            .unwrap_or(defaults.columns_per_measure);
        if columns_per_measure == 0 {
            return Err(FretError::SettingsError(
                "columns-per-measure must be at least 1".to_string(),
            ));
        }

        let tempo = raw.tempo.unwrap_or(defaults.tempo);
        if tempo == 0 {
            return Err(FretError::SettingsError(
                "tempo must be at least 1 bpm".to_string(),
            ));
        }

        let reference_root = match &raw.reference_root {
            Some(r) => r.parse::<Note>()?,
            None => defaults.reference_root,
        };

        Ok(Settings {
            tuning,
            columns_per_measure,
            tempo,
            max_fret: raw.max_fret.unwrap_or(defaults.max_fret),
            search_max_fret: raw.search_max_fret.unwrap_or(defaults.search_max_fret),
            reference_root,
        })
    }
}
