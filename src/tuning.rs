//! String tunings.
//!
//! A [`Tuning`] is an ordered, non-empty list of open-string notes. Index 0 is
//! always the **lowest-pitched** string; the resolvers, the voicing search and the
//! tablature grid all index strings this way. Views that draw the high string on
//! top reverse the rows themselves.

use crate::error::FretError;
use crate::pitch::Note;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard six-string tuning, low to high.
pub const STANDARD_TUNING: &str = "E2,A2,D3,G3,B3,E4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuning {
    strings: Vec<Note>,
}

impl Tuning {
    /// Build a tuning from open-string notes ordered low to high.
    pub fn new(strings: Vec<Note>) -> Result<Self, FretError> {
        if strings.is_empty() {
            return Err(FretError::InvalidTuning(
                "tuning must contain at least one string".to_string(),
            ));
        }
        if let Some(note) = strings.iter().find(|n| n.octave.is_none()) {
            return Err(FretError::InvalidTuning(format!(
                "open string {} needs an octave",
                note
            )));
        }
        Ok(Tuning { strings })
    }

    /// Parse a comma separated list such as `"E2,A2,D3,G3,B3,E4"`.
    pub fn parse(s: &str) -> Result<Self, FretError> {
        let strings = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<Note>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(strings)
    }

    pub fn standard() -> Self {
        Tuning {
            strings: ["E2", "A2", "D3", "G3", "B3", "E4"]
                .iter()
                .filter_map(|n| n.parse().ok())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn strings(&self) -> &[Note] {
        &self.strings
    }

    pub fn get(&self, index: usize) -> Option<&Note> {
        self.strings.get(index)
    }

    /// Strings joined for display: `"E2 - A2 - D3 - G3 - B3 - E4"`.
    pub fn display(&self) -> String {
        self.strings
            .iter()
            .map(Note::to_string)
            .collect::<Vec<_>>()
            .join(" - ")
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::standard()
    }
}

impl FromStr for Tuning {
    type Err = FretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tuning::parse(s)
    }
}

impl fmt::Display for Tuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .strings
            .iter()
            .map(Note::to_string)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

impl Serialize for Tuning {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tuning {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Tuning::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard() {
        let tuning = Tuning::parse(STANDARD_TUNING).unwrap();
        assert_eq!(tuning, Tuning::standard());
        assert_eq!(tuning.len(), 6);
        assert_eq!(tuning.get(0).unwrap().midi(), Some(40));
        assert_eq!(tuning.get(5).unwrap().midi(), Some(64));
        assert_eq!(tuning.to_string(), STANDARD_TUNING);
    }

    #[test]
    fn test_display() {
        assert_eq!(Tuning::standard().display(), "E2 - A2 - D3 - G3 - B3 - E4");
    }

    #[test]
    fn test_rejects_empty_and_octaveless() {
        assert!(matches!(Tuning::parse(""), Err(FretError::InvalidTuning(_))));
        assert!(matches!(Tuning::parse(" , "), Err(FretError::InvalidTuning(_))));
        assert!(matches!(Tuning::parse("E2,A"), Err(FretError::InvalidTuning(_))));
        assert!(matches!(Tuning::parse("E2,Q2"), Err(FretError::InvalidNote(_))));
    }

    #[test]
    fn test_drop_d_and_bass() {
        let drop_d = Tuning::parse("D2, A2, D3, G3, B3, E4").unwrap();
        assert_eq!(drop_d.get(0).unwrap().midi(), Some(38));

        let bass = Tuning::parse("E1,A1,D2,G2").unwrap();
        assert_eq!(bass.len(), 4);
    }
}
