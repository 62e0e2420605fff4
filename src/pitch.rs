//! # Pitch Model
//!
//! Note names, intervals and the arithmetic between them.
//!
//! ## Key Types
//! - [`Note`] - letter + accidentals + optional octave (`"E2"`, `"Bb"`, `"F##3"`)
//! - [`Interval`] - tonal notation (`"3m"`, `"5P"`, `"9M"`) or degree shorthand (`"b3"`, `"#11"`)
//! - [`PitchClass`] - a note modulo the octave, `0..12` with C = 0
//! - [`PitchClassSet`] - a set of pitch classes stored as a 12-bit mask
//!
//! ## Conventions
//! - C4 = MIDI 60, A4 = 440 Hz
//! - Notes without an octave are evaluated in octave 4 wherever a MIDI number is needed
//!   for pitch-class purposes ([`Note::midi_or_default`])
//! - Transposition follows letter arithmetic, so `C + 3m = Eb` and `C + 2A = D#`.
//!   Spelling never matters to the resolvers, which only compare pitch classes.
//!
//! ## Example
//! ```rust
//! use fretwise::pitch::{Interval, Note};
//!
//! let e2: Note = "E2".parse().unwrap();
//! assert_eq!(e2.midi(), Some(40));
//!
//! let g = e2.transpose(&Interval::from_semitones(3));
//! assert_eq!(g.to_string(), "G2");
//! ```

use crate::error::FretError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Octave assumed for notes written without one (`"C"` is treated as `"C4"`).
pub const DEFAULT_OCTAVE: i8 = 4;

/// Note names A through G
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteName {
    #[default]
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    const ALL: [NoteName; 7] = [
        NoteName::C,
        NoteName::D,
        NoteName::E,
        NoteName::F,
        NoteName::G,
        NoteName::A,
        NoteName::B,
    ];

    /// Semitone offset from C
    pub fn semitone(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }

    /// Position in the C major letter sequence (C = 0, B = 6)
    fn step(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 1,
            NoteName::E => 2,
            NoteName::F => 3,
            NoteName::G => 4,
            NoteName::A => 5,
            NoteName::B => 6,
        }
    }

    fn from_step(step: i32) -> NoteName {
        Self::ALL[step.rem_euclid(7) as usize]
    }

    fn from_char(c: char) -> Option<NoteName> {
        match c.to_ascii_uppercase() {
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            NoteName::C => 'C',
            NoteName::D => 'D',
            NoteName::E => 'E',
            NoteName::F => 'F',
            NoteName::G => 'G',
            NoteName::A => 'A',
            NoteName::B => 'B',
        }
    }
}

/// A pitch class, `0..12` with C = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PitchClass(u8);

impl PitchClass {
    const SHARP_NAMES: [&'static str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    /// Wraps any semitone count into a pitch class.
    pub fn from_semitones(semitones: i32) -> Self {
        PitchClass(semitones.rem_euclid(12) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::SHARP_NAMES[self.0 as usize])
    }
}

/// Set of pitch classes as a bitmask: bit `i` set means pitch class `i` is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pc: PitchClass) {
        self.0 |= 1 << pc.0;
    }

    pub fn contains(&self, pc: PitchClass) -> bool {
        self.0 & (1 << pc.0) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = PitchClass> + '_ {
        (0..12u8).filter(|i| self.0 & (1 << i) != 0).map(PitchClass)
    }
}

impl FromIterator<PitchClass> for PitchClassSet {
    fn from_iter<I: IntoIterator<Item = PitchClass>>(iter: I) -> Self {
        let mut set = PitchClassSet::new();
        for pc in iter {
            set.insert(pc);
        }
        set
    }
}

/// A spelled note with an optional octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    pub name: NoteName,
    /// Sharps (positive) or flats (negative)
    pub alteration: i8,
    pub octave: Option<i8>,
}

impl Note {
    pub fn new(name: NoteName, alteration: i8, octave: Option<i8>) -> Self {
        Note { name, alteration, octave }
    }

    /// MIDI number, or `None` for a pitch-class-only note such as `"C"`.
    pub fn midi(&self) -> Option<i32> {
        self.octave.map(|octave| self.absolute_semitone(octave))
    }

    /// MIDI number, evaluating octave-less notes in [`DEFAULT_OCTAVE`].
    pub fn midi_or_default(&self) -> i32 {
        self.absolute_semitone(self.octave.unwrap_or(DEFAULT_OCTAVE))
    }

    pub fn pitch_class(&self) -> PitchClass {
        PitchClass::from_semitones(self.name.semitone() + self.alteration as i32)
    }

    /// Same spelling in another octave.
    pub fn with_octave(&self, octave: i8) -> Note {
        Note { octave: Some(octave), ..*self }
    }

    /// Frequency in Hz (A4 = 440).
    pub fn frequency(&self) -> f64 {
        midi_to_frequency(self.midi_or_default())
    }

    /// Transpose by an interval, keeping letter spelling.
    ///
    /// Octave-less notes stay octave-less.
    pub fn transpose(&self, interval: &Interval) -> Note {
        let octave = self.octave.unwrap_or(DEFAULT_OCTAVE) as i32;
        let direction = if interval.descending { -1 } else { 1 };

        let step = octave * 7 + self.name.step() + direction * (interval.number as i32 - 1);
        let new_name = NoteName::from_step(step);
        let new_octave = step.div_euclid(7);

        let target = self.absolute_semitone(octave as i8) + interval.semitones();
        let natural = (new_octave + 1) * 12 + new_name.semitone();

        Note {
            name: new_name,
            alteration: (target - natural) as i8,
            octave: self.octave.map(|_| new_octave as i8),
        }
    }

    fn absolute_semitone(&self, octave: i8) -> i32 {
        (octave as i32 + 1) * 12 + self.name.semitone() + self.alteration as i32
    }
}

impl FromStr for Note {
    type Err = FretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || FretError::InvalidNote(s.to_string());

        let mut chars = trimmed.chars();
        let name = chars.next().and_then(NoteName::from_char).ok_or_else(invalid)?;

        let rest = chars.as_str();
        let accidentals_len = rest
            .chars()
            .take_while(|c| *c == '#' || *c == 'b')
            .count();
        let (accidentals, octave_str) = rest.split_at(accidentals_len);

        // Mixed accidentals like "#b" are rejected
        let alteration = if accidentals.chars().all(|c| c == '#') {
            accidentals.len() as i8
        } else if accidentals.chars().all(|c| c == 'b') {
            -(accidentals.len() as i8)
        } else {
            return Err(invalid());
        };

        let octave = if octave_str.is_empty() {
            None
        } else {
            Some(octave_str.parse::<i8>().map_err(|_| invalid())?)
        };

        Ok(Note { name, alteration, octave })
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.as_char())?;
        let symbol = if self.alteration > 0 { "#" } else { "b" };
        for _ in 0..self.alteration.unsigned_abs() {
            f.write_str(symbol)?;
        }
        if let Some(octave) = self.octave {
            write!(f, "{}", octave)?;
        }
        Ok(())
    }
}

impl Serialize for Note {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A diatonic interval.
///
/// `alteration` is measured against the major (2, 3, 6, 7) or perfect (1, 4, 5)
/// form of `number`, so a minor third is `number = 3, alteration = -1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub number: u8,
    pub alteration: i8,
    pub descending: bool,
}

impl Interval {
    pub const UNISON: Interval = Interval { number: 1, alteration: 0, descending: false };

    /// Chromatic spelling of a semitone count: 1P 2m 2M 3m 3M 4P 5d 5P 6m 6M 7m 7M,
    /// plus whole octaves. Negative counts give descending intervals.
    pub fn from_semitones(semitones: i32) -> Interval {
        let descending = semitones < 0;
        let magnitude = semitones.abs();
        let octaves = magnitude / 12;
        let (simple, alteration) = match magnitude % 12 {
            0 => (1, 0),
            1 => (2, -1),
            2 => (2, 0),
            3 => (3, -1),
            4 => (3, 0),
            5 => (4, 0),
            6 => (5, -1),
            7 => (5, 0),
            8 => (6, -1),
            9 => (6, 0),
            10 => (7, -1),
            11 => (7, 0),
            _ => unreachable!(),
        };
        Interval {
            number: (simple + octaves * 7) as u8,
            alteration,
            descending,
        }
    }

    /// Signed semitone count.
    pub fn semitones(&self) -> i32 {
        let n = self.number as i32 - 1;
        let base = [0, 2, 4, 5, 7, 9, 11][(n % 7) as usize] + (n / 7) * 12;
        let total = base + self.alteration as i32;
        if self.descending {
            -total
        } else {
            total
        }
    }

    fn is_perfect_type(number: u8) -> bool {
        matches!((number - 1) % 7, 0 | 3 | 4)
    }

    /// Parse degree shorthand such as `"1"`, `"b3"`, `"#5"`, `"bb7"`, `"#11"`.
    fn parse_degree(s: &str) -> Option<Interval> {
        let digits_at = s.find(|c: char| c.is_ascii_digit())?;
        let (accidentals, digits) = s.split_at(digits_at);
        let number: u8 = digits.parse().ok().filter(|n| *n > 0)?;
        let mut alteration = 0i8;
        for c in accidentals.chars() {
            match c {
                '#' => alteration += 1,
                'b' => alteration -= 1,
                _ => return None,
            }
        }
        Some(Interval { number, alteration, descending: false })
    }

    /// Parse tonal notation such as `"3m"`, `"5P"`, `"11A"`, `"5dd"`, `"-3m"`.
    fn parse_tonal(s: &str) -> Option<Interval> {
        let (descending, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let split = body.find(|c: char| !c.is_ascii_digit())?;
        let (digits, quality) = body.split_at(split);
        let number: u8 = digits.parse().ok().filter(|n| *n > 0)?;
        let perfect = Self::is_perfect_type(number);

        let count = quality.len() as i8;
        let alteration = match (quality.chars().next()?, perfect) {
            ('P', true) if quality == "P" => 0,
            ('M', false) if quality == "M" => 0,
            ('m', false) if quality == "m" => -1,
            ('A', _) if quality.chars().all(|c| c == 'A') => count,
            ('d', true) if quality.chars().all(|c| c == 'd') => -count,
            ('d', false) if quality.chars().all(|c| c == 'd') => -count - 1,
            _ => return None,
        };
        Some(Interval { number, alteration, descending })
    }
}

impl FromStr for Interval {
    type Err = FretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let ends_with_digit = trimmed.chars().last().is_some_and(|c| c.is_ascii_digit());
        let parsed = if ends_with_digit {
            Self::parse_degree(trimmed)
        } else {
            Self::parse_tonal(trimmed)
        };
        parsed.ok_or_else(|| FretError::InvalidInterval(s.to_string()))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            f.write_str("-")?;
        }
        write!(f, "{}", self.number)?;
        let quality = match (Self::is_perfect_type(self.number), self.alteration) {
            (true, 0) => "P".to_string(),
            (false, 0) => "M".to_string(),
            (false, -1) => "m".to_string(),
            (_, a) if a > 0 => "A".repeat(a as usize),
            (true, a) => "d".repeat(a.unsigned_abs() as usize),
            (false, a) => "d".repeat((a.unsigned_abs() - 1) as usize),
        };
        f.write_str(&quality)
    }
}

impl Serialize for Interval {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Equal-temperament frequency of a MIDI note (A4 = 69 = 440 Hz).
pub fn midi_to_frequency(midi: i32) -> f64 {
    440.0 * 2f64.powf((midi as f64 - 69.0) / 12.0)
}

/// Note sounding on `open_string` at `fret`.
pub fn note_at(open_string: &Note, fret: u8) -> Note {
    open_string.transpose(&Interval::from_semitones(fret as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(s: &str) -> Note {
        s.parse().unwrap()
    }

    #[test]
    fn test_note_parsing() {
        assert_eq!(note("E2"), Note::new(NoteName::E, 0, Some(2)));
        assert_eq!(note("Bb"), Note::new(NoteName::B, -1, None));
        assert_eq!(note("f##3"), Note::new(NoteName::F, 2, Some(3)));
        assert_eq!(note("C-1"), Note::new(NoteName::C, 0, Some(-1)));

        assert!("H2".parse::<Note>().is_err());
        assert!("C#b".parse::<Note>().is_err());
        assert!("".parse::<Note>().is_err());
        assert!("Cx".parse::<Note>().is_err());
    }

    #[test]
    fn test_midi_numbers() {
        assert_eq!(note("C4").midi(), Some(60));
        assert_eq!(note("E2").midi(), Some(40));
        assert_eq!(note("E4").midi(), Some(64));
        assert_eq!(note("B#3").midi(), Some(60));
        assert_eq!(note("Cb4").midi(), Some(59));
        assert_eq!(note("C").midi(), None);
        assert_eq!(note("C").midi_or_default(), 60);
    }

    #[test]
    fn test_pitch_class_ignores_spelling() {
        assert_eq!(note("C#").pitch_class(), note("Db").pitch_class());
        assert_eq!(note("B#").pitch_class(), note("C").pitch_class());
        assert_eq!(note("Cb").pitch_class().value(), 11);
        assert_eq!(note("G").pitch_class().to_string(), "G");
    }

    #[test]
    fn test_interval_parsing() {
        let cases = [
            ("1P", 0),
            ("3m", 3),
            ("3M", 4),
            ("5d", 6),
            ("5A", 8),
            ("7d", 9),
            ("9M", 14),
            ("11A", 18),
            ("13m", 20),
            ("-3m", -3),
            ("b3", 3),
            ("#5", 8),
            ("bb7", 9),
            ("#11", 18),
            ("1", 0),
        ];
        for (text, semitones) in cases {
            let interval: Interval = text.parse().unwrap();
            assert_eq!(interval.semitones(), semitones, "interval {}", text);
        }

        assert!("3P".parse::<Interval>().is_err());
        assert!("5M".parse::<Interval>().is_err());
        assert!("0M".parse::<Interval>().is_err());
        assert!("x3".parse::<Interval>().is_err());
    }

    #[test]
    fn test_interval_display_matches_tonal_notation() {
        for text in ["1P", "2m", "3M", "5d", "5A", "7d", "9M", "13m", "-3m"] {
            let interval: Interval = text.parse().unwrap();
            assert_eq!(interval.to_string(), text);
        }
    }

    #[test]
    fn test_from_semitones() {
        let names: Vec<String> = (0..12)
            .map(|n| Interval::from_semitones(n).to_string())
            .collect();
        assert_eq!(
            names,
            ["1P", "2m", "2M", "3m", "3M", "4P", "5d", "5P", "6m", "6M", "7m", "7M"]
        );
        assert_eq!(Interval::from_semitones(12).to_string(), "8P");
        assert_eq!(Interval::from_semitones(14).to_string(), "9M");
        assert_eq!(Interval::from_semitones(-2).semitones(), -2);
        for n in -30..30 {
            assert_eq!(Interval::from_semitones(n).semitones(), n);
        }
    }

    #[test]
    fn test_transpose_keeps_letter_spelling() {
        let c: Note = note("C");
        assert_eq!(c.transpose(&"3m".parse().unwrap()).to_string(), "Eb");
        assert_eq!(c.transpose(&"3M".parse().unwrap()).to_string(), "E");
        assert_eq!(c.transpose(&"2A".parse().unwrap()).to_string(), "D#");
        assert_eq!(note("B3").transpose(&"2m".parse().unwrap()).to_string(), "C4");
        assert_eq!(note("E2").transpose(&"9M".parse().unwrap()).to_string(), "F#3");
        assert_eq!(note("D4").transpose(&"-3M".parse().unwrap()).to_string(), "Bb3");
    }

    #[test]
    fn test_transpose_preserves_midi_distance() {
        let e2 = note("E2");
        for fret in 0..=24u8 {
            let n = note_at(&e2, fret);
            assert_eq!(n.midi(), Some(40 + fret as i32));
        }
    }

    #[test]
    fn test_frequency() {
        assert!((note("A4").frequency() - 440.0).abs() < 1e-9);
        assert!((note("A3").frequency() - 220.0).abs() < 1e-9);
        assert!((midi_to_frequency(60) - 261.6256).abs() < 1e-3);
    }

    #[test]
    fn test_pitch_class_set() {
        let set: PitchClassSet = ["C", "E", "G", "C"]
            .iter()
            .map(|n| note(n).pitch_class())
            .collect();
        assert_eq!(set.len(), 3);
        assert!(set.contains(PitchClass::from_semitones(4)));
        assert!(!set.contains(PitchClass::from_semitones(5)));
        let values: Vec<u8> = set.iter().map(PitchClass::value).collect();
        assert_eq!(values, vec![0, 4, 7]);
    }
}
