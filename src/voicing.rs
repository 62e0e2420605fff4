//! # Voicing Search
//!
//! Enumerates playable shapes for a chord along the whole neck and ranks them
//! by how hard they are to finger.
//!
//! ## How it works
//! The neck is swept with a window from one fret below to four above each anchor
//! fret 0 to 15. Inside each window every string takes its lowest chord tone,
//! unless a higher fret gives the root while no string has taken it yet. Roles
//! come from a tone's index in the chord's ordered pitch-class list, not from
//! interval quality.
//!
//! ## Scoring
//! Lower is easier. A voicing pays for
//! - every fret of stretch beyond four between neighbouring played strings,
//! - 2 when it does not sound the root, tone 1 and one of tones 2 or 3,
//! - 0.5 per unplayed string,
//! - the average fret distance between neighbouring played strings.
//!
//! ## Example
//! ```rust
//! use fretwise::{search_voicings, DefinitionTable, Tuning};
//!
//! let voicings = search_voicings(DefinitionTable::builtin(), "major", &"C".parse().unwrap(), &Tuning::standard());
//! assert!(!voicings.is_empty());
//! assert!(voicings.windows(2).all(|w| w[0].difficulty <= w[1].difficulty));
//! ```

use serde::Serialize;

use crate::definitions::DefinitionTable;
use crate::pitch::{Note, PitchClass, PitchClassSet};
use crate::resolve::Fret;
use crate::tuning::Tuning;

/// Highest window anchor searched.
pub const MAX_BASE_POSITION: u8 = 15;

/// Frets above the anchor covered by the window.
const WINDOW_SPAN: u8 = 4;

/// Fret distance between neighbouring strings that costs nothing extra.
const COMFORTABLE_REACH: u8 = 4;

const MISSING_ESSENTIALS_PENALTY: f64 = 2.0;
const UNPLAYED_STRING_PENALTY: f64 = 0.5;

/// A chord shape found by [`search_voicings`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedVoicing {
    /// Window anchor fret the shape was found at.
    pub position: u8,
    /// One entry per string, lowest-pitched first.
    pub frets: Vec<Fret>,
    pub difficulty: f64,
}

impl ResolvedVoicing {
    /// Pitch classes sounded by the played strings.
    pub fn pitch_classes(&self, tuning: &Tuning) -> PitchClassSet {
        sounded(tuning, &self.frets)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Roles {
    root: bool,
    third: bool,
    fifth: bool,
}

impl Roles {
    fn complete(&self) -> bool {
        self.root && self.third && self.fifth
    }

    /// Roles actually heard: the root, tone 1 as the third, tone 2 or 3 as the fifth.
    fn sounded(tones: &[PitchClass], heard: &PitchClassSet) -> Self {
        let hears = |index: usize| tones.get(index).is_some_and(|pc| heard.contains(*pc));
        Roles {
            root: hears(0),
            third: hears(1),
            fifth: hears(2) || hears(3),
        }
    }
}

fn is_third(index: usize) -> bool {
    index == 1 || index == 2
}

fn is_fifth(index: usize) -> bool {
    index == 2 || index == 3
}

/// Search every window anchor and return the surviving voicings, easiest first.
///
/// Unknown ids give an empty list.
pub fn search_voicings(
    table: &DefinitionTable,
    id: &str,
    root: &Note,
    tuning: &Tuning,
) -> Vec<ResolvedVoicing> {
    let Some(definition) = table.lookup(id) else {
        log::warn!("voicing search: unknown chord '{}'", id);
        return Vec::new();
    };
    let tones = definition.ordered_pitch_classes(root);

    let mut voicings: Vec<ResolvedVoicing> = (0..=MAX_BASE_POSITION)
        .filter_map(|base| voicing_at(tuning, &tones, base))
        .collect();
    voicings.sort_by(|a, b| a.difficulty.total_cmp(&b.difficulty));

    log::debug!(
        "voicing search: {} voicings for {} {}",
        voicings.len(),
        root,
        definition.id
    );
    voicings
}

fn voicing_at(tuning: &Tuning, tones: &[PitchClass], base: u8) -> Option<ResolvedVoicing> {
    let low = base.saturating_sub(1);
    let high = base + WINDOW_SPAN;

    // Claims steer later strings toward missing roles; they are not proof a role sounds.
    let mut claimed = Roles::default();
    let frets: Vec<Fret> = tuning
        .strings()
        .iter()
        .map(|open| {
            let mut choice = None;
            for fret in low..=high {
                let pc = PitchClass::from_semitones(open.midi_or_default() + fret as i32);
                let Some(index) = tones.iter().position(|t| *t == pc) else {
                    continue;
                };
                if index == 0 && !claimed.root {
                    claimed.root = true;
                    choice = Some(fret);
                } else if choice.is_none() {
                    if is_third(index) && !claimed.third {
                        claimed.third = true;
                    } else if is_fifth(index) && !claimed.fifth {
                        claimed.fifth = true;
                    }
                    choice = Some(fret);
                }
            }
            choice
        })
        .collect();

    let heard = sounded(tuning, &frets);
    let roles = Roles::sounded(tones, &heard);
    if heard.len() < 3 || !roles.root {
        return None;
    }

    Some(ResolvedVoicing {
        position: base,
        difficulty: difficulty(&frets, roles),
        frets,
    })
}

fn sounded(tuning: &Tuning, frets: &[Fret]) -> PitchClassSet {
    tuning
        .strings()
        .iter()
        .zip(frets)
        .filter_map(|(open, fret)| {
            fret.map(|f| PitchClass::from_semitones(open.midi_or_default() + f as i32))
        })
        .collect()
}

fn difficulty(frets: &[Fret], roles: Roles) -> f64 {
    let played: Vec<u8> = frets.iter().flatten().copied().collect();
    let unplayed = frets.len() - played.len();

    let mut reach = 0u32;
    let mut total = 0u32;
    for pair in played.windows(2) {
        let distance = pair[0].abs_diff(pair[1]);
        total += distance as u32;
        if distance > COMFORTABLE_REACH {
            reach += (distance - COMFORTABLE_REACH) as u32;
        }
    }
    let average = total as f64 / played.len().saturating_sub(1).max(1) as f64;

    let mut score = reach as f64 + average + unplayed as f64 * UNPLAYED_STRING_PENALTY;
    if !roles.complete() {
        score += MISSING_ESSENTIALS_PENALTY;
    }
    (score * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note(s: &str) -> Note {
        s.parse().unwrap()
    }

    fn search(id: &str, root: &str) -> Vec<ResolvedVoicing> {
        search_voicings(DefinitionTable::builtin(), id, &note(root), &Tuning::standard())
    }

    #[test]
    fn test_open_c_shape_found_at_nut() {
        let voicings = search("major", "C");
        let open = voicings
            .iter()
            .find(|v| v.position == 0)
            .expect("window at the nut should survive");
        assert_eq!(
            open.frets,
            vec![Some(0), Some(3), Some(2), Some(0), Some(1), Some(0)]
        );
        // stretches 3+1+2+1+1 over five gaps
        assert_eq!(open.difficulty, 1.6);
    }

    #[test]
    fn test_dominant_seventh_takes_lowest_tone_per_string() {
        let voicings = search("7", "C");
        let v = voicings
            .iter()
            .find(|v| v.position == 2)
            .expect("window at fret 2 should survive");
        assert_eq!(
            v.frets,
            vec![Some(3), Some(3), Some(2), Some(3), Some(1), Some(3)]
        );
        // G C E Bb C G: complete, stretches 0+1+1+2+2 over five gaps
        assert_eq!(v.difficulty, 1.2);
    }

    #[test]
    fn test_missing_third_is_always_penalized() {
        let table = DefinitionTable::builtin();
        let tuning = Tuning::standard();
        for id in ["major", "minor", "7", "maj7", "min7"] {
            for root in ["C", "D", "E", "F", "G", "A", "B"] {
                let tones = table.lookup(id).unwrap().ordered_pitch_classes(&note(root));
                for v in search(id, root) {
                    if !v.pitch_classes(&tuning).contains(tones[1]) {
                        assert!(
                            v.difficulty >= MISSING_ESSENTIALS_PENALTY,
                            "{} {} at {}: {:?}",
                            root,
                            id,
                            v.position,
                            v.frets
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_roles_come_from_sounded_tones() {
        let tones: Vec<PitchClass> = ["C", "E", "G", "Bb"]
            .iter()
            .map(|n| note(n).pitch_class())
            .collect();
        let no_third: PitchClassSet = ["C", "G", "Bb"].iter().map(|n| note(n).pitch_class()).collect();
        assert!(!Roles::sounded(&tones, &no_third).complete());

        let shell: PitchClassSet = ["C", "E", "Bb"].iter().map(|n| note(n).pitch_class()).collect();
        assert!(Roles::sounded(&tones, &shell).complete());
    }

    #[test]
    fn test_c_major_contains_triad() {
        let tuning = Tuning::standard();
        let voicings = search("major", "C");
        let triad: PitchClassSet = ["C", "E", "G"].iter().map(|n| note(n).pitch_class()).collect();
        assert!(voicings
            .iter()
            .any(|v| v.pitch_classes(&tuning) == triad && v.difficulty >= 0.0));
    }

    #[test]
    fn test_sorted_by_difficulty() {
        for (id, root) in [("major", "C"), ("min7", "A"), ("7", "E"), ("dim7", "B")] {
            let voicings = search(id, root);
            assert!(voicings
                .windows(2)
                .all(|w| w[0].difficulty <= w[1].difficulty));
            assert!(voicings.iter().all(|v| v.difficulty >= 0.0));
        }
    }

    #[test]
    fn test_one_voicing_per_window_at_most() {
        let voicings = search("maj7", "F");
        assert!(voicings.len() <= 16);
        let mut positions: Vec<u8> = voicings.iter().map(|v| v.position).collect();
        positions.sort_unstable();
        positions.dedup();
        assert_eq!(positions.len(), voicings.len());
    }

    #[test]
    fn test_frets_stay_in_window() {
        for v in search("min7", "D") {
            let low = v.position.saturating_sub(1);
            for fret in v.frets.iter().flatten() {
                assert!(*fret >= low && *fret <= v.position + 4, "{:?}", v);
            }
        }
    }

    #[test]
    fn test_survivors_have_root_and_three_tones() {
        let tuning = Tuning::standard();
        let root = note("G").pitch_class();
        for v in search("9", "G") {
            let sounded = v.pitch_classes(&tuning);
            assert!(sounded.len() >= 3);
            assert!(sounded.contains(root));
        }
    }

    #[test]
    fn test_aliases_match_canonical() {
        assert_eq!(search("M", "D"), search("major", "D"));
        assert_eq!(search("m7", "E"), search("min7", "E"));
    }

    #[test]
    fn test_unknown_chord_is_empty() {
        assert!(search("not-a-chord", "C").is_empty());
    }

    #[test]
    fn test_difficulty_penalties() {
        // two gaps of 5: reach 1+1, average 5, one unplayed string, all roles present
        let roles = Roles {
            root: true,
            third: true,
            fifth: true,
        };
        assert_eq!(difficulty(&[Some(0), Some(5), Some(10), None], roles), 7.5);
        // missing third adds 2
        let partial = Roles {
            third: false,
            ..roles
        };
        assert_eq!(difficulty(&[Some(3), Some(3)], partial), 2.0);
        // a single played string divides by one
        assert_eq!(difficulty(&[Some(7)], roles), 0.0);
    }
}
