//! # Fret Position Resolvers
//!
//! Turn an abstract chord/scale (id + root) into one fret per string.
//!
//! ## Sub-modules
//! - `fixed` - transposes a stored hand shape by a uniform semitone shift
//! - `optimal` - searches each string for the nearest chord tone, no template needed
//!
//! ## Failure Semantics
//! Resolution never fails as a whole. Every string resolves to either a fret or an
//! [`Unplayed`] reason; the plain entry points collapse the reason to `None`:
//!
//! ```rust
//! use fretwise::{resolve_fixed_positions, DefinitionTable, Tuning};
//!
//! let table = DefinitionTable::builtin();
//! let tuning = Tuning::standard();
//! let frets = resolve_fixed_positions(table, "nope", &"C".parse().unwrap(), &tuning, 1, &"C".parse().unwrap());
//! assert!(frets.iter().all(Option::is_none));
//! ```
//!
//! Strings are indexed lowest-pitched first, matching [`crate::tuning::Tuning`].

mod fixed;
mod optimal;

use crate::error::Unplayed;

pub use fixed::{resolve_fixed_positions, resolve_fixed_positions_detailed, REFERENCE_ROOT};
pub use optimal::{
    resolve_optimal_positions, resolve_optimal_positions_detailed, DEFAULT_MAX_FRET,
};

/// A resolved string: `Some(fret)` or not played.
pub type Fret = Option<u8>;

/// A resolved string with the reason it is unplayed, if it is.
pub type StringResolution = Result<u8, Unplayed>;

/// Collapse detailed resolutions to plain frets.
pub fn to_frets(resolutions: &[StringResolution]) -> Vec<Fret> {
    resolutions.iter().map(|r| r.as_ref().ok().copied()).collect()
}

/// Render frets the way chord charts write them: `"x32010"`, or dash separated
/// once any fret needs two digits (`"8-10-10-9-8-8"`).
pub fn format_frets(frets: &[Fret]) -> String {
    let parts: Vec<String> = frets
        .iter()
        .map(|f| match f {
            Some(fret) => fret.to_string(),
            None => "x".to_string(),
        })
        .collect();
    if parts.iter().any(|p| p.len() > 1) {
        parts.join("-")
    } else {
        parts.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_frets() {
        assert_eq!(
            format_frets(&[None, Some(3), Some(2), Some(0), Some(1), Some(0)]),
            "x32010"
        );
        assert_eq!(
            format_frets(&[Some(8), Some(10), Some(10), Some(9), Some(8), Some(8)]),
            "8-10-10-9-8-8"
        );
    }

    #[test]
    fn test_to_frets() {
        let detailed = vec![Ok(3), Err(Unplayed::Muted), Ok(0)];
        assert_eq!(to_frets(&detailed), vec![Some(3), None, Some(0)]);
    }
}
