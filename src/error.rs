//! # Error Types
//!
//! Two kinds of failure live here.
//!
//! [`FretError`] is returned wherever text is parsed: note names, intervals, tunings,
//! the definition catalog and settings files. These are real errors and propagate
//! with `?`.
//!
//! [`Unplayed`] is not an error in the usual sense. The resolvers never fail as a
//! whole: a string that cannot be resolved is simply left unplayed. The detailed
//! resolver variants report *why* through this type so callers can tell a muted
//! template string from a pitch that was out of reach.
//!
//! ## Usage
//! ```rust
//! use fretwise::{FretError, Tuning};
//!
//! match Tuning::parse("E2,A2,X9") {
//!     Ok(tuning) => println!("{} strings", tuning.len()),
//!     Err(FretError::InvalidNote(name)) => eprintln!("bad note {}", name),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FretError {
    /// A note name could not be parsed.
    ///
    /// # Example
    /// ```
    /// # use fretwise::FretError;
    /// let err = FretError::InvalidNote("H2".to_string());
    /// assert_eq!(err.to_string(), "Invalid note: H2");
    /// ```
    #[error("Invalid note: {0}")]
    InvalidNote(String),

    /// An interval in tonal ("3m") or degree ("b3") notation could not be parsed.
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// A tuning string was empty or contained an unusable note.
    ///
    /// # Example
    /// ```
    /// # use fretwise::FretError;
    /// let err = FretError::InvalidTuning("tuning must contain at least one string".to_string());
    /// assert_eq!(err.to_string(), "Invalid tuning: tuning must contain at least one string");
    /// ```
    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),

    /// The chord/scale catalog could not be loaded.
    #[error("Invalid definition '{id}': {message}")]
    DefinitionError { id: String, message: String },

    /// A settings file was malformed or held out-of-range values.
    #[error("Invalid settings: {0}")]
    SettingsError(String),

    /// Tablature could not be (de)serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a string came back unplayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unplayed {
    /// The chord/scale id (after alias normalization) is not in the table.
    UnknownDefinition(String),
    /// The definition exists but carries no hand-shape templates.
    NoTemplates,
    /// The template mutes this string, or has no entry for it.
    Muted,
    /// Transposing the template would put the string below the nut.
    BelowNut { fret: i32 },
    /// No fret up to `max_fret` yields a chord tone on this string.
    OutOfRange { max_fret: u8 },
    /// An open string dropped when the shape was moved to `position`.
    OpenString { position: u8 },
}

impl std::fmt::Display for Unplayed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unplayed::UnknownDefinition(id) => write!(f, "unknown chord or scale '{}'", id),
            Unplayed::NoTemplates => write!(f, "no hand shapes defined"),
            Unplayed::Muted => write!(f, "string muted in hand shape"),
            Unplayed::BelowNut { fret } => write!(f, "fret {} is below the nut", fret),
            Unplayed::OutOfRange { max_fret } => {
                write!(f, "no chord tone within {} frets", max_fret)
            }
            Unplayed::OpenString { position } => {
                write!(f, "open string dropped at position {}", position)
            }
        }
    }
}
