//! Error types for the mtp-retrieval crate.
use std::path::PathBuf;
use thiserror::Error;

/// Error type for the crate.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// A retrieval coefficient file could not be opened or read.
    #[error("Unable to read {}: {source}", path.display())]
    Io {
        /// The file or directory that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The contents of a retrieval coefficient file do not match the binary layout.
    #[error("Malformed retrieval coefficient file {}: {message}", path.display())]
    Format {
        /// The offending file.
        path: PathBuf,
        /// What went wrong while decoding.
        message: String,
    },

    /// A file has no flight levels at all.
    #[error("RCF {id} has no flight levels.")]
    NoFlightLevels {
        /// Id of the file.
        id: String,
    },

    /// The flight level altitudes are not strictly decreasing.
    #[error("RCF {id} flight levels are not strictly decreasing: {levels:?}")]
    FlightLevelOrder {
        /// Id of the file.
        id: String,
        /// The flight level altitudes found in the file, km.
        levels: Vec<f64>,
    },

    /// The flight level altitudes do not match the reference grid.
    #[error("RCF {id} flight levels {found:?} do not match the expected levels {expected:?}")]
    FlightLevelMismatch {
        /// Id of the file.
        id: String,
        /// The reference grid, km.
        expected: Vec<f64>,
        /// The grid in the file, km.
        found: Vec<f64>,
    },

    /// A set member uses a different flight level grid than the rest of the set.
    #[error("RCF {id} flight levels differ from the rest of the set.")]
    InconsistentFlightLevels {
        /// Id of the file.
        id: String,
    },

    /// A set member has a different number of observables or retrieval levels.
    #[error("RCF {id} observable or retrieval level counts differ from the rest of the set.")]
    InconsistentDimensions {
        /// Id of the file.
        id: String,
    },

    /// The set has no retrieval coefficient files in it.
    #[error("No retrieval coefficient files in the set.")]
    EmptySet,

    /// Requested files were not found in the directory.
    #[error("Requested RCFs not found: {}", missing.join(", "))]
    MissingIds {
        /// Every requested id that could not be located.
        missing: Vec<String>,
    },

    /// The aircraft altitude is missing, not finite, or not above the ground.
    #[error("Invalid aircraft altitude {0} km, a positive altitude is required.")]
    InvalidAltitude(f64),

    /// An array is too long for its 16 bit count field.
    #[error("Cannot write {len} values for {field}, the count field holds at most 65535.")]
    CountOverflow {
        /// Name of the array.
        field: &'static str,
        /// Its length.
        len: usize,
    },

    /// The scan has the wrong number of brightness temperatures.
    #[error("Scan has {found} brightness temperatures, expected {expected}.")]
    ScanLength {
        /// Number of observables the coefficient files use.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },
}

/// Shorthand for results.
pub type Result<T> = ::std::result::Result<T, RetrievalError>;
