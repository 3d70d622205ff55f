//! Error types for timeline computation

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Errors that can occur while computing a timeline layout
#[derive(Error, Debug)]
pub enum TimelineError {
    /// A record is dated after every bin boundary and has no enclosing bin.
    #[error("record dated {date} falls after the last bin boundary {last_boundary}")]
    UnassignedRecord {
        date: NaiveDate,
        last_boundary: NaiveDate,
    },

    /// Statistics were requested over a group with no records.
    #[error("empty group for speaker {speaker:?} in bin {bin}")]
    EmptyGroup { speaker: String, bin: NaiveDate },

    #[error("bin boundaries must contain at least one date")]
    EmptyBoundaries,

    #[error("invalid data: {message}")]
    InvalidData { message: String },

    #[error("unparseable date {value:?}, expected format {format}")]
    InvalidDate { value: String, format: &'static str },

    #[error("file I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV parsing error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("JSON parsing error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}
