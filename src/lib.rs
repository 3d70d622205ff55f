//! # Metrostop
//!
//! Metro-map timeline layout for political speech sentiment data: temporal
//! binning against an irregular boundary set, per-speaker aggregation, and
//! collision-free stop placement along a shared axis.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use metrostop::{BinBoundaries, LayoutConfig, LinearScale, SpeechRecord, TimelinePipeline};
//!
//! // Bin boundaries, usually derived from a companion summary table
//! let boundaries = BinBoundaries::new(vec![
//!     NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
//! ]).unwrap();
//!
//! let records = vec![SpeechRecord {
//!     speaker: "Jane Citizen".to_string(),
//!     date: NaiveDate::from_ymd_opt(2010, 6, 15).unwrap(),
//!     diff: 1.5,
//!     text: "for the record".to_string(),
//! }];
//!
//! // Records flow through assignment, aggregation and stop layout
//! let pipeline = TimelinePipeline::new(boundaries, LayoutConfig::default());
//! let scale = LinearScale::symmetric(2.0, (0.0, 600.0));
//! let layout = pipeline.run(&records, &scale).unwrap();
//!
//! assert_eq!(layout.slot_count(), 1);
//! ```
//!
//! ## Algorithm
//!
//! 1. **Assignment**: each record lands in the earliest boundary on or after
//!    its date; a record past the last boundary is an error, never dropped.
//! 2. **Aggregation**: per (speaker, bin) mean/min/max/count with the first
//!    extremal record kept on ties; insertion order fixes the summation
//!    order, so reruns are bit-identical.
//! 3. **Layout**: stops sharing a bin are pushed apart outward-only, one
//!    separation diameter plus an epsilon per occupied position.
//!
//! Rendering stays outside this crate: the computed layout streams into a
//! [`LayoutSink`] implemented by the drawing layer.

pub mod aggregate;
pub mod binning;
pub mod chart;
pub mod errors;
pub mod layout;
pub mod loading;
pub mod pipeline;
pub mod scale;
pub mod types;

// Re-export commonly used types for convenience
pub use aggregate::{Aggregator, GroupStats};
pub use binning::BinBoundaries;
pub use chart::{ChartScaffold, GuideLines, SpeakerPath};
pub use errors::{Result, TimelineError};
pub use layout::{COLLISION_EPSILON, LayoutConfig, StopLane};
pub use pipeline::{LayoutSink, SpeechAggregate, TimelineLayout, TimelinePipeline};
pub use scale::{LinearScale, Scale, TimeAxis, ceil_to_year, floor_to_year};
pub use types::{
    BinSummary, ElectionPeriod, PeriodBand, SpeakerSpan, SpeechRecord, StopSlot, TermPeriod,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!NAME.is_empty());
        assert!(!DESCRIPTION.is_empty());
    }

    #[test]
    fn test_types_export() {
        let scale = LinearScale::symmetric(1.0, (0.0, 100.0));
        assert_eq!(scale.project(0.0), 50.0);
    }
}
