//! Core data types shared across the timeline pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One sentiment-scored speech snippet.
///
/// Records are immutable once loaded; every derived structure is recomputed
/// wholesale from them rather than mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRecord {
    /// Full name of the speaker
    pub speaker: String,
    /// Day the speech was delivered
    pub date: NaiveDate,
    /// Signed sentiment difference score for the snippet
    pub diff: f64,
    /// Snippet text surfaced by the tooltip layer
    pub text: String,
}

/// Summary statistics for one (speaker, bin) group.
///
/// `highest` and `lowest` always belong to the same group the statistics
/// were computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinSummary {
    pub speaker: String,
    /// Upper boundary of the enclosing interval
    pub bin: NaiveDate,
    /// Arithmetic mean of `diff`, accumulated in insertion order
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    /// Snippet with the highest diff in the group (first on ties)
    pub highest: SpeechRecord,
    /// Snippet with the lowest diff in the group (first on ties)
    pub lowest: SpeechRecord,
}

/// A finalized stop placement within one bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopSlot {
    pub speaker: String,
    pub bin: NaiveDate,
    /// Raw scaled position before collision resolution
    pub axis_value: f64,
    /// Final position after outward pushes and clamping, if any
    pub position: f64,
    /// True when the slot hit the axis bound and was clamped
    pub clamped: bool,
}

impl StopSlot {
    /// Displacement applied by collision resolution
    pub fn offset(&self) -> f64 {
        self.position - self.axis_value
    }
}

/// Per-speaker date extent over the loaded records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerSpan {
    pub speaker: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub speech_count: usize,
}

/// An election campaign period: writ issue through polling day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionPeriod {
    pub issue_of_writ: NaiveDate,
    pub polling_day: NaiveDate,
}

/// A ministerial term, keyed by the holder's short name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermPeriod {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A background band clipped to the time-axis domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodBand {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Index into the speaker display order when the band belongs to a speaker
    pub speaker_order: Option<usize>,
}
