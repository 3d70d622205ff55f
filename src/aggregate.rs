//! Per-(speaker, bin) aggregation over bin-tagged speech records
//!
//! Accumulation is strictly insertion-ordered: the running sum defines the
//! summation order of the mean, and strict comparisons keep the first
//! extremal record on ties, so recomputing from the same input yields
//! bit-identical summaries.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::errors::{Result, TimelineError};
use crate::types::{BinSummary, SpeakerSpan, SpeechRecord};

/// Streaming accumulator for a single (speaker, bin) group.
#[derive(Debug, Clone)]
pub struct GroupStats {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
    highest: Option<SpeechRecord>,
    lowest: Option<SpeechRecord>,
}

impl Default for GroupStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupStats {
    pub fn new() -> Self {
        Self {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            highest: None,
            lowest: None,
        }
    }

    /// Fold one record into the group.
    pub fn update(&mut self, record: &SpeechRecord) {
        self.sum += record.diff;
        self.count += 1;
        self.min = self.min.min(record.diff);
        self.max = self.max.max(record.diff);
        // strict comparisons keep the first extremal on ties
        if self.highest.as_ref().is_none_or(|h| record.diff > h.diff) {
            self.highest = Some(record.clone());
        }
        if self.lowest.as_ref().is_none_or(|l| record.diff < l.diff) {
            self.lowest = Some(record.clone());
        }
    }

    /// Combine two accumulators.
    ///
    /// `self` is treated as the earlier chunk: its extremal records win ties
    /// against `other`'s.
    pub fn merge(mut self, other: Self) -> Self {
        self.sum += other.sum;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        if let Some(h) = other.highest {
            if self.highest.as_ref().is_none_or(|own| h.diff > own.diff) {
                self.highest = Some(h);
            }
        }
        if let Some(l) = other.lowest {
            if self.lowest.as_ref().is_none_or(|own| l.diff < own.diff) {
                self.lowest = Some(l);
            }
        }
        self
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Snapshot the group into a summary.
    ///
    /// An empty group means the caller never ran assignment before
    /// aggregation; that is a bug, not a recoverable state.
    pub fn summarize(&self, speaker: &str, bin: NaiveDate) -> Result<BinSummary> {
        if self.count == 0 {
            return Err(TimelineError::EmptyGroup {
                speaker: speaker.to_string(),
                bin,
            });
        }
        Ok(BinSummary {
            speaker: speaker.to_string(),
            bin,
            mean: self.sum / self.count as f64,
            min: self.min,
            max: self.max,
            count: self.count,
            highest: self.highest.clone().expect("non-empty group has a highest"),
            lowest: self.lowest.clone().expect("non-empty group has a lowest"),
        })
    }
}

#[derive(Debug, Clone)]
struct SpanAcc {
    first_date: NaiveDate,
    last_date: NaiveDate,
    speech_count: usize,
    arrival: usize,
}

/// Groups bin-tagged records by (speaker, bin) and tracks per-speaker spans.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    groups: BTreeMap<(String, NaiveDate), GroupStats>,
    /// Group keys in first-appearance order; defines summary output order
    order: Vec<(String, NaiveDate)>,
    spans: BTreeMap<String, SpanAcc>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record, already tagged with its bin, into the aggregate.
    pub fn add(&mut self, bin: NaiveDate, record: &SpeechRecord) {
        let key = (record.speaker.clone(), bin);
        if !self.groups.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.groups.entry(key).or_default().update(record);

        let arrival = self.spans.len();
        self.spans
            .entry(record.speaker.clone())
            .and_modify(|span| {
                span.first_date = span.first_date.min(record.date);
                span.last_date = span.last_date.max(record.date);
                span.speech_count += 1;
            })
            .or_insert(SpanAcc {
                first_date: record.date,
                last_date: record.date,
                speech_count: 1,
                arrival,
            });
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// One summary per non-empty (speaker, bin) group, in first-appearance
    /// order of the group in the record stream.
    pub fn summaries(&self) -> Result<Vec<BinSummary>> {
        self.order
            .iter()
            .map(|key| {
                let stats = self.groups.get(key).expect("ordered keys track groups");
                stats.summarize(&key.0, key.1)
            })
            .collect()
    }

    /// Per-speaker spans in display order: ascending first date, ties broken
    /// by first appearance in the input.
    pub fn speaker_spans(&self) -> Vec<SpeakerSpan> {
        let mut spans: Vec<(&String, &SpanAcc)> = self.spans.iter().collect();
        spans.sort_by_key(|(_, acc)| (acc.first_date, acc.arrival));
        spans
            .into_iter()
            .map(|(speaker, acc)| SpeakerSpan {
                speaker: speaker.clone(),
                first_date: acc.first_date,
                last_date: acc.last_date,
                speech_count: acc.speech_count,
            })
            .collect()
    }
}
