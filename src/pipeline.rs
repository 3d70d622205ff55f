//! Three-stage pipeline from raw records to a renderer-ready layout
//!
//! Stages run in a fixed order: interval assignment, aggregation, stop
//! layout. State lives in one owned accumulator built here and discarded
//! after layout; nothing global. Assignment and aggregation are sequential
//! so the summation order (and with it every mean) is reproducible; layout
//! fans out across bins with rayon because bins never interact, while
//! placement inside a bin stays strictly sequential.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::debug;

use crate::aggregate::Aggregator;
use crate::binning::BinBoundaries;
use crate::errors::Result;
use crate::layout::{LayoutConfig, StopLane};
use crate::scale::Scale;
use crate::types::{BinSummary, SpeakerSpan, SpeechRecord, StopSlot};

/// Sink receiving the computed slot/summary stream.
///
/// The external renderer implements this; the core never draws anything.
pub trait LayoutSink {
    /// Called once per bin before its slots, ascending by bin date.
    fn enter_bin(&mut self, _bin: NaiveDate, _slot_count: usize) {}

    /// Called for every slot, descending by position within its bin.
    fn stop(&mut self, slot: &StopSlot, summary: &BinSummary);
}

/// Aggregation output: the input to the layout stage.
#[derive(Debug, Clone)]
pub struct SpeechAggregate {
    summaries: Vec<BinSummary>,
    spans: Vec<SpeakerSpan>,
}

impl SpeechAggregate {
    /// Summaries in first-appearance order of their (speaker, bin) group.
    pub fn summaries(&self) -> &[BinSummary] {
        &self.summaries
    }

    /// Speaker spans in display order.
    pub fn spans(&self) -> &[SpeakerSpan] {
        &self.spans
    }

    /// Largest absolute mean, the extent of a symmetric diff scale.
    pub fn max_abs_mean(&self) -> f64 {
        self.summaries
            .iter()
            .map(|s| s.mean.abs())
            .fold(0.0, f64::max)
    }
}

/// Fully computed layout handed to the renderer.
#[derive(Debug, Clone)]
pub struct TimelineLayout {
    summaries: Vec<BinSummary>,
    spans: Vec<SpeakerSpan>,
    lanes: BTreeMap<NaiveDate, StopLane>,
    summary_index: BTreeMap<(String, NaiveDate), usize>,
}

impl TimelineLayout {
    /// Summaries in first-appearance order of their (speaker, bin) group.
    pub fn summaries(&self) -> &[BinSummary] {
        &self.summaries
    }

    /// Speaker spans in display order.
    pub fn speaker_spans(&self) -> &[SpeakerSpan] {
        &self.spans
    }

    /// Speaker names in display order.
    pub fn speaker_order(&self) -> Vec<&str> {
        self.spans.iter().map(|s| s.speaker.as_str()).collect()
    }

    /// Lanes keyed by bin date, ascending.
    pub fn lanes(&self) -> impl Iterator<Item = (&NaiveDate, &StopLane)> {
        self.lanes.iter()
    }

    pub fn lane(&self, bin: NaiveDate) -> Option<&StopLane> {
        self.lanes.get(&bin)
    }

    /// Summary backing a given slot.
    pub fn summary_for(&self, slot: &StopSlot) -> Option<&BinSummary> {
        self.summary_index
            .get(&(slot.speaker.clone(), slot.bin))
            .map(|&idx| &self.summaries[idx])
    }

    pub fn slot_count(&self) -> usize {
        self.lanes.values().map(StopLane::len).sum()
    }

    /// Largest number of stops sharing one bin; drives the width of the
    /// shared timeline lane.
    pub fn max_stops_per_bin(&self) -> usize {
        self.lanes.values().map(StopLane::len).max().unwrap_or(0)
    }

    /// Stream every slot with its backing summary into a sink, bins
    /// ascending, slots descending by position within each bin.
    pub fn emit(&self, sink: &mut dyn LayoutSink) {
        for (bin, lane) in &self.lanes {
            sink.enter_bin(*bin, lane.len());
            for slot in lane.slots() {
                let summary = self
                    .summary_for(slot)
                    .expect("every slot derives from a summary");
                sink.stop(slot, summary);
            }
        }
    }
}

/// Owned pipeline configuration: boundaries plus layout parameters.
#[derive(Debug, Clone)]
pub struct TimelinePipeline {
    boundaries: BinBoundaries,
    config: LayoutConfig,
}

impl TimelinePipeline {
    pub fn new(boundaries: BinBoundaries, config: LayoutConfig) -> Self {
        Self { boundaries, config }
    }

    pub fn boundaries(&self) -> &BinBoundaries {
        &self.boundaries
    }

    /// Stages one and two: assign every record to its bin, then aggregate.
    ///
    /// Fails on the first record dated past the last boundary.
    pub fn aggregate(&self, records: &[SpeechRecord]) -> Result<SpeechAggregate> {
        let mut aggregator = Aggregator::new();
        for record in records {
            let bin = self.boundaries.assign(record.date)?;
            aggregator.add(bin, record);
        }
        let summaries = aggregator.summaries()?;
        let spans = aggregator.speaker_spans();
        debug!(
            records = records.len(),
            groups = summaries.len(),
            speakers = spans.len(),
            "aggregation complete"
        );
        Ok(SpeechAggregate { summaries, spans })
    }

    /// Stage three: place every summary's stop, bins in parallel.
    ///
    /// Within a bin, placement order is the first-appearance order of the
    /// (speaker, bin) group in the record stream.
    pub fn layout<S: Scale + Sync>(
        &self,
        aggregate: SpeechAggregate,
        scale: &S,
    ) -> TimelineLayout {
        let SpeechAggregate { summaries, spans } = aggregate;

        let mut per_bin: BTreeMap<NaiveDate, Vec<&BinSummary>> = BTreeMap::new();
        for summary in &summaries {
            per_bin.entry(summary.bin).or_default().push(summary);
        }

        let lanes: BTreeMap<NaiveDate, StopLane> = per_bin
            .into_iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(bin, bin_summaries)| {
                let mut lane = StopLane::new(bin, self.config.clone());
                for summary in bin_summaries {
                    lane.place(&summary.speaker, scale.project(summary.mean));
                }
                (bin, lane)
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect();

        let summary_index = summaries
            .iter()
            .enumerate()
            .map(|(idx, s)| ((s.speaker.clone(), s.bin), idx))
            .collect();

        debug!(
            bins = lanes.len(),
            slots = summaries.len(),
            "layout complete"
        );
        TimelineLayout {
            summaries,
            spans,
            lanes,
            summary_index,
        }
    }

    /// All three stages in order.
    pub fn run<S: Scale + Sync>(
        &self,
        records: &[SpeechRecord],
        scale: &S,
    ) -> Result<TimelineLayout> {
        let aggregate = self.aggregate(records)?;
        Ok(self.layout(aggregate, scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TimelineError;
    use crate::scale::LinearScale;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(speaker: &str, d: NaiveDate, diff: f64) -> SpeechRecord {
        SpeechRecord {
            speaker: speaker.to_string(),
            date: d,
            diff,
            text: format!("{speaker} on {d}"),
        }
    }

    fn pipeline() -> TimelinePipeline {
        let boundaries = BinBoundaries::new(vec![
            date(2010, 1, 1),
            date(2011, 1, 1),
            date(2012, 1, 1),
        ])
        .unwrap();
        TimelinePipeline::new(boundaries, LayoutConfig::default())
    }

    fn scale() -> LinearScale {
        LinearScale::symmetric(5.0, (0.0, 600.0))
    }

    #[test]
    fn record_past_last_boundary_fails_aggregation() {
        let err = pipeline()
            .aggregate(&[record("A", date(2013, 3, 3), 1.0)])
            .unwrap_err();
        assert!(matches!(err, TimelineError::UnassignedRecord { .. }));
    }

    #[test]
    fn run_places_one_slot_per_group() {
        let records = vec![
            record("A", date(2010, 3, 1), 1.0),
            record("A", date(2010, 9, 1), 3.0),
            record("B", date(2010, 4, 1), -2.0),
            record("A", date(2011, 2, 1), 2.0),
        ];
        let layout = pipeline().run(&records, &scale()).unwrap();
        // groups: (A, 2011), (B, 2011), (A, 2012)
        assert_eq!(layout.slot_count(), 3);
        assert_eq!(layout.lane(date(2011, 1, 1)).unwrap().len(), 2);
        assert_eq!(layout.lane(date(2012, 1, 1)).unwrap().len(), 1);
        assert_eq!(layout.max_stops_per_bin(), 2);
    }

    #[test]
    fn reruns_are_bit_identical() {
        let records = vec![
            record("A", date(2010, 3, 1), 0.31),
            record("B", date(2010, 4, 1), -0.87),
            record("C", date(2010, 5, 1), 0.29),
            record("A", date(2011, 6, 1), 1.43),
            record("B", date(2011, 7, 1), -0.02),
        ];
        let pipe = pipeline();
        let s = scale();
        let first = pipe.run(&records, &s).unwrap();
        let second = pipe.run(&records, &s).unwrap();
        assert_eq!(first.summaries(), second.summaries());
        let first_slots: Vec<&StopSlot> =
            first.lanes().flat_map(|(_, lane)| lane.slots()).collect();
        let second_slots: Vec<&StopSlot> =
            second.lanes().flat_map(|(_, lane)| lane.slots()).collect();
        assert_eq!(first_slots, second_slots);
    }

    #[test]
    fn sink_receives_every_slot_with_its_summary() {
        struct Recorder {
            bins: Vec<NaiveDate>,
            pairs: Vec<(String, NaiveDate, f64)>,
        }
        impl LayoutSink for Recorder {
            fn enter_bin(&mut self, bin: NaiveDate, _slot_count: usize) {
                self.bins.push(bin);
            }
            fn stop(&mut self, slot: &StopSlot, summary: &BinSummary) {
                assert_eq!(slot.speaker, summary.speaker);
                assert_eq!(slot.bin, summary.bin);
                self.pairs
                    .push((slot.speaker.clone(), slot.bin, summary.mean));
            }
        }

        let records = vec![
            record("A", date(2010, 3, 1), 1.0),
            record("B", date(2010, 4, 1), 1.1),
            record("A", date(2011, 2, 1), -1.0),
        ];
        let layout = pipeline().run(&records, &scale()).unwrap();
        let mut recorder = Recorder {
            bins: Vec::new(),
            pairs: Vec::new(),
        };
        layout.emit(&mut recorder);
        assert_eq!(recorder.bins, vec![date(2011, 1, 1), date(2012, 1, 1)]);
        assert_eq!(recorder.pairs.len(), 3);
    }

    #[test]
    fn speaker_order_follows_first_dates() {
        let records = vec![
            record("Second", date(2010, 6, 1), 0.0),
            record("First", date(2010, 2, 1), 0.0),
        ];
        let layout = pipeline().run(&records, &scale()).unwrap();
        assert_eq!(layout.speaker_order(), vec!["First", "Second"]);
    }

    #[test]
    fn close_means_in_one_bin_are_separated() {
        let records = vec![
            record("A", date(2010, 3, 1), 0.50),
            record("B", date(2010, 4, 1), 0.51),
        ];
        let layout = pipeline().run(&records, &scale()).unwrap();
        let lane = layout.lane(date(2011, 1, 1)).unwrap();
        let gap = (lane.slots()[0].position - lane.slots()[1].position).abs();
        assert!(gap >= 2.0 * 4.0);
    }
}
