//! Chart scaffolding derived from the computed layout
//!
//! Everything here is data for the renderer: quantile guide lines over the
//! summary means, background period bands clipped to the axis domain, and
//! the per-speaker stop paths. No drawing happens in this crate.

use std::collections::HashMap;

use serde::Serialize;

use crate::pipeline::TimelineLayout;
use crate::scale::TimeAxis;
use crate::types::{ElectionPeriod, PeriodBand, StopSlot, TermPeriod};

/// Quantile markers over the distribution of all summary means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuideLines {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl GuideLines {
    /// Compute the five guides from a set of means. Empty input has no
    /// guides.
    pub fn from_means(means: &[f64]) -> Option<Self> {
        if means.is_empty() {
            return None;
        }
        let mut sorted = means.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).expect("means are never NaN"));
        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Linear-interpolation quantile over sorted values (the d3.quantile rule).
fn quantile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (h - lo as f64)
}

/// One speaker's stops ordered ascending by bin: the polyline the renderer
/// draws through them.
#[derive(Debug, Clone, Serialize)]
pub struct SpeakerPath {
    pub speaker: String,
    pub points: Vec<StopSlot>,
}

impl SpeakerPath {
    /// A single-stop path is drawn as a short dash rather than a curve.
    pub fn is_single_stop(&self) -> bool {
        self.points.len() == 1
    }
}

/// Renderer-facing scaffold assembled from the layout and companion data.
#[derive(Debug, Clone, Serialize)]
pub struct ChartScaffold {
    pub axis: TimeAxis,
    pub guides: Option<GuideLines>,
    pub bands: Vec<PeriodBand>,
    pub paths: Vec<SpeakerPath>,
    /// Largest number of stops sharing one bin
    pub lane_width: usize,
}

impl ChartScaffold {
    /// Assemble the scaffold.
    ///
    /// `names` maps a term holder's short name to the full speaker name so
    /// term bands can carry their holder's display-order index; terms with
    /// no matching speaker keep `speaker_order: None`.
    pub fn assemble(
        layout: &TimelineLayout,
        axis: TimeAxis,
        elections: &[ElectionPeriod],
        terms: &[TermPeriod],
        names: &HashMap<String, String>,
    ) -> Self {
        let speaker_order = layout.speaker_order();
        let domain = axis.domain();

        let mut bands = Vec::new();
        for term in terms {
            let order = names.get(&term.name).and_then(|full| {
                speaker_order.iter().position(|speaker| *speaker == full.as_str())
            });
            if let Some((start, end)) = clip(term.start_date, term.end_date, domain) {
                bands.push(PeriodBand {
                    label: term.name.clone(),
                    start,
                    end,
                    speaker_order: order,
                });
            }
        }
        for election in elections {
            if let Some((start, end)) =
                clip(election.issue_of_writ, election.polling_day, domain)
            {
                bands.push(PeriodBand {
                    label: format!("{} election", election.polling_day.format("%Y")),
                    start,
                    end,
                    speaker_order: None,
                });
            }
        }

        let paths = speaker_order
            .iter()
            .map(|speaker| {
                let points: Vec<StopSlot> = layout
                    .lanes()
                    .flat_map(|(_, lane)| lane.slots())
                    .filter(|slot| slot.speaker == *speaker)
                    .cloned()
                    .collect();
                SpeakerPath {
                    speaker: (*speaker).to_string(),
                    points,
                }
            })
            .collect();

        let means: Vec<f64> = layout.summaries().iter().map(|s| s.mean).collect();

        Self {
            axis,
            guides: GuideLines::from_means(&means),
            bands,
            paths,
            lane_width: layout.max_stops_per_bin(),
        }
    }
}

fn clip(
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    domain: (chrono::NaiveDate, chrono::NaiveDate),
) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
    let (d0, d1) = domain;
    if end < d0 || start > d1 {
        return None;
    }
    Some((start.max(d0), end.min(d1)))
}
