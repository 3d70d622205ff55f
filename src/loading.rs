//! Boundary-validating loaders for the four source datasets
//!
//! All format checking happens here; the pipeline itself assumes well-typed
//! input. Speech records arrive as a JSON array with ISO dates; the
//! companion tables are CSV with `%d-%b-%Y` dates (e.g. `21-Aug-2010`).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::binning::BinBoundaries;
use crate::errors::{Result, TimelineError};
use crate::types::{ElectionPeriod, SpeechRecord, TermPeriod};

const SHORT_DATE_FORMAT: &str = "%d-%b-%Y";

fn parse_short_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), SHORT_DATE_FORMAT).map_err(|_| {
        TimelineError::InvalidDate {
            value: value.to_string(),
            format: SHORT_DATE_FORMAT,
        }
    })
}

/// Load the speech record array from a JSON file.
///
/// Dates use the `%Y-%m-%d` form; anything malformed is rejected before the
/// records reach the pipeline.
pub fn load_speeches<P: AsRef<Path>>(path: P) -> Result<Vec<SpeechRecord>> {
    let file = File::open(path.as_ref())?;
    let records: Vec<SpeechRecord> = serde_json::from_reader(BufReader::new(file))?;
    debug!(
        path = %path.as_ref().display(),
        records = records.len(),
        "loaded speech records"
    );
    Ok(records)
}

/// One row of the dynamic summary table.
///
/// Only the date column feeds the pipeline (the distinct dates are the bin
/// boundary set); the remaining columns are validated and discarded because
/// every statistic is recomputed from the records.
#[derive(Debug, Deserialize)]
struct SummaryRow {
    #[allow(dead_code)]
    speaker: String,
    record_date: String,
    #[allow(dead_code)]
    mean: f64,
    #[serde(rename = "GroupCount")]
    #[allow(dead_code)]
    group_count: usize,
}

/// Derive the bin boundary set from the dynamic summary table CSV.
pub fn load_summary_boundaries<P: AsRef<Path>>(path: P) -> Result<BinBoundaries> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut dates = Vec::new();
    for row in reader.deserialize() {
        let row: SummaryRow = row?;
        dates.push(parse_short_date(&row.record_date)?);
    }
    let boundaries = BinBoundaries::new(dates)?;
    debug!(
        path = %path.as_ref().display(),
        boundaries = boundaries.len(),
        "derived bin boundaries"
    );
    Ok(boundaries)
}

#[derive(Debug, Deserialize)]
struct ElectionRow {
    issue_of_writ: String,
    polling_day: String,
}

/// Load election campaign periods from CSV.
pub fn load_elections<P: AsRef<Path>>(path: P) -> Result<Vec<ElectionPeriod>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut elections = Vec::new();
    for row in reader.deserialize() {
        let row: ElectionRow = row?;
        elections.push(ElectionPeriod {
            issue_of_writ: parse_short_date(&row.issue_of_writ)?,
            polling_day: parse_short_date(&row.polling_day)?,
        });
    }
    Ok(elections)
}

#[derive(Debug, Deserialize)]
struct TermRow {
    name: String,
    start_date: String,
    end_date: String,
}

/// Load ministerial terms from CSV.
pub fn load_terms<P: AsRef<Path>>(path: P) -> Result<Vec<TermPeriod>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut terms = Vec::new();
    for row in reader.deserialize() {
        let row: TermRow = row?;
        terms.push(TermPeriod {
            name: row.name,
            start_date: parse_short_date(&row.start_date)?,
            end_date: parse_short_date(&row.end_date)?,
        });
    }
    Ok(terms)
}
