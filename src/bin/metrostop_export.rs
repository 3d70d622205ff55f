//! Compute the metro-map timeline layout and export it as renderer-ready JSON.
//!
//! Loads the four source datasets, runs the pipeline, assembles the chart
//! scaffold and writes everything the drawing layer needs to one JSON file,
//! with a per-speaker summary table on stdout.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::Parser;
use comfy_table::{Table, presets::UTF8_FULL};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use metrostop::{
    BinSummary, ChartScaffold, LayoutConfig, LinearScale, SpeakerSpan, StopSlot, TimeAxis,
    TimelineError, TimelineLayout, TimelinePipeline, loading,
};

#[derive(Debug, Parser)]
#[command(name = "metrostop-export", version, about)]
struct Args {
    /// Speech records JSON file
    #[arg(long, env = "METROSTOP_SPEECHES")]
    speeches: PathBuf,

    /// Dynamic summary table CSV; its distinct dates become the bin boundaries
    #[arg(long, env = "METROSTOP_SUMMARY")]
    summary: PathBuf,

    /// Federal elections CSV (optional)
    #[arg(long)]
    elections: Option<PathBuf>,

    /// Ministerial terms CSV (optional)
    #[arg(long)]
    terms: Option<PathBuf>,

    /// Layout configuration TOML (optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output JSON path
    #[arg(long, short)]
    output: PathBuf,
}

/// Layout parameters, overridable by config file and `METROSTOP_*` env vars.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ExportConfig {
    /// Width of the diff axis in chart units
    axis_width: f64,
    /// Height of the time axis in chart units
    axis_height: f64,
    /// Minimum visual separation between stop centres
    min_separation: f64,
    /// Axis bound past which pushed stops are clamped
    max_position: Option<f64>,
    /// Term holder short name to full speaker name
    name_map: HashMap<String, String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            axis_width: 600.0,
            axis_height: 800.0,
            min_separation: 4.0,
            max_position: None,
            name_map: default_name_map(),
        }
    }
}

fn default_name_map() -> HashMap<String, String> {
    [
        ("Albanese", "Anthony Norman Albanese"),
        ("Howard", "John Winston Howard"),
        ("Rudd", "Kevin Michael Rudd"),
        ("Gillard", "Julia Eileen Gillard"),
        ("Turnbull", "Malcolm Bligh Turnbull"),
        ("Garrett", "Peter Robert Garrett"),
        ("Jensen", "Dennis Geoffrey Jensen"),
        ("Abbott", "Tony John Abbott"),
        ("Morrison", "Scott John Morrison"),
    ]
    .into_iter()
    .map(|(short, full)| (short.to_string(), full.to_string()))
    .collect()
}

fn load_config(path: Option<&Path>) -> Result<ExportConfig, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    builder
        .add_source(config::Environment::with_prefix("METROSTOP").separator("__"))
        .build()?
        .try_deserialize()
}

#[derive(Serialize)]
struct BinExport<'a> {
    bin: NaiveDate,
    slots: &'a [StopSlot],
}

#[derive(Serialize)]
struct LayoutExport<'a> {
    exported_at: String,
    speakers: &'a [SpeakerSpan],
    summaries: &'a [BinSummary],
    bins: Vec<BinExport<'a>>,
    scaffold: &'a ChartScaffold,
    diff_scale: &'a LinearScale,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();
    let cfg = load_config(args.config.as_deref())?;

    let records = loading::load_speeches(&args.speeches)?;
    if records.is_empty() {
        return Err(TimelineError::InvalidData {
            message: "speech file contains no records".to_string(),
        }
        .into());
    }
    let boundaries = loading::load_summary_boundaries(&args.summary)?;
    let elections = match &args.elections {
        Some(path) => loading::load_elections(path)?,
        None => Vec::new(),
    };
    let terms = match &args.terms {
        Some(path) => loading::load_terms(path)?,
        None => Vec::new(),
    };
    info!(
        records = records.len(),
        boundaries = boundaries.len(),
        elections = elections.len(),
        terms = terms.len(),
        "datasets loaded"
    );

    let pipeline = TimelinePipeline::new(
        boundaries,
        LayoutConfig {
            min_separation: cfg.min_separation,
            max_position: cfg.max_position,
        },
    );
    let aggregate = pipeline.aggregate(&records)?;
    let scale = LinearScale::symmetric(aggregate.max_abs_mean(), (0.0, cfg.axis_width));
    let layout = pipeline.layout(aggregate, &scale);

    let earliest = records.iter().map(|r| r.date).min().expect("records checked non-empty");
    let latest = records.iter().map(|r| r.date).max().expect("records checked non-empty");
    // later dates sit higher on the vertical chart
    let axis = TimeAxis::spanning(earliest, latest, (cfg.axis_height, 0.0));
    let scaffold = ChartScaffold::assemble(&layout, axis, &elections, &terms, &cfg.name_map);

    let bins: Vec<BinExport> = layout
        .lanes()
        .map(|(bin, lane)| BinExport {
            bin: *bin,
            slots: lane.slots(),
        })
        .collect();
    let export = LayoutExport {
        exported_at: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        speakers: layout.speaker_spans(),
        summaries: layout.summaries(),
        bins,
        scaffold: &scaffold,
        diff_scale: &scale,
    };
    let file = File::create(&args.output)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &export)?;
    info!(output = %args.output.display(), "layout exported");

    print_summary(&layout);
    Ok(())
}

fn print_summary(layout: &TimelineLayout) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Speaker", "Speeches", "First", "Last", "Stops",
    ]);
    for span in layout.speaker_spans() {
        let stops = layout
            .lanes()
            .flat_map(|(_, lane)| lane.slots())
            .filter(|slot| slot.speaker == span.speaker)
            .count();
        table.add_row(vec![
            span.speaker.clone(),
            span.speech_count.to_string(),
            span.first_date.to_string(),
            span.last_date.to_string(),
            stops.to_string(),
        ]);
    }
    println!("{table}");

    let clamped = layout
        .lanes()
        .flat_map(|(_, lane)| lane.slots())
        .filter(|slot| slot.clamped)
        .count();
    println!(
        "{} bins, {} stops, {} clamped",
        layout.lanes().count(),
        layout.slot_count(),
        clamped
    );
}
