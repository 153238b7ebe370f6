//! Raw, silver and gold stages of one preparation run.

use std::path::PathBuf;

use log::{info, warn};
use serde::Serialize;

use crate::config::Args;
use crate::error::Result;
use crate::frame::{save, to_frame, WriteFormat};
use crate::ingest::{load, AuditSummary, Dataset, IngestOptions, SkippedRow};
use crate::pipeline::{Outcome, Pipeline, RejectionEntry};
use crate::rules::{Limits, Rule};
use crate::stats::{summarize, Statistics};

/// Everything a run produces besides the output file.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub audit: AuditSummary,
    pub kept: usize,
    pub rejected: usize,
    pub rejections_by_rule: Vec<(Rule, usize)>,
    pub rejections: Vec<RejectionEntry>,
    pub skipped: Vec<SkippedRow>,
    pub statistics: Statistics,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub ingest: IngestOptions,
    pub limits: Limits,
}

impl RunConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        Ok(RunConfig {
            input: args.input.clone(),
            output: args.output.clone(),
            ingest: args.ingest_options(),
            limits: args.load_limits()?,
        })
    }
}

fn count_by_rule(rejections: &[RejectionEntry]) -> Vec<(Rule, usize)> {
    Rule::ALL
        .iter()
        .map(|&rule| {
            let count = rejections
                .iter()
                .filter(|entry| entry.violations.iter().any(|v| v.rule == rule))
                .count();
            (rule, count)
        })
        .filter(|&(_, count)| count > 0)
        .collect()
}

async fn process_raw(config: &RunConfig) -> Result<Dataset> {
    let dataset = load(config.input.clone(), config.ingest.clone()).await?;
    let audit = &dataset.audit;
    info!(
        "audit: {} rows, {} columns, {} duplicates, max missing ratio {:.3}",
        audit.rows, audit.columns, audit.duplicates, audit.max_missing_ratio
    );
    if audit.unreadable > 0 {
        warn!("{} unreadable rows skipped", audit.unreadable);
    }
    Ok(dataset)
}

/// Rejection indices point at data rows of the input file, not at the
/// deduplicated record list.
fn process_silver(config: &RunConfig, dataset: &Dataset) -> Outcome {
    let mut outcome = Pipeline::new(config.limits.clone()).run(&dataset.records);
    for entry in &mut outcome.rejections {
        entry.row_index = dataset.source_row(entry.row_index);
    }
    outcome
}

async fn process_gold(config: &RunConfig, outcome: &Outcome) -> Result<Statistics> {
    let df = to_frame(&outcome.enriched)?;
    let df = save(config.output.clone(), df).await?;
    let statistics = summarize(&df)?;
    for summary in &statistics.descriptive {
        info!(
            "{}: mean {:?}, median {:?}, std {:?}",
            summary.column, summary.mean, summary.median, summary.std
        );
    }
    Ok(statistics)
}

pub async fn run(config: &RunConfig) -> Result<Report> {
    WriteFormat::from_path(&config.output)?;
    let dataset = process_raw(config).await?;
    let outcome = process_silver(config, &dataset);

    let rejections_by_rule = count_by_rule(&outcome.rejections);
    for (rule, count) in &rejections_by_rule {
        warn!("{} rows failed {}", count, rule);
    }

    let statistics = process_gold(config, &outcome).await?;

    Ok(Report {
        audit: dataset.audit,
        kept: outcome.enriched.len(),
        rejected: outcome.rejections.len(),
        rejections_by_rule,
        rejections: outcome.rejections,
        skipped: dataset.skipped,
        statistics,
    })
}
