use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::info;

use crate::classify::{self, AccessoryDetector, Classification};
use crate::compare::{self, LaunchPrice};
use crate::parser;
use crate::records::{ComparisonRow, ExtractedListing, OutlierRow, RawListing, SummaryRow};
use crate::stats;

const CHUNK_SIZE: usize = 500;

/// Everything one run derives from a batch of listings.
pub struct Analysis {
    pub raw_count: usize,
    pub classification: Classification,
    pub summary: Vec<SummaryRow>,
    pub outliers: Vec<OutlierRow>,
    pub comparison: Option<Vec<ComparisonRow>>,
}

/// Extract every listing, in parallel per chunk. Output keeps input order,
/// which deduplication relies on.
pub fn extract_all(listings: &[RawListing]) -> Result<Vec<ExtractedListing>> {
    let pb = ProgressBar::new(listings.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut extracted = Vec::with_capacity(listings.len());
    for chunk in listings.chunks(CHUNK_SIZE) {
        let results: Vec<ExtractedListing> = chunk.par_iter().map(parser::process_listing).collect();
        extracted.extend(results);
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(extracted)
}

pub fn analyze(
    listings: &[RawListing],
    detector: &AccessoryDetector,
    launch: Option<&[LaunchPrice]>,
) -> Result<Analysis> {
    let extracted = extract_all(listings)?;
    let classification = classify::classify(extracted, detector);
    info!(
        valid = classification.valid.len(),
        excluded = classification.excluded.len(),
        "Classified listings"
    );

    let summary = stats::summarize(&classification.valid);
    let outliers = stats::detect_outliers(&classification.valid);
    info!(segments = summary.len(), outliers = outliers.len(), "Computed segment statistics");

    let comparison = launch.map(|table| compare::compare_with_launch(&summary, table));
    if let Some(rows) = &comparison {
        info!(matched = rows.len(), "Compared against launch prices");
    }

    Ok(Analysis {
        raw_count: listings.len(),
        classification,
        summary,
        outliers,
        comparison,
    })
}
