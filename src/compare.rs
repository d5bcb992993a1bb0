use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::error::LoadError;
use crate::records::{ComparisonRow, ModelLabel, Storage, SummaryRow};

/// Launch price of one (model, storage) configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchPrice {
    pub model: String,
    pub storage: u32,
    pub launch_price: f64,
}

pub fn load_launch_prices(path: &Path) -> Result<Vec<LaunchPrice>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open launch price table {}", path.display()))?;
    let rows = read_launch_prices(file)?;
    info!(path = %path.display(), rows = rows.len(), "Loaded launch prices");
    Ok(rows)
}

/// Melt a wide table (`model,64GB,128GB,...,1TB`) into one row per
/// configuration. Blank, non-numeric and non-positive cells are dropped.
pub fn read_launch_prices<R: Read>(reader: R) -> Result<Vec<LaunchPrice>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let model_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("model"))
        .ok_or(LoadError::MissingModelColumn)?;
    let storage_cols: Vec<(usize, u32)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != model_idx)
        .map(|(i, h)| {
            parse_storage_header(h)
                .map(|gb| (i, gb))
                .ok_or_else(|| LoadError::StorageHeader(h.to_string()))
        })
        .collect::<Result<_, _>>()?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let Some(model) = record.get(model_idx).filter(|m| !m.is_empty()) else {
            continue;
        };
        for &(idx, storage) in &storage_cols {
            let Some(cell) = record.get(idx).filter(|c| !c.is_empty()) else {
                continue;
            };
            match cell.replace(',', "").parse::<f64>() {
                Ok(price) if price > 0.0 => rows.push(LaunchPrice {
                    model: model.to_string(),
                    storage,
                    launch_price: price,
                }),
                Ok(_) => {}
                Err(_) => warn!(model, cell, "Skipping non-numeric launch price"),
            }
        }
    }
    Ok(rows)
}

/// "128GB", "128", "1TB" → GB.
fn parse_storage_header(header: &str) -> Option<u32> {
    let h = header.trim().to_ascii_uppercase();
    if let Some(tb) = h.strip_suffix("TB") {
        return tb.trim().parse::<u32>().ok().and_then(|n| n.checked_mul(1024));
    }
    h.strip_suffix("GB").unwrap_or(&h).trim().parse().ok()
}

/// Inner join of segment mean prices with launch prices. Segments without a
/// launch baseline are left out.
pub fn compare_with_launch(summary: &[SummaryRow], launch: &[LaunchPrice]) -> Vec<ComparisonRow> {
    let mut baseline: HashMap<(&str, u32), f64> = HashMap::new();
    for lp in launch {
        baseline
            .entry((lp.model.as_str(), lp.storage))
            .or_insert(lp.launch_price);
    }

    summary
        .iter()
        .filter_map(|row| {
            let ModelLabel::Known(model) = &row.model else {
                return None;
            };
            let Storage::Gb(storage) = row.storage else {
                return None;
            };
            let launch_price = *baseline.get(&(model.as_str(), storage))?;
            let pct_diff = (row.avg_price - launch_price) / launch_price * 100.0;
            Some(ComparisonRow {
                model: row.model.clone(),
                storage,
                used_price: row.avg_price,
                launch_price,
                pct_diff,
                label: pct_label(pct_diff),
            })
        })
        .collect()
}

pub fn pct_label(pct: f64) -> String {
    format!("({:+.0}%)", pct)
}
