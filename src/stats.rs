use std::collections::BTreeMap;

use crate::records::{ExtractedListing, OutlierKind, OutlierRow, SegmentKey, SummaryRow};

const FENCE_K: f64 = 1.5;

/// Segment key → member listings, sorted by (model, storage).
pub fn group_segments(valid: &[ExtractedListing]) -> BTreeMap<SegmentKey, Vec<&ExtractedListing>> {
    let mut groups: BTreeMap<SegmentKey, Vec<&ExtractedListing>> = BTreeMap::new();
    for listing in valid {
        groups.entry(listing.segment_key()).or_default().push(listing);
    }
    groups
}

/// Count/min/max/mean per segment over positive prices only. Segments with
/// no positive price are left out.
pub fn summarize(valid: &[ExtractedListing]) -> Vec<SummaryRow> {
    group_segments(valid)
        .into_iter()
        .filter_map(|(key, members)| {
            let prices: Vec<u64> = members
                .iter()
                .filter_map(|l| l.price_num)
                .filter(|&p| p > 0)
                .collect();
            let min_price = *prices.iter().min()?;
            let max_price = *prices.iter().max()?;
            let sum: u128 = prices.iter().map(|&p| u128::from(p)).sum();
            Some(SummaryRow {
                model: key.model,
                storage: key.storage,
                count: prices.len(),
                min_price,
                max_price,
                avg_price: sum as f64 / prices.len() as f64,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fence {
    pub lower: f64,
    pub upper: f64,
}

impl Fence {
    /// IQR fence over all given prices, zeros included.
    pub fn from_prices(prices: &[u64]) -> Option<Fence> {
        let mut sorted: Vec<f64> = prices.iter().map(|&p| p as f64).collect();
        sorted.sort_by(f64::total_cmp);
        let q1 = quantile(&sorted, 0.25)?;
        let q3 = quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;
        Some(Fence {
            lower: q1 - FENCE_K * iqr,
            upper: q3 + FENCE_K * iqr,
        })
    }

    pub fn classify(&self, price: u64) -> Option<OutlierKind> {
        let p = price as f64;
        if price == 0 {
            Some(OutlierKind::ZeroPrice)
        } else if p < self.lower {
            Some(OutlierKind::BelowFence)
        } else if p > self.upper {
            Some(OutlierKind::AboveFence)
        } else {
            None
        }
    }
}

/// Quantile with linear interpolation between order statistics at
/// position `q * (n - 1)`. `sorted` must be ascending.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Listings outside their segment's IQR fence, plus every zero-price listing.
pub fn detect_outliers(valid: &[ExtractedListing]) -> Vec<OutlierRow> {
    let mut outliers = Vec::new();
    for members in group_segments(valid).into_values() {
        let prices: Vec<u64> = members.iter().filter_map(|l| l.price_num).collect();
        let Some(fence) = Fence::from_prices(&prices) else {
            continue;
        };
        for listing in members {
            let Some(kind) = listing.price_num.and_then(|p| fence.classify(p)) else {
                continue;
            };
            outliers.push(OutlierRow {
                listing: listing.clone(),
                lower_fence: fence.lower,
                upper_fence: fence.upper,
                kind,
            });
        }
    }
    outliers
}

/// Mean positive price per model across all storage sizes, cheapest first.
pub fn average_by_model(summary: &[SummaryRow]) -> Vec<(String, f64)> {
    let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for row in summary {
        let entry = totals.entry(row.model.to_string()).or_default();
        entry.0 += row.avg_price * row.count as f64;
        entry.1 += row.count;
    }
    let mut out: Vec<(String, f64)> = totals
        .into_iter()
        .filter(|(_, (_, n))| *n > 0)
        .map(|(model, (sum, n))| (model, sum / n as f64))
        .collect();
    out.sort_by(|a, b| a.1.total_cmp(&b.1));
    out
}

/// Valid listing count per model, most listed first.
pub fn count_by_model(valid: &[ExtractedListing]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for listing in valid {
        *counts.entry(listing.model.to_string()).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}
