use crate::pipeline::Analysis;
use crate::stats;

pub fn render_markdown(analysis: &Analysis, generated_at: &str) -> String {
    let classification = &analysis.classification;
    let mut out = String::new();

    out.push_str("## Used Phone Price Report\n");
    out.push_str(&format!("_Generated {}_\n\n", generated_at));
    out.push_str(&format!(
        "- Listings loaded: {}\n- Valid listings: {} ({:.1}%)\n- Excluded listings: {}\n- Segments: {}\n- Outliers: {}\n",
        analysis.raw_count,
        classification.valid.len(),
        percent(classification.valid.len(), analysis.raw_count),
        classification.excluded.len(),
        analysis.summary.len(),
        analysis.outliers.len(),
    ));

    if analysis.raw_count == 0 {
        out.push_str("\nNo listings found; nothing to summarize.\n");
        return out;
    }

    out.push_str("\n### Excluded by reason\n");
    for (reason, count) in classification.reason_counts() {
        if count > 0 {
            out.push_str(&format!("- {}: {}\n", reason, count));
        }
    }

    out.push_str("\n### Price by model and storage\n");
    out.push_str("| Model | Storage | Count | Min | Max | Avg |\n");
    out.push_str("|---|---:|---:|---:|---:|---:|\n");
    for row in &analysis.summary {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.0} |\n",
            row.model, row.storage, row.count, row.min_price, row.max_price, row.avg_price
        ));
    }

    out.push_str("\n### Average price by model\n");
    for (model, avg) in stats::average_by_model(&analysis.summary) {
        out.push_str(&format!("- {}: {:.0}\n", model, avg));
    }

    out.push_str("\n### Listings per model\n");
    for (model, count) in stats::count_by_model(&classification.valid) {
        out.push_str(&format!("- {}: {}\n", model, count));
    }

    out.push_str("\n### Possible outliers\n");
    if analysis.outliers.is_empty() {
        out.push_str("None.\n");
    } else {
        out.push_str("| Title | Model | Storage | Price | Location | Fence |\n");
        out.push_str("|---|---|---:|---:|---|---|\n");
        for o in &analysis.outliers {
            let l = &o.listing;
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {:.0} – {:.0} |\n",
                escape_cell(&l.title),
                l.model,
                l.storage,
                l.price_num.map(|p| p.to_string()).unwrap_or_default(),
                escape_cell(&l.location),
                o.lower_fence,
                o.upper_fence,
            ));
        }
    }

    if let Some(rows) = &analysis.comparison {
        out.push_str("\n### Used vs launch price\n");
        if rows.is_empty() {
            out.push_str("No segment has a launch price on record.\n");
        } else {
            out.push_str("| Segment | Launch | Used | Diff |\n");
            out.push_str("|---|---:|---:|---:|\n");
            for r in rows {
                out.push_str(&format!(
                    "| {} | {:.0} | {:.0} | {} |\n",
                    r.display_name(),
                    r.launch_price,
                    r.used_price,
                    r.label
                ));
            }
        }
    }

    out
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::AccessoryDetector;
    use crate::compare::load_launch_prices;
    use crate::ingest::read_listing_file;
    use crate::pipeline::analyze;
    use std::path::Path;

    #[test]
    fn full_report() {
        let listings = read_listing_file(Path::new("tests/fixtures/marketplace_sample.json")).unwrap();
        let launch = load_launch_prices(Path::new("tests/fixtures/launch_prices.csv")).unwrap();
        let analysis = analyze(&listings, &AccessoryDetector::default(), Some(launch.as_slice())).unwrap();
        let md = render_markdown(&analysis, "2025-01-01 00:00");

        assert!(md.starts_with("## Used Phone Price Report\n"));
        assert!(md.contains(&format!("- Listings loaded: {}\n", listings.len())));
        assert!(md.contains("- Duplicate link: 1\n"));
        assert!(!md.contains("- Unknown model: 0"));
        assert!(md.contains("| iPhone 13 Pro Max | 256 | 5 | 15000 | 300000 |"));
        assert!(md.contains("### Used vs launch price"));
        assert!(md.contains("iPhone 13 Pro Max 256GB"));
    }

    #[test]
    fn empty_report() {
        let analysis = analyze(&[], &AccessoryDetector::default(), None).unwrap();
        let md = render_markdown(&analysis, "now");
        assert!(md.contains("- Listings loaded: 0\n"));
        assert!(md.contains("nothing to summarize"));
        assert!(!md.contains("### Possible outliers"));
    }

    #[test]
    fn pipes_are_escaped() {
        assert_eq!(escape_cell("a|b\nc"), "a\\|b c");
    }
}
