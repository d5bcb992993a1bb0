use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::pipeline::Analysis;
use crate::records::{ExclusionReason, ModelLabel, OutlierKind, Storage};

pub const VALID_CSV: &str = "all_data_clean.csv";
pub const EXCLUDED_CSV: &str = "excluded_data.csv";
pub const SUMMARY_CSV: &str = "summary_stats.csv";
pub const OUTLIERS_CSV: &str = "outliers.csv";
pub const COMPARISON_CSV: &str = "used_vs_launch.csv";
pub const REPORT_MD: &str = "report.md";

#[derive(Serialize)]
struct ExcludedCsv<'a> {
    title: &'a str,
    price: &'a str,
    link: &'a str,
    location: &'a str,
    model: &'a ModelLabel,
    storage: Storage,
    price_num: Option<u64>,
    excluded_reason: ExclusionReason,
}

#[derive(Serialize)]
struct OutlierCsv<'a> {
    title: &'a str,
    price: &'a str,
    link: &'a str,
    location: &'a str,
    model: &'a ModelLabel,
    storage: Storage,
    price_num: Option<u64>,
    lower_fence: f64,
    upper_fence: f64,
    kind: OutlierKind,
}

/// Write all tables plus the markdown report into `dir`, creating it if
/// needed. Returns the written paths.
pub fn write_all(dir: &Path, analysis: &Analysis, report: &str) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let mut written = Vec::new();

    written.push(write_csv(dir.join(VALID_CSV), &analysis.classification.valid)?);

    let excluded = analysis.classification.excluded.iter().map(|row| {
        let l = &row.listing;
        ExcludedCsv {
            title: &l.title,
            price: &l.price,
            link: &l.link,
            location: &l.location,
            model: &l.model,
            storage: l.storage,
            price_num: l.price_num,
            excluded_reason: row.excluded_reason,
        }
    });
    written.push(write_csv(dir.join(EXCLUDED_CSV), excluded)?);

    written.push(write_csv(dir.join(SUMMARY_CSV), &analysis.summary)?);

    let outliers = analysis.outliers.iter().map(|o| OutlierCsv {
        title: &o.listing.title,
        price: &o.listing.price,
        link: &o.listing.link,
        location: &o.listing.location,
        model: &o.listing.model,
        storage: o.listing.storage,
        price_num: o.listing.price_num,
        lower_fence: o.lower_fence,
        upper_fence: o.upper_fence,
        kind: o.kind,
    });
    written.push(write_csv(dir.join(OUTLIERS_CSV), outliers)?);

    if let Some(rows) = &analysis.comparison {
        written.push(write_csv(dir.join(COMPARISON_CSV), rows)?);
    }

    let report_path = dir.join(REPORT_MD);
    std::fs::write(&report_path, report)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;
    written.push(report_path);

    info!(dir = %dir.display(), files = written.len(), "Wrote outputs");
    Ok(written)
}

fn write_csv<I>(path: PathBuf, rows: I) -> Result<PathBuf>
where
    I: IntoIterator,
    I::Item: Serialize,
{
    let mut wtr = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::AccessoryDetector;
    use crate::compare::load_launch_prices;
    use crate::ingest::read_listing_file;
    use crate::pipeline::analyze;

    fn fixture_analysis() -> Analysis {
        let listings = read_listing_file(Path::new("tests/fixtures/marketplace_sample.json")).unwrap();
        let launch = load_launch_prices(Path::new("tests/fixtures/launch_prices.csv")).unwrap();
        analyze(&listings, &AccessoryDetector::default(), Some(launch.as_slice())).unwrap()
    }

    fn data_lines(path: &Path) -> usize {
        std::fs::read_to_string(path).unwrap().lines().count().saturating_sub(1)
    }

    #[test]
    fn writes_every_table() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested/output");
        let analysis = fixture_analysis();
        let written = write_all(&out_dir, &analysis, "# report\n").unwrap();

        assert_eq!(written.len(), 6);
        assert!(written.iter().all(|p| p.exists()));

        let valid = data_lines(&out_dir.join(VALID_CSV));
        let excluded = data_lines(&out_dir.join(EXCLUDED_CSV));
        assert_eq!(valid, analysis.classification.valid.len());
        assert_eq!(valid + excluded, analysis.raw_count);
        assert_eq!(data_lines(&out_dir.join(SUMMARY_CSV)), analysis.summary.len());
        assert_eq!(data_lines(&out_dir.join(OUTLIERS_CSV)), analysis.outliers.len());

        let excluded_text = std::fs::read_to_string(out_dir.join(EXCLUDED_CSV)).unwrap();
        assert!(excluded_text.starts_with(
            "title,price,link,location,model,storage,price_num,excluded_reason\n"
        ));
        assert!(excluded_text.contains("Duplicate link"));
        assert!(excluded_text.contains(",Unknown,Unknown,"));
    }

    #[test]
    fn comparison_table_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let mut analysis = fixture_analysis();
        analysis.comparison = None;
        let written = write_all(dir.path(), &analysis, "").unwrap();
        assert_eq!(written.len(), 5);
        assert!(!dir.path().join(COMPARISON_CSV).exists());
    }

    #[test]
    fn valid_csv_columns() {
        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path(), &fixture_analysis(), "").unwrap();
        let text = std::fs::read_to_string(dir.path().join(VALID_CSV)).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("title,price,link,location,model,storage,price_num"));
        assert_eq!(
            lines.next(),
            Some("iPhone 13 Pro Max 256GB 全新,\"NT$15,000\",https://m.example.com/item/1001,台北市,iPhone 13 Pro Max,256,15000")
        );
    }
}
