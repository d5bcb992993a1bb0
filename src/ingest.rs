use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::error::LoadError;
use crate::records::RawListing;

/// Read every `<prefix>*.json` array in `dir`, in file-name order.
///
/// A file that cannot be parsed is logged and skipped; the rest of the batch
/// still loads.
pub fn load_listings(dir: &Path, prefix: &str) -> Result<Vec<RawListing>> {
    if !dir.is_dir() {
        return Err(LoadError::MissingDataDir(dir.to_path_buf()).into());
    }

    let files = listing_files(dir, prefix)?;
    let mut listings = Vec::new();
    for path in &files {
        match read_listing_file(path) {
            Ok(batch) => {
                info!(file = %path.display(), listings = batch.len(), "Loaded listing file");
                listings.extend(batch);
            }
            Err(e) => warn!(file = %path.display(), error = %e, "Skipping unreadable listing file"),
        }
    }

    info!(files = files.len(), listings = listings.len(), dir = %dir.display(), "Ingestion done");
    Ok(listings)
}

fn listing_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(prefix) && name.ends_with(".json") && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn read_listing_file(path: &Path) -> Result<Vec<RawListing>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_listings(&text).with_context(|| format!("Invalid listing JSON in {}", path.display()))
}

/// A JSON array of listing objects. Missing fields come back empty; `null`
/// and non-string values are rendered as text rather than rejected.
pub fn parse_listings(text: &str) -> Result<Vec<RawListing>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(text)?;
    Ok(values.iter().map(listing_from_value).collect())
}

fn listing_from_value(value: &serde_json::Value) -> RawListing {
    let field = |key: &str| match value.get(key) {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    RawListing {
        title: field("title"),
        price: field("price"),
        link: field("link"),
        location: field("location"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fixture() {
        let listings = read_listing_file(Path::new("tests/fixtures/marketplace_sample.json")).unwrap();
        assert!(listings.len() >= 10);
        assert!(listings.iter().any(|l| l.title.contains("iPhone 13 Pro Max")));
    }

    #[test]
    fn missing_and_odd_fields() {
        let listings = parse_listings(
            r#"[{"title": "iPhone 12 64g", "price": 9000}, {"price": null, "link": "x"}]"#,
        )
        .unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].price, "9000");
        assert_eq!(listings[0].link, "");
        assert_eq!(listings[1].title, "");
        assert_eq!(listings[1].price, "");
        assert_eq!(listings[1].link, "x");
    }

    #[test]
    fn directory_with_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("marketplace_b.json"),
            r#"[{"title": "iPhone 11 64g", "price": "NT$5,000", "link": "b", "location": ""}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("marketplace_a.json"),
            r#"[{"title": "iPhone 13 128g", "price": "NT$12,000", "link": "a", "location": ""}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("marketplace_broken.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("other.json"), "[]").unwrap();

        let listings = load_listings(dir.path(), "marketplace").unwrap();
        let links: Vec<&str> = listings.iter().map(|l| l.link.as_str()).collect();
        assert_eq!(links, vec!["a", "b"]);
    }

    #[test]
    fn missing_directory() {
        let err = load_listings(Path::new("does/not/exist"), "marketplace").unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::MissingDataDir(_))));
    }
}
