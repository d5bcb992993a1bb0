use std::collections::HashSet;

use tracing::debug;

use crate::records::{ExcludedRow, ExclusionReason, ExtractedListing, ModelLabel, Status, Storage};

/// Case, screen protector, charger, earphone and similar listing keywords.
const ACCESSORY_KEYWORDS: &[&str] = &["殼", "保護殼", "手機殼", "貼", "配件", "翻蓋", "外貿", "耳機", "充電"];

#[derive(Debug, Clone)]
pub struct AccessoryDetector {
    keywords: Vec<String>,
}

impl Default for AccessoryDetector {
    fn default() -> Self {
        Self::with_extra(&[])
    }
}

impl AccessoryDetector {
    pub fn with_extra(extra: &[String]) -> Self {
        let keywords = ACCESSORY_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .chain(extra.iter().map(|k| k.trim().to_lowercase()))
            .filter(|k| !k.is_empty())
            .collect();
        AccessoryDetector { keywords }
    }

    pub fn is_accessory(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

/// Valid and excluded listings; together they cover the input exactly once.
#[derive(Debug, Default)]
pub struct Classification {
    pub valid: Vec<ExtractedListing>,
    pub excluded: Vec<ExcludedRow>,
}

impl Classification {
    pub fn total(&self) -> usize {
        self.valid.len() + self.excluded.len()
    }

    /// Excluded count per reason, in priority order, zero counts included.
    pub fn reason_counts(&self) -> Vec<(ExclusionReason, usize)> {
        ExclusionReason::ALL
            .iter()
            .map(|&reason| {
                let n = self
                    .excluded
                    .iter()
                    .filter(|row| row.excluded_reason == reason)
                    .count();
                (reason, n)
            })
            .collect()
    }
}

/// Partition listings in input order. The first listing per link is checked
/// on its own fields; every later one is a duplicate whatever it contains.
pub fn classify(listings: Vec<ExtractedListing>, detector: &AccessoryDetector) -> Classification {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Classification::default();

    for listing in listings {
        let status = if seen.insert(listing.link.clone()) {
            field_status(&listing, detector)
        } else {
            Status::Excluded(ExclusionReason::DuplicateLink)
        };

        match status {
            Status::Valid => out.valid.push(listing),
            Status::Excluded(reason) => {
                debug!(link = %listing.link, %reason, "excluded listing");
                out.excluded.push(ExcludedRow {
                    listing,
                    excluded_reason: reason,
                });
            }
        }
    }

    out
}

/// Field checks for a listing that survived deduplication; first match wins.
pub fn field_status(listing: &ExtractedListing, detector: &AccessoryDetector) -> Status {
    let reason = if detector.is_accessory(&listing.title) {
        ExclusionReason::AccessoryOrNonPhone
    } else if listing.price_num.is_none() {
        ExclusionReason::MissingPrice
    } else if listing.price_num == Some(0) {
        ExclusionReason::PriceIsZero
    } else if listing.model == ModelLabel::Unknown {
        ExclusionReason::UnknownModel
    } else if listing.storage == Storage::Unknown {
        ExclusionReason::UnknownStorage
    } else {
        return Status::Valid;
    };
    Status::Excluded(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::process_listing;
    use crate::records::RawListing;

    fn listing(title: &str, price: &str, link: &str) -> ExtractedListing {
        process_listing(&RawListing {
            title: title.to_string(),
            price: price.to_string(),
            link: link.to_string(),
            location: String::new(),
        })
    }

    fn reason_of(l: ExtractedListing) -> Status {
        field_status(&l, &AccessoryDetector::default())
    }

    #[test]
    fn valid_listing() {
        let l = listing("iPhone 13 Pro Max 256GB 全新", "NT$15,000", "a");
        assert_eq!(reason_of(l), Status::Valid);
    }

    #[test]
    fn accessory_before_unknown_model() {
        let l = listing("出售手機殼", "NT$100", "a");
        assert_eq!(reason_of(l), Status::Excluded(ExclusionReason::AccessoryOrNonPhone));
    }

    #[test]
    fn accessory_wins_over_wellformed_fields() {
        let l = listing("iPhone 13 128G 保護殼", "NT$300", "a");
        assert_eq!(reason_of(l), Status::Excluded(ExclusionReason::AccessoryOrNonPhone));
    }

    #[test]
    fn priority_order() {
        let missing = listing("random text", "面交", "a");
        assert_eq!(reason_of(missing), Status::Excluded(ExclusionReason::MissingPrice));

        let zero = listing("random text", "Free", "a");
        assert_eq!(reason_of(zero), Status::Excluded(ExclusionReason::PriceIsZero));

        let unknown_model = listing("galaxy s22 128g", "NT$9,000", "a");
        assert_eq!(reason_of(unknown_model), Status::Excluded(ExclusionReason::UnknownModel));

        let unknown_storage = listing("iPhone 12 紅色", "NT$9,000", "a");
        assert_eq!(reason_of(unknown_storage), Status::Excluded(ExclusionReason::UnknownStorage));
    }

    #[test]
    fn multiple_models_stay_valid() {
        let l = listing("iPhone 12 iPhone 13 128g", "NT$9,000", "a");
        assert_eq!(l.model, ModelLabel::Multiple);
        assert_eq!(reason_of(l), Status::Valid);
    }

    #[test]
    fn extra_keywords() {
        let detector = AccessoryDetector::with_extra(&["Case".to_string(), "  ".to_string()]);
        assert!(detector.is_accessory("iPhone 13 CASE only"));
        assert!(!detector.is_accessory("iPhone 13 128g"));
    }

    #[test]
    fn duplicate_always_excluded() {
        let first = listing("出售手機殼", "NT$100", "dup");
        let second = listing("iPhone 13 128G", "NT$12,000", "dup");
        let third = listing("iPhone 14 128G", "NT$18,000", "other");
        let result = classify(vec![first, second, third], &AccessoryDetector::default());

        assert_eq!(result.valid.len(), 1);
        assert_eq!(result.valid[0].link, "other");
        assert_eq!(result.excluded.len(), 2);
        assert_eq!(result.excluded[0].excluded_reason, ExclusionReason::AccessoryOrNonPhone);
        assert_eq!(result.excluded[1].excluded_reason, ExclusionReason::DuplicateLink);
        assert_eq!(result.excluded[1].listing.title, "iPhone 13 128G");
    }

    #[test]
    fn partition_covers_input() {
        let input = vec![
            listing("iPhone 13 128G", "NT$12,000", "1"),
            listing("iPhone 13 128G", "NT$12,000", "1"),
            listing("iPhone 13 128G", "free", "2"),
            listing("耳機", "NT$500", "3"),
            listing("iPhone 11 64G", "NT$6,000", "4"),
        ];
        let n = input.len();
        let result = classify(input, &AccessoryDetector::default());
        assert_eq!(result.total(), n);
        assert_eq!(result.valid.len(), 2);

        let counts = result.reason_counts();
        assert_eq!(counts.len(), ExclusionReason::ALL.len());
        assert!(counts.contains(&(ExclusionReason::DuplicateLink, 1)));
        assert!(counts.contains(&(ExclusionReason::PriceIsZero, 1)));
        assert!(counts.contains(&(ExclusionReason::AccessoryOrNonPhone, 1)));
        assert!(counts.contains(&(ExclusionReason::UnknownModel, 0)));
    }

    #[test]
    fn empty_batch() {
        let result = classify(Vec::new(), &AccessoryDetector::default());
        assert_eq!(result.total(), 0);
    }
}
