use std::fmt;

use serde::{Serialize, Serializer};

/// One scraped marketplace listing, as handed over by ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    pub title: String,
    pub price: String,
    pub link: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelLabel {
    Known(String),
    Multiple,
    Unknown,
}

impl ModelLabel {
    pub fn as_str(&self) -> &str {
        match self {
            ModelLabel::Known(s) => s,
            ModelLabel::Multiple => "Multiple",
            ModelLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ModelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ModelLabel {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

/// Storage capacity in GB, or `Unknown` when no plausible size was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Storage {
    Gb(u32),
    Unknown,
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Storage::Gb(n) => write!(f, "{}", n),
            Storage::Unknown => f.write_str("Unknown"),
        }
    }
}

impl Serialize for Storage {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Storage::Gb(n) => s.serialize_u32(*n),
            Storage::Unknown => s.serialize_str("Unknown"),
        }
    }
}

/// A raw listing plus the fields derived from it. Built once, never re-derived.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExtractedListing {
    pub title: String,
    pub price: String,
    pub link: String,
    pub location: String,
    pub model: ModelLabel,
    pub storage: Storage,
    pub price_num: Option<u64>,
}

impl ExtractedListing {
    pub fn segment_key(&self) -> SegmentKey {
        SegmentKey {
            model: self.model.clone(),
            storage: self.storage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentKey {
    pub model: ModelLabel,
    pub storage: Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionReason {
    DuplicateLink,
    AccessoryOrNonPhone,
    MissingPrice,
    PriceIsZero,
    UnknownModel,
    UnknownStorage,
}

impl ExclusionReason {
    pub const ALL: [ExclusionReason; 6] = [
        ExclusionReason::DuplicateLink,
        ExclusionReason::AccessoryOrNonPhone,
        ExclusionReason::MissingPrice,
        ExclusionReason::PriceIsZero,
        ExclusionReason::UnknownModel,
        ExclusionReason::UnknownStorage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExclusionReason::DuplicateLink => "Duplicate link",
            ExclusionReason::AccessoryOrNonPhone => "Accessory / non-phone",
            ExclusionReason::MissingPrice => "Missing price",
            ExclusionReason::PriceIsZero => "Price is zero",
            ExclusionReason::UnknownModel => "Unknown model",
            ExclusionReason::UnknownStorage => "Unknown storage",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ExclusionReason {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Valid,
    Excluded(ExclusionReason),
}

#[derive(Debug, Clone)]
pub struct ExcludedRow {
    pub listing: ExtractedListing,
    pub excluded_reason: ExclusionReason,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryRow {
    pub model: ModelLabel,
    pub storage: Storage,
    pub count: usize,
    pub min_price: u64,
    pub max_price: u64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutlierKind {
    ZeroPrice,
    BelowFence,
    AboveFence,
}

#[derive(Debug, Clone)]
pub struct OutlierRow {
    pub listing: ExtractedListing,
    pub lower_fence: f64,
    pub upper_fence: f64,
    pub kind: OutlierKind,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComparisonRow {
    pub model: ModelLabel,
    pub storage: u32,
    pub used_price: f64,
    pub launch_price: f64,
    pub pct_diff: f64,
    pub label: String,
}

impl ComparisonRow {
    pub fn display_name(&self) -> String {
        format!("{} {}GB", self.model, self.storage)
    }
}
