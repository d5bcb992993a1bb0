use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::records::ModelLabel;

// Longer alternatives first: the regex crate is leftmost-first, so "16e"
// must precede "16", "xs"/"xr" precede "x", "6s" precedes "6", and
// "pro max" precedes "pro".
static MODEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"iphone\s*(16e|xs|xr|x|se|6s|6|7|8|11|12|13|14|15|16)\s*(pro\s?max|pro|plus|mini)?",
    )
    .unwrap()
});

/// Resolve a normalized title to one canonical model label.
///
/// Every occurrence of `iphone <generation> [variant]` is collected; one
/// distinct label wins, several give `Multiple`, none gives `Unknown`.
pub fn extract_model(normalized: &str) -> ModelLabel {
    let mut labels = matched_labels(normalized);
    match labels.len() {
        0 => ModelLabel::Unknown,
        1 => labels
            .pop_first()
            .map(ModelLabel::Known)
            .unwrap_or(ModelLabel::Unknown),
        _ => ModelLabel::Multiple,
    }
}

/// All distinct labels found in the title, in sorted order.
pub fn matched_labels(normalized: &str) -> BTreeSet<String> {
    let mut labels = BTreeSet::new();
    for caps in MODEL_RE.captures_iter(normalized) {
        let Some(generation) = caps.get(1) else {
            continue;
        };
        let variant = caps.get(2).map(|m| m.as_str());

        // "iphone 128gb" would otherwise read as an iPhone 12, "iphone 7s" as a 7.
        if variant.is_none() && glued_to_next(normalized, generation.as_str(), generation.end()) {
            continue;
        }

        labels.insert(build_label(generation.as_str(), variant));
    }
    labels
}

/// Numeric generations reject any glued letter or digit. Letter generations
/// only reject a glued letter, so "se2" and "se3" stay an SE.
fn glued_to_next(text: &str, generation: &str, idx: usize) -> bool {
    let Some(next) = text[idx..].chars().next() else {
        return false;
    };
    if generation.starts_with(|c: char| c.is_ascii_digit()) {
        next.is_ascii_alphanumeric()
    } else {
        next.is_ascii_alphabetic()
    }
}

fn build_label(generation: &str, variant: Option<&str>) -> String {
    if generation == "16e" {
        return "iPhone 16E".to_string();
    }
    let compact: String = variant
        .unwrap_or("")
        .split_whitespace()
        .collect();
    let suffix = match compact.as_str() {
        "promax" => " Pro Max",
        "pro" => " Pro",
        "plus" => " Plus",
        "mini" => " mini",
        _ => "",
    };
    format!("iPhone {}{}", generation.to_uppercase(), suffix)
}
