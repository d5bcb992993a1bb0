use std::sync::LazyLock;

use regex::Regex;

use crate::records::Storage;

/// Capacities a phone listing can plausibly mean, in GB.
pub const PLAUSIBLE_GB: &[u32] = &[16, 32, 64, 128, 256, 512, 1024];

static UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(16|32|64|128|256|512|1024)\s*(gb|g)?\b").unwrap());
static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static TERABYTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b1\s*tb?\b").unwrap());

/// Storage size from a normalized title; first successful rule wins.
pub fn extract_storage(normalized: &str) -> Storage {
    storage_with_unit(normalized)
        .or_else(|| storage_bare_number(normalized))
        .or_else(|| storage_terabyte(normalized))
        .map(Storage::Gb)
        .unwrap_or(Storage::Unknown)
}

/// `128gb`, `128 g`, `128` at word boundaries. An explicit unit beats a bare
/// number, so "iphone 16 128g" reads 128, not the generation.
fn storage_with_unit(text: &str) -> Option<u32> {
    let mut bare = None;
    for caps in UNIT_RE.captures_iter(text) {
        let number = caps.get(1)?;
        if is_generation(text, number.start()) {
            continue;
        }
        let value = number.as_str().parse().ok()?;
        if caps.get(2).is_some() {
            return Some(value);
        }
        bare.get_or_insert(value);
    }
    bare
}

/// Plausible size glued to letters, e.g. "pro256" or "256gb全新". Only whole
/// digit runs count, so "12800" never yields 128.
fn storage_bare_number(text: &str) -> Option<u32> {
    DIGIT_RUN_RE
        .find_iter(text)
        .filter(|m| !is_generation(text, m.start()))
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .find(|n| PLAUSIBLE_GB.contains(n))
}

fn storage_terabyte(text: &str) -> Option<u32> {
    TERABYTE_RE.is_match(text).then_some(1024)
}

/// True when the number starting at `start` directly follows the brand token.
fn is_generation(text: &str, start: usize) -> bool {
    text[..start].trim_end().ends_with("iphone")
}
