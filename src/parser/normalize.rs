use std::sync::LazyLock;

use regex::Regex;

static BRAND_TYPO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"i[\s\-]?phone").unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\-]+").unwrap());
static COMPACT_BRAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bi(\d{1,2}[a-z]*)\b").unwrap());

/// Lowercase, fold brand spelling variants into `iphone`, collapse runs of
/// whitespace and hyphens into single spaces.
///
/// The compact `i13` / `i13promax` shorthand is expanded to `iphone 13...`
/// so the model extractor only ever has to look behind one brand token.
pub fn normalize_title(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let branded = BRAND_TYPO_RE.replace_all(&lower, "iphone");
    let spaced = SEPARATOR_RE.replace_all(&branded, " ");
    let trimmed = spaced.trim();
    COMPACT_BRAND_RE
        .replace_all(trimmed, "iphone ${1}")
        .into_owned()
}
