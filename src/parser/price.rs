/// Price strings that mean "given away" on the marketplace.
const FREE_TOKENS: &[&str] = &["free", "0", "nt$0", "nt$0.00", "$0", "免費"];

/// Parse a marketplace price like `NT$15,000` into whole currency units.
///
/// Every non-digit character is dropped, so `NT$1,234` → 1234. Returns
/// `None` when nothing numeric is left (or it overflows).
pub fn parse_price(raw: &str) -> Option<u64> {
    let cleaned = raw.trim().to_lowercase();
    if FREE_TOKENS.contains(&cleaned.as_str()) {
        return Some(0);
    }
    let digits: String = cleaned.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
