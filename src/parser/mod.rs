pub mod model;
pub mod normalize;
pub mod price;
pub mod storage;

use crate::records::{ExtractedListing, RawListing};

/// Title → normalized text → (model, storage); price string → number.
pub fn process_listing(raw: &RawListing) -> ExtractedListing {
    let normalized = normalize::normalize_title(&raw.title);
    ExtractedListing {
        title: raw.title.clone(),
        price: raw.price.clone(),
        link: raw.link.clone(),
        location: raw.location.clone(),
        model: model::extract_model(&normalized),
        storage: storage::extract_storage(&normalized),
        price_num: price::parse_price(&raw.price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ModelLabel, Storage};

    fn raw(title: &str, price: &str) -> RawListing {
        RawListing {
            title: title.to_string(),
            price: price.to_string(),
            link: "https://example.com/item/1".to_string(),
            location: "台北市".to_string(),
        }
    }

    #[test]
    fn full_listing() {
        let listing = process_listing(&raw("iPhone 13 Pro Max 256GB 全新", "NT$15,000"));
        assert_eq!(listing.model, ModelLabel::Known("iPhone 13 Pro Max".into()));
        assert_eq!(listing.storage, Storage::Gb(256));
        assert_eq!(listing.price_num, Some(15000));
        assert_eq!(listing.title, "iPhone 13 Pro Max 256GB 全新");
        assert_eq!(listing.location, "台北市");
    }

    #[test]
    fn accessory_title_extracts_nothing() {
        let listing = process_listing(&raw("出售手機殼", "NT$100"));
        assert_eq!(listing.model, ModelLabel::Unknown);
        assert_eq!(listing.storage, Storage::Unknown);
        assert_eq!(listing.price_num, Some(100));
    }

    #[test]
    fn missing_fields_never_panic() {
        let listing = process_listing(&RawListing::default());
        assert_eq!(listing.model, ModelLabel::Unknown);
        assert_eq!(listing.storage, Storage::Unknown);
        assert_eq!(listing.price_num, None);
    }
}
