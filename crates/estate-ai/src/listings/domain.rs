use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::ListingAttributes;

/// Image shown when a listing has no stored photo.
pub const DEFAULT_IMAGE_PATH: &str = "static/images/default.jpg";

/// Upper slider bound used before any listing carries a positive price.
pub const DEFAULT_MAX_PRICE: f64 = 10_000_000.0;

const RUPEES_PER_CRORE: f64 = 10_000_000.0;

/// Identifier wrapper for stored listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub u64);

/// Photo uploaded alongside a seller submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Lowercased extension taken from the uploaded file name.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

/// Listing ready to be persisted; the repository assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub attributes: ListingAttributes,
    pub price: Option<f64>,
    pub image_path: Option<String>,
}

/// Stored listing with its estimate, if one was available at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub listing_id: ListingId,
    pub attributes: ListingAttributes,
    pub price: Option<f64>,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ListingRecord {
    pub fn view(&self) -> ListingView {
        let bedrooms = display_count(self.attributes.bedrooms);
        let area = display_count(self.attributes.area);

        ListingView {
            listing_id: self.listing_id,
            price: self.price,
            price_crore: self.price.map(price_in_crore),
            price_available: self.price.is_some(),
            headline: format!("{bedrooms} BHK | {area} sqft"),
            image_path: self
                .image_path
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE_PATH.to_string()),
            attributes: self.attributes.clone(),
            created_at: self.created_at,
        }
    }
}

fn display_count(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

/// Price in crore, rounded to two decimals for display.
pub fn price_in_crore(price: f64) -> f64 {
    (price / RUPEES_PER_CRORE * 100.0).round() / 100.0
}

/// Buyer-facing rendering of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingView {
    pub listing_id: ListingId,
    pub price: Option<f64>,
    pub price_crore: Option<f64>,
    pub price_available: bool,
    pub headline: String,
    pub image_path: String,
    pub attributes: ListingAttributes,
    pub created_at: DateTime<Utc>,
}

/// Inclusive price filter. Once either bound is set, unpriced listings no
/// longer match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default, rename = "min_price")]
    pub min: Option<f64>,
    #[serde(default, rename = "max_price")]
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn matches(&self, price: Option<f64>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(price) = price else {
            return false;
        };
        self.min.map_or(true, |min| price >= min) && self.max.map_or(true, |max| price <= max)
    }
}

/// Slider limits for the buyer price filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

impl PriceBounds {
    /// Smallest and largest known prices, falling back to `0` and
    /// [`DEFAULT_MAX_PRICE`] when they are not positive.
    pub fn from_prices(prices: impl IntoIterator<Item = f64>) -> Self {
        let (mut low, mut high) = (None::<f64>, None::<f64>);
        for price in prices {
            low = Some(low.map_or(price, |current| current.min(price)));
            high = Some(high.map_or(price, |current| current.max(price)));
        }

        Self {
            min: low.filter(|price| *price > 0.0).unwrap_or(0.0).floor(),
            max: high
                .filter(|price| *price > 0.0)
                .unwrap_or(DEFAULT_MAX_PRICE)
                .floor(),
        }
    }
}
