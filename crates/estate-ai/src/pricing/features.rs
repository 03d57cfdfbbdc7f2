//! Feature engineering for the sale-price model.
//!
//! The regression model was trained on a fixed, named column set. This module
//! rebuilds that row from [`ListingAttributes`]: amenity flags become 0/1,
//! furnishing status is one-hot encoded, four derived columns are appended,
//! and the result is aligned to the column order the model recorded during
//! training.

use serde::{Deserialize, Serialize};

use super::attributes::{FlagField, FurnishingStatus, ListingAttributes, NumericField};

pub const LUXURY_INDEX: &str = "luxury_index";
pub const PRICE_PER_SQFT: &str = "price_per_sqft";
pub const ROOMS_TOTAL: &str = "rooms_total";
pub const PARKING_RATIO: &str = "parking_ratio";

/// Column order of the housing regressor shipped with the portal.
pub const HOUSING_MODEL_COLUMNS: [&str; 18] = [
    "area",
    "bedrooms",
    "bathrooms",
    "stories",
    "parking",
    "mainroad",
    "guestroom",
    "basement",
    "hotwaterheating",
    "airconditioning",
    "prefarea",
    "furnishingstatus_furnished",
    "furnishingstatus_semi-furnished",
    "furnishingstatus_unfurnished",
    LUXURY_INDEX,
    PRICE_PER_SQFT,
    ROOMS_TOTAL,
    PARKING_RATIO,
];

const LEADING_NUMERIC: [NumericField; 5] = [
    NumericField::Area,
    NumericField::Bedrooms,
    NumericField::Bathrooms,
    NumericField::Stories,
    NumericField::Parking,
];

/// How the `price_per_sqft` column is filled. Must match the convention the
/// deployed model was trained with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePerSqftStrategy {
    /// Constant 0 placeholder.
    #[default]
    Zero,
    /// Mirrors the `area` column.
    Area,
}

impl PricePerSqftStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "zero" => Some(Self::Zero),
            "area" => Some(Self::Area),
            _ => None,
        }
    }

    fn value(self, area: f64) -> f64 {
        match self {
            PricePerSqftStrategy::Zero => 0.0,
            PricePerSqftStrategy::Area => area,
        }
    }
}

/// Knobs that must match how the deployed model was trained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureOptions {
    pub price_per_sqft: PricePerSqftStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    pub value: f64,
}

/// Ordered, uniquely named numeric row fed to the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    columns: Vec<FeatureColumn>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, overwriting the value in place if the name already exists.
    pub fn set(&mut self, name: &str, value: f64) {
        match self.columns.iter_mut().find(|column| column.name == name) {
            Some(column) => column.value = value,
            None => self.columns.push(FeatureColumn {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.columns.iter().map(|column| column.value).collect()
    }

    /// Reorder to `expected`, zero-filling columns that were not produced and
    /// dropping ones the model does not know. `None` passes the row through.
    pub fn align(&self, expected: Option<&[String]>) -> FeatureVector {
        let Some(expected) = expected else {
            return self.clone();
        };

        let mut aligned = FeatureVector {
            columns: Vec::with_capacity(expected.len()),
        };
        for name in expected {
            if aligned.get(name).is_some() {
                continue;
            }
            aligned.columns.push(FeatureColumn {
                name: name.clone(),
                value: self.get(name).unwrap_or(0.0),
            });
        }
        aligned
    }
}

/// Build the full computed feature set for a listing, in a stable order.
pub fn prepare_features(attrs: &ListingAttributes, options: &FeatureOptions) -> FeatureVector {
    let mut features = FeatureVector {
        columns: Vec::with_capacity(HOUSING_MODEL_COLUMNS.len() + 1),
    };

    for field in LEADING_NUMERIC {
        features.set(field.column(), attrs.number(field) as f64);
    }

    for field in FlagField::ALL {
        features.set(field.column(), f64::from(attrs.flag(field)));
    }

    let furnishing = attrs.furnishing();
    for status in FurnishingStatus::ALL {
        let hot = furnishing == Some(status);
        features.set(status.column(), if hot { 1.0 } else { 0.0 });
    }

    features.set(
        NumericField::YearBuilt.column(),
        attrs.number(NumericField::YearBuilt) as f64,
    );

    let area = attrs.number(NumericField::Area) as f64;
    let bedrooms = attrs.number(NumericField::Bedrooms) as f64;
    let bathrooms = attrs.number(NumericField::Bathrooms) as f64;
    let parking = attrs.number(NumericField::Parking) as f64;

    features.set(LUXURY_INDEX, area * bedrooms);
    features.set(PRICE_PER_SQFT, options.price_per_sqft.value(area));
    features.set(ROOMS_TOTAL, bedrooms + bathrooms);
    features.set(PARKING_RATIO, parking / area.max(1.0));

    features
}

/// Compute features and align them to a model schema in one step.
pub fn prepare_aligned(
    attrs: &ListingAttributes,
    options: &FeatureOptions,
    expected: Option<&[String]>,
) -> FeatureVector {
    prepare_features(attrs, options).align(expected)
}

/// Expected columns that [`prepare_features`] never produces. These are
/// zero-filled at prediction time, which usually signals a naming mismatch
/// between the artifact and this module.
pub fn unknown_columns(expected: &[String]) -> Vec<String> {
    let computed = prepare_features(&ListingAttributes::default(), &FeatureOptions::default());
    expected
        .iter()
        .filter(|name| computed.get(name).is_none())
        .cloned()
        .collect()
}
