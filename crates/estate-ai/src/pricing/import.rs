use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::attributes::{whole_number, FlagField, FlagValue, ListingAttributes, NumericField};

/// A listing row read from a housing export, with the sale price when the
/// export carries one.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedListing {
    pub line: u64,
    pub attributes: ListingAttributes,
    pub listed_price: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unable to open listing export: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed listing export: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: column '{column}' must be a whole number (got '{value}')")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("line {line}: price must be numeric (got '{value}')")]
    InvalidPrice { line: u64, value: String },
}

pub fn parse_path(path: impl AsRef<Path>) -> Result<Vec<ImportedListing>, ImportError> {
    let file = File::open(path)?;
    parse_attributes(file)
}

/// Read listing rows from CSV. Headers follow the attribute names; cells are
/// trimmed and empty cells are treated as absent.
pub fn parse_attributes<R: Read>(reader: R) -> Result<Vec<ImportedListing>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut listings = Vec::new();

    let headers = csv_reader.headers()?.clone();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line());
        let row: ListingRow = record.deserialize(Some(&headers))?;
        listings.push(row.into_listing(line)?);
    }

    Ok(listings)
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    price: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    area: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    bedrooms: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    bathrooms: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    stories: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    mainroad: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    guestroom: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    basement: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    hotwaterheating: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    airconditioning: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    parking: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    prefarea: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    furnishingstatus: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    year_built: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
}

impl ListingRow {
    fn into_listing(self, line: u64) -> Result<ImportedListing, ImportError> {
        let mut attributes = ListingAttributes::default();

        let numbers = [
            (NumericField::Area, &self.area),
            (NumericField::Bedrooms, &self.bedrooms),
            (NumericField::Bathrooms, &self.bathrooms),
            (NumericField::Stories, &self.stories),
            (NumericField::Parking, &self.parking),
            (NumericField::YearBuilt, &self.year_built),
        ];
        for (field, raw) in numbers {
            let value = raw
                .as_deref()
                .map(|value| parse_whole(line, field.column(), value))
                .transpose()?;
            attributes.set_number(field, value);
        }

        let flags = [
            (FlagField::Mainroad, &self.mainroad),
            (FlagField::Guestroom, &self.guestroom),
            (FlagField::Basement, &self.basement),
            (FlagField::Hotwaterheating, &self.hotwaterheating),
            (FlagField::Airconditioning, &self.airconditioning),
            (FlagField::Prefarea, &self.prefarea),
        ];
        for (field, raw) in flags {
            attributes.set_flag(field, raw.as_deref().map(FlagValue::from_cell));
        }

        attributes.furnishingstatus = self.furnishingstatus;
        attributes.description = self.description;

        let listed_price = self
            .price
            .map(|value| {
                value
                    .parse::<f64>()
                    .map_err(|_| ImportError::InvalidPrice { line, value })
            })
            .transpose()?;

        Ok(ImportedListing {
            line,
            attributes,
            listed_price,
        })
    }
}

/// Exports sometimes write integers as `3.0`; accept those, reject fractions.
fn parse_whole(line: u64, column: &'static str, value: &str) -> Result<i64, ImportError> {
    if let Ok(parsed) = value.parse::<i64>() {
        return Ok(parsed);
    }

    value
        .parse::<f64>()
        .ok()
        .and_then(whole_number)
        .ok_or_else(|| ImportError::InvalidNumber {
            line,
            column,
            value: value.to_string(),
        })
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
