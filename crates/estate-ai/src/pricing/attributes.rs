use serde::{de, Deserialize, Deserializer, Serialize};

/// Seller-provided description of a property. Every field is optional; the
/// feature preparer substitutes zero for anything missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingAttributes {
    /// Floor area in square feet.
    #[serde(deserialize_with = "deserialize_whole")]
    pub area: Option<i64>,
    #[serde(deserialize_with = "deserialize_whole")]
    pub bedrooms: Option<i64>,
    #[serde(deserialize_with = "deserialize_whole")]
    pub bathrooms: Option<i64>,
    #[serde(deserialize_with = "deserialize_whole")]
    pub stories: Option<i64>,
    pub mainroad: Option<FlagValue>,
    pub guestroom: Option<FlagValue>,
    pub basement: Option<FlagValue>,
    pub hotwaterheating: Option<FlagValue>,
    pub airconditioning: Option<FlagValue>,
    /// Covered parking spaces.
    #[serde(deserialize_with = "deserialize_whole")]
    pub parking: Option<i64>,
    pub prefarea: Option<FlagValue>,
    pub furnishingstatus: Option<String>,
    #[serde(deserialize_with = "deserialize_whole")]
    pub year_built: Option<i64>,
    pub description: Option<String>,
}

/// `value` as an integer when it is finite, has no fractional part and fits
/// in an `i64`.
pub(crate) fn whole_number(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then(|| value as i64)
}

/// Accepts JSON integers and integral floats such as `2000.0`.
fn deserialize_whole<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Option::<Number>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Number::Int(value)) => Ok(Some(value)),
        Some(Number::Float(value)) => whole_number(value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected a whole number, got {value}"))),
    }
}

/// Integer attributes that feed the feature row directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Area,
    Bedrooms,
    Bathrooms,
    Stories,
    Parking,
    YearBuilt,
}

impl NumericField {
    pub const fn column(self) -> &'static str {
        match self {
            NumericField::Area => "area",
            NumericField::Bedrooms => "bedrooms",
            NumericField::Bathrooms => "bathrooms",
            NumericField::Stories => "stories",
            NumericField::Parking => "parking",
            NumericField::YearBuilt => "year_built",
        }
    }
}

/// Yes/No amenities encoded as 0/1 indicator columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagField {
    Mainroad,
    Guestroom,
    Basement,
    Hotwaterheating,
    Airconditioning,
    Prefarea,
}

impl FlagField {
    pub const ALL: [FlagField; 6] = [
        FlagField::Mainroad,
        FlagField::Guestroom,
        FlagField::Basement,
        FlagField::Hotwaterheating,
        FlagField::Airconditioning,
        FlagField::Prefarea,
    ];

    pub const fn column(self) -> &'static str {
        match self {
            FlagField::Mainroad => "mainroad",
            FlagField::Guestroom => "guestroom",
            FlagField::Basement => "basement",
            FlagField::Hotwaterheating => "hotwaterheating",
            FlagField::Airconditioning => "airconditioning",
            FlagField::Prefarea => "prefarea",
        }
    }
}

impl ListingAttributes {
    /// Value of an integer attribute, or 0 when absent.
    pub fn number(&self, field: NumericField) -> i64 {
        self.raw_number(field).unwrap_or(0)
    }

    pub fn raw_number(&self, field: NumericField) -> Option<i64> {
        match field {
            NumericField::Area => self.area,
            NumericField::Bedrooms => self.bedrooms,
            NumericField::Bathrooms => self.bathrooms,
            NumericField::Stories => self.stories,
            NumericField::Parking => self.parking,
            NumericField::YearBuilt => self.year_built,
        }
    }

    pub fn raw_flag(&self, field: FlagField) -> Option<&FlagValue> {
        match field {
            FlagField::Mainroad => self.mainroad.as_ref(),
            FlagField::Guestroom => self.guestroom.as_ref(),
            FlagField::Basement => self.basement.as_ref(),
            FlagField::Hotwaterheating => self.hotwaterheating.as_ref(),
            FlagField::Airconditioning => self.airconditioning.as_ref(),
            FlagField::Prefarea => self.prefarea.as_ref(),
        }
    }

    /// Normalized 0/1 indicator for an amenity; absent values read as 0.
    pub fn flag(&self, field: FlagField) -> u8 {
        self.raw_flag(field).map_or(0, FlagValue::indicator)
    }

    pub fn furnishing(&self) -> Option<FurnishingStatus> {
        self.furnishingstatus
            .as_deref()
            .and_then(FurnishingStatus::parse)
    }

    pub(crate) fn set_number(&mut self, field: NumericField, value: Option<i64>) {
        let slot = match field {
            NumericField::Area => &mut self.area,
            NumericField::Bedrooms => &mut self.bedrooms,
            NumericField::Bathrooms => &mut self.bathrooms,
            NumericField::Stories => &mut self.stories,
            NumericField::Parking => &mut self.parking,
            NumericField::YearBuilt => &mut self.year_built,
        };
        *slot = value;
    }

    pub(crate) fn set_flag(&mut self, field: FlagField, value: Option<FlagValue>) {
        let slot = match field {
            FlagField::Mainroad => &mut self.mainroad,
            FlagField::Guestroom => &mut self.guestroom,
            FlagField::Basement => &mut self.basement,
            FlagField::Hotwaterheating => &mut self.hotwaterheating,
            FlagField::Airconditioning => &mut self.airconditioning,
            FlagField::Prefarea => &mut self.prefarea,
        };
        *slot = value;
    }
}

/// Loosely typed boolean as submitted by forms, CSV exports, or API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FlagValue {
    /// `"Yes"`, `1` and `true` are set; everything else is unset. Matching on
    /// text is exact, so `"yes"` and `"Y"` read as 0.
    pub fn indicator(&self) -> u8 {
        let set = match self {
            FlagValue::Bool(value) => *value,
            FlagValue::Int(value) => *value == 1,
            FlagValue::Float(value) => *value == 1.0,
            FlagValue::Text(value) => value == "Yes",
        };
        u8::from(set)
    }
}

impl FlagValue {
    /// Interpret untyped text such as a CSV cell or command-line argument:
    /// `true`/`false` and integers keep their typed meaning, anything else
    /// stays text.
    pub fn from_cell(value: &str) -> Self {
        match value {
            "true" => FlagValue::Bool(true),
            "false" => FlagValue::Bool(false),
            other => other
                .parse::<i64>()
                .map(FlagValue::Int)
                .unwrap_or_else(|_| FlagValue::Text(other.to_string())),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        FlagValue::Int(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Text(value.to_string())
    }
}

/// Recognized furnishing categories; each maps to one one-hot column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FurnishingStatus {
    #[serde(rename = "furnished")]
    Furnished,
    #[serde(rename = "semi-furnished")]
    SemiFurnished,
    #[serde(rename = "unfurnished")]
    Unfurnished,
}

impl FurnishingStatus {
    pub const ALL: [FurnishingStatus; 3] = [
        FurnishingStatus::Furnished,
        FurnishingStatus::SemiFurnished,
        FurnishingStatus::Unfurnished,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "furnished" => Some(FurnishingStatus::Furnished),
            "semi-furnished" => Some(FurnishingStatus::SemiFurnished),
            "unfurnished" => Some(FurnishingStatus::Unfurnished),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FurnishingStatus::Furnished => "furnished",
            FurnishingStatus::SemiFurnished => "semi-furnished",
            FurnishingStatus::Unfurnished => "unfurnished",
        }
    }

    pub const fn column(self) -> &'static str {
        match self {
            FurnishingStatus::Furnished => "furnishingstatus_furnished",
            FurnishingStatus::SemiFurnished => "furnishingstatus_semi-furnished",
            FurnishingStatus::Unfurnished => "furnishingstatus_unfurnished",
        }
    }
}
