use clap::Args;
use estate_ai::config::AppConfig;
use estate_ai::error::AppError;
use estate_ai::listings::domain::price_in_crore;
use estate_ai::pricing::import::{self, ImportedListing};
use estate_ai::pricing::{
    self, FeatureVector, FlagValue, ListingAttributes, PricePerSqftStrategy, PricePredictor,
};
use estate_ai::telemetry;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub(crate) struct EstimateArgs {
    /// Model artifact to load (defaults to APP_MODEL_PATH)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Override how the price_per_sqft column is filled (zero or area)
    #[arg(long, value_parser = parse_strategy)]
    pub(crate) price_per_sqft: Option<PricePerSqftStrategy>,
    /// Housing-style CSV export; every row is estimated
    #[arg(
        long,
        conflicts_with_all = [
            "area", "bedrooms", "bathrooms", "stories", "parking", "year_built",
            "mainroad", "guestroom", "basement", "hotwaterheating", "airconditioning",
            "prefarea", "furnishing",
        ]
    )]
    pub(crate) csv: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) listing: ListingArgs,
}

/// A single listing described on the command line. Amenity flags take the
/// same values a form or CSV cell would (`Yes`, `No`, `1`, `0`, `true`).
#[derive(Args, Debug, Default)]
pub(crate) struct ListingArgs {
    #[arg(long)]
    pub(crate) area: Option<i64>,
    #[arg(long)]
    pub(crate) bedrooms: Option<i64>,
    #[arg(long)]
    pub(crate) bathrooms: Option<i64>,
    #[arg(long)]
    pub(crate) stories: Option<i64>,
    #[arg(long)]
    pub(crate) parking: Option<i64>,
    #[arg(long)]
    pub(crate) year_built: Option<i64>,
    #[arg(long)]
    pub(crate) mainroad: Option<String>,
    #[arg(long)]
    pub(crate) guestroom: Option<String>,
    #[arg(long)]
    pub(crate) basement: Option<String>,
    #[arg(long)]
    pub(crate) hotwaterheating: Option<String>,
    #[arg(long)]
    pub(crate) airconditioning: Option<String>,
    #[arg(long)]
    pub(crate) prefarea: Option<String>,
    /// furnished, semi-furnished or unfurnished
    #[arg(long)]
    pub(crate) furnishing: Option<String>,
}

impl ListingArgs {
    pub(crate) fn into_attributes(self) -> ListingAttributes {
        let flag = |raw: Option<String>| raw.as_deref().map(FlagValue::from_cell);
        ListingAttributes {
            area: self.area,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            stories: self.stories,
            parking: self.parking,
            year_built: self.year_built,
            mainroad: flag(self.mainroad),
            guestroom: flag(self.guestroom),
            basement: flag(self.basement),
            hotwaterheating: flag(self.hotwaterheating),
            airconditioning: flag(self.airconditioning),
            prefarea: flag(self.prefarea),
            furnishingstatus: self.furnishing,
            description: None,
        }
    }
}

fn parse_strategy(raw: &str) -> Result<PricePerSqftStrategy, String> {
    PricePerSqftStrategy::parse(raw)
        .ok_or_else(|| format!("expected 'zero' or 'area', got '{raw}'"))
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let EstimateArgs {
        model,
        price_per_sqft,
        csv,
        listing,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let mut options = config.pricing.feature_options();
    if let Some(strategy) = price_per_sqft {
        options.price_per_sqft = strategy;
    }
    let model_path = model.unwrap_or(config.pricing.model_path);
    let predictor = PricePredictor::load(&model_path, options);

    println!("Estate AI price estimate");
    println!(
        "Model: {} ({})",
        model_path.display(),
        if predictor.is_available() {
            "loaded"
        } else {
            "unavailable"
        }
    );

    pricing::install(predictor.clone());

    match csv {
        Some(path) => {
            let listings = import::parse_path(&path)?;
            render_batch(&path, &listings);
        }
        None => {
            let attributes = listing.into_attributes();
            render_features(&predictor.prepare_features(&attributes));
            println!(
                "\nEstimated price: {}",
                format_price(pricing::predict_price(&attributes))
            );
        }
    }

    Ok(())
}

fn render_features(features: &FeatureVector) {
    println!("\nFeature vector ({} columns)", features.len());
    for column in features.columns() {
        println!("  {:<34} {}", column.name, column.value);
    }
}

fn render_batch(path: &Path, listings: &[ImportedListing]) {
    println!(
        "\nBatch estimate for {} ({} rows)",
        path.display(),
        listings.len()
    );
    println!("  {:<6} {:>16} {:>16}", "line", "listed", "estimate");

    let mut estimated = 0usize;
    let mut errors = Vec::new();
    for listing in listings {
        let estimate = pricing::predict_price(&listing.attributes);
        if estimate.is_some() {
            estimated += 1;
        }
        if let (Some(listed), Some(estimate)) = (listing.listed_price, estimate) {
            errors.push((listed - estimate).abs());
        }
        println!(
            "  {:<6} {:>16} {:>16}",
            listing.line,
            format_amount(listing.listed_price),
            format_amount(estimate)
        );
    }

    println!("\nEstimated rows: {estimated}/{}", listings.len());
    if let Some(mae) = mean(&errors) {
        println!("Mean absolute error against listed prices: {mae:.0}");
    }
}

fn format_amount(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.0}"))
}

pub(crate) fn format_price(price: Option<f64>) -> String {
    match price {
        Some(price) => format!("{price:.0} ({:.2} Cr)", price_in_crore(price)),
        None => "unavailable".to_string(),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
