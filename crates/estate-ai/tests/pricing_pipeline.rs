//! End-to-end estimation scenarios: raw attributes in, fail-soft price out,
//! driven through the public predictor and a JSON model artifact on disk.

use std::fs;
use std::path::PathBuf;

use estate_ai::pricing::{
    FeatureOptions, FlagValue, ListingAttributes, PricePerSqftStrategy, PricePredictor,
    HOUSING_MODEL_COLUMNS,
};
use serde_json::json;

fn sample_listing() -> ListingAttributes {
    serde_json::from_value(json!({
        "area": 2000,
        "bedrooms": 3,
        "bathrooms": 2,
        "stories": 2,
        "mainroad": "Yes",
        "guestroom": "No",
        "basement": "No",
        "hotwaterheating": "No",
        "airconditioning": "Yes",
        "parking": 1,
        "prefarea": "Yes",
        "furnishingstatus": "semi-furnished",
        "year_built": 2015
    }))
    .expect("sample deserializes")
}

fn write_artifact(dir: &tempfile::TempDir) -> PathBuf {
    let mut coefficients = vec![0.0; HOUSING_MODEL_COLUMNS.len()];
    coefficients[0] = 400.0; // area
    coefficients[2] = 900_000.0; // bathrooms
    coefficients[9] = 750_000.0; // airconditioning

    let artifact = json!({
        "feature_names_in": HOUSING_MODEL_COLUMNS,
        "estimators": [
            { "kind": "linear", "coefficients": coefficients, "intercept": 1_500_000.0 },
            { "kind": "tree", "nodes": [
                { "split": { "feature": 0, "threshold": 3000.0, "left": 1, "right": 2 } },
                { "leaf": { "value": 4_000_000.0 } },
                { "leaf": { "value": 7_000_000.0 } }
            ] }
        ]
    });

    let path = dir.path().join("voting_regression.json");
    fs::write(&path, artifact.to_string()).expect("artifact written");
    path
}

#[test]
fn sample_listing_has_no_price_without_model() {
    let predictor =
        PricePredictor::load("models/does-not-exist.json", FeatureOptions::default());
    assert_eq!(predictor.predict_price(&sample_listing()), None);
}

#[test]
fn sample_listing_is_priced_with_loaded_model() {
    let dir = tempfile::tempdir().expect("tempdir");
    let predictor = PricePredictor::load(write_artifact(&dir), FeatureOptions::default());
    assert!(predictor.is_available());

    let price = predictor
        .predict_price(&sample_listing())
        .expect("price available");

    // linear: 1.5M + 2000*400 + 2*900k + 750k = 4.85M; tree: 4M
    assert!(price.is_finite());
    assert!((price - 4_425_000.0).abs() < 1e-6);
}

#[test]
fn aligned_row_matches_training_schema() {
    let dir = tempfile::tempdir().expect("tempdir");
    let predictor = PricePredictor::load(write_artifact(&dir), FeatureOptions::default());

    let features = predictor.prepare_features(&sample_listing());
    assert_eq!(features.names(), HOUSING_MODEL_COLUMNS.to_vec());
    assert_eq!(
        features.values(),
        vec![
            2000.0, 3.0, 2.0, 2.0, 1.0, // area..parking
            1.0, 0.0, 0.0, 0.0, 1.0, 1.0, // flags
            0.0, 1.0, 0.0, // furnishing
            6000.0, 0.0, 5.0, 0.0005, // derived
        ]
    );
}

#[test]
fn price_per_sqft_strategy_reaches_the_model_row() {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = FeatureOptions {
        price_per_sqft: PricePerSqftStrategy::Area,
    };
    let predictor = PricePredictor::load(write_artifact(&dir), options);

    let features = predictor.prepare_features(&sample_listing());
    assert_eq!(features.get("price_per_sqft"), Some(2000.0));
}

#[test]
fn missing_artifact_never_prices_anything() {
    let predictor = PricePredictor::load("/definitely/not/here.json", FeatureOptions::default());

    let inputs = [
        sample_listing(),
        ListingAttributes::default(),
        ListingAttributes {
            area: Some(0),
            parking: Some(4),
            mainroad: Some(FlagValue::Bool(true)),
            ..ListingAttributes::default()
        },
    ];
    for attrs in &inputs {
        assert_eq!(predictor.predict_price(attrs), None);
    }
}

#[test]
fn corrupt_artifact_disables_predictions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("voting_regression.json");
    fs::write(&path, "{ not json").expect("artifact written");

    let predictor = PricePredictor::load(&path, FeatureOptions::default());
    assert!(!predictor.is_available());
    assert_eq!(predictor.predict_price(&sample_listing()), None);
}

#[test]
fn artifact_with_mismatched_schema_fails_soft() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("voting_regression.json");
    let artifact = json!({
        "estimators": [
            { "kind": "linear", "coefficients": [1.0, 2.0, 3.0], "intercept": 0.0 }
        ]
    });
    fs::write(&path, artifact.to_string()).expect("artifact written");

    let predictor = PricePredictor::load(&path, FeatureOptions::default());
    assert!(predictor.is_available());
    // the computed row has 19 columns, the model takes 3
    assert_eq!(predictor.predict_price(&sample_listing()), None);
}

fn shipped_artifact() -> PathBuf {
    PathBuf::from(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../models/voting_regression.json"
    ))
}

#[test]
fn shipped_artifact_prices_the_sample_listing() {
    let predictor = PricePredictor::load(shipped_artifact(), FeatureOptions::default());
    assert!(predictor.is_available());

    let price = predictor
        .predict_price(&sample_listing())
        .expect("sample is priced");
    assert!((price - 5_520_700.0).abs() < 1.0, "{price}");

    let features = predictor.prepare_features(&sample_listing());
    assert_eq!(features.names(), HOUSING_MODEL_COLUMNS.to_vec());
}

#[test]
fn shipped_artifact_yields_usable_prices_across_sizes() {
    let predictor = PricePredictor::load(shipped_artifact(), FeatureOptions::default());

    for area in (0..=16_200).step_by(1_800) {
        let attrs = ListingAttributes {
            area: Some(area),
            ..sample_listing()
        };
        let price = predictor.predict_price(&attrs).expect("priced");
        assert!(price.is_finite() && price >= 0.0, "area {area}: {price}");
    }

    let empty = predictor
        .predict_price(&ListingAttributes::default())
        .expect("empty listing is priced");
    assert!(empty >= 0.0);
}
