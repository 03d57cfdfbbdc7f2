use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing::{debug, error, info, warn};

use super::attributes::ListingAttributes;
use super::features::{prepare_aligned, unknown_columns, FeatureOptions, FeatureVector};
use super::model::{ModelError, PriceModel, VotingRegressor};

/// Why an estimate could not be produced. The predictor absorbs all of these;
/// [`PricePredictor::try_predict`] exposes them for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("no price model is loaded")]
    ModelUnavailable,
    #[error("feature row has {actual} columns but the model expects {expected}")]
    FeatureMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    Inference(#[from] ModelError),
    #[error("model returned no output")]
    EmptyOutput,
    #[error("model returned an unusable price: {0}")]
    InvalidPrice(f64),
}

/// Fail-soft sale-price estimator. Holds an optional, immutable model handle
/// fixed when the predictor is built.
#[derive(Clone)]
pub struct PricePredictor {
    model: Option<Arc<dyn PriceModel>>,
    options: FeatureOptions,
}

impl std::fmt::Debug for PricePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricePredictor")
            .field("model_loaded", &self.model.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl PricePredictor {
    pub fn new(model: Arc<dyn PriceModel>, options: FeatureOptions) -> Self {
        Self {
            model: Some(model),
            options,
        }
    }

    /// Predictor that always reports the price as unavailable.
    pub fn without_model(options: FeatureOptions) -> Self {
        Self {
            model: None,
            options,
        }
    }

    /// Load the artifact at `path`. A missing or unreadable artifact yields a
    /// predictor without a model rather than an error.
    pub fn load(path: impl AsRef<Path>, options: FeatureOptions) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                path = %path.display(),
                "price model not found; price predictions will be skipped"
            );
            return Self::without_model(options);
        }

        match VotingRegressor::from_path(path) {
            Ok(model) => {
                if let Some(expected) = model.expected_columns() {
                    let unknown = unknown_columns(expected);
                    if !unknown.is_empty() {
                        warn!(
                            ?unknown,
                            "model expects columns the feature preparer never produces; they will be zero-filled"
                        );
                    }
                } else {
                    warn!("model does not record its feature names; passing computed features through");
                }
                info!(
                    path = %path.display(),
                    estimators = model.estimators.len(),
                    "price model loaded"
                );
                Self::new(Arc::new(model), options)
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to load price model");
                Self::without_model(options)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn options(&self) -> &FeatureOptions {
        &self.options
    }

    /// Feature row as it would be handed to the loaded model.
    pub fn prepare_features(&self, attrs: &ListingAttributes) -> FeatureVector {
        let expected = self.model.as_ref().and_then(|model| model.expected_columns());
        prepare_aligned(attrs, &self.options, expected)
    }

    /// Estimated sale price, or `None` when no model is loaded or inference
    /// fails. Failures are logged, never returned.
    pub fn predict_price(&self, attrs: &ListingAttributes) -> Option<f64> {
        match self.try_predict(attrs) {
            Ok(price) => {
                debug!(price, "predicted listing price");
                Some(price)
            }
            Err(PredictionError::ModelUnavailable) => {
                debug!("price model unavailable; skipping prediction");
                None
            }
            Err(err) => {
                warn!(error = %err, "price prediction failed");
                None
            }
        }
    }

    pub fn try_predict(&self, attrs: &ListingAttributes) -> Result<f64, PredictionError> {
        let model = self
            .model
            .as_ref()
            .ok_or(PredictionError::ModelUnavailable)?;

        let features = prepare_aligned(attrs, &self.options, model.expected_columns());
        if let Some(expected) = model.expected_columns() {
            if expected.len() != features.len() {
                return Err(PredictionError::FeatureMismatch {
                    expected: expected.len(),
                    actual: features.len(),
                });
            }
        }

        let output = run_model(model.as_ref(), &features.values())?;
        let price = *output.first().ok_or(PredictionError::EmptyOutput)?;
        if !price.is_finite() || price < 0.0 {
            return Err(PredictionError::InvalidPrice(price));
        }

        Ok(price)
    }
}

/// Invoke the model, turning a panic inside it into a runtime error.
fn run_model(model: &dyn PriceModel, row: &[f64]) -> Result<Vec<f64>, ModelError> {
    panic::catch_unwind(AssertUnwindSafe(|| model.predict(row))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|text| text.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        warn!(panic = %message, "price model panicked during inference");
        Err(ModelError::Runtime(format!("model panicked: {message}")))
    })
}

static GLOBAL_PREDICTOR: OnceLock<PricePredictor> = OnceLock::new();

/// Install the process-wide predictor. Only the first call takes effect;
/// later calls return `false` and leave the installed predictor untouched.
pub fn install(predictor: PricePredictor) -> bool {
    GLOBAL_PREDICTOR.set(predictor).is_ok()
}

pub fn installed() -> Option<&'static PricePredictor> {
    GLOBAL_PREDICTOR.get()
}

/// Estimate with the installed predictor; `None` if none was installed.
pub fn predict_price(attrs: &ListingAttributes) -> Option<f64> {
    installed().and_then(|predictor| predictor.predict_price(attrs))
}
