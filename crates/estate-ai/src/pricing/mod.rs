//! Sale-price estimation for seller submissions.

pub mod attributes;
pub mod features;
pub mod import;
pub mod model;
pub mod predictor;

pub use attributes::{FlagField, FlagValue, FurnishingStatus, ListingAttributes, NumericField};
pub use features::{
    prepare_aligned, prepare_features, FeatureColumn, FeatureOptions, FeatureVector,
    PricePerSqftStrategy, HOUSING_MODEL_COLUMNS,
};
pub use import::{ImportError, ImportedListing};
pub use model::{Estimator, ModelError, PriceModel, TreeNode, VotingRegressor};
pub use predictor::{install, predict_price, PredictionError, PricePredictor};
