//! Listing intake and sale-price estimation for a small real-estate portal.
//!
//! [`pricing`] turns raw listing attributes into the feature row a trained
//! regression model expects and wraps inference in a fail-soft predictor.
//! [`listings`] stores seller submissions alongside their estimates and
//! serves filtered listings to buyers.

pub mod config;
pub mod error;
pub mod listings;
pub mod pricing;
pub mod telemetry;
