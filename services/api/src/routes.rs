use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Extension;
use axum::Json;
use estate_ai::error::AppError;
use estate_ai::listings::domain::price_in_crore;
use estate_ai::listings::{
    listing_router, ImageStore, ListingId, ListingRepository, ListingService, ListingServiceError,
    RepositoryError, DEFAULT_IMAGE_PATH,
};
use estate_ai::pricing::{FeatureVector, ListingAttributes};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Serialize)]
pub(crate) struct EstimateResponse {
    pub(crate) price: Option<f64>,
    pub(crate) price_crore: Option<f64>,
    pub(crate) price_available: bool,
    pub(crate) features: FeatureVector,
}

pub(crate) fn with_listing_routes<R, I>(service: Arc<ListingService<R, I>>) -> axum::Router
where
    R: ListingRepository + 'static,
    I: ImageStore + 'static,
{
    listing_router(service.clone())
        .route(
            "/api/v1/listings/:listing_id/image",
            get(listing_image_endpoint::<R, I>),
        )
        .layer(Extension(service))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/pricing/estimate", post(estimate_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready", "model_loaded": state.predictor.is_available() })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Price a listing without saving it. The feature row is the one the loaded
/// model would receive.
pub(crate) async fn estimate_endpoint(
    Extension(state): Extension<AppState>,
    Json(attributes): Json<ListingAttributes>,
) -> Json<EstimateResponse> {
    let features = state.predictor.prepare_features(&attributes);
    let price = state.predictor.predict_price(&attributes);

    Json(EstimateResponse {
        price,
        price_crore: price.map(price_in_crore),
        price_available: price.is_some(),
        features,
    })
}

/// Serve a listing's photo, or the placeholder when the listing has none.
pub(crate) async fn listing_image_endpoint<R, I>(
    Extension(service): Extension<Arc<ListingService<R, I>>>,
    Path(listing_id): Path<u64>,
) -> Response
where
    R: ListingRepository + 'static,
    I: ImageStore + 'static,
{
    let record = match service.get(ListingId(listing_id)) {
        Ok(record) => record,
        Err(ListingServiceError::Repository(RepositoryError::NotFound)) => {
            return not_found(listing_id, "listing not found");
        }
        Err(other) => return AppError::from(other).into_response(),
    };

    let candidates = record
        .image_path
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(DEFAULT_IMAGE_PATH));

    for candidate in candidates {
        match tokio::fs::read(candidate).await {
            Ok(bytes) => {
                let mime = mime_guess::from_path(candidate).first_or_octet_stream();
                return (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, mime.to_string())],
                    bytes,
                )
                    .into_response();
            }
            Err(err) => {
                debug!(listing_id, path = candidate, error = %err, "listing image unreadable")
            }
        }
    }

    not_found(listing_id, "image not available")
}

fn not_found(listing_id: u64, message: &str) -> Response {
    let payload = json!({
        "listing_id": listing_id,
        "error": message,
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}
