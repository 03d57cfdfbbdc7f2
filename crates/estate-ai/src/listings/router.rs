use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ImageUpload, ListingId, PriceRange};
use super::images::ImageStore;
use super::repository::{ListingRepository, RepositoryError};
use super::service::{ListingService, ListingServiceError};
use crate::pricing::ListingAttributes;

/// Seller submission as posted by the portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingRequest {
    pub attributes: ListingAttributes,
    #[serde(default)]
    pub image: Option<ImagePayload>,
}

/// Image bytes carried inline as standard base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePayload {
    pub file_name: String,
    pub content_base64: String,
}

impl ImagePayload {
    pub fn decode(self) -> Result<ImageUpload, base64::DecodeError> {
        let bytes = STANDARD.decode(self.content_base64.trim())?;
        Ok(ImageUpload {
            file_name: self.file_name,
            bytes,
        })
    }
}

/// Router builder exposing HTTP endpoints for listing intake and browsing.
pub fn listing_router<R, I>(service: Arc<ListingService<R, I>>) -> Router
where
    R: ListingRepository + 'static,
    I: ImageStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings",
            get(browse_handler::<R, I>).post(create_handler::<R, I>),
        )
        .route(
            "/api/v1/listings/:listing_id",
            get(detail_handler::<R, I>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<R, I>(
    State(service): State<Arc<ListingService<R, I>>>,
    axum::Json(request): axum::Json<CreateListingRequest>,
) -> Response
where
    R: ListingRepository + 'static,
    I: ImageStore + 'static,
{
    let CreateListingRequest { attributes, image } = request;

    let image = match image.map(ImagePayload::decode).transpose() {
        Ok(image) => image,
        Err(error) => {
            let payload = json!({
                "error": format!("image content is not valid base64: {error}"),
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    // Blocking on the request task: one small image write plus in-process inference.
    match service.create(attributes, image) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn browse_handler<R, I>(
    State(service): State<Arc<ListingService<R, I>>>,
    Query(range): Query<PriceRange>,
) -> Response
where
    R: ListingRepository + 'static,
    I: ImageStore + 'static,
{
    match service.catalog(&range) {
        Ok(catalog) => (StatusCode::OK, axum::Json(catalog)).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn detail_handler<R, I>(
    State(service): State<Arc<ListingService<R, I>>>,
    Path(listing_id): Path<u64>,
) -> Response
where
    R: ListingRepository + 'static,
    I: ImageStore + 'static,
{
    match service.get(ListingId(listing_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(ListingServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "listing_id": listing_id,
                "error": "listing not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

fn internal_error(error: ListingServiceError) -> Response {
    tracing::error!(error = %error, "listing request failed");
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
