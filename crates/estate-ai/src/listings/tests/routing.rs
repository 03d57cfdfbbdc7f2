use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::listings::router::{create_handler, CreateListingRequest, ImagePayload};
use crate::listings::{listing_router, ListingService};
use crate::pricing::{FeatureOptions, PricePredictor};

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

fn post_listing(payload: Value) -> Request<Body> {
    Request::post("/api/v1/listings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn create_route_returns_listing_view() {
    let (service, _, images) = build_service(predictor(AreaModel::healthy()));
    let router = listing_router(service);

    let payload = json!({
        "attributes": serde_json::to_value(attributes()).expect("attributes serialize"),
        "image": { "file_name": "front.png", "content_base64": "iVBORw0KGgo=" },
    });
    let response = router.oneshot(post_listing(payload)).await.expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["listing_id"], 1);
    assert_eq!(body["price"], 5_000_000.0);
    assert_eq!(body["price_crore"], 0.5);
    assert_eq!(body["price_available"], true);
    assert_eq!(body["headline"], "3 BHK | 2000 sqft");
    assert_eq!(body["image_path"], "static/images/upload-1.png");
    assert_eq!(body["attributes"]["mainroad"], "Yes");

    let uploads = images.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].bytes, vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
}

#[tokio::test]
async fn create_route_accepts_mixed_flag_types_without_model() {
    let (service, _, _) =
        build_service(PricePredictor::without_model(FeatureOptions::default()));
    let router = listing_router(service);

    let payload = json!({
        "attributes": {
            "area": 1500,
            "bedrooms": 2,
            "mainroad": 1,
            "guestroom": true,
            "furnishingstatus": "unfurnished"
        }
    });
    let response = router.oneshot(post_listing(payload)).await.expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["price"], Value::Null);
    assert_eq!(body["price_available"], false);
}

#[tokio::test]
async fn create_handler_rejects_invalid_base64() {
    let (service, _, images) = build_service(predictor(AreaModel::healthy()));

    let request = CreateListingRequest {
        attributes: attributes(),
        image: Some(ImagePayload {
            file_name: "front.png".to_string(),
            content_base64: "not base64!".to_string(),
        }),
    };
    let response = create_handler(State(service), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(images.uploads().is_empty());
}

#[tokio::test]
async fn create_handler_returns_internal_error_on_image_failure() {
    let service = Arc::new(ListingService::new(
        Arc::new(MemoryRepository::default()),
        Arc::new(FailingImages),
        predictor(AreaModel::healthy()),
    ));

    let request = CreateListingRequest {
        attributes: attributes(),
        image: Some(ImagePayload {
            file_name: "front.png".to_string(),
            content_base64: "iVBORw0KGgo=".to_string(),
        }),
    };
    let response = create_handler(State(service), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn browse_route_applies_price_filter() {
    let (service, _, _) = build_service(predictor(AreaModel::healthy()));
    let mut large = attributes();
    large.area = Some(4000);
    service.create(attributes(), None).expect("saved");
    service.create(large, None).expect("saved");

    let response = listing_router(service)
        .oneshot(
            Request::get("/api/v1/listings?min_price=6000000&max_price=20000000")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["bounds"]["min"], 5_000_000.0);
    assert_eq!(body["bounds"]["max"], 10_000_000.0);
    let listings = body["listings"].as_array().expect("listings array");
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["listing_id"], 2);
}

#[tokio::test]
async fn detail_route_returns_not_found_for_unknown_listing() {
    let (service, _, _) = build_service(predictor(AreaModel::healthy()));

    let response = listing_router(service)
        .oneshot(
            Request::get("/api/v1/listings/42")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["listing_id"], 42);
}

#[tokio::test]
async fn browse_route_reports_repository_outages() {
    let service = Arc::new(ListingService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryImages::default()),
        predictor(AreaModel::healthy()),
    ));

    let response = listing_router(service)
        .oneshot(
            Request::get("/api/v1/listings")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
