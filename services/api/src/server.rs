use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryListingRepository};
use crate::routes::with_listing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use estate_ai::config::AppConfig;
use estate_ai::error::AppError;
use estate_ai::listings::{FilesystemImageStore, ListingService};
use estate_ai::pricing::PricePredictor;
use estate_ai::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let predictor = PricePredictor::load(
        &config.pricing.model_path,
        config.pricing.feature_options(),
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        predictor: predictor.clone(),
    };

    let repository = Arc::new(InMemoryListingRepository::default());
    let images = Arc::new(FilesystemImageStore::new(&config.storage.image_dir)?);
    let listing_service = Arc::new(ListingService::new(repository, images, predictor.clone()));

    let app = with_listing_routes(listing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        model_loaded = predictor.is_available(),
        image_dir = %config.storage.image_dir.display(),
        "listing portal ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
