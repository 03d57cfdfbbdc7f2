use chrono::Utc;
use estate_ai::listings::{
    ListingId, ListingRecord, ListingRepository, NewListing, RepositoryError,
};
use estate_ai::pricing::PricePredictor;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) predictor: PricePredictor,
}

/// Process-local listing store. Ids are assigned sequentially, so iterating
/// the map in reverse yields newest first.
#[derive(Default, Clone)]
pub(crate) struct InMemoryListingRepository {
    records: Arc<Mutex<Records>>,
}

type Records = BTreeMap<ListingId, ListingRecord>;

impl InMemoryListingRepository {
    fn records(&self) -> Result<MutexGuard<'_, Records>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl ListingRepository for InMemoryListingRepository {
    fn insert(&self, listing: NewListing) -> Result<ListingRecord, RepositoryError> {
        let mut guard = self.records()?;
        let next = guard.keys().next_back().map_or(1, |id| id.0 + 1);
        let record = ListingRecord {
            listing_id: ListingId(next),
            attributes: listing.attributes,
            price: listing.price,
            image_path: listing.image_path,
            created_at: Utc::now(),
        };
        guard.insert(record.listing_id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: ListingId) -> Result<Option<ListingRecord>, RepositoryError> {
        let guard = self.records()?;
        Ok(guard.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<ListingRecord>, RepositoryError> {
        let guard = self.records()?;
        Ok(guard.values().rev().cloned().collect())
    }
}
