use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::listings::domain::{ImageUpload, ListingId, ListingRecord, NewListing};
use crate::listings::images::{ImageStore, ImageStoreError};
use crate::listings::repository::{ListingRepository, RepositoryError};
use crate::listings::ListingService;
use crate::pricing::{
    FeatureOptions, FlagValue, ListingAttributes, ModelError, PriceModel, PricePredictor,
    HOUSING_MODEL_COLUMNS,
};

pub(super) fn attributes() -> ListingAttributes {
    ListingAttributes {
        area: Some(2000),
        bedrooms: Some(3),
        bathrooms: Some(2),
        stories: Some(2),
        mainroad: Some(FlagValue::from("Yes")),
        guestroom: Some(FlagValue::from("No")),
        basement: Some(FlagValue::from("No")),
        hotwaterheating: Some(FlagValue::from("No")),
        airconditioning: Some(FlagValue::from("Yes")),
        parking: Some(1),
        prefarea: Some(FlagValue::from("Yes")),
        furnishingstatus: Some("semi-furnished".to_string()),
        year_built: Some(2015),
        description: Some("Two-storey home with a shaded terrace".to_string()),
    }
}

fn timestamp(offset: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_760_000_000 + offset, 0).expect("valid timestamp")
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<ListingRecord>>,
}

impl ListingRepository for MemoryRepository {
    fn insert(&self, listing: NewListing) -> Result<ListingRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let next = guard.len() as u64 + 1;
        let record = ListingRecord {
            listing_id: ListingId(next),
            attributes: listing.attributes,
            price: listing.price,
            image_path: listing.image_path,
            created_at: timestamp(next as i64),
        };
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: ListingId) -> Result<Option<ListingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| record.listing_id == id).cloned())
    }

    fn list(&self) -> Result<Vec<ListingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().rev().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl ListingRepository for UnavailableRepository {
    fn insert(&self, _listing: NewListing) -> Result<ListingRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: ListingId) -> Result<Option<ListingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<ListingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryImages {
    uploads: Mutex<Vec<ImageUpload>>,
    removed: Mutex<Vec<String>>,
}

impl MemoryImages {
    pub(super) fn uploads(&self) -> Vec<ImageUpload> {
        self.uploads.lock().expect("image mutex poisoned").clone()
    }

    pub(super) fn removed(&self) -> Vec<String> {
        self.removed.lock().expect("image mutex poisoned").clone()
    }
}

impl ImageStore for MemoryImages {
    fn save(&self, upload: &ImageUpload) -> Result<String, ImageStoreError> {
        let mut guard = self.uploads.lock().expect("image mutex poisoned");
        guard.push(upload.clone());
        let ext = upload.extension().unwrap_or_else(|| "bin".to_string());
        Ok(format!("static/images/upload-{}.{ext}", guard.len()))
    }

    fn remove(&self, path: &str) -> Result<(), ImageStoreError> {
        self.removed
            .lock()
            .expect("image mutex poisoned")
            .push(path.to_string());
        Ok(())
    }
}

pub(super) struct FailingImages;

impl ImageStore for FailingImages {
    fn save(&self, _upload: &ImageUpload) -> Result<String, ImageStoreError> {
        Err(ImageStoreError::Write {
            path: "static/images/full.png".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        })
    }

    fn remove(&self, _path: &str) -> Result<(), ImageStoreError> {
        Ok(())
    }
}

/// Prices a listing at 2,500 per square foot; fails when asked to.
pub(super) struct AreaModel {
    columns: Vec<String>,
    fail: bool,
}

impl AreaModel {
    pub(super) fn healthy() -> Self {
        Self {
            columns: HOUSING_MODEL_COLUMNS.iter().map(|name| name.to_string()).collect(),
            fail: false,
        }
    }

    pub(super) fn broken() -> Self {
        Self {
            fail: true,
            ..Self::healthy()
        }
    }
}

impl PriceModel for AreaModel {
    fn predict(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if self.fail {
            return Err(ModelError::Runtime("estimator panicked".to_string()));
        }
        Ok(vec![row[0] * 2500.0])
    }

    fn expected_columns(&self) -> Option<&[String]> {
        Some(self.columns.as_slice())
    }
}

pub(super) fn predictor(model: AreaModel) -> PricePredictor {
    PricePredictor::new(Arc::new(model), FeatureOptions::default())
}

pub(super) fn build_service(
    predictor: PricePredictor,
) -> (
    Arc<ListingService<MemoryRepository, MemoryImages>>,
    Arc<MemoryRepository>,
    Arc<MemoryImages>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let images = Arc::new(MemoryImages::default());
    let service = Arc::new(ListingService::new(
        repository.clone(),
        images.clone(),
        predictor,
    ));
    (service, repository, images)
}

pub(super) fn upload() -> ImageUpload {
    ImageUpload {
        file_name: "front.JPG".to_string(),
        bytes: vec![0xff, 0xd8, 0xff, 0xe0],
    }
}
