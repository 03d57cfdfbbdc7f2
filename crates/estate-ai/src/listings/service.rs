use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    ImageUpload, ListingId, ListingRecord, ListingView, NewListing, PriceBounds, PriceRange,
};
use super::images::{ImageStore, ImageStoreError};
use super::repository::{ListingRepository, RepositoryError};
use crate::pricing::{ListingAttributes, PricePredictor};

/// Service composing image storage, price estimation, and the repository.
pub struct ListingService<R, I> {
    repository: Arc<R>,
    images: Arc<I>,
    predictor: PricePredictor,
}

/// Buyer listing page: slider bounds plus the listings matching the filter.
#[derive(Debug, Clone, Serialize)]
pub struct ListingCatalog {
    pub bounds: PriceBounds,
    pub listings: Vec<ListingView>,
}

impl<R, I> ListingService<R, I>
where
    R: ListingRepository + 'static,
    I: ImageStore + 'static,
{
    pub fn new(repository: Arc<R>, images: Arc<I>, predictor: PricePredictor) -> Self {
        Self {
            repository,
            images,
            predictor,
        }
    }

    pub fn predictor(&self) -> &PricePredictor {
        &self.predictor
    }

    /// Store a seller submission. A failed estimate still saves the listing
    /// with no price; image and storage failures abort the save, and an image
    /// already written for a listing that could not be stored is removed.
    pub fn create(
        &self,
        attributes: ListingAttributes,
        image: Option<ImageUpload>,
    ) -> Result<ListingRecord, ListingServiceError> {
        let image_path = image
            .as_ref()
            .map(|upload| self.images.save(upload))
            .transpose()?;

        let price = self.predictor.predict_price(&attributes);

        let inserted = self.repository.insert(NewListing {
            attributes,
            price,
            image_path: image_path.clone(),
        });
        let record = match inserted {
            Ok(record) => record,
            Err(err) => {
                if let Some(path) = image_path.as_deref() {
                    self.discard_image(path);
                }
                return Err(err.into());
            }
        };

        info!(
            listing_id = record.listing_id.0,
            price = record.price,
            has_image = record.image_path.is_some(),
            "listing saved"
        );
        Ok(record)
    }

    /// Listings newest first, filtered by price.
    pub fn browse(&self, range: &PriceRange) -> Result<Vec<ListingRecord>, ListingServiceError> {
        let listings = self.repository.list()?;
        Ok(listings
            .into_iter()
            .filter(|record| range.matches(record.price))
            .collect())
    }

    /// Bounds are computed over every stored listing, independent of `range`.
    pub fn catalog(&self, range: &PriceRange) -> Result<ListingCatalog, ListingServiceError> {
        let listings = self.repository.list()?;
        let bounds = PriceBounds::from_prices(listings.iter().filter_map(|record| record.price));
        let listings = listings
            .iter()
            .filter(|record| range.matches(record.price))
            .map(ListingRecord::view)
            .collect();

        Ok(ListingCatalog { bounds, listings })
    }

    fn discard_image(&self, path: &str) {
        if let Err(err) = self.images.remove(path) {
            warn!(path, error = %err, "failed to remove image of unsaved listing");
        }
    }

    pub fn get(&self, listing_id: ListingId) -> Result<ListingRecord, ListingServiceError> {
        let record = self
            .repository
            .fetch(listing_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

/// Error raised by the listing service.
#[derive(Debug, thiserror::Error)]
pub enum ListingServiceError {
    #[error(transparent)]
    Image(#[from] ImageStoreError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
