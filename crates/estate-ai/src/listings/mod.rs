//! Seller intake and buyer browsing for property listings.

pub mod domain;
pub mod images;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ImageUpload, ListingId, ListingRecord, ListingView, NewListing, PriceBounds, PriceRange,
    DEFAULT_IMAGE_PATH,
};
pub use images::{FilesystemImageStore, ImageStore, ImageStoreError};
pub use repository::{ListingRepository, RepositoryError};
pub use router::{listing_router, CreateListingRequest, ImagePayload};
pub use service::{ListingCatalog, ListingService, ListingServiceError};
