use super::domain::{ListingId, ListingRecord, NewListing};

/// Storage abstraction so the listing service can be exercised in isolation.
pub trait ListingRepository: Send + Sync {
    /// Persist a listing, assigning its id and creation time.
    fn insert(&self, listing: NewListing) -> Result<ListingRecord, RepositoryError>;
    fn fetch(&self, id: ListingId) -> Result<Option<ListingRecord>, RepositoryError>;
    /// All listings, newest first.
    fn list(&self) -> Result<Vec<ListingRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("listing not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
