use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::domain::ImageUpload;

/// Destination for listing photos. Returns the path recorded on the listing.
pub trait ImageStore: Send + Sync {
    fn save(&self, upload: &ImageUpload) -> Result<String, ImageStoreError>;

    /// Discard a previously saved image, identified by the path `save` returned.
    fn remove(&self, path: &str) -> Result<(), ImageStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("unable to prepare image directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to write image {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to remove image {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes uploads into a single directory under random file names.
#[derive(Debug, Clone)]
pub struct FilesystemImageStore {
    root: PathBuf,
}

impl FilesystemImageStore {
    /// Create the store, making `root` if it does not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ImageStoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| ImageStoreError::Directory {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_name_for(upload: &ImageUpload) -> String {
        let stem = Uuid::new_v4().simple().to_string();
        match upload.extension() {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        }
    }
}

impl ImageStore for FilesystemImageStore {
    fn save(&self, upload: &ImageUpload) -> Result<String, ImageStoreError> {
        let path = self.root.join(Self::file_name_for(upload));
        fs::write(&path, &upload.bytes).map_err(|source| ImageStoreError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = upload.bytes.len(), "stored listing image");
        Ok(path.to_string_lossy().into_owned())
    }

    fn remove(&self, path: &str) -> Result<(), ImageStoreError> {
        fs::remove_file(path).map_err(|source| ImageStoreError::Remove {
            path: PathBuf::from(path),
            source,
        })
    }
}
