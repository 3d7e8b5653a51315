//! Cover image storage on the local filesystem
//!
//! Uploaded images land in the configured directory under a UUID file name
//! and are served statically under /images. The database only stores the
//! public path string.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::UploadedImage,
};

/// Upload size cap: 5 MB
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct ImageService {
    image_dir: PathBuf,
}

impl ImageService {
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
        }
    }

    /// Persist an uploaded image, returning its public path
    pub async fn save(&self, image: &UploadedImage) -> AppResult<String> {
        if image.data.is_empty() {
            return Err(AppError::BadRequest("Image file is empty".to_string()));
        }
        if image.data.len() > MAX_IMAGE_BYTES {
            return Err(AppError::BadRequest(
                "Image must not exceed 5MB".to_string(),
            ));
        }

        let extension = Path::new(&image.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let file_name = format!("{}.{}", Uuid::new_v4(), extension);

        tokio::fs::create_dir_all(&self.image_dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create image dir: {}", e)))?;
        tokio::fs::write(self.image_dir.join(&file_name), &image.data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write image: {}", e)))?;

        Ok(format!("/images/{}", file_name))
    }

    /// Remove a previously stored image. Missing files are not an error.
    pub async fn delete(&self, public_path: &str) {
        let Some(file_name) = public_path.rsplit('/').next() else {
            return;
        };
        if file_name.is_empty() {
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.image_dir.join(file_name)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to delete image {}: {}", public_path, e);
            }
        }
    }
}
