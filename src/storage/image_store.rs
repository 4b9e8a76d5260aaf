use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use chrono::Utc;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Largest accepted upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ACCEPTED_TYPES: [(&str, &str); 3] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
];

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub file_name: String,
    /// Path the image is served under, e.g. `/uploads/<file_name>`.
    pub public_path: String,
}

pub trait ImageStore: Send + Sync + 'static {
    /// Stores the image under a fresh name; a reader never sees a partial file.
    fn put(&self, upload: ImageUpload) -> impl Future<Output = AppResult<StoredImage>> + Send;

    /// Removes an image by its public path. Missing files are ignored.
    fn delete(&self, public_path: &str) -> impl Future<Output = AppResult<()>> + Send;
}

#[derive(Debug, Clone)]
pub struct LocalImageStore {
    upload_dir: PathBuf,
    public_path: String,
}

impl LocalImageStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            upload_dir: PathBuf::from(&config.upload_dir),
            public_path: config.public_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub async fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.upload_dir).await?;
        Ok(())
    }

    /// Maps a public path back to a file inside the upload dir.
    fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let file_name = public_path
            .strip_prefix(&self.public_path)?
            .trim_start_matches('/');
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return None;
        }
        Some(self.upload_dir.join(file_name))
    }
}

pub fn extension_for(content_type: &str) -> AppResult<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ACCEPTED_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            AppError::UnsupportedMediaType(format!(
                "{content_type} is not allowed; upload a JPEG, PNG or GIF image"
            ))
        })
}

/// `<unix-millis>-<md5 of bytes>.<ext>`
pub fn versioned_file_name(bytes: &[u8], ext: &str) -> String {
    format!(
        "{}-{:x}.{ext}",
        Utc::now().timestamp_millis(),
        md5::compute(bytes)
    )
}

impl ImageStore for LocalImageStore {
    async fn put(&self, upload: ImageUpload) -> AppResult<StoredImage> {
        let ext = extension_for(&upload.content_type)?;
        if upload.bytes.is_empty() {
            return Err(AppError::ValidationError("Image file is empty".to_string()));
        }
        if upload.bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::ValidationError(format!(
                "Image must be at most {} MB",
                MAX_IMAGE_BYTES / (1024 * 1024)
            )));
        }

        self.ensure_dir().await?;
        let file_name = versioned_file_name(&upload.bytes, ext);
        let target = self.upload_dir.join(&file_name);
        let temp = self.upload_dir.join(format!(".{}.tmp", Uuid::new_v4()));

        fs::write(&temp, &upload.bytes).await?;
        if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        log::info!("Stored image {} ({} bytes)", file_name, upload.bytes.len());
        Ok(StoredImage {
            public_path: format!("{}/{}", self.public_path, file_name),
            file_name,
        })
    }

    async fn delete(&self, public_path: &str) -> AppResult<()> {
        let Some(path) = self.resolve(public_path) else {
            log::warn!("Ignoring image path outside the upload dir: {public_path}");
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => {
                log::info!("Removed image {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Image already gone: {}", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
