use crate::error::AppResult;
use crate::models::{Product, Stored};
use crate::services::{DocumentStore, ResourceService};
use crate::storage::{ImageStore, ImageUpload, LocalImageStore};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Products with their uploaded images. Image files are versioned: an update
/// writes a new file and the old one is removed only after the record points
/// at the new one.
pub struct ProductService<S: ImageStore = LocalImageStore> {
    records: ResourceService<Product>,
    images: Arc<S>,
}

impl<S: ImageStore> Clone for ProductService<S> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            images: Arc::clone(&self.images),
        }
    }
}

impl<S: ImageStore> ProductService<S> {
    pub fn new(store: DocumentStore, images: S) -> Self {
        Self {
            records: ResourceService::new(store),
            images: Arc::new(images),
        }
    }

    pub fn records(&self) -> &ResourceService<Product> {
        &self.records
    }

    pub async fn create(
        &self,
        mut fields: Map<String, Value>,
        image: Option<ImageUpload>,
    ) -> AppResult<Stored<Product>> {
        // the stored path comes from the upload, never from the form
        fields.remove("image");
        let Some(upload) = image else {
            return self.records.create(Value::Object(fields)).await;
        };

        let stored = self.images.put(upload).await?;
        fields.insert("image".to_string(), Value::String(stored.public_path.clone()));
        match self.records.create(Value::Object(fields)).await {
            Ok(product) => Ok(product),
            Err(e) => {
                self.discard(&stored.public_path).await;
                Err(e)
            }
        }
    }

    pub async fn update(
        &self,
        id: &str,
        mut fields: Map<String, Value>,
        image: Option<ImageUpload>,
    ) -> AppResult<Stored<Product>> {
        fields.remove("image");
        let Some(upload) = image else {
            return self.records.update(id, Value::Object(fields)).await;
        };

        let previous = self.records.get(id).await?.record.image;
        let stored = self.images.put(upload).await?;
        fields.insert("image".to_string(), Value::String(stored.public_path.clone()));

        match self.records.update(id, Value::Object(fields)).await {
            Ok(product) => {
                if let Some(old) = previous
                    && old != stored.public_path
                {
                    self.discard(&old).await;
                }
                Ok(product)
            }
            Err(e) => {
                self.discard(&stored.public_path).await;
                Err(e)
            }
        }
    }

    pub async fn delete(&self, id: &str) -> AppResult<Stored<Product>> {
        let product = self.records.delete(id).await?;
        if let Some(image) = &product.record.image {
            self.discard(image).await;
        }
        Ok(product)
    }

    /// Image cleanup never fails the request that triggered it.
    async fn discard(&self, public_path: &str) {
        if let Err(e) = self.images.delete(public_path).await {
            log::error!("Failed to remove image {public_path}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::services::document_store::tests::memory_store;
    use serde_json::json;

    fn fields(name: &str) -> Map<String, Value> {
        json!({
            "name": name,
            "description": "Refillable dispenser bottle",
            "price": "850",
            "quantity": "12",
            "category": "Dispenser Bottles"
        })
        .as_object()
        .unwrap()
        .clone()
    }

    fn png(bytes: &[u8]) -> Option<ImageUpload> {
        Some(ImageUpload {
            bytes: bytes.to_vec(),
            content_type: "image/png".to_string(),
        })
    }

    async fn service(dir: &std::path::Path) -> ProductService {
        let images = LocalImageStore::new(&StorageConfig {
            upload_dir: dir.to_string_lossy().to_string(),
            public_path: "/uploads".to_string(),
        });
        ProductService::new(memory_store().await, images)
    }

    fn files_in(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[actix_web::test]
    async fn test_create_with_image() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;

        let product = service
            .create(fields("Spring Water 19L"), png(b"first"))
            .await
            .unwrap();
        assert_eq!(product.record.price, 850.0);
        assert_eq!(product.record.quantity, 12);
        assert!(product.record.image.unwrap().starts_with("/uploads/"));
        assert_eq!(files_in(dir.path()), 1);
    }

    #[actix_web::test]
    async fn test_failed_create_removes_new_image() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;

        let mut invalid = fields("Spring Water 19L");
        invalid.insert("price".to_string(), json!("-5"));
        assert!(service.create(invalid, png(b"orphan")).await.is_err());
        assert_eq!(files_in(dir.path()), 0);
    }

    #[actix_web::test]
    async fn test_update_replaces_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;
        let created = service
            .create(fields("Spring Water 19L"), png(b"first"))
            .await
            .unwrap();
        let old_image = created.record.image.clone().unwrap();

        let mut changes = Map::new();
        changes.insert("price".to_string(), json!("900"));
        let updated = service
            .update(&created.id, changes, png(b"second"))
            .await
            .unwrap();

        assert_eq!(updated.record.price, 900.0);
        assert_eq!(updated.record.name, "Spring Water 19L");
        assert_ne!(updated.record.image.as_deref(), Some(old_image.as_str()));
        assert_eq!(files_in(dir.path()), 1);
    }

    #[actix_web::test]
    async fn test_update_without_image_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;
        let created = service
            .create(fields("Spring Water 19L"), png(b"first"))
            .await
            .unwrap();

        let mut changes = Map::new();
        changes.insert("quantity".to_string(), json!("3"));
        changes.insert("image".to_string(), json!("/elsewhere.png"));
        let updated = service.update(&created.id, changes, None).await.unwrap();
        assert_eq!(updated.record.image, created.record.image);
        assert_eq!(updated.record.quantity, 3);
    }

    #[actix_web::test]
    async fn test_delete_removes_image_and_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;
        let first = service
            .create(fields("Spring Water 19L"), png(b"first"))
            .await
            .unwrap();
        let second = service
            .create(fields("Spring Water 1L"), png(b"second"))
            .await
            .unwrap();

        service.delete(&first.id).await.unwrap();
        assert_eq!(files_in(dir.path()), 1);

        let second_path = second.record.image.clone().unwrap();
        let file_name = second_path.trim_start_matches("/uploads/");
        std::fs::remove_file(dir.path().join(file_name)).unwrap();
        service.delete(&second.id).await.unwrap();
        assert!(service.records().list().await.unwrap().is_empty());
    }
}
