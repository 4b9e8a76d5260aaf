use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

use crate::config::ClientConfig;
use crate::error::{AppError, AppResult};
use crate::models::{Order, Product, Resource, Stored};
use crate::storage::{ImageUpload, extension_for};

/// Remote CRUD over one collection.
#[allow(async_fn_in_trait)]
pub trait ResourceApi<T: Resource> {
    async fn fetch_all(&self) -> AppResult<Vec<Stored<T>>>;
    async fn create(&self, record: &T) -> AppResult<Stored<T>>;
    async fn update(&self, id: &str, record: &T) -> AppResult<Stored<T>>;
    /// Returns the id of the removed record.
    async fn delete(&self, id: &str) -> AppResult<String>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resource<T: Resource>(&self) -> ResourceClient<T> {
        ResourceClient {
            api: self.clone(),
            _record: PhantomData,
        }
    }

    fn url(&self, collection: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/api/{collection}/{id}", self.base_url),
            None => format!("{}/api/{collection}", self.base_url),
        }
    }

    pub async fn create_product_with_image(
        &self,
        product: &Product,
        image: Option<ImageUpload>,
    ) -> AppResult<Stored<Product>> {
        let form = product_form(product, image)?;
        let response = self
            .client
            .post(self.url(Product::COLLECTION, None))
            .multipart(form)
            .send()
            .await?;
        read_envelope(response, Product::SINGULAR).await
    }

    pub async fn update_product_with_image(
        &self,
        id: &str,
        product: &Product,
        image: Option<ImageUpload>,
    ) -> AppResult<Stored<Product>> {
        let form = product_form(product, image)?;
        let response = self
            .client
            .put(self.url(Product::COLLECTION, Some(id)))
            .multipart(form)
            .send()
            .await?;
        read_envelope(response, Product::SINGULAR).await
    }

    pub async fn place_order(&self, order: &Order) -> AppResult<Stored<Order>> {
        let placed = self.resource::<Order>().create(order).await?;
        log::info!("Placed order {} for {}", placed.id, placed.record.total_price);
        Ok(placed)
    }
}

/// `ApiClient` bound to one collection.
#[derive(Debug)]
pub struct ResourceClient<T> {
    api: ApiClient,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Resource> ResourceApi<T> for ResourceClient<T> {
    async fn fetch_all(&self) -> AppResult<Vec<Stored<T>>> {
        let response = self
            .api
            .client
            .get(self.api.url(T::COLLECTION, None))
            .send()
            .await?;
        read_envelope(response, T::PLURAL).await
    }

    async fn create(&self, record: &T) -> AppResult<Stored<T>> {
        let response = self
            .api
            .client
            .post(self.api.url(T::COLLECTION, None))
            .json(record)
            .send()
            .await?;
        read_envelope(response, T::SINGULAR).await
    }

    async fn update(&self, id: &str, record: &T) -> AppResult<Stored<T>> {
        let response = self
            .api
            .client
            .put(self.api.url(T::COLLECTION, Some(id)))
            .json(record)
            .send()
            .await?;
        read_envelope(response, T::SINGULAR).await
    }

    async fn delete(&self, id: &str) -> AppResult<String> {
        let response = self
            .api
            .client
            .delete(self.api.url(T::COLLECTION, Some(id)))
            .send()
            .await?;
        let removed: Stored<T> = read_envelope(response, T::SINGULAR).await?;
        Ok(removed.id)
    }
}

fn product_form(product: &Product, image: Option<ImageUpload>) -> AppResult<Form> {
    let mut form = Form::new()
        .text("name", product.name.clone())
        .text("description", product.description.clone())
        .text("price", product.price.to_string())
        .text("quantity", product.quantity.to_string())
        .text("category", product.category.clone());

    if let Some(image) = image {
        let ext = extension_for(&image.content_type)?;
        let part = Part::bytes(image.bytes)
            .file_name(format!("image.{ext}"))
            .mime_str(&image.content_type)?;
        form = form.part("image", part);
    }
    Ok(form)
}

async fn read_envelope<R: DeserializeOwned>(
    response: reqwest::Response,
    key: &str,
) -> AppResult<R> {
    let status = response.status().as_u16();
    let text = response.text().await?;
    parse_envelope(status, &text, key)
}

/// Unwraps `{message, <key>}` on success and rebuilds the error from
/// `{message, error}` otherwise.
pub fn parse_envelope<R: DeserializeOwned>(status: u16, text: &str, key: &str) -> AppResult<R> {
    let body: Value = serde_json::from_str(text).unwrap_or(Value::Null);

    if !(200..300).contains(&status) {
        let message = match body.get("error") {
            // 404 bodies carry a code in `error`; the message is the readable part
            Some(Value::String(error)) if status != 404 => error.clone(),
            Some(Value::Object(fields)) => fields
                .iter()
                .map(|(field, msg)| format!("{field}: {}", msg.as_str().unwrap_or_default()))
                .collect::<Vec<_>>()
                .join("; "),
            _ => body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Request failed with status {status}")),
        };
        log::warn!("API request failed ({status}): {message}");
        return Err(AppError::from_status(status, message));
    }

    let payload = body
        .get(key)
        .cloned()
        .ok_or_else(|| AppError::ExternalApiError(format!("Response has no `{key}` field")))?;
    Ok(serde_json::from_value(payload)?)
}
