use actix_multipart::Multipart;
use actix_web::{HttpResponse, ResponseError, Result, Scope, web};
use futures_util::TryStreamExt;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::handlers::resource;
use crate::models::*;
use crate::services::ProductService;
use crate::storage::{ImageUpload, MAX_IMAGE_BYTES};

/// Text fields plus the optional `image` file part.
async fn read_product_form(
    mut payload: Multipart,
) -> AppResult<(Map<String, Value>, Option<ImageUpload>)> {
    let mut fields = Map::new();
    let mut image = None;

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let Some(name) = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .map(str::to_string)
        else {
            continue;
        };
        let has_file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .is_some_and(|f| !f.is_empty());
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(AppError::ValidationError(format!(
                    "Field {name} is larger than {} MB",
                    MAX_IMAGE_BYTES / (1024 * 1024)
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if name == "image" {
            // an empty file input is sent as a nameless, empty part
            if bytes.is_empty() && !has_file_name {
                continue;
            }
            image = Some(ImageUpload {
                bytes,
                content_type: content_type
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
            });
        } else {
            let text = String::from_utf8(bytes)
                .map_err(|_| AppError::ValidationError(format!("Field {name} is not valid text")))?;
            fields.insert(name, Value::String(text));
        }
    }

    Ok((fields, image))
}

fn malformed(e: actix_multipart::MultipartError) -> AppError {
    AppError::ValidationError(format!("Malformed multipart body: {e}"))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "products",
    request_body(
        content = ProductForm,
        content_type = "multipart/form-data",
        description = "Fields name, description, price, quantity, category and an optional image file"
    ),
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Invalid fields or image type", body = ErrorBody)
    )
)]
pub async fn create_product(
    service: web::Data<ProductService>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let result = match read_product_form(payload).await {
        Ok((fields, image)) => service.create(fields, image).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(product) => Ok(HttpResponse::Created().json(envelope(
            "Product created successfully",
            Product::SINGULAR,
            &product,
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product id")),
    request_body(
        content = ProductForm,
        content_type = "multipart/form-data",
        description = "Any product fields; a new image replaces the current one"
    ),
    responses(
        (status = 200, description = "Product updated"),
        (status = 400, description = "Invalid fields or image type", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody)
    )
)]
pub async fn update_product(
    service: web::Data<ProductService>,
    path: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let result = match read_product_form(payload).await {
        Ok((fields, image)) => service.update(&path, fields, image).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(product) => Ok(HttpResponse::Ok().json(envelope(
            "Product updated successfully",
            Product::SINGULAR,
            &product,
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product and its image deleted"),
        (status = 404, description = "Product not found", body = ErrorBody)
    )
)]
pub async fn delete_product(
    service: web::Data<ProductService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.delete(&path).await {
        Ok(product) => Ok(HttpResponse::Ok().json(envelope(
            "Product deleted successfully",
            Product::SINGULAR,
            &product,
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn product_scope() -> Scope {
    web::scope("/products")
        .service(
            web::resource("")
                .route(web::get().to(resource::list::<Product>))
                .route(web::post().to(create_product)),
        )
        .service(web::resource("/export").route(web::get().to(resource::export::<Product>)))
        .service(
            web::resource("/{id}")
                .route(web::get().to(resource::get::<Product>))
                .route(web::put().to(update_product))
                .route(web::delete().to(delete_product)),
        )
}
