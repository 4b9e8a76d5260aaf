use actix_web::{HttpResponse, ResponseError, Result, Scope, web};
use serde_json::Value;

use crate::models::{Resource, TableRow, envelope};
use crate::services::ResourceService;

pub async fn create<T: Resource>(
    service: web::Data<ResourceService<T>>,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    match service.create(body.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Created().json(envelope(
            format!("{} created successfully", T::LABEL),
            T::SINGULAR,
            &record,
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn list<T: Resource>(service: web::Data<ResourceService<T>>) -> Result<HttpResponse> {
    match service.list().await {
        Ok(records) => Ok(HttpResponse::Ok().json(envelope(
            format!("{} records retrieved successfully", T::LABEL),
            T::PLURAL,
            &records,
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get<T: Resource>(
    service: web::Data<ResourceService<T>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.get(&path).await {
        Ok(record) => Ok(HttpResponse::Ok().json(envelope(
            format!("{} retrieved successfully", T::LABEL),
            T::SINGULAR,
            &record,
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn update<T: Resource>(
    service: web::Data<ResourceService<T>>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    match service.update(&path, body.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Ok().json(envelope(
            format!("{} updated successfully", T::LABEL),
            T::SINGULAR,
            &record,
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn delete<T: Resource>(
    service: web::Data<ResourceService<T>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.delete(&path).await {
        Ok(record) => Ok(HttpResponse::Ok().json(envelope(
            format!("{} deleted successfully", T::LABEL),
            T::SINGULAR,
            &record,
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn export<T: Resource + TableRow>(
    service: web::Data<ResourceService<T>>,
) -> Result<HttpResponse> {
    match service.export_csv().await {
        Ok(csv) => Ok(HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}.csv\"", T::COLLECTION),
            ))
            .body(csv)),
        Err(e) => Ok(e.error_response()),
    }
}

/// `/<collection>` with list/create, export and per-id routes.
pub fn resource_scope<T: Resource + TableRow>() -> Scope {
    web::scope(&format!("/{}", T::COLLECTION))
        .service(
            web::resource("")
                .route(web::get().to(list::<T>))
                .route(web::post().to(create::<T>)),
        )
        .service(web::resource("/export").route(web::get().to(export::<T>)))
        .service(
            web::resource("/{id}")
                .route(web::get().to(get::<T>))
                .route(web::put().to(update::<T>))
                .route(web::delete().to(delete::<T>)),
        )
}
