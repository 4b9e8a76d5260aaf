use actix_web::{HttpResponse, ResponseError, Result, Scope, web};
use chrono::Utc;
use serde_json::json;

use crate::handlers::resource::resource_scope;
use crate::models::*;
use crate::services::ResourceService;

#[utoipa::path(
    put,
    path = "/api/orders/{id}/approval",
    tag = "orders",
    params(("id" = String, Path, description = "Order id")),
    request_body = UpdateApprovalRequest,
    responses(
        (status = 200, description = "Approval status updated"),
        (status = 400, description = "Invalid status", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody)
    )
)]
pub async fn update_approval(
    service: web::Data<ResourceService<Order>>,
    path: web::Path<String>,
    body: web::Json<UpdateApprovalRequest>,
) -> Result<HttpResponse> {
    let payload = json!({ "approvalStatus": body.approval_status });

    match service.update(&path, payload).await {
        Ok(order) => {
            log::info!("Order {} marked {}", order.id, order.record.approval_status);
            Ok(HttpResponse::Ok().json(envelope(
                "Order approval status updated successfully",
                Order::SINGULAR,
                &order,
            )))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/delivery",
    tag = "orders",
    params(("id" = String, Path, description = "Order id")),
    request_body = UpdateDeliveryRequest,
    responses(
        (status = 200, description = "Delivery status updated"),
        (status = 400, description = "Invalid status", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody)
    )
)]
pub async fn update_delivery(
    service: web::Data<ResourceService<Order>>,
    path: web::Path<String>,
    body: web::Json<UpdateDeliveryRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();
    // delivered orders get stamped with today's date unless one is given
    let date = request.date.or_else(|| {
        (request.status == DeliveryStatus::Delivered).then(|| Utc::now().date_naive())
    });
    let delivery = Delivery {
        status: request.status,
        date,
    };

    match service.update(&path, json!({ "delivery": delivery })).await {
        Ok(order) => {
            log::info!("Order {} delivery {}", order.id, order.record.delivery.status);
            Ok(HttpResponse::Ok().json(envelope(
                "Order delivery status updated successfully",
                Order::SINGULAR,
                &order,
            )))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_scope() -> Scope {
    resource_scope::<Order>()
        .service(web::resource("/{id}/approval").route(web::put().to(update_approval)))
        .service(web::resource("/{id}/delivery").route(web::put().to(update_delivery)))
}
