use actix_web::web;
use utoipa::openapi::path::{OperationBuilder, ParameterBuilder, ParameterIn, PathItemType};
use utoipa::openapi::{Required, ResponseBuilder};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

/// Documents the JSON CRUD routes every collection shares. The handlers are
/// generic, so these are generated rather than annotated.
struct ResourceRoutes;

/// `(collection, label, json writes)`; products write through multipart.
const COLLECTIONS: [(&str, &str, bool); 9] = [
    (Employee::COLLECTION, Employee::LABEL, true),
    (EmployeeSalary::COLLECTION, EmployeeSalary::LABEL, true),
    (Product::COLLECTION, Product::LABEL, false),
    (Order::COLLECTION, Order::LABEL, true),
    (SubscriptionPlan::COLLECTION, SubscriptionPlan::LABEL, true),
    (Maintenance::COLLECTION, Maintenance::LABEL, true),
    (Schedule::COLLECTION, Schedule::LABEL, true),
    (PettyCash::COLLECTION, PettyCash::LABEL, true),
    (IncomeExpenditure::COLLECTION, IncomeExpenditure::LABEL, true),
];

impl Modify for ResourceRoutes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        for (collection, label, json_writes) in COLLECTIONS {
            let base = format!("/api/{collection}");
            let by_id = format!("{base}/{{id}}");

            let mut routes = vec![
                (base.clone(), PathItemType::Get, format!("List {label} records"), "200"),
                (format!("{base}/export"), PathItemType::Get, format!("Export {label} records as CSV"), "200"),
                (by_id.clone(), PathItemType::Get, format!("Get one {label} record"), "200"),
            ];
            if json_writes {
                routes.push((base.clone(), PathItemType::Post, format!("Create a {label} record"), "201"));
                routes.push((by_id.clone(), PathItemType::Put, format!("Update a {label} record"), "200"));
                routes.push((by_id.clone(), PathItemType::Delete, format!("Delete a {label} record"), "200"));
            }

            for (path, method, summary, ok) in routes {
                let mut operation = OperationBuilder::new()
                    .tag(collection)
                    .summary(Some(summary))
                    .response(ok, ResponseBuilder::new().description("Success").build())
                    .response(
                        "500",
                        ResponseBuilder::new().description("Internal server error").build(),
                    );
                if path == by_id {
                    operation = operation
                        .parameter(
                            ParameterBuilder::new()
                                .name("id")
                                .parameter_in(ParameterIn::Path)
                                .required(Required::True)
                                .description(Some(format!("{label} id"))),
                        )
                        .response("404", ResponseBuilder::new().description("Not found").build());
                }
                if matches!(method, PathItemType::Post | PathItemType::Put) {
                    operation = operation.response(
                        "400",
                        ResponseBuilder::new().description("Validation failed").build(),
                    );
                }

                openapi
                    .paths
                    .paths
                    .entry(path)
                    .or_default()
                    .operations
                    .insert(method, operation.build());
            }
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::product::create_product,
        handlers::product::update_product,
        handlers::product::delete_product,
        handlers::order::update_approval,
        handlers::order::update_delivery,
    ),
    components(
        schemas(
            Employee,
            Gender,
            EmployeeSalary,
            SalaryBreakdown,
            Product,
            ProductForm,
            Order,
            Customer,
            ShippingAddress,
            OrderItem,
            Delivery,
            PaymentMethod,
            PaymentStatus,
            DeliveryStatus,
            ApprovalStatus,
            UpdateApprovalRequest,
            UpdateDeliveryRequest,
            SubscriptionPlan,
            DeliveryFrequency,
            Maintenance,
            MaintenanceStatus,
            Priority,
            Schedule,
            PettyCash,
            IncomeExpenditure,
            ErrorBody,
            HealthResponse,
        )
    ),
    modifiers(&ResourceRoutes),
    tags(
        (name = "employees", description = "Staff records"),
        (name = "salaries", description = "Monthly salary records"),
        (name = "products", description = "Catalogue with product images"),
        (name = "orders", description = "Storefront orders, approval and delivery"),
        (name = "subscription-plans", description = "Delivery subscription plans"),
        (name = "maintenance", description = "Plant maintenance log"),
        (name = "schedules", description = "Delivery schedules"),
        (name = "petty-cash", description = "Petty cash vouchers"),
        (name = "income-expenditures", description = "Income and expenditure ledger"),
        (name = "health", description = "Liveness"),
    ),
    info(
        title = "AquaFlow Backend API",
        version = "1.0.0",
        description = "Storefront and back-office REST API for a bottled water business"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
