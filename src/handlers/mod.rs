pub mod health;
pub mod order;
pub mod product;
pub mod resource;

use actix_web::{error::JsonPayloadError, web};

use crate::error::AppError;
use crate::models::*;
use crate::services::{DocumentStore, ProductService, ResourceService};
use crate::storage::LocalImageStore;

pub use health::health_config;
pub use order::order_scope;
pub use product::product_scope;
pub use resource::resource_scope;

fn json_error(err: JsonPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    AppError::ValidationError(format!("Invalid JSON body: {err}")).into()
}

/// Registers every service and the `/api` scope.
pub fn api_config(cfg: &mut web::ServiceConfig, store: &DocumentStore, images: &LocalImageStore) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::Data::new(ResourceService::<Employee>::new(store.clone())))
        .app_data(web::Data::new(ResourceService::<EmployeeSalary>::new(store.clone())))
        .app_data(web::Data::new(ResourceService::<Product>::new(store.clone())))
        .app_data(web::Data::new(ResourceService::<Order>::new(store.clone())))
        .app_data(web::Data::new(ResourceService::<SubscriptionPlan>::new(store.clone())))
        .app_data(web::Data::new(ResourceService::<Maintenance>::new(store.clone())))
        .app_data(web::Data::new(ResourceService::<Schedule>::new(store.clone())))
        .app_data(web::Data::new(ResourceService::<PettyCash>::new(store.clone())))
        .app_data(web::Data::new(ResourceService::<IncomeExpenditure>::new(store.clone())))
        .app_data(web::Data::new(ProductService::new(store.clone(), images.clone())))
        .service(
            web::scope("/api")
                .service(resource_scope::<Employee>())
                .service(resource_scope::<EmployeeSalary>())
                .service(product_scope())
                .service(order_scope())
                .service(resource_scope::<SubscriptionPlan>())
                .service(resource_scope::<Maintenance>())
                .service(resource_scope::<Schedule>())
                .service(resource_scope::<PettyCash>())
                .service(resource_scope::<IncomeExpenditure>()),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::services::document_store::tests::memory_store;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    fn images(dir: &std::path::Path) -> LocalImageStore {
        LocalImageStore::new(&StorageConfig {
            upload_dir: dir.to_string_lossy().to_string(),
            public_path: "/uploads".to_string(),
        })
    }

    macro_rules! app {
        ($store:expr, $images:expr) => {
            test::init_service(
                App::new()
                    .configure(|cfg| api_config(cfg, &$store, &$images))
                    .configure(health_config),
            )
            .await
        };
    }

    fn employee() -> Value {
        json!({
            "employeeID": "EMP-001",
            "name": "Kasun Silva",
            "position": "Driver",
            "department": "Logistics",
            "gender": "Male",
            "nic": "901234567V",
            "email": "kasun@aquaflow.lk"
        })
    }

    fn order() -> Value {
        json!({
            "customer": { "name": "Amaya", "email": "amaya@example.com", "phone": "0771234567" },
            "shipping": { "address": "12 Lake Rd", "city": "Kandy", "postalCode": "20000" },
            "items": [{ "product": "p1", "quantity": 2 }],
            "totalPrice": 1700,
            "paymentMethod": "CashOnDelivery"
        })
    }

    fn multipart(parts: &[Part<'_>]) -> (String, Vec<u8>) {
        let boundary = "----aquaflowboundary";
        let mut body = Vec::new();
        for (name, file, data) in parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            match file {
                Some((file_name, mime)) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, &'a [u8]);

    fn product_parts(image: Option<(&'static str, &'static str)>) -> Vec<Part<'static>> {
        let mut parts: Vec<Part<'static>> = vec![
            ("name", None, &b"Spring Water 19L"[..]),
            ("description", None, &b"Refillable dispenser bottle"[..]),
            ("price", None, &b"850"[..]),
            ("quantity", None, &b"12"[..]),
            ("category", None, &b"Dispenser Bottles"[..]),
        ];
        if image.is_some() {
            parts.push(("image", image, &b"\x89PNG fake"[..]));
        }
        parts
    }

    #[actix_web::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let store = memory_store().await;
        let images = images(dir.path());
        let app = app!(store, images);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[actix_web::test]
    async fn test_employee_crud_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = memory_store().await;
        let images = images(dir.path());
        let app = app!(store, images);

        let req = test::TestRequest::post()
            .uri("/api/employees")
            .set_json(employee())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], json!("Employee created successfully"));
        let id = body["employee"]["_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/employees/{id}"))
            .set_json(json!({ "position": "Supervisor" }))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["employee"]["position"], json!("Supervisor"));
        assert_eq!(body["employee"]["nic"], json!("901234567V"));

        let req = test::TestRequest::get().uri("/api/employees").to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["employees"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/employees/{id}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("/api/employees/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], json!("Employee not found"));
    }

    #[actix_web::test]
    async fn test_validation_and_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = memory_store().await;
        let images = images(dir.path());
        let app = app!(store, images);

        let mut invalid = employee();
        invalid["email"] = json!("nope");
        let req = test::TestRequest::post()
            .uri("/api/employees")
            .set_json(invalid)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"]["email"].is_string());

        let req = test::TestRequest::post()
            .uri("/api/schedules")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_salary_for_missing_employee() {
        let dir = tempfile::tempdir().unwrap();
        let store = memory_store().await;
        let images = images(dir.path());
        let app = app!(store, images);

        let req = test::TestRequest::post()
            .uri("/api/salaries")
            .set_json(json!({ "employeeID": "EMP-404", "basicSalary": 50000, "epfRate": 8 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("does not exist"));

        let req = test::TestRequest::get().uri("/api/salaries").to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert!(body["salaries"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_order_approval_and_delivery() {
        let dir = tempfile::tempdir().unwrap();
        let store = memory_store().await;
        let images = images(dir.path());
        let app = app!(store, images);

        let req = test::TestRequest::post()
            .uri("/api/orders")
            .set_json(order())
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["order"]["approvalStatus"], json!("Pending"));
        let id = body["order"]["_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/orders/{id}/approval"))
            .set_json(json!({ "approvalStatus": "Approved" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["order"]["approvalStatus"], json!("Approved"));

        let req = test::TestRequest::put()
            .uri(&format!("/api/orders/{id}/delivery"))
            .set_json(json!({ "status": "Delivered" }))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["order"]["delivery"]["status"], json!("Delivered"));
        assert!(body["order"]["delivery"]["date"].is_string());
        assert_eq!(body["order"]["customer"]["name"], json!("Amaya"));

        let req = test::TestRequest::put()
            .uri("/api/orders/missing/approval")
            .set_json(json!({ "approvalStatus": "Rejected" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn test_product_multipart_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = memory_store().await;
        let images = images(dir.path());
        let app = app!(store, images);

        let (content_type, body) = multipart(&product_parts(Some(("bottle.png", "image/png"))));
        let req = test::TestRequest::post()
            .uri("/api/products")
            .insert_header(("Content-Type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["product"]["price"], json!(850.0));
        let id = body["product"]["_id"].as_str().unwrap().to_string();
        let image = body["product"]["image"].as_str().unwrap().to_string();
        assert!(image.starts_with("/uploads/"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/products/{id}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn test_product_rejects_unsupported_image_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = memory_store().await;
        let images = images(dir.path());
        let app = app!(store, images);

        let (content_type, body) = multipart(&product_parts(Some(("notes.txt", "text/plain"))));
        let req = test::TestRequest::post()
            .uri("/api/products")
            .insert_header(("Content-Type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], json!("Invalid file type"));

        let req = test::TestRequest::get().uri("/api/products").to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert!(body["products"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_export_income_expenditure_csv() {
        let dir = tempfile::tempdir().unwrap();
        let store = memory_store().await;
        let images = images(dir.path());
        let app = app!(store, images);

        for (income, expenses) in [(1000, 400), (500, 100)] {
            let req = test::TestRequest::post()
                .uri("/api/income-expenditures")
                .set_json(json!({
                    "date": "2024-05-01",
                    "description": "Sales",
                    "income": income,
                    "expenses": expenses
                }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get()
            .uri("/api/income-expenditures/export")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/csv; charset=utf-8"
        );
        let csv = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Description,Income,Expenses,Profit");
        assert_eq!(lines[1], "2024-05-01,Sales,1000,400,600");
        assert_eq!(lines[3], "Total,,1500,500,1000");
    }

    #[actix_web::test]
    async fn test_export_orders_with_large_quantities() {
        let dir = tempfile::tempdir().unwrap();
        let store = memory_store().await;
        let images = images(dir.path());
        let app = app!(store, images);

        let mut bulk = order();
        bulk["items"] = json!([
            { "product": "p1", "quantity": 4_000_000_000u32 },
            { "product": "p2", "quantity": 4_000_000_000u32 }
        ]);
        let req = test::TestRequest::post()
            .uri("/api/orders")
            .set_json(bulk)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/api/orders/export").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let csv = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(csv.lines().nth(1).unwrap().contains(",8000000000,"));
    }

    #[actix_web::test]
    async fn test_plan_and_maintenance_routes() {
        let dir = tempfile::tempdir().unwrap();
        let store = memory_store().await;
        let images = images(dir.path());
        let app = app!(store, images);

        let req = test::TestRequest::post()
            .uri("/api/subscription-plans")
            .set_json(json!({
                "name": "Family Monthly",
                "description": "Four 19L bottles every week",
                "duration": 6,
                "price": 12000,
                "deliveryFrequency": "Weekly"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], json!("Subscription plan created successfully"));
        assert_eq!(body["plan"]["deliveryFrequency"], json!("Weekly"));

        let req = test::TestRequest::post()
            .uri("/api/subscription-plans")
            .set_json(json!({
                "name": "Trial",
                "description": "One bottle",
                "duration": 0,
                "price": 500,
                "deliveryFrequency": "Daily"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["duration"], json!("Duration must be at least 1"));

        let req = test::TestRequest::get().uri("/api/subscription-plans").to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["plans"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::post()
            .uri("/api/maintenance")
            .set_json(json!({
                "name": "Chiller service",
                "date": "2024-06-10",
                "description": "Annual service",
                "status": "Completed",
                "priority": "High",
                "technician": "Ruwan"
            }))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let id = body["maintenance"]["_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/maintenance/{id}"))
            .set_json(json!({ "status": "Pending" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["maintenance"]["status"], json!("Pending"));
        assert_eq!(body["maintenance"]["priority"], json!("High"));
    }
}
