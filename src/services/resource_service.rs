use crate::error::{AppError, AppResult};
use crate::forms::FieldErrors;
use crate::models::{Resource, Stored, TableRow};
use crate::services::document_store::{DocumentStore, decode};
use crate::utils::csv::records_csv;
use serde_json::{Map, Value};
use std::marker::PhantomData;

/// Keys owned by the store; clients may echo them back but never set them.
const RESERVED_KEYS: [&str; 3] = ["_id", "createdAt", "updatedAt"];

/// CRUD over one collection of `T` records.
pub struct ResourceService<T> {
    store: DocumentStore,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceService<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Resource> ResourceService<T> {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn create(&self, payload: Value) -> AppResult<Stored<T>> {
        let record = self.parse(payload)?;
        self.ensure_unique(&record, None).await?;
        self.ensure_references(&record).await?;

        let doc = self
            .store
            .insert(T::COLLECTION, serde_json::to_value(&record)?)
            .await?;
        log::info!("Created {} {}", T::SINGULAR, doc.id);
        decode(doc)
    }

    pub async fn list(&self) -> AppResult<Vec<Stored<T>>> {
        self.store
            .find_all(T::COLLECTION)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn get(&self, id: &str) -> AppResult<Stored<T>> {
        match self.store.find_by_id(T::COLLECTION, id).await? {
            Some(doc) => decode(doc),
            None => Err(self.not_found()),
        }
    }

    /// Merges the submitted top-level fields over the stored record.
    pub async fn update(&self, id: &str, payload: Value) -> AppResult<Stored<T>> {
        let existing = self
            .store
            .find_by_id(T::COLLECTION, id)
            .await?
            .ok_or_else(|| self.not_found())?;

        let mut merged = match existing.body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in into_object(payload)? {
            merged.insert(key, value);
        }

        let record = self.parse(Value::Object(merged))?;
        self.ensure_unique(&record, Some(id)).await?;

        let doc = self
            .store
            .replace(T::COLLECTION, id, serde_json::to_value(&record)?)
            .await?
            .ok_or_else(|| self.not_found())?;
        log::info!("Updated {} {}", T::SINGULAR, id);
        decode(doc)
    }

    pub async fn delete(&self, id: &str) -> AppResult<Stored<T>> {
        match self.store.delete(T::COLLECTION, id).await? {
            Some(doc) => {
                log::info!("Deleted {} {}", T::SINGULAR, id);
                decode(doc)
            }
            None => Err(self.not_found()),
        }
    }

    pub async fn export_csv(&self) -> AppResult<String>
    where
        T: TableRow,
    {
        let records = self.list().await?;
        let rows: Vec<&T> = records.iter().map(|stored| &stored.record).collect();
        Ok(records_csv(&rows))
    }

    /// Validate, deserialize, recompute derived fields, then run record-level checks.
    fn parse(&self, payload: Value) -> AppResult<T> {
        let values = T::form_schema().coerce(into_object(payload)?);
        T::form_schema()
            .validate(&values)
            .map_err(AppError::InvalidFields)?;

        let mut record: T = serde_json::from_value(Value::Object(values))
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        record.normalize();
        record.check().map_err(AppError::InvalidFields)?;
        Ok(record)
    }

    async fn ensure_unique(&self, record: &T, current: Option<&str>) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        for (field, value) in record.unique_keys() {
            let clash = self
                .store
                .find_by_field(T::COLLECTION, field, &value)
                .await?
                .into_iter()
                .any(|doc| Some(doc.id.as_str()) != current);
            if clash {
                errors.insert(field, format!("{} with {field} {value} already exists", T::LABEL));
            }
        }
        errors.into_result().map_err(AppError::InvalidFields)
    }

    async fn ensure_references(&self, record: &T) -> AppResult<()> {
        for reference in record.references() {
            let found = self
                .store
                .find_by_field(reference.collection, reference.field, &reference.value)
                .await?;
            if found.is_empty() {
                return Err(AppError::ValidationError(format!(
                    "{} with ID {} does not exist",
                    reference.label, reference.value
                )));
            }
        }
        Ok(())
    }

    fn not_found(&self) -> AppError {
        AppError::NotFound(format!("{} not found", T::LABEL))
    }
}

fn into_object(payload: Value) -> AppResult<Map<String, Value>> {
    match payload {
        Value::Object(mut map) => {
            for key in RESERVED_KEYS {
                map.remove(key);
            }
            Ok(map)
        }
        _ => Err(AppError::ValidationError(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Employee, EmployeeSalary, IncomeExpenditure, Maintenance, MaintenanceStatus, Schedule,
    };
    use crate::services::document_store::tests::memory_store;
    use serde_json::json;

    fn employee_json(id: &str, nic: &str, email: &str) -> Value {
        json!({
            "employeeID": id,
            "name": "Kasun Silva",
            "position": "Driver",
            "department": "Logistics",
            "gender": "Male",
            "nic": nic,
            "email": email
        })
    }

    fn schedule_json() -> Value {
        json!({
            "name": "Morning run",
            "quantity": 40,
            "category": "Bottles",
            "location": "Kandy",
            "driver": "Nimal",
            "duration": "3 hours"
        })
    }

    #[actix_web::test]
    async fn test_create_list_get() {
        let service = ResourceService::<Schedule>::new(memory_store().await);
        let created = service.create(schedule_json()).await.unwrap();
        assert_eq!(created.record.location, "Kandy");

        let all = service.list().await.unwrap();
        assert_eq!(all.len(), 1);
        let fetched = service.get(&created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.record, created.record);
    }

    #[actix_web::test]
    async fn test_get_missing_is_not_found() {
        let service = ResourceService::<Schedule>::new(memory_store().await);
        let err = service.get("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(service.delete("missing").await.unwrap_err().is_not_found());
        assert!(
            service
                .update("missing", json!({ "name": "x" }))
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[actix_web::test]
    async fn test_update_preserves_unlisted_fields() {
        let service = ResourceService::<Schedule>::new(memory_store().await);
        let created = service.create(schedule_json()).await.unwrap();

        let updated = service
            .update(
                &created.id,
                json!({ "_id": "spoofed", "location": "Galle", "quantity": "55" }),
            )
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.record.location, "Galle");
        assert_eq!(updated.record.quantity, 55);
        assert_eq!(updated.record.driver, "Nimal");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[actix_web::test]
    async fn test_invalid_payload_writes_nothing() {
        let service = ResourceService::<Schedule>::new(memory_store().await);
        let mut payload = schedule_json();
        payload["quantity"] = json!("lots");

        match service.create(payload).await.unwrap_err() {
            AppError::InvalidFields(errors) => assert!(errors.get("quantity").is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(service.list().await.unwrap().is_empty());
        assert!(service.create(json!([1, 2])).await.is_err());
    }

    #[actix_web::test]
    async fn test_unique_keys() {
        let service = ResourceService::<Employee>::new(memory_store().await);
        let first = service
            .create(employee_json("EMP-1", "901234567V", "a@aquaflow.lk"))
            .await
            .unwrap();

        let err = service
            .create(employee_json("EMP-1", "199012345678", "b@aquaflow.lk"))
            .await
            .unwrap_err();
        match err {
            AppError::InvalidFields(errors) => {
                assert!(errors.get("employeeID").is_some());
                assert!(errors.get("nic").is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // updating a record does not clash with itself
        service
            .update(&first.id, json!({ "position": "Supervisor" }))
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn test_salary_requires_existing_employee() {
        let store = memory_store().await;
        let employees = ResourceService::<Employee>::new(store.clone());
        let salaries = ResourceService::<EmployeeSalary>::new(store);
        let payload = json!({
            "employeeID": "EMP-9",
            "basicSalary": 50000,
            "allowances": 5000,
            "overtimeHours": 10,
            "overtimeRate": 200,
            "deductions": 1000,
            "epfRate": 9,
            "netSalary": 1
        });

        let err = salaries.create(payload.clone()).await.unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Employee with ID EMP-9 does not exist");
        assert!(salaries.list().await.unwrap().is_empty());

        employees
            .create(employee_json("EMP-9", "901234567V", "e@aquaflow.lk"))
            .await
            .unwrap();
        let salary = salaries.create(payload).await.unwrap();
        assert_eq!(salary.record.net_salary, 51500.0);
    }

    #[actix_web::test]
    async fn test_export_csv_with_totals() {
        let service = ResourceService::<IncomeExpenditure>::new(memory_store().await);
        for (income, expenses) in [(1000, 400), (500, 100)] {
            service
                .create(json!({
                    "date": "2024-05-01",
                    "description": "Sales",
                    "income": income,
                    "expenses": expenses
                }))
                .await
                .unwrap();
        }

        let csv = service.export_csv().await.unwrap();
        let last = csv.lines().last().unwrap();
        assert_eq!(last, "Total,,1500,500,1000");
    }

    #[actix_web::test]
    async fn test_maintenance_status_moves_freely() {
        let service = ResourceService::<Maintenance>::new(memory_store().await);
        let task = service
            .create(json!({
                "name": "Chiller service",
                "date": "2024-06-10",
                "description": "Annual service",
                "status": " Completed",
                "priority": "High",
                "technician": "Ruwan"
            }))
            .await
            .unwrap();
        assert_eq!(task.record.status, MaintenanceStatus::Completed);

        let reopened = service
            .update(&task.id, json!({ "status": "Pending" }))
            .await
            .unwrap();
        assert_eq!(reopened.record.status, MaintenanceStatus::Pending);

        let started = service
            .update(&task.id, json!({ "status": "In Progress" }))
            .await
            .unwrap();
        assert_eq!(started.record.status, MaintenanceStatus::InProgress);
        assert_eq!(started.record.technician, "Ruwan");

        let err = service
            .update(&task.id, json!({ "status": "Cancelled" }))
            .await
            .unwrap_err();
        match err {
            AppError::InvalidFields(errors) => assert_eq!(
                errors.get("status"),
                Some("Status must be one of: Pending, In Progress, Completed")
            ),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            service.get(&task.id).await.unwrap().record.status,
            MaintenanceStatus::InProgress
        );
    }
}
