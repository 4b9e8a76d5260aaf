use serde_json::{Map, Value};
use std::marker::PhantomData;

use crate::client::api::ResourceApi;
use crate::client::store::ResourceStore;
use crate::error::{AppError, AppResult};
use crate::forms::FieldErrors;
use crate::models::{Resource, Stored};

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    /// Editing the record with this id.
    Edit(String),
}

/// Editable field values for one record type. Rules run on submit only.
#[derive(Debug, Clone)]
pub struct FormState<T> {
    values: Map<String, Value>,
    mode: FormMode,
    errors: FieldErrors,
    _record: PhantomData<fn() -> T>,
}

impl<T: Resource> Default for FormState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> FormState<T> {
    pub fn new() -> Self {
        Self {
            values: T::form_schema().empty_values(),
            mode: FormMode::Create,
            errors: FieldErrors::new(),
            _record: PhantomData,
        }
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.values.insert(field.to_string(), value.into());
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Copies `record` into the fields; submitting then updates it.
    pub fn begin_edit(&mut self, record: &Stored<T>) -> AppResult<()> {
        let Value::Object(values) = serde_json::to_value(&record.record)? else {
            return Err(AppError::InternalError(format!(
                "{} does not serialize to an object",
                T::LABEL
            )));
        };
        self.values = values;
        self.mode = FormMode::Edit(record.id.clone());
        self.errors = FieldErrors::new();
        Ok(())
    }

    /// Discards edits and returns to an empty create form.
    pub fn cancel(&mut self) {
        *self = Self::new();
    }

    /// Builds the record the current values describe.
    pub fn to_record(&mut self) -> AppResult<T> {
        let values = T::form_schema().coerce(self.values.clone());
        if let Err(errors) = T::form_schema().validate(&values) {
            self.errors = errors.clone();
            return Err(AppError::InvalidFields(errors));
        }

        let mut record: T = serde_json::from_value(Value::Object(values))
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        record.normalize();
        if let Err(errors) = record.check() {
            self.errors = errors.clone();
            return Err(AppError::InvalidFields(errors));
        }
        self.errors = FieldErrors::new();
        Ok(record)
    }

    /// Validates, then creates or updates through `store`. The form resets
    /// only when the server accepted the record.
    pub async fn submit<A: ResourceApi<T>>(
        &mut self,
        store: &mut ResourceStore<T, A>,
    ) -> AppResult<Stored<T>> {
        let record = self.to_record()?;
        let saved = match &self.mode {
            FormMode::Create => store.create(&record).await?,
            FormMode::Edit(id) => store.update(id, &record).await?,
        };
        self.cancel();
        Ok(saved)
    }
}
